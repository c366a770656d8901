// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! batching of tag reads into multi-item requests
//!
//! tags are grouped by data block and sorted by offset, then packed into
//! requests bounded by the negotiated PDU size and the per-request item limit.

use crate::{required_span, ByteSpan, TagDescriptor};
use std::collections::BTreeMap;

/// PDU size most S7-300/400 CPUs negotiate
pub const DEFAULT_PDU_SIZE: usize = 240;
/// S7 limit of items per multi-item read
pub const MAX_ITEMS_PER_REQUEST: usize = 20;
/// reserved for the request header
pub const REQUEST_HEADER_SIZE: usize = 14;
/// per item request overhead
pub const ITEM_HEADER_SIZE: usize = 12;

/// one tag of a [`ReadRequest`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlannedItem {
    /// position of the tag in the slice passed to [`ReadPlanner::plan`]
    pub index: usize,
    /// bytes to fetch
    pub span: ByteSpan,
}

/// a multi-item read against a single data block
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReadRequest {
    /// data block number
    pub block: u16,
    /// items, ascending by offset
    pub items: Vec<PlannedItem>,
}

impl ReadRequest {
    /// payload bytes of all items
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.items.iter().map(|item| item.span.length as usize).sum()
    }

    /// estimated request size including headers
    #[inline]
    pub fn pdu_len(&self) -> usize {
        REQUEST_HEADER_SIZE + self.items.len() * ITEM_HEADER_SIZE + self.payload_len()
    }
}

/// read planner
///
/// # Examples
/// ```rust
/// use s7tag_core::{parse, plan::ReadPlanner};
///
/// let tags = vec![
///     parse("%DB4:6:INT").unwrap(),
///     parse("%DB1:0:REAL").unwrap(),
///     parse("%DB4:0.3:BOOL").unwrap(),
/// ];
/// let requests = ReadPlanner::default().plan(&tags);
/// assert_eq!(requests.len(), 2);
/// assert_eq!(requests[0].block, 1);
/// assert_eq!(requests[1].items[0].index, 2);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct ReadPlanner {
    pdu_size: usize,
    max_items: usize,
}

impl Default for ReadPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_PDU_SIZE)
    }
}

impl ReadPlanner {
    /// planner for the negotiated PDU size
    #[inline]
    pub fn new(pdu_size: usize) -> Self {
        Self {
            pdu_size,
            max_items: MAX_ITEMS_PER_REQUEST,
        }
    }

    /// limit items per request, at least 1
    #[inline]
    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = n.max(1);
        self
    }

    /// negotiated PDU size
    #[inline]
    pub fn pdu_size(&self) -> usize {
        self.pdu_size
    }

    /// pack `tags` into requests; every tag lands in exactly one request.
    /// a tag too large for the PDU budget gets a request of its own.
    pub fn plan(&self, tags: &[TagDescriptor]) -> Vec<ReadRequest> {
        let mut groups: BTreeMap<u16, Vec<PlannedItem>> = BTreeMap::new();
        for (index, tag) in tags.iter().enumerate() {
            groups
                .entry(tag.block_number())
                .or_default()
                .push(PlannedItem {
                    index,
                    span: required_span(tag),
                });
        }

        let mut requests = vec![];
        for (block, mut items) in groups {
            // stable, keeps caller order for equal offsets
            items.sort_by_key(|item| item.span.offset);

            let mut current: Vec<PlannedItem> = vec![];
            let mut current_size = 0;
            for item in items {
                let item_size = ITEM_HEADER_SIZE + item.span.length as usize;
                if current.len() >= self.max_items
                    || (!current.is_empty()
                        && current_size + item_size + REQUEST_HEADER_SIZE > self.pdu_size)
                {
                    requests.push(ReadRequest {
                        block,
                        items: std::mem::take(&mut current),
                    });
                    current_size = 0;
                }
                current.push(item);
                current_size += item_size;
            }
            if !current.is_empty() {
                requests.push(ReadRequest {
                    block,
                    items: current,
                });
            }
        }
        debug!(
            "planned {} tags into {} requests (pdu size {}, max items {})",
            tags.len(),
            requests.len(),
            self.pdu_size,
            self.max_items
        );
        requests
    }
}
