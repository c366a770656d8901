// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::{Error, Result};
use parking_lot::RwLock;
use s7tag_core::ByteSpan;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

/// capability to fetch raw bytes of data blocks from a PLC
#[async_trait]
pub trait Transport: Send + Sync {
    /// establish the connection
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    /// close the connection
    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    /// read `span` of data block `block`
    async fn read(&self, block: u16, span: ByteSpan) -> Result<Vec<u8>>;

    /// read several spans in one round trip if the transport supports it;
    /// each item fails or succeeds on its own.
    async fn read_many(&self, requests: &[(u16, ByteSpan)]) -> Result<Vec<Result<Vec<u8>>>> {
        let mut res = Vec::with_capacity(requests.len());
        for (block, span) in requests {
            res.push(self.read(*block, *span).await);
        }
        Ok(res)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    #[inline(always)]
    async fn connect(&self) -> Result<()> {
        (**self).connect().await
    }

    #[inline(always)]
    async fn disconnect(&self) -> Result<()> {
        (**self).disconnect().await
    }

    #[inline(always)]
    async fn read(&self, block: u16, span: ByteSpan) -> Result<Vec<u8>> {
        (**self).read(block, span).await
    }

    #[inline(always)]
    async fn read_many(&self, requests: &[(u16, ByteSpan)]) -> Result<Vec<Result<Vec<u8>>>> {
        (**self).read_many(requests).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    #[inline(always)]
    async fn connect(&self) -> Result<()> {
        (**self).connect().await
    }

    #[inline(always)]
    async fn disconnect(&self) -> Result<()> {
        (**self).disconnect().await
    }

    #[inline(always)]
    async fn read(&self, block: u16, span: ByteSpan) -> Result<Vec<u8>> {
        (**self).read(block, span).await
    }

    #[inline(always)]
    async fn read_many(&self, requests: &[(u16, ByteSpan)]) -> Result<Vec<Result<Vec<u8>>>> {
        (**self).read_many(requests).await
    }
}

/// in-process data block images, a stand-in PLC for tests, demos and benches
///
/// reads require a prior [`connect`](Transport::connect); reads beyond the
/// written image of a block fail.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    blocks: RwLock<HashMap<u16, Vec<u8>>>,
    connected: AtomicBool,
    latency: Option<Duration>,
    round_trips: AtomicUsize,
}

impl MemoryTransport {
    /// create an empty transport
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// delay every round trip, to mimic network latency
    #[inline]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// write `bytes` into data block `block` at `offset`, growing the block as needed
    pub fn write_block(&self, block: u16, offset: u32, bytes: &[u8]) {
        let offset = offset as usize;
        let mut blocks = self.blocks.write();
        let image = blocks.entry(block).or_default();
        if image.len() < offset + bytes.len() {
            image.resize(offset + bytes.len(), 0);
        }
        image[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// connected?
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// number of round trips served so far
    #[inline]
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::Relaxed)
    }

    async fn round_trip(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::transport("not connected"));
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn fetch(&self, block: u16, span: ByteSpan) -> Result<Vec<u8>> {
        let blocks = self.blocks.read();
        let image = blocks
            .get(&block)
            .ok_or_else(|| Error::transport(format!("DB{} does not exist", block)))?;
        let start = span.offset as usize;
        let end = start + span.length as usize;
        match image.get(start..end) {
            Some(bytes) => {
                trace!("DB{} {}: {:02X?}", block, span, bytes);
                Ok(bytes.to_vec())
            }
            None => Err(Error::transport(format!(
                "DB{} {} out of range, block size {}",
                block,
                span,
                image.len()
            ))),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::Release);
        debug!("memory transport connected");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::Release);
        debug!("memory transport disconnected");
        Ok(())
    }

    async fn read(&self, block: u16, span: ByteSpan) -> Result<Vec<u8>> {
        self.round_trip().await?;
        self.fetch(block, span)
    }

    async fn read_many(&self, requests: &[(u16, ByteSpan)]) -> Result<Vec<Result<Vec<u8>>>> {
        self.round_trip().await?;
        Ok(requests
            .iter()
            .map(|(block, span)| self.fetch(*block, *span))
            .collect())
    }
}
