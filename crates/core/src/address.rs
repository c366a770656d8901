// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! tag address parser
//!
//! grammar: `%DB<block>:<byte>[.<bit>]:<TYPE>[(<len>)]`

use crate::{Error, PlcType, Result, TagDescriptor};
use std::str::FromStr;

const DB_PREFIX: &str = "%DB";

/// parse a tag address, i.e. `%DB4:0.3:BOOL`, `%DB4:140:STRING(10)`
///
/// surrounding whitespace is ignored; type names are case-sensitive.
///
/// # Examples
/// ```rust
/// use s7tag_core::{parse, ErrorKind, PlcType};
///
/// let tag = parse("%DB4:0.3:BOOL").unwrap();
/// assert_eq!(tag.bit_offset(), 3);
/// assert_eq!(tag.plc_type(), PlcType::Bool);
///
/// let err = parse("%DB4:1:FOOBAR").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::UnknownType);
/// ```
pub fn parse(address: &str) -> Result<TagDescriptor> {
    let input = address.trim();
    trace!("parse address: {}", input);

    let body = match input.strip_prefix(DB_PREFIX) {
        Some(body) => body,
        None if is_other_area(input) => {
            return Err(Error::malformed(
                input,
                "only data block (%DB) addresses are supported",
            ))
        }
        None => return Err(Error::malformed(input, "address must start with %DB")),
    };

    let mut fields = body.split(':');
    let (block, location, type_spec) = match (fields.next(), fields.next(), fields.next()) {
        (Some(block), Some(location), Some(type_spec)) if fields.next().is_none() => {
            (block, location, type_spec)
        }
        _ => {
            return Err(Error::malformed(
                input,
                "expected 3 fields separated by ':'",
            ))
        }
    };

    let block_number: u16 = parse_number(block)
        .ok_or_else(|| Error::malformed(input, "block number is not a 16-bit non-negative integer"))?;

    let (byte, bit) = match location.split_once('.') {
        Some((byte, bit)) => (byte, Some(bit)),
        None => (location, None),
    };
    let byte_offset: u32 = parse_number(byte)
        .ok_or_else(|| Error::malformed(input, "byte offset is not a 32-bit non-negative integer"))?;

    let (type_name, declared_length) = lex_type(input, type_spec)?;
    let plc_type: PlcType = type_name.parse()?;

    let bit_offset = match (plc_type, bit) {
        (PlcType::Bool, Some(bit)) => parse_number::<u8>(bit)
            .filter(|v| *v <= 7)
            .ok_or_else(|| Error::malformed(input, "bit offset out of range [0-7]"))?,
        (PlcType::Bool, None) => {
            return Err(Error::malformed(input, "BOOL requires a bit offset"))
        }
        (_, Some(_)) => {
            return Err(Error::malformed(input, "bit offset only valid for BOOL"))
        }
        (_, None) => 0,
    };

    let declared_length = match (plc_type.max_length(), declared_length) {
        (Some(max), Some(len)) => {
            let len = parse_number::<u16>(len)
                .filter(|v| *v > 0 && *v <= max)
                .ok_or_else(|| Error::malformed(input, "declared length out of range"))?;
            Some(len)
        }
        (Some(_), None) => {
            return Err(Error::malformed(
                input,
                "declared length required for string types",
            ))
        }
        (None, Some(_)) => {
            return Err(Error::malformed(
                input,
                "declared length only valid for string types",
            ))
        }
        (None, None) => None,
    };

    let tag = TagDescriptor::new(
        block_number,
        byte_offset,
        bit_offset,
        plc_type,
        declared_length,
    )?;
    debug!("parsed address {} -> {}", input, tag);
    Ok(tag)
}

impl FromStr for TagDescriptor {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

/// input, output and marker areas: `%I`, `%Q`, `%M`
#[inline]
fn is_other_area(input: &str) -> bool {
    let mut chars = input.chars();
    chars.next() == Some('%') && matches!(chars.next(), Some('I' | 'Q' | 'M'))
}

/// digits only, no sign, no whitespace
#[inline]
fn parse_number<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// split `TYPE[(len)][[count]]` into type name and optional length token
fn lex_type<'a>(input: &str, spec: &'a str) -> Result<(&'a str, Option<&'a str>)> {
    let mut spec = spec;
    if let Some(head) = spec.strip_suffix(']') {
        let (head, count) = head
            .rsplit_once('[')
            .ok_or_else(|| Error::malformed(input, "unbalanced '[' in type"))?;
        if parse_number::<u32>(count).is_none() {
            return Err(Error::malformed(input, "array count is not a non-negative integer"));
        }
        let (name, _) = lex_type(input, head)?;
        // arrays are recognized but not decoded
        let _: PlcType = name.parse()?;
        return Err(Error::UnsupportedType(spec.to_owned()));
    }

    let mut length = None;
    if let Some(head) = spec.strip_suffix(')') {
        let (head, len) = head
            .split_once('(')
            .ok_or_else(|| Error::malformed(input, "unbalanced '(' in type"))?;
        spec = head;
        length = Some(len);
    }
    if spec.is_empty() {
        return Err(Error::malformed(input, "missing type"));
    }
    if spec.contains(|c| matches!(c, '(' | ')' | '[' | ']')) {
        return Err(Error::malformed(input, "unexpected bracket in type"));
    }
    Ok((spec, length))
}
