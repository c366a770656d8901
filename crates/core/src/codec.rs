// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! byte span computation and decoding of S7 memory

use crate::{
    str::{latin1_to_string, utf16_unit_to_string, utf16be_to_string},
    value::*,
    ByteSpan, DecodedValue, Error, PlcType, Result, TagDescriptor,
};
use chrono::{Days, NaiveDate, NaiveTime};
use std::time::Duration;

const MILLIS_PER_DAY: u32 = 86_400_000;

/// exact region of the data block that must be fetched before `tag` can be decoded
///
/// # Examples
/// ```rust
/// use s7tag_core::{parse, required_span, ByteSpan};
///
/// let tag = parse("%DB4:396:WSTRING(10)").unwrap();
/// assert_eq!(required_span(&tag), ByteSpan::new(396, 24));
/// ```
pub fn required_span(tag: &TagDescriptor) -> ByteSpan {
    let length = match tag.plc_type() {
        PlcType::Bool | PlcType::Byte | PlcType::SInt | PlcType::USInt | PlcType::Char => 1,
        PlcType::Word | PlcType::Int | PlcType::UInt | PlcType::WChar | PlcType::Date => 2,
        PlcType::DWord
        | PlcType::DInt
        | PlcType::UDInt
        | PlcType::Real
        | PlcType::Time
        | PlcType::TimeOfDay => 4,
        PlcType::LReal => 8,
        // max length, actual length, payload
        PlcType::String => 2 + u32::from(tag.capacity()),
        // max length, actual length, 2 bytes per char
        PlcType::WString => 4 + u32::from(tag.capacity()) * 2,
    };
    ByteSpan::new(tag.byte_offset(), length)
}

/// decode `buf`, read from the PLC at [`required_span`], into a typed value
///
/// `buf` starts at the tag's byte offset; bytes past the span are ignored.
///
/// # Examples
/// ```rust
/// use s7tag_core::{decode, parse, DecodedValue};
///
/// let tag = parse("%DB4:140:STRING(10)").unwrap();
/// let buf = [10, 4, b'h', b'u', b'r', b'z', 0, 0, 0, 0, 0, 0];
/// let value = decode(&tag, &buf).unwrap();
/// assert_eq!(value, DecodedValue::String("hurz".to_owned()));
/// ```
pub fn decode(tag: &TagDescriptor, buf: &[u8]) -> Result<DecodedValue> {
    let required = required_span(tag).length as usize;
    if buf.len() < required {
        return Err(Error::BufferTooShort {
            required,
            actual: buf.len(),
        });
    }
    let buf = &buf[..required];

    let value = match tag.plc_type() {
        PlcType::Bool => DecodedValue::Bool(get_bit(buf, 0, tag.bit_offset())?),
        PlcType::Byte => DecodedValue::Byte(u16::from(get_u8(buf, 0)?)),
        PlcType::Word => DecodedValue::Word(get_u16(buf, 0)?),
        PlcType::DWord => DecodedValue::DWord(u64::from(get_u32(buf, 0)?)),
        PlcType::SInt => DecodedValue::SInt(get_i8(buf, 0)?),
        PlcType::USInt => DecodedValue::USInt(u16::from(get_u8(buf, 0)?)),
        PlcType::Int => DecodedValue::Int(get_i16(buf, 0)?),
        PlcType::UInt => DecodedValue::UInt(get_u16(buf, 0)?),
        PlcType::DInt => DecodedValue::DInt(get_i32(buf, 0)?),
        PlcType::UDInt => DecodedValue::UDInt(u64::from(get_u32(buf, 0)?)),
        PlcType::Real => DecodedValue::Real(get_f32(buf, 0)?),
        PlcType::LReal => DecodedValue::LReal(get_f64(buf, 0)?),
        PlcType::Char => DecodedValue::Char(latin1_to_string(&buf[..1])),
        PlcType::WChar => DecodedValue::WChar(utf16_unit_to_string(get_u16(buf, 0)?)?),
        PlcType::String => {
            let actual = usize::from(get_u8(buf, 1)?);
            let len = clamp_length(tag, actual);
            DecodedValue::String(latin1_to_string(&buf[2..2 + len]))
        }
        PlcType::WString => {
            let actual = usize::from(get_u16(buf, 2)?);
            let len = clamp_length(tag, actual);
            DecodedValue::WString(utf16be_to_string(buf, 4, len)?)
        }
        PlcType::Time => DecodedValue::Time(Duration::from_millis(u64::from(get_u32(buf, 0)?))),
        PlcType::Date => DecodedValue::Date(s7_date(get_u16(buf, 0)?)?),
        PlcType::TimeOfDay => DecodedValue::TimeOfDay(s7_time_of_day(get_u32(buf, 0)?)?),
    };
    Ok(value)
}

/// the PLC may report an actual length beyond the declared capacity;
/// read at most the declared capacity.
#[inline]
fn clamp_length(tag: &TagDescriptor, actual: usize) -> usize {
    let capacity = usize::from(tag.capacity());
    if actual > capacity {
        warn!(
            "{}: actual length {} exceeds declared capacity {}, clamped",
            tag, actual, capacity
        );
        capacity
    } else {
        actual
    }
}

/// days since 1990-01-01
fn s7_date(days: u16) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(1990, 1, 1)
        .and_then(|epoch| epoch.checked_add_days(Days::new(u64::from(days))))
        .ok_or_else(|| Error::DecodeError(format!("DATE out of range: {} days", days)))
}

/// milliseconds since midnight
fn s7_time_of_day(millis: u32) -> Result<NaiveTime> {
    if millis >= MILLIS_PER_DAY {
        return Err(Error::DecodeError(format!(
            "TIME_OF_DAY out of range: {}ms",
            millis
        )));
    }
    NaiveTime::from_num_seconds_from_midnight_opt(millis / 1000, (millis % 1000) * 1_000_000)
        .ok_or_else(|| Error::DecodeError(format!("TIME_OF_DAY out of range: {}ms", millis)))
}
