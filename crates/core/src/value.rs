// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::{Error, PlcType, Result};
use chrono::{NaiveDate, NaiveTime};
use core::fmt;
use paste::paste;
use std::time::Duration;

#[inline]
fn slice_at(buf: &[u8], offset: usize, width: usize) -> Result<&[u8]> {
    let end = offset.checked_add(width).unwrap_or(usize::MAX);
    buf.get(offset..end).ok_or(Error::BufferTooShort {
        required: end,
        actual: buf.len(),
    })
}

macro_rules! value_impl {
    ($type: ident) => {
        paste! {
            #[doc = concat!("read big-endian `", stringify!($type), "` at specified byte offset")]
            #[inline]
            pub fn [<get_ $type>](buf: &[u8], offset: usize) -> Result<$type> {
                const WIDTH: usize = std::mem::size_of::<$type>();
                let bytes = slice_at(buf, offset, WIDTH)?;
                let mut raw = [0_u8; WIDTH];
                raw.copy_from_slice(bytes);
                Ok($type::from_be_bytes(raw))
            }

            impl Decoder for $type {
                #[inline]
                fn decode(buf: &[u8], offset: usize) -> Result<Self> {
                    [<get_ $type>](buf, offset)
                }
            }
        }
    };
}

/// this trait abstracts decoding of raw S7 memory.
/// S7 stores multi-byte values big-endian.
///
/// # Examples
/// ```rust
/// use s7tag_core::Decoder;
///
/// let buf = [0x40, 0x49, 0x0F, 0xDC, 0x00, 0x2A];
/// let pi = f32::decode(&buf, 0).unwrap();
/// assert!((pi - 3.141593).abs() < 1e-6);
/// let answer = u16::decode(&buf, 4).unwrap();
/// assert_eq!(answer, 42);
/// ```
///
/// # UDT
/// ```rust
/// use s7tag_core::{Decoder, Result};
///
/// #[derive(Debug, Default)]
/// struct Motor {
///     speed: i16,
///     current: f32,
/// }
///
/// impl Decoder for Motor {
///     fn decode(buf: &[u8], offset: usize) -> Result<Self> {
///         let speed = i16::decode(buf, offset)?;
///         let current = f32::decode(buf, offset + 2)?;
///         Ok(Motor { speed, current })
///     }
/// }
///
/// let motor = Motor::decode(&[0xFF, 0x38, 0x3F, 0xC0, 0x00, 0x00], 0).unwrap();
/// assert_eq!(motor.speed, -200);
/// assert_eq!(motor.current, 1.5);
/// ```
pub trait Decoder: Sized {
    /// get value at specified byte offset
    fn decode(buf: &[u8], offset: usize) -> Result<Self>;
}

value_impl!(u8);
value_impl!(i8);
value_impl!(u16);
value_impl!(i16);
value_impl!(u32);
value_impl!(i32);
value_impl!(u64);
value_impl!(i64);
value_impl!(f32);
value_impl!(f64);

/// get bit value, `bit_offset` counts from the least significant bit of the byte
#[inline]
pub fn get_bit(buf: &[u8], offset: usize, bit_offset: u8) -> Result<bool> {
    let byte = get_u8(buf, offset)?;
    Ok((byte >> (bit_offset & 0x07)) & 1 == 1)
}

impl Decoder for bool {
    #[inline]
    fn decode(buf: &[u8], offset: usize) -> Result<Self> {
        Ok(get_u8(buf, offset)? != 0)
    }
}

impl<T: Decoder> Decoder for Option<T> {
    #[inline]
    fn decode(buf: &[u8], offset: usize) -> Result<Self> {
        Ok(Some(T::decode(buf, offset)?))
    }
}

impl<T: Decoder> Decoder for Box<T> {
    #[inline]
    fn decode(buf: &[u8], offset: usize) -> Result<Self> {
        Ok(Box::new(T::decode(buf, offset)?))
    }
}

/// typed value decoded from S7 memory
///
/// unsigned types are widened so that every value of the PLC type is representable
/// without sign ambiguity.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// BOOL
    Bool(bool),
    /// BYTE
    Byte(u16),
    /// WORD
    Word(u16),
    /// DWORD
    DWord(u64),
    /// SINT
    SInt(i8),
    /// USINT
    USInt(u16),
    /// INT
    Int(i16),
    /// UINT
    UInt(u16),
    /// DINT
    DInt(i32),
    /// UDINT
    UDInt(u64),
    /// REAL
    Real(f32),
    /// LREAL
    LReal(f64),
    /// CHAR, one character
    Char(String),
    /// WCHAR, one character
    WChar(String),
    /// STRING
    String(String),
    /// WSTRING
    WString(String),
    /// TIME
    Time(Duration),
    /// DATE
    Date(NaiveDate),
    /// TIME_OF_DAY
    TimeOfDay(NaiveTime),
}

impl DecodedValue {
    /// PLC type the value was decoded as
    pub fn plc_type(&self) -> PlcType {
        match self {
            DecodedValue::Bool(_) => PlcType::Bool,
            DecodedValue::Byte(_) => PlcType::Byte,
            DecodedValue::Word(_) => PlcType::Word,
            DecodedValue::DWord(_) => PlcType::DWord,
            DecodedValue::SInt(_) => PlcType::SInt,
            DecodedValue::USInt(_) => PlcType::USInt,
            DecodedValue::Int(_) => PlcType::Int,
            DecodedValue::UInt(_) => PlcType::UInt,
            DecodedValue::DInt(_) => PlcType::DInt,
            DecodedValue::UDInt(_) => PlcType::UDInt,
            DecodedValue::Real(_) => PlcType::Real,
            DecodedValue::LReal(_) => PlcType::LReal,
            DecodedValue::Char(_) => PlcType::Char,
            DecodedValue::WChar(_) => PlcType::WChar,
            DecodedValue::String(_) => PlcType::String,
            DecodedValue::WString(_) => PlcType::WString,
            DecodedValue::Time(_) => PlcType::Time,
            DecodedValue::Date(_) => PlcType::Date,
            DecodedValue::TimeOfDay(_) => PlcType::TimeOfDay,
        }
    }

    /// boolean value, if any
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// any integer type widened to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            DecodedValue::Byte(v)
            | DecodedValue::Word(v)
            | DecodedValue::USInt(v)
            | DecodedValue::UInt(v) => Some(i64::from(v)),
            DecodedValue::DWord(v) | DecodedValue::UDInt(v) => i64::try_from(v).ok(),
            DecodedValue::SInt(v) => Some(i64::from(v)),
            DecodedValue::Int(v) => Some(i64::from(v)),
            DecodedValue::DInt(v) => Some(i64::from(v)),
            _ => None,
        }
    }

    /// any non-negative integer widened to `u64`
    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|v| u64::try_from(v).ok())
    }

    /// REAL or LREAL as `f64`
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            DecodedValue::Real(v) => Some(f64::from(v)),
            DecodedValue::LReal(v) => Some(v),
            _ => None,
        }
    }

    /// text of CHAR, WCHAR, STRING or WSTRING
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::Char(s)
            | DecodedValue::WChar(s)
            | DecodedValue::String(s)
            | DecodedValue::WString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// TIME as duration
    #[inline]
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            DecodedValue::Time(v) => Some(*v),
            _ => None,
        }
    }

    /// DATE as calendar date
    #[inline]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DecodedValue::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// TIME_OF_DAY as time
    #[inline]
    pub fn as_time_of_day(&self) -> Option<NaiveTime> {
        match self {
            DecodedValue::TimeOfDay(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Bool(v) => write!(f, "{}", v),
            DecodedValue::Byte(v)
            | DecodedValue::Word(v)
            | DecodedValue::USInt(v)
            | DecodedValue::UInt(v) => write!(f, "{}", v),
            DecodedValue::DWord(v) | DecodedValue::UDInt(v) => write!(f, "{}", v),
            DecodedValue::SInt(v) => write!(f, "{}", v),
            DecodedValue::Int(v) => write!(f, "{}", v),
            DecodedValue::DInt(v) => write!(f, "{}", v),
            DecodedValue::Real(v) => write!(f, "{}", v),
            DecodedValue::LReal(v) => write!(f, "{}", v),
            DecodedValue::Char(s)
            | DecodedValue::WChar(s)
            | DecodedValue::String(s)
            | DecodedValue::WString(s) => f.write_str(s),
            DecodedValue::Time(v) => write!(f, "{}ms", v.as_millis()),
            DecodedValue::Date(v) => write!(f, "{}", v),
            DecodedValue::TimeOfDay(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getters_big_endian() {
        let buf = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert_eq!(get_u8(&buf, 0).unwrap(), 0x12);
        assert_eq!(get_u16(&buf, 0).unwrap(), 0x1234);
        assert_eq!(get_u16(&buf, 1).unwrap(), 0x3456);
        assert_eq!(get_u32(&buf, 0).unwrap(), 0x1234_5678);
        assert_eq!(get_u64(&buf, 0).unwrap(), 0x1234_5678_9ABC_DEF0);
        assert_eq!(get_i16(&buf, 4).unwrap(), 0x9ABC_u16 as i16);
    }

    #[test]
    fn test_getter_out_of_range() {
        let buf = [0x00, 0x01, 0x02];
        assert_eq!(
            get_u32(&buf, 0),
            Err(Error::BufferTooShort {
                required: 4,
                actual: 3
            })
        );
        assert!(get_u16(&buf, 2).is_err());
        assert!(get_u8(&buf, 3).is_err());
    }

    #[test]
    fn test_getter_offset_overflow() {
        let buf = [0_u8; 4];
        assert_eq!(
            get_u32(&buf, usize::MAX),
            Err(Error::BufferTooShort {
                required: usize::MAX,
                actual: 4
            })
        );
        assert!(get_u8(&buf, usize::MAX).is_err());
        assert!(f64::decode(&buf, usize::MAX - 3).is_err());
    }

    #[test]
    fn test_bits() {
        let buf = [0b0000_1000];
        assert!(get_bit(&buf, 0, 3).unwrap());
        assert!(!get_bit(&buf, 0, 2).unwrap());
    }

    #[test]
    fn test_widening() {
        assert_eq!(DecodedValue::DWord(0xFFFF_FFFF).as_i64(), Some(0xFFFF_FFFF));
        assert_eq!(DecodedValue::SInt(-1).as_i64(), Some(-1));
        assert_eq!(DecodedValue::SInt(-1).as_u64(), None);
        assert_eq!(DecodedValue::Real(1.5).as_f64(), Some(1.5));
        assert_eq!(DecodedValue::Bool(true).as_i64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DecodedValue::String("hurz".into()).to_string(), "hurz");
        assert_eq!(
            DecodedValue::Time(Duration::from_millis(1500)).to_string(),
            "1500ms"
        );
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        assert_eq!(DecodedValue::Date(date).to_string(), "1990-01-01");
    }
}
