// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::{Error, Result};
use core::fmt;
use std::str::FromStr;

/// max capacity of a `STRING`, in characters
pub const STRING_MAX_LENGTH: u16 = 254;
/// max capacity of a `WSTRING`, in characters
pub const WSTRING_MAX_LENGTH: u16 = 16382;

/// PLC data types of S7 data blocks
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PlcType {
    /// single bit
    Bool,
    /// 8 bits
    Byte,
    /// 16 bits
    Word,
    /// 32 bits
    DWord,
    /// signed 8-bit integer
    SInt,
    /// unsigned 8-bit integer
    USInt,
    /// signed 16-bit integer
    Int,
    /// unsigned 16-bit integer
    UInt,
    /// signed 32-bit integer
    DInt,
    /// unsigned 32-bit integer
    UDInt,
    /// IEEE-754 single precision
    Real,
    /// IEEE-754 double precision
    LReal,
    /// single Latin-1 character
    Char,
    /// single UTF-16 code unit
    WChar,
    /// fixed capacity Latin-1 string
    String,
    /// fixed capacity UTF-16 string
    WString,
    /// IEC duration, milliseconds
    Time,
    /// days since 1990-01-01
    Date,
    /// milliseconds since midnight
    TimeOfDay,
}

impl PlcType {
    /// every known type
    pub const ALL: [PlcType; 19] = [
        PlcType::Bool,
        PlcType::Byte,
        PlcType::Word,
        PlcType::DWord,
        PlcType::SInt,
        PlcType::USInt,
        PlcType::Int,
        PlcType::UInt,
        PlcType::DInt,
        PlcType::UDInt,
        PlcType::Real,
        PlcType::LReal,
        PlcType::Char,
        PlcType::WChar,
        PlcType::String,
        PlcType::WString,
        PlcType::Time,
        PlcType::Date,
        PlcType::TimeOfDay,
    ];

    /// type name as written in addresses
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            PlcType::Bool => "BOOL",
            PlcType::Byte => "BYTE",
            PlcType::Word => "WORD",
            PlcType::DWord => "DWORD",
            PlcType::SInt => "SINT",
            PlcType::USInt => "USINT",
            PlcType::Int => "INT",
            PlcType::UInt => "UINT",
            PlcType::DInt => "DINT",
            PlcType::UDInt => "UDINT",
            PlcType::Real => "REAL",
            PlcType::LReal => "LREAL",
            PlcType::Char => "CHAR",
            PlcType::WChar => "WCHAR",
            PlcType::String => "STRING",
            PlcType::WString => "WSTRING",
            PlcType::Time => "TIME",
            PlcType::Date => "DATE",
            PlcType::TimeOfDay => "TIME_OF_DAY",
        }
    }

    /// width in bytes; `None` for `STRING`/`WSTRING` whose width depends on the declared length
    #[inline]
    pub fn fixed_width(&self) -> Option<u32> {
        match self {
            PlcType::Bool | PlcType::Byte | PlcType::SInt | PlcType::USInt | PlcType::Char => {
                Some(1)
            }
            PlcType::Word | PlcType::Int | PlcType::UInt | PlcType::WChar | PlcType::Date => {
                Some(2)
            }
            PlcType::DWord
            | PlcType::DInt
            | PlcType::UDInt
            | PlcType::Real
            | PlcType::Time
            | PlcType::TimeOfDay => Some(4),
            PlcType::LReal => Some(8),
            PlcType::String | PlcType::WString => None,
        }
    }

    /// `STRING` or `WSTRING`?
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, PlcType::String | PlcType::WString)
    }

    /// max declared length for string types
    #[inline]
    pub fn max_length(&self) -> Option<u16> {
        match self {
            PlcType::String => Some(STRING_MAX_LENGTH),
            PlcType::WString => Some(WSTRING_MAX_LENGTH),
            _ => None,
        }
    }
}

impl fmt::Display for PlcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlcType {
    type Err = Error;

    /// case-sensitive
    fn from_str(s: &str) -> Result<Self> {
        PlcType::ALL
            .iter()
            .find(|ty| ty.name() == s)
            .copied()
            .ok_or_else(|| Error::UnknownType(s.to_owned()))
    }
}

/// parsed tag address: where a value lives in a data block and how to read it
///
/// # Examples
/// ```rust
/// use s7tag_core::{PlcType, TagDescriptor};
///
/// let tag: TagDescriptor = "%DB4:140:STRING(10)".parse().unwrap();
/// assert_eq!(tag.block_number(), 4);
/// assert_eq!(tag.byte_offset(), 140);
/// assert_eq!(tag.plc_type(), PlcType::String);
/// assert_eq!(tag.declared_length(), Some(10));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TagDescriptor {
    block_number: u16,
    byte_offset: u32,
    bit_offset: u8,
    plc_type: PlcType,
    declared_length: Option<u16>,
}

impl TagDescriptor {
    /// create a tag descriptor, checking that
    /// - bit offset is in range [0-7], and non-zero only for `BOOL`
    /// - declared length is present if and only if the type is `STRING`/`WSTRING`
    pub fn new(
        block_number: u16,
        byte_offset: u32,
        bit_offset: u8,
        plc_type: PlcType,
        declared_length: Option<u16>,
    ) -> Result<Self> {
        let tag = Self::assemble(
            block_number,
            byte_offset,
            bit_offset,
            plc_type,
            declared_length,
        );
        tag.check()
            .map_err(|reason| Error::malformed(tag.raw_address(), reason))?;
        Ok(tag)
    }

    /// address text of the fields as given, keeping a bit offset a non-BOOL must not have
    fn raw_address(&self) -> String {
        let mut text = format!("%DB{}:{}", self.block_number, self.byte_offset);
        if self.plc_type == PlcType::Bool || self.bit_offset != 0 {
            text.push_str(&format!(".{}", self.bit_offset));
        }
        text.push_str(&format!(":{}", self.plc_type));
        if let Some(len) = self.declared_length {
            text.push_str(&format!("({})", len));
        }
        text
    }

    /// unchecked
    #[inline]
    pub(crate) fn assemble(
        block_number: u16,
        byte_offset: u32,
        bit_offset: u8,
        plc_type: PlcType,
        declared_length: Option<u16>,
    ) -> Self {
        TagDescriptor {
            block_number,
            byte_offset,
            bit_offset,
            plc_type,
            declared_length,
        }
    }

    pub(crate) fn check(&self) -> std::result::Result<(), &'static str> {
        if self.bit_offset > 7 {
            return Err("bit offset out of range [0-7]");
        }
        if self.bit_offset != 0 && self.plc_type != PlcType::Bool {
            return Err("bit offset only valid for BOOL");
        }
        match (self.plc_type.max_length(), self.declared_length) {
            (Some(_), None) => Err("declared length required for string types"),
            (Some(_), Some(0)) => Err("declared length must be positive"),
            (Some(max), Some(len)) if len > max => Err("declared length exceeds capacity"),
            (None, Some(_)) => Err("declared length only valid for string types"),
            _ => Ok(()),
        }
    }

    /// data block number
    #[inline(always)]
    pub fn block_number(&self) -> u16 {
        self.block_number
    }

    /// starting byte within the block
    #[inline(always)]
    pub fn byte_offset(&self) -> u32 {
        self.byte_offset
    }

    /// bit within the byte, only meaningful for `BOOL`
    #[inline(always)]
    pub fn bit_offset(&self) -> u8 {
        self.bit_offset
    }

    /// declared type
    #[inline(always)]
    pub fn plc_type(&self) -> PlcType {
        self.plc_type
    }

    /// declared capacity of `STRING`/`WSTRING`, in characters
    #[inline(always)]
    pub fn declared_length(&self) -> Option<u16> {
        self.declared_length
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> u16 {
        self.declared_length.unwrap_or_default()
    }
}

impl fmt::Display for TagDescriptor {
    /// canonical address form, i.e. `%DB4:0.3:BOOL`, `%DB4:140:STRING(10)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%DB{}:{}", self.block_number, self.byte_offset)?;
        if self.plc_type == PlcType::Bool {
            write!(f, ".{}", self.bit_offset)?;
        }
        write!(f, ":{}", self.plc_type)?;
        if let Some(len) = self.declared_length {
            write!(f, "({})", len)?;
        }
        Ok(())
    }
}

/// region of a data block to fetch before decoding
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ByteSpan {
    /// starting byte
    pub offset: u32,
    /// number of bytes
    pub length: u32,
}

impl ByteSpan {
    /// new span
    #[inline(always)]
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    /// first byte past the span
    #[inline(always)]
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.length)
    }
}

impl fmt::Display for ByteSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.offset, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        for ty in PlcType::ALL {
            let parsed: PlcType = ty.name().parse().unwrap();
            assert_eq!(parsed, ty);
        }
        assert_eq!(
            "real".parse::<PlcType>(),
            Err(Error::UnknownType("real".to_owned()))
        );
    }

    #[test]
    fn test_fixed_width() {
        assert_eq!(PlcType::Bool.fixed_width(), Some(1));
        assert_eq!(PlcType::Date.fixed_width(), Some(2));
        assert_eq!(PlcType::TimeOfDay.fixed_width(), Some(4));
        assert_eq!(PlcType::LReal.fixed_width(), Some(8));
        assert_eq!(PlcType::WString.fixed_width(), None);
    }

    #[test]
    fn test_descriptor_invariants() {
        assert!(TagDescriptor::new(4, 0, 3, PlcType::Bool, None).is_ok());
        assert!(TagDescriptor::new(4, 0, 8, PlcType::Bool, None).is_err());
        assert!(TagDescriptor::new(4, 0, 1, PlcType::Int, None).is_err());
        assert!(TagDescriptor::new(4, 0, 0, PlcType::String, None).is_err());
        assert!(TagDescriptor::new(4, 0, 0, PlcType::String, Some(0)).is_err());
        assert!(TagDescriptor::new(4, 0, 0, PlcType::String, Some(255)).is_err());
        assert!(TagDescriptor::new(4, 0, 0, PlcType::WString, Some(255)).is_ok());
        assert!(TagDescriptor::new(4, 0, 0, PlcType::Word, Some(2)).is_err());
    }

    #[test]
    fn test_descriptor_error_names_fields() {
        let err = TagDescriptor::new(4, 0, 1, PlcType::Int, None).unwrap_err();
        assert_eq!(
            err,
            Error::MalformedAddress {
                address: "%DB4:0.1:INT".to_owned(),
                reason: "bit offset only valid for BOOL",
            }
        );
        let err = TagDescriptor::new(4, 2, 9, PlcType::Bool, None).unwrap_err();
        assert!(err.to_string().contains("%DB4:2.9:BOOL"), "{}", err);
        let err = TagDescriptor::new(4, 140, 0, PlcType::String, Some(300)).unwrap_err();
        assert!(err.to_string().contains("%DB4:140:STRING(300)"), "{}", err);
    }

    #[test]
    fn test_descriptor_display() {
        let tag = TagDescriptor::new(4, 0, 3, PlcType::Bool, None).unwrap();
        assert_eq!(tag.to_string(), "%DB4:0.3:BOOL");
        let tag = TagDescriptor::new(4, 140, 0, PlcType::String, Some(10)).unwrap();
        assert_eq!(tag.to_string(), "%DB4:140:STRING(10)");
        let tag = TagDescriptor::new(1, 8, 0, PlcType::TimeOfDay, None).unwrap();
        assert_eq!(tag.to_string(), "%DB1:8:TIME_OF_DAY");
    }

    #[test]
    fn test_span_end() {
        let span = ByteSpan::new(u32::MAX, 4);
        assert_eq!(span.end(), u64::from(u32::MAX) + 4);
        assert_eq!(ByteSpan::new(140, 12).to_string(), "[140..152)");
    }
}
