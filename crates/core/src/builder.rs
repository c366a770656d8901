// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! builder for tag addresses

use crate::{PlcType, TagDescriptor};
use core::fmt;

type Result<T> = std::result::Result<T, Error>;

/// address builder error
#[derive(Debug)]
pub struct Error(&'static str);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Error {}

/// builder to build tag addresses
///
/// # Examples
/// ```rust
/// use s7tag_core::builder::*;
/// use s7tag_core::PlcType;
///
/// let address = AddressBuilder::default()
///     .block(4)
///     .byte_offset(140)
///     .plc_type(PlcType::String)
///     .declared_length(10)
///     .build()
///     .unwrap();
/// assert_eq!(address, "%DB4:140:STRING(10)");
/// ```
#[derive(Default, Debug, Clone)]
pub struct AddressBuilder {
    block: Option<u16>,
    byte_offset: Option<u32>,
    bit_offset: Option<u8>,
    plc_type: Option<PlcType>,
    declared_length: Option<u16>,
}

impl AddressBuilder {
    /// Required. data block number
    #[inline]
    pub fn block(&mut self, block: u16) -> &mut Self {
        self.block = Some(block);
        self
    }

    /// Required. starting byte within the data block
    #[inline]
    pub fn byte_offset(&mut self, offset: u32) -> &mut Self {
        self.byte_offset = Some(offset);
        self
    }

    /// Required for `BOOL`, must not be set for other types. bit within the byte, [0-7]
    #[inline]
    pub fn bit_offset(&mut self, bit: u8) -> &mut Self {
        self.bit_offset = Some(bit);
        self
    }

    /// Required. PLC data type
    #[inline]
    pub fn plc_type(&mut self, plc_type: PlcType) -> &mut Self {
        self.plc_type = Some(plc_type);
        self
    }

    /// Required for `STRING`/`WSTRING`, must not be set for other types.
    /// capacity in characters
    #[inline]
    pub fn declared_length(&mut self, len: u16) -> &mut Self {
        self.declared_length = Some(len);
        self
    }

    /// check required attributes or conflict attributes
    fn check(&self) -> Result<()> {
        if self.block.is_none() {
            return Err(Error("block required"));
        }
        if self.byte_offset.is_none() {
            return Err(Error("byte offset required"));
        }
        let plc_type = match self.plc_type {
            Some(v) => v,
            None => return Err(Error("plc type required")),
        };
        match (plc_type, self.bit_offset) {
            (PlcType::Bool, None) => return Err(Error("bit offset required for BOOL")),
            (PlcType::Bool, _) => {}
            (_, Some(_)) => return Err(Error("bit offset only valid for BOOL")),
            _ => {}
        }
        self.assemble().check().map_err(Error)
    }

    #[inline]
    fn assemble(&self) -> TagDescriptor {
        TagDescriptor::assemble(
            self.block.unwrap_or_default(),
            self.byte_offset.unwrap_or_default(),
            self.bit_offset.unwrap_or_default(),
            self.plc_type.unwrap_or(PlcType::Byte),
            self.declared_length,
        )
    }

    /// build tag descriptor
    pub fn descriptor(&self) -> Result<TagDescriptor> {
        self.check()?;
        Ok(self.assemble())
    }

    /// build canonical address string, parseable by [`parse`](crate::parse)
    pub fn build(&self) -> Result<String> {
        Ok(self.descriptor()?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_bool_builder() {
        let address = AddressBuilder::default()
            .block(4)
            .byte_offset(0)
            .bit_offset(3)
            .plc_type(PlcType::Bool)
            .build()
            .unwrap();
        assert_eq!(address, "%DB4:0.3:BOOL");
        assert_eq!(parse(&address).unwrap().bit_offset(), 3);
    }

    #[test]
    fn test_string_builder() {
        let tag = AddressBuilder::default()
            .block(4)
            .byte_offset(396)
            .plc_type(PlcType::WString)
            .declared_length(10)
            .descriptor()
            .unwrap();
        assert_eq!(tag, parse("%DB4:396:WSTRING(10)").unwrap());
    }

    #[test]
    fn test_builder_errors() {
        let err = AddressBuilder::default()
            .byte_offset(0)
            .plc_type(PlcType::Int)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "block required");

        let err = AddressBuilder::default()
            .block(1)
            .byte_offset(0)
            .plc_type(PlcType::Bool)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "bit offset required for BOOL");

        let err = AddressBuilder::default()
            .block(1)
            .byte_offset(0)
            .bit_offset(1)
            .plc_type(PlcType::Int)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "bit offset only valid for BOOL");

        let err = AddressBuilder::default()
            .block(1)
            .byte_offset(0)
            .plc_type(PlcType::String)
            .declared_length(300)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "declared length exceeds capacity");

        let err = AddressBuilder::default()
            .block(1)
            .byte_offset(0)
            .plc_type(PlcType::Word)
            .declared_length(2)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "declared length only valid for string types");
    }
}
