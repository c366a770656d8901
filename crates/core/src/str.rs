// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! text helpers for S7 character payloads

use crate::{Error, Result};

/// widen each Latin-1 byte to its unicode scalar
#[inline]
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// decode `count` big-endian UTF-16 code units starting at `offset`
///
/// unpaired surrogates are rejected
pub fn utf16be_to_string(buf: &[u8], offset: usize, count: usize) -> Result<String> {
    let end = count
        .checked_mul(2)
        .and_then(|n| offset.checked_add(n))
        .unwrap_or(usize::MAX);
    if buf.len() < end {
        return Err(Error::BufferTooShort {
            required: end,
            actual: buf.len(),
        });
    }
    let units = buf[offset..end]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| {
            Error::DecodeError(format!(
                "unpaired surrogate 0x{:04X} in UTF-16 text",
                e.unpaired_surrogate()
            ))
        })
}

/// single UTF-16 code unit as a one character string
#[inline]
pub fn utf16_unit_to_string(unit: u16) -> Result<String> {
    char::from_u32(u32::from(unit))
        .map(String::from)
        .ok_or_else(|| Error::DecodeError(format!("lone surrogate 0x{:04X} in WCHAR", unit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1() {
        assert_eq!(latin1_to_string(b"hurz"), "hurz");
        assert_eq!(latin1_to_string(&[0xE4, 0xF6, 0xFC]), "äöü");
    }

    #[test]
    fn test_utf16be() {
        let buf = [0x00, 0x68, 0x00, 0xFC, 0xD8, 0x3D, 0xDE, 0x00];
        assert_eq!(utf16be_to_string(&buf, 0, 2).unwrap(), "hü");
        assert_eq!(utf16be_to_string(&buf, 0, 4).unwrap(), "hü😀");
        assert!(utf16be_to_string(&buf, 4, 1).is_err());
        assert!(utf16be_to_string(&buf, 2, 4).is_err());
    }

    #[test]
    fn test_utf16be_overflow() {
        let buf = [0x00, 0x68];
        let err = utf16be_to_string(&buf, usize::MAX, 1).unwrap_err();
        assert_eq!(
            err,
            Error::BufferTooShort {
                required: usize::MAX,
                actual: 2
            }
        );
        assert!(utf16be_to_string(&buf, 0, usize::MAX).is_err());
        assert!(utf16be_to_string(&buf, 1, usize::MAX / 2).is_err());
    }

    #[test]
    fn test_utf16_unit() {
        assert_eq!(utf16_unit_to_string(0x0041).unwrap(), "A");
        assert!(utf16_unit_to_string(0xD800).is_err());
    }
}
