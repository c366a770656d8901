// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use std::{error::Error as StdError, fmt};

/// classification of [`Error`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// address string does not match the grammar
    MalformedAddress,
    /// type token not in the closed set of [`PlcType`](crate::PlcType)s
    UnknownType,
    /// recognized but not decodable, i.e. `[count]` arrays
    UnsupportedType,
    /// buffer smaller than the span required by the tag
    BufferTooShort,
    /// content of the buffer can not be interpreted
    DecodeError,
}

/// parse & decode errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// address string does not match `%DB<n>:<offset>[.<bit>]:<TYPE>[(<len>)]`
    MalformedAddress {
        /// the offending address
        address: String,
        /// what was wrong with it
        reason: &'static str,
    },
    /// type token is not one of the known PLC types
    UnknownType(String),
    /// type is recognized lexically but not decoded
    UnsupportedType(String),
    /// supplied buffer is smaller than the required span
    BufferTooShort {
        /// bytes required
        required: usize,
        /// bytes supplied
        actual: usize,
    },
    /// type specific content can not be interpreted
    DecodeError(String),
}

impl Error {
    #[inline]
    pub(crate) fn malformed(address: impl Into<String>, reason: &'static str) -> Self {
        Error::MalformedAddress {
            address: address.into(),
            reason,
        }
    }

    /// error classification
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedAddress { .. } => ErrorKind::MalformedAddress,
            Error::UnknownType(_) => ErrorKind::UnknownType,
            Error::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Error::BufferTooShort { .. } => ErrorKind::BufferTooShort,
            Error::DecodeError(_) => ErrorKind::DecodeError,
        }
    }

    /// error raised by the address parser?
    #[inline]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedAddress | ErrorKind::UnknownType | ErrorKind::UnsupportedType
        )
    }

    /// error raised by the decoder?
    #[inline]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::BufferTooShort | ErrorKind::DecodeError
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedAddress { address, reason } => {
                write!(f, "malformed address `{}`: {}", address, reason)
            }
            Error::UnknownType(ty) => write!(f, "unknown plc type `{}`", ty),
            Error::UnsupportedType(ty) => write!(f, "unsupported plc type `{}`", ty),
            Error::BufferTooShort { required, actual } => write!(
                f,
                "buffer too short: {} bytes required, {} supplied",
                required, actual
            ),
            Error::DecodeError(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        let err = Error::malformed("%DBx:0:INT", "block number is not a non-negative integer");
        assert_eq!(err.kind(), ErrorKind::MalformedAddress);
        assert!(err.is_parse_error());
        assert!(!err.is_decode_error());

        let err = Error::BufferTooShort {
            required: 4,
            actual: 2,
        };
        assert!(err.is_decode_error());
        assert_eq!(
            err.to_string(),
            "buffer too short: 4 bytes required, 2 supplied"
        );
    }
}
