// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

/*!
# s7tag-async

tokio based tag reading and benchmark harness for `s7tag`.

[![license](https://img.shields.io/crates/l/s7tag.svg)](https://github.com/joylei/s7tag-rs/blob/master/LICENSE)

## How to use

Add `s7tag-async` to your Cargo.toml

```toml
[dependencies]
s7tag-async= "0.1"
```

## Examples

```rust
use s7tag_async::{MemoryTransport, TagReader};
use tokio::runtime;

let rt = runtime::Runtime::new().unwrap();
rt.block_on(async {
    let transport = MemoryTransport::new();
    // seed data block 4: INT 42 at offset 6
    transport.write_block(4, 6, &[0x00, 0x2A]);

    let reader = TagReader::new(transport);
    reader.connect().await.unwrap();
    let tag = "%DB4:6:INT".parse().unwrap();
    let value = reader.read_tag(&tag).await.unwrap();
    assert_eq!(value.as_i64(), Some(42));
});
```

## Thread-safety

It's thread-safe to perform operations with `s7tag-async`, as long as the [`Transport`] is.

## License

MIT

*/
#![warn(missing_docs)]

extern crate s7tag_core;
extern crate tokio;
#[macro_use]
extern crate log;
#[macro_use]
extern crate async_trait;

mod bench;
mod config;
mod expected;
mod reader;
mod transport;

pub use bench::{BenchResults, Benchmark, ReadMode};
pub use config::{
    Scenario, TagSpec, ENV_CYCLES, ENV_CYCLE_TIME, ENV_HOST, ENV_RACK, ENV_SLOT, ENV_TAGS,
    ENV_TAGS_FILE,
};
pub use expected::ExpectedValue;
pub use reader::TagReader;
pub use transport::{MemoryTransport, Transport};

use std::fmt;

/// result for [`s7tag-async`]
pub type Result<T> = std::result::Result<T, Error>;

/// errors for [`s7tag-async`]
#[derive(Debug)]
pub enum Error {
    /// address or decode error
    Codec(s7tag_core::Error),
    /// transport failure, i.e. connection lost or read rejected
    Transport(String),
    /// invalid scenario
    Config(String),
    /// reading a named tag failed
    Tag {
        /// tag name
        name: String,
        /// tag address
        address: String,
        /// cause
        source: Box<Error>,
    },
    /// decoded value differs from the expected one
    Mismatch {
        /// tag name
        name: String,
        /// tag address
        address: String,
        /// expected value
        expected: String,
        /// decoded value
        actual: String,
    },
}

impl Error {
    /// transport error
    #[inline]
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// config error
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Codec(e) => Some(e),
            Error::Tag { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Codec(e) => write!(f, "{}", e),
            Error::Transport(e) => write!(f, "TransportError - {}", e),
            Error::Config(e) => write!(f, "ConfigError - {}", e),
            Error::Tag {
                name,
                address,
                source,
            } => write!(f, "tag {} ({}): {}", name, address, source),
            Error::Mismatch {
                name,
                address,
                expected,
                actual,
            } => write!(
                f,
                "tag {} ({}): expected {}, got {}",
                name, address, expected, actual
            ),
        }
    }
}

impl From<s7tag_core::Error> for Error {
    fn from(e: s7tag_core::Error) -> Self {
        Error::Codec(e)
    }
}
