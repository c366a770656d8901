// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

/*!
# s7tag-core

Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.

[![license](https://img.shields.io/crates/l/s7tag.svg)](https://github.com/joylei/s7tag-rs/blob/master/LICENSE)

## How to use

Add `s7tag-core` to your Cargo.toml

```toml
[dependencies]
s7tag-core= "0.1"
```

## Examples

### parse address & decode value

```rust
use s7tag_core::{decode, parse, required_span, DecodedValue};

let tag = parse("%DB4:140:STRING(10)").unwrap();
let span = required_span(&tag);
assert_eq!((span.offset, span.length), (140, 12));

// bytes fetched from data block 4, starting at offset 140
let buf = [10, 4, b'h', b'u', b'r', b'z', 0, 0, 0, 0, 0, 0];
let value = decode(&tag, &buf).unwrap();
assert_eq!(value, DecodedValue::String("hurz".into()));
```

### More examples

please take a look at [examples](../../demos/)

## Address format

`%DB<block>:<byte>[.<bit>]:<TYPE>[(<len>)]`

- `.bit` is required for `BOOL` and forbidden otherwise
- `(len)` is required for `STRING`/`WSTRING` and forbidden otherwise
- multi-byte values are big-endian

## License

MIT

*/
#![warn(missing_docs)]

#[macro_use]
extern crate log;

mod address;
#[cfg(feature = "builder")]
pub mod builder;
mod codec;
mod error;
#[cfg(feature = "plan")]
pub mod plan;
pub mod str;
mod types;
mod value;

/// s7tag result
pub type Result<T> = std::result::Result<T, Error>;

pub use address::parse;
pub use codec::{decode, required_span};
pub use error::{Error, ErrorKind};
pub use types::{ByteSpan, PlcType, TagDescriptor, STRING_MAX_LENGTH, WSTRING_MAX_LENGTH};
pub use value::{get_bit, DecodedValue, Decoder};

/// big-endian getters, i.e. `get_u16`, `get_f32`
pub mod getters {
    pub use crate::value::{
        get_bit, get_f32, get_f64, get_i16, get_i32, get_i64, get_i8, get_u16, get_u32, get_u64,
        get_u8,
    };
}
