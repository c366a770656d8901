// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

#[doc(inline)]
pub use s7tag_core::*;

#[cfg(feature = "async")]
#[doc(inline)]
pub use s7tag_async as futures;
