// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use s7tag::{decode, parse, required_span};

fn main() {
    let tag = parse("%DB4:140:STRING(10)").unwrap(); // YOUR TAG ADDRESS
    let span = required_span(&tag);
    println!("fetch DB{} {}", tag.block_number(), span);

    // bytes as returned by the PLC for that span
    let buf = [10, 4, b'h', b'u', b'r', b'z', 0, 0, 0, 0, 0, 0];
    let value = decode(&tag, &buf).unwrap();
    println!("tag value: {}", value);
    assert_eq!(value.as_str(), Some("hurz"));

    let tag = parse("%DB4:0.3:BOOL").unwrap();
    let value = decode(&tag, &[0b0000_1000]).unwrap();
    println!("{} = {}", tag, value);
}
