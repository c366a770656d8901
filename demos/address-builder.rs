// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use s7tag::{builder::*, parse, PlcType};

fn main() {
    let address = AddressBuilder::default()
        .block(4)
        .byte_offset(396)
        .plc_type(PlcType::WString)
        .declared_length(10)
        .build()
        .unwrap();
    println!("address: {}", address);

    let tag = parse(&address).unwrap();
    assert_eq!(tag.declared_length(), Some(10));

    let res = AddressBuilder::default()
        .block(4)
        .byte_offset(0)
        .plc_type(PlcType::Bool)
        .build();
    assert!(res.is_err());
    println!("error: {}", res.unwrap_err());
}
