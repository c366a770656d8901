// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use s7tag::{
    futures::{MemoryTransport, TagReader},
    parse,
    plan::ReadPlanner,
};
use tokio::runtime::Runtime;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let rt = Runtime::new()?;
    rt.block_on(async move {
        let transport = MemoryTransport::new();
        transport.write_block(4, 0, &[0b0000_0001]);
        transport.write_block(4, 6, &(-42_i16).to_be_bytes());
        transport.write_block(4, 46, &3.141593_f32.to_be_bytes());
        transport.write_block(4, 140, &[10, 4, b'h', b'u', b'r', b'z', 0, 0, 0, 0, 0, 0]);

        let reader = TagReader::new(transport);
        reader.connect().await?;

        let tags = vec![
            ("flag", parse("%DB4:0.0:BOOL")?),
            ("counter", parse("%DB4:6:INT")?),
            ("pi", parse("%DB4:46:REAL")?),
            ("name", parse("%DB4:140:STRING(10)")?),
            ("missing", parse("%DB9:0:INT")?),
        ];
        for (name, value) in reader.read_tags(&tags).await {
            match value {
                Ok(v) => println!("{} = {}", name, v),
                Err(e) => println!("{} failed: {}", name, e),
            }
        }

        let values = reader
            .read_tags_planned(&ReadPlanner::default(), &tags)
            .await;
        println!(
            "planned read: {} tags in {} round trips total",
            values.len(),
            reader.transport().round_trips()
        );
        reader.disconnect().await?;
        Ok(())
    })
}
