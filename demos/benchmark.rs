// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! runs the read benchmark against an in-memory PLC image.
//!
//! the scenario comes from `S7TAG_*` environment variables, i.e.
//! ```shell
//! S7TAG_CYCLES=20 S7TAG_CYCLE_TIME_MS=50 \
//! S7TAG_TAGS=$'%DB4:0.0:BOOL | boolean;true\n%DB4:46:REAL | float;3.141593' \
//! cargo run --example benchmark
//! ```
//! without `S7TAG_CYCLES` a built-in scenario is used.

use s7tag::futures::{Benchmark, MemoryTransport, ReadMode, Scenario, ENV_CYCLES};
use s7tag::plan::ReadPlanner;
use std::{env, sync::Arc, time::Duration};
use tokio::runtime::Runtime;

const DEFAULT_TAGS: &str = "
%DB4:0.0:BOOL        | boolean;true
%DB4:6:INT           | int;-42
%DB4:46:REAL         | float;3.141593
%DB4:140:STRING(10)  | string;hurz
%DB4:396:WSTRING(10) | string;hurz
";

fn plc_image() -> MemoryTransport {
    let transport = MemoryTransport::new().with_latency(Duration::from_millis(2));
    transport.write_block(4, 0, &[0b0000_0001]);
    transport.write_block(4, 6, &(-42_i16).to_be_bytes());
    transport.write_block(4, 46, &3.141593_f32.to_be_bytes());
    transport.write_block(4, 140, &[10, 4, b'h', b'u', b'r', b'z', 0, 0, 0, 0, 0, 0]);
    let mut wstring = vec![0, 10, 0, 4];
    for c in "hurz".encode_utf16() {
        wstring.extend_from_slice(&c.to_be_bytes());
    }
    wstring.resize(24, 0);
    transport.write_block(4, 396, &wstring);
    transport
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let scenario = if env::var(ENV_CYCLES).is_ok() {
        Scenario::from_env()?
    } else {
        Scenario::new(20, Duration::from_millis(50)).with_tags(DEFAULT_TAGS)?
    };
    println!(
        "Scenario: {} tags, {} cycles, {}ms intervals\n",
        scenario.tags().len(),
        scenario.num_cycles(),
        scenario.cycle_time().as_millis()
    );

    let rt = Runtime::new()?;
    rt.block_on(async move {
        let transport = Arc::new(plc_image());
        let runs = [
            ("single", ReadMode::Single),
            ("planned", ReadMode::Planned(ReadPlanner::default())),
        ];
        for (name, mode) in runs {
            println!("Running: '{}'", name);
            let bench = Benchmark::new(name, transport.clone(), scenario.clone()).mode(mode);
            let results = bench.run().await?;
            println!("  --> {}", results);
        }
        Ok(())
    })
}
