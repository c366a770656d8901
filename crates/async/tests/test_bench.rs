use s7tag_async::{Benchmark, Error, MemoryTransport, ReadMode, Scenario, TagReader};
use s7tag_core::{parse, plan::ReadPlanner};
use std::{sync::Arc, time::Duration};

const TAGS: &str = "
    %DB4:0.0:BOOL        | boolean;true
    %DB4:2:BYTE          | BYTE;200
    %DB4:6:INT           | short;-42
    %DB4:8:DINT          | int;-123456
    %DB4:12:DATE         | date;1998-03-20
    %DB4:14:TIME_OF_DAY  | time_of_day;12:34:56.789
    %DB4:18:TIME         | time;PT1M30S
    %DB4:46:REAL         | float;3.141593
    %DB4:50:LREAL        | LREAL;2.718281828459045
    %DB4:60:CHAR         | char;S
    %DB4:140:STRING(10)  | string;hurz
    %DB1:0:WSTRING(10)   | WSTRING;Grüße
";

fn plc() -> MemoryTransport {
    let transport = MemoryTransport::new();
    transport.write_block(4, 0, &[0b0000_0001, 0, 200]);
    transport.write_block(4, 6, &(-42_i16).to_be_bytes());
    transport.write_block(4, 8, &(-123_456_i32).to_be_bytes());
    transport.write_block(4, 12, &3000_u16.to_be_bytes());
    transport.write_block(4, 14, &45_296_789_u32.to_be_bytes());
    transport.write_block(4, 18, &90_000_u32.to_be_bytes());
    transport.write_block(4, 46, &3.141593_f32.to_be_bytes());
    transport.write_block(4, 50, &2.718281828459045_f64.to_be_bytes());
    transport.write_block(4, 60, b"S");
    transport.write_block(4, 140, &[10, 4, b'h', b'u', b'r', b'z', 0, 0, 0, 0, 0, 0]);
    let mut wstring = vec![0, 10, 0, 5];
    for c in "Grüße".encode_utf16() {
        wstring.extend_from_slice(&c.to_be_bytes());
    }
    wstring.resize(24, 0);
    transport.write_block(1, 0, &wstring);
    transport
}

#[test]
fn test_benchmark_modes() -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let scenario = Scenario::new(3, Duration::from_millis(1)).with_tags(TAGS)?;
        assert_eq!(scenario.tags().len(), 12);
        let transport = Arc::new(plc());

        let results = Benchmark::new("single", transport.clone(), scenario.clone())
            .run()
            .await?;
        assert_eq!(results.read_times.len(), 3);
        let single = transport.round_trips();
        assert_eq!(single, 3 * 12);

        let results = Benchmark::new("planned", transport.clone(), scenario)
            .mode(ReadMode::Planned(ReadPlanner::default()))
            .run()
            .await?;
        assert_eq!(results.read_times.len(), 3);
        // one request per data block
        assert_eq!(transport.round_trips() - single, 3 * 2);
        assert!(!transport.is_connected());
        Ok(())
    })
}

#[test]
fn test_benchmark_reports_first_mismatch() -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let scenario = Scenario::new(5, Duration::ZERO)
            .with_tags(TAGS)?
            .tag("%DB4:140:STRING(10)", "string;hurz!")?;
        let err = Benchmark::new("mismatch", plc(), scenario)
            .run()
            .await
            .unwrap_err();
        match err {
            Error::Mismatch { name, actual, .. } => {
                assert_eq!(name, "tag-11");
                assert_eq!(actual, "hurz");
            }
            other => panic!("unexpected {:?}", other),
        }
        Ok(())
    })
}

#[test]
fn test_read_with_latency_is_concurrent() -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let transport = plc().with_latency(Duration::from_millis(20));
        let reader = TagReader::new(transport);
        reader.connect().await?;
        let tags: Vec<_> = (0..10)
            .map(|i| (i, parse("%DB4:6:INT").unwrap()))
            .collect();
        let start = std::time::Instant::now();
        let values = reader.read_tags(&tags).await;
        assert!(values.iter().all(|(_, v)| v.is_ok()));
        // reads are joined, not sequential
        assert!(start.elapsed() < Duration::from_millis(20 * 10));
        Ok(())
    })
}
