use criterion::{criterion_group, criterion_main, Criterion};
use s7tag::{
    futures::{MemoryTransport, TagReader},
    parse,
};

fn bench_read(c: &mut Criterion) {
    c.bench_function("async read", |b| {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let reader = rt.block_on(async {
            let transport = MemoryTransport::new();
            transport.write_block(4, 6, &1234_i16.to_be_bytes());
            let reader = TagReader::new(transport);
            reader.connect().await.unwrap();
            reader
        });
        let tag = parse("%DB4:6:INT").unwrap();
        let (reader, tag) = (&reader, &tag);
        b.to_async(rt).iter(|| async move {
            let value = reader.read_tag(tag).await.unwrap();
            assert_eq!(value.as_i64(), Some(1234));
        })
    });
}

criterion_group!(benches, bench_read);
criterion_main!(benches);
