use bytes::BytesMut;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use gss_server_codec::{FRAME_SIZE, FrameType, NetFrame, Vertex};

fn criterion_benchmark(c: &mut Criterion) {
    let frame = NetFrame::new(FrameType::Data, Vertex::Client, Vertex::RoofUhf, &[0xAB; 256])
        .expect("payload fits the fixed buffer");

    let mut bytes = BytesMut::with_capacity(FRAME_SIZE);
    frame.encode(&mut bytes);

    let mut frame_criterion = c.benchmark_group("frame");

    frame_criterion.throughput(Throughput::Elements(1));
    frame_criterion.bench_function("encode", |bencher| {
        let mut buffer = BytesMut::with_capacity(FRAME_SIZE);
        bencher.iter(|| {
            frame.encode(&mut buffer);
        })
    });

    frame_criterion.bench_function("decode_validate", |bencher| {
        bencher.iter(|| {
            NetFrame::decode(&bytes).unwrap().validate().unwrap();
        })
    });

    frame_criterion.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
