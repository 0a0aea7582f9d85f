//! # Codec Benchmarks
//!
//! Multipart encode/decode throughput across payload sizes, plus one full
//! inbound dispatch.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ids_messaging::{MessageDispatcher, MultipartCodec, MultipartEnvelope};
use ids_tests::integration::fixtures::{provider_builder, provider_identity};
use ids_types::{MessageHeader, MessageType};
use std::sync::Arc;

fn header_bytes() -> Vec<u8> {
    let header = MessageHeader::builder(MessageType::ArtifactRequest)
        .issuer_connector("https://consumer.example/")
        .sender_agent("https://consumer.example/agent")
        .requested_artifact("https://provider.example/artifact/weather")
        .build()
        .expect("valid header");
    serde_json::to_vec(&header).expect("serializable header")
}

fn bench_multipart(c: &mut Criterion) {
    let mut group = c.benchmark_group("multipart-codec");
    let codec = MultipartCodec::new();
    let header = Bytes::from(header_bytes());

    for size in [0usize, 1024, 64 * 1024, 1024 * 1024] {
        let payload: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        let envelope = MultipartEnvelope::new(header.clone()).with_payload(payload);
        let encoded = codec.encode(&envelope).expect("encodable");

        group.throughput(Throughput::Bytes(encoded.body.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &envelope, |b, env| {
            b.iter(|| black_box(codec.encode(env).expect("encodable")))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded.body, |b, body| {
            b.iter(|| black_box(codec.decode(body).expect("decodable")))
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let dispatcher: MessageDispatcher = provider_builder(Arc::default()).build();
    let body = MultipartCodec::new()
        .encode(&MultipartEnvelope::new(header_bytes()))
        .expect("encodable")
        .body;

    assert_eq!(dispatcher.identity(), &provider_identity());

    c.bench_function("dispatch-artifact-request", |b| {
        b.iter(|| runtime.block_on(async { black_box(dispatcher.dispatch(&body).await) }))
    });
}

criterion_group!(benches, bench_multipart, bench_dispatch);
criterion_main!(benches);
