//! Benchmarks for the per-tick path
//!
//! - Snapshot computation (axis conversion, world hash, JSON)
//! - Encoding into the shared layout
//! - A full driver tick against the in-memory segment
//! - Launch URL message encode/decode
//!
//! Platform: Cross-platform (in-memory segment, CI-safe)

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use mumblelink::schema::LINKED_MEM_SIZE;
use mumblelink::test_utils::{player_at, sample_snapshot, world};
use mumblelink::{
    ClientConfig, LinkedMem, MumbleLink, MumbleUrlMessage, TickState, VoipClient, compute_snapshot,
};
use std::hint::black_box;

fn bench_compute_snapshot(c: &mut Criterion) {
    let config = ClientConfig::default();
    let player = player_at("Steve", 100.0, 70.0, -250.0);
    let overworld = world("minecraft:overworld");

    c.bench_function("compute_snapshot", |b| {
        b.iter(|| {
            let snapshot = compute_snapshot(black_box(&player), black_box(&overworld), &config)
                .expect("snapshot");
            black_box(snapshot)
        })
    });
}

fn bench_linked_mem_encoding(c: &mut Criterion) {
    let snapshot = sample_snapshot();

    let mut group = c.benchmark_group("linked_mem");
    group.throughput(Throughput::Bytes(LINKED_MEM_SIZE as u64));

    group.bench_function("from_snapshot", |b| {
        b.iter(|| black_box(LinkedMem::from_snapshot(black_box(&snapshot))))
    });

    let mem = LinkedMem::from_snapshot(&snapshot);
    group.bench_function("to_snapshot", |b| b.iter(|| black_box(black_box(&mem).to_snapshot())));

    group.finish();
}

fn bench_driver_tick(c: &mut Criterion) {
    let (mut driver, _backend) = MumbleLink::in_memory(ClientConfig::default());
    let state = TickState::in_world(player_at("Steve", 100.0, 70.0, -250.0), world("minecraft:overworld"));

    c.bench_function("driver_tick_in_memory", |b| {
        b.iter(|| {
            let status = driver.tick(black_box(&state));
            black_box(status.tick)
        })
    });
}

fn bench_url_message(c: &mut Criterion) {
    let message = MumbleUrlMessage {
        port: 64738,
        path: "/Minecraft/overworld".to_string(),
        query: "version=1.2.0".to_string(),
        ..MumbleUrlMessage::new(VoipClient::Mumble, "voice.example.com")
    };
    let encoded = message.encode().expect("encode");

    let mut group = c.benchmark_group("url_message");
    group.bench_function("encode", |b| b.iter(|| black_box(message.encode().expect("encode"))));
    group.bench_function("decode", |b| {
        b.iter(|| black_box(MumbleUrlMessage::decode(encoded.clone()).expect("decode")))
    });
    group.bench_function("to_uri", |b| b.iter(|| black_box(message.to_uri().expect("uri"))));
    group.finish();
}

criterion_group!(
    benches,
    bench_compute_snapshot,
    bench_linked_mem_encoding,
    bench_driver_tick,
    bench_url_message
);
criterion_main!(benches);
