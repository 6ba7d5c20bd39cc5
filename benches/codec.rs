//! Benchmark encode/decode throughput over a synthetic track library

use bplist_codec::{decode, encode, Value};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn build_library(tracks: usize) -> Value {
    let track_list: Vec<Value> = (0..tracks)
        .map(|id| {
            Value::Dict(vec![
                ("Track ID".to_string(), Value::Int(id as i64)),
                ("Name".to_string(), Value::Text(format!("Track {id}"))),
                ("Artist".to_string(), Value::Text("Example Artist".into())),
                ("Total Time".to_string(), Value::Int(183_000 + id as i64)),
                ("Rating".to_string(), Value::Int((id % 100) as i64)),
                ("Sample Rate".to_string(), Value::Real(44100.0)),
                ("Clean".to_string(), Value::Bool(id % 2 == 0)),
                (
                    "Date Added".to_string(),
                    Value::timestamp_from_unix(1_391_213_400.0 + id as f64),
                ),
            ])
        })
        .collect();
    Value::Dict(vec![
        ("Major Version".to_string(), Value::Int(1)),
        ("Tracks".to_string(), Value::Array(track_list)),
    ])
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for tracks in [10usize, 100, 1000] {
        let library = build_library(tracks);
        group.bench_with_input(BenchmarkId::from_parameter(tracks), &library, |b, lib| {
            b.iter(|| {
                let bytes = encode(lib).unwrap();
                criterion::black_box(bytes);
            })
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for tracks in [10usize, 100, 1000] {
        let bytes = encode(&build_library(tracks)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(tracks), &bytes, |b, bytes| {
            b.iter(|| {
                let value = decode(bytes).unwrap();
                criterion::black_box(value);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
