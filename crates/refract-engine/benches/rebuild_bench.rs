//! Criterion benchmarks for graph rebuilds and block rendering
//!
//! Run with: cargo bench -p refract-engine
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use refract_core::StereoSamples;
use refract_engine::{Engine, EngineConfig};
use refract_io::{MemorySink, SourceTrack};

const ACTIVE_SETS: &[(&str, &[u16])] = &[
    ("empty", &[]),
    ("basic", &[1, 5, 8]),
    ("modulated", &[19, 21, 28, 29, 30]),
    ("heavy", &[22, 24, 26, 36, 45, 50]),
];

fn loaded_engine() -> Engine {
    let config = EngineConfig::default()
        .with_start_suspended(false)
        .with_seed(1);
    let mut engine = Engine::new(config, MemorySink::new()).unwrap();
    let tone: Vec<f32> = (0..480_000).map(|i| (i as f32 * 0.02).sin() * 0.5).collect();
    engine
        .load(SourceTrack::new("bench.wav", StereoSamples::from_mono(tone), 48000))
        .unwrap();
    engine
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rebuild");
    for (name, ids) in ACTIVE_SETS {
        let mut engine = loaded_engine();
        for &id in *ids {
            engine.toggle_transform(id).unwrap();
        }
        group.bench_function(BenchmarkId::new("rebuild", name), |b| {
            b.iter(|| black_box(engine.rebuild().unwrap()));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("Render");
    let block = 512;
    group.throughput(Throughput::Elements(block as u64));
    for (name, ids) in ACTIVE_SETS {
        let mut engine = loaded_engine();
        for &id in *ids {
            engine.toggle_transform(id).unwrap();
        }
        engine.toggle_play().unwrap();
        let mut left = vec![0.0; block];
        let mut right = vec![0.0; block];
        group.bench_function(BenchmarkId::new("block", name), |b| {
            b.iter(|| {
                if !engine.is_playing() {
                    engine.toggle_play().unwrap();
                }
                black_box(engine.render(&mut left, &mut right))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_render);
criterion_main!(benches);
