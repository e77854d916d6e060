//! Criterion benchmarks for refract stage processors
//!
//! Run with: cargo bench -p refract-effects
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use refract_core::Effect;
use refract_effects::{
    Compressor, Decimator, Ensemble, FeedbackDelay, Filter, Phaser, Reverb, ReverbType,
    ReverseDelay,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[128, 512, 2048];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_effect<E: Effect>(c: &mut Criterion, name: &str, mut effect: E) {
    effect.set_sample_rate(SAMPLE_RATE);
    let mut group = c.benchmark_group(name);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut left = input.clone();
                let mut right = input.clone();
                b.iter(|| {
                    left.copy_from_slice(&input);
                    right.copy_from_slice(&input);
                    effect.process_block_stereo(black_box(&mut left), black_box(&mut right));
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_effects(c: &mut Criterion) {
    bench_effect(c, "Filter", Filter::low_pass(1000.0));
    bench_effect(c, "Compressor", Compressor::new(-18.0, 4.0, 6.0));
    bench_effect(c, "FeedbackDelay", FeedbackDelay::new(300.0, 0.4, 0.35));
    bench_effect(c, "Ensemble", Ensemble::new(3, 4.0, 0.5));
    bench_effect(c, "Reverb", Reverb::new(ReverbType::Hall, 0.4));
    bench_effect(c, "Phaser", Phaser::new(0.5, 0.7));
    bench_effect(c, "Decimator", Decimator::new(8, 4));
    bench_effect(c, "ReverseDelay", ReverseDelay::new(250.0, 0.5));
}

criterion_group!(benches, bench_effects);
criterion_main!(benches);
