//! Per-value detector throughput benchmark
//!
//! Every detector sits in the hot loop of an online learner, so `input()`
//! has to stay cheap: amortized O(1) for the simple and repository
//! detectors, O(log W) for ADWIN.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench detector_throughput
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use driftwatch::config::{DetectorConfig, DETECTOR_KINDS};
use driftwatch::ensemble::{EnsembleConfig, VotingPolicy};
use driftwatch::stream::BernoulliStream;
use driftwatch::window::{Adwin, AdwinConfig};

const STREAM_LEN: usize = 20_000;

fn drifting_stream() -> Vec<f64> {
    BernoulliStream::abrupt(0.1, 0.4, STREAM_LEN as u64 / 2, 42)
        .take(STREAM_LEN)
        .collect()
}

/// Benchmark: one pass over a drifting stream, per detector
fn bench_detector_pass(c: &mut Criterion) {
    let values = drifting_stream();
    let mut group = c.benchmark_group("detector_pass");
    group.throughput(Throughput::Elements(STREAM_LEN as u64));

    for &kind in DETECTOR_KINDS.iter().filter(|&&k| k != "ensemble") {
        let config = match DetectorConfig::default_for(kind) {
            Ok(config) => config,
            Err(_) => continue,
        };
        group.bench_with_input(BenchmarkId::from_parameter(kind), &values, |b, values| {
            b.iter(|| {
                let mut detector = config.build().unwrap();
                black_box(detector.input_all(black_box(values)))
            });
        });
    }

    group.finish();
}

/// Benchmark: ensemble fan-out cost
fn bench_ensemble(c: &mut Criterion) {
    let values = drifting_stream();
    let config = DetectorConfig::Ensemble(EnsembleConfig {
        children: ["ddm", "hddm_a", "adwin"]
            .iter()
            .filter_map(|kind| DetectorConfig::default_for(kind).ok())
            .collect(),
        policy: VotingPolicy::Majority,
    });

    c.bench_function("ensemble_pass", |b| {
        b.iter(|| {
            let mut detector = config.build().unwrap();
            black_box(detector.input_all(black_box(&values)))
        });
    });
}

/// Benchmark: ADWIN update with varying check clocks
///
/// clock = 1 searches for a cut after every insertion.
fn bench_adwin_clock(c: &mut Criterion) {
    let values = drifting_stream();
    let mut group = c.benchmark_group("adwin_clock");

    for clock in [1usize, 8, 32, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(clock), &clock, |b, &clock| {
            b.iter(|| {
                let mut adwin = Adwin::new(AdwinConfig {
                    clock,
                    ..Default::default()
                })
                .unwrap();
                for &v in &values {
                    black_box(adwin.update(v));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detector_pass, bench_ensemble, bench_adwin_clock);
criterion_main!(benches);
