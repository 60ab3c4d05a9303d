// Tests for the windowed detectors
//
// Focus on the structural guarantees (bucket accounting, logarithmic memory)
// as much as on detection behaviour.

use super::*;
use crate::detector::ChangeDetector;
use crate::stream::BernoulliStream;

fn zeros_then_ones(n: usize) -> Vec<f64> {
    let mut values = vec![0.0; n];
    values.extend(vec![1.0; n]);
    values
}

fn log2_floor(n: usize) -> usize {
    (usize::BITS - 1 - n.max(1).leading_zeros()) as usize
}

#[test]
fn test_adwin_detects_switch_before_1100() {
    let mut adwin = AdwinDetector::new(AdwinConfig::default()).unwrap();
    let values = zeros_then_ones(1000);
    let mut first_change = None;
    for (i, &v) in values.iter().enumerate() {
        adwin.input(v);
        if adwin.is_change() && first_change.is_none() {
            first_change = Some(i + 1);
        }
    }
    let at = first_change.expect("ADWIN missed the switch");
    assert!(at > 1000 && at < 1100, "first change at instance {}", at);
    assert!(adwin.estimation() > 0.9, "estimation {}", adwin.estimation());
    assert!(adwin.detections() >= 1);
}

#[test]
fn test_adwin_bucket_counts_sum_to_width() {
    let mut adwin = Adwin::new(AdwinConfig::default()).unwrap();
    for (i, v) in BernoulliStream::abrupt(0.2, 0.7, 3000, 11)
        .take(6000)
        .enumerate()
    {
        adwin.update(v);
        if i % 97 == 0 {
            let counted: usize = adwin.buckets().map(|b| b.count).sum();
            assert_eq!(counted, adwin.width());
            assert_eq!(adwin.buckets().count(), adwin.bucket_count());
        }
    }
}

#[test]
fn test_adwin_memory_is_logarithmic() {
    let config = AdwinConfig::default();
    let per_row = config.max_buckets + 1;
    let mut adwin = Adwin::new(config).unwrap();
    for v in BernoulliStream::stationary(0.1, 3).take(100_000) {
        adwin.update(v);
        let bound = per_row * (log2_floor(adwin.width()) + 2);
        assert!(
            adwin.bucket_count() <= bound,
            "{} buckets for width {}",
            adwin.bucket_count(),
            adwin.width()
        );
    }
    assert!(adwin.max_bucket_count() <= per_row * (log2_floor(100_000) + 2));
}

#[test]
fn test_adwin_buckets_grow_toward_the_past() {
    let mut adwin = Adwin::new(AdwinConfig::default()).unwrap();
    for _ in 0..1000 {
        adwin.update(0.5);
    }
    let sizes: Vec<usize> = adwin.buckets().map(|b| b.count).collect();
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
    assert!(sizes.iter().all(|s| s.is_power_of_two()));
    assert_eq!(adwin.width(), 1000);
}

#[test]
fn test_adwin_variance_matches_window() {
    let mut adwin = Adwin::new(AdwinConfig::default()).unwrap();
    let values: Vec<f64> = (0..500).map(|i| ((i * 7) % 11) as f64 / 10.0).collect();
    for &v in &values {
        adwin.update(v);
    }
    assert_eq!(adwin.width(), 500);
    let mean = values.iter().sum::<f64>() / 500.0;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / 500.0;
    assert!((adwin.variance() - var).abs() < 1e-9);
    assert!((adwin.estimation() - mean).abs() < 1e-12);
}

#[test]
fn test_adwin_decrease_truncates_without_signal() {
    let mut adwin = AdwinDetector::new(AdwinConfig::default()).unwrap();
    let mut values = vec![1.0; 1000];
    values.extend(vec![0.0; 1000]);
    assert_eq!(adwin.input_all(&values), 0);
    assert!(adwin.detections() >= 1);
    assert!(adwin.width() < 2000);
}

#[test]
fn test_adwin_stationary_false_positive_rate() {
    let n = 20_000;
    for seed in 0..3 {
        let mut adwin = AdwinDetector::new(AdwinConfig::default()).unwrap();
        let values: Vec<f64> = BernoulliStream::stationary(0.1, seed).take(n).collect();
        let changes = adwin.input_all(&values);
        assert!((changes as f64 / n as f64) < 0.002, "seed {}: {}", seed, changes);
    }
}

#[test]
fn test_seed_detects_switch() {
    let mut seed = Seed::new(SeedConfig::default()).unwrap();
    let values = zeros_then_ones(5000);
    let mut first_change = None;
    for (i, &v) in values.iter().enumerate() {
        seed.input(v);
        if seed.is_change() {
            first_change = Some(i + 1);
            break;
        }
    }
    let at = first_change.expect("SEED missed the switch");
    assert!(at > 5000 && at <= 5064, "first change at instance {}", at);
    assert!(seed.estimation() > 0.5);
}

#[test]
fn test_seed_compression_bounds_memory() {
    let mut seed = Seed::new(SeedConfig::default()).unwrap();
    for v in BernoulliStream::stationary(0.1, 5).take(100_000) {
        seed.input(v);
        assert!(seed.block_count() < 250, "{} blocks", seed.block_count());
    }
}

#[test]
fn test_seed_compression_preserves_totals() {
    let mut seed = Seed::new(SeedConfig {
        delta: 0.0001,
        ..Default::default()
    })
    .unwrap();
    let values: Vec<f64> = BernoulliStream::stationary(0.3, 9).take(20_000).collect();
    let mut expected_width = 0;
    let mut expected_total = 0.0;
    for &v in &values {
        seed.input(v);
        if seed.is_change() {
            expected_width = seed.width();
            expected_total = seed.total();
            continue;
        }
        expected_width += 1;
        expected_total += v;
        assert_eq!(seed.width(), expected_width);
        let counted: usize = seed.blocks().map(|b| b.count).sum();
        assert_eq!(counted, seed.width());
    }
    let summed: f64 = seed.blocks().map(|b| b.total).sum();
    assert!((summed - seed.total()).abs() < 1e-6);
    assert!((expected_total - seed.total()).abs() < 1e-6);
}

#[test]
fn test_reset_equals_fresh() {
    let values: Vec<f64> = BernoulliStream::abrupt(0.1, 0.6, 2000, 1)
        .take(4000)
        .collect();

    let mut adwin = AdwinDetector::new(AdwinConfig::default()).unwrap();
    adwin.input_all(&values);
    adwin.reset();
    adwin.reset();
    let mut fresh = AdwinDetector::new(AdwinConfig::default()).unwrap();
    for &v in &values {
        adwin.input(v);
        fresh.input(v);
        assert_eq!(adwin.state(), fresh.state());
    }
    assert_eq!(adwin.bucket_count(), fresh.bucket_count());

    let mut seed = Seed::new(SeedConfig::default()).unwrap();
    seed.input_all(&values);
    seed.reset();
    seed.reset();
    let mut fresh = Seed::new(SeedConfig::default()).unwrap();
    for &v in &values {
        seed.input(v);
        fresh.input(v);
        assert_eq!(seed.state(), fresh.state());
    }
    assert_eq!(seed.block_count(), fresh.block_count());
}

#[test]
fn test_invalid_configs() {
    assert!(Adwin::new(AdwinConfig {
        delta: 1.0,
        ..Default::default()
    })
    .is_err());
    assert!(Adwin::new(AdwinConfig {
        clock: 0,
        ..Default::default()
    })
    .is_err());
    assert!(Seed::new(SeedConfig {
        block_size: 0,
        ..Default::default()
    })
    .is_err());
    assert!(Seed::new(SeedConfig {
        epsilon_prime: -1.0,
        ..Default::default()
    })
    .is_err());
}
