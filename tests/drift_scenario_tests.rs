// Scenario tests on synthetic Bernoulli error streams: moderate abrupt
// shifts, gradual ramps, long stationary runs, and the ensemble voting on
// top of them. Scored with the same evaluation code the CLI uses.

use driftwatch::config::{DetectorConfig, DETECTOR_KINDS};
use driftwatch::ensemble::{Ensemble, EnsembleConfig, VotingPolicy};
use driftwatch::evaluation::{evaluate, DetectionLog};
use driftwatch::repository::{SeqDrift1, SeqDrift1Config};
use driftwatch::stream::BernoulliStream;
use driftwatch::window::{AdwinConfig, AdwinDetector, Seed, SeedConfig};
use driftwatch::ChangeDetector;

const DRIFT_AT: u64 = 5000;

/// Detectors whose bounds carry an explicit confidence parameter.
const BOUNDED: &[&str] = &["hddm_a", "adwin", "seed", "seqdrift1", "seqdrift2"];

fn build(kind: &str) -> Box<dyn ChangeDetector> {
    DetectorConfig::default_for(kind).unwrap().build().unwrap()
}

fn single_kinds() -> impl Iterator<Item = &'static str> {
    DETECTOR_KINDS.iter().copied().filter(|&k| k != "ensemble")
}

#[test]
fn test_moderate_abrupt_shift_detected() {
    for kind in single_kinds() {
        let mut detector = build(kind);
        let stream = BernoulliStream::abrupt(0.1, 0.4, DRIFT_AT, 7).take(10_000);
        let log = DetectionLog::run(detector.as_mut(), stream);
        let evaluation = evaluate(&log, &[DRIFT_AT], 2000);
        assert_eq!(
            evaluation.true_positives,
            1,
            "{} missed the shift: {:?}",
            kind,
            log.changes().collect::<Vec<_>>()
        );
        assert!(evaluation.mean_delay.unwrap() > 0.0);
    }
}

#[test]
fn test_gradual_ramp_detected() {
    for kind in single_kinds() {
        let mut detector = build(kind);
        let stream = BernoulliStream::gradual(0.1, 0.6, DRIFT_AT, 0.0005, 3).take(12_000);
        let log = DetectionLog::run(detector.as_mut(), stream);
        let evaluation = evaluate(&log, &[DRIFT_AT], 3000);
        assert_eq!(evaluation.missed, 0, "{} missed the ramp", kind);
    }
}

#[test]
fn test_stationary_false_alarm_rates() {
    let n = 50_000;
    for kind in single_kinds() {
        let mut detector = build(kind);
        let values: Vec<f64> = BernoulliStream::stationary(0.1, 5).take(n).collect();
        let rate = detector.input_all(&values) as f64 / n as f64;
        let limit = if BOUNDED.contains(&kind) { 0.002 } else { 0.02 };
        assert!(rate < limit, "{} false alarm rate {}", kind, rate);
    }
}

#[test]
fn test_windows_shrink_after_drift() {
    let values: Vec<f64> = BernoulliStream::abrupt(0.0, 1.0, DRIFT_AT, 1)
        .take(DRIFT_AT as usize + 500)
        .collect();

    let mut adwin = AdwinDetector::new(AdwinConfig::default()).unwrap();
    adwin.input_all(&values);
    assert!(adwin.width() < 1000, "ADWIN kept {} values", adwin.width());

    let mut seed = Seed::new(SeedConfig::default()).unwrap();
    seed.input_all(&values);
    assert!(seed.width() < 1000, "SEED kept {} values", seed.width());

    let mut seqdrift = SeqDrift1::new(SeqDrift1Config::default()).unwrap();
    seqdrift.input_all(&values);
    assert!(seqdrift.width() <= 600, "SeqDrift1 kept {} values", seqdrift.width());
    assert!(seqdrift.estimation() > 0.9);
}

#[test]
fn test_ensemble_policies_order_detection() {
    let values: Vec<f64> = BernoulliStream::abrupt(0.1, 0.5, DRIFT_AT, 9)
        .take(8000)
        .collect();
    let first_change = |policy: VotingPolicy| {
        let children = ["ddm", "hddm_a", "adwin"]
            .iter()
            .map(|kind| build(kind))
            .collect();
        let mut ensemble = Ensemble::from_detectors(children, policy).unwrap();
        let log = DetectionLog::run(&mut ensemble, values.iter().copied());
        let evaluation = evaluate(&log, &[DRIFT_AT], 2000);
        assert_eq!(evaluation.true_positives, 1, "{:?}", policy);
        evaluation.delays[0]
    };

    let any = first_change(VotingPolicy::Min);
    let majority = first_change(VotingPolicy::Majority);
    let all = first_change(VotingPolicy::Max);
    assert!(any <= majority, "min {} > majority {}", any, majority);
    assert!(majority <= all, "majority {} > max {}", majority, all);
}

#[test]
fn test_ensemble_from_toml_matches_programmatic() {
    let source = r#"
type = "ensemble"
policy = "majority"

[[children]]
type = "ddm"

[[children]]
type = "hddm_a"

[[children]]
type = "adwin"
"#;
    let from_toml = DetectorConfig::from_toml_str(source).unwrap();
    let programmatic = DetectorConfig::Ensemble(EnsembleConfig {
        children: ["ddm", "hddm_a", "adwin"]
            .iter()
            .map(|kind| DetectorConfig::default_for(kind).unwrap())
            .collect(),
        policy: VotingPolicy::Majority,
    });
    assert_eq!(from_toml, programmatic);

    let values: Vec<f64> = BernoulliStream::abrupt(0.1, 0.5, DRIFT_AT, 4)
        .take(8000)
        .collect();
    let a = DetectionLog::run(from_toml.build().unwrap().as_mut(), values.iter().copied());
    let b = DetectionLog::run(programmatic.build().unwrap().as_mut(), values.iter().copied());
    assert_eq!(a.events(), b.events());
}
