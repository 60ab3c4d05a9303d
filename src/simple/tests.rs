// Behavioural tests for the error-rate detectors
//
// Each detector is driven through the same scenarios: a long error-free run
// followed by an abrupt switch to all errors, a stationary periodic stream,
// and a reset in the middle of a stream.

use super::*;
use crate::detector::{ChangeDetector, DetectorState};

const STABLE_RUN: usize = 5000;

fn abrupt_stream() -> Vec<f64> {
    let mut values = vec![0.0; STABLE_RUN];
    values.extend(vec![1.0; STABLE_RUN]);
    values
}

/// Index (relative to the switch) of the first change, if any.
fn detection_delay(detector: &mut dyn ChangeDetector, values: &[f64]) -> Option<usize> {
    for (i, &v) in values.iter().enumerate() {
        detector.input(v);
        if detector.is_change() {
            assert!(i >= STABLE_RUN, "{} fired at {} before the switch", detector.name(), i);
            return Some(i - STABLE_RUN + 1);
        }
    }
    None
}

fn all_detectors() -> Vec<Box<dyn ChangeDetector>> {
    vec![
        Box::new(Ddm::new(DdmConfig::default()).unwrap()),
        Box::new(Rddm::new(RddmConfig::default()).unwrap()),
        Box::new(Eddm::new()),
        Box::new(Cusum::new(CusumConfig::default()).unwrap()),
        Box::new(EwmaChart::new(EwmaChartConfig::default()).unwrap()),
        Box::new(HddmA::new(HddmAConfig::default()).unwrap()),
        Box::new(HddmW::new(HddmWConfig::default()).unwrap()),
        Box::new(Stepd::new(StepdConfig::default()).unwrap()),
    ]
}

fn trajectory(detector: &mut dyn ChangeDetector, values: &[f64]) -> Vec<DetectorState> {
    values
        .iter()
        .map(|&v| {
            detector.input(v);
            *detector.state()
        })
        .collect()
}

fn periodic(len: usize, period: usize) -> Vec<f64> {
    (0..len)
        .map(|i| if i % period == 0 { 1.0 } else { 0.0 })
        .collect()
}

#[test]
fn test_abrupt_drift_delays() {
    let values = abrupt_stream();
    let expected_max_delay = [
        ("DDM", 5),
        ("RDDM", 5),
        ("EDDM", 40),
        ("CUSUM", 60),
        ("EWMA", 5),
        ("HDDM_A", 10),
        ("HDDM_W", 30),
        ("STEPD", 5),
    ];
    for (mut detector, (name, max_delay)) in all_detectors().into_iter().zip(expected_max_delay) {
        assert_eq!(detector.name(), name);
        let delay = detection_delay(detector.as_mut(), &values)
            .unwrap_or_else(|| panic!("{} missed the drift", name));
        assert!(delay <= max_delay, "{} took {} instances", name, delay);
    }
}

#[test]
fn test_error_free_stream_is_quiet() {
    let values = vec![0.0; 20_000];
    for mut detector in all_detectors() {
        assert_eq!(detector.input_all(&values), 0, "{}", detector.name());
        assert!(!detector.is_warning(), "{}", detector.name());
    }
}

#[test]
fn test_reset_matches_fresh_detector() {
    let warmup = abrupt_stream();
    let replay = periodic(3000, 7);
    for (mut used, mut fresh) in all_detectors().into_iter().zip(all_detectors()) {
        used.input_all(&warmup);
        used.reset();
        used.reset();
        assert_eq!(*used.state(), DetectorState::default(), "{}", used.name());
        let a = trajectory(used.as_mut(), &replay);
        let b = trajectory(fresh.as_mut(), &replay);
        assert_eq!(a, b, "{}", used.name());
    }
}

#[test]
fn test_lazy_initialization() {
    for mut detector in all_detectors() {
        assert!(!detector.is_initialized());
        detector.input(0.0);
        assert!(detector.is_initialized(), "{}", detector.name());
    }
}

#[test]
fn test_ddm_warns_before_drift() {
    let mut values = periodic(2000, 10);
    values.extend((0..2000).map(|i| if i % 10 < 3 { 1.0 } else { 0.0 }));

    let mut ddm = Ddm::new(DdmConfig::default()).unwrap();
    let mut warned = false;
    let mut changed = false;
    for &v in &values {
        ddm.input(v);
        if ddm.is_change() {
            changed = true;
            break;
        }
        warned |= ddm.is_warning();
    }
    assert!(changed);
    assert!(warned);
}

#[test]
fn test_estimations_are_error_rates() {
    let values = periodic(4000, 4);
    let mut ddm = Ddm::new(DdmConfig::default()).unwrap();
    let mut hddm_a = HddmA::new(HddmAConfig::default()).unwrap();
    let mut cusum = Cusum::new(CusumConfig::default()).unwrap();
    ddm.input_all(&values);
    hddm_a.input_all(&values);
    cusum.input_all(&values);
    assert!((ddm.estimation() - 0.25).abs() < 0.01);
    assert!((hddm_a.estimation() - 0.25).abs() < 0.01);
    assert!((cusum.estimation() - 0.25).abs() < 0.01);
}

#[test]
fn test_stepd_detects_rate_increase() {
    let mut values = periodic(600, 10);
    values.extend(vec![1.0; 30]);
    let mut stepd = Stepd::new(StepdConfig::default()).unwrap();
    assert!(stepd.input_all(&values) >= 1);
}

#[test]
fn test_hddm_w_two_sided_decrease_resets_silently() {
    let config = HddmWConfig {
        two_sided: true,
        ..Default::default()
    };
    let mut hddm = HddmW::new(config).unwrap();
    let mut values = vec![1.0; 1000];
    values.extend(vec![0.0; 1000]);
    assert_eq!(hddm.input_all(&values), 0);
    assert!(hddm.width() < 1000);
}

#[test]
fn test_invalid_configs_rejected() {
    assert!(HddmA::new(HddmAConfig {
        drift_confidence: 0.0,
        ..Default::default()
    })
    .is_err());
    assert!(HddmW::new(HddmWConfig {
        lambda: 0.0,
        ..Default::default()
    })
    .is_err());
    assert!(Stepd::new(StepdConfig {
        window_size: 0,
        ..Default::default()
    })
    .is_err());
    assert!(EwmaChart::new(EwmaChartConfig {
        lambda: 1.5,
        ..Default::default()
    })
    .is_err());
    assert!(Rddm::new(RddmConfig {
        min_stable_concept_size: 0,
        ..Default::default()
    })
    .is_err());
}

#[test]
#[allow(clippy::field_reassign_with_default)]
fn test_presets_validate() {
    assert!(DdmConfig::strict().validate().is_ok());
    assert!(DdmConfig::sensitive().validate().is_ok());

    let mut config = CusumConfig::default();
    config.lambda = 10.0;
    assert!(config.validate().is_ok());
}
