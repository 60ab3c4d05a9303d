// HDDM_W: McDiarmid-bound drift detection with weighted moving averages
//
// Scientific Foundation:
// [6] Frias-Blanco et al. (2015), IEEE TKDE 27(3). Same split-and-compare scheme
//     as HDDM_A, but every sample is summarised by an EWMA estimator whose
//     McDiarmid bound depends on the sum of squared weights.

use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_open_unit, DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`HddmW`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct HddmWConfig {
    /// Confidence level for drift
    pub drift_confidence: f64,
    /// Confidence level for the warning zone
    pub warning_confidence: f64,
    /// EWMA weight of the newest value, in (0, 1]
    pub lambda: f64,
    /// Also monitor decreases of the mean (they reset, never signal)
    pub two_sided: bool,
}

impl Default for HddmWConfig {
    fn default() -> Self {
        Self {
            drift_confidence: 0.001,
            warning_confidence: 0.005,
            lambda: 0.05,
            two_sided: false,
        }
    }
}

impl HddmWConfig {
    pub fn validate(&self) -> Result<()> {
        check_open_unit("drift_confidence", self.drift_confidence)?;
        check_open_unit("warning_confidence", self.warning_confidence)?;
        if !(self.lambda > 0.0 && self.lambda <= 1.0) {
            return Err(DetectorError::invalid_parameter(
                "lambda",
                format!("must be in (0, 1], got {}", self.lambda),
            ));
        }
        Ok(())
    }
}

/// EWMA estimate of one sample together with its bounded-condition sum.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ewma {
    estimate: f64,
    weight_sum: f64,
}

impl Ewma {
    fn start(value: f64) -> Self {
        Self {
            estimate: value,
            weight_sum: 1.0,
        }
    }

    fn update(&mut self, value: f64, lambda: f64) {
        let decay = 1.0 - lambda;
        self.estimate = lambda * value + decay * self.estimate;
        self.weight_sum = lambda * lambda + decay * decay * self.weight_sum;
    }

    fn bound(&self, confidence: f64) -> f64 {
        (self.weight_sum * (1.0 / confidence).ln() / 2.0).sqrt()
    }
}

fn push(sample: &mut Option<Ewma>, value: f64, lambda: f64) {
    match sample {
        Some(ewma) => ewma.update(value, lambda),
        None => *sample = Some(Ewma::start(value)),
    }
}

/// `later` exceeds `earlier` beyond the joint McDiarmid bound.
fn increased(earlier: Option<Ewma>, later: Option<Ewma>, confidence: f64) -> bool {
    match (earlier, later) {
        (Some(a), Some(b)) => {
            let bound = ((a.weight_sum + b.weight_sum) * (1.0 / confidence).ln() / 2.0).sqrt();
            b.estimate - a.estimate > bound
        }
        _ => false,
    }
}

/// One split point with the EWMA of the stream up to it and after it.
#[derive(Debug, Clone, Copy)]
struct Monitor {
    cut_point: f64,
    before: Option<Ewma>,
    after: Option<Ewma>,
}

impl Monitor {
    fn new(cut_point: f64) -> Self {
        Self {
            cut_point,
            before: None,
            after: None,
        }
    }
}

/// HDDM_W change detector
#[derive(Debug, Clone)]
pub struct HddmW {
    config: HddmWConfig,
    total: Option<Ewma>,
    incr: Monitor,
    decr: Monitor,
    width: usize,
    state: DetectorState,
}

impl HddmW {
    pub fn new(config: HddmWConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            total: None,
            incr: Monitor::new(f64::INFINITY),
            decr: Monitor::new(f64::NEG_INFINITY),
            width: 0,
            state: DetectorState::default(),
        })
    }

    /// Values folded in since the last reset of the statistics.
    pub fn width(&self) -> usize {
        self.width
    }

    fn restart(&mut self) {
        self.total = None;
        self.incr = Monitor::new(f64::INFINITY);
        self.decr = Monitor::new(f64::NEG_INFINITY);
        self.width = 0;
        self.state.delay = 0.0;
    }

    fn update_incr(&mut self, value: f64, total: Ewma) {
        let upper = total.estimate + total.bound(self.config.drift_confidence);
        if upper < self.incr.cut_point {
            self.incr.cut_point = upper;
            self.incr.before = Some(total);
            self.incr.after = None;
            self.state.delay = 0.0;
        } else {
            self.state.delay += 1.0;
            push(&mut self.incr.after, value, self.config.lambda);
        }
    }

    fn update_decr(&mut self, value: f64, total: Ewma) {
        let lower = total.estimate - total.bound(self.config.drift_confidence);
        if lower > self.decr.cut_point {
            self.decr.cut_point = lower;
            self.decr.before = Some(total);
            self.decr.after = None;
        } else {
            push(&mut self.decr.after, value, self.config.lambda);
        }
    }
}

impl ChangeDetector for HddmW {
    fn input(&mut self, value: f64) {
        self.state.initialized = true;
        self.state.clear_signals();
        self.width += 1;

        push(&mut self.total, value, self.config.lambda);
        let Some(total) = self.total else {
            return;
        };

        self.update_incr(value, total);
        if increased(self.incr.before, self.incr.after, self.config.drift_confidence) {
            tracing::debug!(
                detector = "HDDM_W",
                instances = self.width,
                estimation = total.estimate,
                "drift detected"
            );
            self.restart();
            self.state.change_detected = true;
            self.state.estimation = 0.0;
            return;
        }
        if increased(self.incr.before, self.incr.after, self.config.warning_confidence) {
            self.state.warning_zone = true;
        }

        if self.config.two_sided {
            self.update_decr(value, total);
            if increased(self.decr.after, self.decr.before, self.config.drift_confidence) {
                self.restart();
            }
        }

        self.state.estimation = self.total.map_or(0.0, |t| t.estimate);
    }

    fn reset(&mut self) {
        self.restart();
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "HDDM_W"
    }
}
