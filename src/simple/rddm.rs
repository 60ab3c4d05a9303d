// Reactive Drift Detection Method (RDDM)
//
// Scientific Foundation:
// [7] Barros, R. S. M., Cabral, D. R. L., Goncalves, P. M., & Santos, S. G. T. C.
//     (2017). RDDM: Reactive drift detection method. Expert Systems with
//     Applications 90. DDM loses sensitivity on long stable concepts; RDDM
//     periodically rebuilds its statistics from the most recent predictions.
//
// The last `min_stable_concept_size` predictions are kept in a ring. After a
// drift (statistical, forced by a long warning, or forced by concept size) the
// statistics restart and the stored predictions since the warning onset are
// replayed into them.

use super::ddm::ErrorRate;
use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, check_positive, DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`Rddm`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct RddmConfig {
    /// Instances seen before any signal can be raised
    pub min_num_instances: usize,
    /// Multiplier of `s_min` for the warning zone
    pub warning_level: f64,
    /// Multiplier of `s_min` for drift
    pub drift_level: f64,
    /// Concept length after which the statistics are rebuilt
    pub max_concept_size: usize,
    /// Number of predictions kept for replay
    pub min_stable_concept_size: usize,
    /// Instances in the warning zone that force a drift
    pub warning_limit: usize,
}

impl Default for RddmConfig {
    fn default() -> Self {
        Self {
            min_num_instances: 129,
            warning_level: 1.773,
            drift_level: 2.258,
            max_concept_size: 40000,
            min_stable_concept_size: 7000,
            warning_limit: 1400,
        }
    }
}

impl RddmConfig {
    pub fn validate(&self) -> Result<()> {
        check_positive("warning_level", self.warning_level)?;
        check_positive("drift_level", self.drift_level)?;
        check_min_size("max_concept_size", self.max_concept_size, 1)?;
        check_min_size("min_stable_concept_size", self.min_stable_concept_size, 1)?;
        check_min_size("warning_limit", self.warning_limit, 1)?;
        if self.warning_level > self.drift_level {
            return Err(DetectorError::invalid_parameter(
                "warning_level",
                format!(
                    "must not exceed drift_level ({} > {})",
                    self.warning_level, self.drift_level
                ),
            ));
        }
        Ok(())
    }
}

/// Fixed-capacity ring of the most recent predictions.
#[derive(Debug, Clone)]
struct PredictionRing {
    values: Vec<f64>,
    first: usize,
    last: Option<usize>,
    len: usize,
}

impl PredictionRing {
    fn new(capacity: usize) -> Self {
        Self {
            values: vec![0.0; capacity],
            first: 0,
            last: None,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Store a prediction; returns true when the oldest one was overwritten.
    fn push(&mut self, value: f64) -> bool {
        let cap = self.capacity();
        let pos = self.last.map_or(0, |l| (l + 1) % cap);
        self.values[pos] = value;
        self.last = Some(pos);
        if self.len < cap {
            self.len += 1;
            false
        } else {
            self.first = (self.first + 1) % cap;
            true
        }
    }

    /// Keep only the predictions from `pos` to the newest.
    fn keep_from(&mut self, pos: usize) {
        let Some(last) = self.last else {
            return;
        };
        let cap = self.capacity();
        self.first = pos;
        self.len = (last + cap - pos) % cap + 1;
    }

    fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let cap = self.capacity();
        (0..self.len).map(move |i| self.values[(self.first + i) % cap])
    }
}

/// Onset of the current warning zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WarningOnset {
    instance: usize,
    position: Option<usize>,
}

/// RDDM change detector
#[derive(Debug, Clone)]
pub struct Rddm {
    config: RddmConfig,
    rate: ErrorRate,
    ring: PredictionRing,
    warning: Option<WarningOnset>,
    instances: usize,
    rebuild_pending: bool,
    state: DetectorState,
}

impl Rddm {
    pub fn new(config: RddmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rate: ErrorRate::new(),
            ring: PredictionRing::new(config.min_stable_concept_size),
            warning: None,
            instances: 0,
            rebuild_pending: false,
            state: DetectorState::default(),
            config,
        })
    }

    /// Predictions currently stored for replay.
    pub fn stored(&self) -> usize {
        self.ring.len
    }

    /// Restart the statistics and replay the stored predictions into them.
    fn rebuild(&mut self) {
        self.rate.restart();
        if self.state.change_detected {
            self.rate.p_min = f64::MAX;
            self.rate.s_min = f64::MAX;
            self.rate.ps_min = f64::MAX;
        }
        if let Some(pos) = self.warning.and_then(|w| w.position) {
            self.ring.keep_from(pos);
        }
        for value in self.ring.iter() {
            self.rate.p += (value - self.rate.p) / self.rate.n as f64;
            self.rate.s = (self.rate.p * (1.0 - self.rate.p) / self.rate.n as f64).sqrt();
            if self.state.change_detected
                && self.rate.n > self.config.min_num_instances
                && self.rate.p + self.rate.s < self.rate.ps_min
            {
                self.rate.record_minimum();
            }
            self.rate.n += 1;
        }
        tracing::trace!(
            detector = "RDDM",
            replayed = self.ring.len,
            "statistics rebuilt from stored predictions"
        );
        self.warning = None;
        self.rebuild_pending = false;
        self.state.change_detected = false;
    }

    fn signal_drift(&mut self) {
        self.state.change_detected = true;
        self.rebuild_pending = true;
        tracing::debug!(
            detector = "RDDM",
            instances = self.instances,
            estimation = self.rate.p,
            "drift detected"
        );
    }
}

impl ChangeDetector for Rddm {
    fn input(&mut self, value: f64) {
        self.state.initialized = true;
        if self.rebuild_pending {
            self.rebuild();
        }

        if self.ring.push(value) {
            let last = self.ring.last;
            if let Some(onset) = self.warning.as_mut() {
                if onset.position.is_some() && onset.position == last {
                    onset.position = None;
                }
            }
        }

        self.rate.update(value);
        self.instances += 1;
        self.state.estimation = self.rate.p;
        self.state.warning_zone = false;
        self.state.delay = 0.0;

        if self.rate.n <= self.config.min_num_instances {
            return;
        }

        if self.rate.p + self.rate.s < self.rate.ps_min {
            self.rate.record_minimum();
        }

        if self.rate.exceeds(self.config.drift_level) {
            if self.warning.is_none() {
                // Drift without a preceding warning replays only this prediction
                if let Some(last) = self.ring.last {
                    self.ring.keep_from(last);
                }
            }
            self.signal_drift();
            return;
        }

        if self.rate.exceeds(self.config.warning_level) {
            if let Some(onset) = self.warning {
                if onset.instance + self.config.warning_limit <= self.instances {
                    if let Some(last) = self.ring.last {
                        self.ring.keep_from(last);
                    }
                    self.warning = None;
                    self.signal_drift();
                    return;
                }
            }
            self.state.warning_zone = true;
            if self.warning.is_none() {
                self.warning = Some(WarningOnset {
                    instance: self.instances,
                    position: self.ring.last,
                });
            }
        } else {
            self.warning = None;
        }

        if self.rate.n > self.config.max_concept_size && !self.state.warning_zone {
            self.rebuild_pending = true;
        }
    }

    fn reset(&mut self) {
        self.rate = ErrorRate::new();
        self.ring = PredictionRing::new(self.config.min_stable_concept_size);
        self.warning = None;
        self.instances = 0;
        self.rebuild_pending = false;
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "RDDM"
    }
}
