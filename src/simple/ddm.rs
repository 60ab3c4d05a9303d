// Drift Detection Method (DDM)
//
// Scientific Foundation:
// [1] Gama, J., Medas, P., Castillo, G., & Rodrigues, P. (2004). Learning with
//     drift detection. SBIA. The error rate of an online learner is binomial;
//     while the concept is stable p + s only decreases.

use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, check_positive, DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`Ddm`]
///
/// # Example
/// ```
/// use driftwatch::simple::DdmConfig;
///
/// let config = DdmConfig::default();
/// assert_eq!(config.min_num_instances, 30);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct DdmConfig {
    /// Instances seen before any signal can be raised
    pub min_num_instances: usize,
    /// Multiplier of `s_min` for the warning zone
    pub warning_level: f64,
    /// Multiplier of `s_min` for drift
    pub drift_level: f64,
}

impl Default for DdmConfig {
    fn default() -> Self {
        Self {
            min_num_instances: 30,
            warning_level: 2.0,
            drift_level: 3.0,
        }
    }
}

impl DdmConfig {
    /// Fewer false alarms, slower reaction
    pub fn strict() -> Self {
        Self {
            min_num_instances: 100,
            warning_level: 2.5,
            drift_level: 3.5,
        }
    }

    /// Faster reaction at the cost of more false alarms
    pub fn sensitive() -> Self {
        Self {
            min_num_instances: 30,
            warning_level: 1.5,
            drift_level: 2.5,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_min_size("min_num_instances", self.min_num_instances, 1)?;
        check_positive("warning_level", self.warning_level)?;
        check_positive("drift_level", self.drift_level)?;
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

/// Running binomial error-rate statistics shared by DDM and RDDM.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ErrorRate {
    pub n: usize,
    pub p: f64,
    pub s: f64,
    pub p_min: f64,
    pub s_min: f64,
    pub ps_min: f64,
}

impl ErrorRate {
    pub fn new() -> Self {
        Self {
            n: 1,
            p: 1.0,
            s: 0.0,
            p_min: f64::MAX,
            s_min: f64::MAX,
            ps_min: f64::MAX,
        }
    }

    /// Restart the running rate, keeping the recorded minimum.
    pub fn restart(&mut self) {
        self.n = 1;
        self.p = 1.0;
        self.s = 0.0;
    }

    /// Fold one prediction into `p` and `s`, then advance `n`.
    pub fn update(&mut self, value: f64) {
        self.p += (value - self.p) / self.n as f64;
        self.s = (self.p * (1.0 - self.p) / self.n as f64).sqrt();
        self.n += 1;
    }

    pub fn record_minimum(&mut self) {
        self.p_min = self.p;
        self.s_min = self.s;
        self.ps_min = self.p + self.s;
    }

    pub fn exceeds(&self, level: f64) -> bool {
        self.p + self.s > self.p_min + level * self.s_min
    }
}

/// DDM change detector
#[derive(Debug, Clone)]
pub struct Ddm {
    config: DdmConfig,
    rate: ErrorRate,
    state: DetectorState,
}

impl Ddm {
    pub fn new(config: DdmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rate: ErrorRate::new(),
            state: DetectorState::default(),
        })
    }

    pub fn config(&self) -> &DdmConfig {
        &self.config
    }

    /// Instances folded into the current concept.
    pub fn instances(&self) -> usize {
        self.rate.n - 1
    }
}

impl ChangeDetector for Ddm {
    fn input(&mut self, value: f64) {
        if self.state.change_detected || !self.state.initialized {
            self.rate = ErrorRate::new();
            self.state.initialized = true;
        }
        self.state.clear_signals();

        self.rate.update(value);
        self.state.estimation = self.rate.p;
        self.state.delay = 0.0;

        if self.rate.n < self.config.min_num_instances {
            return;
        }

        if self.rate.p + self.rate.s <= self.rate.ps_min {
            self.rate.record_minimum();
        }

        if self.rate.n > self.config.min_num_instances && self.rate.exceeds(self.config.drift_level)
        {
            self.state.change_detected = true;
            tracing::debug!(
                detector = "DDM",
                instances = self.rate.n - 1,
                estimation = self.rate.p,
                "drift detected"
            );
        } else if self.rate.exceeds(self.config.warning_level) {
            self.state.warning_zone = true;
        }
    }

    fn reset(&mut self) {
        self.rate = ErrorRate::new();
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "DDM"
    }
}
