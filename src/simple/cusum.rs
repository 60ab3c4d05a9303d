// Cumulative Sum (CUSUM) change detector
//
// Scientific Foundation:
// [3] Page, E. S. (1954). Continuous inspection schemes. Biometrika 41(1/2).
//     Accumulates positive deviations from the running mean minus a slack and
//     alarms once the accumulated evidence exceeds a threshold.

use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, check_positive, DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`Cusum`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct CusumConfig {
    /// Instances seen before any signal can be raised
    pub min_num_instances: usize,
    /// Slack subtracted from every deviation
    pub delta: f64,
    /// Alarm threshold on the cumulative sum
    pub lambda: f64,
}

impl Default for CusumConfig {
    fn default() -> Self {
        Self {
            min_num_instances: 30,
            delta: 0.005,
            lambda: 50.0,
        }
    }
}

impl CusumConfig {
    pub fn validate(&self) -> Result<()> {
        check_min_size("min_num_instances", self.min_num_instances, 1)?;
        check_positive("lambda", self.lambda)?;
        if !self.delta.is_finite() || self.delta < 0.0 {
            return Err(DetectorError::invalid_parameter(
                "delta",
                format!("must be finite and non-negative, got {}", self.delta),
            ));
        }
        Ok(())
    }
}

/// CUSUM change detector
#[derive(Debug, Clone)]
pub struct Cusum {
    config: CusumConfig,
    n: usize,
    mean: f64,
    sum: f64,
    state: DetectorState,
}

impl Cusum {
    pub fn new(config: CusumConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            n: 1,
            mean: 0.0,
            sum: 0.0,
            state: DetectorState::default(),
        })
    }

    /// Current value of the cumulative statistic.
    pub fn cumulative_sum(&self) -> f64 {
        self.sum
    }

    fn restart(&mut self) {
        self.n = 1;
        self.mean = 0.0;
        self.sum = 0.0;
    }
}

impl ChangeDetector for Cusum {
    fn input(&mut self, value: f64) {
        if self.state.change_detected || !self.state.initialized {
            self.restart();
            self.state.initialized = true;
        }
        self.state.clear_signals();

        self.mean += (value - self.mean) / self.n as f64;
        self.sum = (self.sum + value - self.mean - self.config.delta).max(0.0);
        self.n += 1;

        self.state.estimation = self.mean;
        self.state.delay = 0.0;

        if self.n < self.config.min_num_instances {
            return;
        }

        if self.sum > self.config.lambda {
            self.state.change_detected = true;
            tracing::debug!(
                detector = "CUSUM",
                instances = self.n - 1,
                sum = self.sum,
                "drift detected"
            );
        }
    }

    fn reset(&mut self) {
        self.restart();
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "CUSUM"
    }
}
