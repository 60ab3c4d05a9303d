// Statistical Test of Equal Proportions (STEPD)
//
// Scientific Foundation:
// [5] Nishida, K., & Yamauchi, K. (2007). Detecting concept drift using
//     statistical testing. Discovery Science. Compares the accuracy of the most
//     recent `w` predictions with all older ones using a two-proportion z-test
//     with continuity correction.

use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, check_open_unit, DetectorError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Configuration for [`Stepd`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct StepdConfig {
    /// Size of the recent window
    pub window_size: usize,
    /// Significance level for drift
    pub alpha_drift: f64,
    /// Significance level for the warning zone
    pub alpha_warning: f64,
}

impl Default for StepdConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            alpha_drift: 0.003,
            alpha_warning: 0.05,
        }
    }
}

impl StepdConfig {
    pub fn validate(&self) -> Result<()> {
        check_min_size("window_size", self.window_size, 1)?;
        check_open_unit("alpha_drift", self.alpha_drift)?;
        check_open_unit("alpha_warning", self.alpha_warning)?;
        if self.alpha_drift > self.alpha_warning {
            return Err(DetectorError::invalid_parameter(
                "alpha_drift",
                format!(
                    "must not exceed alpha_warning ({} > {})",
                    self.alpha_drift, self.alpha_warning
                ),
            ));
        }
        Ok(())
    }
}

/// STEPD change detector
#[derive(Debug, Clone)]
pub struct Stepd {
    config: StepdConfig,
    /// Accuracy (`1 - value`) of the recent window, oldest at `first`
    recent: Vec<f64>,
    first: usize,
    recent_len: usize,
    recent_sum: f64,
    older_len: usize,
    older_sum: f64,
    normal: Normal,
    state: DetectorState,
}

impl Stepd {
    pub fn new(config: StepdConfig) -> Result<Self> {
        config.validate()?;
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| DetectorError::invalid_parameter("normal", e.to_string()))?;
        Ok(Self {
            recent: vec![0.0; config.window_size],
            first: 0,
            recent_len: 0,
            recent_sum: 0.0,
            older_len: 0,
            older_sum: 0.0,
            normal,
            state: DetectorState::default(),
            config,
        })
    }

    /// Two-sided p-value of the current recent-vs-older comparison, if testable.
    pub fn p_value(&self) -> Option<f64> {
        if self.older_len < self.config.window_size || self.recent_len == 0 {
            return None;
        }
        let no = self.older_len as f64;
        let nr = self.recent_len as f64;
        let ro = self.older_sum / no;
        let rr = self.recent_sum / nr;
        let p = (self.older_sum + self.recent_sum) / (no + nr);
        let spread = p * (1.0 - p);
        if spread <= 0.0 {
            return None;
        }
        let inv = 1.0 / no + 1.0 / nr;
        let z = ((ro - rr).abs() - 0.5 * inv) / (spread * inv).sqrt();
        Some(2.0 * (1.0 - self.normal.cdf(z.abs())))
    }

    fn restart(&mut self) {
        self.recent.iter_mut().for_each(|v| *v = 0.0);
        self.first = 0;
        self.recent_len = 0;
        self.recent_sum = 0.0;
        self.older_len = 0;
        self.older_sum = 0.0;
    }
}

impl ChangeDetector for Stepd {
    fn input(&mut self, value: f64) {
        if self.state.change_detected || !self.state.initialized {
            self.restart();
            self.state.initialized = true;
        }
        self.state.clear_signals();

        let w = self.config.window_size;
        let accuracy = 1.0 - value;
        if self.recent_len == w {
            // Oldest recent value moves into the older window
            let moved = self.recent[self.first];
            self.older_sum += moved;
            self.older_len += 1;
            self.recent_sum -= moved;
            self.recent[self.first] = accuracy;
            self.first = (self.first + 1) % w;
        } else {
            self.recent[(self.first + self.recent_len) % w] = accuracy;
            self.recent_len += 1;
        }
        self.recent_sum += accuracy;

        self.state.estimation = 1.0 - self.recent_sum / self.recent_len as f64;
        self.state.delay = 0.0;

        let Some(p_value) = self.p_value() else {
            return;
        };
        if p_value < self.config.alpha_drift {
            self.state.change_detected = true;
            tracing::debug!(
                detector = "STEPD",
                instances = self.older_len + self.recent_len,
                p_value,
                "drift detected"
            );
        } else if p_value < self.config.alpha_warning {
            self.state.warning_zone = true;
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
        "STEPD"
    }
}
