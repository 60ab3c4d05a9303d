// EWMA chart for concept drift detection (ECDD)
//
// Scientific Foundation:
// [4] Ross, G. J., Adams, N. M., Tasoulis, D. K., & Hand, D. J. (2012).
//     Exponentially weighted moving average charts for detecting concept drift.
//     Pattern Recognition Letters 33(2). The control limit L_t is a polynomial
//     fit in p for an average run length of 1000 instances.

use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`EwmaChart`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct EwmaChartConfig {
    /// Instances seen before any signal can be raised
    pub min_num_instances: usize,
    /// Weight of the newest value in the moving average, in (0, 1]
    pub lambda: f64,
}

impl Default for EwmaChartConfig {
    fn default() -> Self {
        Self {
            min_num_instances: 30,
            lambda: 0.2,
        }
    }
}

impl EwmaChartConfig {
    pub fn validate(&self) -> Result<()> {
        check_min_size("min_num_instances", self.min_num_instances, 1)?;
        if !(self.lambda > 0.0 && self.lambda <= 1.0) {
            return Err(DetectorError::invalid_parameter(
                "lambda",
                format!("must be in (0, 1], got {}", self.lambda),
            ));
        }
        Ok(())
    }
}

/// Control limit multiplier for an error rate `p`.
pub fn control_limit(p: f64) -> f64 {
    3.97 - 6.56 * p + 48.73 * p.powi(3) - 330.13 * p.powi(5) + 848.18 * p.powi(7)
}

/// EWMA-chart change detector
#[derive(Debug, Clone)]
pub struct EwmaChart {
    config: EwmaChartConfig,
    n: usize,
    sum: f64,
    p: f64,
    s: f64,
    z: f64,
    state: DetectorState,
}

impl EwmaChart {
    pub fn new(config: EwmaChartConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            n: 1,
            sum: 0.0,
            p: 0.0,
            s: 0.0,
            z: 0.0,
            state: DetectorState::default(),
        })
    }

    /// Current value of the moving average.
    pub fn moving_average(&self) -> f64 {
        self.z
    }

    fn restart(&mut self) {
        self.n = 1;
        self.sum = 0.0;
        self.p = 0.0;
        self.s = 0.0;
        self.z = 0.0;
    }
}

impl ChangeDetector for EwmaChart {
    fn input(&mut self, value: f64) {
        if self.state.change_detected || !self.state.initialized {
            self.restart();
            self.state.initialized = true;
        }
        self.state.clear_signals();

        let lambda = self.config.lambda;
        self.sum += value;
        self.p = self.sum / self.n as f64;
        let decay = 1.0 - (1.0 - lambda).powf(2.0 * self.n as f64);
        self.s = (self.p * (1.0 - self.p) * lambda * decay / (2.0 - lambda))
            .max(0.0)
            .sqrt();
        self.n += 1;
        self.z += lambda * (value - self.z);

        self.state.estimation = self.p;
        self.state.delay = 0.0;

        if self.n < self.config.min_num_instances {
            return;
        }

        let limit = control_limit(self.p);
        if self.n > self.config.min_num_instances && self.z > self.p + limit * self.s {
            self.state.change_detected = true;
            tracing::debug!(
                detector = "EWMA",
                instances = self.n - 1,
                z = self.z,
                "drift detected"
            );
        } else if self.z > self.p + 0.5 * limit * self.s {
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
        "EWMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_limit_at_zero() {
        assert!((control_limit(0.0) - 3.97).abs() < 1e-12);
    }

    #[test]
    fn test_lambda_one_is_accepted() {
        let config = EwmaChartConfig {
            lambda: 1.0,
            ..Default::default()
        };
        assert!(EwmaChart::new(config).is_ok());
    }

    #[test]
    fn test_moving_average_follows_input() {
        let mut chart = EwmaChart::new(EwmaChartConfig::default()).unwrap();
        chart.input(1.0);
        assert!((chart.moving_average() - 0.2).abs() < 1e-12);
    }
}
