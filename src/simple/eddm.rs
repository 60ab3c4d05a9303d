// Early Drift Detection Method (EDDM)
//
// Scientific Foundation:
// [2] Baena-Garcia, M., del Campo-Avila, J., Fidalgo, R., Bifet, A., Gavalda, R.,
//     & Morales-Bueno, R. (2006). Early drift detection method. IWKDDS.
//     Monitors the distance between consecutive errors instead of the error rate,
//     which reacts earlier to gradual drift.

use crate::detector::{ChangeDetector, DetectorState};
use serde::{Deserialize, Serialize};

/// Ratio of `m2s / m2s_max` below which drift is signalled.
pub const DRIFT_RATIO: f64 = 0.9;
/// Ratio of `m2s / m2s_max` below which the warning zone is entered.
pub const WARNING_RATIO: f64 = 0.95;
/// Instances seen before any signal can be raised.
pub const MIN_INSTANCES: usize = 30;
/// Errors seen before any signal can be raised.
pub const MIN_ERRORS: usize = 30;

/// EDDM has no tunable parameters; the struct exists so it fits the config enum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct EddmConfig {}

/// EDDM change detector
///
/// `estimation()` reports the mean distance (in instances) between errors.
/// An input is counted as an error when it equals `1.0`.
#[derive(Debug, Clone)]
pub struct Eddm {
    n: usize,
    num_errors: usize,
    last_error_at: usize,
    mean_distance: f64,
    m2_distance: f64,
    m2s_max: f64,
    state: DetectorState,
}

impl Default for Eddm {
    fn default() -> Self {
        Self::new()
    }
}

impl Eddm {
    pub fn new() -> Self {
        Self {
            n: 1,
            num_errors: 0,
            last_error_at: 0,
            mean_distance: 0.0,
            m2_distance: 0.0,
            m2s_max: 0.0,
            state: DetectorState::default(),
        }
    }

    pub fn num_errors(&self) -> usize {
        self.num_errors
    }
}

impl ChangeDetector for Eddm {
    fn input(&mut self, value: f64) {
        if self.state.change_detected || !self.state.initialized {
            *self = Self::new();
            self.state.initialized = true;
        }
        self.state.change_detected = false;
        self.n += 1;

        if value != 1.0 {
            return;
        }

        self.state.warning_zone = false;
        self.state.delay = 0.0;
        self.num_errors += 1;

        let error_at = self.n - 1;
        let distance = (error_at - self.last_error_at) as f64;
        self.last_error_at = error_at;

        // Welford update of the distance mean and second moment
        let old_mean = self.mean_distance;
        self.mean_distance += (distance - self.mean_distance) / self.num_errors as f64;
        self.m2_distance += (distance - self.mean_distance) * (distance - old_mean);
        self.state.estimation = self.mean_distance;

        let std = (self.m2_distance / self.num_errors as f64).sqrt();
        let m2s = self.mean_distance + 2.0 * std;

        if self.n < MIN_INSTANCES {
            return;
        }

        if m2s > self.m2s_max {
            self.m2s_max = m2s;
            return;
        }

        let ratio = m2s / self.m2s_max;
        if self.num_errors > MIN_ERRORS && ratio < DRIFT_RATIO {
            self.state.change_detected = true;
            tracing::debug!(
                detector = "EDDM",
                errors = self.num_errors,
                ratio,
                "drift detected"
            );
        } else if self.num_errors > MIN_ERRORS && ratio < WARNING_RATIO {
            self.state.warning_zone = true;
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "EDDM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_errors_move_the_estimate() {
        let mut eddm = Eddm::new();
        eddm.input(0.0);
        eddm.input(0.0);
        assert_eq!(eddm.estimation(), 0.0);
        eddm.input(1.0);
        assert_eq!(eddm.num_errors(), 1);
        assert_eq!(eddm.estimation(), 3.0);
    }

    #[test]
    fn test_needs_minimum_errors() {
        let mut eddm = Eddm::new();
        let changes = eddm.input_all(&[1.0; 31]);
        assert_eq!(changes, 0);
    }
}
