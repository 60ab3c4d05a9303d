// HDDM_A: Hoeffding-bound drift detection with moving averages
//
// Scientific Foundation:
// [6] Frias-Blanco, I., del Campo-Avila, J., Ramos-Jimenez, G., Morales-Bueno, R.,
//     Ortiz-Diaz, A., & Caballero-Mota, Y. (2015). Online and non-parametric drift
//     detection methods based on Hoeffding's bounds. IEEE TKDE 27(3).
//
// The stream is split at the prefix whose mean plus its Hoeffding bound is
// smallest (for increments) or whose mean minus the bound is largest (for
// decrements); the suffix mean is then compared against that prefix.

use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_open_unit, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`HddmA`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct HddmAConfig {
    /// Confidence level for drift
    pub drift_confidence: f64,
    /// Confidence level for the warning zone
    pub warning_confidence: f64,
    /// Also monitor decreases of the mean (they reset, never signal)
    pub two_sided: bool,
}

impl Default for HddmAConfig {
    fn default() -> Self {
        Self {
            drift_confidence: 0.001,
            warning_confidence: 0.005,
            two_sided: true,
        }
    }
}

impl HddmAConfig {
    pub fn validate(&self) -> Result<()> {
        check_open_unit("drift_confidence", self.drift_confidence)?;
        check_open_unit("warning_confidence", self.warning_confidence)?;
        Ok(())
    }
}

/// Prefix of the stream summarised by count and sum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Prefix {
    n: usize,
    sum: f64,
}

impl Prefix {
    fn mean(&self) -> f64 {
        self.sum / self.n as f64
    }
}

/// Hoeffding half-width for a mean over `n` values.
fn hoeffding(n: usize, confidence: f64) -> f64 {
    (1.0 / (2.0 * n as f64) * (1.0 / confidence).ln()).sqrt()
}

/// Does the mean of `total` exceed the mean of its prefix `cut` beyond the bound?
fn mean_increased(cut: Prefix, total: Prefix, confidence: f64) -> bool {
    if cut.n == total.n {
        return false;
    }
    let m = (total.n - cut.n) as f64 / cut.n as f64 * (1.0 / total.n as f64);
    let bound = (m / 2.0 * (2.0 / confidence).ln()).sqrt();
    total.mean() - cut.mean() >= bound
}

/// HDDM_A change detector
#[derive(Debug, Clone)]
pub struct HddmA {
    config: HddmAConfig,
    total: Prefix,
    min_cut: Prefix,
    max_cut: Prefix,
    /// Statistics of the suffix that triggered the last reset
    last_suffix: Prefix,
    state: DetectorState,
}

impl HddmA {
    pub fn new(config: HddmAConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            total: Prefix::default(),
            min_cut: Prefix::default(),
            max_cut: Prefix::default(),
            last_suffix: Prefix::default(),
            state: DetectorState::default(),
        })
    }

    /// Restart the statistics, remembering the suffix after `cut` as the estimate.
    fn restart_from(&mut self, cut: Prefix) {
        self.last_suffix = Prefix {
            n: self.total.n - cut.n,
            sum: self.total.sum - cut.sum,
        };
        self.total = Prefix::default();
        self.min_cut = Prefix::default();
        self.max_cut = Prefix::default();
    }

    fn update_estimation(&mut self) {
        if self.total.n >= self.last_suffix.n && self.total.n > 0 {
            self.last_suffix = Prefix::default();
            self.state.estimation = self.total.mean();
            self.state.delay = self.total.n as f64;
        } else if self.last_suffix.n > 0 {
            self.state.estimation = self.last_suffix.mean();
            self.state.delay = self.last_suffix.n as f64;
        }
    }
}

impl ChangeDetector for HddmA {
    fn input(&mut self, value: f64) {
        self.state.initialized = true;
        self.total.n += 1;
        self.total.sum += value;

        if self.min_cut.n == 0 {
            self.min_cut = self.total;
        }
        if self.max_cut.n == 0 {
            self.max_cut = self.total;
        }

        let confidence = self.config.drift_confidence;
        let total_bound = hoeffding(self.total.n, confidence);
        if self.min_cut.mean() + hoeffding(self.min_cut.n, confidence)
            >= self.total.mean() + total_bound
        {
            self.min_cut = self.total;
        }
        if self.max_cut.mean() - hoeffding(self.max_cut.n, confidence)
            <= self.total.mean() - total_bound
        {
            self.max_cut = self.total;
        }

        self.state.clear_signals();
        if mean_increased(self.min_cut, self.total, confidence) {
            self.state.change_detected = true;
            tracing::debug!(
                detector = "HDDM_A",
                instances = self.total.n,
                estimation = self.total.mean(),
                "drift detected"
            );
            self.restart_from(self.min_cut);
        } else if mean_increased(self.min_cut, self.total, self.config.warning_confidence) {
            self.state.warning_zone = true;
        }

        if self.config.two_sided && self.total.n > 0 {
            // A decrease is an increase of the prefix over the suffix
            let prefix = Prefix {
                n: self.max_cut.n,
                sum: -self.max_cut.sum,
            };
            let total = Prefix {
                n: self.total.n,
                sum: -self.total.sum,
            };
            if mean_increased(prefix, total, confidence) {
                self.restart_from(self.max_cut);
            }
        }

        self.update_estimation();
    }

    fn reset(&mut self) {
        self.total = Prefix::default();
        self.min_cut = Prefix::default();
        self.max_cut = Prefix::default();
        self.last_suffix = Prefix::default();
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "HDDM_A"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_increased_requires_suffix() {
        let cut = Prefix { n: 10, sum: 0.0 };
        assert!(!mean_increased(cut, cut, 0.001));
    }

    #[test]
    fn test_estimation_after_drift_uses_suffix() {
        let mut hddm = HddmA::new(HddmAConfig::default()).unwrap();
        let mut fired = false;
        for i in 0..2000 {
            hddm.input(if i < 1000 { 0.0 } else { 1.0 });
            if hddm.is_change() {
                fired = true;
                assert!(hddm.estimation() > 0.9);
                break;
            }
        }
        assert!(fired);
    }

    #[test]
    fn test_one_sided_ignores_decrease() {
        let config = HddmAConfig {
            two_sided: false,
            ..Default::default()
        };
        let mut hddm = HddmA::new(config).unwrap();
        for i in 0..2000 {
            hddm.input(if i < 1000 { 1.0 } else { 0.0 });
            assert!(!hddm.is_change());
        }
        assert!(hddm.estimation() < 0.6);
    }
}
