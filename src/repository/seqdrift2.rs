//! SeqDrift2: reservoir-backed sequential drift detection
//!
//! Like [`SeqDrift1`](super::SeqDrift1) but the reference side is a bounded
//! reservoir sample. At every block boundary the ratio `k` between the
//! right repository and the reservoir is re-optimised by fixed-point
//! iteration of the Bernstein bound, nudged by the direction of the mean
//! shift, and used to size the reservoir for the next block.
//!
//! # Scientific Foundation
//!
//! Pears, R., Sakthithasan, S., & Koh, Y. S. (2014). Detecting concept change
//! in dynamic data streams. Machine Learning, 97(3).

use super::block::Repository;
use super::bound;
use super::reservoir::Reservoir;
use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, check_open_unit, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Starting point of every `k` optimisation.
const INITIAL_K: f64 = 0.5;
/// Relative change in epsilon at which the optimisation stops.
const CONVERGENCE: f64 = 1e-4;
/// Substituted for a zero variance.
const MIN_VARIANCE: f64 = 1e-4;

/// Configuration for [`SeqDrift2`]
///
/// # Example
/// ```
/// use driftwatch::repository::SeqDrift2Config;
///
/// let config = SeqDrift2Config { seed: 7, ..Default::default() };
/// assert_eq!(config.block_size, 200);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct SeqDrift2Config {
    /// Confidence of the drift test
    pub delta: f64,
    /// Values per block; also the test period and the right repository size
    pub block_size: usize,
    /// Seed of the reservoir replacement generator
    pub seed: u64,
}

impl Default for SeqDrift2Config {
    fn default() -> Self {
        Self {
            delta: 0.01,
            block_size: 200,
            seed: 0,
        }
    }
}

impl SeqDrift2Config {
    pub fn validate(&self) -> Result<()> {
        check_open_unit("delta", self.delta)?;
        check_min_size("block_size", self.block_size, 1)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SeqDrift2 {
    config: SeqDrift2Config,
    left: Reservoir,
    right: Repository,
    instances: u64,
    epsilon: f64,
    k: f64,
    rng: StdRng,
    state: DetectorState,
}

impl SeqDrift2 {
    pub fn new(config: SeqDrift2Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            left: Reservoir::new(config.block_size, config.block_size),
            right: Repository::new(config.block_size),
            instances: 0,
            epsilon: 0.0,
            k: INITIAL_K,
            rng: StdRng::seed_from_u64(config.seed),
            state: DetectorState::default(),
            config,
        })
    }

    pub fn width(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn left_len(&self) -> usize {
        self.left.len()
    }

    pub fn right_len(&self) -> usize {
        self.right.len()
    }

    /// Current maximum size of the reference reservoir.
    pub fn reservoir_capacity(&self) -> usize {
        self.left.capacity()
    }

    /// Most recent drift threshold.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Most recent right/reservoir size ratio.
    pub fn k(&self) -> f64 {
        self.k
    }

    fn mean(&self) -> f64 {
        let width = self.width();
        if width == 0 {
            0.0
        } else {
            (self.left.total() + self.right.total()) / width as f64
        }
    }

    fn variance(&self) -> f64 {
        let v = bound::variance(
            self.width(),
            self.left.total() + self.right.total(),
            self.left.squares() + self.right.squares(),
        );
        if v == 0.0 {
            MIN_VARIANCE
        } else {
            v
        }
    }

    /// Epsilon for a right repository that is a fraction `k` of the data.
    fn epsilon_at(&self, k: f64, tests: usize, variance: f64) -> f64 {
        let r = self.config.block_size as f64;
        let x = (4.0 / bound::corrected_delta(self.config.delta, tests)).ln();
        let squared = x * x + 18.0 * r * x * variance;
        (x + squared.sqrt()) / (3.0 * r * (1.0 - k))
    }

    /// Shrink `k` until epsilon stops improving, then resize the reservoir.
    fn optimize(&mut self, tests: usize, mean_increase: f64) {
        let variance = self.variance();
        let mut k = INITIAL_K;
        loop {
            let previous = self.epsilon_at(k, tests, variance);
            k *= 0.75;
            let current = self.epsilon_at(k, tests, variance);
            if (previous - current) / previous < CONVERGENCE {
                break;
            }
        }
        k *= 4.0 / 3.0;
        if mean_increase > 0.0 {
            let adjusted = k + (1.0 - mean_increase.powi(4)) * k;
            // Means outside [0, 1] can push k negative
            if adjusted > 0.0 {
                k = adjusted;
            }
        }
        self.k = k;
        self.epsilon = self.epsilon_at(k, tests, variance);

        let r = self.config.block_size as f64;
        let capacity = ((r * (1.0 - k) / k) as usize).max(self.config.block_size);
        self.left.set_capacity(capacity, &mut self.rng);
    }

    fn drift_detected(&mut self) -> bool {
        let block_size = self.config.block_size;
        if self.width() <= block_size || self.left.is_empty() {
            return false;
        }
        let tests = self.left.len() / block_size;
        if tests < 1 {
            return false;
        }
        let left_mean = self.left.mean();
        let right_mean = self.right.mean();
        self.optimize(tests, right_mean - left_mean);
        self.instances > block_size as u64 && self.epsilon <= (right_mean - left_mean).abs()
    }
}

impl ChangeDetector for SeqDrift2 {
    fn input(&mut self, value: f64) {
        self.state.initialized = true;
        self.state.clear_signals();

        self.instances += 1;
        self.right.push(value);

        if self.instances % self.config.block_size as u64 == 0 {
            if self.drift_detected() {
                self.left.clear();
                self.state.change_detected = true;
                tracing::debug!(
                    detector = "SeqDrift2",
                    instances = self.instances,
                    epsilon = self.epsilon,
                    "drift detected"
                );
            }
            self.left.absorb(&mut self.right, &mut self.rng);
        }

        self.state.delay = 0.0;
        self.state.estimation = self.mean();
    }

    fn reset(&mut self) {
        self.left = Reservoir::new(self.config.block_size, self.config.block_size);
        self.right.clear();
        self.instances = 0;
        self.epsilon = 0.0;
        self.k = INITIAL_K;
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "SeqDrift2"
    }
}
