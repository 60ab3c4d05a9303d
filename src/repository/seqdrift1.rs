//! SeqDrift1: sequential hypothesis testing over block repositories
//!
//! Incoming values accumulate in a *right* repository. Every `sample_size`
//! values the subsample means of the right and *left* (reference)
//! repositories are compared against a Bernstein bound whose confidence is
//! corrected for the number of tests already run on the retained history.
//!
//! | outcome     | effect                                                     |
//! |-------------|------------------------------------------------------------|
//! | drift       | drop left, promote right, sample size back to block size   |
//! | warning     | double the sample size, keep right as it is                |
//! | homogeneous | move right into left, dropping left's oldest blocks        |
//!
//! # Scientific Foundation
//!
//! Sakthithasan, S., Pears, R., & Koh, Y. S. (2013). One pass concept change
//! detection for data streams. PAKDD.

use super::block::Repository;
use super::bound;
use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, check_open_unit, DetectorError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for [`SeqDrift1`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct SeqDrift1Config {
    /// Confidence of the drift test; `1 / delta` blocks are kept per side
    pub delta: f64,
    /// Values per block and the initial sample size
    pub block_size: usize,
    /// Confidence of the warning test
    pub warning_delta: f64,
    /// Seed of the subsampling generator
    pub seed: u64,
}

impl Default for SeqDrift1Config {
    fn default() -> Self {
        Self {
            delta: 0.01,
            block_size: 200,
            warning_delta: 0.1,
            seed: 0,
        }
    }
}

impl SeqDrift1Config {
    pub fn validate(&self) -> Result<()> {
        check_open_unit("delta", self.delta)?;
        check_open_unit("warning_delta", self.warning_delta)?;
        check_min_size("block_size", self.block_size, 1)?;
        if self.warning_delta < self.delta {
            return Err(DetectorError::invalid_parameter(
                "warning_delta",
                format!(
                    "must not be below delta ({} < {})",
                    self.warning_delta, self.delta
                ),
            ));
        }
        Ok(())
    }

    /// Blocks retained on either side.
    pub fn window_blocks(&self) -> usize {
        ((1.0 / self.delta) as usize).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Drift,
    Warning,
    Homogeneous,
}

#[derive(Debug, Clone)]
pub struct SeqDrift1 {
    config: SeqDrift1Config,
    left: Repository,
    right: Repository,
    sample_size: usize,
    instances: u64,
    in_warning: bool,
    drift_epsilon: f64,
    warning_epsilon: f64,
    rng: StdRng,
    state: DetectorState,
}

impl SeqDrift1 {
    pub fn new(config: SeqDrift1Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            left: Repository::new(config.block_size),
            right: Repository::new(config.block_size),
            sample_size: config.block_size,
            instances: 0,
            in_warning: false,
            drift_epsilon: 0.0,
            warning_epsilon: 0.0,
            rng: StdRng::seed_from_u64(config.seed),
            state: DetectorState::default(),
            config,
        })
    }

    /// Values held on both sides.
    pub fn width(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn left_len(&self) -> usize {
        self.left.len()
    }

    pub fn right_len(&self) -> usize {
        self.right.len()
    }

    /// Current sample size; grows while in the warning zone.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Most recent drift threshold.
    pub fn drift_epsilon(&self) -> f64 {
        self.drift_epsilon
    }

    fn max_side_len(&self) -> usize {
        self.config.window_blocks().saturating_mul(self.config.block_size)
    }

    fn mean(&self) -> f64 {
        let width = self.width();
        if width == 0 {
            0.0
        } else {
            (self.left.total() + self.right.total()) / width as f64
        }
    }

    fn add_to_right(&mut self, value: f64) {
        if self.right.len() < self.sample_size || self.in_warning {
            self.right.push(value);
        } else {
            tracing::warn!(
                detector = "SeqDrift1",
                right = self.right.len(),
                sample_size = self.sample_size,
                "right repository full, value dropped"
            );
        }
    }

    fn trim_right(&mut self) {
        let cap = self.max_side_len();
        while self.right.len() > cap {
            if self.right.remove_first_block().is_none() {
                break;
            }
        }
    }

    /// Move every right value into left, opening a tested block per sample.
    fn promote_right(&mut self) {
        let sample_size = self.sample_size.max(1);
        for (i, value) in self.right.values().enumerate().collect::<Vec<_>>() {
            self.left.push_marked(value, i % sample_size == 0);
        }
        self.right.clear();
        let window = self.config.window_blocks();
        while self.left.block_count() > window {
            if self.left.remove_first_block().is_none() {
                break;
            }
        }
    }

    fn variance(&self) -> f64 {
        bound::variance(
            self.width(),
            self.left.total() + self.right.total(),
            self.left.squares() + self.right.squares(),
        )
    }

    fn verdict(&mut self) -> Verdict {
        if self.width() <= self.config.block_size || self.left.is_empty() {
            return Verdict::Homogeneous;
        }
        let tests = self.left.tested_blocks() + self.right.tested_blocks();
        if tests <= 1 || self.instances <= self.sample_size as u64 {
            return Verdict::Homogeneous;
        }

        let left_mean = self.left.sample_mean(self.sample_size, &mut self.rng);
        let right_mean = self.right.sample_mean(self.sample_size, &mut self.rng);
        let variance = self.variance();
        self.drift_epsilon = bound::epsilon(self.config.delta, tests, variance, self.sample_size);
        self.warning_epsilon =
            bound::epsilon(self.config.warning_delta, tests, variance, self.sample_size);

        let diff = (right_mean - left_mean).abs();
        if diff < self.warning_epsilon {
            Verdict::Homogeneous
        } else if diff >= self.drift_epsilon {
            Verdict::Drift
        } else {
            Verdict::Warning
        }
    }
}

impl ChangeDetector for SeqDrift1 {
    fn input(&mut self, value: f64) {
        self.state.initialized = true;
        self.state.clear_signals();

        self.instances += 1;
        self.add_to_right(value);

        if self.instances % self.sample_size as u64 == 0 {
            self.right.mark_last_tested();
            if self.in_warning {
                self.trim_right();
            }
            self.in_warning = false;

            match self.verdict() {
                Verdict::Drift => {
                    self.left.clear();
                    self.promote_right();
                    self.sample_size = self.config.block_size;
                    self.state.change_detected = true;
                    tracing::debug!(
                        detector = "SeqDrift1",
                        instances = self.instances,
                        epsilon = self.drift_epsilon,
                        "drift detected"
                    );
                }
                Verdict::Warning => {
                    self.in_warning = true;
                    self.sample_size = self.sample_size.saturating_mul(2).min(self.max_side_len());
                    tracing::trace!(
                        detector = "SeqDrift1",
                        instances = self.instances,
                        sample_size = self.sample_size,
                        "warning zone entered"
                    );
                }
                Verdict::Homogeneous => self.promote_right(),
            }
        }

        self.state.warning_zone = self.in_warning;
        self.state.delay = 0.0;
        self.state.estimation = self.mean();
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.sample_size = self.config.block_size;
        self.instances = 0;
        self.in_warning = false;
        self.drift_epsilon = 0.0;
        self.warning_epsilon = 0.0;
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "SeqDrift1"
    }
}
