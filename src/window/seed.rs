//! SEED: block-based drift detection with opportunistic compression
//!
//! Values are appended to fixed-size blocks chained from oldest to newest.
//! Two independent passes keep the window small:
//!
//! - **Compression**: every `compression_term` new blocks, walk from the newest
//!   block toward the oldest and fold a block into its older neighbour when
//!   their means differ by less than a threshold that grows with each step
//!   (linear or exponential decay of `epsilon_prime`). Old history is thus kept
//!   at coarse granularity.
//! - **Drift check**: every `block_size` values, test each block boundary with
//!   the ADWIN bound and, on the first boundary that holds, drop every block
//!   older than it.
//!
//! # Scientific Foundation
//!
//! Huang, D. T. J., Koh, Y. S., Dobbie, G., & Pears, R. (2014). Detecting
//! volatility shift in data streams. IEEE ICDM.

use super::bucket::Bucket;
use crate::arena::Arena;
use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, check_open_unit, check_positive, Result};
use serde::{Deserialize, Serialize};

/// How the compression threshold grows while walking back through the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum DecayMode {
    /// `epsilon += epsilon_prime * alpha` per step
    #[default]
    Linear,
    /// `epsilon = epsilon_prime * (1 + alpha)^i` at step `i`
    Exponential,
}

/// Configuration for [`Seed`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct SeedConfig {
    /// Confidence of the drift test
    pub delta: f64,
    /// Values per fresh block; also the drift-check period
    pub block_size: usize,
    /// Base compression threshold
    pub epsilon_prime: f64,
    /// Growth rate of the compression threshold
    pub alpha: f64,
    /// New blocks between compression passes
    pub compression_term: usize,
    pub decay: DecayMode,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            delta: 0.05,
            block_size: 32,
            epsilon_prime: 0.01,
            alpha: 0.8,
            compression_term: 75,
            decay: DecayMode::Linear,
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<()> {
        check_open_unit("delta", self.delta)?;
        check_min_size("block_size", self.block_size, 1)?;
        check_positive("epsilon_prime", self.epsilon_prime)?;
        check_positive("alpha", self.alpha)?;
        check_min_size("compression_term", self.compression_term, 1)?;
        Ok(())
    }
}

/// A block of the SEED window: its statistics and the values it can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Block {
    stats: Bucket,
    capacity: usize,
}

impl Block {
    fn empty(capacity: usize) -> Self {
        Self {
            stats: Bucket::default(),
            capacity,
        }
    }

    fn is_full(&self) -> bool {
        self.stats.count >= self.capacity
    }
}

/// SEED change detector
///
/// `estimation()` reports the mean of the current window.
#[derive(Debug, Clone)]
pub struct Seed {
    config: SeedConfig,
    blocks: Arena<Block>,
    width: usize,
    total: f64,
    variance: f64,
    element_count: u64,
    blocks_since_compression: usize,
    state: DetectorState,
}

impl Seed {
    pub fn new(config: SeedConfig) -> Result<Self> {
        config.validate()?;
        let mut blocks = Arena::new();
        blocks.push_newest(Block::empty(config.block_size));
        Ok(Self {
            config,
            blocks,
            width: 0,
            total: 0.0,
            variance: 0.0,
            element_count: 0,
            blocks_since_compression: 0,
            state: DetectorState::default(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Per-block statistics from newest to oldest.
    pub fn blocks(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.blocks.iter_newest_first().map(|b| b.stats)
    }

    fn mean(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.total / self.width as f64
        }
    }

    fn add(&mut self, value: f64) {
        let tail_full = self
            .blocks
            .newest()
            .and_then(|idx| self.blocks.get(idx))
            .map_or(true, Block::is_full);
        if tail_full {
            if self.blocks.len() > 1
                && self.blocks_since_compression > self.config.compression_term
            {
                self.blocks_since_compression = 0;
                self.compress();
            }
            self.blocks.push_newest(Block::empty(self.config.block_size));
            self.blocks_since_compression += 1;
        }

        // Contribution measured against the window before this value
        let increment = if self.width >= 1 {
            let prev = self.width as f64;
            let diff = value - self.total / prev;
            prev * diff * diff / (prev + 1.0)
        } else {
            0.0
        };

        if let Some(tail) = self.blocks.newest().and_then(|idx| self.blocks.get_mut(idx)) {
            tail.stats.count += 1;
            tail.stats.total += value;
            tail.stats.variance += increment;
        }
        self.width += 1;
        self.total += value;
        self.variance += increment;
    }

    /// Fold homogeneous neighbours together, walking from newest to oldest.
    fn compress(&mut self) {
        let before = self.blocks.len();
        let mut epsilon = 0.0;
        let mut step = 0i32;
        let mut cursor = self.blocks.newest();
        while let Some(idx) = cursor {
            let Some(older) = self.blocks.older(idx) else {
                break;
            };
            let (Some(current), Some(previous)) = (self.blocks.get(idx), self.blocks.get(older))
            else {
                break;
            };
            let diff = (previous.stats.mean() - current.stats.mean()).abs();
            epsilon = match self.config.decay {
                DecayMode::Linear => epsilon + self.config.epsilon_prime * self.config.alpha,
                DecayMode::Exponential => {
                    self.config.epsilon_prime * (1.0 + self.config.alpha).powi(step)
                }
            };
            if diff < epsilon {
                if let Some(current) = self.blocks.remove(idx) {
                    if let Some(previous) = self.blocks.get_mut(older) {
                        previous.stats.absorb(&current.stats);
                        previous.capacity += current.capacity;
                    }
                }
            }
            cursor = Some(older);
            step += 1;
        }
        tracing::trace!(
            detector = "SEED",
            before,
            after = self.blocks.len(),
            "blocks compressed"
        );
    }

    fn bound(&self, n0: f64, n1: f64) -> f64 {
        let n = n0 + n1;
        let dd = (2.0 * n.ln() / self.config.delta).ln();
        let v = if self.width == 0 {
            0.0
        } else {
            (self.variance / self.width as f64).max(0.0)
        };
        let m = 1.0 / n0 + 1.0 / n1;
        (2.0 * m * v * dd).sqrt() + 2.0 / 3.0 * dd * m
    }

    /// Test block boundaries from newest to oldest; truncate at the first that holds.
    fn check_drift(&mut self) -> bool {
        let mut n0 = self.width as f64;
        let mut n1 = 0.0;
        let mut u0 = self.total;
        let mut u1 = 0.0;

        let mut cursor = self.blocks.newest();
        while let Some(idx) = cursor {
            let Some(older) = self.blocks.older(idx) else {
                break;
            };
            let Some(block) = self.blocks.get(idx) else {
                break;
            };
            n0 -= block.stats.count as f64;
            n1 += block.stats.count as f64;
            u0 -= block.stats.total;
            u1 += block.stats.total;
            if n0 > 0.0 && n1 > 0.0 && (u1 / n1 - u0 / n0).abs() > self.bound(n0, n1) {
                self.truncate_before(idx);
                return true;
            }
            cursor = Some(older);
        }
        false
    }

    fn truncate_before(&mut self, keep: usize) {
        let before = self.width;
        while let Some(oldest) = self.blocks.oldest() {
            if oldest == keep {
                break;
            }
            if let Some(block) = self.blocks.remove(oldest) {
                self.width -= block.stats.count;
                self.total -= block.stats.total;
                self.variance -= block.stats.variance;
            }
        }
        tracing::debug!(
            detector = "SEED",
            dropped = before - self.width,
            width = self.width,
            "window truncated"
        );
    }
}

impl ChangeDetector for Seed {
    fn input(&mut self, value: f64) {
        self.state.initialized = true;
        self.state.clear_signals();

        self.add(value);
        self.element_count += 1;

        if self.element_count % self.config.block_size as u64 == 0
            && self.blocks.len() >= 2
            && self.check_drift()
        {
            self.state.change_detected = true;
            tracing::debug!(
                detector = "SEED",
                instances = self.element_count,
                estimation = self.mean(),
                "drift detected"
            );
        }
        self.state.delay = 0.0;
        self.state.estimation = self.mean();
    }

    fn reset(&mut self) {
        self.blocks.clear();
        self.blocks.push_newest(Block::empty(self.config.block_size));
        self.width = 0;
        self.total = 0.0;
        self.variance = 0.0;
        self.element_count = 0;
        self.blocks_since_compression = 0;
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "SEED"
    }
}
