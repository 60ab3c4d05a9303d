//! ADaptive WINdowing (ADWIN)
//!
//! Keeps a window of the most recent values, summarised as an exponential
//! histogram, and drops its oldest part whenever two sub-windows have means
//! that differ by more than a Hoeffding/Bernstein style bound.
//!
//! # Scientific Foundation
//!
//! Bifet, A., & Gavalda, R. (2007). Learning from time-changing data with
//! adaptive windowing. SIAM SDM. With `M` buckets per size the histogram holds
//! `O(M log W)` buckets for a window of width `W`.
//!
//! # Layout
//!
//! ```text
//!   newest                                            oldest
//!   row 0: [1][1][1]   row 1: [2][2]   row 2: [4]  ... row k: [2^k]
//! ```
//!
//! A row holds at most `max_buckets` buckets between insertions; a new value
//! that overflows row 0 merges its two oldest buckets into row 1, cascading.

use super::bucket::Bucket;
use crate::arena::Arena;
use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{check_min_size, check_open_unit, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Configuration for [`Adwin`] and [`AdwinDetector`]
///
/// # Example
/// ```
/// use driftwatch::window::AdwinConfig;
///
/// let config = AdwinConfig::default();
/// assert_eq!(config.delta, 0.002);
/// assert_eq!(config.clock, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(default)]
pub struct AdwinConfig {
    /// Confidence of the cut test
    pub delta: f64,
    /// Cut points are searched every `clock` insertions
    pub clock: usize,
    /// Buckets of equal size kept per row
    pub max_buckets: usize,
    /// Width the window must exceed before any cut is searched
    pub min_window_length: usize,
    /// Both sub-windows must hold more than `min_subwindow_length + 1` values
    pub min_subwindow_length: usize,
}

impl Default for AdwinConfig {
    fn default() -> Self {
        Self {
            delta: 0.002,
            clock: 32,
            max_buckets: 5,
            min_window_length: 10,
            min_subwindow_length: 5,
        }
    }
}

impl AdwinConfig {
    /// Lower false-positive rate
    pub fn strict() -> Self {
        Self {
            delta: 0.0001,
            ..Self::default()
        }
    }

    /// Checks after every insertion with a looser confidence
    pub fn sensitive() -> Self {
        Self {
            delta: 0.01,
            clock: 1,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_open_unit("delta", self.delta)?;
        check_min_size("clock", self.clock, 1)?;
        check_min_size("max_buckets", self.max_buckets, 2)?;
        check_min_size("min_subwindow_length", self.min_subwindow_length, 1)?;
        Ok(())
    }
}

/// One row of the histogram: buckets of equal count, oldest at the front.
type Row = VecDeque<Bucket>;

/// The adaptive window itself.
#[derive(Debug, Clone)]
pub struct Adwin {
    config: AdwinConfig,
    rows: Arena<Row>,
    time: u64,
    width: usize,
    total: f64,
    variance: f64,
    bucket_count: usize,
    max_bucket_count: usize,
    detections: usize,
}

impl Adwin {
    pub fn new(config: AdwinConfig) -> Result<Self> {
        config.validate()?;
        let mut rows = Arena::new();
        rows.push_newest(Row::with_capacity(config.max_buckets + 1));
        Ok(Self {
            config,
            rows,
            time: 0,
            width: 0,
            total: 0.0,
            variance: 0.0,
            bucket_count: 0,
            max_bucket_count: 0,
            detections: 0,
        })
    }

    pub fn config(&self) -> &AdwinConfig {
        &self.config
    }

    /// Number of values in the window.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Mean of the window, `0.0` when empty.
    pub fn estimation(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.total / self.width as f64
        }
    }

    /// Variance of the values in the window.
    pub fn variance(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            (self.variance / self.width as f64).max(0.0)
        }
    }

    /// Buckets currently in use.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Largest number of buckets ever in use at once.
    pub fn max_bucket_count(&self) -> usize {
        self.max_bucket_count
    }

    /// Number of rows (distinct bucket sizes).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of updates that shrank the window.
    pub fn detections(&self) -> usize {
        self.detections
    }

    /// Buckets from newest to oldest.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.rows.iter_newest_first().flat_map(|row| row.iter().rev())
    }

    /// Add a value; returns true when the window was shrunk.
    pub fn update(&mut self, value: f64) -> bool {
        self.time += 1;
        self.insert(value);

        let mut shrunk = false;
        if self.time % self.config.clock as u64 == 0 && self.width > self.config.min_window_length
        {
            let before = self.width;
            while self.find_cut() {
                if self.delete_oldest().is_none() {
                    break;
                }
                shrunk = true;
            }
            if shrunk {
                self.detections += 1;
                tracing::debug!(
                    detector = "ADWIN",
                    dropped = before - self.width,
                    width = self.width,
                    "window truncated"
                );
            }
        }
        shrunk
    }

    fn insert(&mut self, value: f64) {
        self.width += 1;
        if self.width > 1 {
            let prev = (self.width - 1) as f64;
            let diff = value - self.total / prev;
            self.variance += prev * diff * diff / self.width as f64;
        }
        self.total += value;

        if let Some(row) = self.rows.newest().and_then(|idx| self.rows.get_mut(idx)) {
            row.push_back(Bucket::single(value));
        }
        self.bucket_count += 1;
        self.compress();
        self.max_bucket_count = self.max_bucket_count.max(self.bucket_count);
    }

    /// Cascade overflowing rows into the next bucket size.
    fn compress(&mut self) {
        let limit = self.config.max_buckets;
        let mut cursor = self.rows.newest();
        while let Some(idx) = cursor {
            let merged = match self.rows.get_mut(idx) {
                Some(row) if row.len() > limit => match (row.pop_front(), row.pop_front()) {
                    (Some(a), Some(b)) => a.merge(&b),
                    _ => break,
                },
                _ => break,
            };
            let next = match self.rows.older(idx) {
                Some(next) => next,
                None => self.rows.push_oldest(Row::with_capacity(limit + 1)),
            };
            self.bucket_count -= 1;
            match self.rows.get_mut(next) {
                Some(row) => {
                    row.push_back(merged);
                    if row.len() <= limit {
                        break;
                    }
                }
                None => break,
            }
            cursor = Some(next);
        }
    }

    /// Drop the oldest bucket and return how many values it held.
    fn delete_oldest(&mut self) -> Option<usize> {
        let idx = self.rows.oldest()?;
        let bucket = self.rows.get_mut(idx)?.pop_front()?;

        self.width -= bucket.count;
        self.total -= bucket.total;
        let n1 = bucket.count as f64;
        let rest = self.width as f64;
        let between = if self.width == 0 {
            0.0
        } else {
            let diff = bucket.mean() - self.total / rest;
            n1 * rest * diff * diff / (n1 + rest)
        };
        self.variance -= bucket.variance + between;
        self.bucket_count -= 1;

        let emptied = self.rows.get(idx).is_some_and(VecDeque::is_empty);
        if emptied && self.rows.len() > 1 {
            self.rows.remove(idx);
        }
        Some(bucket.count)
    }

    /// Scan every bucket boundary from the oldest end and report whether any
    /// split separates sub-windows with significantly different means.
    fn find_cut(&self) -> bool {
        let min_sub = self.config.min_subwindow_length;
        let mut n0 = 0usize;
        let mut n1 = self.width;
        let mut u0 = 0.0;
        let mut u1 = self.total;

        let mut cursor = self.rows.oldest();
        while let Some(idx) = cursor {
            let Some(row) = self.rows.get(idx) else {
                break;
            };
            let newest_row = self.rows.newer(idx).is_none();
            for (k, bucket) in row.iter().enumerate() {
                n0 += bucket.count;
                n1 -= bucket.count;
                u0 += bucket.total;
                u1 -= bucket.total;
                if newest_row && k + 1 == row.len() {
                    return false;
                }
                if n0 > min_sub + 1 && n1 > min_sub + 1 && self.cut_holds(n0, n1, u0, u1) {
                    return true;
                }
            }
            cursor = self.rows.newer(idx);
        }
        false
    }

    fn cut_holds(&self, n0: usize, n1: usize, u0: f64, u1: f64) -> bool {
        let min_sub = self.config.min_subwindow_length as f64;
        let n = self.width as f64;
        let dd = (2.0 * n.ln() / self.config.delta).ln();
        let v = self.variance();
        let m = 1.0 / (n0 as f64 - min_sub + 1.0) + 1.0 / (n1 as f64 - min_sub + 1.0);
        let epsilon = (2.0 * m * v * dd).sqrt() + 2.0 / 3.0 * dd * m;
        (u0 / n0 as f64 - u1 / n1 as f64).abs() > epsilon
    }

    /// Empty the window, keeping the configuration.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.rows
            .push_newest(Row::with_capacity(self.config.max_buckets + 1));
        self.time = 0;
        self.width = 0;
        self.total = 0.0;
        self.variance = 0.0;
        self.bucket_count = 0;
        self.max_bucket_count = 0;
        self.detections = 0;
    }
}

/// ADWIN as a [`ChangeDetector`]
///
/// Signals a change only when a truncation raised the window mean, so for an
/// error signal only deterioration is reported.
#[derive(Debug, Clone)]
pub struct AdwinDetector {
    adwin: Adwin,
    state: DetectorState,
}

impl AdwinDetector {
    pub fn new(config: AdwinConfig) -> Result<Self> {
        Ok(Self {
            adwin: Adwin::new(config)?,
            state: DetectorState::default(),
        })
    }

    /// The underlying window.
    pub fn window(&self) -> &Adwin {
        &self.adwin
    }

    pub fn width(&self) -> usize {
        self.adwin.width()
    }

    pub fn bucket_count(&self) -> usize {
        self.adwin.bucket_count()
    }

    pub fn max_bucket_count(&self) -> usize {
        self.adwin.max_bucket_count()
    }

    pub fn variance(&self) -> f64 {
        self.adwin.variance()
    }

    pub fn detections(&self) -> usize {
        self.adwin.detections()
    }
}

impl ChangeDetector for AdwinDetector {
    fn input(&mut self, value: f64) {
        self.state.initialized = true;
        self.state.clear_signals();

        let before = self.adwin.estimation();
        if self.adwin.update(value) && self.adwin.estimation() > before {
            self.state.change_detected = true;
            tracing::debug!(
                detector = "ADWIN",
                width = self.adwin.width(),
                estimation = self.adwin.estimation(),
                "drift detected"
            );
        }
        self.state.delay = 0.0;
        self.state.estimation = self.adwin.estimation();
    }

    fn reset(&mut self) {
        self.adwin.clear();
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "ADWIN"
    }
}
