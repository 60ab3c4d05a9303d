//! Seeded synthetic 0/1 streams for exercising detectors.
//!
//! Each stream is an endless [`Iterator`] of Bernoulli draws whose success
//! probability follows a schedule: constant, an abrupt switch at a given
//! instance, or a linear ramp. The same seed always yields the same stream.
//!
//! # Example
//! ```
//! use driftwatch::stream::BernoulliStream;
//!
//! let values: Vec<f64> = BernoulliStream::abrupt(0.0, 1.0, 10, 42).take(20).collect();
//! assert!(values[..10].iter().all(|&v| v == 0.0));
//! assert!(values[10..].iter().all(|&v| v == 1.0));
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Schedule {
    Stationary { p: f64 },
    Abrupt { p0: f64, p1: f64, at: u64 },
    Gradual { p0: f64, p1: f64, start: u64, slope: f64 },
}

/// Bernoulli draws (`0.0` / `1.0`) with a scheduled success probability.
#[derive(Debug, Clone)]
pub struct BernoulliStream {
    schedule: Schedule,
    position: u64,
    rng: StdRng,
}

impl BernoulliStream {
    fn with_schedule(schedule: Schedule, seed: u64) -> Self {
        Self {
            schedule,
            position: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Constant success probability `p`.
    pub fn stationary(p: f64, seed: u64) -> Self {
        Self::with_schedule(Schedule::Stationary { p }, seed)
    }

    /// `p0` for the first `at` draws, `p1` afterwards.
    pub fn abrupt(p0: f64, p1: f64, at: u64, seed: u64) -> Self {
        Self::with_schedule(Schedule::Abrupt { p0, p1, at }, seed)
    }

    /// `p0` for the first `start` draws, then moving toward `p1` by `slope`
    /// per draw until it gets there.
    pub fn gradual(p0: f64, p1: f64, start: u64, slope: f64, seed: u64) -> Self {
        Self::with_schedule(
            Schedule::Gradual {
                p0,
                p1,
                start,
                slope: slope.abs(),
            },
            seed,
        )
    }

    /// Draws produced so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Success probability of the next draw.
    pub fn probability(&self) -> f64 {
        let p = match self.schedule {
            Schedule::Stationary { p } => p,
            Schedule::Abrupt { p0, p1, at } => {
                if self.position < at {
                    p0
                } else {
                    p1
                }
            }
            Schedule::Gradual {
                p0,
                p1,
                start,
                slope,
            } => {
                if self.position < start {
                    p0
                } else {
                    let step = (self.position - start + 1) as f64 * slope;
                    if p1 >= p0 {
                        (p0 + step).min(p1)
                    } else {
                        (p0 - step).max(p1)
                    }
                }
            }
        };
        p.clamp(0.0, 1.0)
    }
}

impl Iterator for BernoulliStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let p = self.probability();
        self.position += 1;
        let draw: f64 = self.rng.gen();
        Some(if draw < p { 1.0 } else { 0.0 })
    }
}
