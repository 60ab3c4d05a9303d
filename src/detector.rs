//! The change-detector contract shared by every algorithm in this crate.
//!
//! A detector consumes one scalar per call, typically `0.0` for a correct
//! prediction and `1.0` for an error, and after each call exposes a small
//! public record: did the distribution change, are we in the warning zone,
//! what is the current estimate, and how far back the change started.
//!
//! # State machine
//!
//! ```text
//!            input(x)                 input(x)
//!   STABLE ───────────▶ WARNING ───────────────▶ CHANGE
//!     ▲                    │                       │
//!     └────────────────────┴──── reset() ◀─────────┘
//! ```
//!
//! `is_change()` reflects only the most recent `input()` call. Detectors in the
//! DDM family restart their statistics on the call that follows a change; the
//! windowed and repository detectors keep their (already truncated) window.

use serde::{Deserialize, Serialize};

/// Public state shared by every detector, as of the last `input()` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorState {
    /// Current estimate of the monitored mean (usually an error rate)
    pub estimation: f64,
    /// A change was signalled by the last `input()`
    pub change_detected: bool,
    /// The detector sits between stable and confirmed drift
    pub warning_zone: bool,
    /// Instances since the estimated onset of the change, when the detector knows it
    pub delay: f64,
    /// `input()` has been called at least once since construction or reset
    pub initialized: bool,
}

impl DetectorState {
    /// Clear the per-call signals, keeping the estimate.
    pub(crate) fn clear_signals(&mut self) {
        self.change_detected = false;
        self.warning_zone = false;
    }
}

/// Common interface of all change detectors.
///
/// `input` is the single mutator and must be called once per stream value in
/// arrival order; calling it twice with the same value counts it twice.
/// Instances are `Send` so a learner thread can own one, but a detector models
/// exactly one logical stream and is never shared.
pub trait ChangeDetector: Send + std::fmt::Debug {
    /// Feed the next stream value.
    fn input(&mut self, value: f64);

    /// Return to the just-constructed state.
    fn reset(&mut self);

    /// Snapshot of the public state.
    fn state(&self) -> &DetectorState;

    /// Short algorithm name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Change signalled by the last `input()`.
    fn is_change(&self) -> bool {
        self.state().change_detected
    }

    /// Warning zone reported by the last `input()`.
    fn is_warning(&self) -> bool {
        self.state().warning_zone
    }

    fn estimation(&self) -> f64 {
        self.state().estimation
    }

    fn delay(&self) -> f64 {
        self.state().delay
    }

    fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    /// Feed a slice of values and return how many of them raised a change.
    fn input_all(&mut self, values: &[f64]) -> usize {
        let mut changes = 0;
        for &value in values {
            self.input(value);
            if self.is_change() {
                changes += 1;
            }
        }
        changes
    }
}

/// Feed `values` to `detector` and return the 0-based positions that raised a change.
pub fn change_points(detector: &mut dyn ChangeDetector, values: &[f64]) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, &value)| {
            detector.input(value);
            detector.is_change().then_some(i)
        })
        .collect()
}
