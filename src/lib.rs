//! Driftwatch - Online concept-drift detection for scalar data streams
//!
//! This library provides single-pass change detectors with bounded memory,
//! typically fed the 0/1 loss signal of an online learner, plus an ensemble
//! combinator, TOML-driven configuration, synthetic drift streams and
//! detection scoring.
//!
//! ```
//! use driftwatch::detector::ChangeDetector;
//! use driftwatch::window::{AdwinConfig, AdwinDetector};
//!
//! let mut adwin = AdwinDetector::new(AdwinConfig::default())?;
//! let mut values = vec![0.0; 1000];
//! values.extend(vec![1.0; 1000]);
//! assert!(adwin.input_all(&values) >= 1);
//! assert!(adwin.estimation() > 0.9);
//! # Ok::<(), driftwatch::error::DetectorError>(())
//! ```

pub mod arena;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod detector;
pub mod ensemble;
pub mod error;
pub mod evaluation;
pub mod json_output;
pub mod repository;
pub mod simple;
pub mod stream;
pub mod window;

pub use detector::{change_points, ChangeDetector, DetectorState};
pub use error::{DetectorError, Result};
