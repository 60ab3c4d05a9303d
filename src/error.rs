//! Error types for detector construction and configuration loading.
//!
//! Feeding values into a detector never fails. Everything that can go wrong
//! happens before the first `input()` call: a parameter is out of range, or a
//! configuration file cannot be read or parsed.

use thiserror::Error;

/// Result type alias for driftwatch operations.
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Errors raised while building a detector or loading its configuration.
#[derive(Error, Debug)]
pub enum DetectorError {
    /// A configuration field is outside its valid range.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Reason why the parameter is invalid.
        reason: String,
    },

    /// A configuration document could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DetectorError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Require `value` to lie strictly inside (0, 1).
///
/// Every confidence or significance level ends up inside `ln(1/x)`, so both
/// endpoints are rejected.
pub(crate) fn check_open_unit(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(DetectorError::invalid_parameter(
            name,
            format!("must be in (0, 1), got {}", value),
        ))
    }
}

/// Require `value` to be a finite, strictly positive number.
pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DetectorError::invalid_parameter(
            name,
            format!("must be positive and finite, got {}", value),
        ))
    }
}

/// Require a size parameter to be at least `min`.
pub(crate) fn check_min_size(name: &str, value: usize, min: usize) -> Result<()> {
    if value >= min {
        Ok(())
    } else {
        Err(DetectorError::invalid_parameter(
            name,
            format!("must be >= {}, got {}", min, value),
        ))
    }
}
