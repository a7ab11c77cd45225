//! Error types shared by every stage of the forecasting pipeline.

use thiserror::Error;

/// Errors raised when an input violates a precondition of a pipeline stage.
///
/// Every variant carries the offending values so a failed run can be
/// diagnosed from the message alone.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycleError {
    /// Zero (or numerically zero) variance; standardization is undefined.
    #[error("Degenerate series: standard deviation {std_dev} over {len} values")]
    DegenerateSeries { len: usize, std_dev: f64 },

    /// Malformed filter band, or a band the series is too short for.
    #[error("Invalid band: period_low={period_low}, period_high={period_high}, series length={len}")]
    InvalidBand {
        period_low: f64,
        period_high: f64,
        len: usize,
    },

    /// Two series that must share an index do not.
    #[error("Alignment error in {context}: expected {expected}, found {found}")]
    Alignment {
        context: String,
        expected: String,
        found: String,
    },

    /// Missing, non-finite or gapped data.
    #[error("Incomplete data at index {index}: {reason}")]
    IncompleteData { index: usize, reason: String },

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CycleError {
    pub(crate) fn alignment(
        context: impl Into<String>,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Self::Alignment {
            context: context.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn incomplete(index: usize, reason: impl Into<String>) -> Self {
        Self::IncompleteData {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, CycleError>;
