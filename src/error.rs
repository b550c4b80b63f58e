// =============================================================================
// Error types for the indicator engine
// =============================================================================

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by [`crate::indicators::IndicatorEngine::derive`].
///
/// Short histories are not errors: they show up as absent values in the
/// affected indicator columns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The bar series violates the engine's input contract.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        /// Index of the offending bar, when one can be named.
        index: Option<usize>,
    },
}

impl EngineError {
    /// Create an invalid input error for the whole series.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            index: None,
        }
    }

    /// Create an invalid input error pointing at bar `index`.
    pub fn invalid_input_at(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            index: Some(index),
        }
    }

    /// Empty series.
    pub fn empty_series() -> Self {
        Self::invalid_input("series contains no bars")
    }

    /// Bar at `index` does not come strictly after its predecessor.
    pub fn out_of_order(index: usize, previous: NaiveDate, current: NaiveDate) -> Self {
        Self::invalid_input_at(
            index,
            format!("bar {index} dated {current} is not after {previous}"),
        )
    }

    /// Bar at `index` repeats the previous date.
    pub fn duplicate_timestamp(index: usize, date: NaiveDate) -> Self {
        Self::invalid_input_at(index, format!("bar {index} repeats date {date}"))
    }
}

/// Unrecognised lookback period code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown period '{value}': expected one of 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y")]
pub struct PeriodParseError {
    pub value: String,
}
