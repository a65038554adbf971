//! Error types for rolling-ta.
//!
//! Only configuration problems are errors. Numeric edge cases (division by
//! zero, insufficient history, log of a non-positive value) never raise; they
//! resolve to the missing marker described in [`crate::missing`].

use thiserror::Error;

/// The main error type for rolling-ta operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A window size, span or period is invalid.
    ///
    /// Returned when the value is zero or otherwise unusable for the
    /// requested operation.
    #[error("invalid period {period}: {reason}")]
    InvalidPeriod {
        /// The invalid period value that was provided.
        period: usize,
        /// Description of why the period is invalid.
        reason: &'static str,
    },

    /// `min_periods` lies outside `[1, size]`.
    #[error("invalid min_periods {min_periods}: must be between 1 and window size {size}")]
    InvalidMinPeriods {
        /// The requested minimum number of observations.
        min_periods: usize,
        /// The window size it was paired with.
        size: usize,
    },

    /// A floating-point parameter is outside its valid domain.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected value, formatted for display.
        value: String,
        /// Description of the valid domain.
        reason: &'static str,
    },

    /// Two inputs that must be aligned have different lengths.
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch {
        /// Length of the reference input.
        expected: usize,
        /// Length of the offending input.
        actual: usize,
    },

    /// An explicit index is not monotonic.
    #[error("index is not monotonic at position {position}")]
    InvalidIndex {
        /// First position whose label is smaller than its predecessor.
        position: usize,
    },

    /// Two indexed inputs disagree on the label at some position.
    #[error("index mismatch at position {position}")]
    IndexMismatch {
        /// First position where the labels differ.
        position: usize,
    },

    /// A required OHLCV field could not be resolved from the input labels.
    #[error("missing required field: {field}")]
    MissingField {
        /// Canonical name of the field.
        field: &'static str,
    },

    /// Failed to convert a numeric value to the target type.
    ///
    /// This occurs when converting a `usize` window size to a generic float
    /// type fails.
    #[error("numeric conversion failed: {context}")]
    NumericConversion {
        /// Description of the conversion that failed.
        context: &'static str,
    },

    /// A method name did not match any supported reducer or moving average.
    #[error("unknown method '{name}'")]
    UnknownMethod {
        /// The name that failed to resolve.
        name: String,
    },
}

/// Convenience type alias for Results using the rolling-ta Error type.
pub type Result<T> = std::result::Result<T, Error>;
