//! CLI error types.
//!
//! [`CliError`] wraps everything that can go wrong between reading the input
//! file and writing the result. Messages say what went wrong and, where it
//! helps, how to fix it.

use std::io;

use thiserror::Error;

/// CLI error type encompassing all possible error conditions.
#[derive(Debug, Error)]
pub enum CliError {
    /// An I/O error occurred while reading or writing files.
    #[error(
        "I/O error{}: {source}",
        .path.as_ref().map(|p| format!(" with file '{p}'")).unwrap_or_default()
    )]
    IoError {
        /// The underlying I/O error.
        source: io::Error,
        /// Path that caused the error, if known.
        path: Option<String>,
    },

    /// The CSV input is malformed.
    #[error(
        "CSV parse error{}: {message}",
        .line.map(|l| format!(" on line {l}")).unwrap_or_default()
    )]
    CsvParseError {
        /// Description of the parse error.
        message: String,
        /// Line number where the error occurred, if known.
        line: Option<usize>,
    },

    /// The library rejected the configuration or input.
    #[error("computation error: {0}")]
    Library(#[from] rolling_ta::Error),

    /// An invalid argument was provided.
    #[error(
        "invalid argument '{argument}': {reason}{}",
        .suggestion.as_ref().map(|s| format!(". {s}")).unwrap_or_default()
    )]
    InvalidArgument {
        /// Name of the invalid argument.
        argument: String,
        /// Why it is invalid.
        reason: String,
        /// Suggestion for valid values.
        suggestion: Option<String>,
    },
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            source: err,
            path: None,
        }
    }
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .and_then(|p| usize::try_from(p.line()).ok());
        Self::CsvParseError {
            message: err.to_string(),
            line,
        }
    }
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
