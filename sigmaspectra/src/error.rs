//! Error types used throughout this crate.

use std::path::PathBuf;
use thiserror::Error;

/// Catch-all error for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The target spectrum or a search parameter failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A motion file could not be read or parsed.
    #[error("unable to read '{path}': {reason}")]
    Io {
        /// Path of the offending file.
        path: PathBuf,
        /// Why reading it failed.
        reason: String,
    },
    /// An interpolation query fell outside the defined domain.
    #[error("value {value} outside of the interpolation range [{min}, {max}]")]
    OutOfRange {
        /// The queried abscissa.
        value: f64,
        /// Smallest defined abscissa.
        min: f64,
        /// Largest defined abscissa.
        max: f64,
    },
    /// The computation was cancelled cooperatively.
    #[error("computation cancelled")]
    Cancelled,
    /// The enumeration completed but no suite satisfied the constraints.
    #[error("no suites satisfied the search constraints")]
    NoSuitesFound,
    /// Error that does not originate from this crate.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `Result` with this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
