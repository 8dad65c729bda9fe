//! Error types for fitsheet-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fitsheet-core
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed cell position
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Column number outside the addressable range
    #[error("Column number {0} out of range")]
    ColumnOutOfRange(u32),
}
