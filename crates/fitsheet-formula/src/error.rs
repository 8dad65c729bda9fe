//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing formulas or walking their dependencies
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reference text that does not name a cell
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A reference chain leads back to where it started
    #[error("Circular reference through {0}")]
    CircularReference(String),

    /// A reference chain is longer than the configured limit
    #[error("Reference chain deeper than {0}")]
    DepthExceeded(usize),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] fitsheet_core::Error),
}
