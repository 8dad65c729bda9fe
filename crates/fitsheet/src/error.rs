//! Sheet error types

use fitsheet_formula::FormulaError;
use thiserror::Error;

/// Result type for sheet operations
pub type SheetResult<T> = std::result::Result<T, SheetError>;

/// Errors that can occur while editing, saving or loading a sheet
#[derive(Debug, Error)]
pub enum SheetError {
    /// Cell contents were empty
    #[error("Cell contents must not be empty")]
    EmptyContents,

    /// Contents could not be parsed
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not UTF-8
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Document does not start with a checksum header
    #[error("Document has no <HEAD> checksum header")]
    MissingHeader,

    /// Stored checksum does not match the body
    #[error("Checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },

    /// Document body is not a sequence of cell entries
    #[error("Malformed document body: {0}")]
    MalformedBody(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] fitsheet_core::Error),
}
