//! # fitsheet-core
//!
//! Core data structures for the fitsheet formula engine.
//!
//! This crate provides the fundamental types used throughout fitsheet:
//! - [`CellPosition`] - Cell addressing ("A1", "AB12") and column conversion
//! - [`CellValue`] - The tri-state result of evaluation (empty, number, text)
//!
//! ## Example
//!
//! ```rust
//! use fitsheet_core::CellPosition;
//!
//! let pos = CellPosition::parse("AA7").unwrap();
//! assert_eq!(pos.column_number(), 27);
//! assert_eq!(CellPosition::number_to_column(27), "AA");
//! ```

pub mod cell;
pub mod error;

// Re-exports for convenience
pub use cell::{CellPosition, CellValue};
pub use error::{Error, Result};
