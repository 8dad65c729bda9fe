//! # fitsheet
//!
//! A small spreadsheet engine.
//!
//! ## Features
//!
//! - Cells holding numbers, text or formulas (`=A1+A2*2`, `="a"+B1`, `=A1<=3`)
//! - Relative and absolute references (`A1`, `$A1`, `A$1`, `$A$1`)
//! - Block copies that move formulas the way their references dictate
//! - Circular reference detection
//! - Checksummed save/load through any `Read`/`Write`
//!
//! ## Example
//!
//! ```rust
//! use fitsheet::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! let pos = |s: &str| s.parse::<CellPosition>().unwrap();
//!
//! sheet.set_cell(&pos("A1"), "10").unwrap();
//! sheet.set_cell(&pos("A2"), "20.5").unwrap();
//! sheet.set_cell(&pos("A3"), "3").unwrap();
//! sheet.set_cell(&pos("B1"), "=A1+$A2").unwrap();
//!
//! // Copy B1 one row down: A1 follows, $A2 keeps its column
//! sheet.copy_rect(&pos("B2"), &pos("B1"), 1, 1);
//! assert_eq!(sheet.contents(&pos("B2")), Some("=A2+$A3"));
//! assert_eq!(sheet.get_value(&pos("B2")), CellValue::Number(23.5));
//!
//! let mut saved = Vec::new();
//! sheet.save(&mut saved).unwrap();
//!
//! let mut restored = Sheet::new();
//! restored.load(saved.as_slice()).unwrap();
//! assert_eq!(restored.get_value(&pos("B1")), CellValue::Number(30.5));
//! ```

pub mod cell;
pub mod error;
pub mod options;
mod persist;
pub mod prelude;
pub mod sheet;

pub use cell::Cell;
pub use error::{SheetError, SheetResult};
pub use options::{ChecksumAlgorithm, EvaluationStrategy, SheetOptions};
pub use sheet::Sheet;

// Re-export core types
pub use fitsheet_core::{CellPosition, CellValue};

// Re-export formula types
pub use fitsheet_formula::{
    evaluate, parse_contents, CellResolver, ExprBuilder, ExpressionNode, FormulaBuilder,
    FormulaError, FormulaResult,
};
