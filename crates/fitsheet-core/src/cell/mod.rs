//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellPosition`] - A cell's location (e.g., "A1")
//! - [`CellValue`] - The result of evaluating a cell

mod position;
mod value;

pub use position::CellPosition;
pub use value::CellValue;
