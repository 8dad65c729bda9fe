//! # fitsheet-formula
//!
//! Formula engine for fitsheet.
//!
//! This crate provides:
//! - Expression trees with formula text regeneration
//! - The builder protocol a formula front end drives, and a front end for it
//! - Evaluation (tree → value) against a [`CellResolver`]
//! - Translation of formulas between cells
//! - Cycle detection and evaluation ordering over dependency maps
//!
//! ## Example
//!
//! ```rust
//! use fitsheet_core::{CellPosition, CellValue};
//! use fitsheet_formula::{evaluate, parse_contents, FormulaBuilder};
//!
//! let mut builder = FormulaBuilder::new(CellPosition::parse("B1").unwrap());
//! parse_contents("=A1*2", &mut builder).unwrap();
//! let ast = builder.build_ast().unwrap();
//!
//! let resolver = |_: &CellPosition| CellValue::Number(21.0);
//! assert_eq!(evaluate(&ast, &resolver), CellValue::Number(42.0));
//! ```

pub mod ast;
pub mod builder;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod translate;

pub use ast::{ArithmeticOp, CellReference, ExpressionNode, ReferenceKind, RelationalOp};
pub use builder::{ExprBuilder, FormulaBuilder};
pub use dependency::{evaluation_order, CycleChecker, DependencyMap};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, CellResolver};
pub use parser::parse_contents;
pub use translate::translate;
