//! Prelude module - common imports for fitsheet users
//!
//! ```rust
//! use fitsheet::prelude::*;
//! ```

pub use crate::{
    // Cell types
    Cell,
    CellPosition,
    CellValue,

    // Options
    ChecksumAlgorithm,
    EvaluationStrategy,
    SheetOptions,

    // Error types
    SheetError,
    SheetResult,

    // Main types
    Sheet,
};
