//! Cells stored in a sheet

use fitsheet_core::{CellPosition, CellValue};
use fitsheet_formula::{parse_contents, CellResolver, ExpressionNode, FormulaBuilder, FormulaResult};
use std::sync::Arc;

/// A cell: its position, the contents as entered and the parsed tree
///
/// The tree is shared between clones of the same cell.
#[derive(Debug, Clone)]
pub struct Cell {
    position: CellPosition,
    contents: String,
    root: Option<Arc<ExpressionNode>>,
}

impl Cell {
    /// Create a cell from already-parsed parts
    pub fn new(position: CellPosition, contents: impl Into<String>, root: Option<ExpressionNode>) -> Self {
        Self {
            position,
            contents: contents.into(),
            root: root.map(Arc::new),
        }
    }

    /// Parse `contents` for the cell at `position`
    ///
    /// Returns the cell and the ids of the cells it reads.
    pub fn parse(position: CellPosition, contents: &str) -> FormulaResult<(Self, Vec<String>)> {
        let mut builder = FormulaBuilder::new(position.clone());
        parse_contents(contents, &mut builder)?;
        let (root, dependencies) = builder.into_parts();
        Ok((Self::new(position, contents, root), dependencies))
    }

    pub fn position(&self) -> &CellPosition {
        &self.position
    }

    /// Contents as entered (or as regenerated by a copy)
    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn root(&self) -> Option<&ExpressionNode> {
        self.root.as_deref()
    }

    /// Evaluate the cell, reading other cells through `resolver`
    pub fn evaluate<R: CellResolver + ?Sized>(&self, resolver: &R) -> CellValue {
        match &self.root {
            Some(root) => root.evaluate(resolver),
            None => CellValue::Empty,
        }
    }

    /// The same formula moved to `destination`
    ///
    /// Formulas that read other cells get their text regenerated from the
    /// moved tree; anything else keeps its text. Returns the moved cell and
    /// the ids it reads.
    ///
    /// Ranges and function calls leave nothing in the tree, so regenerated
    /// text drops them: `=SUM(A1:B2)+A1` moved one row down becomes `=A2`,
    /// the formula the cell actually evaluates.
    pub fn translate(&self, destination: &CellPosition) -> (Cell, Vec<String>) {
        let Some(root) = &self.root else {
            return (Cell::new(destination.clone(), self.contents.clone(), None), Vec::new());
        };

        let moved = root.translate(destination);
        let dependencies = moved.references();

        let contents = if self.contents.starts_with('=') && !root.references().is_empty() {
            format!("={}", moved)
        } else {
            self.contents.clone()
        };

        (Cell::new(destination.clone(), contents, Some(moved)), dependencies)
    }
}
