//! Moving formulas between cells

use crate::ast::{CellReference, ExpressionNode};
use fitsheet_core::CellPosition;

/// Re-anchor an expression at `destination`
///
/// Each reference is shifted by the distance from its anchor to
/// `destination` along the axes its kind leaves floating. A reference pushed
/// off the grid keeps its kind but loses its target.
pub fn translate(expr: &ExpressionNode, destination: &CellPosition) -> ExpressionNode {
    match expr {
        ExpressionNode::Number(_) | ExpressionNode::Text(_) => expr.clone(),
        ExpressionNode::Arithmetic { op, left, right } => ExpressionNode::arithmetic(
            *op,
            translate(left, destination),
            translate(right, destination),
        ),
        ExpressionNode::Relational { op, left, right } => ExpressionNode::relational(
            *op,
            translate(left, destination),
            translate(right, destination),
        ),
        ExpressionNode::Reference(reference) => {
            ExpressionNode::Reference(translate_reference(reference, destination))
        }
    }
}

fn translate_reference(reference: &CellReference, destination: &CellPosition) -> CellReference {
    let column_delta = if reference.kind.column_fixed() {
        0
    } else {
        i64::from(destination.column_number()) - i64::from(reference.anchor.column_number())
    };
    let row_delta = if reference.kind.row_fixed() {
        0
    } else {
        i64::from(destination.row()) - i64::from(reference.anchor.row())
    };

    CellReference {
        kind: reference.kind,
        anchor: destination.clone(),
        target: reference
            .target
            .as_ref()
            .and_then(|target| target.offset(column_delta, row_delta)),
    }
}

impl ExpressionNode {
    /// Re-anchor this expression, see [`translate`]
    pub fn translate(&self, destination: &CellPosition) -> ExpressionNode {
        translate(self, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithmeticOp, ReferenceKind};
    use pretty_assertions::assert_eq;

    fn pos(s: &str) -> CellPosition {
        CellPosition::parse(s).unwrap()
    }

    fn plus_five(kind: ReferenceKind) -> ExpressionNode {
        ExpressionNode::arithmetic(
            ArithmeticOp::Add,
            ExpressionNode::Reference(CellReference::new(kind, pos("F10"), pos("D0"))),
            ExpressionNode::Number(5.0),
        )
    }

    #[test]
    fn test_translate_each_kind() {
        let dest = pos("G11");
        assert_eq!(plus_five(ReferenceKind::Relative).translate(&dest).to_string(), "E1+5");
        assert_eq!(plus_five(ReferenceKind::AbsoluteColumn).translate(&dest).to_string(), "$D1+5");
        assert_eq!(plus_five(ReferenceKind::AbsoluteRow).translate(&dest).to_string(), "E$0+5");
        assert_eq!(plus_five(ReferenceKind::Absolute).translate(&dest).to_string(), "$D$0+5");
    }

    #[test]
    fn test_translate_reanchors() {
        let moved = plus_five(ReferenceKind::Relative).translate(&pos("G11"));
        let back = moved.translate(&pos("F10"));
        assert_eq!(back, plus_five(ReferenceKind::Relative));
        assert_eq!(moved.references(), vec!["E1"]);
    }

    #[test]
    fn test_translate_off_grid() {
        let moved = plus_five(ReferenceKind::Relative).translate(&pos("F9"));
        assert_eq!(moved.to_string(), "#REF!+5");
        assert!(moved.references().is_empty());

        // A dangling reference stays dangling
        let again = moved.translate(&pos("F20"));
        assert_eq!(again.to_string(), "#REF!+5");

        let left = plus_five(ReferenceKind::AbsoluteRow).translate(&pos("A10"));
        assert_eq!(left.to_string(), "#REF!+5");
    }
}
