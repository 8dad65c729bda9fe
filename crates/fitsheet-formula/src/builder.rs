//! Builder protocol between the formula front end and the expression tree
//!
//! A front end walks cell contents and reports what it finds through
//! [`ExprBuilder`] callbacks in postfix order: operands first, then the
//! operator that combines them. [`FormulaBuilder`] turns that event stream
//! into an [`ExpressionNode`] with an operand stack.

use crate::ast::{ArithmeticOp, CellReference, ExpressionNode, ReferenceKind, RelationalOp};
use crate::error::{FormulaError, FormulaResult};
use fitsheet_core::CellPosition;

/// Text of a reference that points nowhere
pub const DANGLING_REFERENCE: &str = "#REF!";

/// Callbacks a formula front end drives
pub trait ExprBuilder {
    fn op_add(&mut self);
    fn op_sub(&mut self);
    fn op_mul(&mut self);
    fn op_div(&mut self);
    fn op_pow(&mut self);
    fn op_neg(&mut self);

    fn op_eq(&mut self);
    fn op_ne(&mut self);
    fn op_lt(&mut self);
    fn op_le(&mut self);
    fn op_gt(&mut self);
    fn op_ge(&mut self);

    fn val_number(&mut self, value: f64);
    fn val_string(&mut self, value: &str);

    /// A single cell reference such as `A1`, `$A1`, `A$1` or `$A$1`
    fn val_reference(&mut self, text: &str) -> FormulaResult<()>;

    /// A range such as `A1:B2`
    fn val_range(&mut self, text: &str);

    /// A call to `name` whose `arg_count` arguments were reported before it
    fn func_call(&mut self, name: &str, arg_count: usize);
}

/// Builds an expression tree for the cell at `anchor`
#[derive(Debug)]
pub struct FormulaBuilder {
    anchor: CellPosition,
    stack: Vec<ExpressionNode>,
    dependencies: Vec<String>,
}

impl FormulaBuilder {
    /// Create a builder for formulas stored at `anchor`
    pub fn new(anchor: CellPosition) -> Self {
        Self {
            anchor,
            stack: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// The finished tree
    ///
    /// Returns `None` unless exactly one node is left on the stack. Calling
    /// it again after a successful build also returns `None`.
    pub fn build_ast(&mut self) -> Option<ExpressionNode> {
        if self.stack.len() == 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Ids of the referenced cells, in the order they were reported
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Split into the finished tree and the dependency list
    pub fn into_parts(mut self) -> (Option<ExpressionNode>, Vec<String>) {
        let root = self.build_ast();
        (root, self.dependencies)
    }

    fn arithmetic(&mut self, op: ArithmeticOp) {
        if let Some((left, right)) = self.pop_pair() {
            self.stack.push(ExpressionNode::arithmetic(op, left, right));
        }
    }

    fn relational(&mut self, op: RelationalOp) {
        if let Some((left, right)) = self.pop_pair() {
            self.stack.push(ExpressionNode::relational(op, left, right));
        }
    }

    /// Pop right then left; leaves the stack alone when it is too short
    fn pop_pair(&mut self) -> Option<(ExpressionNode, ExpressionNode)> {
        if self.stack.len() < 2 {
            return None;
        }
        let right = self.stack.pop()?;
        let left = self.stack.pop()?;
        Some((left, right))
    }
}

/// Split reference text into its kind and the bare position text
///
/// A leading `$` fixes the column, a `$` after the first character (but not
/// the last) fixes the row. Markers are only stripped from non-relative
/// references, so a trailing `$` is left in place and fails to parse.
fn split_markers(text: &str) -> (ReferenceKind, String) {
    let column_fixed = text.starts_with('$');
    let row_fixed = text
        .char_indices()
        .any(|(i, c)| c == '$' && i > 0 && i + 1 < text.len());

    let kind = ReferenceKind::from_markers(column_fixed, row_fixed);
    let bare = if kind == ReferenceKind::Relative {
        text.to_string()
    } else {
        text.replace('$', "")
    };
    (kind, bare)
}

impl ExprBuilder for FormulaBuilder {
    fn op_add(&mut self) {
        self.arithmetic(ArithmeticOp::Add);
    }

    fn op_sub(&mut self) {
        self.arithmetic(ArithmeticOp::Subtract);
    }

    fn op_mul(&mut self) {
        self.arithmetic(ArithmeticOp::Multiply);
    }

    fn op_div(&mut self) {
        self.arithmetic(ArithmeticOp::Divide);
    }

    fn op_pow(&mut self) {
        self.arithmetic(ArithmeticOp::Power);
    }

    fn op_neg(&mut self) {
        if let Some(operand) = self.stack.pop() {
            self.stack.push(ExpressionNode::negate(operand));
        }
    }

    fn op_eq(&mut self) {
        self.relational(RelationalOp::Equal);
    }

    fn op_ne(&mut self) {
        self.relational(RelationalOp::NotEqual);
    }

    fn op_lt(&mut self) {
        self.relational(RelationalOp::LessThan);
    }

    fn op_le(&mut self) {
        self.relational(RelationalOp::LessEqual);
    }

    fn op_gt(&mut self) {
        self.relational(RelationalOp::GreaterThan);
    }

    fn op_ge(&mut self) {
        self.relational(RelationalOp::GreaterEqual);
    }

    fn val_number(&mut self, value: f64) {
        self.stack.push(ExpressionNode::Number(value));
    }

    fn val_string(&mut self, value: &str) {
        self.stack.push(ExpressionNode::Text(value.to_string()));
    }

    fn val_reference(&mut self, text: &str) -> FormulaResult<()> {
        if text.eq_ignore_ascii_case(DANGLING_REFERENCE) {
            self.stack.push(ExpressionNode::Reference(CellReference::dangling(
                ReferenceKind::Relative,
                self.anchor.clone(),
            )));
            return Ok(());
        }

        let (kind, bare) = split_markers(text);
        let target = CellPosition::parse(&bare)
            .map_err(|e| FormulaError::InvalidReference(format!("'{}': {}", text, e)))?;

        self.dependencies.push(target.id().to_string());
        self.stack.push(ExpressionNode::Reference(CellReference::new(
            kind,
            self.anchor.clone(),
            target,
        )));
        Ok(())
    }

    fn val_range(&mut self, _text: &str) {}

    fn func_call(&mut self, _name: &str, _arg_count: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn builder() -> FormulaBuilder {
        FormulaBuilder::new(CellPosition::parse("B1").unwrap())
    }

    #[test]
    fn test_postfix_order() {
        // 1 - 2 * 3
        let mut b = builder();
        b.val_number(1.0);
        b.val_number(2.0);
        b.val_number(3.0);
        b.op_mul();
        b.op_sub();

        let ast = b.build_ast().unwrap();
        assert_eq!(ast.to_string(), "1-(2*3)");
        assert_eq!(b.build_ast(), None);
    }

    #[test]
    fn test_pops_right_then_left() {
        let mut b = builder();
        b.val_string("a");
        b.val_string("b");
        b.op_lt();
        assert_eq!(b.build_ast().unwrap().to_string(), "\"a\"<\"b\"");
    }

    #[test]
    fn test_short_stack_is_ignored() {
        let mut b = builder();
        b.op_add();
        b.op_neg();
        b.val_number(4.0);
        b.op_div();
        b.op_neg();
        assert_eq!(
            b.build_ast(),
            Some(ExpressionNode::negate(ExpressionNode::Number(4.0)))
        );
    }

    #[test]
    fn test_build_requires_single_root() {
        let mut b = builder();
        assert_eq!(b.build_ast(), None);

        b.val_number(1.0);
        b.val_number(2.0);
        assert_eq!(b.build_ast(), None);
    }

    #[test]
    fn test_reference_kinds() {
        let mut b = builder();
        for text in ["a1", "$A1", "A$1", "$a$1"] {
            b.val_reference(text).unwrap();
        }
        b.op_add();
        b.op_add();
        b.op_add();

        assert_eq!(b.dependencies(), ["A1", "A1", "A1", "A1"]);
        assert_eq!(b.build_ast().unwrap().to_string(), "A1+($A1+(A$1+$A$1))");
    }

    #[test]
    fn test_invalid_references() {
        let mut b = builder();
        assert!(b.val_reference("A01").is_err());
        assert!(b.val_reference("A1$").is_err());
        assert!(b.val_reference("1A").is_err());
        assert!(b.val_reference("").is_err());
        assert!(b.dependencies().is_empty());
    }

    #[test]
    fn test_dangling_reference() {
        let mut b = builder();
        b.val_reference("#REF!").unwrap();
        assert!(b.dependencies().is_empty());
        assert_eq!(b.build_ast().unwrap().to_string(), "#REF!");
    }

    #[test]
    fn test_range_and_function_have_no_effect() {
        let mut b = builder();
        b.val_number(1.0);
        b.val_range("A1:B2");
        b.func_call("SUM", 1);
        let (root, deps) = b.into_parts();
        assert_eq!(root, Some(ExpressionNode::Number(1.0)));
        assert!(deps.is_empty());
    }
}
