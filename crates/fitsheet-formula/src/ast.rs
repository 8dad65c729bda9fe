//! Formula Abstract Syntax Tree types

use fitsheet_core::CellPosition;
use std::fmt;

/// Formula expression AST
///
/// Negation has no node of its own: `-x` is `Mul(Number(-1), x)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Numeric literal
    Number(f64),
    /// String literal
    Text(String),

    /// Arithmetic operation
    Arithmetic {
        op: ArithmeticOp,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    /// Comparison, producing `1.0` or `0.0`
    Relational {
        op: RelationalOp,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },

    /// Reference to another cell
    Reference(CellReference),
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

/// Which axes of a reference stay put when the formula is copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceKind {
    /// `A1`: both axes follow the copy
    #[default]
    Relative,
    /// `$A$1`: neither axis moves
    Absolute,
    /// `$A1`: column fixed, row follows
    AbsoluteColumn,
    /// `A$1`: row fixed, column follows
    AbsoluteRow,
}

/// A reference leaf
///
/// `anchor` is the cell holding the formula, `target` the cell being read.
/// A target of `None` is a reference that was moved off the grid; it reads
/// as empty and prints as `#REF!`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellReference {
    pub kind: ReferenceKind,
    pub anchor: CellPosition,
    pub target: Option<CellPosition>,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Power => "^",
        }
    }
}

impl RelationalOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelationalOp::Equal => "=",
            RelationalOp::NotEqual => "<>",
            RelationalOp::LessThan => "<",
            RelationalOp::LessEqual => "<=",
            RelationalOp::GreaterThan => ">",
            RelationalOp::GreaterEqual => ">=",
        }
    }

    /// Apply the comparison (IEEE semantics for floats)
    pub fn compare<T: PartialOrd + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            RelationalOp::Equal => left == right,
            RelationalOp::NotEqual => left != right,
            RelationalOp::LessThan => left < right,
            RelationalOp::LessEqual => left <= right,
            RelationalOp::GreaterThan => left > right,
            RelationalOp::GreaterEqual => left >= right,
        }
    }
}

impl ReferenceKind {
    /// Build the kind from the presence of `$` markers
    pub fn from_markers(column_fixed: bool, row_fixed: bool) -> Self {
        match (column_fixed, row_fixed) {
            (false, false) => ReferenceKind::Relative,
            (true, true) => ReferenceKind::Absolute,
            (true, false) => ReferenceKind::AbsoluteColumn,
            (false, true) => ReferenceKind::AbsoluteRow,
        }
    }

    pub fn column_fixed(self) -> bool {
        matches!(self, ReferenceKind::Absolute | ReferenceKind::AbsoluteColumn)
    }

    pub fn row_fixed(self) -> bool {
        matches!(self, ReferenceKind::Absolute | ReferenceKind::AbsoluteRow)
    }
}

impl CellReference {
    /// Create a reference read from `anchor`
    pub fn new(kind: ReferenceKind, anchor: CellPosition, target: CellPosition) -> Self {
        Self {
            kind,
            anchor,
            target: Some(target),
        }
    }

    /// Create a reference whose target is off the grid
    pub fn dangling(kind: ReferenceKind, anchor: CellPosition) -> Self {
        Self {
            kind,
            anchor,
            target: None,
        }
    }
}

impl ExpressionNode {
    /// Build an arithmetic node
    pub fn arithmetic(op: ArithmeticOp, left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build a comparison node
    pub fn relational(op: RelationalOp, left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::Relational {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build `-operand` as `Mul(Number(-1), operand)`
    pub fn negate(operand: ExpressionNode) -> Self {
        Self::arithmetic(ArithmeticOp::Multiply, ExpressionNode::Number(-1.0), operand)
    }

    /// The operand of a negation, if this node is one
    fn negated_operand(&self) -> Option<&ExpressionNode> {
        match self {
            ExpressionNode::Arithmetic {
                op: ArithmeticOp::Multiply,
                left,
                right,
            } if matches!(**left, ExpressionNode::Number(n) if n == -1.0) => Some(right),
            _ => None,
        }
    }

    /// Ids of every cell this expression reads, left to right, repeats kept
    pub fn references(&self) -> Vec<String> {
        let mut ids = Vec::new();
        self.collect_references(&mut ids);
        ids
    }

    fn collect_references(&self, ids: &mut Vec<String>) {
        match self {
            ExpressionNode::Number(_) | ExpressionNode::Text(_) => {}
            ExpressionNode::Arithmetic { left, right, .. }
            | ExpressionNode::Relational { left, right, .. } => {
                left.collect_references(ids);
                right.collect_references(ids);
            }
            ExpressionNode::Reference(reference) => {
                if let Some(target) = &reference.target {
                    ids.push(target.id().to_string());
                }
            }
        }
    }

    fn write_formula(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        if let Some(operand) = self.negated_operand() {
            if nested {
                write!(f, "(-")?;
                operand.write_formula(f, true)?;
                return write!(f, ")");
            }
            write!(f, "-")?;
            return operand.write_formula(f, true);
        }

        match self {
            ExpressionNode::Number(n) => write_number(f, *n, nested),
            ExpressionNode::Text(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            ExpressionNode::Arithmetic { op, left, right } => {
                write_binary(f, op.symbol(), left, right, nested)
            }
            ExpressionNode::Relational { op, left, right } => {
                write_binary(f, op.symbol(), left, right, nested)
            }
            ExpressionNode::Reference(reference) => write!(f, "{}", reference),
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64, nested: bool) -> fmt::Result {
    // Forms the grammar can read back
    if n.is_nan() {
        f.write_str("(0/0)")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "(1/0)" } else { "(-1/0)" })
    } else if n.is_sign_negative() && nested {
        write!(f, "({})", n)
    } else {
        write!(f, "{}", n)
    }
}

fn write_binary(
    f: &mut fmt::Formatter<'_>,
    symbol: &str,
    left: &ExpressionNode,
    right: &ExpressionNode,
    nested: bool,
) -> fmt::Result {
    if nested {
        write!(f, "(")?;
    }
    left.write_formula(f, true)?;
    f.write_str(symbol)?;
    right.write_formula(f, true)?;
    if nested {
        write!(f, ")")?;
    }
    Ok(())
}

/// Formula text without the leading `=`
impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_formula(f, false)
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(target) = &self.target else {
            return f.write_str("#REF!");
        };
        if self.kind.column_fixed() {
            f.write_str("$")?;
        }
        f.write_str(target.column())?;
        if self.kind.row_fixed() {
            f.write_str("$")?;
        }
        write!(f, "{}", target.row())
    }
}
