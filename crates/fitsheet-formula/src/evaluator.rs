//! Formula evaluator
//!
//! Evaluates expression trees to produce values. Every semantic failure
//! (type mismatch, division by zero, overflow) yields [`CellValue::Empty`];
//! evaluation itself never fails.

use crate::ast::{ArithmeticOp, ExpressionNode, RelationalOp};
use fitsheet_core::{CellPosition, CellValue};

/// Source of values for the cells an expression references
pub trait CellResolver {
    /// Value of the cell at `target`, `Empty` when it is not set
    fn resolve(&self, target: &CellPosition) -> CellValue;
}

impl<F> CellResolver for F
where
    F: Fn(&CellPosition) -> CellValue,
{
    fn resolve(&self, target: &CellPosition) -> CellValue {
        self(target)
    }
}

/// Evaluate an expression tree
pub fn evaluate<R: CellResolver + ?Sized>(expr: &ExpressionNode, resolver: &R) -> CellValue {
    match expr {
        ExpressionNode::Number(n) => finite_number(*n),
        ExpressionNode::Text(s) => CellValue::Text(s.clone()),

        ExpressionNode::Arithmetic { op, left, right } => {
            let left_val = evaluate(left, resolver);
            let right_val = evaluate(right, resolver);
            evaluate_arithmetic(*op, left_val, right_val)
        }

        ExpressionNode::Relational { op, left, right } => {
            let left_val = evaluate(left, resolver);
            let right_val = evaluate(right, resolver);
            evaluate_relational(*op, &left_val, &right_val)
        }

        ExpressionNode::Reference(reference) => match &reference.target {
            Some(target) => resolver.resolve(target),
            None => CellValue::Empty,
        },
    }
}

impl ExpressionNode {
    /// Evaluate this expression, see [`evaluate`]
    pub fn evaluate<R: CellResolver + ?Sized>(&self, resolver: &R) -> CellValue {
        evaluate(self, resolver)
    }
}

fn finite_number(n: f64) -> CellValue {
    if n.is_infinite() {
        CellValue::Empty
    } else {
        CellValue::Number(n)
    }
}

/// Numbers joined to text use six fractional digits
fn fixed_point(n: f64) -> String {
    format!("{:.6}", n)
}

fn evaluate_arithmetic(op: ArithmeticOp, left: CellValue, right: CellValue) -> CellValue {
    let (l, r) = match (op, left, right) {
        (ArithmeticOp::Add, CellValue::Text(l), CellValue::Text(r)) => {
            return CellValue::Text(l + &r);
        }
        (ArithmeticOp::Add, CellValue::Text(l), CellValue::Number(r)) => {
            return CellValue::Text(l + &fixed_point(r));
        }
        (ArithmeticOp::Add, CellValue::Number(l), CellValue::Text(r)) => {
            return CellValue::Text(fixed_point(l) + &r);
        }
        (_, CellValue::Number(l), CellValue::Number(r)) => (l, r),
        _ => return CellValue::Empty,
    };

    let result = match op {
        ArithmeticOp::Add => l + r,
        ArithmeticOp::Subtract => l - r,
        ArithmeticOp::Multiply => l * r,
        ArithmeticOp::Divide => {
            if r == 0.0 {
                return CellValue::Empty;
            }
            l / r
        }
        ArithmeticOp::Power => l.powf(r),
    };

    finite_number(result)
}

fn evaluate_relational(op: RelationalOp, left: &CellValue, right: &CellValue) -> CellValue {
    let holds = match (left, right) {
        (CellValue::Number(l), CellValue::Number(r)) => op.compare(l, r),
        // Byte-wise, which is what `str` ordering is
        (CellValue::Text(l), CellValue::Text(r)) => op.compare(l.as_str(), r.as_str()),
        _ => return CellValue::Empty,
    };

    CellValue::Number(if holds { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FormulaBuilder;
    use crate::parser::parse_contents;
    use pretty_assertions::assert_eq;

    fn cells(id: &CellPosition) -> CellValue {
        match id.id() {
            "A1" => CellValue::Number(10.0),
            "A2" => CellValue::Number(20.5),
            "A3" => CellValue::Number(30.0),
            "T1" => CellValue::text("abc"),
            _ => CellValue::Empty,
        }
    }

    fn eval(contents: &str) -> CellValue {
        let mut builder = FormulaBuilder::new(CellPosition::parse("Z1").unwrap());
        parse_contents(contents, &mut builder).unwrap();
        let ast = builder.build_ast().unwrap();
        evaluate(&ast, &cells)
    }

    #[test]
    fn test_evaluate_literals() {
        assert_eq!(eval("42"), CellValue::Number(42.0));
        assert_eq!(eval("=3e1"), CellValue::Number(30.0));
        assert_eq!(eval("=\"Hello\""), CellValue::text("Hello"));
        assert_eq!(evaluate(&ExpressionNode::Number(f64::INFINITY), &cells), CellValue::Empty);
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("=1+2"), CellValue::Number(3.0));
        assert_eq!(eval("=10-3"), CellValue::Number(7.0));
        assert_eq!(eval("=4*5"), CellValue::Number(20.0));
        assert_eq!(eval("=20/4"), CellValue::Number(5.0));
        assert_eq!(eval("=2^10"), CellValue::Number(1024.0));
        assert_eq!(eval("=A1+A2*A3"), CellValue::Number(625.0));
    }

    #[test]
    fn test_evaluate_negation_precedence() {
        assert_eq!(eval("= -A1 ^ 2 - A2 /  2   "), CellValue::Number(-110.25));
        assert_eq!(eval("=1-(---27)"), CellValue::Number(28.0));
        assert_eq!(eval("=2^-1"), CellValue::Number(0.5));
    }

    #[test]
    fn test_evaluate_text_addition() {
        assert_eq!(eval("=T1+\"d\""), CellValue::text("abcd"));
        assert_eq!(eval("=T1+1.5"), CellValue::text("abc1.500000"));
        assert_eq!(eval("=2+T1"), CellValue::text("2.000000abc"));
        assert_eq!(eval("=T1-1"), CellValue::Empty);
        assert_eq!(eval("=T1*T1"), CellValue::Empty);
    }

    #[test]
    fn test_evaluate_empty_propagation() {
        assert_eq!(eval("=B7+1"), CellValue::Empty);
        assert_eq!(eval("=1/0"), CellValue::Empty);
        assert_eq!(eval("=(1/0)+1"), CellValue::Empty);
        assert_eq!(eval("=10^400"), CellValue::Empty);
        assert_eq!(eval("=B7=B7"), CellValue::Empty);
    }

    #[test]
    fn test_evaluate_comparison() {
        assert_eq!(eval("=1<2"), CellValue::Number(1.0));
        assert_eq!(eval("=1>2"), CellValue::Number(0.0));
        assert_eq!(eval("=A1=10"), CellValue::Number(1.0));
        assert_eq!(eval("=5<>5"), CellValue::Number(0.0));
        assert_eq!(eval("=\"abc\"<\"abd\""), CellValue::Number(1.0));
        assert_eq!(eval("=\"B\"<\"a\""), CellValue::Number(1.0));
        assert_eq!(eval("=\"1\"=1"), CellValue::Empty);
    }

    #[test]
    fn test_nan_compares_unequal() {
        let nan = ExpressionNode::Number(f64::NAN);
        let expr = ExpressionNode::relational(RelationalOp::Equal, nan.clone(), nan);
        assert_eq!(evaluate(&expr, &cells), CellValue::Number(0.0));
    }
}
