//! Built-in operator and keyword registry.
//!
//! The reader recognizes two closed sets of reserved words and turns them into
//! dedicated AST variants rather than plain symbols:
//!
//! - **Binary operators** (`+ - * / % < > = !=`): always take exactly two evaluated
//!   operands. Which operators apply depends on the operand pair's type, tried in
//!   the fixed order integer, string, float, list-value.
//! - **Keywords** (`define list print lambda map filter reduce length range`): special
//!   forms that receive their operands unevaluated and are handled by the evaluator.
//!
//! ```scheme
//! (+ 1 2)               ; 3
//! (+ "ab" "cd")         ; "abcd"
//! (/ -7 2)              ; -4 (floor division)
//! (+ (list 1) (list 2)) ; (1 2)
//! ```
//!
//! ## Error Handling
//!
//! - **No coercion**: mixing operand types (e.g. integer and float) is a `TypeError`
//! - **Per-type tables**: an operator missing from the matched type's table is an
//!   `InvalidOperator` error (e.g. `<` on floats)
//! - **Checked arithmetic**: integer overflow and division by zero are
//!   `ArithmeticError`s

use crate::Error;
use crate::ast::{Expression, IntegerType};
use crate::evaluator::{
    Environment, eval_define, eval_filter, eval_lambda, eval_length, eval_list, eval_map,
    eval_print, eval_range, eval_reduce,
};
use std::fmt;
use std::rc::Rc;

/// Expected operand count of an operator or special form (head excluded)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    Exact(usize),
    Any,
}

impl Arity {
    /// Check an operand count against this arity, naming `form` in the error
    pub(crate) fn validate(self, form: &str, got: usize) -> Result<(), Error> {
        match self {
            Arity::Exact(expected) if expected != got => {
                Err(Error::arity_error(form, expected, got))
            }
            _ => Ok(()),
        }
    }
}

/// The nine infix-style operators, written in prefix position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Less,
    Greater,
    Equal,
    NotEqual,
}

const BINARY_OPS: [BinaryOp; 9] = [
    BinaryOp::Add,
    BinaryOp::Subtract,
    BinaryOp::Multiply,
    BinaryOp::Divide,
    BinaryOp::Modulo,
    BinaryOp::Less,
    BinaryOp::Greater,
    BinaryOp::Equal,
    BinaryOp::NotEqual,
];

impl BinaryOp {
    pub const ARITY: Arity = Arity::Exact(2);

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "!=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        BINARY_OPS.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Special form signature: unevaluated operands plus the current environment
pub(crate) type SpecialForm = fn(&[Expression], &Rc<Environment>) -> Result<Expression, Error>;

/// Reserved words introducing special forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Define,
    List,
    Print,
    Lambda,
    Map,
    Filter,
    Reduce,
    Length,
    Range,
}

const KEYWORDS: [Keyword; 9] = [
    Keyword::Define,
    Keyword::List,
    Keyword::Print,
    Keyword::Lambda,
    Keyword::Map,
    Keyword::Filter,
    Keyword::Reduce,
    Keyword::Length,
    Keyword::Range,
];

impl Keyword {
    pub fn name(self) -> &'static str {
        match self {
            Keyword::Define => "define",
            Keyword::List => "list",
            Keyword::Print => "print",
            Keyword::Lambda => "lambda",
            Keyword::Map => "map",
            Keyword::Filter => "filter",
            Keyword::Reduce => "reduce",
            Keyword::Length => "length",
            Keyword::Range => "range",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        KEYWORDS.into_iter().find(|keyword| keyword.name() == name)
    }

    /// Operand count of the special form, not counting the keyword itself
    pub fn arity(self) -> Arity {
        match self {
            Keyword::List => Arity::Any,
            Keyword::Print | Keyword::Length => Arity::Exact(1),
            Keyword::Define
            | Keyword::Lambda
            | Keyword::Map
            | Keyword::Filter
            | Keyword::Reduce => Arity::Exact(2),
            Keyword::Range => Arity::Exact(3),
        }
    }

    /// Implementation of the special form. Operands arrive unevaluated.
    pub(crate) fn special_form(self) -> SpecialForm {
        match self {
            Keyword::Define => eval_define,
            Keyword::List => eval_list,
            Keyword::Print => eval_print,
            Keyword::Lambda => eval_lambda,
            Keyword::Map => eval_map,
            Keyword::Filter => eval_filter,
            Keyword::Reduce => eval_reduce,
            Keyword::Length => eval_length,
            Keyword::Range => eval_range,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//
// Binary operator tables
//

fn invalid_operator(op: BinaryOp, operand_type: &'static str) -> Error {
    Error::InvalidOperator {
        operator: op.symbol().to_owned(),
        operand_type,
    }
}

fn overflow(op: BinaryOp, a: IntegerType, b: IntegerType) -> Error {
    Error::ArithmeticError(format!("integer overflow in ({op} {a} {b})"))
}

/// Division rounding toward negative infinity
fn floor_div(a: IntegerType, b: IntegerType) -> Option<IntegerType> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

/// Remainder taking the sign of the divisor
fn floor_mod(a: IntegerType, b: IntegerType) -> Option<IntegerType> {
    // Every integer is a multiple of -1; `checked_rem` rejects MIN % -1
    if b == -1 {
        return Some(0);
    }
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        Some(remainder + b)
    } else {
        Some(remainder)
    }
}

fn integer_op(op: BinaryOp, a: IntegerType, b: IntegerType) -> Result<Expression, Error> {
    if b == 0 && matches!(op, BinaryOp::Divide | BinaryOp::Modulo) {
        return Err(Error::ArithmeticError(format!("division by zero in ({op} {a} {b})")));
    }

    let arithmetic = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Subtract => a.checked_sub(b),
        BinaryOp::Multiply => a.checked_mul(b),
        BinaryOp::Divide => floor_div(a, b),
        BinaryOp::Modulo => floor_mod(a, b),
        BinaryOp::Less => return Ok(Expression::Bool(a < b)),
        BinaryOp::Greater => return Ok(Expression::Bool(a > b)),
        BinaryOp::Equal => return Ok(Expression::Bool(a == b)),
        BinaryOp::NotEqual => return Ok(Expression::Bool(a != b)),
    };

    arithmetic
        .map(Expression::Integer)
        .ok_or_else(|| overflow(op, a, b))
}

fn string_op(op: BinaryOp, a: String, b: String) -> Result<Expression, Error> {
    match op {
        BinaryOp::Add => Ok(Expression::String(a + &b)),
        BinaryOp::Less => Ok(Expression::Bool(a < b)),
        BinaryOp::Greater => Ok(Expression::Bool(a > b)),
        BinaryOp::Equal => Ok(Expression::Bool(a == b)),
        BinaryOp::NotEqual => Ok(Expression::Bool(a != b)),
        _ => Err(invalid_operator(op, "string")),
    }
}

fn float_op(op: BinaryOp, a: f64, b: f64) -> Result<Expression, Error> {
    match op {
        BinaryOp::Add => Ok(Expression::Float(a + b)),
        BinaryOp::Subtract => Ok(Expression::Float(a - b)),
        BinaryOp::Multiply => Ok(Expression::Float(a * b)),
        BinaryOp::Divide if b == 0.0 => Err(Error::ArithmeticError(format!(
            "division by zero in ({op} {a:?} {b:?})"
        ))),
        BinaryOp::Divide => Ok(Expression::Float(a / b)),
        _ => Err(invalid_operator(op, "float")),
    }
}

fn list_value_op(
    op: BinaryOp,
    left: &[Expression],
    right: &[Expression],
) -> Result<Expression, Error> {
    match op {
        BinaryOp::Add => {
            let mut items = Vec::with_capacity(left.len() + right.len());
            items.extend_from_slice(left);
            items.extend_from_slice(right);
            Ok(Expression::ListValue(items.into()))
        }
        _ => Err(invalid_operator(op, "list-value")),
    }
}

/// Apply `op` to two already evaluated operands.
pub(crate) fn apply_binary_op(
    op: BinaryOp,
    left: Expression,
    right: Expression,
) -> Result<Expression, Error> {
    match (left, right) {
        (Expression::Integer(a), Expression::Integer(b)) => integer_op(op, a, b),
        (Expression::String(a), Expression::String(b)) => string_op(op, a, b),
        (Expression::Float(a), Expression::Float(b)) => float_op(op, a, b),
        (Expression::ListValue(a), Expression::ListValue(b)) => list_value_op(op, &a, &b),
        (left, right) => Err(Error::TypeError(format!(
            "operator '{op}' cannot be applied to {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::val;

    #[test]
    fn test_registry_lookup_round_trips() {
        for op in BINARY_OPS {
            assert_eq!(BinaryOp::from_symbol(op.symbol()), Some(op));
        }
        for keyword in KEYWORDS {
            assert_eq!(Keyword::from_name(keyword.name()), Some(keyword));
        }

        assert_eq!(BinaryOp::from_symbol("=="), None);
        assert_eq!(BinaryOp::from_symbol("<="), None);
        assert_eq!(Keyword::from_name("if"), None);
        assert_eq!(Keyword::from_name("Define"), None);
    }

    #[test]
    fn test_arity_validation() {
        assert!(Arity::Exact(2).validate("define", 2).is_ok());
        assert!(Arity::Any.validate("list", 0).is_ok());
        assert!(Arity::Any.validate("list", 17).is_ok());
        assert_eq!(
            Arity::Exact(3).validate("range", 2).unwrap_err(),
            Error::arity_error("range", 3, 2)
        );
    }

    #[test]
    fn test_floor_division_and_modulo() {
        // (a, b, floor(a / b), a mod b with the divisor's sign)
        let cases = [
            (7, 2, 3, 1),
            (-7, 2, -4, 1),
            (7, -2, -4, -1),
            (-7, -2, 3, -1),
            (6, 3, 2, 0),
            (-6, 3, -2, 0),
            (0, 5, 0, 0),
            (1, 3, 0, 1),
            (-1, 3, -1, 2),
            (IntegerType::MIN, 1, IntegerType::MIN, 0),
            (IntegerType::MIN, 2, IntegerType::MIN / 2, 0),
            (IntegerType::MIN + 1, -1, IntegerType::MAX, 0),
        ];

        for (i, (a, b, quotient, remainder)) in cases.into_iter().enumerate() {
            assert_eq!(
                apply_binary_op(BinaryOp::Divide, val(a), val(b)).unwrap(),
                val(quotient),
                "case #{}: ({a} / {b})",
                i + 1
            );
            assert_eq!(
                apply_binary_op(BinaryOp::Modulo, val(a), val(b)).unwrap(),
                val(remainder),
                "case #{}: ({a} % {b})",
                i + 1
            );
        }
    }

    #[test]
    fn test_modulo_of_min_by_minus_one() {
        // The quotient does not fit, the remainder does
        assert_eq!(
            apply_binary_op(BinaryOp::Modulo, val(IntegerType::MIN), val(-1)).unwrap(),
            val(0)
        );
        assert!(matches!(
            apply_binary_op(BinaryOp::Divide, val(IntegerType::MIN), val(-1)),
            Err(Error::ArithmeticError(_))
        ));
        assert_eq!(apply_binary_op(BinaryOp::Modulo, val(7), val(-1)).unwrap(), val(0));
    }

    #[test]
    fn test_operator_tables() {
        let ok_cases = vec![
            (BinaryOp::Add, val(1), val(2), val(3)),
            (BinaryOp::Subtract, val(1), val(2), val(-1)),
            (BinaryOp::Multiply, val(-4), val(5), val(-20)),
            (BinaryOp::Less, val(1), val(2), val(true)),
            (BinaryOp::Greater, val(1), val(2), val(false)),
            (BinaryOp::Equal, val(2), val(2), val(true)),
            (BinaryOp::NotEqual, val(2), val(2), val(false)),
            (BinaryOp::Add, val("Hello"), val(" World"), val("Hello World")),
            (BinaryOp::Less, val("ab c"), val("ab d"), val(true)),
            (BinaryOp::Greater, val("ab c"), val("ab b"), val(true)),
            (BinaryOp::Equal, val("ab c"), val("ab c"), val(true)),
            (BinaryOp::NotEqual, val("ab c"), val("def"), val(true)),
            (BinaryOp::Add, val(3.5), val(5.0), val(8.5)),
            (BinaryOp::Subtract, val(3.5), val(5.0), val(-1.5)),
            (BinaryOp::Multiply, val(1.5), val(4.0), val(6.0)),
            (BinaryOp::Divide, val(3.0), val(4.0), val(0.75)),
            (BinaryOp::Add, val([1]), val([3, 2]), val([1, 3, 2])),
        ];

        for (i, (op, left, right, expected)) in ok_cases.into_iter().enumerate() {
            assert_eq!(
                apply_binary_op(op, left, right).unwrap(),
                expected,
                "case #{}: operator {op}",
                i + 1
            );
        }
    }

    #[test]
    fn test_operator_errors() {
        let error_cases = vec![
            // Operators missing from the matched type's table
            (BinaryOp::Subtract, val("a"), val("b"), "InvalidOperator"),
            (BinaryOp::Modulo, val("a"), val("b"), "InvalidOperator"),
            (BinaryOp::Less, val(1.0), val(2.0), "InvalidOperator"),
            (BinaryOp::Equal, val(1.0), val(1.0), "InvalidOperator"),
            (BinaryOp::Modulo, val(1.0), val(2.0), "InvalidOperator"),
            (BinaryOp::Equal, val([1]), val([1]), "InvalidOperator"),
            // No coercion between operand types
            (BinaryOp::Add, val(1), val(1.0), "TypeError"),
            (BinaryOp::Add, val(1), val("1"), "TypeError"),
            (BinaryOp::Equal, val(true), val(true), "TypeError"),
            (BinaryOp::Add, val([1]), val(1), "TypeError"),
            // Checked arithmetic
            (BinaryOp::Divide, val(1), val(0), "ArithmeticError"),
            (BinaryOp::Modulo, val(1), val(0), "ArithmeticError"),
            (BinaryOp::Divide, val(1.0), val(0.0), "ArithmeticError"),
            (BinaryOp::Add, val(i64::MAX), val(1), "ArithmeticError"),
            (BinaryOp::Subtract, val(i64::MIN), val(1), "ArithmeticError"),
            (BinaryOp::Multiply, val(i64::MAX), val(2), "ArithmeticError"),
            (BinaryOp::Divide, val(i64::MIN), val(-1), "ArithmeticError"),
        ];

        for (i, (op, left, right, expected_kind)) in error_cases.into_iter().enumerate() {
            let err = apply_binary_op(op, left, right).unwrap_err();
            let kind = match err {
                Error::InvalidOperator { .. } => "InvalidOperator",
                Error::TypeError(_) => "TypeError",
                Error::ArithmeticError(_) => "ArithmeticError",
                ref other => panic!("case #{}: unexpected error {other:?}", i + 1),
            };
            assert_eq!(kind, expected_kind, "case #{}: {err}", i + 1);
        }
    }
}
