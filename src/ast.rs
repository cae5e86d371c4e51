//! This module defines the [`Expression`] type, used both as parsed syntax and as
//! runtime value, together with conversion traits and helper constructors. The
//! helpers [`val`], [`sym`] and [`seq`] keep AST construction in code and tests
//! short: `val(42)` for scalars, `val([1, 2, 3])` for list data, `sym("x")` for
//! identifiers and `seq(vec![...])` for forms and sequencing results.
//!
//! Rendering via [`std::fmt::Display`] prints each value in its literal form, so
//! scalars and forms read back through the parser unchanged.

use crate::builtinops::{BinaryOp, Keyword};
use std::rc::Rc;

/// Type alias for integer values in the interpreter
pub(crate) type IntegerType = i64;

/// Core AST type in interpreter
///
/// `List` doubles as an unevaluated form and as the result of sequencing several
/// forms; `ListValue` is explicit list data and never compares equal to a `List`.
/// List data and closures share their elements, so binding or looking them up
/// does not copy them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Absence of a value (result of `define`, `print`, `#nil`)
    Void,
    Integer(IntegerType),
    Float(f64),
    String(String),
    Bool(bool),
    /// Identifier, resolved through the environment when evaluated
    Symbol(String),
    /// Form, or collected non-void results of a sequence
    List(Vec<Expression>),
    /// List data built by `list`, `map`, `filter`, `range` or `+`
    ListValue(Rc<[Expression]>),
    /// User-defined function. Captures no environment.
    Closure {
        params: Rc<[String]>,
        body: Rc<[Expression]>,
    },
    /// Special-form keyword in head position
    Keyword(Keyword),
    /// Binary operator in head position
    BinaryOp(BinaryOp),
    /// The `if` marker
    If,
}

impl Expression {
    /// Short name of the variant for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Void => "void",
            Expression::Integer(_) => "integer",
            Expression::Float(_) => "float",
            Expression::String(_) => "string",
            Expression::Bool(_) => "bool",
            Expression::Symbol(_) => "symbol",
            Expression::List(_) => "list",
            Expression::ListValue(_) => "list-value",
            Expression::Closure { .. } => "closure",
            Expression::Keyword(_) => "keyword",
            Expression::BinaryOp(_) => "operator",
            Expression::If => "if",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Expression::Void)
    }
}

// From trait implementations for Expression - enables .into() conversion
impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        Expression::String(s.to_owned())
    }
}

impl From<String> for Expression {
    fn from(s: String) -> Self {
        Expression::String(s)
    }
}

impl From<bool> for Expression {
    fn from(b: bool) -> Self {
        Expression::Bool(b)
    }
}

impl From<f64> for Expression {
    fn from(f: f64) -> Self {
        Expression::Float(f)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Expression {
            fn from(n: $int_type) -> Self {
                Expression::Integer(IntegerType::from(n))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(IntegerType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Expression>> From<Vec<T>> for Expression {
    fn from(v: Vec<T>) -> Self {
        Expression::ListValue(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Expression>, const N: usize> From<[T; N]> for Expression {
    fn from(arr: [T; N]) -> Self {
        Expression::ListValue(arr.into_iter().map(Into::into).collect())
    }
}

/// Helper function for creating Expressions from Rust values.
/// Vectors and arrays become `ListValue` data.
pub fn val<T: Into<Expression>>(value: T) -> Expression {
    value.into()
}

/// Helper function for creating symbols
pub fn sym<S: AsRef<str>>(name: S) -> Expression {
    Expression::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating a `List` (a form, or a sequencing result)
pub fn seq<T: Into<Expression>>(elements: Vec<T>) -> Expression {
    Expression::List(elements.into_iter().map(Into::into).collect())
}

fn write_elements(f: &mut std::fmt::Formatter<'_>, elements: &[Expression]) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, elem) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{elem}")?;
    }
    write!(f, ")")
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Void => write!(f, "#nil"),
            Expression::Integer(n) => write!(f, "{n}"),
            Expression::Float(x) => write!(f, "{x:?}"),
            Expression::String(s) => write!(f, "\"{s}\""),
            Expression::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Expression::Symbol(s) => write!(f, "{s}"),
            Expression::List(elements) => write_elements(f, elements),
            Expression::ListValue(elements) => write_elements(f, elements),
            Expression::Closure { params, body } => {
                write!(f, "(lambda (")?;
                write!(f, "{}", params.join(" "))?;
                write!(f, ") ")?;
                write_elements(f, body)?;
                write!(f, ")")
            }
            Expression::Keyword(keyword) => write!(f, "{keyword}"),
            Expression::BinaryOp(op) => write!(f, "{op}"),
            Expression::If => write!(f, "if"),
        }
    }
}

#[cfg(test)]
mod helper_function_tests {
    use super::*;

    #[test]
    fn test_helper_functions_data_driven() {
        // (helper_result, expected_value)
        let test_cases = vec![
            (val(42), Expression::Integer(42)),
            (val(-17), Expression::Integer(-17)),
            (val(255u8), Expression::Integer(255)),
            (val(-32768i16), Expression::Integer(-32768)),
            (val(4294967295u32), Expression::Integer(4294967295)),
            (val(IntegerType::MIN), Expression::Integer(IntegerType::MIN)),
            (val(2.5), Expression::Float(2.5)),
            (val(true), Expression::Bool(true)),
            (val("hello"), Expression::String("hello".to_owned())),
            (val(String::new()), Expression::String(String::new())),
            (sym("sqr"), Expression::Symbol("sqr".to_owned())),
            (sym(String::from("#nil")), Expression::Symbol("#nil".to_owned())),
            (
                val([1, 2, 3]),
                Expression::ListValue(
                    vec![
                        Expression::Integer(1),
                        Expression::Integer(2),
                        Expression::Integer(3),
                    ]
                    .into(),
                ),
            ),
            (val(Vec::<i64>::new()), Expression::ListValue(Rc::from(Vec::new()))),
            (
                seq(vec![sym("sqr"), val(10)]),
                Expression::List(vec![
                    Expression::Symbol("sqr".to_owned()),
                    Expression::Integer(10),
                ]),
            ),
        ];

        for (i, (actual, expected)) in test_cases.iter().enumerate() {
            assert_eq!(actual, expected, "Test case {} failed", i + 1);
        }
    }

    #[test]
    fn test_list_and_list_value_are_distinct() {
        assert_ne!(seq(vec![1]), val([1]));
        assert_ne!(seq(Vec::<Expression>::new()), val(Vec::<Expression>::new()));
        assert_eq!(seq(vec![1, 2]), seq(vec![1, 2]));
        assert_ne!(val([1, 2]), val([1, 2, 3]));
        assert_ne!(val([1, 2]), val([2, 1]));
    }

    #[test]
    fn test_void_equals_itself() {
        assert_eq!(Expression::Void, Expression::Void);
        assert_ne!(Expression::Void, val(0));
        assert_ne!(Expression::Void, seq(Vec::<Expression>::new()));
    }

    #[test]
    fn test_display_literal_forms() {
        let square = Expression::Closure {
            params: vec!["r".to_owned()].into(),
            body: vec![Expression::BinaryOp(BinaryOp::Multiply), sym("r"), sym("r")].into(),
        };

        let test_cases = vec![
            (Expression::Void, "#nil"),
            (val(-3), "-3"),
            (val(8.0), "8.0"),
            (val(0.25), "0.25"),
            (val("foo bar"), "\"foo bar\""),
            (val(true), "#t"),
            (val(false), "#f"),
            (sym("pi"), "pi"),
            (val([1, 4, 9]), "(1 4 9)"),
            (val(Vec::<i64>::new()), "()"),
            (
                seq(vec![
                    seq(vec![Expression::Keyword(Keyword::Define), sym("r"), val(10)]),
                    seq(vec![Expression::BinaryOp(BinaryOp::Multiply), sym("pi"), sym("r")]),
                ]),
                "((define r 10) (* pi r))",
            ),
            (seq(vec![Expression::If, sym("c"), val(1), val(2)]), "(if c 1 2)"),
            (square, "(lambda (r) (* r r))"),
        ];

        for (i, (expr, expected)) in test_cases.iter().enumerate() {
            assert_eq!(format!("{expr}"), *expected, "Display case {} failed", i + 1);
        }
    }
}
