//! minilisp - a small S-expression interpreter
//!
//! This crate reads one parenthesized expression at a time, turns it into an
//! [`ast::Expression`] tree and evaluates it against a chain of environment frames.
//!
//! ```scheme
//! (+ 1 2)                                  ; 3
//! ((define sqr (lambda (r) (* r r)))
//!  (sqr 10))                               ; (100)
//! (map (lambda (x) (* x x)) (list 1 2 3))  ; (1 4 9)
//! (filter (lambda (x) (= 1 (% x 2)))
//!         (range 0 10 1))                  ; (1 3 5 7 9)
//! ```
//!
//! ## Sequencing vs. list data
//!
//! A form whose head is not an operator, keyword, `if` or symbol is a *sequence*:
//! every element is evaluated in order and the non-void results are collected into
//! an [`ast::Expression::List`]. Explicit list data built by `list`, `map`, `filter`,
//! `range` or `+` is an [`ast::Expression::ListValue`] and never collapses into a
//! sequence result.
//!
//! ## Tail calls
//!
//! `if` branches and closure bodies are evaluated by re-binding the evaluator's
//! current expression and environment instead of recursing, so self-recursive
//! functions in tail position run in constant host stack.
//!
//! ## Scoping
//!
//! Closures do not capture their defining environment. A call extends the
//! *caller's* environment, so free identifiers in a body resolve dynamically.
//!
//! ## Modules
//!
//! - `ast`: the expression/value model and its rendering
//! - `builtinops`: operator and keyword registry, binary operator tables
//! - `evaluator`: environments and the trampolining evaluator
//! - `lexer` / `parser`: text front end (feature `reader`)

use std::fmt;

/// Default maximum nesting depth accepted by the parser.
pub const MAX_PARSE_DEPTH: usize = 128;

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed literal or unterminated string in the source text
    TokenError(String),
    /// Structurally invalid token sequence
    ParseError(String),
    UnboundSymbol(String),
    /// Call head bound to something other than a closure
    NotCallable(String),
    ArityError {
        form: String,
        expected: usize,
        got: usize,
    },
    TypeError(String),
    /// Operator not defined for the operand type it was applied to
    InvalidOperator {
        operator: String,
        operand_type: &'static str,
    },
    EmptyCollection(String),
    /// Integer overflow, division by zero, zero range step
    ArithmeticError(String),
    /// Output written by `print` could not be delivered
    IoError(String),
}

impl Error {
    pub fn arity_error(form: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::ArityError {
            form: form.into(),
            expected,
            got,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TokenError(msg) => write!(f, "TokenError: {msg}"),
            Error::ParseError(msg) => write!(f, "ParseError: {msg}"),
            Error::UnboundSymbol(name) => write!(f, "Unbound symbol: {name}"),
            Error::NotCallable(msg) => write!(f, "Not callable: {msg}"),
            Error::ArityError {
                form,
                expected,
                got,
            } => write!(
                f,
                "ArityError: {form}: expected {expected} arguments, got {got}"
            ),
            Error::TypeError(msg) => write!(f, "Type error: {msg}"),
            Error::InvalidOperator {
                operator,
                operand_type,
            } => write!(
                f,
                "Invalid operator: '{operator}' is not defined for {operand_type} operands"
            ),
            Error::EmptyCollection(msg) => write!(f, "Empty collection: {msg}"),
            Error::ArithmeticError(msg) => write!(f, "Arithmetic error: {msg}"),
            Error::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub mod ast;
pub mod builtinops;
pub mod evaluator;

#[cfg(feature = "reader")]
pub mod lexer;

#[cfg(feature = "reader")]
pub mod parser;

/// Tokenize, parse and evaluate one top-level input against `env`.
///
/// Bindings made by `define` persist in `env` across calls, including those
/// committed before a later form in the same input failed.
#[cfg(feature = "reader")]
pub fn eval_str(
    input: &str,
    env: &std::rc::Rc<evaluator::Environment>,
) -> Result<ast::Expression, Error> {
    let expr = parser::parse_program(input)?;
    evaluator::eval(&expr, env)
}
