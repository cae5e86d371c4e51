//! Token stream to expression tree.
//!
//! A program is exactly one parenthesized form. Atoms map one-to-one onto
//! [`Expression`] variants; nothing is resolved or evaluated here.

use crate::Error;
use crate::MAX_PARSE_DEPTH;
use crate::ast::Expression;
use crate::lexer::{Token, tokenize};

/// Parser limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseConfig {
    /// Deepest accepted nesting of parentheses, the root form counting as 1
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            max_depth: MAX_PARSE_DEPTH,
        }
    }
}

struct TokenCursor<'a> {
    tokens: &'a [Token],
    position: usize,
    config: ParseConfig,
}

impl TokenCursor<'_> {
    /// Parse the form opened by the `(` under the cursor
    fn parse_list(&mut self, depth: usize) -> Result<Expression, Error> {
        if depth > self.config.max_depth {
            return Err(Error::ParseError(format!(
                "expression too deeply nested (max depth: {})",
                self.config.max_depth
            )));
        }

        let opened_at = self.position;
        self.position += 1;
        let mut elements = Vec::new();

        loop {
            let element = match self.tokens.get(self.position) {
                None => {
                    return Err(Error::ParseError(format!(
                        "missing ')' for '(' at token {opened_at}"
                    )));
                }
                Some(Token::RightParen) => {
                    self.position += 1;
                    return Ok(Expression::List(elements));
                }
                Some(Token::LeftParen) => {
                    elements.push(self.parse_list(depth + 1)?);
                    continue;
                }
                Some(Token::Integer(n)) => Expression::Integer(*n),
                Some(Token::Float(x)) => Expression::Float(*x),
                Some(Token::String(s)) => Expression::String(s.clone()),
                Some(Token::Symbol(name)) => Expression::Symbol(name.clone()),
                Some(Token::Keyword(keyword)) => Expression::Keyword(*keyword),
                Some(Token::BinaryOp(op)) => Expression::BinaryOp(*op),
                Some(Token::If) => Expression::If,
            };
            elements.push(element);
            self.position += 1;
        }
    }
}

/// Build the single root form from `tokens` with default limits
pub fn parse(tokens: &[Token]) -> Result<Expression, Error> {
    parse_with_config(tokens, ParseConfig::default())
}

pub fn parse_with_config(tokens: &[Token], config: ParseConfig) -> Result<Expression, Error> {
    match tokens.first() {
        None => return Err(Error::ParseError("empty input".to_owned())),
        Some(Token::LeftParen) => {}
        Some(other) => {
            return Err(Error::ParseError(format!(
                "a program must start with '(', found '{other}'"
            )));
        }
    }

    let mut cursor = TokenCursor {
        tokens,
        position: 0,
        config,
    };
    let root = cursor.parse_list(1)?;

    match tokens.get(cursor.position) {
        None => Ok(root),
        Some(extra) => Err(Error::ParseError(format!(
            "unexpected '{extra}' at token {} after the end of the program",
            cursor.position
        ))),
    }
}

/// Tokenize and parse source text
pub fn parse_program(input: &str) -> Result<Expression, Error> {
    let tokens = tokenize(input)?;
    parse(&tokens)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{seq, sym, val};
    use crate::builtinops::{BinaryOp, Keyword};

    #[test]
    fn test_parse_program_data_driven() {
        let test_cases = vec![
            ("()", seq(Vec::<Expression>::new())),
            (
                "(+ 1 2)",
                seq(vec![Expression::BinaryOp(BinaryOp::Add), val(1), val(2)]),
            ),
            (
                "(if (< 1 2) \"yes\" 2.5)",
                seq(vec![
                    Expression::If,
                    seq(vec![Expression::BinaryOp(BinaryOp::Less), val(1), val(2)]),
                    val("yes"),
                    val(2.5),
                ]),
            ),
            (
                "((define r 10) (* 314 (* r r)))",
                seq(vec![
                    seq(vec![Expression::Keyword(Keyword::Define), sym("r"), val(10)]),
                    seq(vec![
                        Expression::BinaryOp(BinaryOp::Multiply),
                        val(314),
                        seq(vec![Expression::BinaryOp(BinaryOp::Multiply), sym("r"), sym("r")]),
                    ]),
                ]),
            ),
            ("(#t #nil)", seq(vec![sym("#t"), sym("#nil")])),
            ("  \n(1)\n  ", seq(vec![val(1)])),
            ("(())", seq(vec![seq(Vec::<Expression>::new())])),
        ];

        for (i, (input, expected)) in test_cases.into_iter().enumerate() {
            assert_eq!(parse_program(input).unwrap(), expected, "case #{}: {input}", i + 1);
        }
    }

    #[test]
    fn test_parse_errors() {
        let error_cases = vec![
            ("", "empty input"),
            ("   ", "empty input"),
            ("42", "must start with '('"),
            (")", "must start with '('"),
            ("sqr", "must start with '('"),
            ("(", "missing ')'"),
            ("(+ 1 (* 2 3)", "missing ')'"),
            ("(1))", "unexpected ')'"),
            ("(define x 1) (x)", "unexpected '('"),
            ("(1) 2", "unexpected '2'"),
        ];

        for (i, (input, expected)) in error_cases.into_iter().enumerate() {
            match parse_program(input) {
                Err(Error::ParseError(msg)) => assert!(
                    msg.contains(expected),
                    "case #{}: {input:?}: expected '{expected}' in '{msg}'",
                    i + 1
                ),
                other => panic!("case #{}: {input:?}: expected ParseError, got {other:?}", i + 1),
            }
        }

        // Lexer failures surface unchanged
        assert!(matches!(parse_program("(\"open"), Err(Error::TokenError(_))));
    }

    #[test]
    fn test_depth_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

        assert!(parse_program(&nested(MAX_PARSE_DEPTH)).is_ok());
        assert!(matches!(
            parse_program(&nested(MAX_PARSE_DEPTH + 1)),
            Err(Error::ParseError(msg)) if msg.contains("too deeply nested")
        ));

        let tokens = tokenize(&nested(4)).unwrap();
        let shallow = ParseConfig { max_depth: 3 };
        assert!(parse_with_config(&tokens, shallow).is_err());
        assert!(parse_with_config(&tokens, ParseConfig { max_depth: 4 }).is_ok());
    }
}
