//! Source text to token stream.
//!
//! Words are separated by whitespace; parentheses and `"` delimit them too, so
//! `(+ 1 2)` and `( + 1 2 )` lex the same. Each word is classified in order:
//! numeric literal, binary operator, `if`, keyword, plain symbol. The literals
//! `#t`, `#f` and `#nil` are plain symbols here and only get their meaning in the
//! evaluator.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, value},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, preceded, terminated},
};
use std::fmt;

use crate::Error;
use crate::ast::IntegerType;
use crate::builtinops::{BinaryOp, Keyword};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftParen,
    RightParen,
    Integer(IntegerType),
    Float(f64),
    /// String literal contents, without the quotes
    String(String),
    Symbol(String),
    Keyword(Keyword),
    BinaryOp(BinaryOp),
    If,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Float(x) => write!(f, "{x:?}"),
            Token::String(s) => write!(f, "\"{s}\""),
            Token::Symbol(s) => write!(f, "{s}"),
            Token::Keyword(keyword) => write!(f, "{keyword}"),
            Token::BinaryOp(op) => write!(f, "{op}"),
            Token::If => write!(f, "if"),
        }
    }
}

/// Characters that end a word. Must agree with what `multispace0` skips.
fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '(' | ')' | '"')
}

/// Digit, or sign followed by digit
fn starts_like_number(word: &str) -> bool {
    let unsigned = word.strip_prefix(['+', '-']).unwrap_or(word);
    unsigned.starts_with(|c: char| c.is_ascii_digit())
}

/// Classify one word. `None` means a malformed numeric literal.
fn classify_word(word: &str) -> Option<Token> {
    if starts_like_number(word) {
        return if word.contains('.') {
            word.parse().ok().map(Token::Float)
        } else {
            word.parse().ok().map(Token::Integer)
        };
    }

    let token = if let Some(op) = BinaryOp::from_symbol(word) {
        Token::BinaryOp(op)
    } else if word == "if" {
        Token::If
    } else if let Some(keyword) = Keyword::from_name(word) {
        Token::Keyword(keyword)
    } else {
        Token::Symbol(word.to_owned())
    };
    Some(token)
}

fn parse_paren(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::LeftParen, char('(')),
        value(Token::RightParen, char(')')),
    ))
    .parse(input)
}

/// Parse a string literal. No escapes: the literal ends at the next `"`.
fn parse_string(input: &str) -> IResult<&str, Token> {
    let (remaining, content) = preceded(char('"'), take_till(|c: char| c == '"')).parse(input)?;

    match remaining.strip_prefix('"') {
        Some(remaining) => Ok((remaining, Token::String(content.to_owned()))),
        // Report the opening quote, not the end of input
        None => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::Char,
        ))),
    }
}

fn parse_word(input: &str) -> IResult<&str, Token> {
    let (remaining, word) = take_while1(|c: char| !is_delimiter(c)).parse(input)?;

    match classify_word(word) {
        Some(token) => Ok((remaining, token)),
        None => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::Digit,
        ))),
    }
}

fn parse_token(input: &str) -> IResult<&str, Token> {
    alt((parse_paren, parse_string, parse_word)).parse(input)
}

/// Convert nom errors to a `TokenError` naming the byte position
fn token_error(input: &str, error: nom::Err<nom::error::Error<&str>>) -> Error {
    let message = match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let position = input.len().saturating_sub(e.input.len());
            match e.code {
                ErrorKind::Char => format!("unterminated string literal at position {position}"),
                ErrorKind::Digit => {
                    let word: String = e.input.chars().take_while(|c| !is_delimiter(*c)).collect();
                    format!("malformed number literal '{word}' at position {position}")
                }
                _ => format!("unexpected input at position {position}"),
            }
        }
        nom::Err::Incomplete(_) => "incomplete input".into(),
    };
    Error::TokenError(message)
}

/// Split `input` into tokens
pub fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = all_consuming(delimited(
        multispace0,
        many0(terminated(parse_token, multispace0)),
        multispace0,
    ));

    match tokens.parse(input) {
        Ok((_, tokens)) => Ok(tokens),
        Err(err) => Err(token_error(input, err)),
    }
}
