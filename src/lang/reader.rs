// paren-infer -- parenthesis inference pass for a Forth-like Lisp surface syntax
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.

//! A minimal S-expression reader used only by this crate's own test
//! suite to build realistic ASTs out of source text such as
//! `"(declare if (I I I)) if a b c"`.
//!
//! This is deliberately not part of the crate's production contract: a
//! real host supplies its own reader and is only required to honor the
//! AST shape described alongside the inference entry point. In
//! particular this reader recognizes `#name` as a [`Callback`] and any
//! parenthesized form as a [`LiteralExpression`], exactly the two
//! distinctions the inference pass cares about.
//!
//! [`Callback`]: super::ast::CompoundExpression::Callback
//! [`LiteralExpression`]: super::ast::CompoundExpression::LiteralExpression

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::ast::CompoundExpression;

#[derive(Debug, Clone, PartialEq)]
pub enum ReaderError {
    UnterminatedString,
    UnmatchedParenClose,
    UnmatchedParenOpen,
    EmptyToken,
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::UnterminatedString => write!(f, "unterminated string literal"),
            ReaderError::UnmatchedParenClose => write!(f, "unmatched `)`"),
            ReaderError::UnmatchedParenOpen => write!(f, "unmatched `(`"),
            ReaderError::EmptyToken => write!(f, "empty token"),
        }
    }
}

impl std::error::Error for ReaderError {}

pub type ReaderResult<T> = Result<T, ReaderError>;

struct Reader<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Self {
        Reader {
            chars: source.char_indices().peekable(),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Reads every top-level form until input is exhausted.
    fn read_top_level(&mut self) -> ReaderResult<CompoundExpression> {
        let mut forms = Vec::new();
        loop {
            self.skip_ws();
            if self.peek_char().is_none() {
                break;
            }
            forms.push(self.read_form()?);
        }
        Ok(CompoundExpression::Expression(forms))
    }

    fn read_form(&mut self) -> ReaderResult<CompoundExpression> {
        self.skip_ws();
        match self.peek_char() {
            None => Err(ReaderError::EmptyToken),
            Some('(') => self.read_parenthesized(),
            Some(')') => Err(ReaderError::UnmatchedParenClose),
            Some('"') => self.read_string(),
            Some('#') => self.read_callback(),
            _ => self.read_atom(),
        }
    }

    fn read_parenthesized(&mut self) -> ReaderResult<CompoundExpression> {
        self.chars.next(); // consume '('
        let mut children = Vec::new();
        loop {
            self.skip_ws();
            match self.peek_char() {
                None => return Err(ReaderError::UnmatchedParenOpen),
                Some(')') => {
                    self.chars.next();
                    break;
                }
                _ => children.push(self.read_form()?),
            }
        }
        Ok(CompoundExpression::LiteralExpression(children))
    }

    fn read_string(&mut self) -> ReaderResult<CompoundExpression> {
        self.chars.next(); // opening quote
        let mut bytes = Vec::new();
        loop {
            match self.chars.next() {
                None => return Err(ReaderError::UnterminatedString),
                Some((_, '"')) => break,
                Some((_, c)) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
        Ok(CompoundExpression::String(bytes))
    }

    fn read_callback(&mut self) -> ReaderResult<CompoundExpression> {
        self.chars.next(); // consume '#'
        let name = self.read_token();
        if name.is_empty() {
            return Err(ReaderError::EmptyToken);
        }
        Ok(CompoundExpression::callback(name.into_bytes()))
    }

    fn read_atom(&mut self) -> ReaderResult<CompoundExpression> {
        let token = self.read_token();
        if token.is_empty() {
            return Err(ReaderError::EmptyToken);
        }
        Ok(classify_atom(&token))
    }

    /// Consumes one run of non-whitespace, non-paren characters.
    fn read_token(&mut self) -> String {
        let mut token = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            token.push(c);
            self.chars.next();
        }
        token
    }
}

fn classify_atom(token: &str) -> CompoundExpression {
    if let Ok(n) = token.parse::<i64>() {
        return CompoundExpression::Integer(n);
    }
    if let Ok(f) = token.parse::<f64>() {
        if token.contains('.') {
            return CompoundExpression::Float(f);
        }
    }
    match token {
        "true" => CompoundExpression::Bool(true),
        "false" => CompoundExpression::Bool(false),
        _ => CompoundExpression::identifier(token.as_bytes().to_vec()),
    }
}

/// Parses `source` into one top-level [`Expression`](CompoundExpression::Expression)
/// whose children are the whitespace-separated top-level forms.
pub fn read_source(source: &str) -> ReaderResult<CompoundExpression> {
    Reader::new(source).read_top_level()
}
