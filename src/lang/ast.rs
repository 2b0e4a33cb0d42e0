// paren-infer -- parenthesis inference pass for a Forth-like Lisp surface syntax
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.

//! The AST that the inference pass reads and rewrites in place.
//!
//! Every whitespace-separated sibling in the surface syntax becomes one
//! entry of an [`Expression`](CompoundExpression::Expression)'s child
//! vector; the inferrer groups those siblings into nested calls based on
//! declared arity signatures.

use std::fmt;

/// A byte-exact identifier spelling.
///
/// Identifiers are kept as raw bytes rather than `String` because the AST
/// contract (see the surrounding crate's specification) requires
/// byte-for-byte round tripping regardless of encoding; `Display` only
/// ever sees valid source text in practice, so a lossy conversion is fine
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(pub Box<[u8]>);

impl Ident {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Ident(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl<'a> From<&'a str> for Ident {
    fn from(s: &'a str) -> Self {
        Ident(s.as_bytes().to_vec().into_boxed_slice())
    }
}

/// A node of the AST that the inference pass rewrites.
///
/// `Expression` children are mutated in place during inference: siblings
/// get consumed off the front of the vector and re-wrapped into nested
/// `Expression` nodes as the engine recognizes declared calls.
#[derive(Debug, Clone, PartialEq)]
pub enum CompoundExpression {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(Vec<u8>),
    /// A plain identifier. May be a call head, an argument, or a literal
    /// symbol depending on where it sits and what is declared for it.
    Identifier(Ident),
    /// A reader-produced token not yet known to be an identifier. Always
    /// normalized to `Identifier` the first time the engine sees it.
    Callback(Ident),
    /// A call-shaped sequence of siblings, eligible for head-level
    /// inference.
    Expression(Vec<CompoundExpression>),
    /// A user-parenthesized form. Its head is exempt from inference (it is
    /// taken at face value), but its arguments are still inferred.
    LiteralExpression(Vec<CompoundExpression>),
}

impl CompoundExpression {
    pub fn identifier(name: impl Into<Box<[u8]>>) -> Self {
        CompoundExpression::Identifier(Ident(name.into()))
    }

    pub fn callback(name: impl Into<Box<[u8]>>) -> Self {
        CompoundExpression::Callback(Ident(name.into()))
    }

    /// Children of an `Expression` or `LiteralExpression`, if any.
    pub fn children(&self) -> Option<&[CompoundExpression]> {
        match self {
            CompoundExpression::Expression(xs) | CompoundExpression::LiteralExpression(xs) => {
                Some(xs)
            }
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<CompoundExpression>> {
        match self {
            CompoundExpression::Expression(xs) | CompoundExpression::LiteralExpression(xs) => {
                Some(xs)
            }
            _ => None,
        }
    }

    /// The identifier name, if this node is an `Identifier` or `Callback`.
    pub fn ident_name(&self) -> Option<&Ident> {
        match self {
            CompoundExpression::Identifier(id) | CompoundExpression::Callback(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, CompoundExpression::Callback(_))
    }
}
