// paren-infer -- parenthesis inference pass for a Forth-like Lisp surface syntax
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.

//! Error kinds raised during inference, and the push-only sink contract
//! that the caller supplies to collect them.

use snafu::Snafu;

/// Which side of a declared call's arity was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityProblem {
    TooFew,
    TooMany,
}

/// Every way the inference pass can fail.
///
/// Variant names mirror the abstract error kinds of the inference
/// algorithm; `snafu`'s `Display` derive gives each one a human-readable
/// message without hand-rolling `fmt::Display`.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum InferErrorKind {
    #[snafu(display("not a valid signature symbol: expected `L` or `I`, got `{}`", found))]
    InvalidSignatureSymbol { found: String },

    #[snafu(display("not a valid signature: {}", reason))]
    InvalidSignature { reason: String },

    #[snafu(display("`&rest` appears more than once in a signature"))]
    DuplicateRest,

    #[snafu(display("`&rest` must be followed by exactly a count and a signature"))]
    RestArity,

    #[snafu(display("the form following `&rest` must be an integer literal"))]
    RestCountNotInteger,

    #[snafu(display(
        "arity mismatch calling `{}`: {:?}",
        callee,
        problem
    ))]
    ArityMismatch {
        callee: String,
        problem: ArityProblem,
    },

    #[snafu(display("nested expression-shaped positional signatures are not supported"))]
    UnsupportedNestedSignature,

    #[snafu(display("expected an argument but the sibling list was exhausted"))]
    TooFewArguments,

    #[snafu(display("AST node has an unrecognized type"))]
    IllegalNodeType,

    #[snafu(display("AST node is missing"))]
    NoneNodeType,
}

pub type InferResult<T> = Result<T, InferErrorKind>;

/// One record pushed to the caller's error sink.
///
/// The inference pass always sets `start`/`end` to `-1`: it does not
/// track source spans (see the AST contract), only the message and the
/// file the pass was run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub message: String,
    pub file_name: String,
    pub start: i64,
    pub end: i64,
}

impl ErrorRecord {
    /// Builds an inference error record, prefixing the message per the
    /// error-reporting contract.
    pub fn inference(file_name: &str, kind: &InferErrorKind) -> Self {
        ErrorRecord {
            message: format!("Inference error: {}", kind),
            file_name: file_name.to_string(),
            start: -1,
            end: -1,
        }
    }
}

/// A push-only destination for error records.
///
/// Modeled as a trait rather than a concrete `Vec` so that a caller can
/// route inference errors into whatever diagnostics collector the rest
/// of the compiler already uses.
pub trait ErrorSink {
    fn push(&mut self, record: ErrorRecord);
}

impl ErrorSink for Vec<ErrorRecord> {
    fn push(&mut self, record: ErrorRecord) {
        Vec::push(self, record);
    }
}
