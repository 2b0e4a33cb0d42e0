// paren-infer -- parenthesis inference pass for a Forth-like Lisp surface syntax
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.

//! Arity signatures and the builder that reads them out of a
//! signature-shaped AST fragment, e.g. `(L L &rest 0 I)`.

use super::ast::CompoundExpression;
use super::error::{InferErrorKind, InferResult};

/// A leaf signature symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSymbol {
    /// Consume the argument literally; do not infer inside it.
    Literal,
    /// Apply inference to the argument.
    Infer,
}

/// How a declared identifier consumes the siblings that follow it.
#[derive(Debug, Clone, PartialEq)]
pub enum Signature {
    Symbol(ArgSymbol),
    Expression {
        positional: Vec<Signature>,
        rest: Option<Box<Signature>>,
        default_rest_count: usize,
        variadic: bool,
    },
}

impl Signature {
    pub fn is_variadic(&self) -> bool {
        matches!(
            self,
            Signature::Expression {
                variadic: true,
                ..
            }
        )
    }
}

const REST_MARKER: &[u8] = b"&rest";

/// Builds a [`Signature`] from a signature-shaped AST fragment.
///
/// `LiteralExpression` and `Expression` nodes are accepted identically
/// here: whether a signature happened to be read with explicit
/// parentheses has no bearing on its meaning as a signature.
pub fn build_signature(node: &CompoundExpression) -> InferResult<Signature> {
    match node {
        CompoundExpression::Identifier(id) | CompoundExpression::Callback(id) => {
            match id.as_bytes() {
                b"L" => Ok(Signature::Symbol(ArgSymbol::Literal)),
                b"I" => Ok(Signature::Symbol(ArgSymbol::Infer)),
                _ => Err(InferErrorKind::InvalidSignatureSymbol {
                    found: id.to_string(),
                }),
            }
        }
        CompoundExpression::Expression(children) | CompoundExpression::LiteralExpression(children) => {
            build_expression_signature(children)
        }
        CompoundExpression::Bool(_)
        | CompoundExpression::Integer(_)
        | CompoundExpression::Float(_)
        | CompoundExpression::String(_) => Err(InferErrorKind::InvalidSignature {
            reason: "a literal value cannot be used as a signature".to_string(),
        }),
    }
}

fn rest_marker_index(children: &[CompoundExpression]) -> Option<usize> {
    children.iter().position(|c| {
        c.ident_name()
            .map(|id| id.as_bytes() == REST_MARKER)
            .unwrap_or(false)
    })
}

fn build_expression_signature(children: &[CompoundExpression]) -> InferResult<Signature> {
    let rest_pos = rest_marker_index(children);

    let rest_pos = match rest_pos {
        None => {
            let positional = children
                .iter()
                .map(build_signature)
                .collect::<InferResult<Vec<_>>>()?;
            return Ok(Signature::Expression {
                positional,
                rest: None,
                default_rest_count: 0,
                variadic: false,
            });
        }
        Some(pos) => pos,
    };

    if rest_marker_index(&children[rest_pos + 1..]).is_some() {
        return Err(InferErrorKind::DuplicateRest);
    }

    if rest_pos != children.len().saturating_sub(3) {
        return Err(InferErrorKind::RestArity);
    }

    let default_rest_count = match &children[rest_pos + 1] {
        CompoundExpression::Integer(n) if *n >= 0 => *n as usize,
        _ => return Err(InferErrorKind::RestCountNotInteger),
    };

    let rest_signature = build_signature(&children[rest_pos + 2])?;

    let positional = children[..rest_pos]
        .iter()
        .map(build_signature)
        .collect::<InferResult<Vec<_>>>()?;

    Ok(Signature::Expression {
        positional,
        rest: Some(Box::new(rest_signature)),
        default_rest_count,
        variadic: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ast::CompoundExpression as CE;

    fn ident(s: &str) -> CE {
        CE::identifier(s.as_bytes().to_vec().into_boxed_slice())
    }

    #[test]
    fn fixed_arity_signature() {
        let ast = CE::Expression(vec![ident("I"), ident("I")]);
        let sig = build_signature(&ast).unwrap();
        assert_eq!(
            sig,
            Signature::Expression {
                positional: vec![
                    Signature::Symbol(ArgSymbol::Infer),
                    Signature::Symbol(ArgSymbol::Infer)
                ],
                rest: None,
                default_rest_count: 0,
                variadic: false,
            }
        );
    }

    #[test]
    fn variadic_signature_with_default_rest_count() {
        // (L L &rest 0 I)
        let ast = CE::Expression(vec![
            ident("L"),
            ident("L"),
            ident("&rest"),
            CE::Integer(0),
            ident("I"),
        ]);
        let sig = build_signature(&ast).unwrap();
        assert!(sig.is_variadic());
        match sig {
            Signature::Expression {
                positional,
                rest,
                default_rest_count,
                variadic,
            } => {
                assert_eq!(positional.len(), 2);
                assert_eq!(default_rest_count, 0);
                assert!(variadic);
                assert_eq!(*rest.unwrap(), Signature::Symbol(ArgSymbol::Infer));
            }
            _ => panic!("expected an expression signature"),
        }
    }

    #[test]
    fn misplaced_rest_marker_is_rejected() {
        let ast = CE::Expression(vec![ident("&rest"), CE::Integer(0), ident("I"), ident("L")]);
        assert_eq!(build_signature(&ast), Err(InferErrorKind::RestArity));
    }

    #[test]
    fn duplicate_rest_marker_is_rejected() {
        let ast = CE::Expression(vec![
            ident("&rest"),
            CE::Integer(0),
            ident("I"),
            ident("&rest"),
            CE::Integer(1),
            ident("I"),
        ]);
        assert_eq!(build_signature(&ast), Err(InferErrorKind::DuplicateRest));
    }

    #[test]
    fn non_integer_rest_count_is_rejected() {
        let ast = CE::Expression(vec![ident("&rest"), ident("I"), ident("I")]);
        assert_eq!(
            build_signature(&ast),
            Err(InferErrorKind::RestCountNotInteger)
        );
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let ast = ident("X");
        assert_eq!(
            build_signature(&ast),
            Err(InferErrorKind::InvalidSignatureSymbol {
                found: "X".to_string()
            })
        );
    }

    #[test]
    fn literal_value_cannot_be_a_signature() {
        assert!(matches!(
            build_signature(&CE::Integer(1)),
            Err(InferErrorKind::InvalidSignature { .. })
        ));
    }
}
