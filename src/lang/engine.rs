// paren-infer -- parenthesis inference pass for a Forth-like Lisp surface syntax
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.

//! The inference pass itself: a recursive rewriter that groups flat
//! sibling lists into nested calls, driven by a live declaration scope
//! that the `declare` form mutates as it goes.

use log::{debug, trace, warn};

use super::ast::CompoundExpression;
use super::error::{ArityProblem, ErrorRecord, ErrorSink, InferErrorKind, InferResult};
use super::scope::{DeclarationEntry, DeclarationScope, ScopeStack};
use super::signature::{build_signature, ArgSymbol, Signature};

/// Reserved extension point for scripted declarators.
///
/// A `declare` form may carry a fourth element, a declarator body, that
/// in a full implementation would run against an embedded interpreter to
/// decide how its siblings are consumed (the reserved hooks
/// `declare-identifier`, `infer-and-get-next-argument`,
/// `push-declaration-scope`, `pop-declaration-scope` and the
/// `declaration-scope` generator all exist for such a script to call).
/// This pass never instantiates a runner and always behaves as though
/// the default, no-op implementation were in effect.
pub trait DeclaratorRunner {
    fn run(&mut self, entry: &DeclarationEntry, args: &[CompoundExpression]) -> InferResult<()>;
}

/// Per-run state for the inference pass: the scope stack and the
/// caller-supplied error sink and file name used to label any errors.
pub struct Inferrer<'a> {
    scopes: ScopeStack,
    sink: &'a mut dyn ErrorSink,
    file_name: String,
}

impl<'a> Inferrer<'a> {
    pub fn new(sink: &'a mut dyn ErrorSink, file_name: &str) -> Self {
        Inferrer {
            scopes: ScopeStack::new(),
            sink,
            file_name: file_name.to_string(),
        }
    }

    fn fail<T>(&mut self, kind: InferErrorKind) -> InferResult<T> {
        self.sink.push(ErrorRecord::inference(&self.file_name, &kind));
        Err(kind)
    }

    /// Driver: dispatches on the node's own shape.
    pub fn infer_compound(&mut self, node: &mut CompoundExpression, infer: bool) -> InferResult<()> {
        match node {
            CompoundExpression::Bool(_)
            | CompoundExpression::Integer(_)
            | CompoundExpression::Float(_)
            | CompoundExpression::String(_)
            | CompoundExpression::Identifier(_) => Ok(()),
            CompoundExpression::Callback(id) => {
                let id = id.clone();
                *node = CompoundExpression::Identifier(id);
                Ok(())
            }
            CompoundExpression::Expression(_) | CompoundExpression::LiteralExpression(_) => {
                self.infer_expression(node, infer)
            }
        }
    }

    fn infer_expression(&mut self, node: &mut CompoundExpression, infer: bool) -> InferResult<()> {
        let is_literal = matches!(node, CompoundExpression::LiteralExpression(_));

        let empty = match node {
            CompoundExpression::Expression(xs) | CompoundExpression::LiteralExpression(xs) => {
                xs.is_empty()
            }
            _ => true,
        };
        if !infer || empty {
            return Ok(());
        }

        if is_literal {
            if let CompoundExpression::LiteralExpression(xs) = node {
                let owned = std::mem::take(xs);
                *node = CompoundExpression::Expression(owned);
            }
            let xs = match node {
                CompoundExpression::Expression(xs) => xs,
                _ => unreachable!(),
            };
            self.infer_compound(&mut xs[0], false)?;
            self.infer_arguments(xs, 1, false)?;
            return Ok(());
        }

        let xs = match node {
            CompoundExpression::Expression(xs) => xs,
            _ => unreachable!(),
        };

        if xs[0].is_callback() {
            self.infer_compound(&mut xs[0], infer)?;
            return self.infer_arguments(xs, 1, infer);
        }

        if let CompoundExpression::Identifier(id) = &xs[0] {
            let name = id.as_bytes().to_vec();
            let declared = declared_call_signature(&self.scopes, &name);
            if let Some(signature) = declared {
                return self.infer_declared_call(xs, &name, &signature, infer);
            }
            return self.infer_arguments(xs, 1, infer);
        }

        // The head is neither a callback nor an identifier: this node is
        // not itself a call, just a lexical grouping.
        self.scopes.push(DeclarationScope::new());
        let result = self.infer_arguments(xs, 0, infer);
        self.scopes.pop();
        result
    }

    /// Top-level declared-call handling, reached only when `xs[0]` is the
    /// call head of the expression currently being inferred. Unlike
    /// nested sub-calls, a fixed-arity call here must consume exactly its
    /// remaining siblings and a variadic call consumes all of them.
    fn infer_declared_call(
        &mut self,
        xs: &mut Vec<CompoundExpression>,
        name: &[u8],
        signature: &Signature,
        infer: bool,
    ) -> InferResult<()> {
        let (positional, rest, variadic) = match signature {
            Signature::Expression {
                positional,
                rest,
                variadic,
                ..
            } => (positional, rest, *variadic),
            Signature::Symbol(_) => unreachable!("caller only passes Expression signatures"),
        };

        let mut idx = 1usize;
        for slot in positional {
            let slot_infer = resolve_slot_infer(slot, infer)?;
            if idx >= xs.len() {
                return self.fail(InferErrorKind::ArityMismatch {
                    callee: String::from_utf8_lossy(name).into_owned(),
                    problem: ArityProblem::TooFew,
                });
            }
            self.infer_argument(xs, idx, slot_infer)?;
            idx += 1;
        }

        if variadic {
            let rest_sig = rest.as_ref().expect("variadic signature always carries a rest slot");
            let rest_infer = resolve_slot_infer(rest_sig, infer)?;
            while idx < xs.len() {
                self.infer_argument(xs, idx, rest_infer)?;
                idx += 1;
            }
        } else if idx != xs.len() {
            return self.fail(InferErrorKind::ArityMismatch {
                callee: String::from_utf8_lossy(name).into_owned(),
                problem: ArityProblem::TooMany,
            });
        }

        Ok(())
    }

    /// Walks `xs[start..]`, rewriting each logical argument in turn and
    /// watching for a freshly-produced `declare` form to fold into the
    /// current scope.
    fn infer_arguments(
        &mut self,
        xs: &mut Vec<CompoundExpression>,
        start: usize,
        infer: bool,
    ) -> InferResult<()> {
        let mut cursor = start;
        while cursor < xs.len() {
            self.infer_argument(xs, cursor, infer)?;
            self.maybe_handle_declare(xs, cursor)?;
            cursor += 1;
        }
        Ok(())
    }

    /// Consumes exactly one logical argument at `cursor`: either a plain
    /// node (normalized and recursed into in place), or, when it names a
    /// declared call, a freshly absorbed nested expression that swallows
    /// as many of the following siblings as its signature demands.
    fn infer_argument(
        &mut self,
        xs: &mut Vec<CompoundExpression>,
        cursor: usize,
        infer: bool,
    ) -> InferResult<()> {
        if cursor >= xs.len() {
            return self.fail(InferErrorKind::TooFewArguments);
        }

        if infer {
            if let CompoundExpression::Identifier(id) = &xs[cursor] {
                let name = id.as_bytes().to_vec();
                let declared = declared_call_signature(&self.scopes, &name);
                if let Some(signature) = declared {
                    return self.consume_call_at(xs, cursor, &signature, infer);
                }
            }
        }

        self.infer_compound(&mut xs[cursor], infer)
    }

    /// Absorbs a nested sub-call starting at `cursor` (an identifier
    /// already known to resolve to an `Expression` signature) into a
    /// single new `Expression` node, consuming exactly the declared
    /// number of positional and default-rest siblings.
    fn consume_call_at(
        &mut self,
        xs: &mut Vec<CompoundExpression>,
        cursor: usize,
        signature: &Signature,
        infer: bool,
    ) -> InferResult<()> {
        let (positional, rest, default_rest_count, variadic) = match signature {
            Signature::Expression {
                positional,
                rest,
                default_rest_count,
                variadic,
            } => (positional, rest, *default_rest_count, *variadic),
            Signature::Symbol(_) => unreachable!("caller only passes Expression signatures"),
        };

        let mut idx = cursor + 1;
        for slot in positional {
            let slot_infer = resolve_slot_infer(slot, infer)?;
            self.infer_argument(xs, idx, slot_infer)?;
            idx += 1;
        }

        if variadic {
            let rest_sig = rest.as_ref().expect("variadic signature always carries a rest slot");
            let rest_infer = resolve_slot_infer(rest_sig, infer)?;
            for _ in 0..default_rest_count {
                self.infer_argument(xs, idx, rest_infer)?;
                idx += 1;
            }
        }

        let drained: Vec<CompoundExpression> = xs.drain(cursor..idx).collect();
        xs.insert(cursor, CompoundExpression::Expression(drained));
        Ok(())
    }

    /// Recognizes `(declare NAME SIGNATURE [BODY])` among just-produced
    /// arguments and folds it into the innermost scope.
    fn maybe_handle_declare(
        &mut self,
        xs: &mut Vec<CompoundExpression>,
        cursor: usize,
    ) -> InferResult<()> {
        let is_declare_shape = matches!(
            &xs[cursor],
            CompoundExpression::Expression(children)
                if (3..=4).contains(&children.len())
                    && matches!(
                        children.first(),
                        Some(CompoundExpression::Identifier(id)) if id.as_bytes() == b"declare"
                    )
        );
        if !is_declare_shape {
            return Ok(());
        }

        let (name, sig_ast) = match &xs[cursor] {
            CompoundExpression::Expression(children) => {
                let name = match &children[1] {
                    CompoundExpression::Identifier(id) => id.as_bytes().to_vec(),
                    _ => return self.fail(InferErrorKind::IllegalNodeType),
                };
                (name, children[2].clone())
            }
            _ => unreachable!("checked by is_declare_shape"),
        };

        let signature = build_signature(&sig_ast)?;

        match self.scopes.innermost_mut() {
            Some(scope) => {
                debug!("`declare` introduced `{}`", String::from_utf8_lossy(&name));
                scope.insert(&name, DeclarationEntry::new(signature));
            }
            None => warn!("`declare` form with no enclosing scope to insert into"),
        }

        Ok(())
    }
}

fn declared_call_signature(scopes: &ScopeStack, name: &[u8]) -> Option<Signature> {
    scopes.find(name).and_then(|entry| match &entry.signature {
        Signature::Expression { .. } => Some(entry.signature.clone()),
        Signature::Symbol(_) => None,
    })
}

fn resolve_slot_infer(slot: &Signature, caller_infer: bool) -> InferResult<bool> {
    match slot {
        Signature::Symbol(ArgSymbol::Infer) => Ok(caller_infer),
        Signature::Symbol(ArgSymbol::Literal) => Ok(false),
        Signature::Expression { .. } => Err(InferErrorKind::UnsupportedNestedSignature),
    }
}

fn declare_builtin_signature() -> Signature {
    Signature::Expression {
        positional: vec![
            Signature::Symbol(ArgSymbol::Literal),
            Signature::Symbol(ArgSymbol::Literal),
        ],
        rest: Some(Box::new(Signature::Symbol(ArgSymbol::Infer))),
        default_rest_count: 0,
        variadic: true,
    }
}

/// Runs the inference pass over `root` in place.
///
/// `max_comptime_vm_objects` is reserved for a future [`DeclaratorRunner`]
/// that executes scripted declarator bodies; this pass never reads it.
pub fn infer_parentheses(
    root: &mut CompoundExpression,
    sink: &mut dyn ErrorSink,
    file_name: &str,
    max_comptime_vm_objects: usize,
) -> InferResult<()> {
    let _ = max_comptime_vm_objects;
    trace!("starting parenthesis inference over {}", file_name);

    let mut engine = Inferrer::new(sink, file_name);
    let mut root_scope = DeclarationScope::new();
    root_scope.insert(b"declare", DeclarationEntry::new(declare_builtin_signature()));
    engine.scopes.push(root_scope);

    let result = engine.infer_compound(root, true);
    engine.scopes.pop();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::reader::read_source;

    fn infer(source: &str) -> (CompoundExpression, Vec<ErrorRecord>) {
        let mut root = read_source(source).expect("test fixture failed to parse");
        let mut errors = Vec::new();
        let result = infer_parentheses(&mut root, &mut errors, "test.ext", 0);
        assert!(result.is_ok(), "inference failed: {:?}", errors);
        (root, errors)
    }

    /// Whether a sibling list was originally written with explicit
    /// parentheses is not something these fixtures care about; only the
    /// grouping and content matters. Collapse `LiteralExpression` into
    /// `Expression` before comparing so that writing the expected shape
    /// with ordinary parens in the fixture text doesn't spuriously
    /// disagree with a freshly-constructed `Expression` node.
    fn ignore_literal_tag(node: CompoundExpression) -> CompoundExpression {
        match node {
            CompoundExpression::Expression(xs) => {
                CompoundExpression::Expression(xs.into_iter().map(ignore_literal_tag).collect())
            }
            CompoundExpression::LiteralExpression(xs) => {
                CompoundExpression::Expression(xs.into_iter().map(ignore_literal_tag).collect())
            }
            other => other,
        }
    }

    fn expect(source: &str, expected: &str) {
        let (got, _) = infer(source);
        let want = read_source(expected).expect("expected fixture failed to parse");
        assert_eq!(
            ignore_literal_tag(got),
            ignore_literal_tag(want),
            "inferring {:?}",
            source
        );
    }

    #[test]
    fn scenario_declares_a_fixed_arity_if() {
        expect(
            "(declare if (I I I)) if a b c",
            "(declare if (I I I)) (if a b c)",
        );
    }

    #[test]
    fn scenario_right_associative_binary_plus() {
        expect(
            "(declare + (I I)) + 1 + 2 3",
            "(declare + (I I)) (+ 1 (+ 2 3))",
        );
    }

    #[test]
    fn scenario_literal_slot_leaves_bare_identifier_untouched() {
        expect(
            "(declare setq (L I)) setq x 1",
            "(declare setq (L I)) (setq x 1)",
        );
    }

    #[test]
    fn scenario_variadic_with_nonzero_default_rest_count() {
        expect(
            "(declare list (&rest 3 I)) list 1 2 3",
            "(declare list (&rest 3 I)) (list 1 2 3)",
        );
    }

    #[test]
    fn scenario_literal_expression_head_is_preserved_and_args_not_rewritten() {
        expect("(declare f (I I)) (#f 1 2)", "(declare f (I I)) (f 1 2)");
    }

    #[test]
    fn scenario_unknown_identifier_is_left_alone_but_descended_into() {
        expect("g 1 2 3", "g 1 2 3");
    }

    #[test]
    fn empty_expression_is_unchanged() {
        let mut root = CompoundExpression::Expression(vec![]);
        let mut errors = Vec::new();
        infer_parentheses(&mut root, &mut errors, "test.ext", 0).unwrap();
        assert_eq!(root, CompoundExpression::Expression(vec![]));
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_argument_for_a_nested_sub_call_is_reported() {
        let mut root = read_source("(declare if (I I I)) if a b").unwrap();
        let mut errors = Vec::new();
        let result = infer_parentheses(&mut root, &mut errors, "test.ext", 0);
        assert!(result.is_err());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Inference error: "));
        assert_eq!(errors[0].start, -1);
        assert_eq!(errors[0].end, -1);
    }

    #[test]
    fn under_consuming_a_fixed_arity_call_at_the_very_top_is_an_arity_mismatch() {
        // `declare` itself is pre-declared with two literal positional
        // slots; a bare top-level `declare if` supplies only one.
        let mut root = read_source("declare if").unwrap();
        let mut errors = Vec::new();
        let result = infer_parentheses(&mut root, &mut errors, "test.ext", 0);
        assert_eq!(result, Err(InferErrorKind::ArityMismatch {
            callee: "declare".to_string(),
            problem: ArityProblem::TooFew,
        }));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn exactly_zero_arg_variadic_call_succeeds() {
        expect(
            "(declare thunk (&rest 0 I)) thunk",
            "(declare thunk (&rest 0 I)) (thunk)",
        );
    }

    #[test]
    fn no_callback_nodes_survive_inference() {
        let (root, _) = infer("(declare f (I I)) (#f 1 2)");
        fn assert_no_callbacks(node: &CompoundExpression) {
            assert!(!node.is_callback());
            if let Some(children) = node.children() {
                for c in children {
                    assert_no_callbacks(c);
                }
            }
        }
        assert_no_callbacks(&root);
    }

    #[test]
    fn declaration_does_not_leak_to_earlier_siblings() {
        // `inc` is declared only after its first (undeclared) use, so the
        // first occurrence must stay a bare call-less identifier run.
        expect(
            "inc 1 (declare inc (I)) inc 2",
            "inc 1 (declare inc (I)) (inc 2)",
        );
    }
}
