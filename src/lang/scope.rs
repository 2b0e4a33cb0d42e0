// paren-infer -- parenthesis inference pass for a Forth-like Lisp surface syntax
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.

//! Declaration scopes and the scope stack that gives them lexical
//! shadowing.

use log::{trace, warn};

use super::signature::Signature;
use super::trie::Trie;

/// What a declared identifier resolves to.
///
/// The `declarator` slot is reserved for a scripted declarator body (see
/// the crate's specification for the `declare` surface form); this pass
/// never executes one, it only carries the slot so the data model has
/// somewhere to put it.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationEntry {
    pub signature: Signature,
    pub declarator: Option<Vec<u8>>,
}

impl DeclarationEntry {
    pub fn new(signature: Signature) -> Self {
        DeclarationEntry {
            signature,
            declarator: None,
        }
    }
}

/// A single lexical frame: a byte-keyed trie over an append-only entry
/// table. Re-declaring a name inserts a new entry and repoints the trie
/// at it, so the most recent declaration always wins.
#[derive(Debug, Clone, Default)]
pub struct DeclarationScope {
    trie: Trie,
    entries: Vec<DeclarationEntry>,
}

impl DeclarationScope {
    pub fn new() -> Self {
        DeclarationScope {
            trie: Trie::new(),
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: &[u8], entry: DeclarationEntry) {
        let index = self.entries.len();
        self.entries.push(entry);
        self.trie.insert(name, index);
        trace!("declared `{}` in scope", String::from_utf8_lossy(name));
    }

    pub fn find(&self, name: &[u8]) -> Option<&DeclarationEntry> {
        self.trie.find(name).map(|i| &self.entries[i])
    }
}

/// An ordered stack of [`DeclarationScope`]s. The top of the stack is the
/// innermost lexical scope; lookup walks top to bottom and returns the
/// first hit.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<DeclarationScope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { scopes: Vec::new() }
    }

    pub fn push(&mut self, scope: DeclarationScope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<DeclarationScope> {
        let popped = self.scopes.pop();
        if popped.is_none() {
            warn!("tried to pop a declaration scope off an empty stack");
        }
        popped
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn find(&self, name: &[u8]) -> Option<&DeclarationEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.find(name))
    }

    /// Mutable access to the innermost scope, used by the `declare` form
    /// to insert a new entry into the scope it appears in.
    pub fn innermost_mut(&mut self) -> Option<&mut DeclarationScope> {
        self.scopes.last_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::signature::ArgSymbol;

    fn leaf() -> DeclarationEntry {
        DeclarationEntry::new(Signature::Symbol(ArgSymbol::Infer))
    }

    #[test]
    fn shadowing_prefers_innermost_scope() {
        let mut stack = ScopeStack::new();
        let mut outer = DeclarationScope::new();
        outer.insert(b"x", leaf());
        stack.push(outer);

        assert!(stack.find(b"x").is_some());

        let inner = DeclarationScope::new();
        stack.push(inner);
        stack.innermost_mut().unwrap().insert(
            b"x",
            DeclarationEntry::new(Signature::Symbol(ArgSymbol::Literal)),
        );

        assert_eq!(
            stack.find(b"x").unwrap().signature,
            Signature::Symbol(ArgSymbol::Literal)
        );

        stack.pop();
        assert_eq!(
            stack.find(b"x").unwrap().signature,
            Signature::Symbol(ArgSymbol::Infer)
        );
    }

    #[test]
    fn reinserting_a_name_in_the_same_scope_shadows_the_prior_entry() {
        let mut scope = DeclarationScope::new();
        scope.insert(b"n", leaf());
        scope.insert(
            b"n",
            DeclarationEntry::new(Signature::Symbol(ArgSymbol::Literal)),
        );
        assert_eq!(
            scope.find(b"n").unwrap().signature,
            Signature::Symbol(ArgSymbol::Literal)
        );
    }

    #[test]
    fn pop_balances_push() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.depth(), 0);
        stack.push(DeclarationScope::new());
        stack.push(DeclarationScope::new());
        assert_eq!(stack.depth(), 2);
        stack.pop();
        assert_eq!(stack.depth(), 1);
        stack.pop();
        assert_eq!(stack.depth(), 0);
    }
}
