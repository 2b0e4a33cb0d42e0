// paren-infer -- parenthesis inference pass for a Forth-like Lisp surface syntax
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.

//! Parenthesis inference pass: rewrites a flat, whitespace-grouped AST into
//! a fully-parenthesized one by consulting a live declaration environment.

pub mod lang;
