// paren-infer -- parenthesis inference pass for a Forth-like Lisp surface syntax
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.

//! A byte-labeled radix trie, keyed on identifier bytes.
//!
//! Declaration scopes are backed by this trie rather than a `HashMap`
//! because the inference pass is modeled after a Lisp implementation that
//! stores its declaration environment this way: each edge carries a
//! (possibly multi-byte) label, and nodes are split as keys diverge.

/// One node of the trie. The edge leading into a node (from its parent)
/// carries `label`; the root's own `label` is unused and left empty.
#[derive(Debug, Clone, Default)]
struct TrieNode {
    label: Vec<u8>,
    /// `None` means "no entry ends here". This also covers the
    /// intermediate node created mid-split when two keys diverge right
    /// at the split point: its index is meaningless and is never read by
    /// `find`, since no key is actually that short.
    index: Option<usize>,
    children: Vec<TrieNode>,
}

impl TrieNode {
    fn new(label: Vec<u8>, index: Option<usize>) -> Self {
        TrieNode {
            label,
            index,
            children: Vec::new(),
        }
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// A prefix tree mapping identifier byte-strings to indices into a
/// caller-owned entry table (the declaration scope's `entries`).
#[derive(Debug, Clone, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Trie {
            root: TrieNode::new(Vec::new(), None),
        }
    }

    /// Inserts `key -> index`. Re-inserting an existing key overwrites the
    /// index stored at its node (last write wins).
    pub fn insert(&mut self, key: &[u8], index: usize) {
        Self::insert_at(&mut self.root, key, index);
    }

    fn insert_at(node: &mut TrieNode, key: &[u8], index: usize) {
        if key.is_empty() {
            node.index = Some(index);
            return;
        }

        for child in node.children.iter_mut() {
            let common = common_prefix_len(&child.label, key);
            if common == 0 {
                continue;
            }

            if common == child.label.len() {
                // Edge fully consumed: descend with whatever key remains.
                Self::insert_at(child, &key[common..], index);
                return;
            }

            // The edge only partially matches: split it.
            let old_tail = child.label[common..].to_vec();
            let shared = child.label[..common].to_vec();
            let old_index = child.index.take();
            let old_children = std::mem::take(&mut child.children);
            let mut old_descendant = TrieNode::new(old_tail, old_index);
            old_descendant.children = old_children;

            child.label = shared;

            if common == key.len() {
                // The new key ends exactly at the split point.
                child.index = Some(index);
                child.children = vec![old_descendant];
            } else {
                // Both the old subtree and the new key diverge further.
                child.index = None;
                let new_descendant = TrieNode::new(key[common..].to_vec(), Some(index));
                child.children = vec![old_descendant, new_descendant];
            }
            return;
        }

        // No existing edge shares a prefix with `key`: add a fresh one.
        node.children.push(TrieNode::new(key.to_vec(), Some(index)));
    }

    /// Looks up `key`, returning the most recently inserted index for an
    /// exact match, or `None` if the key was never inserted.
    pub fn find(&self, key: &[u8]) -> Option<usize> {
        let mut node = &self.root;
        let mut remaining = key;

        if remaining.is_empty() {
            return node.index;
        }

        'outer: loop {
            for child in node.children.iter() {
                if remaining.len() >= child.label.len()
                    && &remaining[..child.label.len()] == child.label.as_slice()
                {
                    remaining = &remaining[child.label.len()..];
                    node = child;
                    if remaining.is_empty() {
                        return node.index;
                    }
                    continue 'outer;
                }
            }
            return None;
        }
    }
}
