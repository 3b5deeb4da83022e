//! Name index: identifier text to every leaf spelling it

use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smol_str::SmolStr;

use super::node::Leaf;
use crate::base::LineIndex;
use crate::parser::{SyntaxKind, SyntaxNode};

/// Every `NAME` leaf of a module grouped by its text.
///
/// Names are ordered by first occurrence and each entry's leaves are in
/// document order.
#[derive(Debug, Clone, Default)]
pub struct UsedNames {
    names: IndexMap<SmolStr, Vec<Leaf>, FxBuildHasher>,
}

impl UsedNames {
    pub(crate) fn collect(root: &SyntaxNode, index: &Rc<LineIndex>) -> Self {
        let mut names: IndexMap<SmolStr, Vec<Leaf>, FxBuildHasher> = IndexMap::default();
        for token in root.descendants_with_tokens().filter_map(|e| e.into_token()) {
            if token.kind() != SyntaxKind::NAME {
                continue;
            }
            let key = SmolStr::new(token.text());
            if let Some(leaf) = Leaf::new(token, index) {
                names.entry(key).or_default().push(leaf);
            }
        }
        Self { names }
    }

    /// Leaves spelling `name`, in document order
    pub fn get(&self, name: &str) -> Option<&[Leaf]> {
        self.names.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Distinct names by first occurrence
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(SmolStr::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Leaf])> {
        self.names.iter().map(|(name, leaves)| (name.as_str(), leaves.as_slice()))
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
