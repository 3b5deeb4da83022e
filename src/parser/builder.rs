//! Green tree builder with subtree splicing
//!
//! Works like rowan's `GreenNodeBuilder` (start/finish node, checkpoints)
//! but keeps children on an explicit stack so a finished `GreenNode` from
//! an earlier parse can be pushed as a child unchanged. Green nodes carry
//! no absolute offsets, so a reused subtree needs no shifting.

use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::syntax_kind::SyntaxKind;

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Position in the child list where a node may later be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug, Default)]
pub struct TreeBuilder {
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<GreenElement>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push((kind, self.children.len()));
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) {
        self.children.push(NodeOrToken::Token(GreenToken::new(kind.into(), text)));
    }

    /// Push a finished subtree as the next child
    pub fn reuse(&mut self, node: GreenNode) {
        self.push(NodeOrToken::Node(node));
    }

    /// Push a finished node or token as the next child
    pub fn push(&mut self, element: GreenElement) {
        self.children.push(element);
    }

    pub fn finish_node(&mut self) {
        let Some((kind, first)) = self.parents.pop() else {
            return;
        };
        let children: Vec<_> = self.children.drain(first..).collect();
        self.children.push(NodeOrToken::Node(GreenNode::new(kind.into(), children)));
    }

    /// Number of open nodes
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.children.len())
    }

    /// Open a node that adopts every child pushed since `checkpoint`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let floor = self.parents.last().map(|&(_, first)| first).unwrap_or(0);
        let Checkpoint(at) = checkpoint;
        self.parents.push((kind, at.clamp(floor, self.children.len())));
    }

    /// Close any open nodes and return the root
    pub fn finish(mut self) -> GreenNode {
        while !self.parents.is_empty() {
            self.finish_node();
        }
        match self.children.pop() {
            Some(NodeOrToken::Node(node)) if self.children.is_empty() => node,
            Some(last) => {
                self.children.push(last);
                GreenNode::new(SyntaxKind::MODULE.into(), self.children)
            }
            None => GreenNode::new(SyntaxKind::MODULE.into(), Vec::<GreenElement>::new()),
        }
    }
}

/// Owned copies of a green node's direct children
pub fn green_children(node: &GreenNode) -> Vec<GreenElement> {
    node.children()
        .map(|child| match child {
            NodeOrToken::Node(n) => NodeOrToken::Node(n.to_owned()),
            NodeOrToken::Token(t) => NodeOrToken::Token(t.to_owned()),
        })
        .collect()
}

/// Kind of a green element
pub fn element_kind(element: &GreenElement) -> SyntaxKind {
    match element {
        NodeOrToken::Node(n) => n.kind().into(),
        NodeOrToken::Token(t) => t.kind().into(),
    }
}
