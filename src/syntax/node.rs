//! Read-only node views over the CST
//!
//! [`Node`] is the closed set of things a consumer walks: leaves (one
//! significant token each), branches (statement, expression or structural
//! nodes) and error nodes. Trivia never shows up as a node; it is exposed
//! as the [`Leaf::prefix`] of the token that follows it.

use std::fmt;
use std::rc::Rc;

use crate::base::{LineIndex, Position, TextRange};
use crate::parser::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// What a branch node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Statement,
    Expression,
    /// Module, suites, parameter lists, argument lists and other glue
    Structural,
}

/// A node of the tree
#[derive(Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Leaf),
    Branch(Branch),
    Error(ErrorNode),
}

/// A single significant token
#[derive(Clone)]
pub struct Leaf {
    token: SyntaxToken,
    index: Rc<LineIndex>,
}

/// An internal node that parsed cleanly at its own level
#[derive(Clone)]
pub struct Branch {
    node: SyntaxNode,
    index: Rc<LineIndex>,
}

/// An `ERROR_NODE` wrapping text the grammar could not place
#[derive(Clone)]
pub struct ErrorNode {
    node: SyntaxNode,
    index: Rc<LineIndex>,
}

impl Node {
    pub(crate) fn from_element(element: SyntaxElement, index: &Rc<LineIndex>) -> Option<Self> {
        match element {
            rowan::NodeOrToken::Node(node) => Some(Self::from_syntax(node, index)),
            rowan::NodeOrToken::Token(token) => Leaf::new(token, index).map(Self::Leaf),
        }
    }

    pub(crate) fn from_syntax(node: SyntaxNode, index: &Rc<LineIndex>) -> Self {
        let index = Rc::clone(index);
        if node.kind() == SyntaxKind::ERROR_NODE {
            Self::Error(ErrorNode { node, index })
        } else {
            Self::Branch(Branch { node, index })
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        match self {
            Self::Leaf(leaf) => leaf.kind(),
            Self::Branch(branch) => branch.kind(),
            Self::Error(_) => SyntaxKind::ERROR_NODE,
        }
    }

    /// Error nodes and error tokens
    pub fn is_error(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.kind() == SyntaxKind::ERROR_TOKEN,
            Self::Branch(_) => false,
            Self::Error(_) => true,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Byte range covered by the node, without leading trivia
    pub fn range(&self) -> TextRange {
        match self {
            Self::Leaf(leaf) => leaf.range(),
            Self::Branch(branch) => branch.node.text_range(),
            Self::Error(error) => error.node.text_range(),
        }
    }

    /// Non-trivia children in order; empty for leaves
    pub fn children(&self) -> Vec<Node> {
        match self.syntax_node() {
            Some(node) => children_of(node, self.index()),
            None => Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<Node> {
        let parent = match self {
            Self::Leaf(leaf) => leaf.token.parent(),
            Self::Branch(branch) => branch.node.parent(),
            Self::Error(error) => error.node.parent(),
        }?;
        Some(Self::from_syntax(parent, self.index()))
    }

    /// Leaves below this node in document order
    pub fn leaves(&self) -> Vec<Leaf> {
        match self {
            Self::Leaf(leaf) => vec![leaf.clone()],
            Self::Branch(Branch { node, index }) | Self::Error(ErrorNode { node, index }) => node
                .descendants_with_tokens()
                .filter_map(|e| e.into_token())
                .filter_map(|t| Leaf::new(t, index))
                .collect(),
        }
    }

    pub fn first_leaf(&self) -> Option<Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf.clone()),
            Self::Branch(Branch { node, index }) | Self::Error(ErrorNode { node, index }) => node
                .descendants_with_tokens()
                .filter_map(|e| e.into_token())
                .find_map(|t| Leaf::new(t, index)),
        }
    }

    pub fn last_leaf(&self) -> Option<Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf.clone()),
            Self::Branch(Branch { node, index }) | Self::Error(ErrorNode { node, index }) => node
                .descendants_with_tokens()
                .filter_map(|e| e.into_token())
                .filter_map(|t| Leaf::new(t, index))
                .last(),
        }
    }

    /// Start of the first leaf, after its prefix
    pub fn start_pos(&self) -> Position {
        match self.first_leaf() {
            Some(leaf) => leaf.start_pos(),
            None => self.index().position(self.range().start()),
        }
    }

    /// End of the last leaf
    pub fn end_pos(&self) -> Position {
        match self.last_leaf() {
            Some(leaf) => leaf.end_pos(),
            None => self.index().position(self.range().end()),
        }
    }

    /// Exact source text covered by the node
    pub fn serialize(&self) -> String {
        match self {
            Self::Leaf(leaf) => leaf.value().to_string(),
            Self::Branch(branch) => branch.node.to_string(),
            Self::Error(error) => error.node.to_string(),
        }
    }

    /// The underlying rowan node, `None` for leaves
    pub fn syntax_node(&self) -> Option<&SyntaxNode> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch(branch) => Some(&branch.node),
            Self::Error(error) => Some(&error.node),
        }
    }

    fn index(&self) -> &Rc<LineIndex> {
        match self {
            Self::Leaf(leaf) => &leaf.index,
            Self::Branch(branch) => &branch.index,
            Self::Error(error) => &error.index,
        }
    }
}

pub(crate) fn children_of(node: &SyntaxNode, index: &Rc<LineIndex>) -> Vec<Node> {
    node.children_with_tokens()
        .filter_map(|element| Node::from_element(element, index))
        .collect()
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => leaf.fmt(f),
            Self::Branch(branch) => branch.fmt(f),
            Self::Error(error) => error.fmt(f),
        }
    }
}

// ============================================================================
// Leaf
// ============================================================================

impl Leaf {
    /// Wrap a significant token; trivia has no leaf
    pub(crate) fn new(token: SyntaxToken, index: &Rc<LineIndex>) -> Option<Self> {
        if token.kind().is_trivia() {
            return None;
        }
        Some(Self {
            token,
            index: Rc::clone(index),
        })
    }

    pub fn kind(&self) -> SyntaxKind {
        self.token.kind()
    }

    pub fn value(&self) -> &str {
        self.token.text()
    }

    /// Verbatim whitespace, comments and continuations before the token
    pub fn prefix(&self) -> String {
        let mut parts = Vec::new();
        let mut token = self.token.prev_token();
        while let Some(t) = token {
            if !t.kind().is_trivia() {
                break;
            }
            token = t.prev_token();
            parts.push(t);
        }
        parts.iter().rev().map(|t| t.text()).collect()
    }

    pub fn is_keyword(&self) -> bool {
        self.kind().is_keyword()
    }

    pub fn is_name(&self) -> bool {
        self.kind() == SyntaxKind::NAME
    }

    pub fn range(&self) -> TextRange {
        self.token.text_range()
    }

    pub fn start_pos(&self) -> Position {
        self.index.position(self.range().start())
    }

    pub fn end_pos(&self) -> Position {
        self.index.position(self.range().end())
    }

    pub fn parent(&self) -> Option<Node> {
        self.token.parent().map(|p| Node::from_syntax(p, &self.index))
    }

    pub fn syntax(&self) -> &SyntaxToken {
        &self.token
    }
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Leaf {}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Leaf({:?} {:?} @ {:?})", self.kind(), self.value(), self.start_pos())
    }
}

// ============================================================================
// Branch / ErrorNode
// ============================================================================

impl Branch {
    pub fn kind(&self) -> SyntaxKind {
        self.node.kind()
    }

    pub fn class(&self) -> NodeClass {
        let kind = self.kind();
        if kind.is_statement() {
            NodeClass::Statement
        } else if kind.is_expression() {
            NodeClass::Expression
        } else {
            NodeClass::Structural
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.node
    }
}

impl ErrorNode {
    pub fn syntax(&self) -> &SyntaxNode {
        &self.node
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for Branch {}

impl PartialEq for ErrorNode {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for ErrorNode {}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Branch({:?} @ {:?})", self.kind(), self.node.text_range())
    }
}

impl fmt::Debug for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorNode({:?})", self.node.text_range())
    }
}
