//! The module tree handed to consumers

use std::cell::OnceCell;
use std::rc::Rc;

use rowan::GreenNode;
use rowan::TokenAtOffset;

use super::names::UsedNames;
use super::node::{Leaf, Node};
use crate::base::{LineIndex, Position};
use crate::parser::{AstNode, Scope, SourceModule, SyntaxError, SyntaxNode, SyntaxToken};

/// A parsed module: the root node, its syntax errors and a lazily built
/// name index.
///
/// `Module` is a per-thread view over an immutable green tree. Build a new
/// one to see a new version of the text.
#[derive(Debug, Clone)]
pub struct Module {
    root: SyntaxNode,
    index: Rc<LineIndex>,
    errors: Vec<SyntaxError>,
    used_names: OnceCell<UsedNames>,
}

impl Module {
    pub fn new(green: GreenNode, errors: Vec<SyntaxError>) -> Self {
        let root = SyntaxNode::new_root(green);
        let index = Rc::new(LineIndex::new(&root.to_string()));
        Self {
            root,
            index,
            errors,
            used_names: OnceCell::new(),
        }
    }

    /// Like [`Module::new`] when the source text is at hand
    pub fn with_text(text: &str, green: GreenNode, errors: Vec<SyntaxError>) -> Self {
        debug_assert_eq!(usize::from(green.text_len()), text.len());
        Self {
            root: SyntaxNode::new_root(green),
            index: Rc::new(LineIndex::new(text)),
            errors,
            used_names: OnceCell::new(),
        }
    }

    pub fn root_node(&self) -> Node {
        Node::from_syntax(self.root.clone(), &self.index)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Identifier leaves by name, built on first use
    pub fn used_names(&self) -> &UsedNames {
        self.used_names
            .get_or_init(|| UsedNames::collect(&self.root, &self.index))
    }

    /// The whole source text
    pub fn serialize(&self) -> String {
        self.root.to_string()
    }

    /// The leaf whose value covers `position`, preferring the one starting
    /// there. Positions inside trivia have no leaf.
    pub fn leaf_at(&self, position: Position) -> Option<Leaf> {
        let offset = self.index.offset(position)?;
        let pick = |token: SyntaxToken| {
            let range = token.text_range();
            if range.is_empty() || !(range.start() <= offset && offset <= range.end()) {
                return None;
            }
            Leaf::new(token, &self.index)
        };
        match self.root.token_at_offset(offset) {
            TokenAtOffset::None => None,
            TokenAtOffset::Single(token) => pick(token),
            TokenAtOffset::Between(left, right) => pick(right).or_else(|| pick(left)),
        }
    }

    /// Outermost functions and classes
    pub fn scopes(&self) -> Vec<Scope> {
        SourceModule::cast(self.root.clone())
            .map(|m| m.scopes())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ParseOptions;
    use crate::parser::{AstToken, SyntaxKind, parse_text};
    use indoc::indoc;
    use rstest::rstest;

    fn module(text: &str) -> Module {
        let parse = parse_text(text, &ParseOptions::default());
        Module::with_text(text, parse.green, parse.errors)
    }

    #[test]
    fn test_serialize_root() {
        let text = "# header\n\ndef f(a):\n    return a  # done\n\n\n";
        assert_eq!(module(text).serialize(), text);
        assert_eq!(module(text).root_node().serialize(), text);
    }

    #[test]
    fn test_children_skip_trivia() {
        let m = module("x = 1  # c\ny\n");
        let kinds: Vec<_> = m.root_node().children().iter().map(Node::kind).collect();
        assert_eq!(kinds, vec![SyntaxKind::SIMPLE_STMT, SyntaxKind::SIMPLE_STMT, SyntaxKind::ENDMARKER]);
    }

    #[test]
    fn test_leaf_prefix_and_value() {
        let m = module("a = 1\n\n  # note\nb\n");
        let leaves = m.root_node().leaves();
        let b = leaves.iter().find(|l| l.value() == "b");
        assert_eq!(b.map(|l| l.prefix()), Some("\n  # note\n".to_string()));
        let eq = leaves.iter().find(|l| l.value() == "=");
        assert_eq!(eq.map(|l| l.prefix()), Some(" ".to_string()));
        assert!(leaves.iter().all(|l| !l.kind().is_trivia()));
    }

    #[test]
    fn test_prefix_and_value_rebuild_text() {
        let text = indoc! {"
            class A:  # trailing
                def f(self, x=(1,
                        2)):
                    return \\
                        x

            # tail
        "};
        let m = module(text);
        let rebuilt: String = m
            .root_node()
            .leaves()
            .iter()
            .map(|l| format!("{}{}", l.prefix(), l.value()))
            .collect();
        assert_eq!(rebuilt, text);
    }

    #[rstest]
    #[case("x = 1\n", (1, 0), (2, 0))]
    #[case("# c\nx", (2, 0), (2, 1))]
    #[case("", (1, 0), (1, 0))]
    #[case("a\r\nb\r\n", (1, 0), (3, 0))]
    fn test_root_positions(#[case] text: &str, #[case] start: (usize, usize), #[case] end: (usize, usize)) {
        let root = module(text).root_node();
        assert_eq!(root.start_pos(), start);
        assert_eq!(root.end_pos(), end);
    }

    #[test]
    fn test_statement_positions() {
        let m = module("if x:\n    y = 'ü'\n");
        let stmt = &m.root_node().children()[0];
        assert_eq!(stmt.kind(), SyntaxKind::IF_STMT);
        assert_eq!(stmt.start_pos(), (1, 0));
        let assign = m
            .root_node()
            .leaves()
            .into_iter()
            .find(|l| l.value() == "'ü'");
        assert_eq!(assign.as_ref().map(Leaf::start_pos), Some(Position::new(2, 8)));
        assert_eq!(assign.as_ref().map(Leaf::end_pos), Some(Position::new(2, 11)));
    }

    #[test]
    fn test_parent_links() {
        let m = module("f(x)\n");
        let x = m.root_node().leaves().into_iter().find(|l| l.value() == "x");
        let parent_kind = x.and_then(|l| l.parent()).map(|p| p.kind());
        assert_eq!(parent_kind, Some(SyntaxKind::ARG_LIST));
        assert_eq!(m.root_node().parent(), None);
    }

    #[test]
    fn test_used_names_order() {
        let m = module("b = a\na = b + c\nprint(a)\n");
        let names: Vec<_> = m.used_names().names().collect();
        assert_eq!(names, vec!["b", "a", "c", "print"]);
        let a_lines: Vec<_> = m
            .used_names()
            .get("a")
            .map(|leaves| leaves.iter().map(|l| l.start_pos().line).collect())
            .unwrap_or_default();
        assert_eq!(a_lines, vec![1, 2, 3]);
        assert!(!m.used_names().contains("def"));
    }

    #[test]
    fn test_leaf_at() {
        let m = module("foo = bar\n");
        assert_eq!(m.leaf_at(Position::new(1, 0)).map(|l| l.value().to_string()), Some("foo".into()));
        assert_eq!(m.leaf_at(Position::new(1, 2)).map(|l| l.value().to_string()), Some("foo".into()));
        assert_eq!(m.leaf_at(Position::new(1, 6)).map(|l| l.value().to_string()), Some("bar".into()));
        assert_eq!(m.leaf_at(Position::new(1, 5)).map(|l| l.value().to_string()), Some("=".into()));
    }

    #[test]
    fn test_error_nodes_are_nodes() {
        let m = module("x = )\ny = 1\n");
        assert!(m.has_errors());
        let has_error = m
            .root_node()
            .children()
            .iter()
            .any(|n| n.is_error() || n.children().iter().any(Node::is_error));
        assert!(has_error);
        assert_eq!(m.serialize(), "x = )\ny = 1\n");
    }

    #[test]
    fn test_scopes() {
        let m = module("def f():\n    class C:\n        pass\n");
        let scopes = m.scopes();
        assert_eq!(scopes.len(), 1);
        let nested: Vec<_> = scopes[0]
            .nested()
            .iter()
            .filter_map(|s| s.name())
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(nested, vec!["C"]);
    }
}
