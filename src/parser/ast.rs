//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode and provides methods to access children.
//! Only the structure the rest of the crate navigates (scopes, suites,
//! parameters, decorators) gets a typed view.

use rowan::WalkEvent;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

/// Trait for AST tokens that wrap a SyntaxToken
pub trait AstToken: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(token: SyntaxToken) -> Option<Self>;
    fn syntax(&self) -> &SyntaxToken;
    fn text(&self) -> &str {
        self.syntax().text()
    }
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.children().find_map(N::cast)
}

/// Scopes under `node`, not looking inside the scopes found
fn scopes_below(node: &SyntaxNode) -> Vec<Scope> {
    let mut scopes = Vec::new();
    let mut preorder = node.preorder();
    while let Some(event) = preorder.next() {
        let WalkEvent::Enter(descendant) = event else {
            continue;
        };
        if &descendant == node {
            continue;
        }
        if let Some(scope) = Scope::cast(descendant) {
            scopes.push(scope);
            preorder.skip_subtree();
        }
    }
    scopes
}

// ============================================================================
// Tokens
// ============================================================================

/// An identifier token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(SyntaxToken);

impl AstToken for Name {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind == SyntaxKind::NAME
    }

    fn cast(token: SyntaxToken) -> Option<Self> {
        if Self::can_cast(token.kind()) {
            Some(Self(token))
        } else {
            None
        }
    }

    fn syntax(&self) -> &SyntaxToken {
        &self.0
    }
}

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceModule, MODULE);

impl SourceModule {
    /// Top-level statement nodes, error nodes included
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }

    /// Outermost functions and classes, wherever they are nested in
    /// control flow
    pub fn scopes(&self) -> Vec<Scope> {
        scopes_below(&self.0)
    }
}

// ============================================================================
// Scopes
// ============================================================================

ast_node!(FuncDef, FUNC_DEF);

impl FuncDef {
    pub fn name(&self) -> Option<Name> {
        child_token(&self.0, SyntaxKind::NAME).and_then(Name::cast)
    }

    pub fn parameters(&self) -> Option<Parameters> {
        child(&self.0)
    }

    /// Indented body, absent for one-line definitions
    pub fn suite(&self) -> Option<Suite> {
        child(&self.0)
    }

    /// Whether this is the target of an `async` statement
    pub fn is_async(&self) -> bool {
        self.0.parent().is_some_and(|p| p.kind() == SyntaxKind::ASYNC_STMT)
    }
}

ast_node!(ClassDef, CLASS_DEF);

impl ClassDef {
    pub fn name(&self) -> Option<Name> {
        child_token(&self.0, SyntaxKind::NAME).and_then(Name::cast)
    }

    /// Base class list, when the class has parentheses with arguments
    pub fn bases(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::ARG_LIST)
    }

    pub fn suite(&self) -> Option<Suite> {
        child(&self.0)
    }
}

/// A function or class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Function(FuncDef),
    Class(ClassDef),
}

impl AstNode for Scope {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_scope()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FUNC_DEF => Some(Self::Function(FuncDef(node))),
            SyntaxKind::CLASS_DEF => Some(Self::Class(ClassDef(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Function(n) => n.syntax(),
            Self::Class(n) => n.syntax(),
        }
    }
}

impl Scope {
    pub fn name(&self) -> Option<Name> {
        match self {
            Self::Function(f) => f.name(),
            Self::Class(c) => c.name(),
        }
    }

    /// Directly nested functions and classes
    pub fn nested(&self) -> Vec<Scope> {
        scopes_below(self.syntax())
    }

    /// Decorators applied to this scope
    pub fn decorators(&self) -> Vec<Decorator> {
        let mut parent = self.syntax().parent();
        if parent.as_ref().is_some_and(|p| p.kind() == SyntaxKind::ASYNC_STMT) {
            parent = parent.and_then(|p| p.parent());
        }
        parent
            .and_then(Decorated::cast)
            .map(|d| d.decorators().collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Blocks and decorators
// ============================================================================

ast_node!(Suite, SUITE);

impl Suite {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }
}

ast_node!(Decorated, DECORATED);

impl Decorated {
    pub fn decorators(&self) -> impl Iterator<Item = Decorator> + '_ {
        self.0.children().filter_map(Decorator::cast)
    }

    /// The decorated function or class
    pub fn definition(&self) -> Option<Scope> {
        self.0.children().find_map(|n| {
            if n.kind() == SyntaxKind::ASYNC_STMT {
                n.children().find_map(Scope::cast)
            } else {
                Scope::cast(n)
            }
        })
    }
}

ast_node!(Decorator, DECORATOR);

impl Decorator {
    /// Source of the decorator expression without `@` and line end
    pub fn expression_text(&self) -> String {
        self.0
            .children_with_tokens()
            .filter(|e| {
                !e.kind().is_trivia() && !matches!(e.kind(), SyntaxKind::AT | SyntaxKind::NEWLINE)
            })
            .map(|e| e.to_string())
            .collect()
    }
}

// ============================================================================
// Parameters
// ============================================================================

ast_node!(Parameters, PARAMETERS);

impl Parameters {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        self.0.children().filter_map(Param::cast)
    }
}

/// How a parameter binds arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Normal,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
    /// Bare `*`: keyword-only marker
    KeywordOnlyMarker,
    /// `/`: positional-only marker
    PositionalOnlyMarker,
}

ast_node!(Param, PARAM);

impl Param {
    pub fn name(&self) -> Option<Name> {
        child_token(&self.0, SyntaxKind::NAME).and_then(Name::cast)
    }

    pub fn kind(&self) -> ParamKind {
        let first = self
            .0
            .children_with_tokens()
            .find(|e| !e.kind().is_trivia())
            .map(|e| e.kind());
        match first {
            Some(SyntaxKind::STAR) if self.name().is_some() => ParamKind::VarPositional,
            Some(SyntaxKind::STAR) => ParamKind::KeywordOnlyMarker,
            Some(SyntaxKind::STAR_STAR) => ParamKind::VarKeyword,
            Some(SyntaxKind::SLASH) => ParamKind::PositionalOnlyMarker,
            _ => ParamKind::Normal,
        }
    }

    /// Whether the parameter has a `= default`
    pub fn has_default(&self) -> bool {
        child_token(&self.0, SyntaxKind::EQ).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ParseOptions;
    use crate::parser::parse_text;
    use indoc::indoc;

    fn module(text: &str) -> SourceModule {
        let root = parse_text(text, &ParseOptions::default()).syntax();
        SourceModule::cast(root).expect("root is a module")
    }

    fn names(scopes: &[Scope]) -> Vec<String> {
        scopes
            .iter()
            .filter_map(|s| s.name())
            .map(|n| n.text().to_string())
            .collect()
    }

    #[test]
    fn test_scopes_and_nesting() {
        let m = module(indoc! {"
            def outer():
                def inner():
                    def deepest():
                        pass
                if x:
                    class Local:
                        pass

            class A:
                def method(self):
                    pass
        "});
        let scopes = m.scopes();
        assert_eq!(names(&scopes), vec!["outer", "A"]);
        assert_eq!(names(&scopes[0].nested()), vec!["inner", "Local"]);
        assert_eq!(names(&scopes[1].nested()), vec!["method"]);
    }

    #[test]
    fn test_decorated_definition() {
        let m = module("@first\n@second.attr(1)\nasync def f():\n    pass\n");
        let scopes = m.scopes();
        assert_eq!(scopes.len(), 1);
        let Scope::Function(func) = &scopes[0] else {
            panic!("expected function");
        };
        assert!(func.is_async());
        let decorators: Vec<_> = scopes[0].decorators().iter().map(|d| d.expression_text()).collect();
        assert_eq!(decorators, vec!["first", "second.attr(1)"]);
    }

    #[test]
    fn test_parameters() {
        let m = module("def f(a, b=1, /, *args, c, **kw):\n    pass\n");
        let Some(Scope::Function(func)) = m.scopes().into_iter().next() else {
            panic!("expected function");
        };
        let params: Vec<_> = func
            .parameters()
            .map(|p| p.params().map(|p| p.kind()).collect())
            .unwrap_or_default();
        assert_eq!(
            params,
            vec![
                ParamKind::Normal,
                ParamKind::Normal,
                ParamKind::PositionalOnlyMarker,
                ParamKind::VarPositional,
                ParamKind::Normal,
                ParamKind::VarKeyword
            ]
        );
        let defaults = func
            .parameters()
            .map(|p| p.params().filter(|p| p.has_default()).count());
        assert_eq!(defaults, Some(1));
    }

    #[test]
    fn test_class_bases_and_suite() {
        let m = module("class A(B, C):\n    x = 1\n    y = 2\n");
        let Some(Scope::Class(class)) = m.scopes().into_iter().next() else {
            panic!("expected class");
        };
        assert_eq!(class.bases().map(|b| b.to_string()), Some("B, C".to_string()));
        assert_eq!(class.suite().map(|s| s.statements().count()), Some(2));
    }
}
