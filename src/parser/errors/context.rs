//! Parse context tracking for context-aware error messages
//!
//! The parser keeps a stack of contexts so an error can say where in the
//! source structure it happened and which tokens end the broken region.

use crate::parser::SyntaxKind;

/// Represents the current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseContext {
    /// Statements at column zero
    TopLevel,
    /// Statements of an indented block
    Block,
    /// Header of `if`/`while`/`for`/`try`/`with` before its `:`
    CompoundHeader,
    /// Between `def` and the body
    FunctionHeader,
    /// Between `class` and the body
    ClassHeader,
    /// `(...)` after a function name
    ParameterList,
    /// `(...)` of a call
    ArgumentList,
    /// `[...]` after a primary
    Subscript,
    /// Parenthesized, list, dict or set display
    Collection,
    /// `import ...` / `from ... import ...`
    Import,
    /// `@expr` line
    Decorator,
    /// Any other expression position
    Expression,
}

impl ParseContext {
    /// Get a human-readable description of this context for error messages
    pub fn description(&self) -> &'static str {
        match self {
            Self::TopLevel => "at top level",
            Self::Block => "in block",
            Self::CompoundHeader => "in statement header",
            Self::FunctionHeader => "in function definition",
            Self::ClassHeader => "in class definition",
            Self::ParameterList => "in parameter list",
            Self::ArgumentList => "in argument list",
            Self::Subscript => "in subscript",
            Self::Collection => "in bracketed expression",
            Self::Import => "in import statement",
            Self::Decorator => "in decorator",
            Self::Expression => "in expression",
        }
    }

    /// Get a description of what tokens are expected in this context
    pub fn expected_description(&self) -> &'static str {
        match self {
            Self::TopLevel | Self::Block => "a statement",
            Self::CompoundHeader => "':'",
            Self::FunctionHeader => "a name, parameters and ':'",
            Self::ClassHeader => "a name, optional bases and ':'",
            Self::ParameterList => "a parameter",
            Self::ArgumentList => "an argument",
            Self::Subscript => "an index or slice",
            Self::Collection => "an expression",
            Self::Import => "a dotted module name",
            Self::Decorator => "a dotted name or call",
            Self::Expression => "an operand",
        }
    }

    /// Get the recovery tokens appropriate for this context
    pub fn recovery_tokens(&self) -> &'static [SyntaxKind] {
        match self {
            Self::TopLevel | Self::Block => &[
                SyntaxKind::NEWLINE,
                SyntaxKind::DEDENT,
                SyntaxKind::ENDMARKER,
                SyntaxKind::DEF_KW,
                SyntaxKind::CLASS_KW,
                SyntaxKind::AT,
                SyntaxKind::IF_KW,
                SyntaxKind::FOR_KW,
                SyntaxKind::WHILE_KW,
                SyntaxKind::TRY_KW,
                SyntaxKind::WITH_KW,
            ],
            Self::ParameterList | Self::ArgumentList => &[
                SyntaxKind::R_PAREN,
                SyntaxKind::COMMA,
                SyntaxKind::NEWLINE,
                SyntaxKind::ENDMARKER,
            ],
            Self::Subscript => &[
                SyntaxKind::R_BRACK,
                SyntaxKind::COMMA,
                SyntaxKind::NEWLINE,
                SyntaxKind::ENDMARKER,
            ],
            Self::Collection => &[
                SyntaxKind::R_PAREN,
                SyntaxKind::R_BRACK,
                SyntaxKind::R_BRACE,
                SyntaxKind::COMMA,
                SyntaxKind::NEWLINE,
                SyntaxKind::ENDMARKER,
            ],
            Self::CompoundHeader | Self::FunctionHeader | Self::ClassHeader => &[
                SyntaxKind::COLON,
                SyntaxKind::NEWLINE,
                SyntaxKind::ENDMARKER,
            ],
            Self::Import | Self::Decorator | Self::Expression => &[
                SyntaxKind::NEWLINE,
                SyntaxKind::SEMI,
                SyntaxKind::ENDMARKER,
            ],
        }
    }

    /// Check if a token is a recovery point in this context
    pub fn is_recovery_token(&self, kind: SyntaxKind) -> bool {
        self.recovery_tokens().contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_description() {
        assert_eq!(ParseContext::TopLevel.description(), "at top level");
        assert_eq!(ParseContext::ArgumentList.description(), "in argument list");
    }

    #[test]
    fn test_is_recovery_token() {
        assert!(ParseContext::Block.is_recovery_token(SyntaxKind::DEDENT));
        assert!(ParseContext::ArgumentList.is_recovery_token(SyntaxKind::R_PAREN));
        assert!(!ParseContext::ArgumentList.is_recovery_token(SyntaxKind::DEF_KW));
    }
}
