//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Node kinds follow the statement/expression structure of the grammar.

/// All syntax kinds (tokens and nodes)
///
/// Tokens are leaves (names, keywords, operators, synthetic layout tokens).
/// Nodes are composite (statements, expressions, error nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (prefix text - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    COMMENT,           // # ...
    NL,                // newline that does not end a logical line
    LINE_CONTINUATION, // backslash + newline
    BYTE_ORDER_MARK,

    // =========================================================================
    // LITERALS
    // =========================================================================
    NAME,
    NUMBER,
    STRING,

    // =========================================================================
    // LAYOUT (NEWLINE carries text, the rest are zero-width)
    // =========================================================================
    NEWLINE,
    INDENT,
    DEDENT,
    ERROR_DEDENT, // dedent to a column that matches no open level
    ENDMARKER,

    ERROR_TOKEN,

    // =========================================================================
    // PUNCTUATION AND OPERATORS
    // =========================================================================
    L_PAREN,         // (
    R_PAREN,         // )
    L_BRACK,         // [
    R_BRACK,         // ]
    L_BRACE,         // {
    R_BRACE,         // }
    COLON,           // :
    COMMA,           // ,
    SEMI,            // ;
    DOT,             // .
    ELLIPSIS,        // ...
    AT,              // @
    ARROW,           // ->
    EQ,              // =
    COLON_EQ,        // :=
    PLUS,            // +
    MINUS,           // -
    STAR,            // *
    SLASH,           // /
    SLASH_SLASH,     // //
    PERCENT,         // %
    STAR_STAR,       // **
    SHL,             // <<
    SHR,             // >>
    AMP,             // &
    PIPE,            // |
    CARET,           // ^
    TILDE,           // ~
    LT,              // <
    GT,              // >
    LT_EQ,           // <=
    GT_EQ,           // >=
    EQ_EQ,           // ==
    NOT_EQ,          // !=
    PLUS_EQ,         // +=
    MINUS_EQ,        // -=
    STAR_EQ,         // *=
    SLASH_EQ,        // /=
    SLASH_SLASH_EQ,  // //=
    PERCENT_EQ,      // %=
    AT_EQ,           // @=
    AMP_EQ,          // &=
    PIPE_EQ,         // |=
    CARET_EQ,        // ^=
    SHL_EQ,          // <<=
    SHR_EQ,          // >>=
    STAR_STAR_EQ,    // **=

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    FALSE_KW,
    NONE_KW,
    TRUE_KW,
    AND_KW,
    AS_KW,
    ASSERT_KW,
    ASYNC_KW,
    AWAIT_KW,
    BREAK_KW,
    CLASS_KW,
    CONTINUE_KW,
    DEF_KW,
    DEL_KW,
    ELIF_KW,
    ELSE_KW,
    EXCEPT_KW,
    FINALLY_KW,
    FOR_KW,
    FROM_KW,
    GLOBAL_KW,
    IF_KW,
    IMPORT_KW,
    IN_KW,
    IS_KW,
    LAMBDA_KW,
    NONLOCAL_KW,
    NOT_KW,
    OR_KW,
    PASS_KW,
    RAISE_KW,
    RETURN_KW,
    TRY_KW,
    WHILE_KW,
    WITH_KW,
    YIELD_KW,

    // =========================================================================
    // NODES - root and blocks
    // =========================================================================
    MODULE,
    SUITE,

    // Simple statements
    SIMPLE_STMT,
    EXPR_STMT,
    ASSIGN_STMT,
    AUG_ASSIGN_STMT,
    ANN_ASSIGN_STMT,
    PASS_STMT,
    BREAK_STMT,
    CONTINUE_STMT,
    RETURN_STMT,
    RAISE_STMT,
    DEL_STMT,
    GLOBAL_STMT,
    NONLOCAL_STMT,
    ASSERT_STMT,
    IMPORT_NAME,
    IMPORT_FROM,
    IMPORT_ALIAS,
    DOTTED_NAME,

    // Compound statements
    IF_STMT,
    WHILE_STMT,
    FOR_STMT,
    TRY_STMT,
    EXCEPT_CLAUSE,
    WITH_STMT,
    WITH_ITEM,
    FUNC_DEF,
    CLASS_DEF,
    DECORATED,
    DECORATOR,
    ASYNC_STMT,
    PARAMETERS,
    PARAM,

    // Expressions
    TESTLIST,
    TERNARY_EXPR,
    LAMBDA_EXPR,
    NAMED_EXPR,
    BOOL_OP,
    NOT_EXPR,
    COMPARISON,
    BIN_OP,
    UNARY_OP,
    POWER_EXPR,
    AWAIT_EXPR,
    CALL,
    SUBSCRIPT,
    ATTRIBUTE,
    ARG_LIST,
    ARGUMENT,
    SUBSCRIPT_LIST,
    SLICE,
    PAREN_EXPR,
    LIST_EXPR,
    DICT_EXPR,
    SET_EXPR,
    DICT_ENTRY,
    COMPREHENSION,
    COMP_FOR,
    COMP_IF,
    STAR_EXPR,
    YIELD_EXPR,
    STRING_CONCAT,

    // Special
    ERROR_NODE,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (part of some token's prefix)
    pub fn is_trivia(self) -> bool {
        (self as u16) <= (Self::BYTE_ORDER_MARK as u16)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::FALSE_KW as u16) && (self as u16) <= (Self::YIELD_KW as u16)
    }

    /// Check if this is a punctuation or operator token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_PAREN as u16) && (self as u16) <= (Self::STAR_STAR_EQ as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(self, Self::NAME | Self::NUMBER | Self::STRING)
    }

    /// Synthetic layout tokens produced from indentation and line structure
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            Self::NEWLINE | Self::INDENT | Self::DEDENT | Self::ERROR_DEDENT | Self::ENDMARKER
        )
    }

    /// Check if this kind is a token rather than a node
    pub fn is_token(self) -> bool {
        (self as u16) < (Self::MODULE as u16)
    }

    /// Opening bracket that raises the tokenizer's bracket depth
    pub fn is_open_bracket(self) -> bool {
        matches!(self, Self::L_PAREN | Self::L_BRACK | Self::L_BRACE)
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(self, Self::R_PAREN | Self::R_BRACK | Self::R_BRACE)
    }

    /// Augmented assignment operators (`+=`, `<<=`, ...)
    pub fn is_aug_assign(self) -> bool {
        (self as u16) >= (Self::PLUS_EQ as u16) && (self as u16) <= (Self::STAR_STAR_EQ as u16)
    }

    /// Statement nodes, simple and compound
    pub fn is_statement(self) -> bool {
        (self as u16) >= (Self::SIMPLE_STMT as u16) && (self as u16) <= (Self::ASYNC_STMT as u16)
            && !matches!(
                self,
                Self::IMPORT_ALIAS | Self::DOTTED_NAME | Self::EXCEPT_CLAUSE | Self::WITH_ITEM | Self::DECORATOR
            )
    }

    /// Expression nodes
    pub fn is_expression(self) -> bool {
        (self as u16) >= (Self::TESTLIST as u16) && (self as u16) <= (Self::STRING_CONCAT as u16)
    }

    /// Statements that introduce a nested scope
    pub fn is_scope(self) -> bool {
        matches!(self, Self::FUNC_DEF | Self::CLASS_DEF)
    }

    /// Statement nodes the diff engine may reuse wholesale
    pub fn is_reusable_definition(self) -> bool {
        matches!(self, Self::FUNC_DEF | Self::CLASS_DEF | Self::DECORATED | Self::ASYNC_STMT)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArborLanguage {}

impl rowan::Language for ArborLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<ArborLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<ArborLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<ArborLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<ArborLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classes_are_disjoint() {
        assert!(SyntaxKind::COMMENT.is_trivia());
        assert!(!SyntaxKind::NEWLINE.is_trivia());
        assert!(SyntaxKind::DEF_KW.is_keyword());
        assert!(!SyntaxKind::NAME.is_keyword());
        assert!(SyntaxKind::STAR_STAR_EQ.is_punct());
        assert!(SyntaxKind::STAR_STAR_EQ.is_aug_assign());
        assert!(!SyntaxKind::EQ.is_aug_assign());
        assert!(SyntaxKind::ERROR_TOKEN.is_token());
        assert!(!SyntaxKind::MODULE.is_token());
    }

    #[test]
    fn test_statement_and_expression_kinds() {
        assert!(SyntaxKind::FUNC_DEF.is_statement());
        assert!(SyntaxKind::SIMPLE_STMT.is_statement());
        assert!(!SyntaxKind::DECORATOR.is_statement());
        assert!(SyntaxKind::TERNARY_EXPR.is_expression());
        assert!(!SyntaxKind::SUITE.is_expression());
        assert!(SyntaxKind::CLASS_DEF.is_scope());
        assert!(!SyntaxKind::DECORATED.is_scope());
    }

    #[test]
    fn test_raw_round_trip() {
        let raw: rowan::SyntaxKind = SyntaxKind::COMP_FOR.into();
        assert_eq!(SyntaxKind::from(raw), SyntaxKind::COMP_FOR);
    }
}
