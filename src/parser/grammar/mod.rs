//! Grammar for the indentation-sensitive language
//!
//! The parsing functions are generic over [`GrammarParser`] so the grammar
//! stays independent of how tokens are buffered, how trivia is attached and
//! how subtrees from an earlier parse are spliced in.
//!
//! - `statements` - module, blocks, suites and simple statements
//! - `compound` - `if`/`while`/`for`/`try`/`with`, definitions, decorators
//! - `expressions` - the expression precedence chain

mod compound;
mod expressions;
mod statements;

pub use expressions::{parse_expression, parse_test, parse_testlist};
pub use statements::{parse_module, parse_statement};

// Shared imports, visible to the submodules through `use super::*;`
pub(crate) use super::builder::Checkpoint;
pub(crate) use super::errors::{ErrorCode, ParseContext};
pub(crate) use super::syntax_kind::SyntaxKind;
pub(crate) use super::tokenizer::breaks_bracket_run;

/// Interface between the grammar and the parser infrastructure
pub trait GrammarParser {
    // Token inspection
    fn current_kind(&self) -> SyntaxKind;
    fn current_text(&self) -> &str;

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    /// Peek at the kind of the nth significant token ahead
    fn peek_kind(&mut self, n: usize) -> SyntaxKind;

    /// Number of significant tokens consumed so far
    fn get_pos(&self) -> usize;

    // Token consumption
    /// Consume the current token. Never consumes `ENDMARKER`.
    fn bump(&mut self);
    /// Consume the final `ENDMARKER` together with trailing trivia
    fn bump_eof(&mut self);

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let code = match kind {
            SyntaxKind::R_PAREN | SyntaxKind::R_BRACK | SyntaxKind::R_BRACE => ErrorCode::E0201,
            SyntaxKind::COLON => ErrorCode::E0303,
            SyntaxKind::NAME => ErrorCode::E0301,
            SyntaxKind::NEWLINE => ErrorCode::E0206,
            _ => ErrorCode::E0902,
        };
        let message = format!(
            "expected {} {}, found {}",
            describe(kind),
            self.context().description(),
            describe(self.current_kind())
        );
        self.error(code, message);
        false
    }

    // Node building
    fn start_node(&mut self, kind: SyntaxKind);
    fn finish_node(&mut self);
    fn checkpoint(&mut self) -> Checkpoint;
    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind);

    // Diagnostics
    fn error(&mut self, code: ErrorCode, message: String);
    fn push_context(&mut self, context: ParseContext);
    fn pop_context(&mut self);
    fn context(&self) -> ParseContext;

    /// Splice in an unchanged statement from an earlier parse
    fn try_reuse(&mut self) -> bool;
}

/// Tokens that may begin an expression
///
/// `ERROR_TOKEN` counts so that an invalid operand is consumed into an
/// `ERROR_NODE` where the operand was expected.
pub fn can_start_expression(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    matches!(
        kind,
        NAME | NUMBER
            | ERROR_TOKEN
            | STRING
            | L_PAREN
            | L_BRACK
            | L_BRACE
            | MINUS
            | PLUS
            | TILDE
            | STAR
            | ELLIPSIS
            | NONE_KW
            | TRUE_KW
            | FALSE_KW
            | NOT_KW
            | LAMBDA_KW
            | AWAIT_KW
            | YIELD_KW
    )
}

/// Tokens that may begin a statement
pub fn can_start_statement(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    can_start_expression(kind)
        || matches!(
            kind,
            IF_KW
                | WHILE_KW
                | FOR_KW
                | TRY_KW
                | WITH_KW
                | DEF_KW
                | CLASS_KW
                | AT
                | ASYNC_KW
                | PASS_KW
                | BREAK_KW
                | CONTINUE_KW
                | RETURN_KW
                | RAISE_KW
                | DEL_KW
                | GLOBAL_KW
                | NONLOCAL_KW
                | ASSERT_KW
                | IMPORT_KW
                | FROM_KW
        )
}

/// Human-readable token name for messages
pub fn describe(kind: SyntaxKind) -> &'static str {
    use SyntaxKind::*;
    match kind {
        NAME => "identifier",
        NUMBER => "number",
        STRING => "string",
        NEWLINE => "end of line",
        INDENT => "indent",
        DEDENT | ERROR_DEDENT => "dedent",
        ENDMARKER => "end of file",
        ERROR_TOKEN => "invalid token",
        L_PAREN => "'('",
        R_PAREN => "')'",
        L_BRACK => "'['",
        R_BRACK => "']'",
        L_BRACE => "'{'",
        R_BRACE => "'}'",
        COLON => "':'",
        COMMA => "','",
        SEMI => "';'",
        DOT => "'.'",
        EQ => "'='",
        ARROW => "'->'",
        AT => "'@'",
        IN_KW => "'in'",
        ELSE_KW => "'else'",
        IMPORT_KW => "'import'",
        k if k.is_keyword() => "keyword",
        k if k.is_punct() => "operator",
        _ => "token",
    }
}

/// Report an unexpected token and skip ahead to a recovery point
///
/// Skipped tokens are wrapped in an `ERROR_NODE`. Layout tokens and
/// statement-only keywords always stop the skip, as do the recovery
/// tokens of the current context.
pub fn error_recover<P: GrammarParser>(p: &mut P, code: ErrorCode) {
    let context = p.context();
    let found = describe(p.current_kind());
    let message = format!(
        "unexpected {} {}, expected {}",
        found,
        context.description(),
        context.expected_description()
    );
    p.error(code, message);

    if stops_recovery(p, context) {
        return;
    }
    p.start_node(SyntaxKind::ERROR_NODE);
    while !stops_recovery(p, context) {
        p.bump();
    }
    p.finish_node();
}

fn stops_recovery<P: GrammarParser>(p: &P, context: ParseContext) -> bool {
    let kind = p.current_kind();
    kind.is_layout() || breaks_bracket_run(kind) || context.is_recovery_token(kind)
}

/// Consume an invalid token into its own `ERROR_NODE`
pub fn bump_error_token<P: GrammarParser>(p: &mut P) {
    let code = if is_unterminated_string(p.current_text()) {
        ErrorCode::E0102
    } else {
        ErrorCode::E0101
    };
    p.error(code, code.default_message().to_string());
    p.start_node(SyntaxKind::ERROR_NODE);
    p.bump();
    p.finish_node();
}

fn is_unterminated_string(text: &str) -> bool {
    text.trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .starts_with(['"', '\''])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_starts() {
        assert!(can_start_expression(SyntaxKind::NAME));
        assert!(can_start_expression(SyntaxKind::LAMBDA_KW));
        assert!(!can_start_expression(SyntaxKind::R_PAREN));
        assert!(!can_start_expression(SyntaxKind::DEF_KW));
    }

    #[test]
    fn test_statement_starts() {
        assert!(can_start_statement(SyntaxKind::DEF_KW));
        assert!(can_start_statement(SyntaxKind::AT));
        assert!(can_start_statement(SyntaxKind::STRING));
        assert!(!can_start_statement(SyntaxKind::ELSE_KW));
        assert!(!can_start_statement(SyntaxKind::COLON));
    }

    #[test]
    fn test_unterminated_string_detection() {
        assert!(is_unterminated_string("'abc"));
        assert!(is_unterminated_string("rb\"x"));
        assert!(!is_unterminated_string("$"));
    }
}
