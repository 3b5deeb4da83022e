//! Module, block and simple statement parsing

use super::compound;
use super::expressions::{close_bracket, parse_exprlist, parse_test, parse_testlist_star_expr, parse_yield_expr};
use super::*;

/// Module = (NEWLINE | Statement)* ENDMARKER
pub fn parse_module<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::MODULE);
    p.push_context(ParseContext::TopLevel);
    parse_statements(p, false);
    p.pop_context();
    p.bump_eof();
    p.finish_node();
}

/// Statements up to the end of the enclosing block
///
/// In a block the loop stops at the block's `DEDENT`; at top level only
/// `ENDMARKER` ends it. Every statement start is a reuse point.
pub(super) fn parse_statements<P: GrammarParser>(p: &mut P, in_block: bool) {
    loop {
        let start = p.get_pos();
        match p.current_kind() {
            SyntaxKind::ENDMARKER => break,
            SyntaxKind::DEDENT if in_block => break,
            // Left behind by a broken statement
            SyntaxKind::NEWLINE => p.bump(),
            SyntaxKind::INDENT => parse_unexpected_indent(p),
            SyntaxKind::ERROR_DEDENT => {
                p.error(ErrorCode::E0205, ErrorCode::E0205.default_message().to_string());
                wrap_error_token(p);
            }
            SyntaxKind::DEDENT => {
                p.error(ErrorCode::E0901, "unexpected dedent".to_string());
                wrap_error_token(p);
            }
            _ => {
                if !p.try_reuse() {
                    parse_statement(p);
                }
            }
        }

        if p.get_pos() == start && !p.at(SyntaxKind::ENDMARKER) {
            p.error(ErrorCode::E0999, format!("parser stuck on {}", describe(p.current_kind())));
            wrap_error_token(p);
        }
    }
}

fn wrap_error_token<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::ERROR_NODE);
    p.bump();
    p.finish_node();
}

/// An indented run where no block may start, kept as one error node
fn parse_unexpected_indent<P: GrammarParser>(p: &mut P) {
    p.error(ErrorCode::E0204, ErrorCode::E0204.default_message().to_string());
    p.start_node(SyntaxKind::ERROR_NODE);
    p.bump(); // INDENT
    p.push_context(ParseContext::Block);
    parse_statements(p, true);
    p.pop_context();
    p.eat(SyntaxKind::DEDENT);
    p.finish_node();
}

/// Statement = CompoundStatement | SimpleStatement
pub fn parse_statement<P: GrammarParser>(p: &mut P) {
    match p.current_kind() {
        SyntaxKind::IF_KW => compound::parse_if(p),
        SyntaxKind::WHILE_KW => compound::parse_while(p),
        SyntaxKind::FOR_KW => compound::parse_for(p),
        SyntaxKind::TRY_KW => compound::parse_try(p),
        SyntaxKind::WITH_KW => compound::parse_with(p),
        SyntaxKind::DEF_KW => compound::parse_func_def(p),
        SyntaxKind::CLASS_KW => compound::parse_class_def(p),
        SyntaxKind::AT => compound::parse_decorated(p),
        SyntaxKind::ASYNC_KW => compound::parse_async(p),
        SyntaxKind::ERROR_TOKEN => bump_error_token(p),
        kind if can_start_statement(kind) => parse_simple_stmt(p),
        kind => {
            let message = format!("{} cannot start a statement", describe(kind));
            p.error(ErrorCode::E0302, message);
            p.start_node(SyntaxKind::ERROR_NODE);
            while !p.current_kind().is_layout() {
                p.bump();
            }
            p.eat(SyntaxKind::NEWLINE);
            p.finish_node();
        }
    }
}

/// Whether the current token may begin a one-line suite
pub(super) fn at_simple_stmt<P: GrammarParser>(p: &P) -> bool {
    let kind = p.current_kind();
    can_start_statement(kind)
        && !matches!(
            kind,
            SyntaxKind::IF_KW
                | SyntaxKind::WHILE_KW
                | SyntaxKind::FOR_KW
                | SyntaxKind::TRY_KW
                | SyntaxKind::WITH_KW
                | SyntaxKind::DEF_KW
                | SyntaxKind::CLASS_KW
                | SyntaxKind::AT
                | SyntaxKind::ASYNC_KW
        )
}

/// SimpleStatement = SmallStatement (';' SmallStatement)* [';'] NEWLINE
///
/// End of file or a dedent also ends the line. Anything else means the
/// statement ran on: what was parsed becomes an `ERROR_NODE` and parsing
/// resumes at the offending token.
pub(super) fn parse_simple_stmt<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    parse_small_stmt(p);
    while p.eat(SyntaxKind::SEMI) {
        if p.at_any(&[SyntaxKind::NEWLINE, SyntaxKind::ENDMARKER]) {
            break;
        }
        parse_small_stmt(p);
    }

    match p.current_kind() {
        SyntaxKind::NEWLINE => {
            p.bump();
            p.start_node_at(cp, SyntaxKind::SIMPLE_STMT);
            p.finish_node();
        }
        SyntaxKind::ENDMARKER | SyntaxKind::DEDENT | SyntaxKind::ERROR_DEDENT => {
            p.start_node_at(cp, SyntaxKind::SIMPLE_STMT);
            p.finish_node();
        }
        kind => {
            let message = format!("expected end of line, found {}", describe(kind));
            p.error(ErrorCode::E0206, message);
            p.start_node_at(cp, SyntaxKind::ERROR_NODE);
            p.finish_node();
            if !can_start_statement(kind) && !kind.is_layout() {
                wrap_error_token(p);
            }
        }
    }
}

fn parse_small_stmt<P: GrammarParser>(p: &mut P) {
    match p.current_kind() {
        SyntaxKind::PASS_KW => parse_keyword_stmt(p, SyntaxKind::PASS_STMT),
        SyntaxKind::BREAK_KW => parse_keyword_stmt(p, SyntaxKind::BREAK_STMT),
        SyntaxKind::CONTINUE_KW => parse_keyword_stmt(p, SyntaxKind::CONTINUE_STMT),
        SyntaxKind::RETURN_KW => {
            p.start_node(SyntaxKind::RETURN_STMT);
            p.bump();
            if can_start_expression(p.current_kind()) {
                parse_testlist_star_expr(p);
            }
            p.finish_node();
        }
        SyntaxKind::RAISE_KW => {
            p.start_node(SyntaxKind::RAISE_STMT);
            p.bump();
            if can_start_expression(p.current_kind()) {
                parse_test(p);
                if p.eat(SyntaxKind::FROM_KW) {
                    parse_test(p);
                }
            }
            p.finish_node();
        }
        SyntaxKind::DEL_KW => {
            p.start_node(SyntaxKind::DEL_STMT);
            p.bump();
            parse_exprlist(p);
            p.finish_node();
        }
        SyntaxKind::GLOBAL_KW => parse_name_list_stmt(p, SyntaxKind::GLOBAL_STMT),
        SyntaxKind::NONLOCAL_KW => parse_name_list_stmt(p, SyntaxKind::NONLOCAL_STMT),
        SyntaxKind::ASSERT_KW => {
            p.start_node(SyntaxKind::ASSERT_STMT);
            p.bump();
            parse_test(p);
            if p.eat(SyntaxKind::COMMA) {
                parse_test(p);
            }
            p.finish_node();
        }
        SyntaxKind::IMPORT_KW => parse_import_name(p),
        SyntaxKind::FROM_KW => parse_import_from(p),
        kind if can_start_expression(kind) => parse_expr_stmt(p),
        kind => {
            let message = format!("expected statement, found {}", describe(kind));
            p.error(ErrorCode::E0302, message);
        }
    }
}

fn parse_keyword_stmt<P: GrammarParser>(p: &mut P, kind: SyntaxKind) {
    p.start_node(kind);
    p.bump();
    p.finish_node();
}

fn parse_name_list_stmt<P: GrammarParser>(p: &mut P, kind: SyntaxKind) {
    p.start_node(kind);
    p.bump();
    p.expect(SyntaxKind::NAME);
    while p.eat(SyntaxKind::COMMA) {
        p.expect(SyntaxKind::NAME);
    }
    p.finish_node();
}

/// Expression, assignment, augmented or annotated assignment
fn parse_expr_stmt<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    parse_rhs(p);

    let kind = match p.current_kind() {
        kind if kind.is_aug_assign() => {
            p.bump();
            parse_rhs(p);
            SyntaxKind::AUG_ASSIGN_STMT
        }
        SyntaxKind::COLON => {
            p.bump();
            parse_test(p);
            if p.eat(SyntaxKind::EQ) {
                parse_rhs(p);
            }
            SyntaxKind::ANN_ASSIGN_STMT
        }
        SyntaxKind::EQ => {
            while p.eat(SyntaxKind::EQ) {
                parse_rhs(p);
            }
            SyntaxKind::ASSIGN_STMT
        }
        _ => SyntaxKind::EXPR_STMT,
    };
    p.start_node_at(cp, kind);
    p.finish_node();
}

fn parse_rhs<P: GrammarParser>(p: &mut P) {
    if p.at(SyntaxKind::YIELD_KW) {
        parse_yield_expr(p);
    } else if can_start_expression(p.current_kind()) {
        parse_testlist_star_expr(p);
    } else {
        let message = format!("expected expression, found {}", describe(p.current_kind()));
        p.error(ErrorCode::E0401, message);
    }
}

/// import_name = 'import' dotted_as_name (',' dotted_as_name)*
fn parse_import_name<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::IMPORT_NAME);
    p.bump(); // import
    p.push_context(ParseContext::Import);
    loop {
        p.start_node(SyntaxKind::IMPORT_ALIAS);
        parse_dotted_name(p);
        if p.eat(SyntaxKind::AS_KW) {
            p.expect(SyntaxKind::NAME);
        }
        p.finish_node();
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.pop_context();
    p.finish_node();
}

/// import_from = 'from' ('.' | '...')* [dotted_name] 'import' ('*' | '(' names ')' | names)
fn parse_import_from<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::IMPORT_FROM);
    p.bump(); // from
    p.push_context(ParseContext::Import);

    let mut has_module = false;
    while p.at_any(&[SyntaxKind::DOT, SyntaxKind::ELLIPSIS]) {
        p.bump();
        has_module = true;
    }
    if p.at(SyntaxKind::NAME) {
        parse_dotted_name(p);
        has_module = true;
    }
    if !has_module {
        p.error(ErrorCode::E0306, "expected module name after 'from'".to_string());
    }

    if p.expect(SyntaxKind::IMPORT_KW) {
        if p.eat(SyntaxKind::L_PAREN) {
            parse_import_as_names(p);
            close_bracket(p, SyntaxKind::R_PAREN);
        } else if !p.eat(SyntaxKind::STAR) {
            parse_import_as_names(p);
        }
    }

    p.pop_context();
    p.finish_node();
}

fn parse_import_as_names<P: GrammarParser>(p: &mut P) {
    loop {
        if !p.at(SyntaxKind::NAME) {
            let message = format!("expected imported name, found {}", describe(p.current_kind()));
            p.error(ErrorCode::E0306, message);
            break;
        }
        p.start_node(SyntaxKind::IMPORT_ALIAS);
        p.bump();
        if p.eat(SyntaxKind::AS_KW) {
            p.expect(SyntaxKind::NAME);
        }
        p.finish_node();
        if !p.eat(SyntaxKind::COMMA) || !p.at(SyntaxKind::NAME) {
            break;
        }
    }
}

fn parse_dotted_name<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::DOTTED_NAME);
    p.expect(SyntaxKind::NAME);
    while p.at(SyntaxKind::DOT) && p.peek_kind(1) == SyntaxKind::NAME {
        p.bump();
        p.bump();
    }
    p.finish_node();
}
