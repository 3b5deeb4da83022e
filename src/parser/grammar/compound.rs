//! Compound statements: control flow, definitions and decorators
//!
//! A suite is either an indented block (`SUITE` node holding `NEWLINE`,
//! `INDENT`, statements and `DEDENT`) or a single simple statement on the
//! header line, which is attached without a `SUITE` wrapper.

use super::expressions::{close_bracket, parse_arg_list, parse_expr, parse_expression, parse_exprlist, parse_test, parse_testlist};
use super::statements::{at_simple_stmt, parse_simple_stmt, parse_statements};
use super::*;

/// Suite = SimpleStatement | NEWLINE INDENT Statement+ DEDENT
pub(super) fn parse_suite<P: GrammarParser>(p: &mut P) {
    if p.at(SyntaxKind::NEWLINE) {
        p.start_node(SyntaxKind::SUITE);
        p.bump();
        if p.eat(SyntaxKind::INDENT) {
            p.push_context(ParseContext::Block);
            parse_statements(p, true);
            p.pop_context();
            p.eat(SyntaxKind::DEDENT);
        } else {
            let message = format!("expected an indented block, found {}", describe(p.current_kind()));
            p.error(ErrorCode::E0203, message);
        }
        p.finish_node();
    } else if at_simple_stmt(p) {
        parse_simple_stmt(p);
    } else {
        let message = format!("expected an indented block, found {}", describe(p.current_kind()));
        p.error(ErrorCode::E0203, message);
    }
}

/// `:` ending a header, skipping junk before it on the same line
fn expect_colon<P: GrammarParser>(p: &mut P) {
    if p.eat(SyntaxKind::COLON) {
        return;
    }
    if p.current_kind().is_layout() {
        p.expect(SyntaxKind::COLON);
        return;
    }
    error_recover(p, ErrorCode::E0303);
    p.eat(SyntaxKind::COLON);
}

/// `else` `:` suite, when present
fn parse_else_clause<P: GrammarParser>(p: &mut P) {
    if p.eat(SyntaxKind::ELSE_KW) {
        expect_colon(p);
        parse_suite(p);
    }
}

/// Condition followed by `:` in a header
fn parse_condition_header<P: GrammarParser>(p: &mut P) {
    p.push_context(ParseContext::CompoundHeader);
    parse_expression(p);
    expect_colon(p);
    p.pop_context();
}

/// if_stmt = 'if' test ':' suite ('elif' test ':' suite)* ['else' ':' suite]
pub(super) fn parse_if<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::IF_STMT);
    p.bump(); // if
    parse_condition_header(p);
    parse_suite(p);
    while p.eat(SyntaxKind::ELIF_KW) {
        parse_condition_header(p);
        parse_suite(p);
    }
    parse_else_clause(p);
    p.finish_node();
}

/// while_stmt = 'while' test ':' suite ['else' ':' suite]
pub(super) fn parse_while<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::WHILE_STMT);
    p.bump(); // while
    parse_condition_header(p);
    parse_suite(p);
    parse_else_clause(p);
    p.finish_node();
}

/// for_stmt = 'for' exprlist 'in' testlist ':' suite ['else' ':' suite]
pub(super) fn parse_for<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::FOR_STMT);
    p.bump(); // for
    p.push_context(ParseContext::CompoundHeader);
    parse_exprlist(p);
    if p.expect(SyntaxKind::IN_KW) {
        parse_testlist(p);
    }
    expect_colon(p);
    p.pop_context();
    parse_suite(p);
    parse_else_clause(p);
    p.finish_node();
}

/// try_stmt = 'try' ':' suite (except_clause ':' suite)* ['else' ':' suite] ['finally' ':' suite]
pub(super) fn parse_try<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::TRY_STMT);
    p.bump(); // try
    expect_colon(p);
    parse_suite(p);

    let mut handlers = 0;
    while p.at(SyntaxKind::EXCEPT_KW) {
        p.start_node(SyntaxKind::EXCEPT_CLAUSE);
        p.bump();
        if can_start_expression(p.current_kind()) {
            parse_test(p);
            if p.eat(SyntaxKind::AS_KW) {
                p.expect(SyntaxKind::NAME);
            }
        }
        p.finish_node();
        expect_colon(p);
        parse_suite(p);
        handlers += 1;
    }
    if handlers > 0 {
        parse_else_clause(p);
    }

    let has_finally = p.eat(SyntaxKind::FINALLY_KW);
    if has_finally {
        expect_colon(p);
        parse_suite(p);
    }
    if handlers == 0 && !has_finally {
        p.error(ErrorCode::E0304, ErrorCode::E0304.default_message().to_string());
    }
    p.finish_node();
}

/// with_stmt = 'with' with_item (',' with_item)* ':' suite
pub(super) fn parse_with<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::WITH_STMT);
    p.bump(); // with
    p.push_context(ParseContext::CompoundHeader);
    loop {
        p.start_node(SyntaxKind::WITH_ITEM);
        parse_test(p);
        if p.eat(SyntaxKind::AS_KW) {
            parse_expr(p);
        }
        p.finish_node();
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    expect_colon(p);
    p.pop_context();
    parse_suite(p);
    p.finish_node();
}

/// funcdef = 'def' NAME parameters ['->' test] ':' suite
pub(super) fn parse_func_def<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::FUNC_DEF);
    p.bump(); // def
    p.push_context(ParseContext::FunctionHeader);
    p.expect(SyntaxKind::NAME);
    if p.at(SyntaxKind::L_PAREN) {
        parse_parameters(p);
    } else {
        p.expect(SyntaxKind::L_PAREN);
    }
    if p.eat(SyntaxKind::ARROW) {
        parse_test(p);
    }
    expect_colon(p);
    p.pop_context();
    parse_suite(p);
    p.finish_node();
}

/// classdef = 'class' NAME ['(' [arglist] ')'] ':' suite
pub(super) fn parse_class_def<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::CLASS_DEF);
    p.bump(); // class
    p.push_context(ParseContext::ClassHeader);
    p.expect(SyntaxKind::NAME);
    if p.eat(SyntaxKind::L_PAREN) {
        p.push_context(ParseContext::ArgumentList);
        if !p.at(SyntaxKind::R_PAREN) {
            parse_arg_list(p);
        }
        p.pop_context();
        close_bracket(p, SyntaxKind::R_PAREN);
    }
    expect_colon(p);
    p.pop_context();
    parse_suite(p);
    p.finish_node();
}

/// decorated = decorator+ (classdef | funcdef | async funcdef)
pub(super) fn parse_decorated<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::DECORATED);
    while p.at(SyntaxKind::AT) {
        parse_decorator(p);
    }
    match p.current_kind() {
        SyntaxKind::DEF_KW => parse_func_def(p),
        SyntaxKind::CLASS_KW => parse_class_def(p),
        SyntaxKind::ASYNC_KW if p.peek_kind(1) == SyntaxKind::DEF_KW => parse_async(p),
        kind => {
            let message = format!(
                "{}, found {}",
                ErrorCode::E0305.default_message(),
                describe(kind)
            );
            p.error(ErrorCode::E0305, message);
        }
    }
    p.finish_node();
}

/// decorator = '@' namedexpr_test NEWLINE
fn parse_decorator<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::DECORATOR);
    p.bump(); // @
    p.push_context(ParseContext::Decorator);
    if can_start_expression(p.current_kind()) {
        parse_expression(p);
    } else {
        error_recover(p, ErrorCode::E0401);
    }
    p.pop_context();
    p.expect(SyntaxKind::NEWLINE);
    p.finish_node();
}

/// async_stmt = 'async' (funcdef | with_stmt | for_stmt)
pub(super) fn parse_async<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::ASYNC_STMT);
    p.bump(); // async
    match p.current_kind() {
        SyntaxKind::DEF_KW => parse_func_def(p),
        SyntaxKind::WITH_KW => parse_with(p),
        SyntaxKind::FOR_KW => parse_for(p),
        kind => {
            let message = format!("expected 'def', 'with' or 'for' after 'async', found {}", describe(kind));
            p.error(ErrorCode::E0902, message);
        }
    }
    p.finish_node();
}

/// parameters = '(' [param (',' param)*] ')'
fn parse_parameters<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::PARAMETERS);
    p.bump(); // (
    p.push_context(ParseContext::ParameterList);
    parse_param_list(p, SyntaxKind::R_PAREN, true);
    p.pop_context();
    close_bracket(p, SyntaxKind::R_PAREN);
    p.finish_node();
}

/// Parameters up to `stop`; lambdas pass `COLON` and no annotations
pub(super) fn parse_param_list<P: GrammarParser>(p: &mut P, stop: SyntaxKind, annotations: bool) {
    loop {
        let start = p.get_pos();
        if p.at(stop) || p.current_kind().is_layout() {
            break;
        }
        if p.at_any(&[SyntaxKind::NAME, SyntaxKind::STAR, SyntaxKind::STAR_STAR, SyntaxKind::SLASH]) {
            parse_param(p, stop, annotations);
        } else {
            error_recover(p, ErrorCode::E0404);
            p.eat(SyntaxKind::COMMA);
        }
        if p.get_pos() == start {
            break;
        }
    }
}

/// param = ('*' [NAME] | '**' NAME | '/' | NAME) [':' test] ['=' test] [',']
fn parse_param<P: GrammarParser>(p: &mut P, stop: SyntaxKind, annotations: bool) {
    p.start_node(SyntaxKind::PARAM);
    match p.current_kind() {
        SyntaxKind::SLASH => p.bump(),
        SyntaxKind::STAR => {
            p.bump();
            if p.at(SyntaxKind::NAME) {
                p.bump();
                parse_annotation(p, annotations);
            }
        }
        SyntaxKind::STAR_STAR => {
            p.bump();
            p.expect(SyntaxKind::NAME);
            parse_annotation(p, annotations);
        }
        _ => {
            p.bump(); // name
            parse_annotation(p, annotations);
            if p.eat(SyntaxKind::EQ) {
                parse_test(p);
            }
        }
    }
    if !p.at(stop) {
        p.expect(SyntaxKind::COMMA);
    }
    p.finish_node();
}

fn parse_annotation<P: GrammarParser>(p: &mut P, annotations: bool) {
    if annotations && p.eat(SyntaxKind::COLON) {
        parse_test(p);
    }
}
