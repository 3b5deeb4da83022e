//! Expression parsing
//!
//! Implements the precedence chain:
//!
//! ```text
//! namedexpr_test → test (ternary, lambda) → or_test → and_test → not_test
//!     → comparison → bitwise or → xor → and → shift → arith → term
//!     → factor (unary) → power → await → primary (call, subscript, attribute)
//!     → atom
//! ```
//!
//! Nodes are only created when an operator is present, so a bare name
//! stays a single `NAME` token.

use super::compound::parse_param_list;
use super::*;

/// Binary operator levels, loosest first
const BINARY_LEVELS: &[&[SyntaxKind]] = &[
    &[SyntaxKind::PIPE],
    &[SyntaxKind::CARET],
    &[SyntaxKind::AMP],
    &[SyntaxKind::SHL, SyntaxKind::SHR],
    &[SyntaxKind::PLUS, SyntaxKind::MINUS],
    &[
        SyntaxKind::STAR,
        SyntaxKind::SLASH,
        SyntaxKind::SLASH_SLASH,
        SyntaxKind::PERCENT,
        SyntaxKind::AT,
    ],
];

const COMPARISON_OPERATORS: &[SyntaxKind] = &[
    SyntaxKind::LT,
    SyntaxKind::GT,
    SyntaxKind::EQ_EQ,
    SyntaxKind::GT_EQ,
    SyntaxKind::LT_EQ,
    SyntaxKind::NOT_EQ,
    SyntaxKind::IN_KW,
    SyntaxKind::IS_KW,
];

/// Entry point for a full expression: `namedexpr_test`
pub fn parse_expression<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    parse_test(p);
    if p.at(SyntaxKind::COLON_EQ) {
        p.bump();
        parse_test(p);
        p.start_node_at(cp, SyntaxKind::NAMED_EXPR);
        p.finish_node();
    }
}

/// test = or_test ['if' or_test 'else' test] | lambda
pub fn parse_test<P: GrammarParser>(p: &mut P) {
    if p.at(SyntaxKind::LAMBDA_KW) {
        parse_lambda(p, false);
        return;
    }

    let cp = p.checkpoint();
    parse_or_test(p);
    if p.at(SyntaxKind::IF_KW) {
        p.bump();
        parse_or_test(p);
        if p.expect(SyntaxKind::ELSE_KW) {
            parse_test(p);
        }
        p.start_node_at(cp, SyntaxKind::TERNARY_EXPR);
        p.finish_node();
    }
}

/// test_nocond = or_test | lambda_nocond (comprehension conditions)
fn parse_test_nocond<P: GrammarParser>(p: &mut P) {
    if p.at(SyntaxKind::LAMBDA_KW) {
        parse_lambda(p, true);
    } else {
        parse_or_test(p);
    }
}

fn parse_lambda<P: GrammarParser>(p: &mut P, nocond: bool) {
    p.start_node(SyntaxKind::LAMBDA_EXPR);
    p.bump(); // lambda
    if !p.at(SyntaxKind::COLON) {
        p.start_node(SyntaxKind::PARAMETERS);
        parse_param_list(p, SyntaxKind::COLON, false);
        p.finish_node();
    }
    p.expect(SyntaxKind::COLON);
    if nocond {
        parse_test_nocond(p);
    } else {
        parse_test(p);
    }
    p.finish_node();
}

fn parse_bool_chain<P: GrammarParser>(p: &mut P, op: SyntaxKind, operand: fn(&mut P)) {
    let cp = p.checkpoint();
    operand(p);
    if !p.at(op) {
        return;
    }
    while p.eat(op) {
        parse_operand(p, operand);
    }
    p.start_node_at(cp, SyntaxKind::BOOL_OP);
    p.finish_node();
}

/// or_test = and_test ('or' and_test)*
pub fn parse_or_test<P: GrammarParser>(p: &mut P) {
    parse_bool_chain(p, SyntaxKind::OR_KW, parse_and_test);
}

fn parse_and_test<P: GrammarParser>(p: &mut P) {
    parse_bool_chain(p, SyntaxKind::AND_KW, parse_not_test);
}

fn parse_not_test<P: GrammarParser>(p: &mut P) {
    if p.at(SyntaxKind::NOT_KW) {
        p.start_node(SyntaxKind::NOT_EXPR);
        p.bump();
        parse_operand(p, parse_not_test);
        p.finish_node();
    } else {
        parse_comparison(p);
    }
}

/// comparison = expr (comp_op expr)*, kept flat like `a < b < c`
fn parse_comparison<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    parse_expr(p);
    let mut chained = false;
    loop {
        if p.at(SyntaxKind::NOT_KW) && p.peek_kind(1) == SyntaxKind::IN_KW {
            p.bump();
            p.bump();
        } else if p.at(SyntaxKind::IS_KW) {
            p.bump();
            p.eat(SyntaxKind::NOT_KW);
        } else if p.at_any(COMPARISON_OPERATORS) {
            p.bump();
        } else {
            break;
        }
        parse_operand(p, parse_expr);
        chained = true;
    }
    if chained {
        p.start_node_at(cp, SyntaxKind::COMPARISON);
        p.finish_node();
    }
}

/// Bitwise-or level expression (`expr` in the grammar)
pub fn parse_expr<P: GrammarParser>(p: &mut P) {
    parse_binary(p, 0);
}

fn parse_binary<P: GrammarParser>(p: &mut P, level: usize) {
    let Some(operators) = BINARY_LEVELS.get(level) else {
        parse_factor(p);
        return;
    };

    let cp = p.checkpoint();
    parse_binary(p, level + 1);
    while p.at_any(operators) {
        p.bump();
        if can_start_expression(p.current_kind()) {
            parse_binary(p, level + 1);
        } else {
            missing_operand(p);
        }
        p.start_node_at(cp, SyntaxKind::BIN_OP);
        p.finish_node();
    }
}

/// Right operand of an operator, reporting a missing one
fn parse_operand<P: GrammarParser>(p: &mut P, operand: fn(&mut P)) {
    if can_start_expression(p.current_kind()) {
        operand(p);
    } else {
        missing_operand(p);
    }
}

fn missing_operand<P: GrammarParser>(p: &mut P) {
    let message = format!("missing operand, found {}", describe(p.current_kind()));
    p.error(ErrorCode::E0402, message);
}

fn parse_factor<P: GrammarParser>(p: &mut P) {
    if p.at_any(&[SyntaxKind::PLUS, SyntaxKind::MINUS, SyntaxKind::TILDE]) {
        p.start_node(SyntaxKind::UNARY_OP);
        p.bump();
        parse_operand(p, parse_factor);
        p.finish_node();
    } else {
        parse_power(p);
    }
}

/// power = await_primary ['**' factor]
fn parse_power<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    if p.at(SyntaxKind::AWAIT_KW) {
        p.start_node(SyntaxKind::AWAIT_EXPR);
        p.bump();
        parse_primary(p);
        p.finish_node();
    } else {
        parse_primary(p);
    }
    if p.at(SyntaxKind::STAR_STAR) {
        p.bump();
        parse_operand(p, parse_factor);
        p.start_node_at(cp, SyntaxKind::POWER_EXPR);
        p.finish_node();
    }
}

/// primary = atom trailer*
fn parse_primary<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    let start = p.get_pos();
    parse_atom(p);
    if p.get_pos() == start {
        return;
    }

    loop {
        match p.current_kind() {
            SyntaxKind::L_PAREN => {
                p.start_node_at(cp, SyntaxKind::CALL);
                parse_call_arguments(p);
                p.finish_node();
            }
            SyntaxKind::L_BRACK => {
                p.start_node_at(cp, SyntaxKind::SUBSCRIPT);
                p.bump();
                p.push_context(ParseContext::Subscript);
                parse_subscript_list(p);
                p.pop_context();
                close_bracket(p, SyntaxKind::R_BRACK);
                p.finish_node();
            }
            SyntaxKind::DOT => {
                p.start_node_at(cp, SyntaxKind::ATTRIBUTE);
                p.bump();
                p.expect(SyntaxKind::NAME);
                p.finish_node();
            }
            _ => break,
        }
    }
}

fn parse_atom<P: GrammarParser>(p: &mut P) {
    match p.current_kind() {
        SyntaxKind::NAME
        | SyntaxKind::NUMBER
        | SyntaxKind::NONE_KW
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::ELLIPSIS => p.bump(),
        SyntaxKind::STRING => {
            if p.peek_kind(1) == SyntaxKind::STRING {
                p.start_node(SyntaxKind::STRING_CONCAT);
                while p.at(SyntaxKind::STRING) {
                    p.bump();
                }
                p.finish_node();
            } else {
                p.bump();
            }
        }
        SyntaxKind::L_PAREN => parse_paren(p),
        SyntaxKind::L_BRACK => parse_list(p),
        SyntaxKind::L_BRACE => parse_brace(p),
        SyntaxKind::ERROR_TOKEN => bump_error_token(p),
        kind => {
            let message = format!("expected expression, found {}", describe(kind));
            p.error(ErrorCode::E0401, message);
        }
    }
}

fn parse_paren<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::PAREN_EXPR);
    p.bump(); // (
    p.push_context(ParseContext::Collection);
    if p.at(SyntaxKind::YIELD_KW) {
        parse_yield_expr(p);
    } else if !p.at(SyntaxKind::R_PAREN) {
        parse_testlist_comp(p);
    }
    p.pop_context();
    close_bracket(p, SyntaxKind::R_PAREN);
    p.finish_node();
}

fn parse_list<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::LIST_EXPR);
    p.bump(); // [
    p.push_context(ParseContext::Collection);
    if !p.at(SyntaxKind::R_BRACK) {
        parse_testlist_comp(p);
    }
    p.pop_context();
    close_bracket(p, SyntaxKind::R_BRACK);
    p.finish_node();
}

/// Dict or set display; empty braces are a dict
fn parse_brace<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    p.bump(); // {
    p.push_context(ParseContext::Collection);

    let mut is_dict = true;
    if !p.at(SyntaxKind::R_BRACE) {
        let first = p.checkpoint();
        is_dict = parse_brace_item(p);
        if at_comp_for(p) {
            parse_comp_clauses(p);
            p.start_node_at(first, SyntaxKind::COMPREHENSION);
            p.finish_node();
        } else {
            while p.eat(SyntaxKind::COMMA) {
                if p.at(SyntaxKind::R_BRACE) || !can_start_brace_item(p.current_kind()) {
                    break;
                }
                parse_brace_item(p);
            }
        }
    }

    p.pop_context();
    close_bracket(p, SyntaxKind::R_BRACE);
    let kind = if is_dict { SyntaxKind::DICT_EXPR } else { SyntaxKind::SET_EXPR };
    p.start_node_at(cp, kind);
    p.finish_node();
}

fn can_start_brace_item(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::STAR_STAR || can_start_expression(kind)
}

/// One dict entry or set element; returns whether it was a dict entry
fn parse_brace_item<P: GrammarParser>(p: &mut P) -> bool {
    if p.at(SyntaxKind::STAR_STAR) {
        p.start_node(SyntaxKind::DICT_ENTRY);
        p.bump();
        parse_operand(p, parse_expr);
        p.finish_node();
        return true;
    }

    let cp = p.checkpoint();
    parse_test_or_star(p);
    if p.at(SyntaxKind::COLON) {
        p.bump();
        parse_operand(p, parse_test);
        p.start_node_at(cp, SyntaxKind::DICT_ENTRY);
        p.finish_node();
        return true;
    }
    false
}

/// Elements of a paren or list display, with an optional comprehension
fn parse_testlist_comp<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    parse_named_or_star(p);
    if at_comp_for(p) {
        parse_comp_clauses(p);
        p.start_node_at(cp, SyntaxKind::COMPREHENSION);
        p.finish_node();
        return;
    }
    if p.at(SyntaxKind::COMMA) {
        while p.eat(SyntaxKind::COMMA) {
            if !can_start_expression(p.current_kind()) {
                break;
            }
            parse_named_or_star(p);
        }
        p.start_node_at(cp, SyntaxKind::TESTLIST);
        p.finish_node();
    }
}

fn parse_named_or_star<P: GrammarParser>(p: &mut P) {
    if p.at(SyntaxKind::STAR) {
        parse_star_expr(p);
    } else {
        parse_expression(p);
    }
}

fn parse_test_or_star<P: GrammarParser>(p: &mut P) {
    if p.at(SyntaxKind::STAR) {
        parse_star_expr(p);
    } else {
        parse_test(p);
    }
}

fn parse_star_expr<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::STAR_EXPR);
    p.bump(); // *
    parse_operand(p, parse_expr);
    p.finish_node();
}

fn at_comp_for<P: GrammarParser>(p: &mut P) -> bool {
    p.at(SyntaxKind::FOR_KW) || (p.at(SyntaxKind::ASYNC_KW) && p.peek_kind(1) == SyntaxKind::FOR_KW)
}

/// `for`/`if` clauses of a comprehension, as siblings
fn parse_comp_clauses<P: GrammarParser>(p: &mut P) {
    loop {
        if at_comp_for(p) {
            p.start_node(SyntaxKind::COMP_FOR);
            p.eat(SyntaxKind::ASYNC_KW);
            p.bump(); // for
            parse_exprlist(p);
            p.expect(SyntaxKind::IN_KW);
            parse_operand(p, parse_or_test);
            p.finish_node();
        } else if p.at(SyntaxKind::IF_KW) {
            p.start_node(SyntaxKind::COMP_IF);
            p.bump();
            parse_operand(p, parse_test_nocond);
            p.finish_node();
        } else {
            break;
        }
    }
}

/// `(` args `)` of a call, the callee already parsed
fn parse_call_arguments<P: GrammarParser>(p: &mut P) {
    p.bump(); // (
    p.push_context(ParseContext::ArgumentList);
    if !p.at(SyntaxKind::R_PAREN) {
        parse_arg_list(p);
    }
    p.pop_context();
    close_bracket(p, SyntaxKind::R_PAREN);
}

/// arglist = argument (',' argument)* [','], used by calls and class bases
pub fn parse_arg_list<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::ARG_LIST);
    loop {
        let start = p.get_pos();
        if p.at(SyntaxKind::R_PAREN) {
            break;
        }
        if can_start_argument(p.current_kind()) {
            parse_argument(p);
        }
        if p.eat(SyntaxKind::COMMA) {
            continue;
        }
        if p.at(SyntaxKind::R_PAREN) {
            break;
        }
        error_recover(p, ErrorCode::E0403);
        if p.get_pos() == start || !p.at(SyntaxKind::COMMA) {
            break;
        }
    }
    p.finish_node();
}

fn can_start_argument(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::STAR_STAR || can_start_expression(kind)
}

fn parse_argument<P: GrammarParser>(p: &mut P) {
    if p.at_any(&[SyntaxKind::STAR, SyntaxKind::STAR_STAR]) {
        p.start_node(SyntaxKind::ARGUMENT);
        p.bump();
        parse_operand(p, parse_test);
        p.finish_node();
        return;
    }

    let cp = p.checkpoint();
    parse_test(p);
    match p.current_kind() {
        SyntaxKind::EQ => {
            p.bump();
            parse_operand(p, parse_test);
            p.start_node_at(cp, SyntaxKind::ARGUMENT);
            p.finish_node();
        }
        SyntaxKind::COLON_EQ => {
            p.bump();
            parse_operand(p, parse_test);
            p.start_node_at(cp, SyntaxKind::NAMED_EXPR);
            p.finish_node();
        }
        _ if at_comp_for(p) => {
            parse_comp_clauses(p);
            p.start_node_at(cp, SyntaxKind::COMPREHENSION);
            p.finish_node();
        }
        _ => {}
    }
}

fn parse_subscript_list<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    parse_subscript(p);
    if p.at(SyntaxKind::COMMA) {
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_BRACK) {
                break;
            }
            parse_subscript(p);
        }
        p.start_node_at(cp, SyntaxKind::SUBSCRIPT_LIST);
        p.finish_node();
    }
}

/// subscript = test | [test] ':' [test] [':' [test]]
fn parse_subscript<P: GrammarParser>(p: &mut P) {
    let cp = p.checkpoint();
    if !p.at(SyntaxKind::COLON) {
        if !can_start_expression(p.current_kind()) {
            let message = format!("expected index or slice, found {}", describe(p.current_kind()));
            p.error(ErrorCode::E0401, message);
            return;
        }
        parse_test_or_star(p);
    }
    if !p.at(SyntaxKind::COLON) {
        return;
    }
    p.bump();
    if can_start_expression(p.current_kind()) {
        parse_test(p);
    }
    if p.eat(SyntaxKind::COLON) && can_start_expression(p.current_kind()) {
        parse_test(p);
    }
    p.start_node_at(cp, SyntaxKind::SLICE);
    p.finish_node();
}

/// yield_expr = 'yield' ['from' test | testlist_star_expr]
pub fn parse_yield_expr<P: GrammarParser>(p: &mut P) {
    p.start_node(SyntaxKind::YIELD_EXPR);
    p.bump(); // yield
    if p.eat(SyntaxKind::FROM_KW) {
        parse_operand(p, parse_test);
    } else if can_start_expression(p.current_kind()) {
        parse_testlist_star_expr(p);
    }
    p.finish_node();
}

fn parse_comma_list<P: GrammarParser>(p: &mut P, item: fn(&mut P)) {
    let cp = p.checkpoint();
    item(p);
    if !p.at(SyntaxKind::COMMA) {
        return;
    }
    while p.eat(SyntaxKind::COMMA) {
        if !can_start_expression(p.current_kind()) {
            break;
        }
        item(p);
    }
    p.start_node_at(cp, SyntaxKind::TESTLIST);
    p.finish_node();
}

/// testlist = test (',' test)* [',']
pub fn parse_testlist<P: GrammarParser>(p: &mut P) {
    parse_comma_list(p, parse_test);
}

/// testlist_star_expr = (test | star_expr) (',' (test | star_expr))* [',']
pub fn parse_testlist_star_expr<P: GrammarParser>(p: &mut P) {
    parse_comma_list(p, parse_test_or_star);
}

fn parse_expr_or_star<P: GrammarParser>(p: &mut P) {
    if p.at(SyntaxKind::STAR) {
        parse_star_expr(p);
    } else {
        parse_expr(p);
    }
}

/// exprlist = (expr | star_expr) (',' (expr | star_expr))* [',']
///
/// Used for `for` targets, so it stops before `in`.
pub fn parse_exprlist<P: GrammarParser>(p: &mut P) {
    parse_comma_list(p, parse_expr_or_star);
}

/// Consume `closer`, skipping junk before it when the line continues
pub fn close_bracket<P: GrammarParser>(p: &mut P, closer: SyntaxKind) {
    if p.eat(closer) {
        return;
    }
    let kind = p.current_kind();
    if !kind.is_layout() && !breaks_bracket_run(kind) && !kind.is_close_bracket() {
        error_recover(p, ErrorCode::E0401);
        if p.eat(closer) {
            return;
        }
    }
    p.expect(closer);
}
