//! Incremental Update Tests
//!
//! Every update must produce exactly the tree and errors a fresh parse of
//! the new text gives. The statistics then show how much of the old
//! session was reused along the way.

#![allow(clippy::unwrap_used)]

use arbor::parser::parse_text;
use arbor::{DiffParser, Error, Module, ParseOptions, Session, SyntaxKind, parse, update};
use indoc::indoc;
use rstest::rstest;

/// Check an updated session against a fresh parse of the same text
fn assert_fresh(module: &Module, session: &Session, text: &str) {
    let fresh = parse_text(text, session.options());
    assert_eq!(session.text(), text);
    assert_eq!(module.serialize(), text, "round trip failed for {text:?}");
    assert_eq!(session.green(), &fresh.green, "tree differs from a fresh parse of {text:?}");
    assert_eq!(session.errors(), fresh.errors.as_slice(), "errors differ for {text:?}");
}

fn check_update(old: &str, new: &str) -> Session {
    let (_, session) = parse(old);
    let (module, session) = update(session, new).unwrap();
    assert_fresh(&module, &session, new);
    session
}

fn numbered_functions(count: usize, changed: Option<usize>) -> String {
    (0..count)
        .map(|n| {
            let value = if Some(n) == changed { n * 10 } else { n };
            format!("def f{n}():\n    return {value}\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const BASE: &str = indoc! {"
    import os

    def f():
        return 1

    class A:
        def g(self):
            return 2

        def h(self):
            return 3

    x = f()
"};

// ============================================================================
// Equivalence with a fresh parse
// ============================================================================

#[rstest]
#[case::insert_in_body(BASE, &BASE.replace("    return 1\n", "    y = 1\n    return y\n"))]
#[case::delete_function(BASE, &BASE.replace("def f():\n    return 1\n\n", ""))]
#[case::reindent_body(BASE, &BASE.replace("    return 1\n", "  return 1\n"))]
#[case::break_string(BASE, &BASE.replace("import os", "x = 'os"))]
#[case::open_triple_quote(BASE, &BASE.replace("import os", "x = \"\"\""))]
#[case::close_triple_quote(&BASE.replace("import os", "x = \"\"\""), BASE)]
#[case::open_bracket(BASE, &BASE.replace("x = f()", "x = f(").replace("import os", "import (os"))]
#[case::open_bracket_before_def(BASE, &BASE.replace("import os", "y = [1,"))]
#[case::close_bracket(&BASE.replace("import os", "y = [1,"), BASE)]
#[case::add_decorator(BASE, &BASE.replace("class A:", "@dataclass\nclass A:"))]
#[case::add_method_decorator(BASE, &BASE.replace("    def h", "    @property\n    def h"))]
#[case::insert_method(BASE, &BASE.replace("    def h", "    def k(self):\n        pass\n\n    def h"))]
#[case::wrong_method_indentation(BASE, &BASE.replace("            return 2", "             return 2"))]
#[case::dedent_method(BASE, &BASE.replace("    def h(self):\n        return 3", "def h(self):\n    return 3"))]
#[case::continuation_line(BASE, &BASE.replace("x = f()", "x = \\\n    f()"))]
#[case::trailing_backslash(BASE, &BASE.replace("import os", "import os \\"))]
#[case::remove_final_newline(BASE, BASE.trim_end())]
#[case::add_final_newline(BASE.trim_end(), BASE)]
#[case::to_empty(BASE, "")]
#[case::from_empty("", BASE)]
#[case::only_comments(BASE, "# one\n\n# two\n")]
#[case::crlf(BASE, &BASE.replace('\n', "\r\n"))]
#[case::lone_cr(BASE, &BASE.replace('\n', "\r"))]
#[case::tabs(BASE, &BASE.replace("    ", "\t"))]
#[case::bom(BASE, &format!("\u{feff}{BASE}"))]
#[case::else_after_if("if a:\n    b\ndef f():\n    pass\n", "if a:\n    b\nelse:\n    c\ndef f():\n    pass\n")]
#[case::try_without_handler("x = 1\ndef f():\n    pass\n", "try:\n    x = 1\ndef f():\n    pass\n")]
#[case::decorator_gains_definition(
    "import os\n@decorator\n# comment\nif x:\ndef f(a, b=1):\n",
    "import os\n@decorator\n# comment\ndef f(a, b=1):\ndef f(a, b=1):\n"
)]
#[case::header_without_body_before_def(
    "if x:\n        def f(a, b=1):\n\tdef f(a, b=1):\n",
    "t = 'unterminated\nif x:\n        def f(a, b=1):\n\tdef f(a, b=1):\n"
)]
#[case::decorator_loses_definition(
    "@decorator\ndef f():\n    pass\n",
    "@decorator\nx = 1\ndef f():\n    pass\n"
)]
#[case::swap_functions(
    "def a():\n    return 1\n\ndef b():\n    return 2\n",
    "def b():\n    return 2\n\ndef a():\n    return 1\n"
)]
fn test_update_matches_fresh_parse(#[case] old: &str, #[case] new: &str) {
    check_update(old, new);
}

#[test]
fn test_typing_a_function_character_by_character() {
    let prefix = "x = 1\n\n";
    let typed = "def g(a, b=[1, 2]):\n    '''doc'''\n    return (a +\n            b)\n";
    let suffix = "\nclass C:\n    def m(self):\n        return g(1)\n";

    let (_, mut session) = parse(&format!("{prefix}{suffix}"));
    for end in (1..=typed.len()).filter(|&i| typed.is_char_boundary(i)) {
        let text = format!("{prefix}{}{suffix}", &typed[..end]);
        let (module, next) = update(session, &text).unwrap();
        assert_fresh(&module, &next, &text);
        session = next;
    }
}

#[test]
fn test_deleting_lines_one_by_one() {
    let mut lines: Vec<&str> = BASE.split_inclusive('\n').collect();
    let (_, mut session) = parse(BASE);
    while !lines.is_empty() {
        lines.remove(lines.len() / 2);
        let text = lines.concat();
        let (module, next) = update(session, &text).unwrap();
        assert_fresh(&module, &next, &text);
        session = next;
    }
}

#[test]
fn test_update_is_idempotent() {
    let session = check_update(BASE, &BASE.replace("return 3", "return 4"));
    let green = session.green().clone();
    let text = session.text().to_string();
    let (module, session) = update(session, &text).unwrap();
    assert_eq!(session.green(), &green);
    assert_eq!(module.serialize(), text);
    assert_eq!(session.stats().reparsed_blocks, 0);
}

// ============================================================================
// Reuse statistics
// ============================================================================

#[test]
fn test_untouched_blocks_are_reused() {
    let (_, session) = parse(&numbered_functions(5, None));
    assert_eq!(session.blocks().len(), 5);

    let new = numbered_functions(5, Some(2));
    let (module, session) = update(session, &new).unwrap();
    assert_fresh(&module, &session, &new);
    let stats = session.stats();
    assert_eq!(stats.reused_blocks, 4);
    assert_eq!(stats.reparsed_blocks, 1);
    assert_eq!(stats.misses, 0);
    assert!((stats.reuse_rate() - 0.8).abs() < 1e-9);
}

#[test]
fn test_unchanged_text_reuses_every_block() {
    let text = numbered_functions(3, None);
    let (_, session) = parse(&text);
    let (_, session) = update(session, &text).unwrap();
    assert_eq!(session.stats().reused_blocks, 3);
    assert_eq!(session.stats().reparsed_blocks, 0);
    assert_eq!(session.stats().total_blocks(), 3);
}

#[test]
fn test_unchanged_methods_are_spliced_in() {
    let old = indoc! {"
        class A:
            def f(self):
                return 1

            def g(self):
                return 2

            def h(self):
                return 3
    "};
    let new = old.replace("return 2", "return 20");
    let (_, session) = parse(old);
    let (module, session) = update(session, &new).unwrap();
    assert_fresh(&module, &session, &new);
    assert_eq!(session.stats().reparsed_blocks, 1);
    assert_eq!(session.stats().reused_nodes, 2);
}

#[test]
fn test_nested_reuse_can_be_disabled() {
    let options = ParseOptions::default().with_nested_reuse(false);
    let parser = DiffParser::new(options);
    let old = "class A:\n    def f(self):\n        return 1\n    x = 1\n";
    let new = old.replace("x = 1", "x = 2");
    let (_, session) = parser.parse(old);
    let (module, session) = parser.update(session, &new).unwrap();
    assert_fresh(&module, &session, &new);
    assert_eq!(session.stats().reused_nodes, 0);
}

#[test]
fn test_broken_block_merges_with_its_successor() {
    let new = BASE.replace("import os", "y = [1,");
    let session = check_update(BASE, &new);
    assert!(session.stats().misses >= 1);
    assert!(session.blocks().len() < arbor::diff::split_blocks(&new).len());
}

#[test]
fn test_non_incremental_parser_reparses_everything() {
    let parser = DiffParser::new(ParseOptions::default().with_incremental(false));
    let (_, session) = parser.parse(BASE);
    assert_eq!(session.blocks().len(), 1);

    let new = BASE.replace("return 3", "return 4");
    let (module, session) = parser.update(session, &new).unwrap();
    assert_fresh(&module, &session, &new);
    assert_eq!(session.stats().reused_blocks, 0);
    assert_eq!(session.stats().reparsed_blocks, 1);
}

// ============================================================================
// Options and line endings
// ============================================================================

#[test]
fn test_update_with_other_options_is_rejected() {
    let (_, session) = parse(BASE);
    let other = ParseOptions::default().with_tab_width(4);
    let result = DiffParser::new(other).update(session, BASE);
    assert_eq!(
        result.err(),
        Some(Error::OptionsMismatch {
            expected: other,
            found: ParseOptions::default(),
        })
    );
}

#[test]
fn test_update_keeps_session_options() {
    let options = ParseOptions::default().with_tab_width(4).with_miss_limit(2);
    let (_, session) = DiffParser::new(options).parse("if a:\n\tb\n");
    let (module, session) = update(session, "if a:\n\tb\n    c\n").unwrap();
    assert_eq!(session.options(), &options);
    assert_fresh(&module, &session, "if a:\n\tb\n    c\n");
}

#[test]
fn test_line_endings_do_not_change_structure() {
    let (lf, lf_session) = parse(BASE);
    let crlf_text = BASE.replace('\n', "\r\n");
    let (crlf, crlf_session) = parse(&crlf_text);

    assert_eq!(crlf.serialize(), crlf_text);
    assert_eq!(lf_session.blocks().len(), crlf_session.blocks().len());
    assert!(!lf.has_errors());
    assert!(!crlf.has_errors());

    let kinds = |m: &Module| -> Vec<SyntaxKind> { m.root_node().children().iter().map(|n| n.kind()).collect() };
    assert_eq!(kinds(&lf), kinds(&crlf));
    let names: Vec<_> = lf.used_names().names().collect();
    let crlf_names: Vec<_> = crlf.used_names().names().collect();
    assert_eq!(names, crlf_names);
}

#[test]
fn test_parse_all_matches_single_parses() {
    let texts = vec![BASE.to_string(), numbered_functions(4, None), String::new()];
    let sessions = arbor::parse_all(&texts[..]);
    assert_eq!(sessions.len(), 3);
    for (text, session) in texts.iter().zip(&sessions) {
        assert_fresh(&session.module(), session, text);
    }
}
