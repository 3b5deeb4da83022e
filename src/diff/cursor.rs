//! Nested definition reuse
//!
//! When a block has to be reparsed, unchanged functions and classes inside
//! it can still be spliced in from the old tree. The cursor collects them
//! up front, keyed by where their text now starts, and hands them to the
//! parser when it reaches that offset at a statement start.

use rowan::{GreenNode, TextSize};
use rustc_hash::FxHashMap;

use super::lines::{LineDiff, Lines};
use super::session::{Block, Session};
use crate::parser::{ReuseCandidate, ReuseSource, SyntaxKind, SyntaxNode, measure_indent};

/// Reuse candidates for one update
#[derive(Debug, Default)]
pub struct ReuseCursor {
    candidates: FxHashMap<TextSize, ReuseCandidate>,
    /// Offset of the region being parsed in the new text
    base: TextSize,
}

/// Texts and line mapping of one update
pub(crate) struct EditView<'a> {
    pub old: &'a Session,
    pub old_lines: &'a Lines<'a>,
    pub new_text: &'a str,
    pub new_lines: &'a Lines<'a>,
    pub diff: &'a LineDiff,
}

impl ReuseCursor {
    /// Collect candidates from the old blocks not reused wholesale
    pub(crate) fn collect(view: &EditView<'_>, reused: &[bool]) -> Self {
        let mut candidates = FxHashMap::default();
        for (idx, block) in view.old.blocks.iter().enumerate() {
            if reused.get(idx).copied().unwrap_or(false) {
                continue;
            }
            collect_block(view, block, &mut candidates);
        }
        Self {
            candidates,
            base: TextSize::new(0),
        }
    }

    /// Parse offsets are relative to `base` from now on
    pub fn rebase(&mut self, base: TextSize) {
        self.base = base;
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl ReuseSource for ReuseCursor {
    fn candidate(&mut self, offset: TextSize) -> Option<ReuseCandidate> {
        self.candidates.get(&(self.base + offset)).cloned()
    }
}

fn collect_block(view: &EditView<'_>, block: &Block, out: &mut FxHashMap<TextSize, ReuseCandidate>) {
    let root = SyntaxNode::new_root(GreenNode::new(SyntaxKind::MODULE.into(), block.children.iter().cloned()));
    let tab_width = view.old.options.tab_width;

    for node in root.descendants() {
        if !is_definition(&node) {
            continue;
        }
        let in_statement_list = node
            .parent()
            .is_some_and(|p| matches!(p.kind(), SyntaxKind::MODULE | SyntaxKind::SUITE));
        if !in_statement_list || !ends_with_line_break(&node) {
            continue;
        }

        // Errors a statement causes are reported up to the token after it
        let range = node.text_range();
        let reach = lookahead_end(&node);
        let has_error = block
            .errors
            .iter()
            .any(|e| e.range.start() <= reach && range.start() <= e.range.end());
        if has_error {
            continue;
        }

        let start = usize::from(block.range.start() + range.start());
        let end = usize::from(block.range.start() + range.end());
        let first = view.old_lines.line_of(start);
        let last = view.old_lines.line_of(end - 1);
        let lead = &view.old.text[view.old_lines.start(first)..start];
        if !lead.chars().all(|c| matches!(c, ' ' | '\t' | '\x0c')) {
            continue;
        }
        let Some(new_first) = view.diff.map_run(first, last - first + 1) else {
            continue;
        };

        let new_start = view.new_lines.start(new_first) + lead.len();
        let new_end = new_start + (end - start);
        if view.new_text.get(new_start..new_end) != Some(&view.old.text[start..end]) {
            continue;
        }

        out.insert(
            TextSize::new(new_start as u32),
            ReuseCandidate {
                green: node.green().into_owned(),
                indent: measure_indent(lead, tab_width),
            },
        );
    }
}

/// `async for` and `async with` may still take an `else` from the next line,
/// and a decorator without its definition may still gain one
fn is_definition(node: &SyntaxNode) -> bool {
    match node.kind() {
        SyntaxKind::ASYNC_STMT => node.children().any(|c| c.kind() == SyntaxKind::FUNC_DEF),
        SyntaxKind::DECORATED => node.children().any(|c| {
            matches!(
                c.kind(),
                SyntaxKind::FUNC_DEF | SyntaxKind::CLASS_DEF | SyntaxKind::ASYNC_STMT
            )
        }),
        kind => kind.is_reusable_definition(),
    }
}

/// End of the first token with text after `node`, or of the whole tree
fn lookahead_end(node: &SyntaxNode) -> TextSize {
    let mut token = node.last_token().and_then(|t| t.next_token());
    while let Some(t) = token {
        if !t.kind().is_trivia() && !t.text_range().is_empty() {
            return t.text_range().end();
        }
        token = t.next_token();
    }
    node.ancestors()
        .last()
        .map_or(node.text_range().end(), |root| root.text_range().end())
}

/// The last token that is neither trivia nor a dedent is a real line break
fn ends_with_line_break(node: &SyntaxNode) -> bool {
    let mut token = node.last_token();
    while let Some(t) = token {
        match t.kind() {
            SyntaxKind::DEDENT => token = t.prev_token(),
            SyntaxKind::NEWLINE => return !t.text().is_empty(),
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ParseOptions;
    use crate::diff::DiffParser;
    use indoc::indoc;

    fn cursor_for(old: &str, new: &str) -> ReuseCursor {
        let (_, session) = DiffParser::new(ParseOptions::default()).parse(old);
        let old_lines = Lines::new(old);
        let new_lines = Lines::new(new);
        let diff = LineDiff::new(&old_lines, &new_lines);
        let view = EditView {
            old: &session,
            old_lines: &old_lines,
            new_text: new,
            new_lines: &new_lines,
            diff: &diff,
        };
        ReuseCursor::collect(&view, &[])
    }

    #[test]
    fn test_unchanged_methods_are_offered_at_new_offsets() {
        let old = indoc! {"
            class A:
                def f(self):
                    return 1

                def g(self):
                    return 2
        "};
        let new = indoc! {"
            class A:
                x = 0

                def f(self):
                    return 1

                def g(self):
                    return 2
        "};
        let mut cursor = cursor_for(old, new);
        let f_at = new.find("def f").map(|o| o as u32).unwrap_or_default();
        let g_at = new.find("def g").map(|o| o as u32).unwrap_or_default();
        assert_eq!(cursor.len(), 2);
        let f = cursor.candidate(TextSize::new(f_at));
        assert_eq!(f.as_ref().map(|c| c.indent), Some(4));
        assert!(cursor.candidate(TextSize::new(g_at)).is_some());
        assert!(cursor.candidate(TextSize::new(0)).is_none());
    }

    #[test]
    fn test_changed_definition_is_not_offered() {
        let old = "def f():\n    return 1\n\ndef g():\n    return 2\n";
        let new = "def f():\n    return 10\n\ndef g():\n    return 2\n";
        let mut cursor = cursor_for(old, new);
        assert!(cursor.candidate(TextSize::new(0)).is_none());
        let g_at = new.find("def g").map(|o| o as u32).unwrap_or_default();
        assert!(cursor.candidate(TextSize::new(g_at)).is_some());
    }

    #[test]
    fn test_definition_with_errors_is_not_offered() {
        let old = "def f(:\n    pass\n";
        let cursor = cursor_for(old, old);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_decorator_without_definition_is_not_offered() {
        let old = "import os\n@decorator\n# comment\nif x:\ndef f(a, b=1):\n";
        let new = "import os\n@decorator\n# comment\ndef f(a, b=1):\ndef f(a, b=1):\n";
        let mut cursor = cursor_for(old, new);
        let at = new.find('@').map(|o| o as u32).unwrap_or_default();
        assert!(cursor.candidate(TextSize::new(at)).is_none());
    }

    #[test]
    fn test_header_with_error_at_next_statement_is_not_offered() {
        // The missing body is reported at the second `def`
        let old = "if x:\n        def f(a, b=1):\n\tdef f(a, b=1):\n";
        let cursor = cursor_for(old, old);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_definition_followed_by_error_elsewhere_is_offered() {
        let old = "def f():\n    pass\n\nx = (\n";
        let cursor = cursor_for(old, old);
        assert_eq!(cursor.len(), 1);
    }

    #[test]
    fn test_rebase_shifts_lookups() {
        let old = "x = 1\ndef f():\n    pass\n";
        let mut cursor = cursor_for(old, old);
        cursor.rebase(TextSize::new(6));
        assert!(cursor.candidate(TextSize::new(0)).is_some());
    }

    #[test]
    fn test_definition_without_final_newline_is_not_offered() {
        let old = "def f():\n    pass";
        let cursor = cursor_for(old, old);
        assert!(cursor.is_empty());
    }
}
