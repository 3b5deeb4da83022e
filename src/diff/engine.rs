//! The diff parser: block reuse, region reparsing and miss escalation

use rayon::prelude::*;
use rowan::TextSize;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::blocks::{BlockSpan, split_blocks};
use super::cursor::{EditView, ReuseCursor};
use super::error::{Error, Result};
use super::lines::{LineDiff, Lines};
use super::session::{Block, Session};
use super::stats::DiffStats;
use crate::base::{ParseOptions, TextRange};
use crate::parser::{Parse, SyntaxKind, parse_text, parse_with_reuse};
use crate::parser::builder::{element_kind, green_children};
use crate::syntax::Module;

/// Parses texts into sessions and updates sessions to new texts.
///
/// ```
/// use arbor::{DiffParser, ParseOptions};
///
/// let parser = DiffParser::new(ParseOptions::default().with_tab_width(4));
/// let (_, session) = parser.parse("def f():\n    return 1\n");
/// let (module, _) = parser.update(session, "def f():\n    return 2\n").unwrap();
/// assert_eq!(module.serialize(), "def f():\n    return 2\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiffParser {
    options: ParseOptions,
}

impl DiffParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse `text` from scratch
    pub fn parse(&self, text: &str) -> (Module, Session) {
        let session = self.parse_session(text);
        (session.module(), session)
    }

    /// Parse independent texts in parallel
    pub fn parse_all<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<Session> {
        texts
            .par_iter()
            .map(|text| self.parse_session(text.as_ref()))
            .collect()
    }

    /// Bring `session` up to date with `new_text`, reusing what did not
    /// change. The result is the tree a fresh parse of `new_text` gives.
    pub fn update(&self, session: Session, new_text: &str) -> Result<(Module, Session)> {
        if session.options != self.options {
            return Err(Error::OptionsMismatch {
                expected: self.options,
                found: session.options,
            });
        }

        let session = if !self.options.incremental {
            self.parse_session(new_text)
        } else if &*session.text == new_text {
            let stats = DiffStats {
                reused_blocks: session.blocks.len(),
                ..DiffStats::default()
            };
            debug!(blocks = session.blocks.len(), "text unchanged, session reused");
            Session { stats, ..session }
        } else {
            DiffRun::new(new_text, self.options, Some(&session)).run()
        };
        Ok((session.module(), session))
    }

    fn parse_session(&self, text: &str) -> Session {
        if self.options.incremental {
            DiffRun::new(text, self.options, None).run()
        } else {
            whole_text(text, self.options)
        }
    }
}

/// Parse the text as a single region
fn whole_text(text: &str, options: ParseOptions) -> Session {
    let spans = split_blocks(text);
    let mut blocks = Vec::new();
    if let Some(first) = spans.first() {
        let span = BlockSpan {
            range: TextRange::up_to(TextSize::of(text)),
            first_line: 0,
            line_count: spans.iter().map(|s| s.line_count).sum(),
            kind: first.kind,
        };
        let parse = parse_text(text, &options);
        let clean = ends_cleanly(&parse, TextSize::of(text));
        blocks.push(block_from_parse(&span, parse, clean));
    }
    let stats = DiffStats {
        reparsed_blocks: blocks.len(),
        ..DiffStats::default()
    };
    Session::assemble(text, blocks, options, stats)
}

/// One `parse` or `update`
struct DiffRun<'a> {
    text: &'a str,
    options: ParseOptions,
    spans: Vec<BlockSpan>,
    /// Old block to take over for each span
    plan: Vec<Option<&'a Block>>,
    cursor: ReuseCursor,
    stats: DiffStats,
}

impl<'a> DiffRun<'a> {
    fn new(text: &'a str, options: ParseOptions, old: Option<&'a Session>) -> Self {
        let spans = split_blocks(text);
        let mut plan = vec![None; spans.len()];
        let mut cursor = ReuseCursor::default();

        if let Some(old) = old {
            let old_lines = Lines::new(&old.text);
            let new_lines = Lines::new(text);
            let diff = LineDiff::new(&old_lines, &new_lines);
            trace!(
                old_lines = old_lines.len(),
                new_lines = new_lines.len(),
                unchanged = diff.unchanged_count(),
                "line diff"
            );

            let mut reused = vec![false; old.blocks.len()];
            let by_first_line: FxHashMap<usize, usize> = old
                .blocks
                .iter()
                .enumerate()
                .filter_map(|(idx, block)| Some((diff.map_run(block.first_line, block.line_count)?, idx)))
                .collect();

            for (idx, span) in spans.iter().enumerate() {
                let Some(&old_idx) = by_first_line.get(&span.first_line) else {
                    continue;
                };
                let block = &old.blocks[old_idx];
                let is_last = idx + 1 == spans.len();
                if block.line_count == span.line_count
                    && (is_last || block.clean_end)
                    && old.text.get(range_of(block.range)) == text.get(range_of(span.range))
                {
                    plan[idx] = Some(block);
                    reused[old_idx] = true;
                }
            }

            if options.nested_reuse {
                let view = EditView {
                    old,
                    old_lines: &old_lines,
                    new_text: text,
                    new_lines: &new_lines,
                    diff: &diff,
                };
                cursor = ReuseCursor::collect(&view, &reused);
            }
        }

        Self {
            text,
            options,
            spans,
            plan,
            cursor,
            stats: DiffStats::default(),
        }
    }

    fn run(mut self) -> Session {
        let mut blocks = Vec::with_capacity(self.spans.len());
        let mut idx = 0;

        while idx < self.spans.len() {
            if let Some(old) = self.plan[idx] {
                let span = &self.spans[idx];
                trace!(line = span.first_line + 1, lines = span.line_count, "reused block");
                blocks.push(Block {
                    range: span.range,
                    first_line: span.first_line,
                    line_count: span.line_count,
                    kind: span.kind,
                    children: old.children.clone(),
                    errors: old.errors.clone(),
                    clean_end: old.clean_end,
                });
                self.stats.reused_blocks += 1;
                idx += 1;
                continue;
            }

            let (block, last) = self.reparse_from(idx);
            blocks.push(block);
            idx = last + 1;
        }

        debug!(
            blocks = self.spans.len(),
            reused = self.stats.reused_blocks,
            reparsed = self.stats.reparsed_blocks,
            reused_nodes = self.stats.reused_nodes,
            misses = self.stats.misses,
            "diff parse finished"
        );
        Session::assemble(self.text, blocks, self.options, self.stats)
    }

    /// Parse spans starting at `first`, growing the region until it ends
    /// cleanly or reaches the end of the text. Returns the block and the
    /// index of the last span it covers.
    fn reparse_from(&mut self, first: usize) -> (Block, usize) {
        let final_span = self.spans.len() - 1;
        let mut last = first;
        loop {
            let span = merged(&self.spans[first], &self.spans[last]);
            let chunk = &self.text[range_of(span.range)];
            self.cursor.rebase(span.range.start());
            let parse = parse_with_reuse(chunk, &self.options, &mut self.cursor);
            let clean = ends_cleanly(&parse, TextSize::of(chunk));

            if clean || last == final_span {
                self.stats.reparsed_blocks += last - first + 1;
                self.stats.reused_nodes += parse.reused_nodes;
                return (block_from_parse(&span, parse, clean), last);
            }

            self.stats.misses += 1;
            trace!(
                line = span.first_line + 1,
                lines = span.line_count,
                misses = self.stats.misses,
                "block end is not a statement boundary, merging with next block"
            );
            last = if self.stats.misses > self.options.miss_limit {
                final_span
            } else {
                last + 1
            };
        }
    }
}

fn merged(first: &BlockSpan, last: &BlockSpan) -> BlockSpan {
    BlockSpan {
        range: first.range.cover(last.range),
        first_line: first.first_line,
        line_count: last.end_line() - first.first_line,
        kind: first.kind,
    }
}

fn range_of(range: TextRange) -> std::ops::Range<usize> {
    usize::from(range.start())..usize::from(range.end())
}

fn block_from_parse(span: &BlockSpan, parse: Parse, clean_end: bool) -> Block {
    let mut children = green_children(&parse.green);
    if children.last().map(element_kind) == Some(SyntaxKind::ENDMARKER) {
        children.pop();
    }
    Block {
        range: span.range,
        first_line: span.first_line,
        line_count: span.line_count,
        kind: span.kind,
        children,
        errors: parse.errors,
        clean_end,
    }
}

/// Whether a standalone parse of a region ends exactly at a top-level
/// statement boundary: a real line break, then only dedents, with nothing
/// pending at the region end.
fn ends_cleanly(parse: &Parse, len: TextSize) -> bool {
    if parse.errors.iter().any(|e| e.range.end() >= len) {
        return false;
    }
    let root = parse.syntax();
    let Some(end) = root.last_token() else {
        return false;
    };
    if end.kind() != SyntaxKind::ENDMARKER {
        return false;
    }
    let mut token = end.prev_token();
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
    use crate::diff::BlockKind;
    use indoc::indoc;

    fn parser() -> DiffParser {
        DiffParser::new(ParseOptions::default())
    }

    fn clean(text: &str) -> bool {
        let parse = parse_text(text, &ParseOptions::default());
        ends_cleanly(&parse, TextSize::of(text))
    }

    #[test]
    fn test_clean_ends() {
        assert!(clean("x = 1\n"));
        assert!(clean("def f():\n    return 1\n"));
        assert!(clean("class A:\n    def f(self):\n        pass\n"));
        assert!(!clean("x = 1"));
        assert!(!clean("x = (1,\n"));
        assert!(!clean("x = 1 + \\\n"));
        assert!(!clean("if x:\n"));
        assert!(!clean("@decorator\n"));
        assert!(!clean("s = '''open\n"));
        assert!(!clean(""));
    }

    #[test]
    fn test_parse_builds_blocks() {
        let text = indoc! {"
            import os

            def f():
                return os

            class A:
                pass
            f()
        "};
        let (module, session) = parser().parse(text);
        assert_eq!(module.serialize(), text);
        let kinds: Vec<_> = session.blocks().iter().map(|b| b.kind()).collect();
        assert_eq!(kinds, vec![BlockKind::Implicit, BlockKind::Scope, BlockKind::Scope, BlockKind::Implicit]);
        assert!(session.blocks().iter().all(|b| b.is_clean_end()));
        assert_eq!(session.stats().reparsed_blocks, 4);
        assert_eq!(session.stats().misses, 0);
        assert_eq!(session.green(), &parse_text(text, &ParseOptions::default()).green);
    }

    #[test]
    fn test_open_bracket_merges_blocks() {
        let text = "x = foo(1,\ndef_arg)\ndef f():\n    pass\n";
        let (_, session) = parser().parse(text);
        assert_eq!(session.green(), &parse_text(text, &ParseOptions::default()).green);
        assert_eq!(session.stats().misses, 0);

        let text = "x = [')'\ndef f():\n    pass\n]\n";
        let (module, session) = parser().parse(text);
        assert_eq!(module.serialize(), text);
        assert_eq!(session.green(), &parse_text(text, &ParseOptions::default()).green);
        assert_eq!(session.stats().misses, 1);
    }

    #[test]
    fn test_miss_limit_reparses_rest() {
        let text = "s = '''\ndef a(): pass\ndef b(): pass\ndef c(): pass\n'''\n";
        let options = ParseOptions::default().with_miss_limit(0);
        let (_, session) = DiffParser::new(options).parse(text);
        assert_eq!(session.stats().misses, 1);
        assert_eq!(session.blocks().len(), 1);
        assert_eq!(session.green(), &parse_text(text, &options).green);
    }

    #[test]
    fn test_update_reuses_untouched_blocks() {
        let old = "def f():\n    return 1\n\ndef g():\n    return 2\n\nx = f()\n";
        let new = "def f():\n    return 1\n\ndef g():\n    return 3\n\nx = f()\n";
        let (_, session) = parser().parse(old);
        let (module, session) = parser().update(session, new).unwrap();
        assert_eq!(module.serialize(), new);
        assert_eq!(session.stats().reused_blocks, 2);
        assert_eq!(session.stats().reparsed_blocks, 1);
        assert_eq!(session.green(), &parse_text(new, &ParseOptions::default()).green);
    }

    #[test]
    fn test_update_identical_text() {
        let text = "a = 1\ndef f():\n    pass\n";
        let (_, session) = parser().parse(text);
        let green = session.green().clone();
        let (_, session) = parser().update(session, text).unwrap();
        assert_eq!(session.green(), &green);
        assert_eq!(session.stats().reparsed_blocks, 0);
        assert!((session.stats().reuse_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_rejects_other_options() {
        let (_, session) = parser().parse("x\n");
        let other = DiffParser::new(ParseOptions::default().with_tab_width(4));
        let result = other.update(session, "y\n");
        assert!(matches!(result, Err(Error::OptionsMismatch { .. })));
    }

    #[test]
    fn test_non_incremental_parses_once() {
        let options = ParseOptions::default().with_incremental(false);
        let parser = DiffParser::new(options);
        let text = "def f():\n    pass\nx = 1\n";
        let (_, session) = parser.parse(text);
        assert_eq!(session.blocks().len(), 1);
        let (_, session) = parser.update(session, "x = 2\n").unwrap();
        assert_eq!(session.stats().reused_blocks, 0);
        assert_eq!(session.text(), "x = 2\n");
    }

    #[test]
    fn test_parse_all() {
        let texts = ["a = 1\n", "def f():\n    pass\n", ""];
        let sessions = parser().parse_all(&texts);
        let serialized: Vec<_> = sessions.iter().map(|s| s.module().serialize()).collect();
        assert_eq!(serialized, texts);
    }
}
