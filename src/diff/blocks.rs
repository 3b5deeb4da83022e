//! Top-level block splitting
//!
//! A cheap line scan guesses where the file can be cut into independently
//! parseable pieces. The guess does not need to be right: every freshly
//! parsed block is checked for a clean end and merged with its successor
//! when the check fails.

use super::lines::Lines;
use crate::base::TextRange;
use rowan::TextSize;

/// How a block was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Starts with `def`, `class`, `async def` or a decorator
    Scope,
    /// Any other run of top-level code
    Implicit,
}

/// A line range of the text that is parsed as a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub range: TextRange,
    /// 0-based index of the first line
    pub first_line: usize,
    pub line_count: usize,
    pub kind: BlockKind,
}

impl BlockSpan {
    pub fn end_line(&self) -> usize {
        self.first_line + self.line_count
    }
}

/// What a physical line looks like to the splitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineShape {
    /// Blank or comment only
    Trivia,
    /// Code starting after leading whitespace
    Indented,
    /// Code starting at column 0
    TopLevel { scope: ScopeStart },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeStart {
    None,
    Definition,
    Decorator,
}

/// Split `text` into blocks. An empty text has none.
pub fn split_blocks(text: &str) -> Vec<BlockSpan> {
    let lines = Lines::new(text);
    let mut blocks = Vec::new();
    if lines.is_empty() {
        return blocks;
    }

    let mut start = 0;
    let mut kind = None;
    let mut last_code = None;
    let mut decorators_open = false;
    let mut depth: i64 = 0;
    let mut continued = false;

    for idx in 0..lines.len() {
        let line = lines.line(idx);
        // Only a mark at the very start is trivia to the tokenizer
        let line = if idx == 0 { line.strip_prefix(BOM).unwrap_or(line) } else { line };
        let shape = shape_of(line);
        if shape == LineShape::Trivia {
            continue;
        }

        let code = code_of(line);
        if starts_with_word(code, "def") || starts_with_word(code, "class") {
            depth = 0;
        }

        let mut cut = None;
        if let LineShape::TopLevel { scope } = shape {
            if depth == 0 && !continued {
                cut = match (scope, kind) {
                    (ScopeStart::Definition, Some(BlockKind::Scope)) if decorators_open => None,
                    (ScopeStart::Decorator, Some(BlockKind::Scope)) if decorators_open => None,
                    (ScopeStart::Definition | ScopeStart::Decorator, _) => Some(BlockKind::Scope),
                    (ScopeStart::None, Some(BlockKind::Scope)) => Some(BlockKind::Implicit),
                    (ScopeStart::None, _) => None,
                };
                decorators_open = match scope {
                    ScopeStart::Decorator => true,
                    ScopeStart::Definition => false,
                    ScopeStart::None => decorators_open && cut.is_none(),
                };
            }
        }

        match (cut, last_code) {
            (Some(new_kind), Some(prev)) => {
                let end = prev + 1;
                blocks.push(span(&lines, start, end, kind.unwrap_or(BlockKind::Implicit)));
                start = end;
                kind = Some(new_kind);
            }
            (Some(new_kind), None) => kind = Some(new_kind),
            (None, _) if kind.is_none() => kind = Some(BlockKind::Implicit),
            (None, _) => {}
        }

        depth = (depth + bracket_balance(code)).max(0);
        continued = ends_with_continuation(line);
        last_code = Some(idx);
    }

    blocks.push(span(&lines, start, lines.len(), kind.unwrap_or(BlockKind::Implicit)));
    blocks
}

fn span(lines: &Lines<'_>, first: usize, end: usize, kind: BlockKind) -> BlockSpan {
    let range = TextRange::new(
        TextSize::new(lines.start(first) as u32),
        TextSize::new(lines.start(end) as u32),
    );
    BlockSpan {
        range,
        first_line: first,
        line_count: end - first,
        kind,
    }
}

const BOM: char = '\u{feff}';

/// Keywords that continue the compound statement on the lines above
const CLAUSE_KEYWORDS: [&str; 4] = ["elif", "else", "except", "finally"];

/// A line without its indentation
fn code_of(line: &str) -> &str {
    line.trim_start_matches([' ', '\t', '\x0c'])
}

fn shape_of(line: &str) -> LineShape {
    let code = code_of(line);
    // Blank means what the tokenizer skips, not Unicode whitespace
    let content = code.trim_end_matches(['\r', '\n']);
    if content.is_empty() || content.starts_with('#') {
        return LineShape::Trivia;
    }
    // A stray mark is an error token and a leading backslash joins the
    // next line; never cut in front of either
    if code.len() != line.len() || code.starts_with([BOM, '\\']) {
        return LineShape::Indented;
    }
    let scope = if code.starts_with('@') {
        ScopeStart::Decorator
    } else if starts_with_word(code, "def") || starts_with_word(code, "class") {
        ScopeStart::Definition
    } else if let Some(rest) = strip_word(code, "async") {
        if starts_with_word(rest.trim_start_matches([' ', '\t']), "def") {
            ScopeStart::Definition
        } else {
            ScopeStart::None
        }
    } else if CLAUSE_KEYWORDS.iter().any(|kw| starts_with_word(code, kw)) {
        // The statement before it is not finished yet
        return LineShape::Indented;
    } else {
        ScopeStart::None
    };
    LineShape::TopLevel { scope }
}

fn strip_word<'a>(code: &'a str, word: &str) -> Option<&'a str> {
    let rest = code.strip_prefix(word)?;
    match rest.chars().next() {
        Some(c) if c == '_' || c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

fn starts_with_word(code: &str, word: &str) -> bool {
    strip_word(code, word).is_some()
}

/// Naive bracket count: strings are not understood, comments are skipped
fn bracket_balance(code: &str) -> i64 {
    let mut balance = 0;
    for c in code.chars() {
        match c {
            '#' => break,
            '(' | '[' | '{' => balance += 1,
            ')' | ']' | '}' => balance -= 1,
            _ => {}
        }
    }
    balance
}

fn ends_with_continuation(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']).ends_with('\\')
}
