//! Indentation-aware tokenizer
//!
//! Turns the raw lexer's flat token stream into logical-line tokens:
//! - whitespace, comments, blank lines and continuations become the verbatim
//!   `prefix` of the next significant token
//! - `NEWLINE` is only emitted at the end of a logical line at bracket depth 0
//! - `INDENT` / `DEDENT` / `ERROR_DEDENT` are derived from an explicit
//!   indentation stack
//! - `ENDMARKER` closes the stream and owns any trailing trivia
//!
//! Concatenating `prefix + text` of every token reproduces the input exactly.

use std::collections::VecDeque;

use rowan::TextSize;
use tracing::trace;

use super::lexer::{Lexer, RawToken};
use super::syntax_kind::SyntaxKind;
use crate::base::{ParseOptions, Position};

const BOM: char = '\u{feff}';

/// A significant token with its attached prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    /// Whitespace, comments and non-logical newlines preceding the token
    pub prefix: &'a str,
    /// Byte offset of `text` (the prefix ends here)
    pub offset: TextSize,
    pub start: Position,
}

impl Token<'_> {
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }

    pub fn prefix_offset(&self) -> TextSize {
        self.offset - TextSize::of(self.prefix)
    }

    pub fn end_pos(&self) -> Position {
        advance_position(self.start, self.text)
    }
}

/// Position reached after walking over `text` starting at `start`
pub(crate) fn advance_position(start: Position, text: &str) -> Position {
    let mut line = start.line;
    let mut column = start.column;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                column = 0;
            }
            '\n' => {
                line += 1;
                column = 0;
            }
            _ => column += 1,
        }
    }
    Position::new(line, column)
}

/// Snapshot to resume tokenizing at the start of a logical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerState {
    /// Byte offset of a line start, at bracket depth 0
    pub offset: TextSize,
    /// 1-indexed line number at `offset`
    pub line: usize,
    /// Open indentation widths, outermost first
    pub indents: Vec<u32>,
}

impl TokenizerState {
    pub fn start() -> Self {
        Self {
            offset: TextSize::new(0),
            line: 1,
            indents: vec![0],
        }
    }
}

/// Statement-only keywords that end an unclosed bracket run
pub fn breaks_bracket_run(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    matches!(
        kind,
        SEMI | IMPORT_KW
            | CLASS_KW
            | DEF_KW
            | TRY_KW
            | EXCEPT_KW
            | FINALLY_KW
            | WHILE_KW
            | WITH_KW
            | RETURN_KW
            | CONTINUE_KW
            | BREAK_KW
            | DEL_KW
            | PASS_KW
            | GLOBAL_KW
            | ASSERT_KW
            | NONLOCAL_KW
    )
}

/// Tokenize `text` from the beginning
pub fn tokenize<'a>(text: &'a str, options: &ParseOptions) -> Tokenizer<'a> {
    Tokenizer::new(text, options)
}

/// Lazy, single-pass token iterator
pub struct Tokenizer<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    indents: Vec<u32>,
    depth: u32,
    /// No significant token yet on the current logical line
    new_line: bool,
    prefix_start: usize,
    prefix_pos: Position,
    line: usize,
    line_start: usize,
    /// Last (offset, column) computed on the current line
    column_cursor: (usize, usize),
    pending: VecDeque<Token<'a>>,
    done: bool,
    tab_width: u32,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, options: &ParseOptions) -> Self {
        let mut tokenizer = Self::resume(source, TokenizerState::start(), options);
        if source.starts_with(BOM) {
            // The mark stays in the first token's prefix
            tokenizer.lexer = Lexer::at(source, BOM.len_utf8());
        }
        tokenizer
    }

    /// Restart at a logical line start with a known indentation stack
    pub fn resume(source: &'a str, state: TokenizerState, options: &ParseOptions) -> Self {
        let offset = usize::from(state.offset).min(source.len());
        let mut indents = state.indents;
        if indents.first() != Some(&0) {
            indents.insert(0, 0);
        }
        Self {
            source,
            lexer: Lexer::at(source, offset),
            indents,
            depth: 0,
            new_line: true,
            prefix_start: offset,
            prefix_pos: Position::new(state.line, 0),
            line: state.line,
            line_start: offset,
            column_cursor: (offset, 0),
            pending: VecDeque::new(),
            done: false,
            tab_width: options.tab_width.max(1),
        }
    }

    /// Current indentation stack, outermost first
    pub fn indents(&self) -> &[u32] {
        &self.indents
    }

    /// Current bracket depth
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Snapshot at the end of the last produced token.
    ///
    /// Resuming from it is only sound after a `NEWLINE` at bracket depth 0.
    pub fn state(&self) -> TokenizerState {
        TokenizerState {
            offset: TextSize::new(self.prefix_start as u32),
            line: self.prefix_pos.line,
            indents: self.indents.clone(),
        }
    }

    /// Indentation width of `text` under this tokenizer's tab policy
    pub fn measure_indent(&self, text: &str) -> u32 {
        measure_indent(text, self.tab_width)
    }

    fn step(&mut self) {
        let Some(raw) = self.lexer.next() else {
            self.finish();
            return;
        };

        match raw.kind {
            SyntaxKind::WHITESPACE | SyntaxKind::COMMENT | SyntaxKind::LINE_CONTINUATION => {
                self.consume(&raw);
            }
            SyntaxKind::NEWLINE => {
                if self.new_line || self.depth > 0 {
                    self.consume(&raw);
                } else {
                    self.new_line = true;
                    self.emit(raw);
                }
            }
            kind => {
                if self.new_line {
                    self.new_line = false;
                    let width = self.indent_before(raw.offset);
                    self.indent_to(width);
                } else if self.depth > 0 && breaks_bracket_run(kind) {
                    self.depth = 0;
                    if self.starts_line(raw.offset) {
                        let width = self.indent_before(raw.offset);
                        self.dedent_to(width);
                    }
                }

                if kind.is_open_bracket() {
                    self.depth += 1;
                } else if kind.is_close_bracket() {
                    self.depth = self.depth.saturating_sub(1);
                }
                self.emit(raw);
            }
        }
    }

    fn finish(&mut self) {
        for _ in 1..self.indents.len() {
            self.emit_layout(SyntaxKind::DEDENT);
        }
        self.indents.truncate(1);

        let end = self.source.len();
        let start = self.position_at(end);
        self.pending.push_back(Token {
            kind: SyntaxKind::ENDMARKER,
            text: "",
            prefix: &self.source[self.prefix_start..],
            offset: TextSize::new(end as u32),
            start,
        });
        self.done = true;
    }

    // =========================================================================
    // Indentation
    // =========================================================================

    fn indent_before(&self, offset: TextSize) -> u32 {
        measure_indent(&self.source[self.line_start..usize::from(offset)], self.tab_width)
    }

    fn starts_line(&self, offset: TextSize) -> bool {
        self.source[self.line_start..usize::from(offset)]
            .chars()
            .all(|c| matches!(c, ' ' | '\t' | '\x0c' | BOM))
    }

    fn indent_to(&mut self, width: u32) {
        let top = self.indents.last().copied().unwrap_or(0);
        if width > top {
            self.indents.push(width);
            self.emit_layout(SyntaxKind::INDENT);
        } else {
            self.dedent_to(width);
        }
    }

    fn dedent_to(&mut self, width: u32) {
        while let Some(&top) = self.indents.last() {
            if width >= top {
                break;
            }
            let len = self.indents.len();
            if len >= 2 && width > self.indents[len - 2] {
                trace!(width, line = self.line, "dedent does not match any outer indentation level");
                self.emit_layout(SyntaxKind::ERROR_DEDENT);
                self.indents[len - 1] = width;
                break;
            }
            self.indents.pop();
            self.emit_layout(SyntaxKind::DEDENT);
        }
    }

    // =========================================================================
    // Emission and position tracking
    // =========================================================================

    fn emit(&mut self, raw: RawToken<'a>) {
        let offset = usize::from(raw.offset);
        let start = self.position_at(offset);
        self.pending.push_back(Token {
            kind: raw.kind,
            text: raw.text,
            prefix: &self.source[self.prefix_start..offset],
            offset: raw.offset,
            start,
        });
        self.consume(&raw);
        let end = usize::from(raw.end());
        self.prefix_start = end;
        self.prefix_pos = self.position_at(end);
    }

    /// Zero-width layout token placed where the next token's prefix begins
    fn emit_layout(&mut self, kind: SyntaxKind) {
        self.pending.push_back(Token {
            kind,
            text: "",
            prefix: "",
            offset: TextSize::new(self.prefix_start as u32),
            start: self.prefix_pos,
        });
    }

    /// Advance line tracking over a raw token's text
    fn consume(&mut self, raw: &RawToken<'a>) {
        let base = usize::from(raw.offset);
        let bytes = raw.text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    self.line += 1;
                    self.line_start = base + i + 1;
                }
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    self.line += 1;
                    self.line_start = base + i + 1;
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// Position of `offset`, which must lie on the current line
    fn position_at(&mut self, offset: usize) -> Position {
        let (cursor, column) = self.column_cursor;
        let (from, base) = if cursor < self.line_start || cursor > offset {
            (self.line_start, 0)
        } else {
            (cursor, column)
        };
        let column = base + self.source[from..offset].chars().count();
        self.column_cursor = (offset, column);
        Position::new(self.line, column)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.done {
                return None;
            }
            self.step();
        }
    }
}

/// Width of leading whitespace: tabs advance to the next multiple of
/// `tab_width`, a form feed resets the count.
pub fn measure_indent(text: &str, tab_width: u32) -> u32 {
    let mut width = 0;
    for c in text.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / tab_width + 1) * tab_width,
            '\x0c' => width = 0,
            _ => {}
        }
    }
    width
}
