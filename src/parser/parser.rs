//! Recursive descent parser
//!
//! Builds a rowan `GreenNode` tree from the indentation-aware token stream.
//! Every byte of the input ends up in the tree: each token's prefix is
//! split back into trivia tokens right before the token (or the node it
//! opens) is emitted, so leading trivia always belongs to the enclosing
//! node and no node starts with trivia.
//!
//! Parsing never fails. Errors are recorded next to the tree and the text
//! they cover is kept in `ERROR_NODE`s.

use std::collections::VecDeque;

use rowan::{GreenNode, TextRange, TextSize};
use tracing::trace;

use super::builder::{Checkpoint, TreeBuilder};
use super::errors::{ErrorCode, ParseContext, SyntaxError};
use super::grammar::{self, GrammarParser};
use super::lexer::Lexer;
use super::syntax_kind::{SyntaxKind, SyntaxNode};
use super::tokenizer::{Token, Tokenizer, TokenizerState, advance_position, measure_indent};
use crate::base::{ParseOptions, Position};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
    /// Statements spliced in from an earlier tree
    pub reused_nodes: usize,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors; warnings are allowed
    pub fn ok(&self) -> bool {
        !self.errors.iter().any(|e| e.severity.is_error())
    }
}

/// A statement subtree from an earlier parse
#[derive(Debug, Clone)]
pub struct ReuseCandidate {
    pub green: GreenNode,
    /// Indentation width of the statement's first line
    pub indent: u32,
}

/// Supplies reusable statements by their start offset in the new text
///
/// Implementors vouch that the candidate's text equals the new text at
/// that offset and that it ends with a line end at bracket depth 0. The
/// parser checks the surrounding layout itself.
pub trait ReuseSource {
    fn candidate(&mut self, offset: TextSize) -> Option<ReuseCandidate>;
}

/// Parse `text` into a lossless tree
pub fn parse_text(text: &str, options: &ParseOptions) -> Parse {
    let mut parser = Parser::new(text, options, None);
    grammar::parse_module(&mut parser);
    parser.finish()
}

/// Parse `text`, splicing in statements offered by `source`
pub fn parse_with_reuse(text: &str, options: &ParseOptions, source: &mut dyn ReuseSource) -> Parse {
    let mut parser = Parser::new(text, options, Some(source));
    grammar::parse_module(&mut parser);
    parser.finish()
}

/// Split a token prefix into trivia tokens
pub fn split_prefix(prefix: &str) -> impl Iterator<Item = (SyntaxKind, &str)> {
    Lexer::new(prefix).map(|raw| {
        let kind = match raw.kind {
            SyntaxKind::NEWLINE => SyntaxKind::NL,
            _ if raw.text.starts_with('\u{feff}') => SyntaxKind::BYTE_ORDER_MARK,
            kind => kind,
        };
        (kind, raw.text)
    })
}

/// The parser state
struct Parser<'t, 'r> {
    text: &'t str,
    options: ParseOptions,
    tokens: Tokenizer<'t>,
    /// Significant tokens read ahead; the front is the current token
    lookahead: VecDeque<Token<'t>>,
    /// The current token's prefix has not been emitted yet
    trivia_pending: bool,
    builder: TreeBuilder,
    errors: Vec<SyntaxError>,
    contexts: Vec<ParseContext>,
    prev: Option<SyntaxKind>,
    pos: usize,
    reuse: Option<&'r mut dyn ReuseSource>,
    reused_nodes: usize,
}

impl<'t, 'r> Parser<'t, 'r> {
    fn new(text: &'t str, options: &ParseOptions, reuse: Option<&'r mut dyn ReuseSource>) -> Self {
        let mut parser = Self {
            text,
            options: *options,
            tokens: Tokenizer::new(text, options),
            lookahead: VecDeque::new(),
            trivia_pending: true,
            builder: TreeBuilder::new(),
            errors: Vec::new(),
            contexts: Vec::new(),
            prev: None,
            pos: 0,
            reuse,
            reused_nodes: 0,
        };
        parser.fill(0);
        parser
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
            reused_nodes: self.reused_nodes,
        }
    }

    // =========================================================================
    // Token buffering
    // =========================================================================

    fn fill(&mut self, n: usize) {
        while self.lookahead.len() <= n {
            match self.tokens.next() {
                Some(token) => self.lookahead.push_back(token),
                None => break,
            }
        }
    }

    fn current(&self) -> Option<&Token<'t>> {
        self.lookahead.front()
    }

    /// Emit the current token's prefix as trivia, once
    fn drain_trivia(&mut self) {
        if !self.trivia_pending {
            return;
        }
        self.trivia_pending = false;
        let Some(token) = self.lookahead.front() else {
            return;
        };
        for (kind, text) in split_prefix(token.prefix) {
            self.builder.token(kind, text);
        }
    }

    fn advance(&mut self) {
        let Some(token) = self.lookahead.front().copied() else {
            return;
        };
        self.drain_trivia();
        self.builder.token(token.kind, token.text);
        self.prev = Some(token.kind);
        self.pos += 1;
        self.lookahead.pop_front();
        self.fill(0);
        self.trivia_pending = true;
    }

    // =========================================================================
    // Reuse
    // =========================================================================

    /// Whether the first code line at or after `offset` is indented no
    /// deeper than `indent`, so a block ending before it stays closed
    fn closes_at(&self, offset: usize, indent: u32) -> bool {
        for line in self.text[offset..].split(['\r', '\n']) {
            let code = line.trim_start_matches([' ', '\t', '\x0c']);
            if code.is_empty() || code.starts_with('#') {
                continue;
            }
            if code.starts_with('\\') {
                return false;
            }
            let leading = &line[..line.len() - code.len()];
            return measure_indent(leading, self.options.tab_width) <= indent;
        }
        true
    }

    fn reuse_current(&mut self) -> bool {
        let at_line_start = matches!(
            self.prev,
            None | Some(SyntaxKind::NEWLINE | SyntaxKind::INDENT | SyntaxKind::DEDENT | SyntaxKind::ERROR_DEDENT)
        );
        if !at_line_start || self.lookahead.len() != 1 || self.tokens.depth() != 0 {
            return false;
        }
        let Some(token) = self.current().copied() else {
            return false;
        };
        if token.kind.is_layout() {
            return false;
        }
        let indent = self.tokens.indents().last().copied().unwrap_or(0);
        let Some(source) = self.reuse.as_deref_mut() else {
            return false;
        };
        let Some(candidate) = source.candidate(token.offset) else {
            return false;
        };

        let start = usize::from(token.offset);
        let end = start + usize::from(candidate.green.text_len());
        if candidate.indent != indent || end > self.text.len() || !self.closes_at(end, indent) {
            trace!(offset = start, "reuse candidate rejected by surrounding layout");
            return false;
        }

        let last = last_significant_kind(&candidate.green);
        let lines = advance_position(Position::new(0, 0), &self.text[start..end]).line;
        let state = TokenizerState {
            offset: TextSize::new(end as u32),
            line: token.start.line + lines,
            indents: self.tokens.indents().to_vec(),
        };

        self.drain_trivia();
        self.builder.reuse(candidate.green);
        self.tokens = Tokenizer::resume(self.text, state, &self.options);
        self.lookahead.clear();
        self.fill(0);
        self.trivia_pending = true;
        self.prev = last.or(Some(SyntaxKind::NEWLINE));
        self.pos += 1;
        self.reused_nodes += 1;
        trace!(offset = start, len = end - start, "reused statement");
        true
    }
}

/// Last non-trivia token kind in a green subtree
fn last_significant_kind(node: &GreenNode) -> Option<SyntaxKind> {
    SyntaxNode::new_root(node.clone())
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .map(|token| token.kind())
        .filter(|kind| !kind.is_trivia())
        .last()
}

impl GrammarParser for Parser<'_, '_> {
    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::ENDMARKER)
    }

    fn current_text(&self) -> &str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    fn peek_kind(&mut self, n: usize) -> SyntaxKind {
        self.fill(n);
        self.lookahead.get(n).map(|t| t.kind).unwrap_or(SyntaxKind::ENDMARKER)
    }

    fn get_pos(&self) -> usize {
        self.pos
    }

    fn bump(&mut self) {
        if self.current_kind() != SyntaxKind::ENDMARKER {
            self.advance();
        }
    }

    fn bump_eof(&mut self) {
        if self.current_kind() == SyntaxKind::ENDMARKER {
            self.advance();
        }
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        // Trivia before the root stays inside it
        if self.builder.depth() > 0 {
            self.drain_trivia();
        }
        self.builder.start_node(kind);
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.drain_trivia();
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    fn error(&mut self, code: ErrorCode, message: String) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| TextRange::empty(TextSize::of(self.text)));
        trace!(code = code.as_str(), ?range, %message, "syntax error");
        let mut error = SyntaxError::builder(code)
            .message(message)
            .range(range)
            .severity(code.severity());
        if let Some(hint) = code.hint() {
            error = error.hint(hint);
        }
        self.errors.push(error.build());
    }

    fn push_context(&mut self, context: ParseContext) {
        self.contexts.push(context);
    }

    fn pop_context(&mut self) {
        self.contexts.pop();
    }

    fn context(&self) -> ParseContext {
        self.contexts.last().copied().unwrap_or(ParseContext::TopLevel)
    }

    fn try_reuse(&mut self) -> bool {
        self.reuse.is_some() && self.reuse_current()
    }
}
