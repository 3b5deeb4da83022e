//! Parse sessions: everything an `update` needs from the previous parse

use std::sync::Arc;

use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::blocks::BlockKind;
use super::stats::DiffStats;
use crate::base::{ParseOptions, TextRange, TextSize};
use crate::parser::{GreenElement, SyntaxError, SyntaxKind, TreeBuilder};
use crate::syntax::Module;

/// A top-level block of the last parse
#[derive(Debug, Clone)]
pub struct Block {
    pub(crate) range: TextRange,
    pub(crate) first_line: usize,
    pub(crate) line_count: usize,
    pub(crate) kind: BlockKind,
    /// Module-level children the block contributed, trivia included
    pub(crate) children: Vec<GreenElement>,
    /// Syntax errors relative to the block start
    pub(crate) errors: Vec<SyntaxError>,
    pub(crate) clean_end: bool,
}

impl Block {
    /// Byte span in the session text
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// 1-indexed first line
    pub fn start_line(&self) -> usize {
        self.first_line + 1
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn children(&self) -> &[GreenElement] {
        &self.children
    }

    /// Syntax errors with ranges relative to the block start
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Whether the block provably ends at a top-level statement boundary
    pub fn is_clean_end(&self) -> bool {
        self.clean_end
    }
}

/// The state kept between edits of one text.
///
/// Sessions are immutable: every `update` consumes one and returns a new
/// one. They hold no thread-bound tree cursors, so they can be sent to and
/// shared between threads; build a [`Module`] to walk the tree.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) text: Arc<str>,
    pub(crate) green: GreenNode,
    pub(crate) errors: Vec<SyntaxError>,
    pub(crate) blocks: Vec<Block>,
    pub(crate) options: ParseOptions,
    pub(crate) stats: DiffStats,
}

impl Session {
    /// Join block children into one module tree
    pub(crate) fn assemble(text: &str, blocks: Vec<Block>, options: ParseOptions, stats: DiffStats) -> Self {
        let mut builder = TreeBuilder::new();
        builder.start_node(SyntaxKind::MODULE);
        for block in &blocks {
            for child in &block.children {
                builder.push(child.clone());
            }
        }
        builder.push(NodeOrToken::Token(GreenToken::new(SyntaxKind::ENDMARKER.into(), "")));
        builder.finish_node();
        let green = builder.finish();

        let errors = blocks
            .iter()
            .flat_map(|block| {
                let start = block.range.start();
                block.errors.iter().map(move |e| e.clone().shifted(start))
            })
            .collect();

        debug_assert_eq!(green.text_len(), TextSize::of(text));
        Self {
            text: Arc::from(text),
            green,
            errors,
            blocks,
            options,
            stats,
        }
    }

    /// A fresh tree view of this session
    pub fn module(&self) -> Module {
        Module::with_text(&self.text, self.green.clone(), self.errors.clone())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Syntax errors in document coordinates
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// What the parse that produced this session did
    pub fn stats(&self) -> &DiffStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_session_is_send_and_sync() {
        assert_send_sync::<Session>();
        assert_send_sync::<Block>();
    }

    #[test]
    fn test_assemble_empty() {
        let session = Session::assemble("", Vec::new(), ParseOptions::default(), DiffStats::default());
        assert_eq!(session.text(), "");
        assert_eq!(session.green().children().count(), 1);
        assert!(session.errors().is_empty());
        assert_eq!(session.module().serialize(), "");
    }
}
