//! Rowan-based parser for the indentation-sensitive source language
//!
//! This module provides a lossless, error-tolerant parser using:
//! - **logos** for fast raw lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! We build a lossless CST that preserves all whitespace and comments as
//! trivia tokens, then put typed views on top.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → raw tokens with SyntaxKind
//!     ↓
//! Tokenizer → logical-line tokens with prefixes, INDENT/DEDENT/ENDMARKER
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//! ```
//!
//! ## Incremental Reparsing
//!
//! Green nodes carry no absolute positions, so an unchanged statement from
//! an earlier tree can be spliced into a new one as-is. The parser asks a
//! [`ReuseSource`] for such a statement at every statement start and
//! resumes the tokenizer right after it (see `crate::diff`).

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
pub mod builder;
pub mod errors;
pub mod grammar;
mod lexer;
mod syntax_kind;
pub mod tokenizer;

pub use ast::{AstNode, AstToken, ClassDef, Decorated, Decorator, FuncDef, Name, Param, ParamKind, Parameters, Scope, SourceModule, Suite};
pub use builder::{GreenElement, TreeBuilder};
pub use errors::{ErrorCode, ParseContext, Severity, SyntaxError};
pub use lexer::{Lexer, RawToken, lex};
pub use parser::{Parse, ReuseCandidate, ReuseSource, parse_text, parse_with_reuse, split_prefix};
pub use syntax_kind::{ArborLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxNodeChildren, SyntaxToken};
pub use tokenizer::{Token, Tokenizer, TokenizerState, measure_indent, tokenize};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, GreenToken, TextRange, TextSize};
