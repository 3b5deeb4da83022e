//! # arbor
//!
//! Lossless, error-tolerant and incremental parser core for an
//! indentation-sensitive, Python-like scripting language.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! diff      → Sessions, block splitting, line diff, parse/update
//!   ↓
//! syntax    → Module, Node/Leaf, name index
//!   ↓
//! parser    → Logos lexer, tokenizer, recursive-descent parser, AST views
//!   ↓
//! base      → Primitives (TextRange, LineIndex, Position, ParseOptions)
//! ```
//!
//! ## Usage
//!
//! ```
//! let (module, session) = arbor::parse("def f(x):\n    return x\n");
//! assert_eq!(module.serialize(), "def f(x):\n    return x\n");
//! assert_eq!(module.used_names().get("x").map(|leaves| leaves.len()), Some(2));
//!
//! let (module, _) = arbor::update(session, "def f(x):\n    return x + 1\n").unwrap();
//! assert!(module.errors().is_empty());
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → diff)
// ============================================================================

/// Foundation types: TextRange, LineIndex, Position, ParseOptions
pub mod base;

/// Parser: Logos lexer, tokenizer, recursive-descent parser, AST views
pub mod parser;

/// Syntax: read-only tree model and name index
pub mod syntax;

/// Diff: incremental parsing sessions
pub mod diff;

// Re-export foundation types
pub use base::{LineIndex, ParseOptions, Position, Span, TextRange, TextSize};

// Re-export the tree model and entry points
pub use diff::{DiffParser, DiffStats, Error, Result, Session, parse, parse_all, update};
pub use parser::{ErrorCode, Severity, SyntaxError, SyntaxKind};
pub use syntax::{Leaf, Module, Node, UsedNames};
