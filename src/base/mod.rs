//! Foundation types for the arbor parser.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineIndex`] - Byte offset to line/column conversion
//! - [`Position`], [`Span`] - Line/column positions for tree nodes
//! - [`ParseOptions`] - Tokenizer and diff engine configuration
//!
//! This module has NO dependencies on other arbor modules.

mod options;
mod position;
mod span;

pub use options::ParseOptions;
pub use position::{Position, Span};
pub use span::{LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
