//! Incremental diff parsing
//!
//! A text is cut into top-level blocks with a line heuristic and each block
//! is parsed on its own. On `update` the old and new texts are diffed by
//! line; blocks whose lines did not change are taken over from the previous
//! session, the rest are reparsed with unchanged nested definitions spliced
//! back in.
//!
//! ```text
//! new text ──split_blocks──► spans ──LineDiff vs old──► plan
//!                                                        │
//!              reuse old block ◄── unchanged ────────────┤
//!              reparse region  ◄── changed (+ cursor) ───┘
//!                    │ end not a statement boundary?
//!                    └──► merge with next span (miss)
//! ```
//!
//! The assembled tree always equals what a fresh parse of the new text
//! gives; reuse only saves work.

mod blocks;
mod cursor;
mod engine;
mod error;
mod lines;
mod session;
mod stats;

pub use blocks::{BlockKind, BlockSpan, split_blocks};
pub use cursor::ReuseCursor;
pub use engine::DiffParser;
pub use error::{Error, Result};
pub use lines::{LineDiff, Lines};
pub use session::{Block, Session};
pub use stats::DiffStats;

use crate::syntax::Module;

/// Parse `text` with default options
pub fn parse(text: &str) -> (Module, Session) {
    DiffParser::default().parse(text)
}

/// Update `session` to `new_text` under the options it was parsed with
pub fn update(session: Session, new_text: &str) -> Result<(Module, Session)> {
    DiffParser::new(session.options).update(session, new_text)
}

/// Parse independent texts in parallel with default options
pub fn parse_all<S: AsRef<str> + Sync>(texts: &[S]) -> Vec<Session> {
    DiffParser::default().parse_all(texts)
}
