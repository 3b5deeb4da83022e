//! Parser error handling module
//!
//! Errors never abort a parse. Each one is recorded next to the tree and
//! the offending source is kept in an `ERROR_NODE` so the text still
//! round-trips.
//! - Categorized error codes for filtering and documentation
//! - Context-aware error messages ("in argument list", "in class body")
//! - Hints for common indentation mistakes

mod codes;
mod context;
mod error;

pub use codes::ErrorCode;
pub use context::ParseContext;
pub use error::{Severity, SyntaxError, SyntaxErrorBuilder};

#[cfg(test)]
mod tests;
