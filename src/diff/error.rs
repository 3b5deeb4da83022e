//! Error types for the diff engine.

use thiserror::Error;

use crate::base::ParseOptions;

/// Errors returned by [`crate::update`] and [`crate::DiffParser`].
///
/// Malformed source text is never an error; it shows up as syntax errors
/// on the returned module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The session was produced under different parse options.
    #[error("session was parsed with {found:?}, parser is configured with {expected:?}")]
    OptionsMismatch {
        expected: ParseOptions,
        found: ParseOptions,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
