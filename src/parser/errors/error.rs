//! Syntax error types
//!
//! Provides:
//! - Error codes for categorization
//! - Severity levels
//! - Hints/suggestions for fixes
//! - Offset shifting so errors recorded against a sub-parse can be moved
//!   into the coordinates of the whole document

use rowan::{TextRange, TextSize};

use super::codes::ErrorCode;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// A hard error that prevents valid parsing
    #[default]
    Error,
    /// A warning that doesn't prevent parsing
    Warning,
}

impl Severity {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// A syntax error recorded during parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable error message
    pub message: String,
    /// Source location
    pub range: TextRange,
    /// Categorized error code
    pub code: ErrorCode,
    /// Error severity
    pub severity: Severity,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
}

impl SyntaxError {
    /// Create a new syntax error with minimal information
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            severity: Severity::Error,
            hint: None,
        }
    }

    /// Create a builder for more complex error construction
    pub fn builder(code: ErrorCode) -> SyntaxErrorBuilder {
        SyntaxErrorBuilder::new(code)
    }

    /// Move the error forward by `by` bytes
    pub fn shifted(mut self, by: TextSize) -> Self {
        self.range += by;
        self
    }
}

/// Builder for creating complex syntax errors
pub struct SyntaxErrorBuilder {
    code: ErrorCode,
    message: Option<String>,
    range: Option<TextRange>,
    severity: Severity,
    hint: Option<String>,
}

impl SyntaxErrorBuilder {
    /// Create a new builder with an error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            range: None,
            severity: Severity::Error,
            hint: None,
        }
    }

    /// Set the error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the source range
    pub fn range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Set the severity
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Add a hint
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Build the syntax error, falling back to the code's default message
    pub fn build(self) -> SyntaxError {
        let message = self.message.unwrap_or_else(|| self.code.default_message().to_string());
        let range = self.range.unwrap_or_else(|| TextRange::empty(TextSize::new(0)));
        SyntaxError {
            severity: self.severity,
            hint: self.hint,
            ..SyntaxError::new(message, range, self.code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ParseOptions;
    use crate::parser::parse_text;

    #[test]
    fn test_syntax_error_new() {
        let err = SyntaxError::new(
            "expected ':'",
            TextRange::new(TextSize::new(10), TextSize::new(11)),
            ErrorCode::E0303,
        );

        assert_eq!(err.message, "expected ':'");
        assert_eq!(err.code, ErrorCode::E0303);
        assert_eq!(err.severity, Severity::Error);
        assert!(err.hint.is_none());
    }

    #[test]
    fn test_syntax_error_builder() {
        let err = SyntaxError::builder(ErrorCode::E0203)
            .message("expected an indented block after 'def'")
            .range(TextRange::new(TextSize::new(10), TextSize::new(15)))
            .hint("indent the function body")
            .severity(Severity::Error)
            .build();

        assert_eq!(err.message, "expected an indented block after 'def'");
        assert_eq!(err.code, ErrorCode::E0203);
        assert_eq!(err.hint.as_deref(), Some("indent the function body"));
    }

    #[test]
    fn test_syntax_error_builder_defaults() {
        let err = SyntaxError::builder(ErrorCode::E0205).build();

        assert_eq!(err.message, "unindent does not match any outer indentation level");
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.range, TextRange::empty(TextSize::new(0)));
    }

    #[test]
    fn test_shifted() {
        let err = SyntaxError::new(
            "unexpected token",
            TextRange::new(TextSize::new(2), TextSize::new(5)),
            ErrorCode::E0901,
        )
        .shifted(TextSize::new(100));

        assert_eq!(err.range, TextRange::new(TextSize::new(102), TextSize::new(105)));
    }

    #[test]
    fn test_severity() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
    }

    #[test]
    fn test_parser_errors_carry_hints() {
        let parse = parse_text("def f():\ndef g():\n    pass\n", &ParseOptions::default());
        let missing_body = parse.errors.iter().find(|e| e.code == ErrorCode::E0203);
        assert_eq!(
            missing_body.and_then(|e| e.hint.as_deref()),
            ErrorCode::E0203.hint()
        );
        assert_eq!(missing_body.map(|e| e.severity), Some(Severity::Error));
    }

    #[test]
    fn test_inconsistent_dedent_is_a_warning() {
        let parse = parse_text("if a:\n        b\n    c\n", &ParseOptions::default());
        let dedent = parse.errors.iter().find(|e| e.code == ErrorCode::E0205);
        assert_eq!(dedent.map(|e| e.severity), Some(Severity::Warning));
        assert!(dedent.is_some_and(|e| e.hint.is_some()));
    }
}
