//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens)
//! - E02xx: Layout errors (indentation, line ends, brackets)
//! - E03xx: Statement errors
//! - E04xx: Expression errors
//! - E09xx: Generic/fallback errors

use std::fmt;

use super::error::Severity;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Character sequence that starts no token
    E0101,
    /// Single-quoted string literal not closed on its line
    E0102,

    // =========================================================================
    // E02xx: Layout errors
    // =========================================================================
    /// Bracket still open at the end of a logical line
    E0201,
    /// Closing bracket without an opener
    E0202,
    /// Compound statement header without an indented block
    E0203,
    /// Indented line where no block may start
    E0204,
    /// Dedent to a column that matches no outer level
    E0205,
    /// Statement not terminated by a line end
    E0206,

    // =========================================================================
    // E03xx: Statement errors
    // =========================================================================
    /// Missing identifier
    E0301,
    /// Token cannot start a statement
    E0302,
    /// Missing `:` after a compound statement header
    E0303,
    /// `try` without `except` or `finally`
    E0304,
    /// Decorator not followed by `def` or `class`
    E0305,
    /// Malformed import
    E0306,

    // =========================================================================
    // E04xx: Expression errors
    // =========================================================================
    /// Expected an expression
    E0401,
    /// Operator without a right operand
    E0402,
    /// Invalid argument in a call
    E0403,
    /// Invalid parameter in a definition
    E0404,

    // =========================================================================
    // E09xx: Generic/fallback errors
    // =========================================================================
    /// Unexpected token in current context
    E0901,
    /// Expected a specific token
    E0902,
    /// Internal parser error
    E0999,
}

impl ErrorCode {
    /// Every code, in declaration order
    pub const ALL: [ErrorCode; 21] = [
        Self::E0101,
        Self::E0102,
        Self::E0201,
        Self::E0202,
        Self::E0203,
        Self::E0204,
        Self::E0205,
        Self::E0206,
        Self::E0301,
        Self::E0302,
        Self::E0303,
        Self::E0304,
        Self::E0305,
        Self::E0306,
        Self::E0401,
        Self::E0402,
        Self::E0403,
        Self::E0404,
        Self::E0901,
        Self::E0902,
        Self::E0999,
    ];

    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0205 => "E0205",
            Self::E0206 => "E0206",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0304 => "E0304",
            Self::E0305 => "E0305",
            Self::E0306 => "E0306",
            Self::E0401 => "E0401",
            Self::E0402 => "E0402",
            Self::E0403 => "E0403",
            Self::E0404 => "E0404",
            Self::E0901 => "E0901",
            Self::E0902 => "E0902",
            Self::E0999 => "E0999",
        }
    }

    /// Get a short description of the error category
    pub fn category(&self) -> &'static str {
        match self {
            Self::E0101 | Self::E0102 => "lexical error",
            Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204 | Self::E0205 | Self::E0206 => "layout error",
            Self::E0301 | Self::E0302 | Self::E0303 | Self::E0304 | Self::E0305 | Self::E0306 => "statement error",
            Self::E0401 | Self::E0402 | Self::E0403 | Self::E0404 => "expression error",
            Self::E0901 | Self::E0902 | Self::E0999 => "syntax error",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated string literal",
            Self::E0201 => "unclosed bracket",
            Self::E0202 => "unexpected closing bracket",
            Self::E0203 => "expected an indented block",
            Self::E0204 => "unexpected indent",
            Self::E0205 => "unindent does not match any outer indentation level",
            Self::E0206 => "expected end of line",
            Self::E0301 => "missing identifier",
            Self::E0302 => "invalid statement",
            Self::E0303 => "expected ':'",
            Self::E0304 => "expected 'except' or 'finally' block",
            Self::E0305 => "decorator must precede a function or class",
            Self::E0306 => "invalid import",
            Self::E0401 => "expected expression",
            Self::E0402 => "missing operand",
            Self::E0403 => "invalid argument",
            Self::E0404 => "invalid parameter",
            Self::E0901 => "unexpected token",
            Self::E0902 => "expected token",
            Self::E0999 => "internal parser error",
        }
    }

    /// A suggestion attached to every error with this code
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::E0102 => Some("close the string on the same line or use a triple-quoted string"),
            Self::E0201 => Some("add the missing closing bracket"),
            Self::E0203 => Some("indent the body under the header, or write `pass`"),
            Self::E0204 => Some("remove the extra indentation"),
            Self::E0205 => Some("align the line with an enclosing block"),
            Self::E0304 => Some("add an `except` or `finally` clause"),
            Self::E0305 => Some("put a `def` or `class` right after the decorators"),
            _ => None,
        }
    }

    /// Severity of errors with this code
    ///
    /// After a dedent between two levels the tokenizer adopts the new column
    /// as the current level, so the statements around it keep their shape.
    pub fn severity(&self) -> Severity {
        match self {
            Self::E0205 => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::E0201.as_str(), "E0201");
        assert_eq!(ErrorCode::E0901.as_str(), "E0901");
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::E0204), "E0204");
    }

    #[test]
    fn test_error_code_default_message() {
        assert_eq!(ErrorCode::E0204.default_message(), "unexpected indent");
        assert_eq!(ErrorCode::E0203.default_message(), "expected an indented block");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::E0102.category(), "lexical error");
        assert_eq!(ErrorCode::E0205.category(), "layout error");
        assert_eq!(ErrorCode::E0303.category(), "statement error");
        assert_eq!(ErrorCode::E0401.category(), "expression error");
    }

    #[test]
    fn test_hints_and_severity() {
        assert!(ErrorCode::E0203.hint().is_some());
        assert!(ErrorCode::E0305.hint().is_some());
        assert_eq!(ErrorCode::E0401.hint(), None);
        assert_eq!(ErrorCode::E0205.severity(), Severity::Warning);
        assert_eq!(ErrorCode::E0203.severity(), Severity::Error);
    }
}
