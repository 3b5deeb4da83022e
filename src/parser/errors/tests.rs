//! Integration tests for the errors module

use super::*;
use crate::parser::SyntaxKind;
use rowan::{TextRange, TextSize};

#[test]
fn test_error_module_exports() {
    let _code = ErrorCode::E0204;
    let _severity = Severity::Error;
    let _context = ParseContext::TopLevel;

    let _err = SyntaxError::new("test error", TextRange::empty(TextSize::new(0)), ErrorCode::E0901);
}

#[test]
fn test_error_code_exhaustiveness() {
    for code in ErrorCode::ALL {
        assert!(!code.as_str().is_empty(), "code {:?} has empty as_str()", code);
        assert!(
            !code.default_message().is_empty(),
            "code {:?} has empty default_message()",
            code
        );
        assert!(
            !code.category().is_empty(),
            "code {:?} has empty category()",
            code
        );

        let s = code.as_str();
        assert!(s.starts_with('E'), "code {:?} doesn't start with E", code);
        assert_eq!(s.len(), 5, "code {:?} should be 5 chars", code);
        assert_eq!(format!("{:?}", code), s);
    }
}

#[test]
fn test_context_recovery_tokens_validity() {
    let contexts = [
        ParseContext::TopLevel,
        ParseContext::Block,
        ParseContext::ParameterList,
        ParseContext::ArgumentList,
        ParseContext::Subscript,
        ParseContext::Collection,
        ParseContext::Import,
        ParseContext::Expression,
    ];

    for ctx in contexts {
        let tokens = ctx.recovery_tokens();
        assert!(!tokens.is_empty(), "context {:?} has no recovery tokens", ctx);

        // Every context must stop at the end of input
        assert!(
            tokens.contains(&SyntaxKind::ENDMARKER),
            "context {:?} should recover at ENDMARKER",
            ctx
        );
    }
}

#[test]
fn test_error_severity_default() {
    let err = SyntaxError::new("test", TextRange::empty(TextSize::new(0)), ErrorCode::E0901);

    assert_eq!(err.severity, Severity::Error);
    assert!(err.severity.is_error());
}

#[test]
fn test_every_code_reports_with_its_own_severity() {
    for code in ErrorCode::ALL {
        let expected = if code == ErrorCode::E0205 { Severity::Warning } else { Severity::Error };
        assert_eq!(code.severity(), expected, "code {:?}", code);
    }
}
