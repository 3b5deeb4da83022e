//! Logos-based raw lexer
//!
//! Produces flat tokens, trivia included, with no notion of indentation or
//! logical lines. The [`Tokenizer`](super::tokenizer::Tokenizer) layers
//! indentation and prefix handling on top.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A raw token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl RawToken<'_> {
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }
}

/// Lexer wrapping the logos-generated tokenizer
#[derive(Clone)]
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::at(input, 0)
    }

    /// Start lexing `input` at byte `offset` (must be a char boundary)
    pub fn at(input: &'a str, offset: usize) -> Self {
        Self {
            inner: LogosToken::lexer(&input[offset..]),
            offset: offset as u32,
        }
    }

    fn produce(&mut self, token: Result<LogosToken, ()>) -> RawToken<'a> {
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset + self.inner.span().start as u32);
        let kind = match token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR_TOKEN,
        };
        RawToken { kind, text, offset }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = RawToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let mut token = self.produce(result);

        // Coalesce runs of unrecognised characters into one error token
        if result.is_err() {
            loop {
                let mut ahead = self.inner.clone();
                match ahead.next() {
                    Some(Err(())) => {
                        self.inner = ahead;
                        let end = self.inner.span().end;
                        let start = u32::from(token.offset) - self.offset;
                        token.text = &self.inner.source()[start as usize..end];
                    }
                    _ => break,
                }
            }
        }

        Some(token)
    }
}

/// Tokenize an entire string into a Vec
pub fn lex(input: &str) -> Vec<RawToken<'_>> {
    Lexer::new(input).collect()
}

/// Whether a string literal found its closing quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrEnd {
    Closed,
    Unterminated,
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\x0C]+")]
    Whitespace,

    #[regex(r"#[^\r\n]*")]
    Comment,

    #[regex(r"\r\n|\n|\r")]
    Newline,

    #[regex(r"\\(\r\n|\n|\r)")]
    LineContinuation,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*", lex_name)]
    Name,

    #[regex(r"[0-9][0-9_]*[jJ]?")]
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[oO][0-7_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?[jJ]?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?[jJ]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+[jJ]?")]
    Number,

    #[regex(r#"([rRuUfFbB]|[rR][bBfF]|[bBfF][rR])?["']"#, lex_string)]
    String(StrEnd),

    // =========================================================================
    // MULTI-CHARACTER OPERATORS
    // =========================================================================
    #[token("...")]
    Ellipsis,
    #[token("->")]
    Arrow,
    #[token(":=")]
    ColonEq,
    #[token("**=")]
    StarStarEq,
    #[token("//=")]
    SlashSlashEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("**")]
    StarStar,
    #[token("//")]
    SlashSlash,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("@=")]
    AtEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("False")]
    FalseKw,
    #[token("None")]
    NoneKw,
    #[token("True")]
    TrueKw,
    #[token("and")]
    AndKw,
    #[token("as")]
    AsKw,
    #[token("assert")]
    AssertKw,
    #[token("async")]
    AsyncKw,
    #[token("await")]
    AwaitKw,
    #[token("break")]
    BreakKw,
    #[token("class")]
    ClassKw,
    #[token("continue")]
    ContinueKw,
    #[token("def")]
    DefKw,
    #[token("del")]
    DelKw,
    #[token("elif")]
    ElifKw,
    #[token("else")]
    ElseKw,
    #[token("except")]
    ExceptKw,
    #[token("finally")]
    FinallyKw,
    #[token("for")]
    ForKw,
    #[token("from")]
    FromKw,
    #[token("global")]
    GlobalKw,
    #[token("if")]
    IfKw,
    #[token("import")]
    ImportKw,
    #[token("in")]
    InKw,
    #[token("is")]
    IsKw,
    #[token("lambda")]
    LambdaKw,
    #[token("nonlocal")]
    NonlocalKw,
    #[token("not")]
    NotKw,
    #[token("or")]
    OrKw,
    #[token("pass")]
    PassKw,
    #[token("raise")]
    RaiseKw,
    #[token("return")]
    ReturnKw,
    #[token("try")]
    TryKw,
    #[token("while")]
    WhileKw,
    #[token("with")]
    WithKw,
    #[token("yield")]
    YieldKw,
}

/// Reject identifiers whose non-ASCII characters fall outside UAX #31
fn lex_name(lex: &mut logos::Lexer<'_, LogosToken>) -> bool {
    let mut chars = lex.slice().chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || unicode_ident::is_xid_start(first)) && chars.all(unicode_ident::is_xid_continue)
}

/// Scan the body of a string literal whose prefix and opening quote were
/// matched by the regex. Contents are opaque: only escapes and the closing
/// quote matter.
fn lex_string(lex: &mut logos::Lexer<'_, LogosToken>) -> StrEnd {
    let quote = lex.slice().as_bytes()[lex.slice().len() - 1];
    let rest = lex.remainder().as_bytes();
    let triple = rest.len() >= 2 && rest[0] == quote && rest[1] == quote;

    let (len, end) = if triple {
        let (len, end) = scan_triple_quoted(&rest[2..], quote);
        (len + 2, end)
    } else {
        scan_single_quoted(rest, quote)
    };
    lex.bump(len);
    end
}

fn scan_single_quoted(rest: &[u8], quote: u8) -> (usize, StrEnd) {
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => {
                i += 1;
                if rest.get(i) == Some(&b'\r') && rest.get(i + 1) == Some(&b'\n') {
                    i += 2;
                } else if i < rest.len() {
                    i += 1;
                }
            }
            // A bare line break ends an unterminated literal; the break itself
            // stays outside so it can still end the logical line.
            b'\n' | b'\r' => return (i, StrEnd::Unterminated),
            b if b == quote => return (i + 1, StrEnd::Closed),
            _ => i += 1,
        }
    }
    (i, StrEnd::Unterminated)
}

fn scan_triple_quoted(rest: &[u8], quote: u8) -> (usize, StrEnd) {
    let mut i = 0;
    while i < rest.len() {
        if rest[i] == b'\\' {
            i = (i + 2).min(rest.len());
        } else if rest[i] == quote && rest.get(i + 1) == Some(&quote) && rest.get(i + 2) == Some(&quote) {
            return (i + 3, StrEnd::Closed);
        } else {
            i += 1;
        }
    }
    (rest.len(), StrEnd::Unterminated)
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            // Trivia
            Whitespace => SyntaxKind::WHITESPACE,
            Comment => SyntaxKind::COMMENT,
            Newline => SyntaxKind::NEWLINE,
            LineContinuation => SyntaxKind::LINE_CONTINUATION,

            // Literals
            Name => SyntaxKind::NAME,
            Number => SyntaxKind::NUMBER,
            String(StrEnd::Closed) => SyntaxKind::STRING,
            String(StrEnd::Unterminated) => SyntaxKind::ERROR_TOKEN,

            // Multi-char operators
            Ellipsis => SyntaxKind::ELLIPSIS,
            Arrow => SyntaxKind::ARROW,
            ColonEq => SyntaxKind::COLON_EQ,
            StarStarEq => SyntaxKind::STAR_STAR_EQ,
            SlashSlashEq => SyntaxKind::SLASH_SLASH_EQ,
            ShlEq => SyntaxKind::SHL_EQ,
            ShrEq => SyntaxKind::SHR_EQ,
            StarStar => SyntaxKind::STAR_STAR,
            SlashSlash => SyntaxKind::SLASH_SLASH,
            Shl => SyntaxKind::SHL,
            Shr => SyntaxKind::SHR,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,
            EqEq => SyntaxKind::EQ_EQ,
            NotEq => SyntaxKind::NOT_EQ,
            PlusEq => SyntaxKind::PLUS_EQ,
            MinusEq => SyntaxKind::MINUS_EQ,
            StarEq => SyntaxKind::STAR_EQ,
            SlashEq => SyntaxKind::SLASH_EQ,
            PercentEq => SyntaxKind::PERCENT_EQ,
            AtEq => SyntaxKind::AT_EQ,
            AmpEq => SyntaxKind::AMP_EQ,
            PipeEq => SyntaxKind::PIPE_EQ,
            CaretEq => SyntaxKind::CARET_EQ,

            // Single-char punctuation
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            LBrack => SyntaxKind::L_BRACK,
            RBrack => SyntaxKind::R_BRACK,
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            Colon => SyntaxKind::COLON,
            Comma => SyntaxKind::COMMA,
            Semi => SyntaxKind::SEMI,
            Dot => SyntaxKind::DOT,
            At => SyntaxKind::AT,
            Eq => SyntaxKind::EQ,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Star => SyntaxKind::STAR,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,
            Amp => SyntaxKind::AMP,
            Pipe => SyntaxKind::PIPE,
            Caret => SyntaxKind::CARET,
            Tilde => SyntaxKind::TILDE,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,

            // Keywords
            FalseKw => SyntaxKind::FALSE_KW,
            NoneKw => SyntaxKind::NONE_KW,
            TrueKw => SyntaxKind::TRUE_KW,
            AndKw => SyntaxKind::AND_KW,
            AsKw => SyntaxKind::AS_KW,
            AssertKw => SyntaxKind::ASSERT_KW,
            AsyncKw => SyntaxKind::ASYNC_KW,
            AwaitKw => SyntaxKind::AWAIT_KW,
            BreakKw => SyntaxKind::BREAK_KW,
            ClassKw => SyntaxKind::CLASS_KW,
            ContinueKw => SyntaxKind::CONTINUE_KW,
            DefKw => SyntaxKind::DEF_KW,
            DelKw => SyntaxKind::DEL_KW,
            ElifKw => SyntaxKind::ELIF_KW,
            ElseKw => SyntaxKind::ELSE_KW,
            ExceptKw => SyntaxKind::EXCEPT_KW,
            FinallyKw => SyntaxKind::FINALLY_KW,
            ForKw => SyntaxKind::FOR_KW,
            FromKw => SyntaxKind::FROM_KW,
            GlobalKw => SyntaxKind::GLOBAL_KW,
            IfKw => SyntaxKind::IF_KW,
            ImportKw => SyntaxKind::IMPORT_KW,
            InKw => SyntaxKind::IN_KW,
            IsKw => SyntaxKind::IS_KW,
            LambdaKw => SyntaxKind::LAMBDA_KW,
            NonlocalKw => SyntaxKind::NONLOCAL_KW,
            NotKw => SyntaxKind::NOT_KW,
            OrKw => SyntaxKind::OR_KW,
            PassKw => SyntaxKind::PASS_KW,
            RaiseKw => SyntaxKind::RAISE_KW,
            ReturnKw => SyntaxKind::RETURN_KW,
            TryKw => SyntaxKind::TRY_KW,
            WhileKw => SyntaxKind::WHILE_KW,
            WithKw => SyntaxKind::WITH_KW,
            YieldKw => SyntaxKind::YIELD_KW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        lex(input).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_def() {
        let tokens = lex("def f(): pass");
        assert_eq!(tokens[0].kind, SyntaxKind::DEF_KW);
        assert_eq!(tokens[1].kind, SyntaxKind::WHITESPACE);
        assert_eq!(tokens[2].kind, SyntaxKind::NAME);
        assert_eq!(tokens[2].text, "f");
        assert_eq!(tokens[3].kind, SyntaxKind::L_PAREN);
        assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::PASS_KW));
    }

    #[test]
    fn test_keyword_prefix_is_a_name() {
        assert_eq!(kinds("define"), vec![SyntaxKind::NAME]);
        assert_eq!(kinds("classes"), vec![SyntaxKind::NAME]);
        assert_eq!(kinds("None"), vec![SyntaxKind::NONE_KW]);
    }

    #[rstest]
    #[case("'abc'")]
    #[case("\"a(b\"")]
    #[case("r'\\d'")]
    #[case("b'x'")]
    #[case("Rb'x'")]
    #[case("f\"{x}\"")]
    #[case("'''a\n)\nb'''")]
    #[case("\"\"\"doc\"\"\"")]
    #[case("''")]
    #[case("'it\\'s'")]
    #[case("'line\\\ncontinued'")]
    fn test_lex_string(#[case] input: &str) {
        let tokens = lex(input);
        assert_eq!(tokens.len(), 1, "{tokens:?}");
        assert_eq!(tokens[0].kind, SyntaxKind::STRING);
        assert_eq!(tokens[0].text, input);
    }

    #[test]
    fn test_unterminated_single_quote_stops_at_line_end() {
        let tokens = lex("'abc\nx");
        assert_eq!(tokens[0].kind, SyntaxKind::ERROR_TOKEN);
        assert_eq!(tokens[0].text, "'abc");
        assert_eq!(tokens[1].kind, SyntaxKind::NEWLINE);
        assert_eq!(tokens[2].kind, SyntaxKind::NAME);
    }

    #[test]
    fn test_unterminated_triple_quote_runs_to_eof() {
        let tokens = lex("ur'''\n\ndef foo():\n    pass\n");
        assert_eq!(tokens[0].kind, SyntaxKind::NAME);
        assert_eq!(tokens[0].text, "ur");
        assert_eq!(tokens[1].kind, SyntaxKind::ERROR_TOKEN);
        assert_eq!(tokens.len(), 2);
    }

    #[rstest]
    #[case("42")]
    #[case("1_000")]
    #[case("0xFF")]
    #[case("0o17")]
    #[case("0b101")]
    #[case("3.14")]
    #[case("1.")]
    #[case(".5")]
    #[case("1e10")]
    #[case("2.5E-3")]
    #[case("3j")]
    fn test_lex_number(#[case] input: &str) {
        assert_eq!(kinds(input), vec![SyntaxKind::NUMBER]);
    }

    #[test]
    fn test_lex_operators() {
        assert_eq!(
            kinds("a **= b // c -> d := ..."),
            vec![
                SyntaxKind::NAME,
                SyntaxKind::WHITESPACE,
                SyntaxKind::STAR_STAR_EQ,
                SyntaxKind::WHITESPACE,
                SyntaxKind::NAME,
                SyntaxKind::WHITESPACE,
                SyntaxKind::SLASH_SLASH,
                SyntaxKind::WHITESPACE,
                SyntaxKind::NAME,
                SyntaxKind::WHITESPACE,
                SyntaxKind::ARROW,
                SyntaxKind::WHITESPACE,
                SyntaxKind::NAME,
                SyntaxKind::WHITESPACE,
                SyntaxKind::COLON_EQ,
                SyntaxKind::WHITESPACE,
                SyntaxKind::ELLIPSIS,
            ]
        );
    }

    #[test]
    fn test_line_endings_and_continuation() {
        assert_eq!(
            kinds("a\r\nb\rc\\\n"),
            vec![
                SyntaxKind::NAME,
                SyntaxKind::NEWLINE,
                SyntaxKind::NAME,
                SyntaxKind::NEWLINE,
                SyntaxKind::NAME,
                SyntaxKind::LINE_CONTINUATION,
            ]
        );
    }

    #[test]
    fn test_garbage_is_coalesced() {
        let tokens = lex("a $$? b");
        assert_eq!(tokens[2].kind, SyntaxKind::ERROR_TOKEN);
        assert_eq!(tokens[2].text, "$$?");
        assert_eq!(tokens[4].kind, SyntaxKind::NAME);
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(kinds("naïve"), vec![SyntaxKind::NAME]);
    }

    #[test]
    fn test_offsets_when_starting_mid_text() {
        let tokens: Vec<_> = Lexer::at("abc def", 4).collect();
        assert_eq!(tokens[0].kind, SyntaxKind::DEF_KW);
        assert_eq!(tokens[0].offset, TextSize::new(4));
    }
}
