use logos::{Logos, SpannedIter};

pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) span: logos::Span,
}

pub(super) struct TokenIter<'a> {
    iter: SpannedIter<'a, LogosTokenKind>,
}

impl<'a> TokenIter<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            iter: LogosTokenKind::lexer(input).spanned(),
        }
    }
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let (kind, span) = match self.iter.next()? {
            (Ok(LogosTokenKind::LParen), span) => (TokenKind::LParen, span),
            (Ok(LogosTokenKind::RParen), span) => (TokenKind::RParen, span),
            (Ok(LogosTokenKind::QuotedString), span) => (TokenKind::QuotedString, span),
            (Ok(LogosTokenKind::Atom), span) => (TokenKind::Atom, span),
            (Ok(LogosTokenKind::WS), _) => unreachable!(),
            (Err(_), span) => (TokenKind::Error, span),
        };
        Some(Token { kind, span })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum TokenKind {
    LParen,
    RParen,
    /// Span includes the surrounding quotes
    QuotedString,
    Atom,
    Error,
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
enum LogosTokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[regex(r#""([^"\\]|\\.)*""#)]
    QuotedString,
    #[regex(r#"[^"() \t\r\f\n]+"#)]
    Atom,
    #[regex(r"[ \t\r\f\n]+", logos::skip)]
    WS,
}

/// Resolve `\"` and `\\` inside a quoted string body; any other backslash is literal.
pub(super) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn test() {
        let input = "(a \"b\" \"\" 1.5\n)";
        let it = TokenIter::new(input);
        let expected = vec![
            (TokenKind::LParen, "("),
            (TokenKind::Atom, "a"),
            (TokenKind::QuotedString, "\"b\""),
            (TokenKind::QuotedString, "\"\""),
            (TokenKind::Atom, "1.5"),
            (TokenKind::RParen, ")"),
        ];

        let result: Vec<_> = it.map(|token| (token.kind, &input[token.span])).collect();

        assert_eq!(result, expected);
    }

    #[test]
    fn escaped_quote_stays_inside_string() {
        let input = r#"("a \" b")"#;
        let kinds: Vec<_> = TokenIter::new(input).map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::LParen, TokenKind::QuotedString, TokenKind::RParen]
        );
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        let input = "(a \"open";
        let kinds: Vec<_> = TokenIter::new(input).map(|t| t.kind).collect();
        assert!(kinds.contains(&TokenKind::Error));
    }

    #[rstest]
    #[case(r#"plain"#, "plain")]
    #[case(r#"a \" b"#, "a \" b")]
    #[case(r#"back\\slash"#, "back\\slash")]
    #[case(r#"new\nline"#, "new\\nline")]
    fn unescape_resolves_quote_and_backslash(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(unescape(body), expected);
    }
}
