use std::iter::Peekable;

use crate::error::{Error, Result};

use super::{
    lexer::{unescape, Token, TokenIter, TokenKind},
    Atom, SExpr,
};

pub(super) struct Parser<'a> {
    input: &'a str,
    iter: Peekable<TokenIter<'a>>,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            input,
            iter: TokenIter::new(input).peekable(),
        }
    }

    fn get(&mut self) -> Result<Token> {
        let Some(tok) = self.iter.next() else {
            return Err(Error::UnexpectedEof {
                at: self.input.len(),
            });
        };
        Ok(tok)
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.iter.peek().map(|tok| tok.kind)
    }

    fn error_at(&self, tok: &Token) -> Error {
        let at = tok.span.start;
        match tok.kind {
            TokenKind::RParen => Error::UnbalancedParen { at },
            TokenKind::Error if self.input[tok.span.clone()].starts_with('"') => {
                Error::UnterminatedString { at }
            }
            _ => Error::UnexpectedToken { at },
        }
    }

    fn atom(&self, tok: &Token) -> SExpr {
        let text = &self.input[tok.span.clone()];
        match tok.kind {
            TokenKind::QuotedString => SExpr::Atom(Atom {
                value: unescape(&text[1..text.len() - 1]),
                quoted: true,
            }),
            _ => SExpr::Atom(Atom {
                value: text.to_owned(),
                quoted: false,
            }),
        }
    }

    /// Parse one list, the opening paren having been consumed at `open`.
    fn parse_list(&mut self, open: usize) -> Result<SExpr> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => break Err(Error::UnclosedParen { at: open }),
                Some(TokenKind::RParen) => {
                    self.get()?;
                    break Ok(SExpr::List(items));
                }
                Some(TokenKind::LParen) => {
                    let tok = self.get()?;
                    items.push(self.parse_list(tok.span.start)?);
                }
                Some(TokenKind::Atom) | Some(TokenKind::QuotedString) => {
                    let tok = self.get()?;
                    items.push(self.atom(&tok));
                }
                Some(TokenKind::Error) => {
                    let tok = self.get()?;
                    break Err(self.error_at(&tok));
                }
            }
        }
    }

    /// Parse the single outermost list; anything after it is an error.
    pub(super) fn parse_root(&mut self) -> Result<SExpr> {
        let tok = self.get()?;
        if tok.kind != TokenKind::LParen {
            return Err(self.error_at(&tok));
        }
        let root = self.parse_list(tok.span.start)?;
        if let Some(tok) = self.iter.next() {
            return Err(self.error_at(&tok));
        }
        Ok(root)
    }
}

/// Parse KiCad S-expression text into its outermost list.
pub fn parse(input: &str) -> Result<SExpr> {
    Parser::new(input).parse_root()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("(abc)", "(abc)")]
    #[case("(abc\n)", "(abc)")]
    #[case("(a \"b c\" (d 1.5))", "(a \"b c\" (d 1.5))")]
    #[case("  (a\t(b)(c))  \n", "(a (b) (c))")]
    #[case("()", "()")]
    fn can_parse_sexpr(#[case] input: &str, #[case] expected: &str) {
        let sexpr = parse(input).unwrap();
        assert_eq!(&format!("{sexpr}"), expected);
    }

    #[test]
    fn quoted_and_bare_atoms_are_distinguished() {
        let sexpr = parse(r#"(layer "F.Cu" F.Cu)"#).unwrap();
        let args = sexpr.args();
        assert_eq!(
            args[0],
            SExpr::Atom(Atom {
                value: "F.Cu".into(),
                quoted: true
            })
        );
        assert_eq!(
            args[1],
            SExpr::Atom(Atom {
                value: "F.Cu".into(),
                quoted: false
            })
        );
    }

    #[test]
    fn escapes_are_resolved() {
        let sexpr = parse(r#"(text "say \"hi\" \\o/")"#).unwrap();
        assert_eq!(sexpr.str_at(1).unwrap(), r#"say "hi" \o/"#);
    }

    #[test]
    fn nesting_is_unbounded() {
        let depth = 200;
        let input = format!("{}{}", "(a ".repeat(depth), ")".repeat(depth));
        let mut node = &parse(&input).unwrap();
        for _ in 1..depth {
            node = &node.args()[0];
        }
        assert_eq!(node.head(), Some("a"));
    }

    #[rstest]
    #[case("(a (b)", 0)]
    #[case("(a (b (c)", 3)]
    fn unclosed_paren_reports_offset(#[case] input: &str, #[case] offset: usize) {
        match parse(input) {
            Err(Error::UnclosedParen { at }) => assert_eq!(at, offset),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn extra_close_paren_is_unbalanced() {
        assert!(matches!(
            parse("(a))"),
            Err(Error::UnbalancedParen { at: 3 })
        ));
    }

    #[test]
    fn unterminated_string_reports_offset() {
        assert!(matches!(
            parse("(a \"open)"),
            Err(Error::UnterminatedString { at: 3 })
        ));
    }

    #[test]
    fn empty_input_is_eof() {
        assert!(matches!(parse("  "), Err(Error::UnexpectedEof { .. })));
    }
}
