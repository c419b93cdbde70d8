//! Formatting primitives for KiCad-style output.

use std::fmt::{Display, Formatter};

use crate::strings::escape;

/// Leading whitespace of `n` spaces
#[derive(Clone, Copy, Debug)]
pub struct Indent(pub usize);

impl Display for Indent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:width$}", "", width = self.0)
    }
}

/// A number the way KiCad prints it: integral values without a decimal point,
/// everything else in shortest round-trip form.
#[derive(Clone, Copy, Debug)]
pub struct Num(pub f64);

impl Display for Num {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let v = self.0;
        if v.fract() == 0.0 && v.abs() < 1e15 {
            write!(f, "{}", v as i64)
        } else {
            write!(f, "{}", v)
        }
    }
}

/// A quoted and escaped string atom
#[derive(Clone, Copy, Debug)]
pub struct Quoted<'a>(pub &'a str);

impl<'a> Display for Quoted<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", escape(self.0))
    }
}

/// A keyword-like atom, bare unless it would not survive re-reading bare.
#[derive(Clone, Copy, Debug)]
pub struct Token<'a>(pub &'a str);

impl<'a> Display for Token<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let bare = !self.0.is_empty()
            && !self
                .0
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"'));
        if bare {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{}", Quoted(self.0))
        }
    }
}

/// Close a form, optionally ending the line.
pub(crate) fn close(out: &mut String, newline: bool) {
    out.push(')');
    if newline {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(0.0, "0")]
    #[case(1.0, "1")]
    #[case(-2.0, "-2")]
    #[case(1.5, "1.5")]
    #[case(0.1, "0.1")]
    #[case(-0.0508, "-0.0508")]
    #[case(20211014.0, "20211014")]
    #[case(0.0000001, "0.0000001")]
    fn numbers_print_like_kicad(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(Num(value).to_string(), expected);
    }

    #[rstest]
    #[case("F.Cu", "F.Cu")]
    #[case("pcbnew", "pcbnew")]
    #[case("", "\"\"")]
    #[case("two words", "\"two words\"")]
    #[case("a(b", "\"a(b\"")]
    fn tokens_are_bare_when_safe(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(Token(value).to_string(), expected);
    }

    #[test]
    fn quoted_escapes() {
        assert_eq!(Quoted(r#"a "b""#).to_string(), r#""a \"b\"""#);
        assert_eq!(Indent(4).to_string(), "    ");
    }
}
