use std::fmt::{Display, Write};
use std::str::FromStr;

use crate::emit::{Indent, Quoted};
use crate::error::{Error, Result};

mod lexer;
mod parser;

pub use parser::parse;

/// A single token: bare (`F.Cu`, `0.15`, `locked`) or quoted (`"Net-(R1-Pad1)"`).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Atom {
    pub value: String,
    pub quoted: bool,
}

impl Atom {
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.quoted {
            write!(f, "{}", Quoted(&self.value))
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// Generic S-expression tree
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SExpr {
    Atom(Atom),
    List(Vec<SExpr>),
}

impl Display for SExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SExpr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            SExpr::Atom(atom) => write!(f, "{}", atom),
        }
    }
}

impl SExpr {
    pub fn bare(value: impl Into<String>) -> Self {
        SExpr::Atom(Atom::bare(value))
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        SExpr::Atom(Atom::quoted(value))
    }

    /// The text of an atom, `None` for lists
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(atom) => Some(&atom.value),
            SExpr::List(_) => None,
        }
    }

    /// The name of a form: the leading atom of a list
    pub fn head(&self) -> Option<&str> {
        match self {
            SExpr::List(items) => items.first().and_then(SExpr::as_atom),
            SExpr::Atom(_) => None,
        }
    }

    /// Everything after the head of a form
    pub fn args(&self) -> &[SExpr] {
        match self {
            SExpr::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    /// The arguments of this form if its head is `name`, a wrong-form error otherwise.
    pub fn expect_form(&self, name: &str) -> Result<&[SExpr]> {
        match self.head() {
            Some(head) if head == name => Ok(self.args()),
            head => Err(Error::wrong_form(name, head)),
        }
    }

    /// Like [`SExpr::expect_form`] for forms known under several names.
    pub fn expect_one_of(&self, names: &[&str]) -> Result<(&str, &[SExpr])> {
        match self.head() {
            Some(head) if names.contains(&head) => Ok((head, self.args())),
            head => Err(Error::wrong_form(&names.join("|"), head)),
        }
    }

    pub fn children<'b, 'c>(&'b self, label: &'c str) -> LabeledChildIterator<'b, 'c> {
        LabeledChildIterator {
            iter: self.args().iter(),
            label,
        }
    }

    pub fn child(&self, label: &str) -> Option<&SExpr> {
        self.children(label).next()
    }

    /// First argument of the first child form named `label`
    pub fn value(&self, label: &str) -> Option<&str> {
        self.child(label).and_then(|c| c.args().first()).and_then(SExpr::as_atom)
    }

    /// True if `flag` appears as a bare atom among the arguments
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args().iter().any(|item| item.as_atom() == Some(flag))
    }

    fn form_name(&self) -> String {
        self.head().unwrap_or("?").to_owned()
    }

    /// The atom at `index` of this list, counting the head as index 0
    pub fn atom_at(&self, index: usize) -> Result<&Atom> {
        let item = match self {
            SExpr::List(items) => items.get(index),
            SExpr::Atom(_) => None,
        };
        match item {
            Some(SExpr::Atom(atom)) => Ok(atom),
            _ => Err(Error::MissingValue {
                form: self.form_name(),
                index,
            }),
        }
    }

    pub fn str_at(&self, index: usize) -> Result<&str> {
        self.atom_at(index).map(|atom| atom.value.as_str())
    }

    pub fn opt_str_at(&self, index: usize) -> Option<&str> {
        match self {
            SExpr::List(items) => items.get(index).and_then(SExpr::as_atom),
            SExpr::Atom(_) => None,
        }
    }

    pub fn parse_at<T: FromStr>(&self, index: usize) -> Result<T> {
        let value = self.str_at(index)?;
        value.parse().map_err(|_| Error::InvalidNumber {
            form: self.form_name(),
            value: value.to_owned(),
        })
    }

    pub fn f64_at(&self, index: usize) -> Result<f64> {
        self.parse_at(index)
    }

    /// A trailing optional number; absent or non-numeric atoms give `None`.
    pub fn opt_f64_at(&self, index: usize) -> Option<f64> {
        self.opt_str_at(index).and_then(|s| s.parse().ok())
    }

    /// Multi-line rendering with two-space indentation per nesting level.
    pub fn pretty(&self, indent: usize) -> Result<String> {
        let mut out = String::new();
        self.write_pretty(&mut out, indent)?;
        Ok(out)
    }

    fn write_pretty(&self, out: &mut String, indent: usize) -> Result<()> {
        let SExpr::List(items) = self else {
            write!(out, "{}{}", Indent(indent), self)?;
            return Ok(());
        };
        let nested = items.iter().any(|item| matches!(item, SExpr::List(_)));
        if !nested {
            write!(out, "{}{}", Indent(indent), self)?;
            return Ok(());
        }
        write!(out, "{}(", Indent(indent))?;
        let mut first = true;
        for item in items {
            match item {
                SExpr::Atom(_) => {
                    if !first {
                        out.push(' ');
                    }
                    write!(out, "{}", item)?;
                }
                SExpr::List(_) => {
                    out.push('\n');
                    item.write_pretty(out, indent + 2)?;
                }
            }
            first = false;
        }
        write!(out, "\n{})", Indent(indent))?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct LabeledChildIterator<'b, 'c> {
    iter: std::slice::Iter<'b, SExpr>,
    label: &'c str,
}

impl<'b, 'c> Iterator for LabeledChildIterator<'b, 'c> {
    type Item = &'b SExpr;

    fn next(&mut self) -> Option<Self::Item> {
        let label = self.label;
        self.iter.by_ref().find(|item| item.head() == Some(label))
    }
}

impl TryFrom<&str> for SExpr {
    type Error = Error;

    fn try_from(input: &str) -> Result<Self> {
        parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_data {
        ($fname:expr) => {
            std::fs::read_to_string(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/resources/test/",
                $fname
            ))
            .unwrap()
        };
    }

    #[test]
    fn sexpr_can_parse_full_file() {
        let i = &test_data!("board.kicad_pcb");
        let root = SExpr::try_from(i.as_str()).unwrap();
        assert_eq!(root.head(), Some("kicad_pcb"));
    }

    #[test]
    fn sexpr_children_by_name_works() {
        let root = parse(r#"(a (b "1") (c "2") (b "3"))"#).unwrap();

        let mut iter = root.children("b");
        assert!(iter.next().is_some());
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert_eq!(root.value("c"), Some("2"));
    }

    #[test]
    fn expect_form_rejects_other_heads() {
        let root = parse("(net 1 \"GND\")").unwrap();
        assert!(root.expect_form("net").is_ok());
        assert!(matches!(
            root.expect_form("layer"),
            Err(Error::WrongForm { .. })
        ));
        assert!(matches!(
            SExpr::bare("net").expect_form("net"),
            Err(Error::WrongForm { .. })
        ));
    }

    #[test]
    fn typed_accessors() {
        let root = parse("(at 1.5 -2 90 locked)").unwrap();
        assert_eq!(root.f64_at(1).unwrap(), 1.5);
        assert_eq!(root.f64_at(2).unwrap(), -2.0);
        assert_eq!(root.opt_f64_at(3), Some(90.0));
        assert_eq!(root.opt_f64_at(4), None);
        assert!(root.has_flag("locked"));
        assert!(matches!(
            root.f64_at(4),
            Err(Error::InvalidNumber { .. })
        ));
        assert!(matches!(
            root.f64_at(9),
            Err(Error::MissingValue { index: 9, .. })
        ));
    }

    #[test]
    fn pretty_nests_lists() {
        let root = parse(r#"(a x (b 1) (c (d "e")))"#).unwrap();
        assert_eq!(
            root.pretty(0).unwrap(),
            "(a x\n  (b 1)\n  (c\n    (d \"e\")\n  )\n)"
        );
        assert_eq!(parse(&root.pretty(0).unwrap()).unwrap(), root);
    }
}
