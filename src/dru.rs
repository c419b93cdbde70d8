//! Custom design rules (`.kicad_dru`).
//!
//! The file is a bare sequence of forms starting with `(version ..)` rather
//! than a single list, so reading wraps it in an outer list and writing prints
//! the forms one after the other.

use std::fmt::Write;

use crate::document::Document;
use crate::emit::{close, Indent, Quoted};
use crate::error::{Error, Result};
use crate::form::{emit_all, Form};
use crate::sexpr::{self, Atom, SExpr};

/// One clause of a rule, `(constraint clearance (min "0.2mm"))`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
    /// `clearance`, `hole_size`, `track_width`, `disallow` ...
    pub kind: String,
    /// Arguments following the type, e.g. the item kinds of `disallow`
    pub elements: Vec<Atom>,
    pub min: Option<String>,
    pub opt: Option<String>,
    pub max: Option<String>,
}

impl Constraint {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }
}

impl Form for Constraint {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("constraint")?;
        let mut constraint = Constraint::new(sexpr.str_at(1)?);
        for item in args.iter().skip(1) {
            match item {
                SExpr::Atom(atom) => constraint.elements.push(atom.clone()),
                SExpr::List(_) => {
                    let slot = match item.head() {
                        Some("min") => &mut constraint.min,
                        Some("opt") => &mut constraint.opt,
                        Some("max") => &mut constraint.max,
                        _ => continue,
                    };
                    *slot = Some(item.str_at(1)?.to_owned());
                }
            }
        }
        Ok(constraint)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(constraint {}", Indent(indent), self.kind);
        for element in &self.elements {
            write!(out, " {}", element)?;
        }
        let limits = [("min", &self.min), ("opt", &self.opt), ("max", &self.max)];
        for (token, value) in limits {
            if let Some(value) = value {
                write!(out, " ({} {})", token, Quoted(value))?;
            }
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    pub name: String,
    pub constraints: Vec<Constraint>,
    pub condition: Option<String>,
    /// A layer name, or the bare `inner`/`outer` keywords
    pub layer: Option<Atom>,
    /// `error`, `warning`, `ignore` ...
    pub severity: Option<String>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Form for Rule {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("rule")?;
        let mut rule = Rule::new(sexpr.str_at(1)?);
        for item in args.iter().skip(1) {
            match item.head() {
                Some("constraint") => rule.constraints.push(Constraint::from_tree(item)?),
                Some("condition") => rule.condition = Some(item.str_at(1)?.to_owned()),
                Some("layer") => rule.layer = Some(item.atom_at(1)?.clone()),
                Some("severity") => rule.severity = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(rule)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(rule {}\n", pad, Quoted(&self.name));
        if let Some(layer) = &self.layer {
            writeln!(out, "{}  (layer {})", pad, layer)?;
        }
        emit_all(&mut out, &self.constraints, indent + 2)?;
        if let Some(condition) = &self.condition {
            writeln!(out, "{}  (condition {})", pad, Quoted(condition))?;
        }
        if let Some(severity) = &self.severity {
            writeln!(out, "{}  (severity {})", pad, severity)?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignRules {
    pub version: u32,
    pub rules: Vec<Rule>,
}

impl DesignRules {
    pub fn create_new() -> Self {
        Self {
            version: 1,
            rules: Vec::new(),
        }
    }
}

impl Document for DesignRules {
    /// Takes the headless list produced by wrapping the file contents; its
    /// first form must be `(version ..)`.
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let items = match sexpr {
            SExpr::List(items) if sexpr.head().is_none() => items,
            _ => return Err(Error::wrong_form("(version ..) (rule ..) ...", sexpr.head())),
        };
        match items.first() {
            Some(first) if first.head() == Some("version") => {}
            first => return Err(Error::wrong_form("version", first.and_then(SExpr::head))),
        }
        let mut rules = DesignRules::create_new();
        for item in items {
            match item.head() {
                Some("version") => rules.version = item.parse_at(1)?,
                Some("rule") => rules.rules.push(Rule::from_tree(item)?),
                other => log::trace!("skipping ({} ...) in design rules", other.unwrap_or("?")),
            }
        }
        Ok(rules)
    }

    /// Wraps the text in an outer list; `#` comment lines are dropped first.
    fn from_str(text: &str) -> Result<Self> {
        let body: Vec<&str> = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .collect();
        Self::from_tree(&sexpr::parse(&format!("({})", body.join("\n")))?)
    }

    fn to_tree_string(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(version {})\n", Indent(indent), self.version);
        for rule in &self.rules {
            out.push('\n');
            out.push_str(&rule.emit(indent, true)?);
        }
        if !newline && out.ends_with('\n') {
            out.pop();
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn rule_with_quoted_limit() {
        let rules = DesignRules::from_str(
            r#"(version 20211014)(rule "R1" (layer "F.Cu") (constraint clearance (min "0.2mm")) (condition "A.NetClass == 'HV'"))"#,
        )
        .unwrap();
        assert_eq!(rules.version, 20211014);
        let text = rules.to_tree_string(0, true).unwrap();
        assert_eq!(
            text,
            "(version 20211014)\n\n(rule \"R1\"\n  (layer \"F.Cu\")\n  (constraint clearance (min \"0.2mm\"))\n  (condition \"A.NetClass == 'HV'\")\n)\n"
        );
        assert_eq!(DesignRules::from_str(&text).unwrap(), rules);
    }

    #[rstest]
    #[case("(constraint disallow via micro_via)")]
    #[case(r#"(constraint track_width (min "0.2mm") (opt "0.25mm") (max "1mm"))"#)]
    #[case(r#"(constraint hole_size (min "0.3mm"))"#)]
    fn constraints_round_trip(#[case] input: &str) {
        let constraint = Constraint::from_tree(&sexpr::parse(input).unwrap()).unwrap();
        assert_eq!(constraint.emit(0, false).unwrap(), input);
    }

    #[test]
    fn bare_limits_are_written_quoted() {
        let constraint =
            Constraint::from_tree(&sexpr::parse("(constraint clearance (min 0.5mm))").unwrap())
                .unwrap();
        assert_eq!(
            constraint.emit(0, false).unwrap(),
            r#"(constraint clearance (min "0.5mm"))"#
        );
    }

    #[test]
    fn comment_lines_are_skipped() {
        let text = "(version 1)\n# keep (HV) nets apart\n(rule \"HV\"\n  (constraint clearance (min \"1.5mm\"))\n  (condition \"A.NetClass == 'HV'\")\n)\n";
        let rules = DesignRules::from_str(text).unwrap();
        assert_eq!(rules.rules.len(), 1);
        assert_eq!(rules.rules[0].constraints[0].min.as_deref(), Some("1.5mm"));
    }

    #[test]
    fn blank_rules_carry_version() {
        let rules = DesignRules::create_new();
        assert_eq!(rules.to_tree_string(0, true).unwrap(), "(version 1)\n");
        assert_eq!(DesignRules::from_str("(version 1)\n").unwrap(), rules);
    }

    #[test]
    fn quoted_arguments_stay_whole() {
        let rules = DesignRules::from_str(
            r#"(version 1) (rule "x" (constraint assertion "A.NetClass == 'HV'"))"#,
        )
        .unwrap();
        let constraint = &rules.rules[0].constraints[0];
        assert_eq!(constraint.elements, vec![Atom::quoted("A.NetClass == 'HV'")]);

        let text = rules.to_tree_string(0, true).unwrap();
        assert!(text.contains(r#"(constraint assertion "A.NetClass == 'HV'")"#));
        assert_eq!(DesignRules::from_str(&text).unwrap(), rules);
    }

    #[rstest]
    #[case("(layer inner)", Atom::bare("inner"))]
    #[case("(layer outer)", Atom::bare("outer"))]
    #[case(r#"(layer "F.Cu")"#, Atom::quoted("F.Cu"))]
    fn layer_keywords_keep_their_spelling(#[case] layer: &str, #[case] expected: Atom) {
        let text = format!(
            "(version 1)\n(rule \"x\" {} (constraint track_width (min \"0.2mm\")))",
            layer
        );
        let rules = DesignRules::from_str(&text).unwrap();
        assert_eq!(rules.rules[0].layer, Some(expected));

        let emitted = rules.to_tree_string(0, true).unwrap();
        assert!(emitted.contains(&format!("  {}\n", layer)));
        assert_eq!(DesignRules::from_str(&emitted).unwrap(), rules);
    }

    #[rstest]
    #[case("()")]
    #[case(r#"((rule "x" (constraint clearance (min "0.2mm"))))"#)]
    #[case(r#"((rule "x") (version 1))"#)]
    fn rules_start_with_a_version(#[case] input: &str) {
        let tree = sexpr::parse(input).unwrap();
        assert!(matches!(
            DesignRules::from_tree(&tree),
            Err(Error::WrongForm { .. })
        ));
    }

    #[test]
    fn rules_need_a_headless_list() {
        let tree = sexpr::parse("(rule \"x\")").unwrap();
        assert!(matches!(
            DesignRules::from_tree(&tree),
            Err(Error::WrongForm { .. })
        ));
    }
}
