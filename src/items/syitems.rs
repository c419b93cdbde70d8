//! Drawing primitives inside a schematic symbol unit.

use std::fmt::Write;

use crate::emit::{close, Indent, Num, Quoted};
use crate::error::{Error, Result};
use crate::form::Form;
use crate::items::common::{read_points, write_points, Effects, Fill, Position, Stroke};
use crate::sexpr::SExpr;

/// Symbol shapes use the shared fill descriptor: `(fill (type none|outline|background))`.
pub type SyFill = Fill;

/// Stroke and fill lines closing every symbol shape
fn write_style(out: &mut String, indent: usize, stroke: &Stroke, fill: &SyFill) -> Result<()> {
    out.push_str(&stroke.emit(indent, true)?);
    out.push_str(&fill.emit(indent, true)?);
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyArc {
    pub start: Position,
    pub mid: Position,
    pub end: Position,
    pub stroke: Stroke,
    pub fill: SyFill,
}

impl Default for SyArc {
    fn default() -> Self {
        Self {
            start: Position::default(),
            mid: Position::default(),
            end: Position::default(),
            stroke: Stroke::default(),
            fill: SyFill::none(),
        }
    }
}

impl Form for SyArc {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("arc")?;
        let mut arc = SyArc::default();
        for item in args {
            match item.head() {
                Some("start") => arc.start = Position::from_coords(item)?,
                Some("mid") => arc.mid = Position::from_coords(item)?,
                Some("end") => arc.end = Position::from_coords(item)?,
                Some("stroke") => arc.stroke = Stroke::from_tree(item)?,
                Some("fill") => arc.fill = SyFill::from_tree(item)?,
                _ => {}
            }
        }
        Ok(arc)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(arc {} {} {}\n",
            pad,
            self.start.emit_as("start"),
            self.mid.emit_as("mid"),
            self.end.emit_as("end")
        );
        write_style(&mut out, indent + 2, &self.stroke, &self.fill)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyCircle {
    pub center: Position,
    pub radius: f64,
    pub stroke: Stroke,
    pub fill: SyFill,
}

impl Default for SyCircle {
    fn default() -> Self {
        Self {
            center: Position::default(),
            radius: 0.0,
            stroke: Stroke::default(),
            fill: SyFill::none(),
        }
    }
}

impl Form for SyCircle {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("circle")?;
        let mut circle = SyCircle::default();
        for item in args {
            match item.head() {
                Some("center") => circle.center = Position::from_coords(item)?,
                Some("radius") => circle.radius = item.f64_at(1)?,
                Some("stroke") => circle.stroke = Stroke::from_tree(item)?,
                Some("fill") => circle.fill = SyFill::from_tree(item)?,
                _ => {}
            }
        }
        Ok(circle)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(circle {} (radius {})\n",
            pad,
            self.center.emit_as("center"),
            Num(self.radius)
        );
        write_style(&mut out, indent + 2, &self.stroke, &self.fill)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Bezier curve, written `(bezier (pts ..) ..)`
#[derive(Debug, Clone, PartialEq)]
pub struct SyCurve {
    pub points: Vec<Position>,
    pub stroke: Stroke,
    pub fill: SyFill,
}

impl Default for SyCurve {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            stroke: Stroke::default(),
            fill: SyFill::none(),
        }
    }
}

impl Form for SyCurve {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("bezier")?;
        let mut curve = SyCurve::default();
        for item in args {
            match item.head() {
                Some("pts") => curve.points = read_points(item)?,
                Some("stroke") => curve.stroke = Stroke::from_tree(item)?,
                Some("fill") => curve.fill = SyFill::from_tree(item)?,
                _ => {}
            }
        }
        Ok(curve)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(bezier\n", pad);
        write_points(&mut out, &self.points, indent + 2)?;
        write_style(&mut out, indent + 2, &self.stroke, &self.fill)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyPolyLine {
    pub points: Vec<Position>,
    pub stroke: Stroke,
    pub fill: SyFill,
}

impl Default for SyPolyLine {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            stroke: Stroke::default(),
            fill: SyFill::none(),
        }
    }
}

impl Form for SyPolyLine {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("polyline")?;
        let mut line = SyPolyLine::default();
        for item in args {
            match item.head() {
                Some("pts") => line.points = read_points(item)?,
                Some("stroke") => line.stroke = Stroke::from_tree(item)?,
                Some("fill") => line.fill = SyFill::from_tree(item)?,
                _ => {}
            }
        }
        Ok(line)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(polyline\n", pad);
        write_points(&mut out, &self.points, indent + 2)?;
        write_style(&mut out, indent + 2, &self.stroke, &self.fill)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyRect {
    pub start: Position,
    pub end: Position,
    pub stroke: Stroke,
    pub fill: SyFill,
}

impl Default for SyRect {
    fn default() -> Self {
        Self {
            start: Position::default(),
            end: Position::default(),
            stroke: Stroke::default(),
            fill: SyFill::none(),
        }
    }
}

impl Form for SyRect {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("rectangle")?;
        let mut rect = SyRect::default();
        for item in args {
            match item.head() {
                Some("start") => rect.start = Position::from_coords(item)?,
                Some("end") => rect.end = Position::from_coords(item)?,
                Some("stroke") => rect.stroke = Stroke::from_tree(item)?,
                Some("fill") => rect.fill = SyFill::from_tree(item)?,
                _ => {}
            }
        }
        Ok(rect)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(rectangle {} {}\n",
            pad,
            self.start.emit_as("start"),
            self.end.emit_as("end")
        );
        write_style(&mut out, indent + 2, &self.stroke, &self.fill)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyText {
    pub text: String,
    pub position: Position,
    pub effects: Effects,
}

impl Form for SyText {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("text")?;
        let mut text = SyText {
            text: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("at") => text.position = Position::from_tree(item)?,
                Some("effects") => text.effects = Effects::from_tree(item)?,
                _ => {}
            }
        }
        Ok(text)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(text {} {}\n",
            pad,
            Quoted(&self.text),
            self.position.emit_as("at")
        );
        out.push_str(&self.effects.emit(indent + 2, true)?);
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Any drawing primitive of a symbol unit
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolItem {
    Arc(SyArc),
    Circle(SyCircle),
    Curve(SyCurve),
    PolyLine(SyPolyLine),
    Rect(SyRect),
    Text(SyText),
}

impl SymbolItem {
    /// True if `head` names a symbol drawing primitive.
    pub fn is_symbol_item(head: &str) -> bool {
        matches!(
            head,
            "arc" | "circle" | "bezier" | "polyline" | "rectangle" | "text"
        )
    }
}

impl Form for SymbolItem {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        Ok(match sexpr.head() {
            Some("arc") => SymbolItem::Arc(SyArc::from_tree(sexpr)?),
            Some("circle") => SymbolItem::Circle(SyCircle::from_tree(sexpr)?),
            Some("bezier") => SymbolItem::Curve(SyCurve::from_tree(sexpr)?),
            Some("polyline") => SymbolItem::PolyLine(SyPolyLine::from_tree(sexpr)?),
            Some("rectangle") => SymbolItem::Rect(SyRect::from_tree(sexpr)?),
            Some("text") => SymbolItem::Text(SyText::from_tree(sexpr)?),
            head => {
                return Err(Error::wrong_form(
                    "arc|circle|bezier|polyline|rectangle|text",
                    head,
                ))
            }
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        match self {
            SymbolItem::Arc(item) => item.emit(indent, newline),
            SymbolItem::Circle(item) => item.emit(indent, newline),
            SymbolItem::Curve(item) => item.emit(indent, newline),
            SymbolItem::PolyLine(item) => item.emit(indent, newline),
            SymbolItem::Rect(item) => item.emit(indent, newline),
            SymbolItem::Text(item) => item.emit(indent, newline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse;
    use rstest::*;

    #[test]
    fn arc_writes_angle_only_on_mid() {
        let arc = SyArc {
            start: Position::new(0.0, 0.0),
            mid: Position::with_angle(1.0, 1.0, 45.0),
            end: Position::new(2.0, 0.0),
            stroke: Stroke::default(),
            fill: SyFill::none(),
        };
        let emitted = arc.emit(0, false).unwrap();
        assert_eq!(
            emitted,
            "(arc (start 0 0) (mid 1 1 45) (end 2 0)\n  (stroke (width 0) (type default))\n  (fill (type none))\n)"
        );
        assert_eq!(SyArc::from_tree(&parse(&emitted).unwrap()).unwrap(), arc);
    }

    #[test]
    fn polyline_points_one_per_line() {
        let line = SyPolyLine {
            points: vec![Position::new(-1.016, -0.762), Position::new(1.016, -0.762)],
            stroke: Stroke {
                width: 0.254,
                ..Default::default()
            },
            fill: SyFill::none(),
        };
        assert_eq!(
            line.emit(4, true).unwrap(),
            "    (polyline\n      (pts\n        (xy -1.016 -0.762)\n        (xy 1.016 -0.762)\n      )\n      (stroke (width 0.254) (type default))\n      (fill (type none))\n    )\n"
        );
    }

    #[rstest]
    #[case("(circle (center 0 0) (radius 2.54)\n  (stroke (width 0.254) (type default))\n  (fill (type background))\n)")]
    #[case("(rectangle (start -5.08 5.08) (end 5.08 -5.08)\n  (stroke (width 0.254) (type default))\n  (fill (type background))\n)")]
    #[case("(text \"A\" (at 0 1.27 0)\n  (effects (font (size 1.27 1.27)))\n)")]
    #[case("(bezier\n  (pts\n    (xy 0 0)\n    (xy 1 2)\n    (xy 2 2)\n    (xy 3 0)\n  )\n  (stroke (width 0) (type default))\n  (fill (type none))\n)")]
    fn symbol_items_round_trip(#[case] input: &str) {
        let item = SymbolItem::from_tree(&parse(input).unwrap()).unwrap();
        assert_eq!(item.emit(0, false).unwrap(), input);
    }

    #[test]
    fn pin_is_not_a_drawing_item() {
        assert!(SymbolItem::from_tree(&parse("(pin passive line)").unwrap()).is_err());
        assert!(!SymbolItem::is_symbol_item("pin"));
    }
}
