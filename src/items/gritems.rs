//! Board (`gr_*`) and footprint (`fp_*`) graphic shapes.
//!
//! Both families share one model; the [`GraphicScope`] of each item records
//! which prefix it was read with and is written back.

use std::fmt::Write;

use crate::emit::{close, Indent, Num, Quoted};
use crate::error::{Error, Result};
use crate::form::{flag_value, Form};
use crate::items::common::{read_points, Effects, Position, Stroke};
use crate::sexpr::{Atom, SExpr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GraphicScope {
    /// `gr_*` items on a board or inside a custom pad
    #[default]
    Board,
    /// `fp_*` items inside a footprint
    Footprint,
}

impl GraphicScope {
    pub fn prefix(self) -> &'static str {
        match self {
            GraphicScope::Board => "gr_",
            GraphicScope::Footprint => "fp_",
        }
    }

    fn of(sexpr: &SExpr, shape: &str) -> Result<Self> {
        let head = sexpr.head();
        match head.and_then(|h| h.get(..3).zip(h.get(3..))) {
            Some(("gr_", s)) if s == shape => Ok(GraphicScope::Board),
            Some(("fp_", s)) if s == shape => Ok(GraphicScope::Footprint),
            _ => Err(Error::wrong_form(&format!("gr_{shape}|fp_{shape}"), head)),
        }
    }
}

/// Layer, line width, fill and bookkeeping shared by all shapes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeAttrs {
    pub layer: String,
    /// KiCad 6 line width
    pub width: Option<f64>,
    /// KiCad 7 stroke, replaces `width`
    pub stroke: Option<Stroke>,
    /// `solid` or `none`
    pub fill: Option<String>,
    pub tstamp: Option<String>,
    pub locked: bool,
}

impl ShapeAttrs {
    pub fn on_layer(layer: impl Into<String>, width: f64) -> Self {
        Self {
            layer: layer.into(),
            width: Some(width),
            ..Default::default()
        }
    }

    /// Take `item` if it is one of the shared sub-forms.
    fn absorb(&mut self, item: &SExpr) -> Result<bool> {
        match (item.as_atom(), item.head()) {
            (Some("locked"), _) | (_, Some("locked")) => self.locked = flag_value(item),
            (_, Some("layer")) => self.layer = item.str_at(1)?.to_owned(),
            (_, Some("width")) => self.width = Some(item.f64_at(1)?),
            (_, Some("stroke")) => self.stroke = Some(Stroke::from_tree(item)?),
            (_, Some("fill")) => self.fill = Some(item.str_at(1)?.to_owned()),
            (_, Some("tstamp")) | (_, Some("uuid")) => {
                self.tstamp = Some(item.str_at(1)?.to_owned())
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn head(
        &self,
        out: &mut String,
        indent: usize,
        scope: GraphicScope,
        shape: &str,
    ) -> Result<()> {
        write!(out, "{}({}{}", Indent(indent), scope.prefix(), shape)?;
        if self.locked {
            out.push_str(" locked");
        }
        Ok(())
    }

    fn tail(&self, out: &mut String) -> Result<()> {
        if let Some(stroke) = &self.stroke {
            write!(out, " {}", stroke.emit(0, false)?)?;
        }
        if !self.layer.is_empty() {
            write!(out, " (layer {})", Quoted(&self.layer))?;
        }
        if let Some(width) = self.width {
            write!(out, " (width {})", Num(width))?;
        }
        if let Some(fill) = &self.fill {
            write!(out, " (fill {})", fill)?;
        }
        if let Some(tstamp) = &self.tstamp {
            write!(out, " (tstamp {})", tstamp)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrLine {
    pub scope: GraphicScope,
    pub start: Position,
    pub end: Position,
    pub angle: Option<f64>,
    pub attrs: ShapeAttrs,
}

impl Form for GrLine {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let mut line = GrLine {
            scope: GraphicScope::of(sexpr, "line")?,
            ..Default::default()
        };
        for item in sexpr.args() {
            if line.attrs.absorb(item)? {
                continue;
            }
            match item.head() {
                Some("start") => line.start = Position::from_coords(item)?,
                Some("end") => line.end = Position::from_coords(item)?,
                Some("angle") => line.angle = Some(item.f64_at(1)?),
                _ => {}
            }
        }
        Ok(line)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = String::new();
        self.attrs.head(&mut out, indent, self.scope, "line")?;
        write!(
            out,
            " {} {}",
            self.start.emit_as("start"),
            self.end.emit_as("end")
        )?;
        if let Some(angle) = self.angle {
            write!(out, " (angle {})", Num(angle))?;
        }
        self.attrs.tail(&mut out)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrRect {
    pub scope: GraphicScope,
    pub start: Position,
    pub end: Position,
    pub attrs: ShapeAttrs,
}

impl Form for GrRect {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let mut rect = GrRect {
            scope: GraphicScope::of(sexpr, "rect")?,
            ..Default::default()
        };
        for item in sexpr.args() {
            if rect.attrs.absorb(item)? {
                continue;
            }
            match item.head() {
                Some("start") => rect.start = Position::from_coords(item)?,
                Some("end") => rect.end = Position::from_coords(item)?,
                _ => {}
            }
        }
        Ok(rect)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = String::new();
        self.attrs.head(&mut out, indent, self.scope, "rect")?;
        write!(
            out,
            " {} {}",
            self.start.emit_as("start"),
            self.end.emit_as("end")
        )?;
        self.attrs.tail(&mut out)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrCircle {
    pub scope: GraphicScope,
    pub center: Position,
    /// A point on the circumference
    pub end: Position,
    pub attrs: ShapeAttrs,
}

impl Form for GrCircle {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let mut circle = GrCircle {
            scope: GraphicScope::of(sexpr, "circle")?,
            ..Default::default()
        };
        for item in sexpr.args() {
            if circle.attrs.absorb(item)? {
                continue;
            }
            match item.head() {
                Some("center") => circle.center = Position::from_coords(item)?,
                Some("end") => circle.end = Position::from_coords(item)?,
                _ => {}
            }
        }
        Ok(circle)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = String::new();
        self.attrs.head(&mut out, indent, self.scope, "circle")?;
        write!(
            out,
            " {} {}",
            self.center.emit_as("center"),
            self.end.emit_as("end")
        )?;
        self.attrs.tail(&mut out)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrArc {
    pub scope: GraphicScope,
    pub start: Position,
    pub mid: Position,
    pub end: Position,
    pub attrs: ShapeAttrs,
}

impl Form for GrArc {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let mut arc = GrArc {
            scope: GraphicScope::of(sexpr, "arc")?,
            ..Default::default()
        };
        for item in sexpr.args() {
            if arc.attrs.absorb(item)? {
                continue;
            }
            match item.head() {
                Some("start") => arc.start = Position::from_coords(item)?,
                Some("mid") => arc.mid = Position::from_coords(item)?,
                Some("end") => arc.end = Position::from_coords(item)?,
                _ => {}
            }
        }
        Ok(arc)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = String::new();
        self.attrs.head(&mut out, indent, self.scope, "arc")?;
        write!(
            out,
            " {} {} {}",
            self.start.emit_as("start"),
            self.mid.emit_as("mid"),
            self.end.emit_as("end")
        )?;
        self.attrs.tail(&mut out)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrPoly {
    pub scope: GraphicScope,
    pub points: Vec<Position>,
    pub attrs: ShapeAttrs,
}

impl Form for GrPoly {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let mut poly = GrPoly {
            scope: GraphicScope::of(sexpr, "poly")?,
            ..Default::default()
        };
        for item in sexpr.args() {
            if poly.attrs.absorb(item)? {
                continue;
            }
            if item.head() == Some("pts") {
                poly.points = read_points(item)?;
            }
        }
        Ok(poly)
    }

    /// The point list always starts on its own line.
    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = String::new();
        self.attrs.head(&mut out, indent, self.scope, "poly")?;
        writeln!(out)?;
        writeln!(out, "{}  (pts", pad)?;
        for point in &self.points {
            writeln!(out, "{}    {}", pad, point.emit_as("xy"))?;
        }
        write!(out, "{}  )", pad)?;
        self.attrs.tail(&mut out)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Cubic Bezier through four control points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrCurve {
    pub scope: GraphicScope,
    pub points: Vec<Position>,
    pub attrs: ShapeAttrs,
}

impl Form for GrCurve {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let mut curve = GrCurve {
            scope: GraphicScope::of(sexpr, "curve")?,
            ..Default::default()
        };
        for item in sexpr.args() {
            if curve.attrs.absorb(item)? {
                continue;
            }
            if item.head() == Some("pts") {
                curve.points = read_points(item)?;
            }
        }
        Ok(curve)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = String::new();
        self.attrs.head(&mut out, indent, self.scope, "curve")?;
        out.push_str(" (pts");
        for point in &self.points {
            write!(out, " {}", point.emit_as("xy"))?;
        }
        out.push(')');
        self.attrs.tail(&mut out)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrText {
    pub scope: GraphicScope,
    /// `reference`, `value` or `user`; footprint texts only
    pub kind: Option<String>,
    pub text: String,
    pub position: Position,
    pub layer: String,
    pub knockout: bool,
    pub hide: bool,
    pub locked: bool,
    pub effects: Effects,
    pub tstamp: Option<String>,
}

impl Form for GrText {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let mut text = GrText {
            scope: GraphicScope::of(sexpr, "text")?,
            ..Default::default()
        };
        let mut leading = sexpr
            .args()
            .iter()
            .map_while(|item| match item {
                SExpr::Atom(atom) => Some(atom),
                SExpr::List(_) => None,
            })
            .peekable();
        text.locked = leading
            .next_if(|atom| atom.value == "locked" && !atom.quoted)
            .is_some();
        if text.scope == GraphicScope::Footprint {
            text.kind = leading.next().map(|atom| atom.value.clone());
        }
        text.text = leading
            .next()
            .map(|atom| atom.value.clone())
            .unwrap_or_default();

        for item in sexpr.args() {
            match (item.as_atom(), item.head()) {
                (_, Some("hide")) => text.hide = flag_value(item),
                (_, Some("at")) => text.position = Position::from_tree(item)?,
                (_, Some("layer")) => {
                    text.layer = item.str_at(1)?.to_owned();
                    text.knockout = item.has_flag("knockout");
                }
                (_, Some("effects")) => text.effects = Effects::from_tree(item)?,
                (_, Some("tstamp")) | (_, Some("uuid")) => {
                    text.tstamp = Some(item.str_at(1)?.to_owned())
                }
                (Some("hide"), _) => {
                    if let SExpr::Atom(Atom { quoted: false, .. }) = item {
                        text.hide = true;
                    }
                }
                _ => {}
            }
        }
        Ok(text)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}({}text", pad, self.scope.prefix());
        if self.locked {
            out.push_str(" locked");
        }
        if let Some(kind) = &self.kind {
            write!(out, " {}", kind)?;
        }
        write!(
            out,
            " {} {} (layer {}",
            Quoted(&self.text),
            self.position.emit_as("at"),
            Quoted(&self.layer)
        )?;
        if self.knockout {
            out.push_str(" knockout");
        }
        out.push(')');
        if self.hide {
            out.push_str(" hide");
        }
        let trailing_tstamp = self.scope == GraphicScope::Footprint;
        if let (false, Some(tstamp)) = (trailing_tstamp, &self.tstamp) {
            write!(out, " (tstamp {})", tstamp)?;
        }
        out.push('\n');
        out.push_str(&self.effects.emit(indent + 2, true)?);
        if let (true, Some(tstamp)) = (trailing_tstamp, &self.tstamp) {
            writeln!(out, "{}  (tstamp {})", pad, tstamp)?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Framed multi-line text (KiCad 7)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrTextBox {
    pub scope: GraphicScope,
    pub locked: bool,
    pub text: String,
    pub start: Option<Position>,
    pub end: Option<Position>,
    /// Used instead of start/end for rotated boxes
    pub points: Vec<Position>,
    pub angle: Option<f64>,
    pub layer: String,
    pub tstamp: Option<String>,
    pub effects: Effects,
    pub stroke: Option<Stroke>,
}

impl Form for GrTextBox {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let mut text_box = GrTextBox {
            scope: GraphicScope::of(sexpr, "text_box")?,
            ..Default::default()
        };
        for item in sexpr.args() {
            match item {
                SExpr::Atom(Atom { value, quoted }) => {
                    if value == "locked" && !quoted {
                        text_box.locked = true;
                    } else {
                        text_box.text = value.clone();
                    }
                }
                SExpr::List(_) => match item.head() {
                    Some("start") => text_box.start = Some(Position::from_coords(item)?),
                    Some("end") => text_box.end = Some(Position::from_coords(item)?),
                    Some("pts") => text_box.points = read_points(item)?,
                    Some("angle") => text_box.angle = Some(item.f64_at(1)?),
                    Some("layer") => text_box.layer = item.str_at(1)?.to_owned(),
                    Some("tstamp") | Some("uuid") => {
                        text_box.tstamp = Some(item.str_at(1)?.to_owned())
                    }
                    Some("effects") => text_box.effects = Effects::from_tree(item)?,
                    Some("stroke") => text_box.stroke = Some(Stroke::from_tree(item)?),
                    _ => {}
                },
            }
        }
        Ok(text_box)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}({}text_box", pad, self.scope.prefix());
        if self.locked {
            out.push_str(" locked");
        }
        writeln!(out, " {}", Quoted(&self.text))?;
        write!(out, "{} ", pad)?;
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            write!(out, " {} {}", start.emit_as("start"), end.emit_as("end"))?;
        }
        if !self.points.is_empty() {
            out.push_str(" (pts");
            for point in &self.points {
                write!(out, " {}", point.emit_as("xy"))?;
            }
            out.push(')');
        }
        if let Some(angle) = self.angle {
            write!(out, " (angle {})", Num(angle))?;
        }
        write!(out, " (layer {})", Quoted(&self.layer))?;
        if let Some(tstamp) = &self.tstamp {
            write!(out, " (tstamp {})", tstamp)?;
        }
        out.push('\n');
        out.push_str(&self.effects.emit(indent + 2, true)?);
        if let Some(stroke) = &self.stroke {
            out.push_str(&stroke.emit(indent + 2, true)?);
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Any drawable shape a board, footprint or custom pad may contain
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicItem {
    Text(GrText),
    TextBox(GrTextBox),
    Line(GrLine),
    Rect(GrRect),
    Circle(GrCircle),
    Arc(GrArc),
    Poly(GrPoly),
    Curve(GrCurve),
}

impl GraphicItem {
    const SHAPES: [&'static str; 8] = [
        "text", "text_box", "line", "rect", "circle", "arc", "poly", "curve",
    ];

    /// True if `head` names a `gr_*` or `fp_*` shape.
    pub fn is_graphic(head: &str) -> bool {
        head.strip_prefix("gr_")
            .or_else(|| head.strip_prefix("fp_"))
            .is_some_and(|shape| Self::SHAPES.contains(&shape))
    }
}

impl Form for GraphicItem {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let shape = sexpr
            .head()
            .and_then(|h| h.strip_prefix("gr_").or_else(|| h.strip_prefix("fp_")));
        Ok(match shape {
            Some("text") => GraphicItem::Text(GrText::from_tree(sexpr)?),
            Some("text_box") => GraphicItem::TextBox(GrTextBox::from_tree(sexpr)?),
            Some("line") => GraphicItem::Line(GrLine::from_tree(sexpr)?),
            Some("rect") => GraphicItem::Rect(GrRect::from_tree(sexpr)?),
            Some("circle") => GraphicItem::Circle(GrCircle::from_tree(sexpr)?),
            Some("arc") => GraphicItem::Arc(GrArc::from_tree(sexpr)?),
            Some("poly") => GraphicItem::Poly(GrPoly::from_tree(sexpr)?),
            Some("curve") => GraphicItem::Curve(GrCurve::from_tree(sexpr)?),
            _ => return Err(Error::wrong_form("gr_*|fp_*", sexpr.head())),
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        match self {
            GraphicItem::Text(item) => item.emit(indent, newline),
            GraphicItem::TextBox(item) => item.emit(indent, newline),
            GraphicItem::Line(item) => item.emit(indent, newline),
            GraphicItem::Rect(item) => item.emit(indent, newline),
            GraphicItem::Circle(item) => item.emit(indent, newline),
            GraphicItem::Arc(item) => item.emit(indent, newline),
            GraphicItem::Poly(item) => item.emit(indent, newline),
            GraphicItem::Curve(item) => item.emit(indent, newline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse;
    use rstest::*;

    fn lift(text: &str) -> GraphicItem {
        GraphicItem::from_tree(&parse(text).unwrap()).unwrap()
    }

    #[rstest]
    #[case(r#"(gr_line (start 0 0) (end 10 0) (layer "Edge.Cuts") (width 0.1) (tstamp a1))"#)]
    #[case(r#"(fp_line (start -1 -1) (end 1 -1) (layer "F.SilkS") (width 0.12) (tstamp b2))"#)]
    #[case(r#"(gr_rect (start 0 0) (end 5 5) (layer "F.Cu") (width 0.2) (fill solid) (tstamp c3))"#)]
    #[case(r#"(fp_circle (center 0 0) (end 1 0) (layer "F.Fab") (width 0.1) (fill none) (tstamp d4))"#)]
    #[case(r#"(gr_arc (start 1 0) (mid 0 1) (end -1 0) (layer "Edge.Cuts") (width 0.1) (tstamp e5))"#)]
    #[case(r#"(gr_curve (pts (xy 0 0) (xy 1 1) (xy 2 1) (xy 3 0)) (layer "F.SilkS") (width 0.15))"#)]
    #[case(r#"(gr_line locked (start 0 0) (end 1 1) (stroke (width 0.1) (type solid)) (layer "F.Cu"))"#)]
    fn single_line_shapes_round_trip(#[case] input: &str) {
        assert_eq!(lift(input).emit(0, false).unwrap(), input);
    }

    #[test]
    fn scope_follows_prefix() {
        let GraphicItem::Line(line) = lift(r#"(fp_line (start 0 0) (end 1 1) (layer "F.Fab"))"#)
        else {
            panic!("expected a line")
        };
        assert_eq!(line.scope, GraphicScope::Footprint);
        assert!(GrLine::from_tree(&parse("(gr_rect (start 0 0) (end 1 1))").unwrap()).is_err());
    }

    #[test]
    fn poly_points_start_on_new_line() {
        let poly = lift(r#"(gr_poly (pts (xy 0 0) (xy 1 0) (xy 1 1)) (layer "F.Cu") (width 0) (fill solid))"#);
        let emitted = poly.emit(2, true).unwrap();
        assert_eq!(
            emitted,
            "  (gr_poly\n    (pts\n      (xy 0 0)\n      (xy 1 0)\n      (xy 1 1)\n    ) (layer \"F.Cu\") (width 0) (fill solid))\n"
        );
        assert_eq!(lift(&emitted), poly);
    }

    #[test]
    fn footprint_text_keeps_kind_and_flags() {
        let input = "(fp_text reference \"R1\" (at 0 -1.43 90) (layer \"F.SilkS\") hide\n  (effects (font (size 1 1) (thickness 0.15)))\n  (tstamp t1)\n)";
        let GraphicItem::Text(text) = lift(input) else {
            panic!("expected text")
        };
        assert_eq!(text.kind.as_deref(), Some("reference"));
        assert_eq!(text.text, "R1");
        assert!(text.hide);
        assert_eq!(text.emit(0, false).unwrap(), input);
    }

    #[test]
    fn board_text_keeps_tstamp_on_first_line() {
        let input = "(gr_text \"hide\" (at 150 100) (layer \"F.SilkS\" knockout) (tstamp t2)\n  (effects (font (size 1.5 1.5) (thickness 0.3)))\n)";
        let GraphicItem::Text(text) = lift(input) else {
            panic!("expected text")
        };
        assert_eq!(text.text, "hide");
        assert!(!text.hide);
        assert!(text.knockout);
        assert_eq!(text.emit(0, false).unwrap(), input);
    }

    #[test]
    fn text_box_round_trips() {
        let text_box = lift(
            r#"(gr_text_box "note" (start 0 0) (end 10 5) (layer "Cmts.User") (tstamp t3) (effects (font (size 1 1))) (stroke (width 0.1) (type solid)))"#,
        );
        let emitted = text_box.emit(0, true).unwrap();
        assert_eq!(lift(&emitted), text_box);
    }

    #[test]
    fn unknown_shape_is_wrong_form() {
        assert!(GraphicItem::from_tree(&parse("(gr_blob (pts))").unwrap()).is_err());
        assert!(GraphicItem::is_graphic("fp_poly"));
        assert!(!GraphicItem::is_graphic("segment"));
    }
}
