//! Style descriptors and small records shared by every document kind.

use std::fmt::Write;

use crate::emit::{close, Indent, Num, Quoted, Token};
use crate::error::Result;
use crate::form::{flag_value, Form};
use crate::sexpr::SExpr;

/// A 2D point with optional rotation, written `(at x y [angle])`.
///
/// The same shape appears under `start`, `end`, `mid`, `center` and `xy`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub angle: Option<f64>,
    pub unlocked: bool,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn with_angle(x: f64, y: f64, angle: f64) -> Self {
        Self {
            x,
            y,
            angle: Some(angle),
            unlocked: false,
        }
    }

    /// Read `(token x y [angle] [unlocked])` whatever the token is.
    pub fn from_coords(sexpr: &SExpr) -> Result<Self> {
        Ok(Self {
            x: sexpr.f64_at(1)?,
            y: sexpr.f64_at(2)?,
            angle: sexpr.opt_f64_at(3),
            unlocked: sexpr.has_flag("unlocked"),
        })
    }

    pub fn emit_as(&self, token: &str) -> String {
        let mut out = format!("({} {} {}", token, Num(self.x), Num(self.y));
        if let Some(angle) = self.angle {
            out.push(' ');
            out.push_str(&Num(angle).to_string());
        }
        if self.unlocked {
            out.push_str(" unlocked");
        }
        out.push(')');
        out
    }
}

impl Form for Position {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("at")?;
        Self::from_coords(sexpr)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}{}", Indent(indent), self.emit_as("at"));
        if newline {
            out.push('\n');
        }
        Ok(out)
    }
}

/// A 3D triple written `(xyz x y z)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Form for Coordinate {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("xyz")?;
        Ok(Self {
            x: sexpr.f64_at(1)?,
            y: sexpr.f64_at(2)?,
            z: sexpr.f64_at(3)?,
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(xyz {} {} {}",
            Indent(indent),
            Num(self.x),
            Num(self.y),
            Num(self.z)
        );
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Form for ColorRgba {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("color")?;
        Ok(Self {
            r: sexpr.f64_at(1)?,
            g: sexpr.f64_at(2)?,
            b: sexpr.f64_at(3)?,
            a: sexpr.f64_at(4)?,
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(color {} {} {} {}",
            Indent(indent),
            Num(self.r),
            Num(self.g),
            Num(self.b),
            Num(self.a)
        );
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub width: f64,
    /// `default`, `solid`, `dash`, `dot`, `dash_dot` ...
    pub kind: String,
    pub color: Option<ColorRgba>,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 0.0,
            kind: "default".to_owned(),
            color: None,
        }
    }
}

impl Form for Stroke {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("stroke")?;
        let mut stroke = Stroke::default();
        for item in args {
            match item.head() {
                Some("width") => stroke.width = item.f64_at(1)?,
                Some("type") => stroke.kind = item.str_at(1)?.to_owned(),
                Some("color") => stroke.color = Some(ColorRgba::from_tree(item)?),
                _ => {}
            }
        }
        Ok(stroke)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = String::new();
        write!(
            out,
            "{}(stroke (width {}) (type {})",
            Indent(indent),
            Num(self.width),
            Token(&self.kind)
        )?;
        if let Some(color) = &self.color {
            write!(out, " {}", color.emit(0, false)?)?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// Area fill; `(fill (type background))` on symbol shapes, `(fill (color ..))` on sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fill {
    /// `none`, `outline`, `background` or `color`
    pub kind: Option<String>,
    pub color: Option<ColorRgba>,
}

impl Fill {
    pub fn none() -> Self {
        Self {
            kind: Some("none".to_owned()),
            color: None,
        }
    }
}

impl Form for Fill {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("fill")?;
        let mut fill = Fill::default();
        for item in args {
            match item.head() {
                Some("type") => fill.kind = Some(item.str_at(1)?.to_owned()),
                Some("color") => fill.color = Some(ColorRgba::from_tree(item)?),
                _ => {}
            }
        }
        Ok(fill)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(fill", Indent(indent));
        if let Some(kind) = &self.kind {
            write!(out, " (type {})", Token(kind))?;
        }
        if let Some(color) = &self.color {
            write!(out, " {}", color.emit(0, false)?)?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub face: Option<String>,
    pub height: f64,
    pub width: f64,
    pub thickness: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub line_spacing: Option<f64>,
    pub color: Option<ColorRgba>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            face: None,
            height: 1.27,
            width: 1.27,
            thickness: None,
            bold: false,
            italic: false,
            line_spacing: None,
            color: None,
        }
    }
}

impl Form for Font {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("font")?;
        let mut font = Font::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("bold"), _) | (_, Some("bold")) => font.bold = flag_value(item),
                (Some("italic"), _) | (_, Some("italic")) => font.italic = flag_value(item),
                (_, Some("face")) => font.face = Some(item.str_at(1)?.to_owned()),
                (_, Some("size")) => {
                    font.height = item.f64_at(1)?;
                    font.width = item.f64_at(2)?;
                }
                (_, Some("thickness")) => font.thickness = Some(item.f64_at(1)?),
                (_, Some("line_spacing")) => font.line_spacing = Some(item.f64_at(1)?),
                (_, Some("color")) => font.color = Some(ColorRgba::from_tree(item)?),
                _ => {}
            }
        }
        Ok(font)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(font", Indent(indent));
        if let Some(face) = &self.face {
            write!(out, " (face {})", Quoted(face))?;
        }
        write!(out, " (size {} {})", Num(self.height), Num(self.width))?;
        if let Some(thickness) = self.thickness {
            write!(out, " (thickness {})", Num(thickness))?;
        }
        if self.bold {
            out.push_str(" bold");
        }
        if self.italic {
            out.push_str(" italic");
        }
        if let Some(spacing) = self.line_spacing {
            write!(out, " (line_spacing {})", Num(spacing))?;
        }
        if let Some(color) = &self.color {
            write!(out, " {}", color.emit(0, false)?)?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Justify {
    /// `left` or `right`; centered when absent
    pub horizontally: Option<String>,
    /// `top` or `bottom`; centered when absent
    pub vertically: Option<String>,
    pub mirror: bool,
}

impl Form for Justify {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("justify")?;
        let mut justify = Justify::default();
        for item in args {
            match item.as_atom() {
                Some(h @ ("left" | "right")) => justify.horizontally = Some(h.to_owned()),
                Some(v @ ("top" | "bottom")) => justify.vertically = Some(v.to_owned()),
                Some("mirror") => justify.mirror = true,
                _ => {}
            }
        }
        Ok(justify)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(justify", Indent(indent));
        for word in [&self.horizontally, &self.vertically].into_iter().flatten() {
            write!(out, " {}", word)?;
        }
        if self.mirror {
            out.push_str(" mirror");
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    pub font: Font,
    pub justify: Option<Justify>,
    pub hide: bool,
}

impl Form for Effects {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("effects")?;
        let mut effects = Effects::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("hide"), _) | (_, Some("hide")) => effects.hide = flag_value(item),
                (_, Some("font")) => effects.font = Font::from_tree(item)?,
                (_, Some("justify")) => effects.justify = Some(Justify::from_tree(item)?),
                _ => {}
            }
        }
        Ok(effects)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(effects {}", Indent(indent), self.font.emit(0, false)?);
        if let Some(justify) = &self.justify {
            write!(out, " {}", justify.emit(0, false)?)?;
        }
        if self.hide {
            out.push_str(" hide");
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// A board net, `(net 1 "GND")`; also a net reference inside pads and tracks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Net {
    pub number: i64,
    pub name: String,
}

impl Net {
    pub fn new(number: i64, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
        }
    }
}

impl Form for Net {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("net")?;
        Ok(Self {
            number: sexpr.parse_at(1)?,
            name: sexpr.opt_str_at(2).unwrap_or_default().to_owned(),
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(net {} {}",
            Indent(indent),
            self.number,
            Quoted(&self.name)
        );
        close(&mut out, newline);
        Ok(out)
    }
}

/// A named set of board items referenced by uuid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub name: String,
    pub locked: bool,
    pub id: String,
    pub members: Vec<String>,
}

impl Form for Group {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("group")?;
        let mut group = Group {
            name: sexpr.opt_str_at(1).unwrap_or_default().to_owned(),
            ..Default::default()
        };
        for item in args.iter().skip(1) {
            match (item.as_atom(), item.head()) {
                (Some("locked"), _) | (_, Some("locked")) => group.locked = flag_value(item),
                (_, Some("id")) => group.id = item.str_at(1)?.to_owned(),
                (_, Some("members")) => {
                    group.members = item
                        .args()
                        .iter()
                        .filter_map(SExpr::as_atom)
                        .map(str::to_owned)
                        .collect()
                }
                _ => {}
            }
        }
        Ok(group)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(group {}", pad, Quoted(&self.name));
        if self.locked {
            out.push_str(" locked");
        }
        writeln!(out, " (id {})", self.id)?;
        writeln!(out, "{}  (members", pad)?;
        for member in &self.members {
            writeln!(out, "{}    {}", pad, member)?;
        }
        writeln!(out, "{}  )", pad)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSettings {
    /// `A0`..`A5`, `A`..`E`, `USLetter`, ... or `User`
    pub paper_size: String,
    /// Only for `User` size
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub portrait: bool,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            paper_size: "A4".to_owned(),
            width: None,
            height: None,
            portrait: false,
        }
    }
}

impl Form for PageSettings {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("paper")?;
        let paper_size = sexpr.str_at(1)?.to_owned();
        let (width, height) = if paper_size == "User" {
            (Some(sexpr.f64_at(2)?), Some(sexpr.f64_at(3)?))
        } else {
            (None, None)
        };
        Ok(Self {
            paper_size,
            width,
            height,
            portrait: sexpr.has_flag("portrait"),
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(paper {}", Indent(indent), Quoted(&self.paper_size));
        if let (Some(width), Some(height)) = (self.width, self.height) {
            write!(out, " {} {}", Num(width), Num(height))?;
        }
        if self.portrait {
            out.push_str(" portrait");
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleBlock {
    pub title: Option<String>,
    pub date: Option<String>,
    pub revision: Option<String>,
    pub company: Option<String>,
    /// `(comment n "text")` in file order
    pub comments: Vec<(u32, String)>,
}

impl Form for TitleBlock {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("title_block")?;
        let mut block = TitleBlock::default();
        for item in args {
            match item.head() {
                Some("title") => block.title = Some(item.str_at(1)?.to_owned()),
                Some("date") => block.date = Some(item.str_at(1)?.to_owned()),
                Some("rev") => block.revision = Some(item.str_at(1)?.to_owned()),
                Some("company") => block.company = Some(item.str_at(1)?.to_owned()),
                Some("comment") => block
                    .comments
                    .push((item.parse_at(1)?, item.str_at(2)?.to_owned())),
                _ => {}
            }
        }
        Ok(block)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(title_block\n", pad);
        let fields = [
            ("title", &self.title),
            ("date", &self.date),
            ("rev", &self.revision),
            ("company", &self.company),
        ];
        for (token, value) in fields {
            if let Some(value) = value {
                writeln!(out, "{}  ({} {})", pad, token, Quoted(value))?;
            }
        }
        for (number, comment) in &self.comments {
            writeln!(out, "{}  (comment {} {})", pad, number, Quoted(comment))?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// A symbol field, `(property "Reference" "R1" (id 0) (at ..) (effects ..))`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: String,
    pub id: Option<i64>,
    pub position: Position,
    pub effects: Option<Effects>,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>, id: i64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            id: Some(id),
            position: Position::with_angle(0.0, 0.0, 0.0),
            effects: Some(Effects::default()),
        }
    }
}

impl Form for Property {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("property")?;
        let mut property = Property {
            key: sexpr.str_at(1)?.to_owned(),
            value: sexpr.str_at(2)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("id") => property.id = Some(item.parse_at(1)?),
                Some("at") => property.position = Position::from_tree(item)?,
                Some("effects") => property.effects = Some(Effects::from_tree(item)?),
                _ => {}
            }
        }
        Ok(property)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(property {} {}",
            pad,
            Quoted(&self.key),
            Quoted(&self.value)
        );
        if let Some(id) = self.id {
            write!(out, " (id {})", id)?;
        }
        write!(out, " {}", self.position.emit_as("at"))?;
        if let Some(effects) = &self.effects {
            out.push('\n');
            out.push_str(&effects.emit(indent + 2, true)?);
            write!(out, "{}", pad)?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// An embedded bitmap, base64 data split over several lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub position: Position,
    pub scale: Option<f64>,
    pub layer: Option<String>,
    pub uuid: Option<String>,
    pub data: Vec<String>,
}

impl Form for Image {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("image")?;
        let mut image = Image::default();
        for item in args {
            match item.head() {
                Some("at") => image.position = Position::from_tree(item)?,
                Some("scale") => image.scale = Some(item.f64_at(1)?),
                Some("layer") => image.layer = Some(item.str_at(1)?.to_owned()),
                Some("uuid") => image.uuid = Some(item.str_at(1)?.to_owned()),
                Some("data") => {
                    image.data = item
                        .args()
                        .iter()
                        .filter_map(SExpr::as_atom)
                        .map(str::to_owned)
                        .collect()
                }
                _ => {}
            }
        }
        Ok(image)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(image {}", pad, self.position.emit_as("at"));
        if let Some(scale) = self.scale {
            write!(out, " (scale {})", Num(scale))?;
        }
        if let Some(layer) = &self.layer {
            write!(out, " (layer {})", Quoted(layer))?;
        }
        out.push('\n');
        if let Some(uuid) = &self.uuid {
            writeln!(out, "{}  (uuid {})", pad, uuid)?;
        }
        writeln!(out, "{}  (data", pad)?;
        for line in &self.data {
            writeln!(out, "{}    {}", pad, line)?;
        }
        writeln!(out, "{}  )", pad)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Read the `(xy ..)` points of a `(pts ..)` form.
pub(crate) fn read_points(pts: &SExpr) -> Result<Vec<Position>> {
    pts.children("xy").map(Position::from_coords).collect()
}

/// Write a `(pts ..)` block with one point per line.
pub(crate) fn write_points(out: &mut String, points: &[Position], indent: usize) -> Result<()> {
    let pad = Indent(indent);
    writeln!(out, "{}(pts", pad)?;
    for point in points {
        writeln!(out, "{}  {}", pad, point.emit_as("xy"))?;
    }
    writeln!(out, "{})", pad)?;
    Ok(())
}
