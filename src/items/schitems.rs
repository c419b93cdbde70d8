//! Items placed on a schematic sheet.

use std::fmt::Write;

use crate::emit::{close, Indent, Num, Quoted};
use crate::error::{Error, Result};
use crate::form::{emit_all, flag_value, yes_no, Form};
use crate::items::common::{
    read_points, ColorRgba, Effects, Fill, Position, Property, Stroke,
};
use crate::sexpr::SExpr;

fn write_uuid(out: &mut String, indent: usize, uuid: &Option<String>) -> Result<()> {
    if let Some(uuid) = uuid {
        writeln!(out, "{}(uuid {})", Indent(indent), uuid)?;
    }
    Ok(())
}

fn inline_points(out: &mut String, points: &[Position]) -> Result<()> {
    out.push_str("(pts");
    for point in points {
        write!(out, " {}", point.emit_as("xy"))?;
    }
    out.push(')');
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Junction {
    pub position: Position,
    pub diameter: f64,
    pub color: Option<ColorRgba>,
    pub uuid: Option<String>,
}

impl Form for Junction {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("junction")?;
        let mut junction = Junction::default();
        for item in args {
            match item.head() {
                Some("at") => junction.position = Position::from_tree(item)?,
                Some("diameter") => junction.diameter = item.f64_at(1)?,
                Some("color") => junction.color = Some(ColorRgba::from_tree(item)?),
                Some("uuid") => junction.uuid = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(junction)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(junction {} (diameter {})",
            pad,
            self.position.emit_as("at"),
            Num(self.diameter)
        );
        if let Some(color) = &self.color {
            write!(out, " {}", color.emit(0, false)?)?;
        }
        out.push('\n');
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoConnect {
    pub position: Position,
    pub uuid: Option<String>,
}

impl Form for NoConnect {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("no_connect")?;
        let mut no_connect = NoConnect::default();
        for item in args {
            match item.head() {
                Some("at") => no_connect.position = Position::from_tree(item)?,
                Some("uuid") => no_connect.uuid = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(no_connect)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(no_connect {}",
            Indent(indent),
            self.position.emit_as("at")
        );
        if let Some(uuid) = &self.uuid {
            write!(out, " (uuid {})", uuid)?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusEntry {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub stroke: Stroke,
    pub uuid: Option<String>,
}

impl Form for BusEntry {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("bus_entry")?;
        let mut entry = BusEntry::default();
        for item in args {
            match item.head() {
                Some("at") => entry.position = Position::from_tree(item)?,
                Some("size") => {
                    entry.width = item.f64_at(1)?;
                    entry.height = item.f64_at(2)?;
                }
                Some("stroke") => entry.stroke = Stroke::from_tree(item)?,
                Some("uuid") => entry.uuid = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(entry)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(bus_entry {} (size {} {})\n",
            pad,
            self.position.emit_as("at"),
            Num(self.width),
            Num(self.height)
        );
        out.push_str(&self.stroke.emit(indent + 2, true)?);
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionKind {
    #[default]
    Wire,
    Bus,
}

impl ConnectionKind {
    pub fn token(self) -> &'static str {
        match self {
            ConnectionKind::Wire => "wire",
            ConnectionKind::Bus => "bus",
        }
    }
}

/// A wire or bus segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    pub kind: ConnectionKind,
    pub points: Vec<Position>,
    pub stroke: Stroke,
    pub uuid: Option<String>,
}

impl Form for Connection {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let (head, args) = sexpr.expect_one_of(&["wire", "bus"])?;
        let mut connection = Connection {
            kind: if head == "bus" {
                ConnectionKind::Bus
            } else {
                ConnectionKind::Wire
            },
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("pts") => connection.points = read_points(item)?,
                Some("stroke") => connection.stroke = Stroke::from_tree(item)?,
                Some("uuid") => connection.uuid = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(connection)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}({} ", pad, self.kind.token());
        inline_points(&mut out, &self.points)?;
        out.push('\n');
        out.push_str(&self.stroke.emit(indent + 2, true)?);
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// A graphical line on the sheet, not electrically connected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyLine {
    pub points: Vec<Position>,
    pub stroke: Stroke,
    pub uuid: Option<String>,
}

impl Form for PolyLine {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("polyline")?;
        let mut line = PolyLine::default();
        for item in args {
            match item.head() {
                Some("pts") => line.points = read_points(item)?,
                Some("stroke") => line.stroke = Stroke::from_tree(item)?,
                Some("uuid") => line.uuid = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(line)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(polyline ", pad);
        inline_points(&mut out, &self.points)?;
        out.push('\n');
        out.push_str(&self.stroke.emit(indent + 2, true)?);
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Wires, buses and graphical lines in file order
#[derive(Debug, Clone, PartialEq)]
pub enum SchematicGraphic {
    Connection(Connection),
    PolyLine(PolyLine),
}

impl Form for SchematicGraphic {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        match sexpr.head() {
            Some("wire" | "bus") => Ok(SchematicGraphic::Connection(Connection::from_tree(
                sexpr,
            )?)),
            Some("polyline") => Ok(SchematicGraphic::PolyLine(PolyLine::from_tree(sexpr)?)),
            head => Err(Error::wrong_form("wire|bus|polyline", head)),
        }
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        match self {
            SchematicGraphic::Connection(item) => item.emit(indent, newline),
            SchematicGraphic::PolyLine(item) => item.emit(indent, newline),
        }
    }
}

/// Free text note on a sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    pub text: String,
    pub position: Position,
    pub effects: Effects,
    pub uuid: Option<String>,
}

impl Form for Text {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("text")?;
        let mut text = Text {
            text: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("at") => text.position = Position::from_tree(item)?,
                Some("effects") => text.effects = Effects::from_tree(item)?,
                Some("uuid") => text.uuid = Some(item.str_at(1)?.to_owned()),
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
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Net label visible only on its own sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalLabel {
    pub text: String,
    pub position: Position,
    pub fields_autoplaced: bool,
    pub effects: Effects,
    pub uuid: Option<String>,
}

impl Form for LocalLabel {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("label")?;
        let mut label = LocalLabel {
            text: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("at") => label.position = Position::from_tree(item)?,
                Some("fields_autoplaced") => label.fields_autoplaced = true,
                Some("effects") => label.effects = Effects::from_tree(item)?,
                Some("uuid") => label.uuid = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(label)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(label {} {}",
            pad,
            Quoted(&self.text),
            self.position.emit_as("at")
        );
        if self.fields_autoplaced {
            out.push_str(" (fields_autoplaced)");
        }
        out.push('\n');
        out.push_str(&self.effects.emit(indent + 2, true)?);
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Net label shared by every sheet
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalLabel {
    pub text: String,
    /// `input`, `output`, `bidirectional`, `tri_state` or `passive`
    pub shape: String,
    pub position: Position,
    pub fields_autoplaced: bool,
    pub effects: Effects,
    pub uuid: Option<String>,
    pub properties: Vec<Property>,
}

impl Default for GlobalLabel {
    fn default() -> Self {
        Self {
            text: String::new(),
            shape: "input".to_owned(),
            position: Position::default(),
            fields_autoplaced: false,
            effects: Effects::default(),
            uuid: None,
            properties: Vec::new(),
        }
    }
}

impl Form for GlobalLabel {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("global_label")?;
        let mut label = GlobalLabel {
            text: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("shape") => label.shape = item.str_at(1)?.to_owned(),
                Some("at") => label.position = Position::from_tree(item)?,
                Some("fields_autoplaced") => label.fields_autoplaced = true,
                Some("effects") => label.effects = Effects::from_tree(item)?,
                Some("uuid") => label.uuid = Some(item.str_at(1)?.to_owned()),
                Some("property") => label.properties.push(Property::from_tree(item)?),
                _ => {}
            }
        }
        Ok(label)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(global_label {} (shape {}) {}",
            pad,
            Quoted(&self.text),
            self.shape,
            self.position.emit_as("at")
        );
        if self.fields_autoplaced {
            out.push_str(" (fields_autoplaced)");
        }
        out.push('\n');
        out.push_str(&self.effects.emit(indent + 2, true)?);
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        emit_all(&mut out, &self.properties, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Label connecting a sheet to the pin of its parent sheet symbol
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalLabel {
    pub text: String,
    pub shape: String,
    pub position: Position,
    pub fields_autoplaced: bool,
    pub effects: Effects,
    pub uuid: Option<String>,
}

impl Default for HierarchicalLabel {
    fn default() -> Self {
        Self {
            text: String::new(),
            shape: "input".to_owned(),
            position: Position::default(),
            fields_autoplaced: false,
            effects: Effects::default(),
            uuid: None,
        }
    }
}

impl Form for HierarchicalLabel {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("hierarchical_label")?;
        let mut label = HierarchicalLabel {
            text: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("shape") => label.shape = item.str_at(1)?.to_owned(),
                Some("at") => label.position = Position::from_tree(item)?,
                Some("fields_autoplaced") => label.fields_autoplaced = true,
                Some("effects") => label.effects = Effects::from_tree(item)?,
                Some("uuid") => label.uuid = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(label)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(hierarchical_label {} (shape {}) {}",
            pad,
            Quoted(&self.text),
            self.shape,
            self.position.emit_as("at")
        );
        if self.fields_autoplaced {
            out.push_str(" (fields_autoplaced)");
        }
        out.push('\n');
        out.push_str(&self.effects.emit(indent + 2, true)?);
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// A placed instance of a library symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SchematicSymbol {
    /// Set when the placed symbol differs from the library entry
    pub lib_name: Option<String>,
    pub lib_id: String,
    pub position: Position,
    /// `x` or `y`
    pub mirror: Option<String>,
    pub unit: i64,
    /// De Morgan alternate body style
    pub convert: Option<i64>,
    pub in_bom: bool,
    pub on_board: bool,
    pub fields_autoplaced: bool,
    pub uuid: Option<String>,
    pub properties: Vec<Property>,
    /// Pin number and the uuid of that pin in this instance
    pub pins: Vec<(String, String)>,
}

impl Default for SchematicSymbol {
    fn default() -> Self {
        Self {
            lib_name: None,
            lib_id: String::new(),
            position: Position::with_angle(0.0, 0.0, 0.0),
            mirror: None,
            unit: 1,
            convert: None,
            in_bom: true,
            on_board: true,
            fields_autoplaced: false,
            uuid: None,
            properties: Vec::new(),
            pins: Vec::new(),
        }
    }
}

impl Form for SchematicSymbol {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("symbol")?;
        let mut symbol = SchematicSymbol::default();
        for item in args {
            match item.head() {
                Some("lib_name") => symbol.lib_name = Some(item.str_at(1)?.to_owned()),
                Some("lib_id") => symbol.lib_id = item.str_at(1)?.to_owned(),
                Some("at") => symbol.position = Position::from_tree(item)?,
                Some("mirror") => symbol.mirror = Some(item.str_at(1)?.to_owned()),
                Some("unit") => symbol.unit = item.parse_at(1)?,
                Some("convert") => symbol.convert = Some(item.parse_at(1)?),
                Some("in_bom") => symbol.in_bom = flag_value(item),
                Some("on_board") => symbol.on_board = flag_value(item),
                Some("fields_autoplaced") => symbol.fields_autoplaced = true,
                Some("uuid") => symbol.uuid = Some(item.str_at(1)?.to_owned()),
                Some("property") => symbol.properties.push(Property::from_tree(item)?),
                Some("pin") => {
                    let uuid = item.value("uuid").unwrap_or_default().to_owned();
                    symbol.pins.push((item.str_at(1)?.to_owned(), uuid));
                }
                _ => {}
            }
        }
        Ok(symbol)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(symbol", pad);
        if let Some(lib_name) = &self.lib_name {
            write!(out, " (lib_name {})", Quoted(lib_name))?;
        }
        write!(
            out,
            " (lib_id {}) {}",
            Quoted(&self.lib_id),
            self.position.emit_as("at")
        )?;
        if let Some(mirror) = &self.mirror {
            write!(out, " (mirror {})", mirror)?;
        }
        write!(out, " (unit {})", self.unit)?;
        if let Some(convert) = self.convert {
            write!(out, " (convert {})", convert)?;
        }
        write!(
            out,
            "\n{}  (in_bom {}) (on_board {})",
            pad,
            yes_no(self.in_bom),
            yes_no(self.on_board)
        )?;
        if self.fields_autoplaced {
            out.push_str(" (fields_autoplaced)");
        }
        out.push('\n');
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        emit_all(&mut out, &self.properties, indent + 2)?;
        for (number, uuid) in &self.pins {
            writeln!(out, "{}  (pin {} (uuid {}))", pad, Quoted(number), uuid)?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Connection point on the edge of a sheet symbol
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalPin {
    pub name: String,
    /// `input`, `output`, `bidirectional`, `tri_state` or `passive`
    pub connection_type: String,
    pub position: Position,
    pub effects: Effects,
    pub uuid: Option<String>,
}

impl Default for HierarchicalPin {
    fn default() -> Self {
        Self {
            name: String::new(),
            connection_type: "input".to_owned(),
            position: Position::default(),
            effects: Effects::default(),
            uuid: None,
        }
    }
}

impl Form for HierarchicalPin {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("pin")?;
        let mut pin = HierarchicalPin {
            name: sexpr.str_at(1)?.to_owned(),
            connection_type: sexpr.str_at(2)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("at") => pin.position = Position::from_tree(item)?,
                Some("effects") => pin.effects = Effects::from_tree(item)?,
                Some("uuid") => pin.uuid = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(pin)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(pin {} {} {}\n",
            pad,
            Quoted(&self.name),
            self.connection_type,
            self.position.emit_as("at")
        );
        out.push_str(&self.effects.emit(indent + 2, true)?);
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// A sub-sheet symbol referencing another schematic file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchicalSheet {
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub fields_autoplaced: bool,
    pub stroke: Stroke,
    pub fill: Fill,
    pub uuid: Option<String>,
    /// `Sheet name` and `Sheet file` come first
    pub properties: Vec<Property>,
    pub pins: Vec<HierarchicalPin>,
}

impl HierarchicalSheet {
    pub fn sheet_name(&self) -> Option<&str> {
        self.property("Sheet name")
    }

    pub fn file_name(&self) -> Option<&str> {
        self.property("Sheet file")
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }
}

impl Form for HierarchicalSheet {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("sheet")?;
        let mut sheet = HierarchicalSheet::default();
        for item in args {
            match item.head() {
                Some("at") => sheet.position = Position::from_tree(item)?,
                Some("size") => {
                    sheet.width = item.f64_at(1)?;
                    sheet.height = item.f64_at(2)?;
                }
                Some("fields_autoplaced") => sheet.fields_autoplaced = true,
                Some("stroke") => sheet.stroke = Stroke::from_tree(item)?,
                Some("fill") => sheet.fill = Fill::from_tree(item)?,
                Some("uuid") => sheet.uuid = Some(item.str_at(1)?.to_owned()),
                Some("property") => sheet.properties.push(Property::from_tree(item)?),
                Some("pin") => sheet.pins.push(HierarchicalPin::from_tree(item)?),
                _ => {}
            }
        }
        Ok(sheet)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(sheet {} (size {} {})",
            pad,
            self.position.emit_as("at"),
            Num(self.width),
            Num(self.height)
        );
        if self.fields_autoplaced {
            out.push_str(" (fields_autoplaced)");
        }
        out.push('\n');
        out.push_str(&self.stroke.emit(indent + 2, true)?);
        out.push_str(&self.fill.emit(indent + 2, true)?);
        write_uuid(&mut out, indent + 2, &self.uuid)?;
        emit_all(&mut out, &self.properties, indent + 2)?;
        emit_all(&mut out, &self.pins, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Page number of one sheet in the hierarchy, `(path "/" (page "1"))`
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalSheetInstance {
    pub path: String,
    pub page: String,
}

impl HierarchicalSheetInstance {
    pub fn new(path: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page: page.into(),
        }
    }
}

impl Form for HierarchicalSheetInstance {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("path")?;
        Ok(Self {
            path: sexpr.str_at(1)?.to_owned(),
            page: sexpr.value("page").unwrap_or_default().to_owned(),
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(path {} (page {})",
            Indent(indent),
            Quoted(&self.path),
            Quoted(&self.page)
        );
        close(&mut out, newline);
        Ok(out)
    }
}

/// Annotation of one placed symbol at one hierarchy path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolInstance {
    pub path: String,
    pub reference: String,
    pub unit: i64,
    pub value: String,
    pub footprint: String,
}

impl Form for SymbolInstance {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("path")?;
        let text = |label| sexpr.value(label).unwrap_or_default().to_owned();
        let unit = match sexpr.child("unit") {
            Some(unit) => unit.parse_at(1)?,
            None => 1,
        };
        Ok(Self {
            path: sexpr.str_at(1)?.to_owned(),
            reference: text("reference"),
            unit,
            value: text("value"),
            footprint: text("footprint"),
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(path {}\n", pad, Quoted(&self.path));
        writeln!(
            out,
            "{}  (reference {}) (unit {}) (value {}) (footprint {})",
            pad,
            Quoted(&self.reference),
            self.unit,
            Quoted(&self.value),
            Quoted(&self.footprint)
        )?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse;
    use rstest::*;

    fn lift<T: Form>(text: &str) -> T {
        T::from_tree(&parse(text).unwrap()).unwrap()
    }

    #[rstest]
    #[case("(junction (at 100.33 50.8) (diameter 0) (color 0 0 0 0)\n  (uuid 0a1b)\n)")]
    #[case("(bus_entry (at 80 40) (size 2.54 2.54)\n  (stroke (width 0) (type default))\n  (uuid 7c7c)\n)")]
    #[case("(wire (pts (xy 100 50) (xy 120 50))\n  (stroke (width 0) (type default))\n  (uuid 1f2e)\n)")]
    #[case("(bus (pts (xy 80 40) (xy 80 60))\n  (stroke (width 0) (type default))\n  (uuid 2f2e)\n)")]
    #[case("(polyline (pts (xy 10 10) (xy 20 10))\n  (stroke (width 0) (type dash))\n  (uuid 3f2e)\n)")]
    #[case("(text \"Power input\" (at 50 30 0)\n  (effects (font (size 1.27 1.27)) (justify left bottom))\n  (uuid 4f2e)\n)")]
    #[case("(label \"SDA\" (at 120 50 0)\n  (effects (font (size 1.27 1.27)) (justify left bottom))\n  (uuid 5f2e)\n)")]
    #[case("(hierarchical_label \"CLK\" (shape output) (at 140 60 180)\n  (effects (font (size 1.27 1.27)) (justify right))\n  (uuid 6f2e)\n)")]
    fn sheet_items_round_trip(#[case] input: &str) {
        let tree = parse(input).unwrap();
        let emitted = match tree.head() {
            Some("junction") => Junction::from_tree(&tree).unwrap().emit(0, false),
            Some("bus_entry") => BusEntry::from_tree(&tree).unwrap().emit(0, false),
            Some("wire" | "bus" | "polyline") => {
                SchematicGraphic::from_tree(&tree).unwrap().emit(0, false)
            }
            Some("text") => Text::from_tree(&tree).unwrap().emit(0, false),
            Some("label") => LocalLabel::from_tree(&tree).unwrap().emit(0, false),
            Some("hierarchical_label") => {
                HierarchicalLabel::from_tree(&tree).unwrap().emit(0, false)
            }
            _ => unreachable!(),
        };
        assert_eq!(emitted.unwrap(), input);
    }

    #[test]
    fn no_connect_is_one_line() {
        let input = "(no_connect (at 60.96 45.72) (uuid 9a9a))";
        assert_eq!(lift::<NoConnect>(input).emit(2, true).unwrap(), format!("  {input}\n"));
    }

    #[test]
    fn connection_kind_follows_head() {
        let bus: Connection = lift("(bus (pts (xy 0 0) (xy 0 10)))");
        assert_eq!(bus.kind, ConnectionKind::Bus);
        assert!(Connection::from_tree(&parse("(polyline (pts))").unwrap()).is_err());
    }

    #[test]
    fn global_label_keeps_intersheet_property() {
        let input = "(global_label \"VBUS\" (shape input) (at 30 40 180) (fields_autoplaced)\n  (effects (font (size 1.27 1.27)) (justify right))\n  (uuid 8e8e)\n  (property \"Intersheet References\" \"${INTERSHEET_REFS}\" (id 0) (at 20 40 0)\n    (effects (font (size 1.27 1.27)) (justify right) hide)\n  )\n)";
        let label: GlobalLabel = lift(input);
        assert_eq!(label.properties.len(), 1);
        assert!(label.fields_autoplaced);
        assert_eq!(label.emit(0, false).unwrap(), input);
    }

    #[test]
    fn placed_symbol_with_pins() {
        let input = "(symbol (lib_id \"Device:R\") (at 100 50 90) (mirror x) (unit 1)\n  (in_bom yes) (on_board no)\n  (uuid a1a1)\n  (property \"Reference\" \"R1\" (id 0) (at 100 45 0)\n    (effects (font (size 1.27 1.27)))\n  )\n  (pin \"1\" (uuid b1b1))\n  (pin \"2\" (uuid b2b2))\n)";
        let symbol: SchematicSymbol = lift(input);
        assert!(symbol.in_bom);
        assert!(!symbol.on_board);
        assert_eq!(symbol.mirror.as_deref(), Some("x"));
        assert_eq!(symbol.pins[1], ("2".to_owned(), "b2b2".to_owned()));
        assert_eq!(symbol.emit(0, false).unwrap(), input);
    }

    #[test]
    fn sheet_with_pins() {
        let input = "(sheet (at 150 80) (size 25 15) (fields_autoplaced)\n  (stroke (width 0.1524) (type solid))\n  (fill (color 0 0 0 0))\n  (uuid c1c1)\n  (property \"Sheet name\" \"Power\" (id 0) (at 150 79 0)\n    (effects (font (size 1.27 1.27)) (justify left bottom))\n  )\n  (property \"Sheet file\" \"power.kicad_sch\" (id 1) (at 150 95.5 0)\n    (effects (font (size 1.27 1.27)) (justify left top))\n  )\n  (pin \"VIN\" input (at 150 85 180)\n    (effects (font (size 1.27 1.27)) (justify left))\n    (uuid d1d1)\n  )\n)";
        let sheet: HierarchicalSheet = lift(input);
        assert_eq!(sheet.sheet_name(), Some("Power"));
        assert_eq!(sheet.file_name(), Some("power.kicad_sch"));
        assert_eq!(sheet.pins[0].connection_type, "input");
        assert_eq!(sheet.emit(0, false).unwrap(), input);
    }

    #[test]
    fn instances() {
        let sheet: HierarchicalSheetInstance = lift(r#"(path "/" (page "1"))"#);
        assert_eq!(sheet, HierarchicalSheetInstance::new("/", "1"));
        assert_eq!(sheet.emit(0, false).unwrap(), r#"(path "/" (page "1"))"#);

        let input = "(path \"/a1a1\"\n  (reference \"R1\") (unit 1) (value \"10k\") (footprint \"Resistor_SMD:R_0603_1608Metric\")\n)";
        let symbol: SymbolInstance = lift(input);
        assert_eq!(symbol.reference, "R1");
        assert_eq!(symbol.emit(0, false).unwrap(), input);
    }
}
