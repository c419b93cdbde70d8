//! Footprints: the `.kicad_mod` library file and the `(footprint ..)` form
//! placed on a board.

use std::fmt::Write;

use crate::config::CodecConfig;
use crate::document::Document;
use crate::emit::{close, Indent, Num, Quoted, Token};
use crate::error::{Error, Result};
use crate::form::{emit_all, flag_value, Form};
use crate::items::common::{Coordinate, Effects, Font, Group, Net, Position};
use crate::items::gritems::{GrText, GraphicItem, GraphicScope};
use crate::items::zones::Zone;
use crate::sexpr::SExpr;

/// Footprint type and fabrication flags, `(attr smd exclude_from_bom)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    /// `smd` or `through_hole`; unspecified when absent
    pub kind: Option<String>,
    pub board_only: bool,
    pub exclude_from_pos_files: bool,
    pub exclude_from_bom: bool,
}

impl Form for Attributes {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("attr")?;
        let mut attributes = Attributes::default();
        for item in args {
            match item.as_atom() {
                Some(kind @ ("smd" | "through_hole")) => attributes.kind = Some(kind.to_owned()),
                Some("board_only") => attributes.board_only = true,
                Some("exclude_from_pos_files") => attributes.exclude_from_pos_files = true,
                Some("exclude_from_bom") => attributes.exclude_from_bom = true,
                _ => {}
            }
        }
        Ok(attributes)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(attr", Indent(indent));
        if let Some(kind) = &self.kind {
            write!(out, " {}", kind)?;
        }
        let flags = [
            ("board_only", self.board_only),
            ("exclude_from_pos_files", self.exclude_from_pos_files),
            ("exclude_from_bom", self.exclude_from_bom),
        ];
        for (flag, set) in flags {
            if set {
                write!(out, " {}", flag)?;
            }
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// A 3D model attached to a footprint
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub path: String,
    pub hide: bool,
    pub opacity: Option<f64>,
    pub offset: Coordinate,
    pub scale: Coordinate,
    pub rotate: Coordinate,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            path: String::new(),
            hide: false,
            opacity: None,
            offset: Coordinate::default(),
            scale: Coordinate::new(1.0, 1.0, 1.0),
            rotate: Coordinate::default(),
        }
    }
}

impl Form for Model {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("model")?;
        let mut model = Model {
            path: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        let xyz = |item: &SExpr| match item.child("xyz") {
            Some(coordinate) => Coordinate::from_tree(coordinate),
            None => Err(Error::MissingValue {
                form: item.head().unwrap_or_default().to_owned(),
                index: 1,
            }),
        };
        for item in args.iter().skip(1) {
            match (item.as_atom(), item.head()) {
                (Some("hide"), _) => model.hide = true,
                (_, Some("opacity")) => model.opacity = Some(item.f64_at(1)?),
                (_, Some("offset")) | (_, Some("at")) => model.offset = xyz(item)?,
                (_, Some("scale")) => model.scale = xyz(item)?,
                (_, Some("rotate")) => model.rotate = xyz(item)?,
                _ => {}
            }
        }
        Ok(model)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(model {}", pad, Quoted(&self.path));
        if self.hide {
            out.push_str(" hide");
        }
        out.push('\n');
        if let Some(opacity) = self.opacity {
            writeln!(out, "{}  (opacity {})", pad, Num(opacity))?;
        }
        let transforms = [
            ("offset", &self.offset),
            ("scale", &self.scale),
            ("rotate", &self.rotate),
        ];
        for (token, coordinate) in transforms {
            writeln!(out, "{}  ({} {})", pad, token, coordinate.emit(0, false)?)?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Pad hole, `(drill [oval] d [w] [(offset x y)])`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillDefinition {
    pub oval: bool,
    pub diameter: f64,
    /// Slot width for oval holes
    pub width: Option<f64>,
    pub offset: Option<Position>,
}

impl Form for DrillDefinition {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("drill")?;
        let mut drill = DrillDefinition::default();
        let mut sizes = Vec::new();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("oval"), _) => drill.oval = true,
                (Some(value), _) => sizes.push(value.parse::<f64>().map_err(|_| {
                    Error::InvalidNumber {
                        form: "drill".to_owned(),
                        value: value.to_owned(),
                    }
                })?),
                (_, Some("offset")) => drill.offset = Some(Position::from_coords(item)?),
                _ => {}
            }
        }
        let mut sizes = sizes.into_iter();
        drill.diameter = sizes.next().unwrap_or_default();
        drill.width = sizes.next();
        Ok(drill)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(drill", Indent(indent));
        if self.oval {
            out.push_str(" oval");
        }
        write!(out, " {}", Num(self.diameter))?;
        if let Some(width) = self.width {
            write!(out, " {}", Num(width))?;
        }
        if let Some(offset) = &self.offset {
            write!(out, " {}", offset.emit_as("offset"))?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// Custom pad options
#[derive(Debug, Clone, PartialEq)]
pub struct PadOptions {
    /// `outline` or `convexhull`
    pub clearance: String,
    /// `rect` or `circle`
    pub anchor: String,
}

impl Default for PadOptions {
    fn default() -> Self {
        Self {
            clearance: "outline".to_owned(),
            anchor: "rect".to_owned(),
        }
    }
}

impl Form for PadOptions {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("options")?;
        let mut options = PadOptions::default();
        if let Some(clearance) = sexpr.value("clearance") {
            options.clearance = clearance.to_owned();
        }
        if let Some(anchor) = sexpr.value("anchor") {
            options.anchor = anchor.to_owned();
        }
        Ok(options)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(options (clearance {}) (anchor {})",
            Indent(indent),
            self.clearance,
            self.anchor
        );
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pad {
    pub number: String,
    /// `thru_hole`, `smd`, `connect` or `np_thru_hole`
    pub kind: String,
    /// `circle`, `rect`, `oval`, `trapezoid`, `roundrect` or `custom`
    pub shape: String,
    pub position: Position,
    pub locked: bool,
    pub width: f64,
    pub height: f64,
    pub drill: Option<DrillDefinition>,
    pub layers: Vec<String>,
    /// `pad_prop_bga`, `pad_prop_heatsink` ...
    pub property: Option<String>,
    pub remove_unused_layers: bool,
    pub keep_end_layers: bool,
    pub roundrect_rratio: Option<f64>,
    pub chamfer_ratio: Option<f64>,
    /// Chamfered corners: `top_left`, `top_right`, `bottom_left`, `bottom_right`
    pub chamfer: Vec<String>,
    pub net: Option<Net>,
    pub pin_function: Option<String>,
    pub pin_type: Option<String>,
    pub die_length: Option<f64>,
    pub solder_mask_margin: Option<f64>,
    pub solder_paste_margin: Option<f64>,
    pub solder_paste_margin_ratio: Option<f64>,
    pub clearance: Option<f64>,
    pub zone_connect: Option<i64>,
    pub thermal_bridge_width: Option<f64>,
    pub thermal_gap: Option<f64>,
    pub options: Option<PadOptions>,
    /// Shapes of a custom pad, always `gr_*` items
    pub primitives: Vec<GraphicItem>,
    pub tstamp: Option<String>,
}

impl Form for Pad {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("pad")?;
        let mut pad = Pad {
            number: sexpr.str_at(1)?.to_owned(),
            kind: sexpr.str_at(2)?.to_owned(),
            shape: sexpr.str_at(3)?.to_owned(),
            ..Default::default()
        };
        for item in args.iter().skip(3) {
            match (item.as_atom(), item.head()) {
                (Some("locked"), _) | (_, Some("locked")) => pad.locked = flag_value(item),
                (_, Some("at")) => pad.position = Position::from_tree(item)?,
                (_, Some("size")) => {
                    pad.width = item.f64_at(1)?;
                    pad.height = item.f64_at(2)?;
                }
                (_, Some("drill")) => pad.drill = Some(DrillDefinition::from_tree(item)?),
                (_, Some("layers")) => {
                    pad.layers = item
                        .args()
                        .iter()
                        .filter_map(SExpr::as_atom)
                        .map(str::to_owned)
                        .collect()
                }
                (_, Some("property")) => pad.property = Some(item.str_at(1)?.to_owned()),
                (_, Some("remove_unused_layers")) => pad.remove_unused_layers = flag_value(item),
                (_, Some("keep_end_layers")) => pad.keep_end_layers = flag_value(item),
                (_, Some("roundrect_rratio")) => pad.roundrect_rratio = Some(item.f64_at(1)?),
                (_, Some("chamfer_ratio")) => pad.chamfer_ratio = Some(item.f64_at(1)?),
                (_, Some("chamfer")) => {
                    pad.chamfer = item
                        .args()
                        .iter()
                        .filter_map(SExpr::as_atom)
                        .map(str::to_owned)
                        .collect()
                }
                (_, Some("net")) => pad.net = Some(Net::from_tree(item)?),
                (_, Some("pinfunction")) => pad.pin_function = Some(item.str_at(1)?.to_owned()),
                (_, Some("pintype")) => pad.pin_type = Some(item.str_at(1)?.to_owned()),
                (_, Some("die_length")) => pad.die_length = Some(item.f64_at(1)?),
                (_, Some("solder_mask_margin")) => pad.solder_mask_margin = Some(item.f64_at(1)?),
                (_, Some("solder_paste_margin")) => {
                    pad.solder_paste_margin = Some(item.f64_at(1)?)
                }
                (_, Some("solder_paste_margin_ratio")) => {
                    pad.solder_paste_margin_ratio = Some(item.f64_at(1)?)
                }
                (_, Some("clearance")) => pad.clearance = Some(item.f64_at(1)?),
                (_, Some("zone_connect")) => pad.zone_connect = Some(item.parse_at(1)?),
                (_, Some("thermal_bridge_width")) | (_, Some("thermal_width")) => {
                    pad.thermal_bridge_width = Some(item.f64_at(1)?)
                }
                (_, Some("thermal_gap")) => pad.thermal_gap = Some(item.f64_at(1)?),
                (_, Some("options")) => pad.options = Some(PadOptions::from_tree(item)?),
                (_, Some("primitives")) => {
                    pad.primitives = item
                        .args()
                        .iter()
                        .filter(|p| p.head().is_some_and(GraphicItem::is_graphic))
                        .map(GraphicItem::from_tree)
                        .collect::<Result<_>>()?
                }
                (_, Some("tstamp")) | (_, Some("uuid")) => {
                    pad.tstamp = Some(item.str_at(1)?.to_owned())
                }
                _ => {}
            }
        }
        Ok(pad)
    }

    /// Custom pads spread their options and primitives over several lines.
    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(pad {} {} {} {}",
            pad,
            Quoted(&self.number),
            self.kind,
            self.shape,
            self.position.emit_as("at")
        );
        if self.locked {
            out.push_str(" locked");
        }
        write!(out, " (size {} {})", Num(self.width), Num(self.height))?;
        if let Some(drill) = &self.drill {
            write!(out, " {}", drill.emit(0, false)?)?;
        }
        out.push_str(" (layers");
        for layer in &self.layers {
            write!(out, " {}", Quoted(layer))?;
        }
        out.push(')');
        if let Some(property) = &self.property {
            write!(out, " (property {})", property)?;
        }
        if self.remove_unused_layers {
            out.push_str(" (remove_unused_layers)");
        }
        if self.keep_end_layers {
            out.push_str(" (keep_end_layers)");
        }
        if let Some(ratio) = self.roundrect_rratio {
            write!(out, " (roundrect_rratio {})", Num(ratio))?;
        }
        if let Some(ratio) = self.chamfer_ratio {
            write!(out, " (chamfer_ratio {})", Num(ratio))?;
        }
        if !self.chamfer.is_empty() {
            write!(out, " (chamfer {})", self.chamfer.join(" "))?;
        }
        if let Some(net) = &self.net {
            write!(out, " {}", net.emit(0, false)?)?;
        }
        if let Some(function) = &self.pin_function {
            write!(out, " (pinfunction {})", Quoted(function))?;
        }
        if let Some(pin_type) = &self.pin_type {
            write!(out, " (pintype {})", Quoted(pin_type))?;
        }
        let numeric = [
            ("die_length", self.die_length),
            ("solder_mask_margin", self.solder_mask_margin),
            ("solder_paste_margin", self.solder_paste_margin),
            ("solder_paste_margin_ratio", self.solder_paste_margin_ratio),
            ("clearance", self.clearance),
        ];
        for (token, value) in numeric {
            if let Some(value) = value {
                write!(out, " ({} {})", token, Num(value))?;
            }
        }
        if let Some(connect) = self.zone_connect {
            write!(out, " (zone_connect {})", connect)?;
        }
        if let Some(width) = self.thermal_bridge_width {
            write!(out, " (thermal_bridge_width {})", Num(width))?;
        }
        if let Some(gap) = self.thermal_gap {
            write!(out, " (thermal_gap {})", Num(gap))?;
        }

        if self.options.is_none() && self.primitives.is_empty() {
            if let Some(tstamp) = &self.tstamp {
                write!(out, " (tstamp {})", tstamp)?;
            }
            close(&mut out, newline);
            return Ok(out);
        }

        out.push('\n');
        if let Some(options) = &self.options {
            out.push_str(&options.emit(indent + 2, true)?);
        }
        if !self.primitives.is_empty() {
            writeln!(out, "{}  (primitives", pad)?;
            emit_all(&mut out, &self.primitives, indent + 4)?;
            writeln!(out, "{}  )", pad)?;
        }
        if let Some(tstamp) = &self.tstamp {
            writeln!(out, "{}  (tstamp {})", pad, tstamp)?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Mounting style used by [`Footprint::create_new`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootprintType {
    Smd,
    ThroughHole,
    Other,
}

impl FootprintType {
    fn attribute(self) -> Option<String> {
        match self {
            FootprintType::Smd => Some("smd".to_owned()),
            FootprintType::ThroughHole => Some("through_hole".to_owned()),
            FootprintType::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// `Library:Name` on a board, bare name in a library file
    pub library_id: String,
    pub locked: bool,
    pub placed: bool,
    /// Only written in library files
    pub version: Option<u32>,
    pub generator: Option<String>,
    pub layer: String,
    pub tedit: Option<String>,
    pub tstamp: Option<String>,
    /// Only set when placed on a board
    pub position: Option<Position>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub properties: Vec<(String, String)>,
    /// Schematic symbol this footprint was annotated from
    pub path: Option<String>,
    pub autoplace_cost90: Option<i64>,
    pub autoplace_cost180: Option<i64>,
    pub solder_mask_margin: Option<f64>,
    pub solder_paste_margin: Option<f64>,
    pub solder_paste_ratio: Option<f64>,
    pub clearance: Option<f64>,
    pub zone_connect: Option<i64>,
    pub thermal_width: Option<f64>,
    pub thermal_gap: Option<f64>,
    pub attributes: Option<Attributes>,
    pub graphic_items: Vec<GraphicItem>,
    pub pads: Vec<Pad>,
    pub zones: Vec<Zone>,
    pub groups: Vec<Group>,
    pub models: Vec<Model>,
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            library_id: String::new(),
            locked: false,
            placed: false,
            version: None,
            generator: None,
            layer: "F.Cu".to_owned(),
            tedit: None,
            tstamp: None,
            position: None,
            description: None,
            tags: None,
            properties: Vec::new(),
            path: None,
            autoplace_cost90: None,
            autoplace_cost180: None,
            solder_mask_margin: None,
            solder_paste_margin: None,
            solder_paste_ratio: None,
            clearance: None,
            zone_connect: None,
            thermal_width: None,
            thermal_gap: None,
            attributes: None,
            graphic_items: Vec::new(),
            pads: Vec::new(),
            zones: Vec::new(),
            groups: Vec::new(),
            models: Vec::new(),
        }
    }
}

impl Footprint {
    /// A library footprint with the reference, value and fab reference texts
    /// KiCad adds to a new footprint.
    pub fn create_new(
        library_id: impl Into<String>,
        value: impl Into<String>,
        kind: FootprintType,
        config: &CodecConfig,
    ) -> Self {
        let text = |kind: &str, text: String, y: f64, layer: &str| {
            GraphicItem::Text(GrText {
                scope: GraphicScope::Footprint,
                kind: Some(kind.to_owned()),
                text,
                position: Position::new(0.0, y),
                layer: layer.to_owned(),
                effects: Effects {
                    font: Font {
                        height: 1.0,
                        width: 1.0,
                        thickness: Some(0.15),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                ..Default::default()
            })
        };
        Self {
            library_id: library_id.into(),
            version: Some(config.version),
            generator: Some(config.generator.clone()),
            attributes: Some(Attributes {
                kind: kind.attribute(),
                ..Default::default()
            }),
            graphic_items: vec![
                text("reference", "REF**".to_owned(), -0.5, "F.SilkS"),
                text("value", value.into(), 1.0, "F.Fab"),
                text("user", "${REFERENCE}".to_owned(), 2.5, "F.Fab"),
            ],
            ..Default::default()
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl Form for Footprint {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let (_, args) = sexpr.expect_one_of(&["footprint", "module"])?;
        let mut footprint = Footprint {
            library_id: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        for item in args.iter().skip(1) {
            let head = match (item.as_atom(), item.head()) {
                (Some("locked"), _) => {
                    footprint.locked = true;
                    continue;
                }
                (Some("placed"), _) => {
                    footprint.placed = true;
                    continue;
                }
                (_, Some(head)) => head,
                _ => continue,
            };
            match head {
                "locked" => footprint.locked = flag_value(item),
                "placed" => footprint.placed = flag_value(item),
                "version" => footprint.version = Some(item.parse_at(1)?),
                "generator" => footprint.generator = Some(item.str_at(1)?.to_owned()),
                "layer" => footprint.layer = item.str_at(1)?.to_owned(),
                "tedit" => footprint.tedit = Some(item.str_at(1)?.to_owned()),
                "tstamp" | "uuid" => footprint.tstamp = Some(item.str_at(1)?.to_owned()),
                "at" => footprint.position = Some(Position::from_tree(item)?),
                "descr" => footprint.description = Some(item.str_at(1)?.to_owned()),
                "tags" => footprint.tags = Some(item.str_at(1)?.to_owned()),
                "property" => footprint
                    .properties
                    .push((item.str_at(1)?.to_owned(), item.str_at(2)?.to_owned())),
                "path" => footprint.path = Some(item.str_at(1)?.to_owned()),
                "autoplace_cost90" => footprint.autoplace_cost90 = Some(item.parse_at(1)?),
                "autoplace_cost180" => footprint.autoplace_cost180 = Some(item.parse_at(1)?),
                "solder_mask_margin" => footprint.solder_mask_margin = Some(item.f64_at(1)?),
                "solder_paste_margin" => footprint.solder_paste_margin = Some(item.f64_at(1)?),
                "solder_paste_ratio" => footprint.solder_paste_ratio = Some(item.f64_at(1)?),
                "clearance" => footprint.clearance = Some(item.f64_at(1)?),
                "zone_connect" => footprint.zone_connect = Some(item.parse_at(1)?),
                "thermal_width" => footprint.thermal_width = Some(item.f64_at(1)?),
                "thermal_gap" => footprint.thermal_gap = Some(item.f64_at(1)?),
                "attr" => footprint.attributes = Some(Attributes::from_tree(item)?),
                "pad" => footprint.pads.push(Pad::from_tree(item)?),
                "zone" => footprint.zones.push(Zone::from_tree(item)?),
                "group" => footprint.groups.push(Group::from_tree(item)?),
                "model" => footprint.models.push(Model::from_tree(item)?),
                head if GraphicItem::is_graphic(head) => {
                    footprint.graphic_items.push(GraphicItem::from_tree(item)?)
                }
                _ => {}
            }
        }
        Ok(footprint)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(footprint {}", pad, Quoted(&self.library_id));
        if self.locked {
            out.push_str(" locked");
        }
        if self.placed {
            out.push_str(" placed");
        }
        if let Some(version) = self.version {
            write!(out, " (version {})", version)?;
        }
        if let Some(generator) = &self.generator {
            write!(out, " (generator {})", Token(generator))?;
        }
        writeln!(out, " (layer {})", Quoted(&self.layer))?;

        let stamps = [("tedit", &self.tedit), ("tstamp", &self.tstamp)];
        let stamps: Vec<_> = stamps
            .into_iter()
            .filter_map(|(token, value)| value.as_ref().map(|v| format!("({} {})", token, v)))
            .collect();
        if !stamps.is_empty() {
            writeln!(out, "{}  {}", pad, stamps.join(" "))?;
        }
        if let Some(position) = &self.position {
            writeln!(out, "{}  {}", pad, position.emit_as("at"))?;
        }
        if let Some(description) = &self.description {
            writeln!(out, "{}  (descr {})", pad, Quoted(description))?;
        }
        if let Some(tags) = &self.tags {
            writeln!(out, "{}  (tags {})", pad, Quoted(tags))?;
        }
        for (key, value) in &self.properties {
            writeln!(out, "{}  (property {} {})", pad, Quoted(key), Quoted(value))?;
        }
        if let Some(path) = &self.path {
            writeln!(out, "{}  (path {})", pad, Quoted(path))?;
        }
        let costs = [
            ("autoplace_cost90", self.autoplace_cost90),
            ("autoplace_cost180", self.autoplace_cost180),
            ("zone_connect", self.zone_connect),
        ];
        for (token, value) in costs {
            if let Some(value) = value {
                writeln!(out, "{}  ({} {})", pad, token, value)?;
            }
        }
        let margins = [
            ("solder_mask_margin", self.solder_mask_margin),
            ("solder_paste_margin", self.solder_paste_margin),
            ("solder_paste_ratio", self.solder_paste_ratio),
            ("clearance", self.clearance),
            ("thermal_width", self.thermal_width),
            ("thermal_gap", self.thermal_gap),
        ];
        for (token, value) in margins {
            if let Some(value) = value {
                writeln!(out, "{}  ({} {})", pad, token, Num(value))?;
            }
        }
        if let Some(attributes) = &self.attributes {
            out.push_str(&attributes.emit(indent + 2, true)?);
        }
        emit_all(&mut out, &self.graphic_items, indent + 2)?;
        emit_all(&mut out, &self.pads, indent + 2)?;
        emit_all(&mut out, &self.zones, indent + 2)?;
        emit_all(&mut out, &self.groups, indent + 2)?;
        emit_all(&mut out, &self.models, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

impl Document for Footprint {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        <Self as Form>::from_tree(sexpr)
    }

    fn to_tree_string(&self, indent: usize, newline: bool) -> Result<String> {
        self.emit(indent, newline)
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
    #[case(r#"(pad "1" smd roundrect (at -0.825 0) (size 0.8 0.95) (layers "F.Cu" "F.Paste" "F.Mask") (roundrect_rratio 0.25) (tstamp p1))"#)]
    #[case(r#"(pad "2" thru_hole circle (at 2.54 0) (size 1.7 1.7) (drill 1) (layers "*.Cu" "*.Mask") (net 2 "VCC") (pinfunction "VCC") (pintype "power_in") (tstamp p2))"#)]
    #[case(r#"(pad "" np_thru_hole oval (at 0 0 90) (size 2 1) (drill oval 2 1 (offset 0.1 0)) (layers "*.Cu") (solder_mask_margin 0.05) (zone_connect 2) (thermal_bridge_width 0.3) (thermal_gap 0.4))"#)]
    #[case(r#"(pad "3" smd rect (at 1 1) locked (size 1 1) (layers "B.Cu") (chamfer_ratio 0.2) (chamfer top_left bottom_right))"#)]
    fn pads_round_trip(#[case] input: &str) {
        assert_eq!(lift::<Pad>(input).emit(0, false).unwrap(), input);
    }

    #[test]
    fn custom_pad_primitives_stay_board_scoped() {
        let input = "(pad \"1\" smd custom (at 0 0) (size 0.5 0.5) (layers \"F.Cu\" \"F.Mask\")\n  (options (clearance outline) (anchor circle))\n  (primitives\n    (gr_circle (center 0 0) (end 0.5 0) (width 0.1) (fill yes))\n  )\n  (tstamp p3)\n)";
        let pad: Pad = lift(input);
        assert_eq!(pad.options.as_ref().unwrap().anchor, "circle");
        let GraphicItem::Circle(circle) = &pad.primitives[0] else {
            panic!("expected a circle")
        };
        assert_eq!(circle.scope, GraphicScope::Board);
        assert_eq!(pad.emit(0, false).unwrap(), input);
    }

    #[test]
    fn drill_with_slot() {
        let drill: DrillDefinition = lift("(drill oval 1.2 0.8)");
        assert!(drill.oval);
        assert_eq!(drill.diameter, 1.2);
        assert_eq!(drill.width, Some(0.8));
    }

    #[test]
    fn model_transforms() {
        let input = "(model \"${KICAD6_3DMODEL_DIR}/R.wrl\"\n  (offset (xyz 0 0 0))\n  (scale (xyz 1 1 1))\n  (rotate (xyz 0 0 -90))\n)";
        let model: Model = lift(input);
        assert_eq!(model.rotate.z, -90.0);
        assert_eq!(model.emit(0, false).unwrap(), input);
    }

    #[test]
    fn legacy_module_head_is_accepted() {
        let footprint: Footprint =
            lift(r#"(module "R_0603" (layer "F.Cu") (tedit 5F68FEEE) (attr smd))"#);
        assert_eq!(footprint.tedit.as_deref(), Some("5F68FEEE"));
        assert!(<Footprint as Form>::from_tree(&parse("(symbol \"R\")").unwrap()).is_err());
    }

    #[test]
    fn new_footprint_has_reference_and_value() {
        let config = CodecConfig::default();
        let footprint = Footprint::create_new("R_0603", "10k", FootprintType::Smd, &config);
        let text = footprint.to_tree_string(0, true).unwrap();
        assert!(text.starts_with(
            "(footprint \"R_0603\" (version 20211014) (generator kicad_files) (layer \"F.Cu\")\n"
        ));
        assert!(text.contains("  (attr smd)\n"));
        assert!(text.contains("(fp_text reference \"REF**\" (at 0 -0.5) (layer \"F.SilkS\")"));
        assert!(text.contains("(fp_text value \"10k\" (at 0 1) (layer \"F.Fab\")"));

        let reread = <Footprint as Document>::from_str(&text).unwrap();
        assert_eq!(reread, footprint);
    }

    #[test]
    fn placed_footprint_keeps_properties() {
        let input = "(footprint \"Resistor_SMD:R_0603\" locked (layer \"B.Cu\")\n  (tedit 5F68FEEE) (tstamp f1)\n  (at 100 50 180)\n  (descr \"Resistor SMD 0603\")\n  (tags \"resistor\")\n  (property \"Sheetfile\" \"main.kicad_sch\")\n  (path \"/a1a1\")\n  (attr smd)\n  (pad \"1\" smd rect (at -0.8 0 180) (size 0.8 0.9) (layers \"B.Cu\" \"B.Paste\" \"B.Mask\") (net 1 \"GND\") (tstamp p1))\n)";
        let footprint: Footprint = lift(input);
        assert!(footprint.locked);
        assert_eq!(footprint.property("Sheetfile"), Some("main.kicad_sch"));
        assert_eq!(footprint.pads[0].net, Some(Net::new(1, "GND")));
        assert_eq!(footprint.emit(0, false).unwrap(), input);
    }
}
