//! Board-only records: header settings, layer table, setup and copper tracks.

use std::fmt::Write;

use crate::emit::{close, Indent, Num, Quoted, Token};
use crate::error::{Error, Result};
use crate::form::{emit_all, flag_value, yes_no, Form};
use crate::items::common::Position;
use crate::sexpr::{Atom, SExpr};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneralSettings {
    pub thickness: f64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self { thickness: 1.6 }
    }
}

impl Form for GeneralSettings {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("general")?;
        let mut general = GeneralSettings::default();
        for item in args {
            if item.head() == Some("thickness") {
                general.thickness = item.f64_at(1)?;
            }
        }
        Ok(general)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(general\n", pad);
        writeln!(out, "{}  (thickness {})", pad, Num(self.thickness))?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// One row of the board layer table, `(0 "F.Cu" signal)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerToken {
    pub ordinal: i64,
    pub name: String,
    /// `signal`, `power`, `mixed`, `jumper` or `user`
    pub kind: String,
    pub user_name: Option<String>,
}

impl LayerToken {
    pub fn new(ordinal: i64, name: &str, kind: &str, user_name: Option<&str>) -> Self {
        Self {
            ordinal,
            name: name.to_owned(),
            kind: kind.to_owned(),
            user_name: user_name.map(str::to_owned),
        }
    }

    /// The layer table KiCad writes for a new two-layer board
    pub fn defaults() -> Vec<LayerToken> {
        const USER: [(i64, &str, Option<&str>); 27] = [
            (32, "B.Adhes", Some("B.Adhesive")),
            (33, "F.Adhes", Some("F.Adhesive")),
            (34, "B.Paste", None),
            (35, "F.Paste", None),
            (36, "B.SilkS", Some("B.Silkscreen")),
            (37, "F.SilkS", Some("F.Silkscreen")),
            (38, "B.Mask", None),
            (39, "F.Mask", None),
            (40, "Dwgs.User", Some("User.Drawings")),
            (41, "Cmts.User", Some("User.Comments")),
            (42, "Eco1.User", Some("User.Eco1")),
            (43, "Eco2.User", Some("User.Eco2")),
            (44, "Edge.Cuts", None),
            (45, "Margin", None),
            (46, "B.CrtYd", Some("B.Courtyard")),
            (47, "F.CrtYd", Some("F.Courtyard")),
            (48, "B.Fab", None),
            (49, "F.Fab", None),
            (50, "User.1", None),
            (51, "User.2", None),
            (52, "User.3", None),
            (53, "User.4", None),
            (54, "User.5", None),
            (55, "User.6", None),
            (56, "User.7", None),
            (57, "User.8", None),
            (58, "User.9", None),
        ];
        let copper = [
            LayerToken::new(0, "F.Cu", "signal", None),
            LayerToken::new(31, "B.Cu", "signal", None),
        ];
        copper
            .into_iter()
            .chain(
                USER.iter()
                    .map(|&(ordinal, name, user_name)| LayerToken::new(ordinal, name, "user", user_name)),
            )
            .collect()
    }
}

impl Form for LayerToken {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let ordinal = sexpr
            .head()
            .and_then(|head| head.parse().ok())
            .ok_or_else(|| Error::wrong_form("<ordinal>", sexpr.head()))?;
        Ok(Self {
            ordinal,
            name: sexpr.str_at(1)?.to_owned(),
            kind: sexpr.str_at(2)?.to_owned(),
            user_name: sexpr.opt_str_at(3).map(str::to_owned),
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}({} {} {}",
            Indent(indent),
            self.ordinal,
            Quoted(&self.name),
            self.kind
        );
        if let Some(user_name) = &self.user_name {
            write!(out, " {}", Quoted(user_name))?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// A copper, dielectric or technical layer of the physical stackup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackupLayer {
    pub name: String,
    pub kind: String,
    pub color: Option<String>,
    pub thickness: Option<f64>,
    pub material: Option<String>,
    pub epsilon_r: Option<f64>,
    pub loss_tangent: Option<f64>,
}

impl Form for StackupLayer {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("layer")?;
        let mut layer = StackupLayer {
            name: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("type") => layer.kind = item.str_at(1)?.to_owned(),
                Some("color") => layer.color = Some(item.str_at(1)?.to_owned()),
                Some("thickness") => layer.thickness = Some(item.f64_at(1)?),
                Some("material") => layer.material = Some(item.str_at(1)?.to_owned()),
                Some("epsilon_r") => layer.epsilon_r = Some(item.f64_at(1)?),
                Some("loss_tangent") => layer.loss_tangent = Some(item.f64_at(1)?),
                _ => {}
            }
        }
        Ok(layer)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(layer {} (type {})",
            Indent(indent),
            Quoted(&self.name),
            Quoted(&self.kind)
        );
        if let Some(color) = &self.color {
            write!(out, " (color {})", Quoted(color))?;
        }
        if let Some(thickness) = self.thickness {
            write!(out, " (thickness {})", Num(thickness))?;
        }
        if let Some(material) = &self.material {
            write!(out, " (material {})", Quoted(material))?;
        }
        if let Some(epsilon_r) = self.epsilon_r {
            write!(out, " (epsilon_r {})", Num(epsilon_r))?;
        }
        if let Some(loss_tangent) = self.loss_tangent {
            write!(out, " (loss_tangent {})", Num(loss_tangent))?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stackup {
    pub layers: Vec<StackupLayer>,
    pub copper_finish: Option<String>,
    pub dielectric_constraints: Option<bool>,
    pub edge_connector: Option<String>,
    pub castellated_pads: bool,
    pub edge_plating: bool,
}

impl Form for Stackup {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("stackup")?;
        let mut stackup = Stackup::default();
        for item in args {
            match item.head() {
                Some("layer") => stackup.layers.push(StackupLayer::from_tree(item)?),
                Some("copper_finish") => {
                    stackup.copper_finish = Some(item.str_at(1)?.to_owned())
                }
                Some("dielectric_constraints") => {
                    stackup.dielectric_constraints = Some(item.str_at(1)? == "yes")
                }
                Some("edge_connector") => {
                    stackup.edge_connector = Some(item.str_at(1)?.to_owned())
                }
                Some("castellated_pads") => stackup.castellated_pads = flag_value(item),
                Some("edge_plating") => stackup.edge_plating = flag_value(item),
                _ => {}
            }
        }
        Ok(stackup)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(stackup\n", pad);
        emit_all(&mut out, &self.layers, indent + 2)?;
        if let Some(finish) = &self.copper_finish {
            writeln!(out, "{}  (copper_finish {})", pad, Quoted(finish))?;
        }
        if let Some(constraints) = self.dielectric_constraints {
            writeln!(out, "{}  (dielectric_constraints {})", pad, yes_no(constraints))?;
        }
        if let Some(connector) = &self.edge_connector {
            writeln!(out, "{}  (edge_connector {})", pad, connector)?;
        }
        if self.castellated_pads {
            writeln!(out, "{}  (castellated_pads yes)", pad)?;
        }
        if self.edge_plating {
            writeln!(out, "{}  (edge_plating yes)", pad)?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// `pcbplotparams`, kept as an ordered key/value list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotSettings {
    pub entries: Vec<(String, Atom)>,
}

impl PlotSettings {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, atom)| atom.value.as_str())
    }

    /// Replace an existing entry in place or append a new one.
    pub fn set(&mut self, key: &str, value: Atom) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_owned(), value)),
        }
    }
}

impl Form for PlotSettings {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("pcbplotparams")?;
        let mut entries = Vec::new();
        for item in args {
            if let (Some(key), Some(SExpr::Atom(value))) = (item.head(), item.args().first()) {
                entries.push((key.to_owned(), value.clone()));
            }
        }
        Ok(Self { entries })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(pcbplotparams\n", pad);
        for (key, value) in &self.entries {
            let value = SExpr::Atom(value.clone());
            writeln!(out, "{}  ({} {})", pad, key, value)?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupData {
    pub stackup: Option<Stackup>,
    pub pad_to_mask_clearance: f64,
    pub solder_mask_min_width: Option<f64>,
    pub pad_to_paste_clearance: Option<f64>,
    pub pad_to_paste_clearance_ratio: Option<f64>,
    pub allow_soldermask_bridges_in_footprints: bool,
    pub aux_axis_origin: Option<Position>,
    pub grid_origin: Option<Position>,
    pub plot_settings: Option<PlotSettings>,
}

impl Form for SetupData {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("setup")?;
        let mut setup = SetupData::default();
        for item in args {
            match item.head() {
                Some("stackup") => setup.stackup = Some(Stackup::from_tree(item)?),
                Some("pad_to_mask_clearance") => setup.pad_to_mask_clearance = item.f64_at(1)?,
                Some("solder_mask_min_width") => {
                    setup.solder_mask_min_width = Some(item.f64_at(1)?)
                }
                Some("pad_to_paste_clearance") => {
                    setup.pad_to_paste_clearance = Some(item.f64_at(1)?)
                }
                Some("pad_to_paste_clearance_ratio") => {
                    setup.pad_to_paste_clearance_ratio = Some(item.f64_at(1)?)
                }
                Some("allow_soldermask_bridges_in_footprints") => {
                    setup.allow_soldermask_bridges_in_footprints = flag_value(item)
                }
                Some("aux_axis_origin") => {
                    setup.aux_axis_origin = Some(Position::from_coords(item)?)
                }
                Some("grid_origin") => setup.grid_origin = Some(Position::from_coords(item)?),
                Some("pcbplotparams") => setup.plot_settings = Some(PlotSettings::from_tree(item)?),
                _ => {}
            }
        }
        Ok(setup)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(setup\n", pad);
        if let Some(stackup) = &self.stackup {
            out.push_str(&stackup.emit(indent + 2, true)?);
        }
        writeln!(
            out,
            "{}  (pad_to_mask_clearance {})",
            pad,
            Num(self.pad_to_mask_clearance)
        )?;
        let optional = [
            ("solder_mask_min_width", self.solder_mask_min_width),
            ("pad_to_paste_clearance", self.pad_to_paste_clearance),
            (
                "pad_to_paste_clearance_ratio",
                self.pad_to_paste_clearance_ratio,
            ),
        ];
        for (token, value) in optional {
            if let Some(value) = value {
                writeln!(out, "{}  ({} {})", pad, token, Num(value))?;
            }
        }
        if self.allow_soldermask_bridges_in_footprints {
            writeln!(out, "{}  (allow_soldermask_bridges_in_footprints yes)", pad)?;
        }
        if let Some(origin) = &self.aux_axis_origin {
            writeln!(out, "{}  {}", pad, origin.emit_as("aux_axis_origin"))?;
        }
        if let Some(origin) = &self.grid_origin {
            writeln!(out, "{}  {}", pad, origin.emit_as("grid_origin"))?;
        }
        if let Some(plot_settings) = &self.plot_settings {
            out.push_str(&plot_settings.emit(indent + 2, true)?);
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// A straight copper track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    pub locked: bool,
    pub start: Position,
    pub end: Position,
    pub width: f64,
    pub layer: String,
    pub net: i64,
    pub tstamp: Option<String>,
}

impl Form for Segment {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("segment")?;
        let mut segment = Segment::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("locked"), _) | (_, Some("locked")) => segment.locked = flag_value(item),
                (_, Some("start")) => segment.start = Position::from_coords(item)?,
                (_, Some("end")) => segment.end = Position::from_coords(item)?,
                (_, Some("width")) => segment.width = item.f64_at(1)?,
                (_, Some("layer")) => segment.layer = item.str_at(1)?.to_owned(),
                (_, Some("net")) => segment.net = item.parse_at(1)?,
                (_, Some("tstamp")) | (_, Some("uuid")) => {
                    segment.tstamp = Some(item.str_at(1)?.to_owned())
                }
                _ => {}
            }
        }
        Ok(segment)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(segment", Indent(indent));
        if self.locked {
            out.push_str(" locked");
        }
        write!(
            out,
            " {} {} (width {}) (layer {}) (net {})",
            self.start.emit_as("start"),
            self.end.emit_as("end"),
            Num(self.width),
            Quoted(&self.layer),
            self.net
        )?;
        if let Some(tstamp) = &self.tstamp {
            write!(out, " (tstamp {})", tstamp)?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// A curved copper track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceArc {
    pub locked: bool,
    pub start: Position,
    pub mid: Position,
    pub end: Position,
    pub width: f64,
    pub layer: String,
    pub net: i64,
    pub tstamp: Option<String>,
}

impl Form for TraceArc {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("arc")?;
        let mut arc = TraceArc::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("locked"), _) | (_, Some("locked")) => arc.locked = flag_value(item),
                (_, Some("start")) => arc.start = Position::from_coords(item)?,
                (_, Some("mid")) => arc.mid = Position::from_coords(item)?,
                (_, Some("end")) => arc.end = Position::from_coords(item)?,
                (_, Some("width")) => arc.width = item.f64_at(1)?,
                (_, Some("layer")) => arc.layer = item.str_at(1)?.to_owned(),
                (_, Some("net")) => arc.net = item.parse_at(1)?,
                (_, Some("tstamp")) | (_, Some("uuid")) => {
                    arc.tstamp = Some(item.str_at(1)?.to_owned())
                }
                _ => {}
            }
        }
        Ok(arc)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(arc", Indent(indent));
        if self.locked {
            out.push_str(" locked");
        }
        write!(
            out,
            " {} {} {} (width {}) (layer {}) (net {})",
            self.start.emit_as("start"),
            self.mid.emit_as("mid"),
            self.end.emit_as("end"),
            Num(self.width),
            Quoted(&self.layer),
            self.net
        )?;
        if let Some(tstamp) = &self.tstamp {
            write!(out, " (tstamp {})", tstamp)?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Via {
    /// `blind` or `micro`; through vias carry no type
    pub kind: Option<String>,
    pub locked: bool,
    pub position: Position,
    pub size: f64,
    pub drill: f64,
    pub layers: Vec<String>,
    pub remove_unused_layers: bool,
    pub keep_end_layers: bool,
    pub free: bool,
    pub net: i64,
    pub tstamp: Option<String>,
}

impl Form for Via {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("via")?;
        let mut via = Via::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some(kind @ ("blind" | "micro")), _) => via.kind = Some(kind.to_owned()),
                (Some("locked"), _) | (_, Some("locked")) => via.locked = flag_value(item),
                (Some("remove_unused_layers"), _) | (_, Some("remove_unused_layers")) => {
                    via.remove_unused_layers = flag_value(item)
                }
                (Some("keep_end_layers"), _) | (_, Some("keep_end_layers")) => {
                    via.keep_end_layers = flag_value(item)
                }
                (Some("free"), _) | (_, Some("free")) => via.free = flag_value(item),
                (_, Some("at")) => via.position = Position::from_tree(item)?,
                (_, Some("size")) => via.size = item.f64_at(1)?,
                (_, Some("drill")) => via.drill = item.f64_at(1)?,
                (_, Some("layers")) => {
                    via.layers = item
                        .args()
                        .iter()
                        .filter_map(SExpr::as_atom)
                        .map(str::to_owned)
                        .collect()
                }
                (_, Some("net")) => via.net = item.parse_at(1)?,
                (_, Some("tstamp")) | (_, Some("uuid")) => {
                    via.tstamp = Some(item.str_at(1)?.to_owned())
                }
                _ => {}
            }
        }
        Ok(via)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(via", Indent(indent));
        if let Some(kind) = &self.kind {
            write!(out, " {}", kind)?;
        }
        if self.locked {
            out.push_str(" locked");
        }
        write!(
            out,
            " {} (size {}) (drill {}) (layers",
            self.position.emit_as("at"),
            Num(self.size),
            Num(self.drill)
        )?;
        for layer in &self.layers {
            write!(out, " {}", Quoted(layer))?;
        }
        out.push(')');
        if self.remove_unused_layers {
            out.push_str(" (remove_unused_layers)");
        }
        if self.keep_end_layers {
            out.push_str(" (keep_end_layers)");
        }
        if self.free {
            out.push_str(" (free)");
        }
        write!(out, " (net {})", self.net)?;
        if let Some(tstamp) = &self.tstamp {
            write!(out, " (tstamp {})", tstamp)?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// Any copper routing item, in file order
#[derive(Debug, Clone, PartialEq)]
pub enum TraceItem {
    Segment(Segment),
    Arc(TraceArc),
    Via(Via),
}

impl Form for TraceItem {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        Ok(match sexpr.head() {
            Some("segment") => TraceItem::Segment(Segment::from_tree(sexpr)?),
            Some("arc") => TraceItem::Arc(TraceArc::from_tree(sexpr)?),
            Some("via") => TraceItem::Via(Via::from_tree(sexpr)?),
            head => return Err(Error::wrong_form("segment|arc|via", head)),
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        match self {
            TraceItem::Segment(item) => item.emit(indent, newline),
            TraceItem::Arc(item) => item.emit(indent, newline),
            TraceItem::Via(item) => item.emit(indent, newline),
        }
    }
}

/// Alignment target marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Target {
    /// `plus` or `x`
    pub kind: String,
    pub position: Position,
    pub size: f64,
    pub width: f64,
    pub layer: String,
    pub tstamp: Option<String>,
}

impl Form for Target {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("target")?;
        let mut target = Target {
            kind: sexpr.str_at(1)?.to_owned(),
            ..Default::default()
        };
        for item in args {
            match item.head() {
                Some("at") => target.position = Position::from_tree(item)?,
                Some("size") => target.size = item.f64_at(1)?,
                Some("width") => target.width = item.f64_at(1)?,
                Some("layer") => target.layer = item.str_at(1)?.to_owned(),
                Some("tstamp") | Some("uuid") => target.tstamp = Some(item.str_at(1)?.to_owned()),
                _ => {}
            }
        }
        Ok(target)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(target {} {} (size {}) (width {}) (layer {})",
            Indent(indent),
            Token(&self.kind),
            self.position.emit_as("at"),
            Num(self.size),
            Num(self.width),
            Quoted(&self.layer)
        );
        if let Some(tstamp) = &self.tstamp {
            write!(out, " (tstamp {})", tstamp)?;
        }
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
    #[case(r#"(0 "F.Cu" signal)"#)]
    #[case(r#"(32 "B.Adhes" user "B.Adhesive")"#)]
    fn layer_token_round_trips(#[case] input: &str) {
        assert_eq!(lift::<LayerToken>(input).emit(0, false).unwrap(), input);
    }

    #[test]
    fn layer_token_needs_numeric_head() {
        assert!(LayerToken::from_tree(&parse(r#"(layer "F.Cu" signal)"#).unwrap()).is_err());
    }

    #[test]
    fn default_layer_table() {
        let layers = LayerToken::defaults();
        let ordinals: Vec<i64> = layers.iter().map(|l| l.ordinal).collect();
        let mut expected = vec![0, 31];
        expected.extend(32..=58);
        assert_eq!(ordinals, expected);
        assert_eq!(layers[0].kind, "signal");
        assert_eq!(layers[1].name, "B.Cu");
        let courtyard = layers.iter().find(|l| l.ordinal == 46).unwrap();
        assert_eq!(courtyard.user_name.as_deref(), Some("B.Courtyard"));
        let drawings = layers.iter().find(|l| l.ordinal == 40).unwrap();
        assert_eq!(drawings.user_name.as_deref(), Some("User.Drawings"));
    }

    #[rstest]
    #[case(r#"(segment (start 1 2) (end 3 4) (width 0.25) (layer "F.Cu") (net 1) (tstamp s1))"#)]
    #[case(r#"(segment locked (start 1 2) (end 3 4) (width 0.25) (layer "B.Cu") (net 0))"#)]
    #[case(r#"(arc (start 0 0) (mid 1 1) (end 2 0) (width 0.2) (layer "F.Cu") (net 2) (tstamp a1))"#)]
    #[case(r#"(via (at 5 5) (size 0.8) (drill 0.4) (layers "F.Cu" "B.Cu") (net 1) (tstamp v1))"#)]
    #[case(r#"(via blind locked (at 5 5) (size 0.6) (drill 0.3) (layers "F.Cu" "In1.Cu") (remove_unused_layers) (keep_end_layers) (free) (net 3))"#)]
    fn trace_items_round_trip(#[case] input: &str) {
        assert_eq!(lift::<TraceItem>(input).emit(0, false).unwrap(), input);
    }

    #[test]
    fn setup_with_stackup_and_plot_params() {
        let input = r#"(setup
            (stackup
              (layer "F.SilkS" (type "Top Silk Screen"))
              (layer "F.Cu" (type "copper") (thickness 0.035))
              (layer "dielectric 1" (type "core") (thickness 1.51) (material "FR4") (epsilon_r 4.5) (loss_tangent 0.02))
              (copper_finish "None")
              (dielectric_constraints no)
            )
            (pad_to_mask_clearance 0)
            (aux_axis_origin 10 20)
            (pcbplotparams
              (layerselection 0x00010fc_ffffffff)
              (usegerberextensions false)
              (outputdirectory "")
            )
          )"#;
        let setup: SetupData = lift(input);
        let stackup = setup.stackup.as_ref().unwrap();
        assert_eq!(stackup.layers.len(), 3);
        assert_eq!(stackup.layers[2].material.as_deref(), Some("FR4"));
        assert_eq!(stackup.dielectric_constraints, Some(false));
        let plot = setup.plot_settings.as_ref().unwrap();
        assert_eq!(plot.get("usegerberextensions"), Some("false"));
        assert_eq!(plot.get("outputdirectory"), Some(""));

        let emitted = setup.emit(2, true).unwrap();
        assert!(emitted.contains("      (outputdirectory \"\")\n"));
        assert!(emitted.contains("    (aux_axis_origin 10 20)\n"));
        assert_eq!(lift::<SetupData>(&emitted), setup);
    }

    #[test]
    fn plot_settings_set_replaces_in_place() {
        let mut plot: PlotSettings = lift("(pcbplotparams (a 1) (b 2))");
        plot.set(
            "a",
            Atom {
                value: "3".into(),
                quoted: false,
            },
        );
        assert_eq!(plot.entries[0].0, "a");
        assert_eq!(plot.get("a"), Some("3"));
    }

    #[test]
    fn target_round_trips() {
        let input = r#"(target plus (at 10 10) (size 5) (width 0.1) (layer "Edge.Cuts") (tstamp t1))"#;
        assert_eq!(lift::<Target>(input).emit(0, false).unwrap(), input);
    }

    #[test]
    fn general_block() {
        let general: GeneralSettings = lift("(general (thickness 1.2))");
        assert_eq!(
            general.emit(2, true).unwrap(),
            "  (general\n    (thickness 1.2)\n  )\n"
        );
    }
}
