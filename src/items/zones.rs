//! Copper pours and rule areas.

use std::fmt::Write;

use crate::emit::{close, Indent, Num, Quoted};
use crate::error::Result;
use crate::form::{emit_all, flag_value, yes_no, Form};
use crate::items::common::{read_points, write_points, Position};
use crate::sexpr::SExpr;

#[derive(Debug, Clone, PartialEq)]
pub struct Hatch {
    /// `none`, `edge` or `full`
    pub style: String,
    pub pitch: f64,
}

impl Default for Hatch {
    fn default() -> Self {
        Self {
            style: "edge".to_owned(),
            pitch: 0.508,
        }
    }
}

impl Form for Hatch {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("hatch")?;
        Ok(Self {
            style: sexpr.str_at(1)?.to_owned(),
            pitch: sexpr.f64_at(2)?,
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(hatch {} {}",
            Indent(indent),
            self.style,
            Num(self.pitch)
        );
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneConnectPads {
    /// `yes`, `no` or `thru_hole_only`; thermal reliefs when absent
    pub kind: Option<String>,
    pub clearance: f64,
}

impl Form for ZoneConnectPads {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("connect_pads")?;
        let mut connect = ZoneConnectPads::default();
        for item in args {
            match item {
                SExpr::Atom(atom) => connect.kind = Some(atom.value.clone()),
                SExpr::List(_) => {
                    if item.head() == Some("clearance") {
                        connect.clearance = item.f64_at(1)?;
                    }
                }
            }
        }
        Ok(connect)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(connect_pads", Indent(indent));
        if let Some(kind) = &self.kind {
            write!(out, " {}", kind)?;
        }
        write!(out, " (clearance {})", Num(self.clearance))?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Rule-area restrictions; each entry is `allowed` or `not_allowed`
#[derive(Debug, Clone, PartialEq)]
pub struct KeepoutSettings {
    pub tracks: String,
    pub vias: String,
    pub pads: String,
    pub copperpour: String,
    pub footprints: String,
}

impl Default for KeepoutSettings {
    fn default() -> Self {
        let not_allowed = || "not_allowed".to_owned();
        Self {
            tracks: not_allowed(),
            vias: not_allowed(),
            pads: not_allowed(),
            copperpour: not_allowed(),
            footprints: "allowed".to_owned(),
        }
    }
}

impl Form for KeepoutSettings {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("keepout")?;
        let mut keepout = KeepoutSettings::default();
        for item in args {
            let slot = match item.head() {
                Some("tracks") => &mut keepout.tracks,
                Some("vias") => &mut keepout.vias,
                Some("pads") => &mut keepout.pads,
                Some("copperpour") => &mut keepout.copperpour,
                Some("footprints") => &mut keepout.footprints,
                _ => continue,
            };
            *slot = item.str_at(1)?.to_owned();
        }
        Ok(keepout)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(keepout (tracks {}) (vias {}) (pads {}) (copperpour {}) (footprints {})",
            Indent(indent),
            self.tracks,
            self.vias,
            self.pads,
            self.copperpour,
            self.footprints
        );
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillSettings {
    /// The zone has been filled
    pub yes: bool,
    /// `hatch` for hatched fills, solid when absent
    pub mode: Option<String>,
    pub thermal_gap: f64,
    pub thermal_bridge_width: f64,
    /// `chamfer` or `fillet`
    pub smoothing: Option<String>,
    pub radius: Option<f64>,
    pub island_removal_mode: Option<i64>,
    pub island_area_min: Option<f64>,
    pub hatch_thickness: Option<f64>,
    pub hatch_gap: Option<f64>,
    pub hatch_orientation: Option<f64>,
    pub hatch_smoothing_level: Option<f64>,
    pub hatch_smoothing_value: Option<f64>,
    pub hatch_border_algorithm: Option<String>,
    pub hatch_min_hole_area: Option<f64>,
}

impl FillSettings {
    fn numeric_slot(&mut self, token: &str) -> Option<&mut Option<f64>> {
        Some(match token {
            "radius" => &mut self.radius,
            "island_area_min" => &mut self.island_area_min,
            "hatch_thickness" => &mut self.hatch_thickness,
            "hatch_gap" => &mut self.hatch_gap,
            "hatch_orientation" => &mut self.hatch_orientation,
            "hatch_smoothing_level" => &mut self.hatch_smoothing_level,
            "hatch_smoothing_value" => &mut self.hatch_smoothing_value,
            "hatch_min_hole_area" => &mut self.hatch_min_hole_area,
            _ => return None,
        })
    }
}

impl Form for FillSettings {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("fill")?;
        let mut fill = FillSettings::default();
        for item in args {
            let Some(head) = item.head() else {
                fill.yes |= item.as_atom() == Some("yes");
                continue;
            };
            match head {
                "mode" => fill.mode = Some(item.str_at(1)?.to_owned()),
                "thermal_gap" => fill.thermal_gap = item.f64_at(1)?,
                "thermal_bridge_width" => fill.thermal_bridge_width = item.f64_at(1)?,
                "smoothing" => fill.smoothing = Some(item.str_at(1)?.to_owned()),
                "island_removal_mode" => fill.island_removal_mode = Some(item.parse_at(1)?),
                "hatch_border_algorithm" => {
                    fill.hatch_border_algorithm = Some(item.str_at(1)?.to_owned())
                }
                other => {
                    let value = item.f64_at(1);
                    if let Some(slot) = fill.numeric_slot(other) {
                        *slot = Some(value?);
                    }
                }
            }
        }
        Ok(fill)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(fill", Indent(indent));
        if self.yes {
            out.push_str(" yes");
        }
        if let Some(mode) = &self.mode {
            write!(out, " (mode {})", mode)?;
        }
        write!(
            out,
            " (thermal_gap {}) (thermal_bridge_width {})",
            Num(self.thermal_gap),
            Num(self.thermal_bridge_width)
        )?;
        if let Some(smoothing) = &self.smoothing {
            write!(out, " (smoothing {})", smoothing)?;
        }
        if let Some(radius) = self.radius {
            write!(out, " (radius {})", Num(radius))?;
        }
        if let Some(mode) = self.island_removal_mode {
            write!(out, " (island_removal_mode {})", mode)?;
        }
        let numeric = [
            ("island_area_min", self.island_area_min),
            ("hatch_thickness", self.hatch_thickness),
            ("hatch_gap", self.hatch_gap),
            ("hatch_orientation", self.hatch_orientation),
            ("hatch_smoothing_level", self.hatch_smoothing_level),
            ("hatch_smoothing_value", self.hatch_smoothing_value),
        ];
        for (token, value) in numeric {
            if let Some(value) = value {
                write!(out, " ({} {})", token, Num(value))?;
            }
        }
        if let Some(algorithm) = &self.hatch_border_algorithm {
            write!(out, " (hatch_border_algorithm {})", algorithm)?;
        }
        if let Some(area) = self.hatch_min_hole_area {
            write!(out, " (hatch_min_hole_area {})", Num(area))?;
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// Outline of a zone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZonePolygon {
    pub points: Vec<Position>,
}

impl Form for ZonePolygon {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("polygon")?;
        let mut polygon = ZonePolygon::default();
        for item in args {
            if item.head() == Some("pts") {
                polygon.points = read_points(item)?;
            }
        }
        Ok(polygon)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(polygon\n", pad);
        write_points(&mut out, &self.points, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Computed fill area on one layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilledPolygon {
    pub layer: String,
    pub island: bool,
    pub points: Vec<Position>,
}

impl Form for FilledPolygon {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("filled_polygon")?;
        let mut polygon = FilledPolygon::default();
        for item in args {
            match item.head() {
                Some("layer") => polygon.layer = item.str_at(1)?.to_owned(),
                Some("island") => polygon.island = true,
                Some("pts") => polygon.points = read_points(item)?,
                _ => {}
            }
        }
        Ok(polygon)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(filled_polygon\n", pad);
        writeln!(out, "{}  (layer {})", pad, Quoted(&self.layer))?;
        if self.island {
            writeln!(out, "{}  (island)", pad)?;
        }
        write_points(&mut out, &self.points, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// Legacy segment-based fill
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillSegments {
    pub layer: String,
    pub points: Vec<Position>,
}

impl Form for FillSegments {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("fill_segments")?;
        let mut segments = FillSegments::default();
        for item in args {
            match item.head() {
                Some("layer") => segments.layer = item.str_at(1)?.to_owned(),
                Some("pts") => segments.points = read_points(item)?,
                _ => {}
            }
        }
        Ok(segments)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(fill_segments\n", pad);
        writeln!(out, "{}  (layer {})", pad, Quoted(&self.layer))?;
        write_points(&mut out, &self.points, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Zone {
    pub locked: bool,
    pub net: i64,
    pub net_name: String,
    /// One entry is written as `(layer ..)`, several as `(layers ..)`
    pub layers: Vec<String>,
    pub tstamp: Option<String>,
    pub name: Option<String>,
    pub hatch: Hatch,
    pub priority: Option<i64>,
    pub connect_pads: ZoneConnectPads,
    pub min_thickness: f64,
    pub filled_areas_thickness: Option<bool>,
    pub keepout: Option<KeepoutSettings>,
    pub fill: Option<FillSettings>,
    pub polygons: Vec<ZonePolygon>,
    pub filled_polygons: Vec<FilledPolygon>,
    pub fill_segments: Vec<FillSegments>,
}

impl Form for Zone {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("zone")?;
        let mut zone = Zone::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("locked"), _) | (_, Some("locked")) => zone.locked = flag_value(item),
                (_, Some("net")) => zone.net = item.parse_at(1)?,
                (_, Some("net_name")) => zone.net_name = item.str_at(1)?.to_owned(),
                (_, Some("layer")) | (_, Some("layers")) => {
                    zone.layers = item
                        .args()
                        .iter()
                        .filter_map(SExpr::as_atom)
                        .map(str::to_owned)
                        .collect()
                }
                (_, Some("tstamp")) | (_, Some("uuid")) => {
                    zone.tstamp = Some(item.str_at(1)?.to_owned())
                }
                (_, Some("name")) => zone.name = Some(item.str_at(1)?.to_owned()),
                (_, Some("hatch")) => zone.hatch = Hatch::from_tree(item)?,
                (_, Some("priority")) => zone.priority = Some(item.parse_at(1)?),
                (_, Some("connect_pads")) => zone.connect_pads = ZoneConnectPads::from_tree(item)?,
                (_, Some("min_thickness")) => zone.min_thickness = item.f64_at(1)?,
                (_, Some("filled_areas_thickness")) => {
                    zone.filled_areas_thickness = Some(item.str_at(1)? == "yes")
                }
                (_, Some("keepout")) => zone.keepout = Some(KeepoutSettings::from_tree(item)?),
                (_, Some("fill")) => zone.fill = Some(FillSettings::from_tree(item)?),
                (_, Some("polygon")) => zone.polygons.push(ZonePolygon::from_tree(item)?),
                (_, Some("filled_polygon")) => {
                    zone.filled_polygons.push(FilledPolygon::from_tree(item)?)
                }
                (_, Some("fill_segments")) => {
                    zone.fill_segments.push(FillSegments::from_tree(item)?)
                }
                _ => {}
            }
        }
        Ok(zone)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(zone", pad);
        if self.locked {
            out.push_str(" locked");
        }
        write!(
            out,
            " (net {}) (net_name {})",
            self.net,
            Quoted(&self.net_name)
        )?;
        match self.layers.as_slice() {
            [layer] => write!(out, " (layer {})", Quoted(layer))?,
            layers => {
                out.push_str(" (layers");
                for layer in layers {
                    write!(out, " {}", Quoted(layer))?;
                }
                out.push(')');
            }
        }
        if let Some(tstamp) = &self.tstamp {
            write!(out, " (tstamp {})", tstamp)?;
        }
        if let Some(name) = &self.name {
            write!(out, " (name {})", Quoted(name))?;
        }
        writeln!(out, " {}", self.hatch.emit(0, false)?)?;
        if let Some(priority) = self.priority {
            writeln!(out, "{}  (priority {})", pad, priority)?;
        }
        out.push_str(&self.connect_pads.emit(indent + 2, true)?);
        write!(out, "{}  (min_thickness {})", pad, Num(self.min_thickness))?;
        if let Some(thickness) = self.filled_areas_thickness {
            write!(out, " (filled_areas_thickness {})", yes_no(thickness))?;
        }
        out.push('\n');
        if let Some(keepout) = &self.keepout {
            out.push_str(&keepout.emit(indent + 2, true)?);
        }
        if let Some(fill) = &self.fill {
            out.push_str(&fill.emit(indent + 2, true)?);
        }
        emit_all(&mut out, &self.polygons, indent + 2)?;
        emit_all(&mut out, &self.filled_polygons, indent + 2)?;
        emit_all(&mut out, &self.fill_segments, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse;

    const ZONE: &str = r#"(zone (net 1) (net_name "GND") (layer "F.Cu") (tstamp z1) (hatch edge 0.508)
    (priority 2)
    (connect_pads thru_hole_only (clearance 0.3))
    (min_thickness 0.254) (filled_areas_thickness no)
    (fill yes (thermal_gap 0.508) (thermal_bridge_width 0.508) (smoothing fillet) (radius 0.5) (island_removal_mode 2) (island_area_min 10))
    (polygon
      (pts
        (xy 0 0)
        (xy 10 0)
        (xy 10 10)
      )
    )
    (filled_polygon
      (layer "F.Cu")
      (island)
      (pts
        (xy 1 1)
        (xy 9 1)
        (xy 9 9)
      )
    )
  )"#;

    #[test]
    fn zone_emits_in_kicad_layout() {
        let zone = Zone::from_tree(&parse(ZONE).unwrap()).unwrap();
        assert_eq!(zone.priority, Some(2));
        assert_eq!(zone.connect_pads.kind.as_deref(), Some("thru_hole_only"));
        assert!(zone.fill.as_ref().unwrap().yes);
        assert!(zone.filled_polygons[0].island);
        assert_eq!(zone.emit(2, false).unwrap(), format!("  {}", ZONE));
    }

    #[test]
    fn multi_layer_keepout_zone() {
        let input = r#"(zone (net 0) (net_name "") (layers "F.Cu" "B.Cu") (hatch full 0.5)
          (connect_pads (clearance 0))
          (min_thickness 0.25)
          (keepout (tracks not_allowed) (vias allowed) (pads not_allowed) (copperpour not_allowed) (footprints allowed))
          (fill (thermal_gap 0.5) (thermal_bridge_width 0.5))
          (polygon (pts (xy 0 0) (xy 5 0) (xy 5 5)))
        )"#;
        let zone = Zone::from_tree(&parse(input).unwrap()).unwrap();
        assert_eq!(zone.layers, vec!["F.Cu", "B.Cu"]);
        assert_eq!(zone.keepout.as_ref().unwrap().vias, "allowed");
        let emitted = zone.emit(0, true).unwrap();
        assert!(emitted.starts_with(
            "(zone (net 0) (net_name \"\") (layers \"F.Cu\" \"B.Cu\") (hatch full 0.5)\n"
        ));
        assert_eq!(Zone::from_tree(&parse(&emitted).unwrap()).unwrap(), zone);
    }

    #[test]
    fn hatched_fill_settings() {
        let input = "(fill yes (mode hatch) (thermal_gap 0.5) (thermal_bridge_width 0.5) (hatch_thickness 1) (hatch_gap 1.5) (hatch_orientation 45) (hatch_border_algorithm hatch_thickness) (hatch_min_hole_area 0.3))";
        let fill = FillSettings::from_tree(&parse(input).unwrap()).unwrap();
        assert_eq!(fill.hatch_orientation, Some(45.0));
        assert_eq!(fill.emit(0, false).unwrap(), input);
    }
}
