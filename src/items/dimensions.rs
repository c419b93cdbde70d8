//! Measurement annotations on a board.

use std::fmt::Write;

use crate::emit::{close, Indent, Num, Quoted};
use crate::error::{Error, Result};
use crate::form::{flag_value, Form};
use crate::items::common::{read_points, Position};
use crate::items::gritems::GrText;
use crate::sexpr::SExpr;

/// How the measured value is printed
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionFormat {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// 0 inches, 1 mils, 2 millimeters, 3 automatic
    pub units: i64,
    /// 0 no suffix, 1 bare suffix, 2 suffix in parenthesis
    pub units_format: i64,
    pub precision: i64,
    pub override_value: Option<String>,
    pub suppress_zeroes: bool,
}

impl Default for DimensionFormat {
    fn default() -> Self {
        Self {
            prefix: None,
            suffix: None,
            units: 3,
            units_format: 1,
            precision: 4,
            override_value: None,
            suppress_zeroes: false,
        }
    }
}

impl Form for DimensionFormat {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("format")?;
        let mut format = DimensionFormat::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("suppress_zeroes"), _) | (_, Some("suppress_zeroes")) => {
                    format.suppress_zeroes = flag_value(item)
                }
                (_, Some("prefix")) => format.prefix = Some(item.str_at(1)?.to_owned()),
                (_, Some("suffix")) => format.suffix = Some(item.str_at(1)?.to_owned()),
                (_, Some("units")) => format.units = item.parse_at(1)?,
                (_, Some("units_format")) => format.units_format = item.parse_at(1)?,
                (_, Some("precision")) => format.precision = item.parse_at(1)?,
                (_, Some("override_value")) => {
                    format.override_value = Some(item.str_at(1)?.to_owned())
                }
                _ => {}
            }
        }
        Ok(format)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!("{}(format", Indent(indent));
        if let Some(prefix) = &self.prefix {
            write!(out, " (prefix {})", Quoted(prefix))?;
        }
        if let Some(suffix) = &self.suffix {
            write!(out, " (suffix {})", Quoted(suffix))?;
        }
        write!(
            out,
            " (units {}) (units_format {}) (precision {})",
            self.units, self.units_format, self.precision
        )?;
        if let Some(value) = &self.override_value {
            write!(out, " (override_value {})", Quoted(value))?;
        }
        if self.suppress_zeroes {
            out.push_str(" suppress_zeroes");
        }
        close(&mut out, newline);
        Ok(out)
    }
}

/// Line and text placement of a dimension
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionStyle {
    pub thickness: f64,
    pub arrow_length: f64,
    /// 0 outside, 1 inline, 2 manual
    pub text_position_mode: i64,
    pub extension_height: Option<f64>,
    /// Leader dimensions only: 0 none, 1 rectangle, 2 circle, 3 rounded rectangle
    pub text_frame: Option<i64>,
    pub extension_offset: Option<f64>,
    pub keep_text_aligned: bool,
}

impl Default for DimensionStyle {
    fn default() -> Self {
        Self {
            thickness: 0.15,
            arrow_length: 1.27,
            text_position_mode: 0,
            extension_height: None,
            text_frame: None,
            extension_offset: None,
            keep_text_aligned: false,
        }
    }
}

impl Form for DimensionStyle {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("style")?;
        let mut style = DimensionStyle::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("keep_text_aligned"), _) | (_, Some("keep_text_aligned")) => {
                    style.keep_text_aligned = flag_value(item)
                }
                (_, Some("thickness")) => style.thickness = item.f64_at(1)?,
                (_, Some("arrow_length")) => style.arrow_length = item.f64_at(1)?,
                (_, Some("text_position_mode")) => style.text_position_mode = item.parse_at(1)?,
                (_, Some("extension_height")) => style.extension_height = Some(item.f64_at(1)?),
                (_, Some("text_frame")) => style.text_frame = Some(item.parse_at(1)?),
                (_, Some("extension_offset")) => style.extension_offset = Some(item.f64_at(1)?),
                _ => {}
            }
        }
        Ok(style)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(style (thickness {}) (arrow_length {}) (text_position_mode {})",
            Indent(indent),
            Num(self.thickness),
            Num(self.arrow_length),
            self.text_position_mode
        );
        if let Some(height) = self.extension_height {
            write!(out, " (extension_height {})", Num(height))?;
        }
        if let Some(frame) = self.text_frame {
            write!(out, " (text_frame {})", frame)?;
        }
        if let Some(offset) = self.extension_offset {
            write!(out, " (extension_offset {})", Num(offset))?;
        }
        if self.keep_text_aligned {
            out.push_str(" keep_text_aligned");
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub locked: bool,
    /// `aligned`, `leader`, `center`, `orthogonal` or `radial`
    pub kind: String,
    pub layer: String,
    pub tstamp: Option<String>,
    pub pts: Vec<Position>,
    pub height: Option<f64>,
    /// Orthogonal dimensions only
    pub orientation: Option<i64>,
    /// Radial dimensions only
    pub leader_length: Option<f64>,
    /// Absent on center marks
    pub text: Option<GrText>,
    pub format: Option<DimensionFormat>,
    pub style: DimensionStyle,
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            locked: false,
            kind: "aligned".to_owned(),
            layer: "Dwgs.User".to_owned(),
            tstamp: None,
            pts: Vec::new(),
            height: None,
            orientation: None,
            leader_length: None,
            text: None,
            format: None,
            style: DimensionStyle::default(),
        }
    }
}

impl Form for Dimension {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("dimension")?;
        let mut dimension = Dimension::default();
        for item in args {
            match (item.as_atom(), item.head()) {
                (Some("locked"), _) | (_, Some("locked")) => dimension.locked = flag_value(item),
                (_, Some("type")) => dimension.kind = item.str_at(1)?.to_owned(),
                (_, Some("layer")) => dimension.layer = item.str_at(1)?.to_owned(),
                (_, Some("tstamp")) | (_, Some("uuid")) => {
                    dimension.tstamp = Some(item.str_at(1)?.to_owned())
                }
                (_, Some("pts")) => dimension.pts = read_points(item)?,
                (_, Some("height")) => dimension.height = Some(item.f64_at(1)?),
                (_, Some("orientation")) => dimension.orientation = Some(item.parse_at(1)?),
                (_, Some("leader_length")) => dimension.leader_length = Some(item.f64_at(1)?),
                (_, Some("gr_text")) => dimension.text = Some(GrText::from_tree(item)?),
                (_, Some("format")) => dimension.format = Some(DimensionFormat::from_tree(item)?),
                (_, Some("style")) => dimension.style = DimensionStyle::from_tree(item)?,
                _ => {}
            }
        }
        Ok(dimension)
    }

    /// Fails if the dimension has no points to measure between.
    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        if self.pts.is_empty() {
            return Err(Error::Invariant(format!(
                "{} dimension on {} has no points",
                self.kind, self.layer
            )));
        }
        let pad = Indent(indent);
        let mut out = format!("{}(dimension", pad);
        if self.locked {
            out.push_str(" locked");
        }
        write!(
            out,
            " (type {}) (layer {})",
            self.kind,
            Quoted(&self.layer)
        )?;
        if let Some(tstamp) = &self.tstamp {
            write!(out, " (tstamp {})", tstamp)?;
        }
        out.push('\n');
        write!(out, "{}  (pts", pad)?;
        for point in &self.pts {
            write!(out, " {}", point.emit_as("xy"))?;
        }
        writeln!(out, ")")?;
        if let Some(height) = self.height {
            writeln!(out, "{}  (height {})", pad, Num(height))?;
        }
        if let Some(orientation) = self.orientation {
            writeln!(out, "{}  (orientation {})", pad, orientation)?;
        }
        if let Some(length) = self.leader_length {
            writeln!(out, "{}  (leader_length {})", pad, Num(length))?;
        }
        if let Some(text) = &self.text {
            out.push_str(&text.emit(indent + 2, true)?);
        }
        if let Some(format) = &self.format {
            out.push_str(&format.emit(indent + 2, true)?);
        }
        out.push_str(&self.style.emit(indent + 2, true)?);
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}
