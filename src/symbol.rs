//! Schematic symbols and the `.kicad_sym` library that holds them.

use std::fmt::Write;

use crate::config::CodecConfig;
use crate::document::Document;
use crate::emit::{close, Indent, Num, Quoted, Token};
use crate::error::Result;
use crate::form::{emit_all, flag_value, yes_no, Form};
use crate::items::common::{Effects, Position, Property};
use crate::items::syitems::SymbolItem;
use crate::sexpr::SExpr;
use crate::strings::remove_prefix;

/// Alternate function of a pin, `(alternate "name" type style)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolAlternativePin {
    pub name: String,
    pub electrical_type: String,
    pub graphic_style: String,
}

impl Form for SymbolAlternativePin {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        sexpr.expect_form("alternate")?;
        Ok(Self {
            name: sexpr.str_at(1)?.to_owned(),
            electrical_type: sexpr.str_at(2)?.to_owned(),
            graphic_style: sexpr.str_at(3)?.to_owned(),
        })
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(alternate {} {} {}",
            Indent(indent),
            Quoted(&self.name),
            self.electrical_type,
            self.graphic_style
        );
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPin {
    /// `input`, `output`, `bidirectional`, `passive`, `power_in` ...
    pub electrical_type: String,
    /// `line`, `inverted`, `clock` ...
    pub graphic_style: String,
    pub position: Position,
    pub length: f64,
    pub hide: bool,
    pub name: String,
    pub name_effects: Effects,
    pub number: String,
    pub number_effects: Effects,
    pub alternates: Vec<SymbolAlternativePin>,
}

impl Default for SymbolPin {
    fn default() -> Self {
        Self {
            electrical_type: "passive".to_owned(),
            graphic_style: "line".to_owned(),
            position: Position::with_angle(0.0, 0.0, 0.0),
            length: 2.54,
            hide: false,
            name: "~".to_owned(),
            name_effects: Effects::default(),
            number: String::new(),
            number_effects: Effects::default(),
            alternates: Vec::new(),
        }
    }
}

impl Form for SymbolPin {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("pin")?;
        let mut pin = SymbolPin {
            electrical_type: sexpr.str_at(1)?.to_owned(),
            graphic_style: sexpr.str_at(2)?.to_owned(),
            ..Default::default()
        };
        let effects = |item: &SExpr| match item.child("effects") {
            Some(effects) => Effects::from_tree(effects),
            None => Ok(Effects::default()),
        };
        for item in args.iter().skip(2) {
            match (item.as_atom(), item.head()) {
                (Some("hide"), _) | (_, Some("hide")) => pin.hide = flag_value(item),
                (_, Some("at")) => pin.position = Position::from_tree(item)?,
                (_, Some("length")) => pin.length = item.f64_at(1)?,
                (_, Some("name")) => {
                    pin.name = item.str_at(1)?.to_owned();
                    pin.name_effects = effects(item)?;
                }
                (_, Some("number")) => {
                    pin.number = item.str_at(1)?.to_owned();
                    pin.number_effects = effects(item)?;
                }
                (_, Some("alternate")) => {
                    pin.alternates.push(SymbolAlternativePin::from_tree(item)?)
                }
                _ => {}
            }
        }
        Ok(pin)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(pin {} {} {} (length {})",
            pad,
            self.electrical_type,
            self.graphic_style,
            self.position.emit_as("at"),
            Num(self.length)
        );
        if self.hide {
            out.push_str(" hide");
        }
        out.push('\n');
        writeln!(
            out,
            "{}  (name {} {})",
            pad,
            Quoted(&self.name),
            self.name_effects.emit(0, false)?
        )?;
        writeln!(
            out,
            "{}  (number {} {})",
            pad,
            Quoted(&self.number),
            self.number_effects.emit(0, false)?
        )?;
        emit_all(&mut out, &self.alternates, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// A library symbol, or one unit/body-style of it when nested
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// `Library:Name` in a schematic cache, `Name` in a library, `Name_u_s` for units
    pub id: String,
    pub library_nickname: Option<String>,
    pub entry_name: String,
    /// Set on units only
    pub unit_id: Option<i64>,
    pub style_id: Option<i64>,
    pub extends: Option<String>,
    pub power: bool,
    pub pin_numbers_hide: bool,
    pub pin_names_offset: Option<f64>,
    pub pin_names_hide: bool,
    /// Absent on units
    pub in_bom: Option<bool>,
    pub on_board: Option<bool>,
    pub properties: Vec<Property>,
    pub graphic_items: Vec<SymbolItem>,
    pub pins: Vec<SymbolPin>,
    pub units: Vec<Symbol>,
}

impl Default for Symbol {
    fn default() -> Self {
        Self {
            id: String::new(),
            library_nickname: None,
            entry_name: String::new(),
            unit_id: None,
            style_id: None,
            extends: None,
            power: false,
            pin_numbers_hide: false,
            pin_names_offset: None,
            pin_names_hide: false,
            in_bom: None,
            on_board: None,
            properties: Vec::new(),
            graphic_items: Vec::new(),
            pins: Vec::new(),
            units: Vec::new(),
        }
    }
}

impl Symbol {
    /// A symbol with the Reference, Value, Footprint and Datasheet fields
    /// every KiCad symbol carries.
    pub fn create_new(
        id: impl Into<String>,
        reference: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut symbol = Symbol {
            in_bom: Some(true),
            on_board: Some(true),
            ..Default::default()
        };
        symbol.set_id(id);

        let hidden = Effects {
            hide: true,
            ..Default::default()
        };
        let mut properties = vec![
            Property::new("Reference", reference, 0),
            Property::new("Value", value, 1),
            Property::new("Footprint", "", 2),
            Property::new("Datasheet", "~", 3),
        ];
        for property in &mut properties[2..] {
            property.effects = Some(hidden.clone());
        }
        symbol.properties = properties;
        symbol
    }

    /// Set the id and re-derive nickname and entry name from it.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        match self.id.split_once(':') {
            Some((nickname, name)) => {
                self.library_nickname = Some(nickname.to_owned());
                self.entry_name = name.to_owned();
            }
            None => {
                self.library_nickname = None;
                self.entry_name = self.id.clone();
            }
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Unit and style ids encoded in a unit name: `R_1_2` under `R` is unit 1, style 2.
    fn split_unit(&mut self, parent_name: &str) {
        let suffix = remove_prefix(&self.entry_name, &format!("{}_", parent_name));
        let mut ids = suffix.rsplitn(2, '_');
        self.style_id = ids.next().and_then(|s| s.parse().ok());
        self.unit_id = ids.next().and_then(|s| s.parse().ok());
    }
}

impl Form for Symbol {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("symbol")?;
        let mut symbol = Symbol::default();
        symbol.set_id(sexpr.str_at(1)?);
        for item in args.iter().skip(1) {
            let Some(head) = item.head() else {
                continue;
            };
            match head {
                "extends" => symbol.extends = Some(item.str_at(1)?.to_owned()),
                "power" => symbol.power = true,
                "pin_numbers" => symbol.pin_numbers_hide = item.has_flag("hide"),
                "pin_names" => {
                    symbol.pin_names_offset = item.child("offset").and_then(|o| o.opt_f64_at(1));
                    symbol.pin_names_hide = item.has_flag("hide");
                }
                "in_bom" => symbol.in_bom = Some(flag_value(item)),
                "on_board" => symbol.on_board = Some(flag_value(item)),
                "property" => symbol.properties.push(Property::from_tree(item)?),
                "pin" => symbol.pins.push(SymbolPin::from_tree(item)?),
                "symbol" => {
                    let mut unit = Symbol::from_tree(item)?;
                    unit.split_unit(&symbol.entry_name);
                    symbol.units.push(unit);
                }
                head if SymbolItem::is_symbol_item(head) => {
                    symbol.graphic_items.push(SymbolItem::from_tree(item)?)
                }
                _ => {}
            }
        }
        Ok(symbol)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}(symbol {}", pad, Quoted(&self.id));
        if let Some(extends) = &self.extends {
            write!(out, " (extends {})", Quoted(extends))?;
        }
        if self.power {
            out.push_str(" (power)");
        }
        if self.pin_numbers_hide {
            out.push_str(" (pin_numbers hide)");
        }
        if self.pin_names_offset.is_some() || self.pin_names_hide {
            out.push_str(" (pin_names");
            if let Some(offset) = self.pin_names_offset {
                write!(out, " (offset {})", Num(offset))?;
            }
            if self.pin_names_hide {
                out.push_str(" hide");
            }
            out.push(')');
        }
        if let Some(in_bom) = self.in_bom {
            write!(out, " (in_bom {})", yes_no(in_bom))?;
        }
        if let Some(on_board) = self.on_board {
            write!(out, " (on_board {})", yes_no(on_board))?;
        }
        out.push('\n');
        emit_all(&mut out, &self.properties, indent + 2)?;
        emit_all(&mut out, &self.graphic_items, indent + 2)?;
        emit_all(&mut out, &self.pins, indent + 2)?;
        emit_all(&mut out, &self.units, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

/// A `.kicad_sym` symbol library
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolLib {
    pub version: u32,
    pub generator: String,
    pub symbols: Vec<Symbol>,
}

impl SymbolLib {
    pub fn create_new(config: &CodecConfig) -> Self {
        Self {
            version: config.version,
            generator: config.generator.clone(),
            symbols: Vec::new(),
        }
    }
}

impl Document for SymbolLib {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("kicad_symbol_lib")?;
        let mut library = SymbolLib::create_new(&CodecConfig::default());
        for item in args {
            match item.head() {
                Some("version") => library.version = item.parse_at(1)?,
                Some("generator") => library.generator = item.str_at(1)?.to_owned(),
                Some("symbol") => library.symbols.push(Symbol::from_tree(item)?),
                other => log::trace!("skipping ({} ...) in symbol library", other.unwrap_or("?")),
            }
        }
        Ok(library)
    }

    fn to_tree_string(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!(
            "{}(kicad_symbol_lib (version {}) (generator {})\n",
            pad,
            self.version,
            Token(&self.generator)
        );
        emit_all(&mut out, &self.symbols, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}
