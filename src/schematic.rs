//! The schematic sheet document (`.kicad_sch`).

use std::fmt::Write;

use crate::config::CodecConfig;
use crate::document::Document;
use crate::emit::{close, Indent, Token};
use crate::error::Result;
use crate::form::{emit_all, Form};
use crate::items::common::{Image, PageSettings, TitleBlock};
use crate::items::schitems::{
    BusEntry, GlobalLabel, HierarchicalLabel, HierarchicalSheet, HierarchicalSheetInstance,
    Junction, LocalLabel, NoConnect, SchematicGraphic, SchematicSymbol, SymbolInstance, Text,
};
use crate::sexpr::SExpr;
use crate::symbol::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub struct Schematic {
    pub version: u32,
    pub generator: String,
    pub uuid: Option<String>,
    pub paper: PageSettings,
    pub title_block: Option<TitleBlock>,
    /// Copies of every library symbol used on this sheet
    pub lib_symbols: Vec<Symbol>,
    pub junctions: Vec<Junction>,
    pub no_connects: Vec<NoConnect>,
    pub bus_entries: Vec<BusEntry>,
    /// Wires, buses and graphical polylines
    pub graphics: Vec<SchematicGraphic>,
    pub images: Vec<Image>,
    pub texts: Vec<Text>,
    pub labels: Vec<LocalLabel>,
    pub global_labels: Vec<GlobalLabel>,
    pub hierarchical_labels: Vec<HierarchicalLabel>,
    pub symbols: Vec<SchematicSymbol>,
    pub sheets: Vec<HierarchicalSheet>,
    pub sheet_instances: Vec<HierarchicalSheetInstance>,
    pub symbol_instances: Vec<SymbolInstance>,
}

impl Default for Schematic {
    fn default() -> Self {
        let config = CodecConfig::default();
        Self {
            version: config.version,
            generator: config.generator,
            uuid: None,
            paper: PageSettings::default(),
            title_block: None,
            lib_symbols: Vec::new(),
            junctions: Vec::new(),
            no_connects: Vec::new(),
            bus_entries: Vec::new(),
            graphics: Vec::new(),
            images: Vec::new(),
            texts: Vec::new(),
            labels: Vec::new(),
            global_labels: Vec::new(),
            hierarchical_labels: Vec::new(),
            symbols: Vec::new(),
            sheets: Vec::new(),
            sheet_instances: Vec::new(),
            symbol_instances: Vec::new(),
        }
    }
}

impl Schematic {
    /// A root sheet numbered page 1.
    pub fn create_new(config: &CodecConfig) -> Self {
        Self {
            version: config.version,
            generator: config.generator.clone(),
            sheet_instances: vec![HierarchicalSheetInstance::new("/", "1")],
            ..Default::default()
        }
    }

    /// Library copy of the symbol with the given `Library:Name` id
    pub fn lib_symbol(&self, lib_id: &str) -> Option<&Symbol> {
        self.lib_symbols.iter().find(|symbol| symbol.id == lib_id)
    }
}

/// Append a blank line and every item, unless there are none.
fn section<T: Form>(out: &mut String, items: &[T], indent: usize) -> Result<()> {
    if !items.is_empty() {
        out.push('\n');
        emit_all(out, items, indent)?;
    }
    Ok(())
}

impl Document for Schematic {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("kicad_sch")?;
        let mut schematic = Schematic::default();
        for item in args {
            let Some(head) = item.head() else {
                continue;
            };
            match head {
                "version" => schematic.version = item.parse_at(1)?,
                "generator" => schematic.generator = item.str_at(1)?.to_owned(),
                "uuid" => schematic.uuid = Some(item.str_at(1)?.to_owned()),
                "paper" => schematic.paper = PageSettings::from_tree(item)?,
                "title_block" => schematic.title_block = Some(TitleBlock::from_tree(item)?),
                "lib_symbols" => {
                    schematic.lib_symbols = item
                        .children("symbol")
                        .map(Symbol::from_tree)
                        .collect::<Result<_>>()?
                }
                "junction" => schematic.junctions.push(Junction::from_tree(item)?),
                "no_connect" => schematic.no_connects.push(NoConnect::from_tree(item)?),
                "bus_entry" => schematic.bus_entries.push(BusEntry::from_tree(item)?),
                "wire" | "bus" | "polyline" => {
                    schematic.graphics.push(SchematicGraphic::from_tree(item)?)
                }
                "image" => schematic.images.push(Image::from_tree(item)?),
                "text" => schematic.texts.push(Text::from_tree(item)?),
                "label" => schematic.labels.push(LocalLabel::from_tree(item)?),
                "global_label" => schematic.global_labels.push(GlobalLabel::from_tree(item)?),
                "hierarchical_label" => schematic
                    .hierarchical_labels
                    .push(HierarchicalLabel::from_tree(item)?),
                "symbol" => schematic.symbols.push(SchematicSymbol::from_tree(item)?),
                "sheet" => schematic.sheets.push(HierarchicalSheet::from_tree(item)?),
                "sheet_instances" => {
                    schematic.sheet_instances = item
                        .children("path")
                        .map(HierarchicalSheetInstance::from_tree)
                        .collect::<Result<_>>()?
                }
                "symbol_instances" => {
                    schematic.symbol_instances = item
                        .children("path")
                        .map(SymbolInstance::from_tree)
                        .collect::<Result<_>>()?
                }
                other => log::trace!("skipping ({} ...) in kicad_sch", other),
            }
        }
        Ok(schematic)
    }

    fn to_tree_string(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let inner = indent + 2;
        let mut out = format!(
            "{}(kicad_sch (version {}) (generator {})\n\n",
            pad,
            self.version,
            Token(&self.generator)
        );
        if let Some(uuid) = &self.uuid {
            writeln!(out, "{}  (uuid {})\n", pad, uuid)?;
        }
        out.push_str(&self.paper.emit(inner, true)?);
        if let Some(title_block) = &self.title_block {
            out.push('\n');
            out.push_str(&title_block.emit(inner, true)?);
        }
        out.push('\n');

        if self.lib_symbols.is_empty() {
            writeln!(out, "{}  (lib_symbols)", pad)?;
        } else {
            writeln!(out, "{}  (lib_symbols", pad)?;
            emit_all(&mut out, &self.lib_symbols, inner + 2)?;
            writeln!(out, "{}  )", pad)?;
        }

        section(&mut out, &self.junctions, inner)?;
        section(&mut out, &self.no_connects, inner)?;
        section(&mut out, &self.bus_entries, inner)?;
        section(&mut out, &self.graphics, inner)?;
        section(&mut out, &self.images, inner)?;
        section(&mut out, &self.texts, inner)?;
        section(&mut out, &self.labels, inner)?;
        section(&mut out, &self.global_labels, inner)?;
        section(&mut out, &self.hierarchical_labels, inner)?;
        section(&mut out, &self.symbols, inner)?;
        section(&mut out, &self.sheets, inner)?;

        writeln!(out, "\n{}  (sheet_instances", pad)?;
        emit_all(&mut out, &self.sheet_instances, inner + 2)?;
        writeln!(out, "{}  )", pad)?;
        if !self.symbol_instances.is_empty() {
            writeln!(out, "\n{}  (symbol_instances", pad)?;
            emit_all(&mut out, &self.symbol_instances, inner + 2)?;
            writeln!(out, "{}  )", pad)?;
        }
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::items::common::Position;
    use crate::sexpr::parse;

    #[test]
    fn blank_schematic() {
        let schematic = Schematic::create_new(&CodecConfig::new(20211123, "eeschema"));
        let text = schematic.to_tree_string(0, true).unwrap();
        assert_eq!(
            text,
            "(kicad_sch (version 20211123) (generator eeschema)\n\n  (paper \"A4\")\n\n  (lib_symbols)\n\n  (sheet_instances\n    (path \"/\" (page \"1\"))\n  )\n)\n"
        );

        let tree = parse(&text).unwrap();
        assert_eq!(tree.children("sheet_instances").count(), 1);
        let instances = tree.child("sheet_instances").unwrap();
        assert_eq!(instances.args().len(), 1);
        assert_eq!(tree.child("lib_symbols").unwrap().args().len(), 0);
        assert_eq!(Schematic::from_tree(&tree).unwrap(), schematic);
    }

    #[test]
    fn sections_are_separated_by_blank_lines() {
        let mut schematic = Schematic::create_new(&CodecConfig::default());
        schematic.uuid = Some("5b8c".to_owned());
        schematic.junctions.push(Junction {
            position: Position::new(10.0, 20.0),
            ..Default::default()
        });
        schematic.no_connects.push(NoConnect {
            position: Position::new(30.0, 40.0),
            ..Default::default()
        });
        schematic.symbol_instances.push(SymbolInstance {
            path: "/a1a1".to_owned(),
            reference: "R1".to_owned(),
            unit: 1,
            value: "10k".to_owned(),
            footprint: "Resistor_SMD:R_0603_1608Metric".to_owned(),
        });
        let text = schematic.to_tree_string(0, true).unwrap();
        assert!(text.contains("  (uuid 5b8c)\n\n  (paper \"A4\")\n"));
        assert!(text.contains("  (lib_symbols)\n\n  (junction"));
        assert!(text.contains("\n\n  (no_connect (at 30 40))\n"));
        assert!(text.contains("\n\n  (symbol_instances\n    (path \"/a1a1\"\n"));
        assert_eq!(Schematic::from_str(&text).unwrap(), schematic);
    }

    #[test]
    fn library_symbols_are_kept_apart_from_placements() {
        let schematic = Schematic::from_str(
            r#"(kicad_sch (version 20211123) (generator eeschema)
                (lib_symbols
                  (symbol "Device:R" (in_bom yes) (on_board yes)
                    (property "Reference" "R" (id 0) (at 2.032 0 90))
                  )
                )
                (symbol (lib_id "Device:R") (at 100 50 0) (unit 1)
                  (in_bom yes) (on_board yes)
                  (uuid a1a1)
                )
                (future_token 42)
              )"#,
        )
        .unwrap();
        assert_eq!(schematic.lib_symbols.len(), 1);
        assert_eq!(schematic.symbols.len(), 1);
        let symbol = schematic.lib_symbol("Device:R").unwrap();
        assert_eq!(symbol.property("Reference"), Some("R"));
        assert_eq!(schematic.symbols[0].lib_id, "Device:R");
    }

    #[test]
    fn rejects_other_documents() {
        let tree = parse("(kicad_pcb (version 20211014))").unwrap();
        assert!(matches!(
            Schematic::from_tree(&tree),
            Err(Error::WrongForm { .. })
        ));
    }
}
