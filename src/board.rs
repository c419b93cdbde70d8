//! The printed circuit board document (`.kicad_pcb`).

use std::fmt::Write;

use crate::config::CodecConfig;
use crate::document::Document;
use crate::emit::{close, Indent, Quoted, Token};
use crate::error::Result;
use crate::footprint::Footprint;
use crate::form::{emit_all, Form};
use crate::items::brditems::{GeneralSettings, LayerToken, SetupData, Target, TraceItem};
use crate::items::common::{Group, Net, PageSettings, TitleBlock};
use crate::items::dimensions::Dimension;
use crate::items::gritems::GraphicItem;
use crate::items::zones::Zone;
use crate::sexpr::SExpr;

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub version: u32,
    pub generator: String,
    pub general: GeneralSettings,
    pub paper: PageSettings,
    pub title_block: Option<TitleBlock>,
    pub layers: Vec<LayerToken>,
    pub setup: SetupData,
    /// Board-level text variables, `(property "key" "value")`
    pub properties: Vec<(String, String)>,
    pub nets: Vec<Net>,
    pub footprints: Vec<Footprint>,
    pub graphic_items: Vec<GraphicItem>,
    pub dimensions: Vec<Dimension>,
    pub targets: Vec<Target>,
    pub trace_items: Vec<TraceItem>,
    pub zones: Vec<Zone>,
    pub groups: Vec<Group>,
}

impl Default for Board {
    fn default() -> Self {
        let config = CodecConfig::default();
        Self {
            version: config.version,
            generator: config.generator,
            general: GeneralSettings::default(),
            paper: PageSettings::default(),
            title_block: None,
            layers: Vec::new(),
            setup: SetupData::default(),
            properties: Vec::new(),
            nets: Vec::new(),
            footprints: Vec::new(),
            graphic_items: Vec::new(),
            dimensions: Vec::new(),
            targets: Vec::new(),
            trace_items: Vec::new(),
            zones: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl Board {
    /// An empty two-layer board with the unconnected net 0.
    pub fn create_new(config: &CodecConfig) -> Self {
        Self {
            version: config.version,
            generator: config.generator.clone(),
            layers: LayerToken::defaults(),
            nets: vec![Net::new(0, "")],
            ..Default::default()
        }
    }

    pub fn net(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|net| net.name == name)
    }

    /// Placed footprint by its `Reference` text
    pub fn footprint(&self, reference: &str) -> Option<&Footprint> {
        self.footprints.iter().find(|footprint| {
            footprint.graphic_items.iter().any(|item| match item {
                GraphicItem::Text(text) => {
                    text.kind.as_deref() == Some("reference") && text.text == reference
                }
                _ => false,
            })
        })
    }
}

impl Document for Board {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("kicad_pcb")?;
        let mut board = Board::default();
        for item in args {
            let head = match item.head() {
                Some(head) => head,
                None => continue,
            };
            match head {
                "version" => board.version = item.parse_at(1)?,
                "generator" => board.generator = item.str_at(1)?.to_owned(),
                "general" => board.general = GeneralSettings::from_tree(item)?,
                "paper" => board.paper = PageSettings::from_tree(item)?,
                "title_block" => board.title_block = Some(TitleBlock::from_tree(item)?),
                "layers" => {
                    board.layers = item
                        .args()
                        .iter()
                        .map(LayerToken::from_tree)
                        .collect::<Result<_>>()?
                }
                "setup" => board.setup = SetupData::from_tree(item)?,
                "property" => board
                    .properties
                    .push((item.str_at(1)?.to_owned(), item.str_at(2)?.to_owned())),
                "net" => board.nets.push(Net::from_tree(item)?),
                "footprint" | "module" => board.footprints.push(Form::from_tree(item)?),
                "dimension" => board.dimensions.push(Dimension::from_tree(item)?),
                "target" => board.targets.push(Target::from_tree(item)?),
                "segment" | "arc" | "via" => board.trace_items.push(TraceItem::from_tree(item)?),
                "zone" => board.zones.push(Zone::from_tree(item)?),
                "group" => board.groups.push(Group::from_tree(item)?),
                head if GraphicItem::is_graphic(head) => {
                    board.graphic_items.push(GraphicItem::from_tree(item)?)
                }
                other => log::trace!("skipping ({} ...) in kicad_pcb", other),
            }
        }
        Ok(board)
    }

    fn to_tree_string(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let inner = indent + 2;
        let mut out = format!(
            "{}(kicad_pcb (version {}) (generator {})\n\n",
            pad,
            self.version,
            Token(&self.generator)
        );
        out.push_str(&self.general.emit(inner, true)?);
        out.push('\n');
        out.push_str(&self.paper.emit(inner, true)?);
        if let Some(title_block) = &self.title_block {
            out.push_str(&title_block.emit(inner, true)?);
        }
        out.push('\n');

        writeln!(out, "{}  (layers", pad)?;
        emit_all(&mut out, &self.layers, inner + 2)?;
        writeln!(out, "{}  )", pad)?;
        out.push('\n');
        out.push_str(&self.setup.emit(inner, true)?);
        out.push('\n');

        if !self.properties.is_empty() {
            for (key, value) in &self.properties {
                writeln!(out, "{}  (property {} {})", pad, Quoted(key), Quoted(value))?;
            }
            out.push('\n');
        }
        emit_all(&mut out, &self.nets, inner)?;
        out.push('\n');

        for footprint in &self.footprints {
            out.push_str(&footprint.emit(inner, true)?);
            out.push('\n');
        }
        if !self.graphic_items.is_empty() || !self.dimensions.is_empty() || !self.targets.is_empty() {
            emit_all(&mut out, &self.graphic_items, inner)?;
            emit_all(&mut out, &self.dimensions, inner)?;
            emit_all(&mut out, &self.targets, inner)?;
            out.push('\n');
        }
        emit_all(&mut out, &self.trace_items, inner)?;
        emit_all(&mut out, &self.zones, inner)?;
        emit_all(&mut out, &self.groups, inner)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sexpr::parse;

    #[test]
    fn blank_board_reparses() {
        let config = CodecConfig::new(20211014, "pcbnew");
        let board = Board::create_new(&config);
        let text = board.to_tree_string(0, true).unwrap();
        assert!(text.starts_with("(kicad_pcb (version 20211014) (generator pcbnew)\n"));
        assert!(text.contains("    (0 \"F.Cu\" signal)\n"));
        assert!(text.contains("    (46 \"B.CrtYd\" user \"B.Courtyard\")\n"));

        let reparsed = Board::from_str(&text).unwrap();
        assert_eq!(reparsed.generator, "pcbnew");
        assert_eq!(reparsed.layers.len(), 29);
        assert_eq!(reparsed.nets, vec![Net::new(0, "")]);
        assert_eq!(reparsed, board);
    }

    #[test]
    fn unknown_forms_are_ignored() {
        let board = Board::from_str(
            r#"(kicad_pcb (version 20211014) (generator pcbnew) (future_token 42) (net 0 ""))"#,
        )
        .unwrap();
        assert_eq!(board.nets.len(), 1);
        assert!(board.to_tree_string(0, true).is_ok());
    }

    #[test]
    fn items_are_sorted_into_sections() {
        let board = Board::from_str(
            r#"(kicad_pcb (version 20211014) (generator pcbnew)
                (net 0 "") (net 1 "GND")
                (segment (start 0 0) (end 1 0) (width 0.25) (layer "F.Cu") (net 1))
                (gr_line (start 0 0) (end 10 0) (layer "Edge.Cuts") (width 0.1))
                (target plus (at 0 0) (size 5) (width 0.1) (layer "Edge.Cuts"))
                (via (at 1 0) (size 0.8) (drill 0.4) (layers "F.Cu" "B.Cu") (net 1))
                (footprint "R:R_0603" (layer "F.Cu")
                  (at 5 5)
                  (fp_text reference "R1" (at 0 -1) (layer "F.SilkS")
                    (effects (font (size 1 1) (thickness 0.15)))
                  )
                )
              )"#,
        )
        .unwrap();
        assert_eq!(board.trace_items.len(), 2);
        assert_eq!(board.graphic_items.len(), 1);
        assert_eq!(board.targets.len(), 1);
        assert_eq!(board.net("GND").map(|net| net.number), Some(1));
        assert!(board.footprint("R1").is_some());

        let text = board.to_tree_string(0, true).unwrap();
        let order: Vec<usize> = ["(footprint", "(gr_line", "(target", "(segment", "(via"]
            .iter()
            .map(|token| text.find(token).unwrap())
            .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(Board::from_str(&text).unwrap(), board);
    }

    #[test]
    fn indent_reaches_every_line() {
        let board = Board::create_new(&CodecConfig::default());
        let text = board.to_tree_string(4, false).unwrap();
        assert!(!text.ends_with('\n'));
        assert!(text
            .lines()
            .filter(|line| !line.is_empty())
            .all(|line| line.starts_with("    ")));
    }

    #[test]
    fn rejects_other_documents() {
        let tree = parse("(kicad_sch (version 20211123))").unwrap();
        assert!(matches!(
            Board::from_tree(&tree),
            Err(Error::WrongForm { .. })
        ));
    }
}
