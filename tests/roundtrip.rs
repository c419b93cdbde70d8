use std::fs;

use kicad_files::board::Board;
use kicad_files::dru::DesignRules;
use kicad_files::footprint::Footprint;
use kicad_files::items::dimensions::Dimension;
use kicad_files::libraries::{LibTable, LibTableType};
use kicad_files::schematic::Schematic;
use kicad_files::symbol::SymbolLib;
use kicad_files::sexpr::Atom;
use kicad_files::{parse, CodecConfig, Document, Error, Form, SExpr};
use rstest::*;
use tempfile::tempdir;

macro_rules! test_data {
    ($fname:expr) => {
        std::fs::read_to_string(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/resources/test/",
            $fname
        ))
        .unwrap()
    };
}

macro_rules! test_path {
    ($fname:expr) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/resources/test/", $fname)
    };
}

/// Parse, print, parse again and compare the two models.
fn assert_stable<T: Document + PartialEq + std::fmt::Debug>(text: &str) -> T {
    let first = T::from_str(text).unwrap();
    let emitted = first.to_tree_string(0, true).unwrap();
    let second = T::from_str(&emitted).unwrap();
    assert_eq!(first, second);
    first
}

/// Print the parsed model and compare the generic tree of the output with
/// the fixture's own tree, quoting included.
fn assert_faithful<T: Document>(text: &str, tree: fn(&str) -> SExpr) {
    let emitted = T::from_str(text).unwrap().to_tree_string(0, true).unwrap();
    assert_eq!(tree(&emitted), tree(text));
}

fn plain_tree(text: &str) -> SExpr {
    parse(text).unwrap()
}

/// Rules files hold a bare run of forms and `#` comment lines.
fn rules_tree(text: &str) -> SExpr {
    let body: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect();
    parse(&format!("({})", body.join("\n"))).unwrap()
}

#[test]
fn board_round_trips() {
    let board: Board = assert_stable(&test_data!("board.kicad_pcb"));
    assert_eq!(board.generator, "pcbnew");
    assert_eq!(board.layers.len(), 20);
    assert_eq!(board.nets.len(), 4);
    assert_eq!(board.footprints.len(), 2);
    assert_eq!(board.graphic_items.len(), 5);
    assert_eq!(board.dimensions.len(), 1);
    assert_eq!(board.targets.len(), 1);
    assert_eq!(board.trace_items.len(), 4);
    assert_eq!(board.zones.len(), 1);
    assert_eq!(board.groups[0].members.len(), 2);
    assert_eq!(board.properties, vec![("BOARD_REV".to_owned(), "B".to_owned())]);

    let j1_text = board.footprints[1].emit(2, true).unwrap();
    let first_line = j1_text.lines().next().unwrap();
    assert!(first_line.ends_with("locked (layer \"B.Cu\")"));
    let j1 = board.footprint("J1").unwrap();
    assert!(j1.locked);
    assert_eq!(j1.pads[1].net.as_ref().unwrap().name, "GND");

    let plot = board.setup.plot_settings.as_ref().unwrap();
    assert_eq!(plot.get("hpglpendiameter"), Some("15.000000"));
}

#[test]
fn schematic_round_trips() {
    let schematic: Schematic = assert_stable(&test_data!("sensor.kicad_sch"));
    assert_eq!(schematic.lib_symbols.len(), 1);
    assert_eq!(schematic.graphics.len(), 4);
    assert_eq!(schematic.symbols[0].pins.len(), 2);
    assert_eq!(schematic.sheets[0].sheet_name(), Some("Power"));
    assert_eq!(schematic.sheets[0].file_name(), Some("power.kicad_sch"));
    assert_eq!(schematic.sheet_instances.len(), 2);
    assert_eq!(schematic.symbol_instances[0].reference, "R1");
}

#[test]
fn symbol_library_round_trips() {
    let library: SymbolLib = assert_stable(&test_data!("library.kicad_sym"));
    assert_eq!(library.symbols.len(), 3);
    let led = &library.symbols[1];
    assert!(led.pin_names_hide);
    assert_eq!(led.units[0].graphic_items.len(), 5);
    assert_eq!(led.units[1].pins[1].name, "A");
    assert_eq!(library.symbols[2].extends.as_deref(), Some("R"));
}

#[test]
fn footprint_round_trips() {
    let footprint: Footprint = assert_stable(&test_data!("R_0603_1608Metric.kicad_mod"));
    assert_eq!(footprint.version, Some(20211014));
    assert_eq!(footprint.pads.len(), 2);
    assert_eq!(footprint.graphic_items.len(), 7);
    assert_eq!(footprint.models.len(), 1);
}

#[rstest]
#[case("sym-lib-table", LibTableType::Symbol, 3)]
#[case("fp-lib-table", LibTableType::Footprint, 2)]
fn library_tables_round_trip(
    #[case] name: &str,
    #[case] kind: LibTableType,
    #[case] count: usize,
) {
    let text = fs::read_to_string(format!(
        "{}/resources/test/{}",
        env!("CARGO_MANIFEST_DIR"),
        name
    ))
    .unwrap();
    let table: LibTable = assert_stable(&text);
    assert_faithful::<LibTable>(&text, plain_tree);
    assert_eq!(table.kind, kind);
    assert_eq!(table.libraries.len(), count);
    assert!(table.get("sensor").unwrap().uri.starts_with("${KIPRJMOD}"));
}

#[test]
fn design_rules_round_trip() {
    let text = test_data!("sensor.kicad_dru");
    let rules: DesignRules = assert_stable(&text);
    assert_faithful::<DesignRules>(&text, rules_tree);
    assert_eq!(rules.version, 1);
    assert_eq!(rules.rules.len(), 3);
    assert_eq!(rules.rules[1].layer, Some(Atom::bare("inner")));
    assert_eq!(
        rules.rules[2].constraints[0].elements,
        vec![Atom::bare("via"), Atom::bare("micro_via")]
    );
    assert_eq!(rules.rules[2].severity.as_deref(), Some("warning"));
}

#[test]
fn blank_board_scenario() {
    let config = CodecConfig::new(20211014, "sensor_tool");
    let text = Board::create_new(&config).to_tree_string(0, true).unwrap();
    let board = Board::from_str(&text).unwrap();
    assert_eq!(board.generator, "sensor_tool");
    assert_eq!(board.layers.len(), 29);
    assert_eq!(board.layers[1].ordinal, 31);
    assert_eq!(board.layers[28].ordinal, 58);
    assert_eq!(board.nets.len(), 1);
    assert_eq!(board.nets[0].number, 0);
}

#[test]
fn unknown_board_forms_are_skipped() {
    let board = Board::from_str(
        "(kicad_pcb (version 20211014) (generator pcbnew) (future_token 42) (net 0 \"\"))",
    )
    .unwrap();
    let text = board.to_tree_string(0, true).unwrap();
    assert!(!text.contains("future_token"));
}

#[test]
fn board_with_empty_dimension_fails_to_emit() {
    let mut board = Board::create_new(&CodecConfig::default());
    board.dimensions.push(Dimension::default());
    assert!(matches!(
        board.to_tree_string(0, true),
        Err(Error::Invariant(_))
    ));
}

#[test]
fn schematic_saves_back_to_its_source() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sensor.kicad_sch");
    fs::copy(test_path!("sensor.kicad_sch"), &path).unwrap();

    let mut schematic = Schematic::from_file(&path, None).unwrap();
    assert_eq!(schematic.source_path.as_deref(), Some(path.as_path()));
    schematic.generator = "test".to_owned();
    schematic.to_file(None, None).unwrap();

    let reloaded = Schematic::from_file(&path, None).unwrap();
    assert_eq!(reloaded.generator, "test");
    assert_eq!(reloaded.symbols, schematic.symbols);
}

#[test]
fn new_document_needs_a_path() {
    let handle = kicad_files::DocumentHandle::new(DesignRules::create_new());
    assert!(matches!(handle.to_file(None, None), Err(Error::NoPath)));
}

#[test]
fn reading_a_directory_fails() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        Board::from_file(dir.path(), None),
        Err(Error::NotAFile(_))
    ));
}

#[test]
fn library_table_in_a_legacy_encoding() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fp-lib-table");
    let mut table = LibTable::create_new(LibTableType::Footprint);
    table
        .libraries
        .push(kicad_files::libraries::Library::new("Résistances", "${KIPRJMOD}/r.pretty"));
    table.to_file(&path, Some(encoding_rs::WINDOWS_1252)).unwrap();

    assert!(matches!(
        LibTable::from_file(&path, None),
        Err(Error::Encoding { .. })
    ));
    let reread = LibTable::from_file(&path, Some(encoding_rs::WINDOWS_1252)).unwrap();
    assert_eq!(reread.into_inner(), table);
}

#[test]
fn byte_order_mark_is_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fp-lib-table");
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(test_data!("fp-lib-table").as_bytes());
    fs::write(&path, bytes).unwrap();

    let table = LibTable::from_file(&path, None).unwrap();
    assert_eq!(table.version, Some(7));
    assert_eq!(table.libraries.len(), 2);
}

#[test]
fn mismatched_documents_are_rejected() {
    let board = test_data!("board.kicad_pcb");
    assert!(matches!(
        Schematic::from_str(&board),
        Err(Error::WrongForm { .. })
    ));
    assert!(matches!(
        SymbolLib::from_str(&board),
        Err(Error::WrongForm { .. })
    ));
}
