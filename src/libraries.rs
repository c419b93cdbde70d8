//! Footprint and symbol library tables (`fp_lib_table`, `sym_lib_table`).

use std::fmt::Write;

use crate::document::Document;
use crate::emit::{close, Indent, Quoted};
use crate::error::Result;
use crate::form::{emit_all, Form};
use crate::sexpr::SExpr;

/// One row of a library table
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    pub name: String,
    /// `KiCad`, `Legacy`, `Eagle` ...
    pub kind: String,
    pub uri: String,
    pub options: String,
    pub description: String,
    pub disabled: bool,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: "KiCad".to_owned(),
            uri: String::new(),
            options: String::new(),
            description: String::new(),
            disabled: false,
        }
    }
}

impl Library {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }
}

impl Form for Library {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let args = sexpr.expect_form("lib")?;
        let mut library = Library::default();
        for item in args {
            let text = || item.opt_str_at(1).unwrap_or_default().to_owned();
            match item.head() {
                Some("name") => library.name = text(),
                Some("type") => library.kind = text(),
                Some("uri") => library.uri = text(),
                Some("options") => library.options = text(),
                Some("descr") => library.description = text(),
                Some("disabled") => library.disabled = true,
                _ => {}
            }
        }
        Ok(library)
    }

    fn emit(&self, indent: usize, newline: bool) -> Result<String> {
        let mut out = format!(
            "{}(lib (name {})(type {})(uri {})(options {})(descr {})",
            Indent(indent),
            Quoted(&self.name),
            Quoted(&self.kind),
            Quoted(&self.uri),
            Quoted(&self.options),
            Quoted(&self.description)
        );
        if self.disabled {
            out.push_str("(disabled)");
        }
        close(&mut out, newline);
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibTableType {
    Footprint,
    Symbol,
}

impl LibTableType {
    pub fn token(self) -> &'static str {
        match self {
            LibTableType::Footprint => "fp_lib_table",
            LibTableType::Symbol => "sym_lib_table",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibTable {
    pub kind: LibTableType,
    /// Written by KiCad 7 and later
    pub version: Option<i64>,
    pub libraries: Vec<Library>,
}

impl LibTable {
    pub fn create_new(kind: LibTableType) -> Self {
        Self {
            kind,
            version: None,
            libraries: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|lib| lib.name == name)
    }
}

impl Document for LibTable {
    fn from_tree(sexpr: &SExpr) -> Result<Self> {
        let (head, args) = sexpr.expect_one_of(&["fp_lib_table", "sym_lib_table"])?;
        let kind = if head == "fp_lib_table" {
            LibTableType::Footprint
        } else {
            LibTableType::Symbol
        };
        let mut table = LibTable::create_new(kind);
        for item in args {
            match item.head() {
                Some("version") => table.version = Some(item.parse_at(1)?),
                Some("lib") => table.libraries.push(Library::from_tree(item)?),
                other => log::trace!("skipping ({} ...) in {}", other.unwrap_or("?"), head),
            }
        }
        Ok(table)
    }

    fn to_tree_string(&self, indent: usize, newline: bool) -> Result<String> {
        let pad = Indent(indent);
        let mut out = format!("{}({}\n", pad, self.kind.token());
        if let Some(version) = self.version {
            writeln!(out, "{}  (version {})", pad, version)?;
        }
        emit_all(&mut out, &self.libraries, indent + 2)?;
        write!(out, "{}", pad)?;
        close(&mut out, newline);
        Ok(out)
    }
}
