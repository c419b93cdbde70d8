//! Typed model and reader/writer for KiCad's S-expression files: boards,
//! schematics, symbol libraries, footprints, library tables and custom
//! design rules.
//!
//! Every file kind implements [`Document`]; every entity inside one
//! implements [`Form`]. Both lift from the generic [`SExpr`] tree that
//! [`parse`] produces and print back to KiCad-style text.

pub mod board;
pub mod config;
pub mod document;
pub mod dru;
mod emit;
pub mod error;
pub mod footprint;
pub mod form;
pub mod items;
pub mod libraries;
pub mod schematic;
pub mod sexpr;
mod strings;
pub mod symbol;

pub use board::Board;
pub use config::CodecConfig;
pub use document::{Document, DocumentHandle, TextEncoding};
pub use dru::DesignRules;
pub use error::{Error, Result};
pub use footprint::Footprint;
pub use form::Form;
pub use libraries::{LibTable, LibTableType};
pub use schematic::Schematic;
pub use sexpr::{parse, SExpr};
pub use strings::{dequote, remove_prefix};
pub use symbol::SymbolLib;
