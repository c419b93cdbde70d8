//! Version stamp and generator name written into freshly created documents.

/// File format version KiCad 6 writes
pub const DEFAULT_VERSION: u32 = 20211014;

pub const DEFAULT_GENERATOR: &str = "kicad_files";

/// Stamp applied by the `create_new` factories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    pub version: u32,
    pub generator: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            generator: DEFAULT_GENERATOR.to_owned(),
        }
    }
}

impl CodecConfig {
    pub fn new(version: u32, generator: impl Into<String>) -> Self {
        Self {
            version,
            generator: generator.into(),
        }
    }
}
