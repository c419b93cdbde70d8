//! Top-level document contract and the file I/O seam.

use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::error::{Error, Result};
use crate::sexpr::{self, SExpr};

/// Caller-selected text encoding; `None` reads and writes UTF-8.
pub type TextEncoding = Option<&'static Encoding>;

/// A whole KiCad file: board, schematic, symbol library, footprint,
/// library table or design rules.
pub trait Document: Sized {
    fn from_tree(sexpr: &SExpr) -> Result<Self>;

    fn to_tree_string(&self, indent: usize, newline: bool) -> Result<String>;

    /// Parse file contents.
    fn from_str(text: &str) -> Result<Self> {
        Self::from_tree(&sexpr::parse(text)?)
    }

    /// Read and parse `path`, remembering it for later saves.
    fn from_file(path: impl AsRef<Path>, encoding: TextEncoding) -> Result<DocumentHandle<Self>> {
        let path = path.as_ref();
        let text = read_text(path, encoding)?;
        let doc = Self::from_str(&text)?;
        Ok(DocumentHandle {
            doc,
            source_path: Some(path.to_path_buf()),
        })
    }

    fn to_file(&self, path: impl AsRef<Path>, encoding: TextEncoding) -> Result<()> {
        write_text(path.as_ref(), &self.to_tree_string(0, true)?, encoding)
    }
}

/// A document together with the path it was read from.
///
/// The path is never emitted; it only supplies the default destination of
/// [`DocumentHandle::to_file`].
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentHandle<T> {
    pub doc: T,
    pub source_path: Option<PathBuf>,
}

impl<T: Document> DocumentHandle<T> {
    pub fn new(doc: T) -> Self {
        Self {
            doc,
            source_path: None,
        }
    }

    /// Write to `path`, or to the remembered source path when `path` is `None`.
    pub fn to_file(&self, path: Option<&Path>, encoding: TextEncoding) -> Result<()> {
        let path = path.or(self.source_path.as_deref()).ok_or(Error::NoPath)?;
        self.doc.to_file(path, encoding)
    }

    pub fn into_inner(self) -> T {
        self.doc
    }
}

impl<T> Deref for DocumentHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.doc
    }
}

impl<T> DerefMut for DocumentHandle<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.doc
    }
}

pub(crate) fn read_text(path: &Path, encoding: TextEncoding) -> Result<String> {
    if !path.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    log::debug!("read {} bytes from {}", bytes.len(), path.display());
    let encoding = encoding.unwrap_or(encoding_rs::UTF_8);
    let (encoding, body) = match Encoding::for_bom(&bytes) {
        Some((found, len)) => (found, &bytes[len..]),
        None => (encoding, &bytes[..]),
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| Error::Encoding {
            encoding: encoding.name().to_owned(),
            path: path.to_path_buf(),
        })
}

pub(crate) fn write_text(path: &Path, text: &str, encoding: TextEncoding) -> Result<()> {
    let bytes = match encoding {
        None => text.as_bytes().to_vec(),
        Some(encoding) => {
            let (bytes, _, unmappable) = encoding.encode(text);
            if unmappable {
                return Err(Error::Encoding {
                    encoding: encoding.name().to_owned(),
                    path: path.to_path_buf(),
                });
            }
            bytes.into_owned()
        }
    };
    fs::write(path, &bytes)?;
    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use tempfile::tempdir;

    #[test]
    fn reading_a_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_text(dir.path(), None),
            Err(Error::NotAFile(_))
        ));
    }

    #[test]
    fn reading_a_missing_path_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.kicad_pcb");
        assert!(matches!(read_text(&path, None), Err(Error::NotAFile(_))));
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [b'(', b'a', b' ', 0xE9, b')']).unwrap();
        assert!(matches!(
            read_text(&path, None),
            Err(Error::Encoding { .. })
        ));
        assert_eq!(
            read_text(&path, Some(encoding_rs::WINDOWS_1252)).unwrap(),
            "(a \u{e9})"
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(encoding_rs::WINDOWS_1252))]
    fn utf8_byte_order_mark_is_dropped(#[case] encoding: TextEncoding) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fp-lib-table");
        fs::write(&path, "\u{feff}(fp_lib_table (version 7))").unwrap();
        assert_eq!(
            read_text(&path, encoding).unwrap(),
            "(fp_lib_table (version 7))"
        );
    }

    #[test]
    fn unmappable_characters_fail_on_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        assert!(matches!(
            write_text(&path, "(a \u{4e2d})", Some(encoding_rs::WINDOWS_1252)),
            Err(Error::Encoding { .. })
        ));
        write_text(&path, "(a \u{e9})", Some(encoding_rs::WINDOWS_1252)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![b'(', b'a', b' ', 0xE9, b')']);
    }
}
