use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, lifting or writing KiCad files
#[derive(Error, Debug)]
pub enum Error {
    #[error("Expected ({expected} ...) but found {found}")]
    WrongForm { expected: String, found: String },
    #[error("Unexpected end of input at byte {at}")]
    UnexpectedEof { at: usize },
    #[error("Unbalanced ')' at byte {at}")]
    UnbalancedParen { at: usize },
    #[error("Unclosed '(' at byte {at}")]
    UnclosedParen { at: usize },
    #[error("Unterminated string starting at byte {at}")]
    UnterminatedString { at: usize },
    #[error("Unexpected token at byte {at}")]
    UnexpectedToken { at: usize },
    #[error("Value {index} of ({form} ...) not found")]
    MissingValue { form: String, index: usize },
    #[error("Invalid number {value:?} in ({form} ...)")]
    InvalidNumber { form: String, value: String },
    #[error("{0}")]
    Invariant(String),
    #[error("No file path given and no source path remembered")]
    NoPath,
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
    #[error("{path} is not valid {encoding}")]
    Encoding { encoding: String, path: PathBuf },
    #[error("IO error {0}")]
    Io(#[from] std::io::Error),
    #[error("Formatting error")]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn wrong_form(expected: &str, found: Option<&str>) -> Self {
        Error::WrongForm {
            expected: expected.to_owned(),
            found: match found {
                Some(head) => format!("({head} ...)"),
                None => "a bare atom or headless list".to_owned(),
            },
        }
    }
}
