//! Error types for moneyweb-import

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unknown importer: {name}")]
    UnknownImporter { name: String },

    #[error("Invalid processor pattern '{name}': {message}")]
    InvalidPattern { name: String, message: String },

    #[error("Invalid date '{value}'")]
    InvalidDate { value: String },

    #[error("Invalid amount '{value}'")]
    InvalidAmount { value: String },

    #[error("Missing field '{field}' in line {line}")]
    MissingField { field: String, line: usize },

    #[error("Line {line}: {message}")]
    LineError { line: usize, message: String },

    #[error("IO error")]
    IoError(#[from] io::Error),
}
