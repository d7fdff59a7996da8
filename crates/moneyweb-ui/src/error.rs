//! Errors raised while wiring the table behaviour

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Missing attribute: {name}")]
    MissingAttribute { name: &'static str },

    #[error("Missing element: {selector}")]
    MissingElement { selector: String },

    #[error("Script error: {message}")]
    Script { message: String },
}

impl EditorError {
    pub fn missing_element(selector: &str) -> Self {
        EditorError::MissingElement { selector: selector.to_string() }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
