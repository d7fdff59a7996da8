//! Ledger errors
//!
//! Every [`CoreError`] maps to a stable [`ErrorCode`] that the JSON API
//! returns, and to an [`ErrorSeverity`] that decides how loudly it is logged.

use serde::Serialize;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TransactionNotFound,
    ParseError,
    ValidationError,
    IoError,
    ImportError,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::ImportError => "IMPORT_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an error is reported: user mistakes are warnings, a broken store is critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

/// JSON body of a failed API call
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub severity: ErrorSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(hint) = self.hint {
            write!(f, " ({})", hint)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("no transaction with id {id}")]
    TransactionNotFound { id: u64 },

    #[error("ledger store is not valid JSON: {message}")]
    ParseError { message: String },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("ledger store I/O failed: {0}")]
    IoError(#[from] io::Error),

    #[error("statement import failed: {0}")]
    ImportError(#[from] moneyweb_import::ImportError),

    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::ParseError { .. } => ErrorCode::ParseError,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::IoError(_) => ErrorCode::IoError,
            CoreError::ImportError(_) => ErrorCode::ImportError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::TransactionNotFound { .. } | CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::IoError(_) | CoreError::ImportError(_) => ErrorSeverity::Error,
            CoreError::ParseError { .. } | CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            CoreError::TransactionNotFound { .. } => Some("the ledger may have been reloaded since the page was rendered"),
            CoreError::ParseError { .. } => Some("fix or remove the store file, then POST /api/reload"),
            CoreError::ImportError(_) => Some("check the statement against the importer's processors"),
            _ => None,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        ErrorDetails {
            code: self.code(),
            severity: self.severity(),
            message: self.to_string(),
            hint: self.hint(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// What was being done when an error surfaced, attached to its log line
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub operation: String,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::Map::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }
}

pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Logs through the `log` facade under the `moneyweb::error` target
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let level = match error.severity() {
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error | ErrorSeverity::Critical => log::Level::Error,
        };
        log::log!(
            target: "moneyweb::error",
            level,
            "{} during {} {}",
            error.to_details(),
            context.operation,
            serde_json::Value::Object(context.data.clone())
        );
    }
}
