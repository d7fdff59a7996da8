//! Errors raised while reading `config.yaml`

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {} does not exist", path.display())]
    Missing { path: PathBuf },

    #[error("could not read config file {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{field} must not be empty")]
    EmptyList { field: String },

    #[error("processor '{name}' for importer '{importer}': {reason}")]
    Processor {
        importer: String,
        name: String,
        reason: String,
    },
}

impl ConfigError {
    /// The dotted config key the error points at, if any
    pub fn field(&self) -> Option<String> {
        match self {
            ConfigError::InvalidValue { field, .. } | ConfigError::EmptyList { field } => Some(field.clone()),
            ConfigError::Processor { .. } => Some("import.processors".to_string()),
            _ => None,
        }
    }

    /// A short hint printed next to the error at startup
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ConfigError::Missing { .. } => Some("pass --config or run `moneyweb default-config > config.yaml`"),
            ConfigError::Yaml(_) => Some("compare against the output of `moneyweb default-config`"),
            ConfigError::EmptyList { .. } => Some("remove the key to fall back to the built-in defaults"),
            ConfigError::Processor { .. } => {
                Some("processor patterns need a `date*` named group and an `amount` named group")
            }
            ConfigError::Unreadable { .. } | ConfigError::InvalidValue { .. } => None,
        }
    }
}
