//! `config.yaml` for moneyweb
//!
//! Every section is optional; missing keys take the values of
//! `templates/default_config.yaml`.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with static assets (the compiled table UI bundle)
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

/// Where the ledger store and statements live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to data directory
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// JSON store file name (relative to data path)
    #[serde(default = "default_store_file")]
    pub store_file: String,
    /// Directory with bank statements to import (relative to data path)
    #[serde(default = "default_statements_dir")]
    pub statements_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            store_file: default_store_file(),
            statements_dir: default_statements_dir(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_store_file() -> String {
    "ledger.json".to_string()
}

fn default_statements_dir() -> String {
    "statements".to_string()
}

/// How amounts are displayed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Symbol shown before amounts
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Digits after the decimal point
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
        }
    }
}

fn default_symbol() -> String {
    "£".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

/// A statement line processor declared in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Importer this processor belongs to
    pub importer: String,
    /// Processor name (used in logs)
    pub name: String,
    /// Regex with named groups (`date*`, `amount`, `description`, ...)
    pub pattern: String,
}

/// Statement import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Date formats tried in order for `date*` groups
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    /// Extra processors, grouped into importers by name
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            date_formats: default_date_formats(),
            processors: Vec::new(),
        }
    }
}

fn default_date_formats() -> Vec<String> {
    vec!["%d-%m-%Y".to_string(), "%Y-%m-%d".to_string()]
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default env_logger filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Top-level `config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger store and statements
    #[serde(default)]
    pub data: DataConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Statement import settings
    #[serde(default)]
    pub import: ImportConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Read and validate `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ConfigError::Missing { path: path.to_path_buf() },
            _ => ConfigError::Unreadable { path: path.to_path_buf(), source },
        })?;

        Self::from_yaml(&content)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Missing { path }) => {
                log::warn!("{} not found, running with default settings", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server or the importers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: String| ConfigError::InvalidValue { field: field.to_string(), reason };

        if self.server.port == 0 {
            return Err(invalid("server.port", "0 is not a listenable port".to_string()));
        }
        if self.currency.decimal_places > 10 {
            return Err(invalid(
                "currency.decimal_places",
                format!("{} is more than the 10 places amounts are shown with", self.currency.decimal_places),
            ));
        }
        if self.import.date_formats.is_empty() {
            return Err(ConfigError::EmptyList { field: "import.date_formats".to_string() });
        }

        for processor in &self.import.processors {
            let processor_error = |reason: String| ConfigError::Processor {
                importer: processor.importer.clone(),
                name: processor.name.clone(),
                reason,
            };

            let regex = regex::Regex::new(&processor.pattern).map_err(|e| processor_error(e.to_string()))?;
            let groups: Vec<&str> = regex.capture_names().flatten().collect();
            if !groups.iter().any(|g| g.starts_with("date")) {
                return Err(processor_error("pattern has no date group".to_string()));
            }
            if !groups.contains(&"amount") {
                return Err(processor_error("pattern has no amount group".to_string()));
            }
        }

        Ok(())
    }

    /// The commented template printed by `moneyweb default-config`
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Full path to the JSON store file
    pub fn store_path(&self) -> PathBuf {
        self.data.path.join(&self.data.store_file)
    }

    /// Full path to the statements directory
    pub fn statements_path(&self) -> PathBuf {
        self.data.path.join(&self.data.statements_dir)
    }

    /// Processors configured for the given importer
    pub fn processors_for(&self, importer: &str) -> Vec<&ProcessorConfig> {
        self.import
            .processors
            .iter()
            .filter(|p| p.importer == importer)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.data.store_file, "ledger.json");
        assert_eq!(config.import.date_formats.len(), 2);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_yaml("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.currency.decimal_places, 2);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.store_path(), PathBuf::from("./data/ledger.json"));
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.port"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_processor_pattern_validation() {
        let yaml = r#"
import:
  processors:
    - importer: bank
      name: broken
      pattern: "(?P<date>"
"#;
        assert!(matches!(Config::from_yaml(yaml), Err(ConfigError::Processor { .. })));

        let yaml = r#"
import:
  processors:
    - importer: bank
      name: no-amount
      pattern: "^(?P<date>\\S+) (?P<description>.*)$"
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("no amount group"));
    }

    #[test]
    fn test_processors_for_importer() {
        let yaml = r#"
import:
  processors:
    - importer: bank
      name: card
      pattern: "^(?P<date>\\S+),(?P<amount>\\S+)$"
    - importer: other
      name: dd
      pattern: "^(?P<date_posted>\\S+);(?P<amount>\\S+)$"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.processors_for("bank").len(), 1);
        assert_eq!(config.processors_for("other")[0].name, "dd");
        assert!(config.processors_for("missing").is_empty());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/moneyweb.yaml")).unwrap();
        assert_eq!(config.server.port, 8082);
    }
}
