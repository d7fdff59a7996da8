//! Bank statement importers
//!
//! An importer is an ordered list of regex line processors. Each statement
//! line is offered to the processors in order and the first match turns it
//! into an [`ImportedTransaction`].

use async_trait::async_trait;
use moneyweb_config::Config;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub mod processor;
pub mod types;

pub use error::ImportError;
pub use processor::{parse_currency, parse_date, LineProcessor};
pub use types::{FieldValue, Fields, ImportedTransaction};

/// Name of the built-in CSV importer
pub const GENERIC_CSV: &str = "generic-csv";

/// `date,description,amount[,balance]`
static GENERIC_CSV_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<date>[^,]*\d[^,]*),(?P<description>[^,]*),(?P<amount>[^,]*\d[^,]*)(?:,(?P<balance>[^,]*\d[^,]*))?\s*$")
        .unwrap()
});

/// Importer reference type
pub type ImporterRef = Arc<dyn StatementImporter>;

/// Trait for statement importers
#[async_trait]
pub trait StatementImporter: Send + Sync {
    /// Importer name, as given on the command line
    fn name(&self) -> &str;

    /// Convert a single line; `None` when no processor matches
    fn process_line(&self, line: &str, line_number: usize) -> Result<Option<ImportedTransaction>, ImportError>;

    /// Read a statement file and convert every matching line
    async fn process(&self, path: PathBuf) -> Result<Vec<ImportedTransaction>, ImportError>;
}

/// Processor-list importer
#[derive(Debug, Clone)]
pub struct Importer {
    name: String,
    processors: Vec<LineProcessor>,
    extra_fields: Fields,
    date_formats: Vec<String>,
}

impl Importer {
    pub fn new(name: &str, date_formats: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            processors: Vec::new(),
            extra_fields: Fields::new(),
            date_formats,
        }
    }

    /// Register a processor; earlier processors take precedence
    pub fn with_processor(mut self, processor: LineProcessor) -> Self {
        self.processors.push(processor);
        self
    }

    /// Field added to every transaction unless the line captures it
    pub fn with_extra_field(mut self, name: &str, value: FieldValue) -> Self {
        self.extra_fields.insert(name.to_string(), value);
        self
    }

    pub fn processors(&self) -> &[LineProcessor] {
        &self.processors
    }

    /// Build a named importer from the built-ins and the configured processors
    pub fn from_config(name: &str, config: &Config) -> Result<Self, ImportError> {
        let mut importer = Importer::new(name, config.import.date_formats.clone());

        for processor in config.processors_for(name) {
            importer = importer.with_processor(LineProcessor::new(&processor.name, &processor.pattern)?);
        }

        if name == GENERIC_CSV {
            importer = importer.with_processor(LineProcessor::from_regex(GENERIC_CSV, GENERIC_CSV_LINE.clone()));
        }

        if importer.processors.is_empty() {
            return Err(ImportError::UnknownImporter { name: name.to_string() });
        }

        Ok(importer)
    }
}

/// Names of every importer available with this config
pub fn importer_names(config: &Config) -> Vec<String> {
    let mut names = vec![GENERIC_CSV.to_string()];
    for processor in &config.import.processors {
        if !names.contains(&processor.importer) {
            names.push(processor.importer.clone());
        }
    }
    names
}

#[async_trait]
impl StatementImporter for Importer {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_line(&self, line: &str, line_number: usize) -> Result<Option<ImportedTransaction>, ImportError> {
        for processor in &self.processors {
            if !processor.is_match(line) {
                continue;
            }

            return processor
                .transaction(line, line_number, &self.extra_fields, &self.date_formats)
                .map_err(|e| ImportError::LineError { line: line_number, message: e.to_string() });
        }
        Ok(None)
    }

    async fn process(&self, path: PathBuf) -> Result<Vec<ImportedTransaction>, ImportError> {
        let content = tokio::fs::read_to_string(&path).await?;

        let mut transactions = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match self.process_line(line, i + 1)? {
                Some(tx) => transactions.push(tx),
                None => log::debug!("{}:{} skipped by importer '{}'", path.display(), i + 1, self.name),
            }
        }

        log::info!(
            "Importer '{}' read {} transactions from {}",
            self.name,
            transactions.len(),
            path.display()
        );
        Ok(transactions)
    }
}

// ==================== Tests ====================
