//! Values produced by statement processors

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ImportError;

/// A converted field value captured from a statement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Amount(Decimal),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Named fields of one statement line, ordered by name
pub type Fields = BTreeMap<String, FieldValue>;

/// A transaction read from a bank statement, not yet stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedTransaction {
    pub date: NaiveDate,
    pub description: String,
    /// Extended description text shown when the row is expanded
    pub extra: Option<String>,
    pub amount: Decimal,
    /// Running balance reported by the bank
    pub balance: Option<Decimal>,
    pub counterparty: Option<String>,
    /// Name of the processor that matched the line
    pub source: String,
}

impl ImportedTransaction {
    /// Build a transaction from processed fields
    ///
    /// The `date` field wins over other `date*` fields; `amount` is required.
    pub fn from_fields(fields: &Fields, source: &str, line: usize) -> Result<Self, ImportError> {
        let date = match fields.get("date") {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => fields.iter().find_map(|(name, value)| match value {
                FieldValue::Date(d) if name.starts_with("date") => Some(*d),
                _ => None,
            }),
        }
        .ok_or_else(|| ImportError::MissingField { field: "date".to_string(), line })?;

        let amount = match fields.get("amount") {
            Some(FieldValue::Amount(a)) => *a,
            _ => return Err(ImportError::MissingField { field: "amount".to_string(), line }),
        };

        let balance = match fields.get("balance") {
            Some(FieldValue::Amount(b)) => Some(*b),
            _ => None,
        };

        let text = |name: &str| {
            fields
                .get(name)
                .and_then(FieldValue::as_text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Ok(Self {
            date,
            description: text("description").unwrap_or_default(),
            extra: text("extra"),
            amount,
            balance,
            counterparty: text("counterparty"),
            source: source.to_string(),
        })
    }
}
