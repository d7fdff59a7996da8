//! Core data models for the ledger

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money coming into the account
    Incoming,
    /// Money leaving the account
    Outgoing,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Incoming => write!(f, "Incoming"),
            Direction::Outgoing => write!(f, "Outgoing"),
        }
    }
}

/// User-defined transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Opaque category identifier
    pub id: String,
    /// Display name (falls back to the id)
    #[serde(default)]
    pub name: String,
}

impl Category {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), name: String::new() }
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// A bank transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Primary key
    pub id: u64,
    pub date: NaiveDate,
    /// Short description shown in the table
    pub description: String,
    /// Extended description, hidden until the row is expanded
    #[serde(default)]
    pub extra: Option<String>,
    /// Positive for incoming money, negative for outgoing
    pub amount: Decimal,
    /// Category id
    #[serde(default)]
    pub category: Option<String>,
    /// Counterparty name
    #[serde(default)]
    pub counterparty: Option<String>,
    /// Running balance from the statement
    #[serde(default)]
    pub balance: Option<Decimal>,
}

impl Transaction {
    /// Incoming, outgoing, or neither for zero amounts
    pub fn direction(&self) -> Option<Direction> {
        if self.amount > Decimal::ZERO {
            Some(Direction::Incoming)
        } else if self.amount < Decimal::ZERO {
            Some(Direction::Outgoing)
        } else {
            None
        }
    }

    pub fn has_extra(&self) -> bool {
        self.extra.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
    }

    /// Category id, empty when uncategorised
    pub fn category_id(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    /// Check if the transaction falls in `[start, end)`
    pub fn in_range(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.date >= start && self.date < end
    }
}

/// The other party of a set of transactions, recognised by patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterParty {
    pub name: String,
    /// Category applied to uncategorised matching transactions
    #[serde(default)]
    pub auto_categorise: Option<String>,
    /// Case-insensitive regex patterns matched against descriptions
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl CounterParty {
    /// Check if any pattern matches the description
    pub fn matches(&self, description: &str) -> bool {
        self.patterns.iter().any(|pattern| match compile_pattern(pattern) {
            Ok(regex) => regex.is_match(description),
            Err(e) => {
                log::warn!("Skipping invalid pattern '{}' of {}: {}", pattern, self.name, e);
                false
            }
        })
    }
}

/// Compile a counterparty pattern the way it is matched
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// In-memory ledger data, persisted as one JSON document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerData {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub counterparties: Vec<CounterParty>,
    /// Next primary key to hand out
    #[serde(default)]
    pub next_id: u64,
}

impl LedgerData {
    /// Allocate a primary key above every existing one
    pub fn allocate_id(&mut self) -> u64 {
        let max = self.transactions.iter().map(|t| t.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max + 1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: Decimal) -> Transaction {
        Transaction {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: "TESCO STORES 2041".to_string(),
            extra: Some("  ".to_string()),
            amount,
            category: None,
            counterparty: None,
            balance: None,
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(tx(Decimal::new(5, 0)).direction(), Some(Direction::Incoming));
        assert_eq!(tx(Decimal::new(-5, 0)).direction(), Some(Direction::Outgoing));
        assert_eq!(tx(Decimal::ZERO).direction(), None);
        assert!(!tx(Decimal::ZERO).has_extra());
    }

    #[test]
    fn test_counterparty_matches_case_insensitive() {
        let cp = CounterParty {
            name: "Tesco".to_string(),
            auto_categorise: None,
            patterns: vec!["(".to_string(), "^tesco".to_string()],
        };
        assert!(cp.matches("TESCO STORES 2041"));
        assert!(!cp.matches("SAINSBURYS"));
    }

    #[test]
    fn test_allocate_id_skips_existing() {
        let mut data = LedgerData::default();
        data.transactions.push(Transaction { id: 7, ..tx(Decimal::ONE) });
        assert_eq!(data.allocate_id(), 8);
        assert_eq!(data.allocate_id(), 9);
    }

    #[test]
    fn test_category_label() {
        let mut category = Category::new("groceries");
        assert_eq!(category.label(), "groceries");
        category.name = "Groceries".to_string();
        assert_eq!(category.label(), "Groceries");
    }
}
