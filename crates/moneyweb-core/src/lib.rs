//! Core ledger storage and business logic
//!
//! The ledger is a single JSON document holding categories, transactions
//! and counterparties. Every mutating operation persists the document.

pub mod counterparty;
pub mod error;
pub mod models;
pub mod month;
pub mod reports;

use moneyweb_import::ImportedTransaction;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use counterparty::{category_choices, CounterPartyPatternForm, FormErrors};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use models::{Category, CounterParty, Direction, LedgerData, Transaction};
pub use month::{month_range, resolve_month, Timeline, TimelineMonth};
pub use reports::{InOutChart, MonthTransactionsResponse};

/// Main ledger structure
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    data: LedgerData,
}

impl Ledger {
    /// Create an empty ledger stored at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path, data: LedgerData::default() }
    }

    /// Create a ledger from existing data
    pub fn with_data(path: PathBuf, data: LedgerData) -> Self {
        Self { path, data }
    }

    /// Load the ledger from its JSON store; a missing file is an empty ledger
    pub async fn open(path: PathBuf) -> CoreResult<Self> {
        let mut ledger = Self::new(path);
        ledger.reload().await?;
        Ok(ledger)
    }

    /// Re-read the store file
    pub async fn reload(&mut self) -> CoreResult<()> {
        if !tokio::fs::try_exists(&self.path).await? {
            log::warn!("Ledger store {} not found, starting empty", self.path.display());
            self.data = LedgerData::default();
            return Ok(());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        self.data = serde_json::from_str(&content)
            .map_err(|e| CoreError::ParseError { message: e.to_string() })?;

        log::info!(
            "Loaded {} transactions, {} categories from {}",
            self.data.transactions.len(),
            self.data.categories.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Write the store file (temp file + rename)
    pub async fn save(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&self.data)
            .map_err(|e| CoreError::InternalError { message: e.to_string() })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        log::debug!("Saved ledger to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &LedgerData {
        &self.data
    }

    pub fn categories(&self) -> &[Category] {
        &self.data.categories
    }

    pub fn counterparties(&self) -> &[CounterParty] {
        &self.data.counterparties
    }

    pub fn transaction(&self, id: u64) -> Option<&Transaction> {
        self.data.transactions.iter().find(|t| t.id == id)
    }

    /// Transactions dated within the month, newest first
    pub fn month_transactions(&self, year: i32, month: u32) -> CoreResult<Vec<Transaction>> {
        let (start, end) = month_range(year, month)?;

        let mut transactions: Vec<Transaction> = self
            .data
            .transactions
            .iter()
            .filter(|t| t.in_range(start, end))
            .cloned()
            .collect();

        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(transactions)
    }

    /// Incoming/outgoing totals per category for the month
    pub fn in_out_data(&self, year: i32, month: u32) -> CoreResult<InOutChart> {
        let (start, end) = month_range(year, month)?;
        let transactions = self.data.transactions.iter().filter(|t| t.in_range(start, end));
        Ok(InOutChart::build(transactions, &self.data.categories))
    }

    /// Persist, or put `snapshot` back so memory never runs ahead of the store
    async fn commit(&mut self, snapshot: LedgerData) -> CoreResult<()> {
        if let Err(e) = self.save().await {
            log::warn!("Save to {} failed, discarding unsaved changes", self.path.display());
            self.data = snapshot;
            return Err(e);
        }
        Ok(())
    }

    /// Add the category if it does not exist yet
    fn ensure_category(&mut self, id: &str) {
        if !self.data.categories.iter().any(|c| c.id == id) {
            log::info!("Creating category '{}'", id);
            self.data.categories.push(Category::new(id));
        }
    }

    /// Set (or clear, with an empty id) the category of a transaction
    ///
    /// Unknown category ids are created, since the selector accepts typed values.
    pub async fn categorise(&mut self, id: u64, category: &str) -> CoreResult<Transaction> {
        let category = category.trim();
        let index = self
            .data
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound { id })?;

        let snapshot = self.data.clone();
        let category = if category.is_empty() {
            None
        } else {
            self.ensure_category(category);
            Some(category.to_string())
        };

        let tx = &mut self.data.transactions[index];
        log::info!(
            "Transaction {}: category {:?} -> {:?}",
            tx.id,
            tx.category,
            category
        );
        tx.category = category;
        let updated = tx.clone();

        self.commit(snapshot).await?;
        Ok(updated)
    }

    /// Transactions whose description matches the pattern
    pub fn preview_pattern(&self, pattern: &str) -> CoreResult<Vec<Transaction>> {
        let regex = models::compile_pattern(pattern.trim())
            .map_err(|e| CoreError::ValidationError { message: format!("Invalid pattern: {}", e) })?;

        let mut matches: Vec<Transaction> = self
            .data
            .transactions
            .iter()
            .filter(|t| regex.is_match(&t.description))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(matches)
    }

    /// Create or extend a counterparty and apply it to existing transactions
    ///
    /// Returns the number of transactions that matched.
    pub async fn add_counterparty_pattern(&mut self, form: &CounterPartyPatternForm) -> CoreResult<usize> {
        form.validate().map_err(|errors| CoreError::ValidationError {
            message: errors
                .iter()
                .map(|(field, message)| format!("{}: {}", field, message))
                .collect::<Vec<_>>()
                .join("; "),
        })?;

        let name = form.counterparty.trim().to_string();
        let pattern = form.pattern.trim().to_string();
        let auto_category = form.auto_category().map(str::to_string);
        let snapshot = self.data.clone();

        if let Some(category) = &auto_category {
            self.ensure_category(category);
        }

        let position = self.data.counterparties.iter().position(|c| c.name == name);
        let counterparty = match position {
            Some(i) => {
                let existing = &mut self.data.counterparties[i];
                if !existing.patterns.contains(&pattern) {
                    existing.patterns.push(pattern);
                }
                if auto_category.is_some() {
                    existing.auto_categorise = auto_category;
                }
                existing.clone()
            }
            None => {
                let created = CounterParty {
                    name,
                    auto_categorise: auto_category,
                    patterns: vec![pattern],
                };
                self.data.counterparties.push(created.clone());
                created
            }
        };

        let mut matched = 0;
        for tx in self.data.transactions.iter_mut() {
            if apply_counterparty(tx, &counterparty) {
                matched += 1;
            }
        }

        log::info!("Counterparty '{}' matched {} transactions", counterparty.name, matched);
        self.commit(snapshot).await?;
        Ok(matched)
    }

    /// Store imported statement lines as new transactions
    pub async fn import(&mut self, imported: Vec<ImportedTransaction>) -> CoreResult<usize> {
        let count = imported.len();
        let snapshot = self.data.clone();

        for item in imported {
            let id = self.data.allocate_id();
            let mut tx = Transaction {
                id,
                date: item.date,
                description: item.description,
                extra: item.extra,
                amount: item.amount,
                category: None,
                counterparty: item.counterparty,
                balance: item.balance,
            };

            if tx.counterparty.is_none() {
                if let Some(counterparty) = self.data.counterparties.iter().find(|c| c.matches(&tx.description)) {
                    apply_counterparty(&mut tx, counterparty);
                }
            }

            self.data.transactions.push(tx);
        }

        log::info!("Imported {} transactions", count);
        self.commit(snapshot).await?;
        Ok(count)
    }
}

/// Tag a matching transaction; returns whether it matched
fn apply_counterparty(tx: &mut Transaction, counterparty: &CounterParty) -> bool {
    if !counterparty.matches(&tx.description) {
        return false;
    }

    tx.counterparty = Some(counterparty.name.clone());
    if tx.category.is_none() {
        tx.category = counterparty.auto_categorise.clone();
    }
    true
}

/// Ledger operations trait
pub trait LedgerOperations {
    /// Get ledger summary
    fn summary(&self) -> LedgerSummary;
}

/// Ledger summary
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_transactions: usize,
    pub total_categories: usize,
    pub total_counterparties: usize,
    pub uncategorised: usize,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

impl LedgerOperations for Ledger {
    fn summary(&self) -> LedgerSummary {
        let dates = self.data.transactions.iter().map(|t| t.date);
        LedgerSummary {
            total_transactions: self.data.transactions.len(),
            total_categories: self.data.categories.len(),
            total_counterparties: self.data.counterparties.len(),
            uncategorised: self.data.transactions.iter().filter(|t| t.category.is_none()).count(),
            period_start: dates.clone().min().map(|d| d.to_string()),
            period_end: dates.max().map(|d| d.to_string()),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(id: u64, date: NaiveDate, description: &str, amount: i64, category: Option<&str>) -> Transaction {
        Transaction {
            id,
            date,
            description: description.to_string(),
            extra: None,
            amount: Decimal::new(amount, 2),
            category: category.map(str::to_string),
            counterparty: None,
            balance: None,
        }
    }

    fn sample_data() -> LedgerData {
        LedgerData {
            categories: vec![Category::new("food"), Category::new("salary")],
            transactions: vec![
                tx(1, date(2024, 1, 5), "TESCO STORES", -1250, None),
                tx(2, date(2024, 1, 31), "ACME LTD SALARY", 250000, Some("salary")),
                tx(3, date(2024, 2, 1), "TESCO EXPRESS", -430, None),
                tx(4, date(2023, 12, 31), "PUREGYM", -2000, None),
                tx(5, date(2024, 1, 31), "CAFE", -300, Some("food")),
            ],
            counterparties: vec![],
            next_id: 6,
        }
    }

    fn sample_ledger(dir: &tempfile::TempDir) -> Ledger {
        Ledger::with_data(dir.path().join("ledger.json"), sample_data())
    }

    #[test]
    fn test_month_transactions_ordering() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = sample_ledger(&dir);

        let ids: Vec<u64> = ledger.month_transactions(2024, 1).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![5, 2, 1]);

        let ids: Vec<u64> = ledger.month_transactions(2023, 12).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4]);

        assert!(ledger.month_transactions(2024, 13).is_err());
    }

    #[test]
    fn test_in_out_data_for_month() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = sample_ledger(&dir);

        let chart = ledger.in_out_data(2024, 1).unwrap();
        assert_eq!(chart.data[1], serde_json::json!(["Incoming", 0.0, 0.0, 2500.0, 2500.0]));
        assert_eq!(chart.data[2], serde_json::json!(["Outgoing", 12.5, 3.0, 0.0, 15.5]));
    }

    #[tokio::test]
    async fn test_categorise_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = sample_ledger(&dir);

        let updated = ledger.categorise(1, "food").await.unwrap();
        assert_eq!(updated.category.as_deref(), Some("food"));

        let reopened = Ledger::open(dir.path().join("ledger.json")).await.unwrap();
        assert_eq!(reopened.transaction(1).unwrap().category.as_deref(), Some("food"));
        assert_eq!(reopened.transaction(3).unwrap().category, None);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_ledger_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let mut ledger = Ledger::with_data(blocker.join("ledger.json"), sample_data());

        assert!(ledger.categorise(1, "gym").await.is_err());
        assert_eq!(ledger.transaction(1).unwrap().category, None);
        assert_eq!(ledger.data(), &sample_data());

        let form = CounterPartyPatternForm {
            counterparty: "Tesco".to_string(),
            auto_categorise: "groceries".to_string(),
            pattern: "tesco".to_string(),
        };
        assert!(ledger.add_counterparty_pattern(&form).await.is_err());
        assert_eq!(ledger.data(), &sample_data());
    }

    #[tokio::test]
    async fn test_categorise_creates_typed_category() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = sample_ledger(&dir);

        ledger.categorise(4, " gym ").await.unwrap();
        assert_eq!(ledger.transaction(4).unwrap().category.as_deref(), Some("gym"));
        assert!(ledger.categories().iter().any(|c| c.id == "gym"));
    }

    #[tokio::test]
    async fn test_categorise_clear_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = sample_ledger(&dir);

        ledger.categorise(2, "").await.unwrap();
        assert_eq!(ledger.transaction(2).unwrap().category, None);

        let err = ledger.categorise(99, "food").await.unwrap_err();
        assert!(matches!(err, CoreError::TransactionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_open_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("missing.json")).await.unwrap();
        assert!(ledger.data().transactions.is_empty());
    }

    #[tokio::test]
    async fn test_open_invalid_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();
        assert!(matches!(Ledger::open(path).await, Err(CoreError::ParseError { .. })));
    }

    #[test]
    fn test_preview_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = sample_ledger(&dir);

        let ids: Vec<u64> = ledger.preview_pattern("^tesco").unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(matches!(ledger.preview_pattern("tesco("), Err(CoreError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_add_counterparty_pattern_applies_category() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = sample_ledger(&dir);

        let form = CounterPartyPatternForm {
            counterparty: "Tesco".to_string(),
            auto_categorise: "groceries".to_string(),
            pattern: "^TESCO".to_string(),
        };
        assert_eq!(ledger.add_counterparty_pattern(&form).await.unwrap(), 2);
        assert_eq!(ledger.transaction(1).unwrap().category.as_deref(), Some("groceries"));
        assert_eq!(ledger.transaction(3).unwrap().counterparty.as_deref(), Some("Tesco"));
        assert!(ledger.categories().iter().any(|c| c.id == "groceries"));

        // Extending keeps one counterparty and does not overwrite categories
        let form = CounterPartyPatternForm {
            counterparty: "Tesco".to_string(),
            auto_categorise: String::new(),
            pattern: "CAFE".to_string(),
        };
        assert_eq!(ledger.add_counterparty_pattern(&form).await.unwrap(), 3);
        assert_eq!(ledger.counterparties().len(), 1);
        assert_eq!(ledger.counterparties()[0].patterns.len(), 2);
        assert_eq!(ledger.transaction(5).unwrap().category.as_deref(), Some("food"));
    }

    #[tokio::test]
    async fn test_add_counterparty_pattern_rejects_invalid_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = sample_ledger(&dir);

        let form = CounterPartyPatternForm::default();
        assert!(matches!(
            ledger.add_counterparty_pattern(&form).await,
            Err(CoreError::ValidationError { .. })
        ));
        assert!(ledger.counterparties().is_empty());
    }

    #[tokio::test]
    async fn test_import_assigns_ids_and_auto_categorises() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = sample_data();
        data.counterparties.push(CounterParty {
            name: "PureGym".to_string(),
            auto_categorise: Some("gym".to_string()),
            patterns: vec!["PUREGYM".to_string()],
        });
        let mut ledger = Ledger::with_data(dir.path().join("ledger.json"), data);

        let imported = vec![
            ImportedTransaction {
                date: date(2024, 2, 3),
                description: "PUREGYM LTD".to_string(),
                extra: Some("Membership".to_string()),
                amount: Decimal::new(-2000, 2),
                balance: None,
                counterparty: None,
                source: "generic-csv".to_string(),
            },
            ImportedTransaction {
                date: date(2024, 2, 4),
                description: "UNKNOWN".to_string(),
                extra: None,
                amount: Decimal::new(100, 2),
                balance: Some(Decimal::new(5000, 2)),
                counterparty: None,
                source: "generic-csv".to_string(),
            },
        ];

        assert_eq!(ledger.import(imported).await.unwrap(), 2);
        let gym = ledger.transaction(6).unwrap();
        assert_eq!(gym.category.as_deref(), Some("gym"));
        assert_eq!(gym.counterparty.as_deref(), Some("PureGym"));
        assert_eq!(ledger.transaction(7).unwrap().category, None);
        assert_eq!(ledger.summary().total_transactions, 7);
    }

    #[test]
    fn test_summary() {
        let dir = tempfile::tempdir().unwrap();
        let summary = sample_ledger(&dir).summary();
        assert_eq!(summary.total_transactions, 5);
        assert_eq!(summary.uncategorised, 3);
        assert_eq!(summary.period_start.as_deref(), Some("2023-12-31"));
        assert_eq!(summary.period_end.as_deref(), Some("2024-02-01"));
    }
}
