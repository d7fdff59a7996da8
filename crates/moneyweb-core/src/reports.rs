//! Report structures for API responses

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Category, Direction, Transaction};

/// Label of the bucket for transactions without a category
pub const UNCATEGORISED: &str = "Uncategorised";

/// Stacked incoming/outgoing chart, column per category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InOutChart {
    pub data: Vec<serde_json::Value>,
    pub options: serde_json::Value,
}

/// Sums per category for one direction
#[derive(Debug, Default)]
struct DirectionTotals {
    by_category: HashMap<Option<String>, Decimal>,
    total: Decimal,
}

impl DirectionTotals {
    fn add(&mut self, tx: &Transaction) {
        *self.by_category.entry(tx.category.clone()).or_default() += tx.amount;
        self.total += tx.amount;
    }

    /// Chart row; outgoing sums are negated so both rows are positive
    fn row(&self, label: &str, categories: &[Category], sign: Decimal) -> serde_json::Value {
        let mut row = vec![serde_json::json!(label)];
        let keys = std::iter::once(None).chain(categories.iter().map(|c| Some(c.id.clone())));
        for key in keys {
            let sum = self.by_category.get(&key).copied().unwrap_or_default();
            row.push(serde_json::json!(to_f64(sum * sign)));
        }
        row.push(serde_json::json!(to_f64(self.total * sign)));
        serde_json::Value::Array(row)
    }
}

fn to_f64(value: Decimal) -> f64 {
    if value.is_zero() {
        return 0.0;
    }
    value.to_f64().unwrap_or(0.0)
}

impl InOutChart {
    pub fn build<'a>(transactions: impl IntoIterator<Item = &'a Transaction>, categories: &[Category]) -> Self {
        let mut incoming = DirectionTotals::default();
        let mut outgoing = DirectionTotals::default();

        for tx in transactions {
            match tx.direction() {
                Some(Direction::Incoming) => incoming.add(tx),
                Some(Direction::Outgoing) => outgoing.add(tx),
                None => {}
            }
        }

        let mut header = vec![serde_json::json!("Category"), serde_json::json!(UNCATEGORISED)];
        header.extend(categories.iter().map(|c| serde_json::json!(c.id)));
        header.push(serde_json::json!({ "role": "annotation" }));

        Self {
            data: vec![
                serde_json::Value::Array(header),
                incoming.row(&Direction::Incoming.to_string(), categories, Decimal::ONE),
                outgoing.row(&Direction::Outgoing.to_string(), categories, Decimal::NEGATIVE_ONE),
            ],
            options: serde_json::json!({
                "isStacked": true,
                "legend": { "position": "top" },
                "backgroundColor": "transparent"
            }),
        }
    }
}

/// Transactions for one month, for the JSON API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthTransactionsResponse {
    pub year: i32,
    pub month: u32,
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
}
