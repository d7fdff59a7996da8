//! Regex line processors

use chrono::NaiveDate;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ImportError;
use crate::types::{FieldValue, Fields, ImportedTransaction};

/// Groups converted with [`parse_currency`]
const AMOUNT_GROUPS: [&str; 2] = ["amount", "balance"];

/// Matches one kind of statement line and converts its named groups
#[derive(Debug, Clone)]
pub struct LineProcessor {
    name: String,
    pattern: Regex,
}

impl LineProcessor {
    pub fn new(name: &str, pattern: &str) -> Result<Self, ImportError> {
        let pattern = Regex::new(pattern).map_err(|e| ImportError::InvalidPattern {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { name: name.to_string(), pattern })
    }

    pub fn from_regex(name: &str, pattern: Regex) -> Self {
        Self { name: name.to_string(), pattern }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lines only match from their first character, as if the pattern began with `^`
    pub fn is_match(&self, line: &str) -> bool {
        self.captures(line).is_some()
    }

    fn captures<'l>(&self, line: &'l str) -> Option<Captures<'l>> {
        self.pattern
            .captures(line)
            .filter(|c| c.get(0).map_or(false, |m| m.start() == 0))
    }

    /// Convert a matching line into fields, layered over `extra_fields`
    ///
    /// Returns `Ok(None)` when the line does not match.
    pub fn process(
        &self,
        line: &str,
        line_number: usize,
        extra_fields: &Fields,
        date_formats: &[String],
    ) -> Result<Option<Fields>, ImportError> {
        let captures = match self.captures(line) {
            Some(c) => c,
            None => return Ok(None),
        };

        let mut fields = extra_fields.clone();
        for group in self.pattern.capture_names().flatten() {
            let raw = match captures.name(group) {
                Some(m) => m.as_str(),
                None => continue,
            };

            let value = if group.starts_with("date") {
                FieldValue::Date(parse_date(raw, date_formats)?)
            } else if AMOUNT_GROUPS.contains(&group) {
                FieldValue::Amount(parse_currency(raw)?)
            } else {
                FieldValue::Text(raw.to_string())
            };

            fields.insert(group.to_string(), value);
        }

        log::debug!("Line {} matched processor '{}'", line_number, self.name);
        Ok(Some(fields))
    }

    /// Process a line straight into a transaction
    pub fn transaction(
        &self,
        line: &str,
        line_number: usize,
        extra_fields: &Fields,
        date_formats: &[String],
    ) -> Result<Option<ImportedTransaction>, ImportError> {
        match self.process(line, line_number, extra_fields, date_formats)? {
            Some(fields) => ImportedTransaction::from_fields(&fields, &self.name, line_number).map(Some),
            None => Ok(None),
        }
    }
}

/// Parse a date trying each format in order
pub fn parse_date(value: &str, formats: &[String]) -> Result<NaiveDate, ImportError> {
    let value = value.trim();
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| ImportError::InvalidDate { value: value.to_string() })
}

/// Parse a currency amount as printed on a statement
///
/// Accepts currency symbols, thousands separators, a leading `-`,
/// accounting parentheses and a trailing `CR`/`DR` marker (`DR` is a debit).
pub fn parse_currency(value: &str) -> Result<Decimal, ImportError> {
    let invalid = || ImportError::InvalidAmount { value: value.to_string() };

    let trimmed = value.trim();
    let (body, debit) = if let Some(body) = strip_suffix_ignore_case(trimmed, "DR") {
        (body.trim_end(), true)
    } else if let Some(body) = strip_suffix_ignore_case(trimmed, "CR") {
        (body.trim_end(), false)
    } else {
        (trimmed, false)
    };

    let (body, parenthesised) = match body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) => (inner, true),
        None => (body, false),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut amount = Decimal::from_str(&cleaned).map_err(|_| invalid())?;
    if parenthesised {
        amount = -amount;
    }
    if debit {
        amount = -amount.abs();
    }
    Ok(amount)
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if s.is_char_boundary(split) && s[split..].eq_ignore_ascii_case(suffix) {
        Some(&s[..split])
    } else {
        None
    }
}
