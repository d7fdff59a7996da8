//! Counterparty pattern form

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{compile_pattern, Category};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_PATTERN_LENGTH: usize = 200;

/// Field name to error message
pub type FormErrors = BTreeMap<&'static str, String>;

/// Submitted form for creating a counterparty pattern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterPartyPatternForm {
    /// Counterparty name
    #[serde(default)]
    pub counterparty: String,
    /// Category id; any value is accepted, empty means none
    #[serde(default)]
    pub auto_categorise: String,
    #[serde(default)]
    pub pattern: String,
}

impl CounterPartyPatternForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();

        let name = self.counterparty.trim();
        if name.is_empty() {
            errors.insert("counterparty", "This field is required.".to_string());
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.insert(
                "counterparty",
                format!("Ensure this value has at most {} characters.", MAX_NAME_LENGTH),
            );
        }

        let pattern = self.pattern.trim();
        if pattern.is_empty() {
            errors.insert("pattern", "This field is required.".to_string());
        } else if pattern.chars().count() > MAX_PATTERN_LENGTH {
            errors.insert(
                "pattern",
                format!("Ensure this value has at most {} characters.", MAX_PATTERN_LENGTH),
            );
        } else if let Err(e) = compile_pattern(pattern) {
            errors.insert("pattern", format!("Invalid pattern: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Category to auto-apply, if any
    pub fn auto_category(&self) -> Option<&str> {
        Some(self.auto_categorise.trim()).filter(|s| !s.is_empty())
    }
}

/// Choices offered for `auto_categorise`: every category id
pub fn category_choices(categories: &[Category]) -> Vec<(String, String)> {
    categories.iter().map(|c| (c.id.clone(), c.id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, category: &str, pattern: &str) -> CounterPartyPatternForm {
        CounterPartyPatternForm {
            counterparty: name.to_string(),
            auto_categorise: category.to_string(),
            pattern: pattern.to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let f = form("Tesco", "groceries", "^TESCO");
        assert!(f.validate().is_ok());
        assert_eq!(f.auto_category(), Some("groceries"));
    }

    #[test]
    fn test_required_fields() {
        let errors = form(" ", "", "").validate().unwrap_err();
        assert!(errors.contains_key("counterparty"));
        assert!(errors.contains_key("pattern"));
        assert!(!errors.contains_key("auto_categorise"));
    }

    #[test]
    fn test_length_limits() {
        let errors = form(&"x".repeat(101), "", &"y".repeat(201)).validate().unwrap_err();
        assert!(errors["counterparty"].contains("100"));
        assert!(errors["pattern"].contains("200"));
        assert!(form(&"x".repeat(100), "", &"y".repeat(200)).validate().is_ok());
    }

    #[test]
    fn test_invalid_regex() {
        let errors = form("Tesco", "", "TESCO(").validate().unwrap_err();
        assert!(errors["pattern"].starts_with("Invalid pattern"));
    }

    #[test]
    fn test_lenient_category_choice() {
        let f = form("Gym", "not-a-known-category", "PUREGYM");
        assert!(f.validate().is_ok());
        assert_eq!(form("Gym", "  ", "PUREGYM").auto_category(), None);
    }

    #[test]
    fn test_category_choices() {
        let choices = category_choices(&[Category::new("bills"), Category::new("food")]);
        assert_eq!(choices, vec![
            ("bills".to_string(), "bills".to_string()),
            ("food".to_string(), "food".to_string()),
        ]);
    }
}
