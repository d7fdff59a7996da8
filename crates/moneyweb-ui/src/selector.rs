//! Selection control model

/// One option of the category select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self { value: value.to_string(), label: label.to_string(), selected: false }
    }
}

/// Options of a freshly instantiated selection control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorModel {
    options: Vec<SelectOption>,
}

impl SelectorModel {
    /// Copy the template options, selecting `current` when it is one of them.
    /// Otherwise the template's own selection is kept.
    pub fn with_selected(mut options: Vec<SelectOption>, current: &str) -> Self {
        if options.iter().any(|o| o.value == current) {
            for option in options.iter_mut() {
                option.selected = option.value == current;
            }
        }
        Self { options }
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.options.iter().find(|o| o.selected).map(|o| o.value.as_str())
    }
}

/// What the control holds when its dropdown closes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChosenValue {
    /// Value of the selected item, if any
    pub item: Option<String>,
    /// Text typed into the control's input
    pub typed: String,
}

impl ChosenValue {
    /// The selected item's value, falling back to the typed text
    pub fn resolve(&self) -> &str {
        match self.item.as_deref() {
            Some(item) if !item.is_empty() => item,
            _ => &self.typed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Vec<SelectOption> {
        let mut blank = SelectOption::new("", "---------");
        blank.selected = true;
        vec![blank, SelectOption::new("bills", "Bills"), SelectOption::new("food", "Food")]
    }

    #[test]
    fn test_preselects_current() {
        let model = SelectorModel::with_selected(template(), "food");
        assert_eq!(model.selected(), Some("food"));
        assert_eq!(model.options().iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn test_unknown_current_keeps_template_selection() {
        let model = SelectorModel::with_selected(template(), "gym");
        assert_eq!(model.selected(), Some(""));
    }

    #[test]
    fn test_chosen_value_prefers_item() {
        let chosen = ChosenValue { item: Some("food".to_string()), typed: "fo".to_string() };
        assert_eq!(chosen.resolve(), "food");

        let typed = ChosenValue { item: Some(String::new()), typed: "gym".to_string() };
        assert_eq!(typed.resolve(), "gym");
        assert_eq!(ChosenValue::default().resolve(), "");
    }
}
