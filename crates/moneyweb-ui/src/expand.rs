//! Row expansion toggle

use crate::dom;
use crate::error::EditorResult;

/// Icon state of the expand cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandIcon {
    Collapsed,
    Expanded,
}

impl ExpandIcon {
    pub fn for_visibility(visible: bool) -> Self {
        if visible {
            ExpandIcon::Expanded
        } else {
            ExpandIcon::Collapsed
        }
    }

    /// Class to add
    pub fn class(self) -> &'static str {
        match self {
            ExpandIcon::Collapsed => dom::ICON_COLLAPSED,
            ExpandIcon::Expanded => dom::ICON_EXPANDED,
        }
    }

    /// Class to remove
    pub fn replaced_class(self) -> &'static str {
        match self {
            ExpandIcon::Collapsed => dom::ICON_EXPANDED,
            ExpandIcon::Expanded => dom::ICON_COLLAPSED,
        }
    }
}

/// The clicked expand cell and its row
pub trait ExpandCell {
    /// Flip the extra text's visibility, returning whether it is now visible
    fn toggle_extra(&mut self) -> EditorResult<bool>;

    fn set_icon(&mut self, icon: ExpandIcon) -> EditorResult<()>;
}

/// Handle a click on an expand cell
pub fn toggle_row<C: ExpandCell>(cell: &mut C) -> EditorResult<bool> {
    let visible = cell.toggle_extra()?;
    cell.set_icon(ExpandIcon::for_visibility(visible))?;
    Ok(visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRow {
        extra_visible: bool,
        icon_classes: Vec<&'static str>,
    }

    impl FakeRow {
        fn collapsed() -> Self {
            Self { extra_visible: false, icon_classes: vec!["glyphicon", dom::ICON_COLLAPSED] }
        }
    }

    impl ExpandCell for FakeRow {
        fn toggle_extra(&mut self) -> EditorResult<bool> {
            self.extra_visible = !self.extra_visible;
            Ok(self.extra_visible)
        }

        fn set_icon(&mut self, icon: ExpandIcon) -> EditorResult<()> {
            self.icon_classes.retain(|c| *c != icon.replaced_class());
            if !self.icon_classes.contains(&icon.class()) {
                self.icon_classes.push(icon.class());
            }
            Ok(())
        }
    }

    #[test]
    fn test_click_expands() {
        let mut row = FakeRow::collapsed();
        assert!(toggle_row(&mut row).unwrap());
        assert!(row.icon_classes.contains(&dom::ICON_EXPANDED));
        assert!(!row.icon_classes.contains(&dom::ICON_COLLAPSED));
    }

    #[test]
    fn test_two_clicks_restore_state() {
        let mut row = FakeRow::collapsed();
        let original = row.icon_classes.clone();

        toggle_row(&mut row).unwrap();
        assert!(!toggle_row(&mut row).unwrap());
        assert!(!row.extra_visible);
        assert_eq!(row.icon_classes, original);
    }

    #[test]
    fn test_icon_classes() {
        assert_eq!(ExpandIcon::for_visibility(true).class(), "glyphicon-collapse-up");
        assert_eq!(ExpandIcon::Collapsed.replaced_class(), "glyphicon-collapse-up");
    }
}
