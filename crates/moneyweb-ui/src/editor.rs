//! Inline category editor
//!
//! A click on a category cell mounts a selection control pre-selected to the
//! row's category. When the control's dropdown closes, an unchanged value
//! cancels the edit and a changed value submits the shared categorise form.

use crate::dom;
use crate::error::{EditorError, EditorResult};
use crate::selector::{ChosenValue, SelectOption, SelectorModel};

/// The clicked category cell
pub trait CategoryCell {
    type Control;

    /// Primary key of the enclosing row
    fn row_pk(&self) -> Option<String>;

    /// Category id rendered on the cell's static element
    fn category_id(&self) -> Option<String>;

    /// Replace the cell's dynamic content with the control
    fn replace_dynamic(&mut self, control: &Self::Control) -> EditorResult<()>;

    fn set_changing(&mut self, changing: bool) -> EditorResult<()>;
}

/// Creates and drives selection controls
pub trait SelectorActivator {
    type Control;

    /// Options of the page's template select
    fn template_options(&self) -> EditorResult<Vec<SelectOption>>;

    /// Clone the template select with the model's selection applied
    fn instantiate(&mut self, model: &SelectorModel) -> EditorResult<Self::Control>;

    /// Turn the select into a selection control
    fn activate(&mut self, control: &Self::Control) -> EditorResult<()>;

    /// Call `handler` every time the control's dropdown closes
    fn on_close(&mut self, control: &Self::Control, handler: Box<dyn FnMut(ChosenValue)>) -> EditorResult<()>;

    /// Open the dropdown
    fn open(&mut self, control: &Self::Control) -> EditorResult<()>;
}

/// The shared hidden categorise form
pub trait FormSubmitter {
    fn set_field(&mut self, name: &str, value: &str) -> EditorResult<()>;

    fn submit(&mut self) -> EditorResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Editing,
    /// The form was submitted; the page navigates away
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Value unchanged, nothing sent
    Cancelled,
    Submitted,
    /// Close arrived outside of an edit
    Ignored,
}

/// Edit session of one category cell
#[derive(Debug)]
pub struct CategoryEditor<C> {
    cell: C,
    pk: String,
    original: String,
    state: EditorState,
}

impl<C: CategoryCell> CategoryEditor<C> {
    /// Mount and activate a control in the cell; the dropdown is not opened yet
    pub fn open<A>(mut cell: C, activator: &mut A) -> EditorResult<(Self, C::Control)>
    where
        A: SelectorActivator<Control = C::Control>,
    {
        let pk = cell
            .row_pk()
            .ok_or(EditorError::MissingAttribute { name: dom::PK_ATTR })?;
        let original = cell
            .category_id()
            .ok_or(EditorError::MissingAttribute { name: dom::CATEGORY_ATTR })?;

        let model = SelectorModel::with_selected(activator.template_options()?, &original);
        let control = activator.instantiate(&model)?;
        cell.replace_dynamic(&control)?;
        activator.activate(&control)?;
        cell.set_changing(true)?;

        let editor = Self { cell, pk, original, state: EditorState::Editing };
        Ok((editor, control))
    }

    pub fn pk(&self) -> &str {
        &self.pk
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Handle the dropdown closing with `chosen`
    pub fn close<F: FormSubmitter>(&mut self, chosen: &str, form: &mut F) -> EditorResult<CloseOutcome> {
        if self.state != EditorState::Editing {
            return Ok(CloseOutcome::Ignored);
        }

        if chosen == self.original {
            self.cell.set_changing(false)?;
            self.state = EditorState::Idle;
            return Ok(CloseOutcome::Cancelled);
        }

        form.set_field(dom::TRANSACTION_FIELD, &self.pk)?;
        form.set_field(dom::CATEGORY_FIELD, chosen)?;
        form.submit()?;
        self.state = EditorState::Submitting;
        Ok(CloseOutcome::Submitted)
    }
}

/// Handle a click on a category cell: mount the editor, listen for the
/// dropdown closing and open it
pub fn start_editing<C, A, F>(cell: C, activator: &mut A, mut form: F) -> EditorResult<()>
where
    C: CategoryCell + 'static,
    A: SelectorActivator<Control = C::Control>,
    F: FormSubmitter + 'static,
{
    let (mut editor, control) = CategoryEditor::open(cell, activator)?;

    activator.on_close(
        &control,
        Box::new(move |chosen: ChosenValue| {
            if let Err(e) = editor.close(chosen.resolve(), &mut form) {
                log::warn!("Category edit of row {} failed: {}", editor.pk(), e);
            }
        }),
    )?;

    activator.open(&control)
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct FakeControl {
        id: usize,
        model: SelectorModel,
    }

    #[derive(Debug, Default)]
    struct CellLog {
        category_id: Option<String>,
        mounted: Vec<FakeControl>,
        changing: bool,
    }

    #[derive(Debug)]
    struct FakeCell {
        pk: Option<String>,
        log: Rc<RefCell<CellLog>>,
    }

    impl FakeCell {
        fn new(pk: &str, category: &str) -> (Self, Rc<RefCell<CellLog>>) {
            let log = Rc::new(RefCell::new(CellLog {
                category_id: Some(category.to_string()),
                ..CellLog::default()
            }));
            (Self { pk: Some(pk.to_string()), log: Rc::clone(&log) }, log)
        }
    }

    impl CategoryCell for FakeCell {
        type Control = FakeControl;

        fn row_pk(&self) -> Option<String> {
            self.pk.clone()
        }

        fn category_id(&self) -> Option<String> {
            self.log.borrow().category_id.clone()
        }

        fn replace_dynamic(&mut self, control: &FakeControl) -> EditorResult<()> {
            self.log.borrow_mut().mounted = vec![control.clone()];
            Ok(())
        }

        fn set_changing(&mut self, changing: bool) -> EditorResult<()> {
            self.log.borrow_mut().changing = changing;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeActivator {
        options: Vec<SelectOption>,
        created: usize,
        activated: Vec<usize>,
        opened: Vec<usize>,
        handlers: Vec<(usize, Box<dyn FnMut(ChosenValue)>)>,
    }

    impl FakeActivator {
        fn with_categories(ids: &[&str]) -> Self {
            let mut options = vec![SelectOption::new("", "---------")];
            options.extend(ids.iter().map(|id| SelectOption::new(id, id)));
            Self { options, ..Self::default() }
        }

        fn close(&mut self, control: usize, item: &str) {
            let chosen = ChosenValue { item: Some(item.to_string()), typed: String::new() };
            for (id, handler) in self.handlers.iter_mut() {
                if *id == control {
                    handler(chosen.clone());
                }
            }
        }
    }

    impl SelectorActivator for FakeActivator {
        type Control = FakeControl;

        fn template_options(&self) -> EditorResult<Vec<SelectOption>> {
            if self.options.is_empty() {
                return Err(EditorError::missing_element(dom::TEMPLATE_SELECT));
            }
            Ok(self.options.clone())
        }

        fn instantiate(&mut self, model: &SelectorModel) -> EditorResult<FakeControl> {
            self.created += 1;
            Ok(FakeControl { id: self.created, model: model.clone() })
        }

        fn activate(&mut self, control: &FakeControl) -> EditorResult<()> {
            self.activated.push(control.id);
            Ok(())
        }

        fn on_close(&mut self, control: &FakeControl, handler: Box<dyn FnMut(ChosenValue)>) -> EditorResult<()> {
            self.handlers.push((control.id, handler));
            Ok(())
        }

        fn open(&mut self, control: &FakeControl) -> EditorResult<()> {
            self.opened.push(control.id);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct FormLog {
        fields: BTreeMap<String, String>,
        submits: usize,
    }

    #[derive(Clone, Default)]
    struct FakeForm(Rc<RefCell<FormLog>>);

    impl FormSubmitter for FakeForm {
        fn set_field(&mut self, name: &str, value: &str) -> EditorResult<()> {
            self.0.borrow_mut().fields.insert(name.to_string(), value.to_string());
            Ok(())
        }

        fn submit(&mut self) -> EditorResult<()> {
            self.0.borrow_mut().submits += 1;
            Ok(())
        }
    }

    #[test]
    fn test_click_opens_preselected_selector() {
        let (cell, log) = FakeCell::new("17", "food");
        let mut activator = FakeActivator::with_categories(&["bills", "food"]);

        start_editing(cell, &mut activator, FakeForm::default()).unwrap();

        let log = log.borrow();
        assert_eq!(log.mounted.len(), 1);
        assert_eq!(log.mounted[0].model.selected(), Some("food"));
        assert!(log.changing);
        assert_eq!(activator.activated, vec![1]);
        assert_eq!(activator.opened, vec![1]);
    }

    #[test]
    fn test_close_unchanged_cancels() {
        let (cell, log) = FakeCell::new("17", "food");
        let mut activator = FakeActivator::with_categories(&["bills", "food"]);
        let form = FakeForm::default();

        start_editing(cell, &mut activator, form.clone()).unwrap();
        activator.close(1, "food");

        assert!(!log.borrow().changing);
        assert_eq!(form.0.borrow().submits, 0);
        assert!(form.0.borrow().fields.is_empty());
    }

    #[test]
    fn test_close_changed_submits_form() {
        let (cell, _log) = FakeCell::new("17", "food");
        let mut activator = FakeActivator::with_categories(&["bills", "food"]);
        let form = FakeForm::default();

        start_editing(cell, &mut activator, form.clone()).unwrap();
        activator.close(1, "bills");

        let form = form.0.borrow();
        assert_eq!(form.fields["transaction"], "17");
        assert_eq!(form.fields["category"], "bills");
        assert_eq!(form.submits, 1);
    }

    #[test]
    fn test_uncategorised_row_to_typed_value() {
        let (cell, _log) = FakeCell::new("3", "");
        let mut activator = FakeActivator::with_categories(&["bills"]);
        let mut form = FakeForm::default();

        let (mut editor, control) = CategoryEditor::open(cell, &mut activator).unwrap();
        assert_eq!(control.model.selected(), Some(""));

        let chosen = ChosenValue { item: None, typed: "gym".to_string() };
        assert_eq!(editor.close(chosen.resolve(), &mut form).unwrap(), CloseOutcome::Submitted);
        assert_eq!(form.0.borrow().fields["category"], "gym");
    }

    #[test]
    fn test_state_machine() {
        let (cell, _log) = FakeCell::new("5", "food");
        let mut activator = FakeActivator::with_categories(&["food"]);
        let mut form = FakeForm::default();

        let (mut editor, _control) = CategoryEditor::open(cell, &mut activator).unwrap();
        assert_eq!(editor.state(), EditorState::Editing);
        assert_eq!(editor.close("food", &mut form).unwrap(), CloseOutcome::Cancelled);
        assert_eq!(editor.state(), EditorState::Idle);
        assert_eq!(editor.close("bills", &mut form).unwrap(), CloseOutcome::Ignored);
        assert_eq!(form.0.borrow().submits, 0);

        let (cell, _log) = FakeCell::new("5", "food");
        let (mut editor, _control) = CategoryEditor::open(cell, &mut activator).unwrap();
        assert_eq!(editor.close("bills", &mut form).unwrap(), CloseOutcome::Submitted);
        assert_eq!(editor.state(), EditorState::Submitting);
        assert_eq!(editor.close("food", &mut form).unwrap(), CloseOutcome::Ignored);
        assert_eq!(form.0.borrow().submits, 1);
    }

    #[test]
    fn test_second_row_leaves_first_untouched() {
        let (row_a, log_a) = FakeCell::new("1", "food");
        let (row_b, log_b) = FakeCell::new("2", "bills");
        let mut activator = FakeActivator::with_categories(&["bills", "food"]);
        let form = FakeForm::default();

        start_editing(row_a, &mut activator, form.clone()).unwrap();
        start_editing(row_b, &mut activator, form.clone()).unwrap();
        activator.close(2, "food");

        assert_eq!(log_a.borrow().category_id.as_deref(), Some("food"));
        assert!(log_a.borrow().changing);
        assert_eq!(log_b.borrow().mounted[0].model.selected(), Some("bills"));

        let form = form.0.borrow();
        assert_eq!(form.fields["transaction"], "2");
        assert_eq!(form.fields["category"], "food");
        assert_eq!(form.submits, 1);
    }

    #[test]
    fn test_missing_attributes_are_errors() {
        let (mut cell, log) = FakeCell::new("1", "food");
        cell.pk = None;
        let mut activator = FakeActivator::with_categories(&["food"]);

        let err = start_editing(cell, &mut activator, FakeForm::default()).unwrap_err();
        assert_eq!(err, EditorError::MissingAttribute { name: "data-pk" });
        assert!(log.borrow().mounted.is_empty());
        assert!(activator.opened.is_empty());

        let (cell, log) = FakeCell::new("1", "food");
        log.borrow_mut().category_id = None;
        let err = CategoryEditor::open(cell, &mut activator).unwrap_err();
        assert_eq!(err, EditorError::MissingAttribute { name: "data-category-id" });
    }

    #[test]
    fn test_missing_template() {
        let (cell, log) = FakeCell::new("1", "food");
        let mut activator = FakeActivator::default();

        assert!(matches!(
            start_editing(cell, &mut activator, FakeForm::default()),
            Err(EditorError::MissingElement { .. })
        ));
        assert!(!log.borrow().changing);
    }
}
