//! Browser binding

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement, Window};

use crate::dom;
use crate::editor::{start_editing, CategoryCell, FormSubmitter, SelectorActivator};
use crate::error::{EditorError, EditorResult};
use crate::expand::{toggle_row, ExpandCell, ExpandIcon};
use crate::selector::{ChosenValue, SelectOption, SelectorModel};

/// `dropdown_close` listener of the most recently opened editor
struct CloseListener {
    selectize: JsValue,
    closure: Closure<dyn FnMut()>,
}

thread_local! {
    static CLOSE_LISTENER: RefCell<Option<CloseListener>> = RefCell::new(None);
}

/// Keep `listener` alive, unbinding and dropping the one it replaces
fn retain_close_listener(listener: CloseListener) {
    let previous = CLOSE_LISTENER.with(|slot| slot.borrow_mut().replace(listener));
    if let Some(previous) = previous {
        let args = Array::of2(&JsValue::from_str("dropdown_close"), previous.closure.as_ref());
        if let Err(e) = call_method(&previous.selectize, "off", &args) {
            warn(&e);
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    bind_clicks(&document, dom::EXPAND_CELL, |cell, event, _| {
        event.prevent_default();
        event.stop_propagation();
        toggle_row(&mut DomExpandCell { cell: cell.clone() }).map(|_| ())
    })?;

    bind_clicks(&document, dom::CATEGORY_CELL, |cell, _, window| {
        let mut activator = DomSelectorActivator::new(window)?;
        let form = DomForm::find(&activator.document)?;
        start_editing(DomCategoryCell::new(cell.clone())?, &mut activator, form)
    })?;

    Ok(())
}

fn bind_clicks<F>(document: &Document, selector: &str, handler: F) -> Result<(), JsValue>
where
    F: Fn(&Element, &Event, &Window) -> EditorResult<()> + 'static,
{
    let handler = Rc::new(handler);
    let cells = document.query_selector_all(selector)?;

    for i in 0..cells.length() {
        let Some(cell) = cells.get(i).and_then(|node| node.dyn_into::<Element>().ok()) else {
            continue;
        };

        let handler = Rc::clone(&handler);
        let target = cell.clone();
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            if let Err(e) = handler(&target, &event, &window) {
                warn(&e);
            }
        }) as Box<dyn FnMut(_)>);

        cell.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

fn warn(error: &EditorError) {
    web_sys::console::warn_1(&JsValue::from_str(&error.to_string()));
}

fn js_error(value: JsValue) -> EditorError {
    EditorError::Script {
        message: value.as_string().unwrap_or_else(|| format!("{:?}", value)),
    }
}

fn query(root: &Element, selector: &str) -> EditorResult<Element> {
    root.query_selector(selector)
        .map_err(js_error)?
        .ok_or_else(|| EditorError::missing_element(selector))
}

fn query_document(document: &Document, selector: &str) -> EditorResult<Element> {
    document
        .query_selector(selector)
        .map_err(js_error)?
        .ok_or_else(|| EditorError::missing_element(selector))
}

/// Call a method looked up by name on a JS object
fn call_method(target: &JsValue, name: &str, args: &Array) -> EditorResult<JsValue> {
    let method = Reflect::get(target, &JsValue::from_str(name))
        .map_err(js_error)?
        .dyn_into::<Function>()
        .map_err(|_| EditorError::Script { message: format!("{} is not a function", name) })?;
    method.apply(target, args).map_err(js_error)
}

struct DomExpandCell {
    cell: Element,
}

impl DomExpandCell {
    fn is_hidden(element: &HtmlElement) -> EditorResult<bool> {
        let window = web_sys::window().ok_or_else(|| EditorError::missing_element("window"))?;
        let display = window
            .get_computed_style(element)
            .map_err(js_error)?
            .map(|style| style.get_property_value("display").unwrap_or_default())
            .unwrap_or_default();
        Ok(display == "none")
    }
}

impl ExpandCell for DomExpandCell {
    fn toggle_extra(&mut self) -> EditorResult<bool> {
        let row = self
            .cell
            .parent_element()
            .ok_or_else(|| EditorError::missing_element("tr"))?;
        let selector = format!(":scope > {} {}", dom::DESCRIPTION_CELL, dom::EXTRA);
        let Some(extra) = row.query_selector(&selector).map_err(js_error)? else {
            return Ok(false);
        };
        let extra = extra
            .dyn_into::<HtmlElement>()
            .map_err(|_| EditorError::missing_element(&selector))?;

        let style = extra.style();
        if Self::is_hidden(&extra)? {
            style.remove_property("display").map_err(js_error)?;
            if Self::is_hidden(&extra)? {
                style.set_property("display", "block").map_err(js_error)?;
            }
            Ok(true)
        } else {
            style.set_property("display", "none").map_err(js_error)?;
            Ok(false)
        }
    }

    fn set_icon(&mut self, icon: ExpandIcon) -> EditorResult<()> {
        let classes = query(&self.cell, dom::ICON)?.class_list();
        classes.remove_1(icon.replaced_class()).map_err(js_error)?;
        classes.add_1(icon.class()).map_err(js_error)
    }
}

struct DomCategoryCell {
    cell: Element,
    static_element: Element,
    dynamic: Element,
}

impl DomCategoryCell {
    fn new(cell: Element) -> EditorResult<Self> {
        let static_element = query(&cell, dom::STATIC)?;
        let dynamic = query(&cell, dom::DYNAMIC)?;
        Ok(Self { cell, static_element, dynamic })
    }
}

impl CategoryCell for DomCategoryCell {
    type Control = HtmlSelectElement;

    fn row_pk(&self) -> Option<String> {
        self.cell.closest("tr").ok().flatten()?.get_attribute(dom::PK_ATTR)
    }

    fn category_id(&self) -> Option<String> {
        self.static_element.get_attribute(dom::CATEGORY_ATTR)
    }

    fn replace_dynamic(&mut self, control: &HtmlSelectElement) -> EditorResult<()> {
        self.dynamic.set_inner_html("");
        self.dynamic.append_child(control).map_err(js_error)?;
        Ok(())
    }

    fn set_changing(&mut self, changing: bool) -> EditorResult<()> {
        let classes = self.cell.class_list();
        if changing {
            classes.add_1(dom::CHANGING_CLASS)
        } else {
            classes.remove_1(dom::CHANGING_CLASS)
        }
        .map_err(js_error)
    }
}

/// Selectize controls activated through the page's `initSelectize`
struct DomSelectorActivator {
    window: Window,
    document: Document,
}

impl DomSelectorActivator {
    fn new(window: &Window) -> EditorResult<Self> {
        let document = window
            .document()
            .ok_or_else(|| EditorError::missing_element("document"))?;
        Ok(Self { window: window.clone(), document })
    }

    fn template(&self) -> EditorResult<HtmlSelectElement> {
        query_document(&self.document, dom::TEMPLATE_SELECT)?
            .dyn_into::<HtmlSelectElement>()
            .map_err(|_| EditorError::missing_element(dom::TEMPLATE_SELECT))
    }

    fn selectize(control: &HtmlSelectElement) -> EditorResult<JsValue> {
        let instance = Reflect::get(control, &JsValue::from_str("selectize")).map_err(js_error)?;
        if instance.is_undefined() {
            return Err(EditorError::Script { message: "select was not activated".to_string() });
        }
        Ok(instance)
    }

    fn chosen(selectize: &JsValue) -> EditorResult<ChosenValue> {
        let item = call_method(selectize, "getValue", &Array::new())?.as_string();
        let input = Reflect::get(selectize, &JsValue::from_str("$control_input")).map_err(js_error)?;
        let typed = call_method(&input, "val", &Array::new())?.as_string().unwrap_or_default();
        Ok(ChosenValue { item, typed })
    }

    fn options(select: &HtmlSelectElement) -> Vec<HtmlOptionElement> {
        (0..select.length())
            .filter_map(|i| select.item(i))
            .filter_map(|element| element.dyn_into::<HtmlOptionElement>().ok())
            .collect()
    }
}

impl SelectorActivator for DomSelectorActivator {
    type Control = HtmlSelectElement;

    fn template_options(&self) -> EditorResult<Vec<SelectOption>> {
        Ok(Self::options(&self.template()?)
            .iter()
            .map(|option| SelectOption {
                value: option.value(),
                label: option.text(),
                selected: option.selected(),
            })
            .collect())
    }

    fn instantiate(&mut self, model: &SelectorModel) -> EditorResult<HtmlSelectElement> {
        let control = self
            .template()?
            .clone_node_with_deep(true)
            .map_err(js_error)?
            .dyn_into::<HtmlSelectElement>()
            .map_err(|_| EditorError::missing_element(dom::TEMPLATE_SELECT))?;

        for (option, wanted) in Self::options(&control).iter().zip(model.options()) {
            option.set_selected(wanted.selected);
        }
        Ok(control)
    }

    fn activate(&mut self, control: &HtmlSelectElement) -> EditorResult<()> {
        call_method(&self.window, dom::INIT_FUNCTION, &Array::of1(control))?;
        Ok(())
    }

    fn on_close(&mut self, control: &HtmlSelectElement, mut handler: Box<dyn FnMut(ChosenValue)>) -> EditorResult<()> {
        let selectize = Self::selectize(control)?;
        let instance = selectize.clone();
        let closure = Closure::wrap(Box::new(move || match Self::chosen(&instance) {
            Ok(chosen) => handler(chosen),
            Err(e) => warn(&e),
        }) as Box<dyn FnMut()>);

        let args = Array::of2(&JsValue::from_str("dropdown_close"), closure.as_ref());
        call_method(&selectize, "on", &args)?;
        retain_close_listener(CloseListener { selectize, closure });
        Ok(())
    }

    fn open(&mut self, control: &HtmlSelectElement) -> EditorResult<()> {
        call_method(&Self::selectize(control)?, "open", &Array::new())?;
        Ok(())
    }
}

/// The hidden categorise form
struct DomForm {
    form: HtmlFormElement,
}

impl DomForm {
    fn find(document: &Document) -> EditorResult<Self> {
        let form = query_document(document, dom::FORM)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| EditorError::missing_element(dom::FORM))?;
        Ok(Self { form })
    }
}

impl FormSubmitter for DomForm {
    fn set_field(&mut self, name: &str, value: &str) -> EditorResult<()> {
        let selector = format!("[name={}]", name);
        let field = query(&self.form, &selector)?;
        if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = field.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else {
            return Err(EditorError::missing_element(&selector));
        }
        Ok(())
    }

    fn submit(&mut self) -> EditorResult<()> {
        self.form.submit().map_err(js_error)
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FIXTURE: &str = r#"<style>.transaction .extra { display: none; }</style>
<table class='table transaction-table'><tbody>
<tr class='transaction' data-pk='7'>
    <td class='expand'><span class='glyphicon glyphicon-collapse-down'></span></td>
    <td class='description'>TESCO STORES<div class='extra'>Card ending 1234</div></td>
    <td class='category'><span class='static' data-category-id='C1'>One</span><span class='dynamic'></span></td>
</tr>
</tbody></table>
<div class='transaction-categorise-container' style='display: none'>
    <select name='category'><option value=''>---------</option><option value='C1'>One</option><option value='C2'>Two</option></select>
    <form method='post' action='/transactions/categorise'>
        <input type='hidden' name='transaction'>
        <input type='hidden' name='category'>
    </form>
</div>"#;

    /// Stand-in for selectize that records its listener instead of rendering a dropdown
    const FAKE_INIT_SELECTIZE: &str = "select.selectize = {
        value: select.value,
        handler: null,
        removed: false,
        opened: false,
        getValue: function () { return this.value; },
        $control_input: { val: function () { return ''; } },
        on: function (event, handler) { this.handler = handler; },
        off: function (event, handler) { if (this.handler === handler) { this.removed = true; } },
        open: function () { this.opened = true; }
    };";

    fn fixture() -> (Window, Document) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        document.body().unwrap().set_inner_html(FIXTURE);
        let init = Function::new_with_args("select", FAKE_INIT_SELECTIZE);
        Reflect::set(&window, &JsValue::from_str(dom::INIT_FUNCTION), &init).unwrap();
        (window, document)
    }

    fn element(document: &Document, selector: &str) -> Element {
        document.query_selector(selector).unwrap().unwrap()
    }

    fn prop(target: &JsValue, name: &str) -> JsValue {
        Reflect::get(target, &JsValue::from_str(name)).unwrap()
    }

    fn category_cell(document: &Document) -> DomCategoryCell {
        DomCategoryCell::new(element(document, dom::CATEGORY_CELL)).unwrap()
    }

    fn mounted_selectize(document: &Document) -> JsValue {
        let select = element(document, ".transaction td.category .dynamic select");
        prop(&select, "selectize")
    }

    #[wasm_bindgen_test]
    fn expand_twice_restores_visibility_and_icon() {
        let (_, document) = fixture();
        let cell = element(&document, dom::EXPAND_CELL);
        let icon = cell.query_selector(dom::ICON).unwrap().unwrap();
        let extra = element(&document, ".transaction .extra").dyn_into::<HtmlElement>().unwrap();
        let mut expand = DomExpandCell { cell };

        assert!(DomExpandCell::is_hidden(&extra).unwrap());

        assert!(toggle_row(&mut expand).unwrap());
        assert!(!DomExpandCell::is_hidden(&extra).unwrap());
        assert!(icon.class_list().contains(dom::ICON_EXPANDED));
        assert!(!icon.class_list().contains(dom::ICON_COLLAPSED));

        assert!(!toggle_row(&mut expand).unwrap());
        assert!(DomExpandCell::is_hidden(&extra).unwrap());
        assert!(icon.class_list().contains(dom::ICON_COLLAPSED));
        assert!(!icon.class_list().contains(dom::ICON_EXPANDED));
    }

    #[wasm_bindgen_test]
    fn instantiate_preselects_row_category() {
        let (window, _) = fixture();
        let mut activator = DomSelectorActivator::new(&window).unwrap();

        let options = activator.template_options().unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[1].label, "One");

        let control = activator.instantiate(&SelectorModel::with_selected(options, "C1")).unwrap();
        assert_eq!(control.value(), "C1");
        assert_eq!(activator.template().unwrap().value(), "");
    }

    #[wasm_bindgen_test]
    fn set_field_writes_hidden_inputs() {
        let (_, document) = fixture();
        let mut form = DomForm::find(&document).unwrap();

        form.set_field(dom::TRANSACTION_FIELD, "7").unwrap();
        form.set_field(dom::CATEGORY_FIELD, "C2").unwrap();

        let value = |name: &str| {
            element(&document, &format!("{} [name={}]", dom::FORM, name))
                .dyn_into::<HtmlInputElement>()
                .unwrap()
                .value()
        };
        assert_eq!(value(dom::TRANSACTION_FIELD), "7");
        assert_eq!(value(dom::CATEGORY_FIELD), "C2");
        assert!(form.set_field("missing", "x").is_err());
    }

    #[wasm_bindgen_test]
    fn chosen_falls_back_to_typed_text() {
        let selectize = js_sys::Object::new();
        let input = js_sys::Object::new();
        Reflect::set(&input, &JsValue::from_str("val"), &Function::new_no_args("return 'gym';")).unwrap();
        Reflect::set(&selectize, &JsValue::from_str("getValue"), &Function::new_no_args("return '';")).unwrap();
        Reflect::set(&selectize, &JsValue::from_str("$control_input"), &input).unwrap();

        let chosen = DomSelectorActivator::chosen(&selectize).unwrap();
        assert_eq!(chosen.item.as_deref(), Some(""));
        assert_eq!(chosen.resolve(), "gym");
    }

    #[wasm_bindgen_test]
    fn unchanged_close_ends_edit_without_submitting() {
        let (window, document) = fixture();
        let mut activator = DomSelectorActivator::new(&window).unwrap();
        let form = DomForm::find(&document).unwrap();

        start_editing(category_cell(&document), &mut activator, form).unwrap();
        let cell = element(&document, dom::CATEGORY_CELL);
        assert!(cell.class_list().contains(dom::CHANGING_CLASS));

        let selectize = mounted_selectize(&document);
        assert_eq!(prop(&selectize, "opened"), JsValue::TRUE);

        let handler = prop(&selectize, "handler").dyn_into::<Function>().unwrap();
        handler.call0(&selectize).unwrap();

        assert!(!cell.class_list().contains(dom::CHANGING_CLASS));
        let transaction = element(&document, &format!("{} [name={}]", dom::FORM, dom::TRANSACTION_FIELD))
            .dyn_into::<HtmlInputElement>()
            .unwrap();
        assert_eq!(transaction.value(), "");
    }

    #[wasm_bindgen_test]
    fn new_edit_unbinds_previous_close_listener() {
        let (window, document) = fixture();
        let mut activator = DomSelectorActivator::new(&window).unwrap();

        start_editing(category_cell(&document), &mut activator, DomForm::find(&document).unwrap()).unwrap();
        let first = mounted_selectize(&document);

        start_editing(category_cell(&document), &mut activator, DomForm::find(&document).unwrap()).unwrap();
        let second = mounted_selectize(&document);

        assert_eq!(prop(&first, "removed"), JsValue::TRUE);
        assert_eq!(prop(&second, "removed"), JsValue::FALSE);
    }
}
