//! Markup contract shared by the server-rendered table and the browser binding

/// Cell that expands a row's extra description
pub const EXPAND_CELL: &str = ".transaction td.expand";
/// Sibling cell holding the description text
pub const DESCRIPTION_CELL: &str = "td.description";
/// Extra description node, hidden until expanded
pub const EXTRA: &str = ".extra";
/// Expand/collapse icon inside the expand cell
pub const ICON: &str = "span.glyphicon";
pub const ICON_COLLAPSED: &str = "glyphicon-collapse-down";
pub const ICON_EXPANDED: &str = "glyphicon-collapse-up";

/// Cell that opens the category editor
pub const CATEGORY_CELL: &str = ".transaction-table td.category";
pub const STATIC: &str = ".static";
pub const DYNAMIC: &str = ".dynamic";
pub const PK_ATTR: &str = "data-pk";
pub const CATEGORY_ATTR: &str = "data-category-id";
/// Class marking a category cell in edit
pub const CHANGING_CLASS: &str = "changing";

pub const CONTAINER: &str = ".transaction-categorise-container";
pub const TEMPLATE_SELECT: &str = ".transaction-categorise-container select[name=category]";
pub const FORM: &str = ".transaction-categorise-container form";
pub const TRANSACTION_FIELD: &str = "transaction";
pub const CATEGORY_FIELD: &str = "category";

/// Page-global function that turns a select into a selection control
pub const INIT_FUNCTION: &str = "initSelectize";
