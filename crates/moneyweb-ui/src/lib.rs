//! Transaction table behaviour
//!
//! Row expansion and the inline category editor. The logic talks to the page
//! through small port traits; the `wasm32` build implements them with web-sys
//! and binds the click handlers when the module starts.

pub mod dom;
pub mod editor;
pub mod error;
pub mod expand;
pub mod selector;

#[cfg(target_arch = "wasm32")]
mod web;

pub use editor::{start_editing, CategoryCell, CategoryEditor, CloseOutcome, EditorState, FormSubmitter, SelectorActivator};
pub use error::{EditorError, EditorResult};
pub use expand::{toggle_row, ExpandCell, ExpandIcon};
pub use selector::{ChosenValue, SelectOption, SelectorModel};
