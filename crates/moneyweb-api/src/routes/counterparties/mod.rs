//! Counterparty routes - Pattern form, preview of matching transactions
//!
//! Structure:
//! - api.rs: Form submission and HTMX preview endpoint
//! - page.rs: Form page rendering

pub mod api;
pub mod page;

pub use api::{counterparty_store, htmx_counterparty_preview, PreviewQuery};
pub use page::page_counterparty_create;
