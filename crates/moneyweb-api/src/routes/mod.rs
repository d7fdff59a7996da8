//! Route modules for the API server
//!
//! - transactions: month listing page, categorise form, chart data
//! - counterparties: counterparty pattern form and preview
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON, form and HTMX endpoints
//! - page.rs: Page rendering

pub mod counterparties;
pub mod transactions;
