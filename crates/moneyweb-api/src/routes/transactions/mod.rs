//! Transaction routes - Month listing, categorisation, incoming/outgoing chart
//!
//! Structure:
//! - api.rs: JSON API and the categorise form endpoint
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_in_out_data, api_transactions, categorise_transaction, CategoriseForm};
pub use page::{page_transactions, MonthQuery};

/// Listing page URL for a month
pub fn month_url(year: i32, month: u32) -> String {
    format!("/transactions?year={}&month={}", year, month)
}
