//! Transactions API endpoints
//!
//! Endpoints:
//! - api_transactions: Month transactions (JSON)
//! - api_in_out_data: Incoming/outgoing chart data (JSON)
//! - categorise_transaction: Categorise form submission (redirect)

use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::Redirect;
use axum::Json;
use chrono::Datelike;
use moneyweb_core::{resolve_month, InOutChart, MonthTransactionsResponse};
use serde::Deserialize;

use super::month_url;
use super::page::MonthQuery;
use crate::{ApiError, ApiResult, AppState};

/// Get one month of transactions (JSON API)
pub async fn api_transactions(
    state: State<AppState>,
    query: Query<MonthQuery>,
) -> ApiResult<Json<MonthTransactionsResponse>> {
    let today = chrono::Local::now().date_naive();
    let (year, month) = resolve_month(query.year, query.month, today);

    let ledger = state.ledger.read().await;
    let transactions = ledger.month_transactions(year, month)?;
    let total_count = transactions.len();

    Ok(Json(MonthTransactionsResponse { year, month, transactions, total_count }))
}

/// Incoming/outgoing totals per category for the chart
pub async fn api_in_out_data(
    state: State<AppState>,
    path: Path<(i32, u32)>,
) -> ApiResult<Json<InOutChart>> {
    let (year, month) = path.0;
    let ledger = state.ledger.read().await;
    Ok(Json(ledger.in_out_data(year, month)?))
}

/// Fields posted by the hidden categorise form
#[derive(Debug, Deserialize)]
pub struct CategoriseForm {
    #[serde(default)]
    pub transaction: String,
    #[serde(default)]
    pub category: String,
}

/// Set a transaction's category and send the browser back to the listing
pub async fn categorise_transaction(
    state: State<AppState>,
    headers: HeaderMap,
    form: Form<CategoriseForm>,
) -> ApiResult<Redirect> {
    let id: u64 = form.transaction.trim().parse().map_err(|_| ApiError::BadRequest {
        message: format!("Invalid transaction: '{}'", form.transaction),
    })?;

    let updated = state.ledger.write().await.categorise(id, &form.category).await?;

    let target = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| month_url(updated.date.year(), updated.date.month()));

    Ok(Redirect::to(&target))
}
