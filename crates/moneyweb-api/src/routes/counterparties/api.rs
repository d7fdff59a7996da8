//! Counterparty endpoints
//!
//! Endpoints:
//! - counterparty_store: Create or extend a counterparty (form post)
//! - htmx_counterparty_preview: Transactions matching a pattern (HTML fragment)

use axum::extract::{Form, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use moneyweb_core::CounterPartyPatternForm;
use serde::Deserialize;

use super::page::{render_counterparty_form, render_preview};
use crate::{ApiResult, AppState};

/// Validate and store a counterparty pattern; invalid forms are shown again
pub async fn counterparty_store(
    state: State<AppState>,
    headers: HeaderMap,
    form: Form<CounterPartyPatternForm>,
) -> ApiResult<Response> {
    if let Err(errors) = form.validate() {
        let ledger = state.ledger.read().await;
        let content = render_counterparty_form(&form, &errors, ledger.categories());
        return Ok(Html(crate::page_response(&headers, "Counterparties", "/counterparties/create", &content)).into_response());
    }

    let matched = state.ledger.write().await.add_counterparty_pattern(&form).await?;
    log::info!("Stored pattern '{}' for {}, {} transactions matched", form.pattern, form.counterparty, matched);

    Ok(Redirect::to("/transactions").into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub pattern: String,
}

/// HTMX: transactions the pattern would match
pub async fn htmx_counterparty_preview(
    state: State<AppState>,
    query: Query<PreviewQuery>,
) -> Html<String> {
    let pattern = query.pattern.trim();
    if pattern.is_empty() {
        return Html("<p class='text-muted'>Enter a pattern to preview matching transactions.</p>".to_string());
    }

    let ledger = state.ledger.read().await;
    Html(render_preview(ledger.preview_pattern(pattern), &state.config.currency))
}
