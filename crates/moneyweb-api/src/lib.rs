//! HTTP server for the moneyweb pages and JSON API
//!
//! Pages are rendered server side as HTML strings. `routes::transactions`
//! owns the month listing and categorising; `routes::counterparties` owns the
//! pattern form and its live preview.

pub mod error;
pub mod routes;

use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use moneyweb_config::{Config, CurrencyConfig};
use moneyweb_core::{Ledger, LedgerOperations, LedgerSummary};
use moneyweb_ui::dom;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub use error::{ApiError, ApiResult};

/// Shared by every handler; the ledger lock serialises writes
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub config: Config,
}

/// All page, form, JSON and static routes
pub fn create_router(state: AppState) -> Router {
    use routes::counterparties::{counterparty_store, htmx_counterparty_preview, page_counterparty_create};
    use routes::transactions::{api_in_out_data, api_transactions, categorise_transaction, page_transactions};

    let static_dir = ServeDir::new(&state.config.server.static_dir);
    let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]);

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/summary", get(api_summary))
        .route("/api/transactions", get(api_transactions))
        .route("/api/reload", post(api_reload))
        // Pages and forms
        .route("/", get(page_transactions))
        .route("/transactions", get(page_transactions))
        .route("/transactions/categorise", post(categorise_transaction))
        .route("/transactions/in-out/:year/:month", get(api_in_out_data))
        .route("/counterparties/create", get(page_counterparty_create).post(counterparty_store))
        .route("/counterparties/preview", get(htmx_counterparty_preview))
        .nest_service("/static", static_dir)
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Counts and date range of the loaded ledger
async fn api_summary(state: axum::extract::State<AppState>) -> Json<LedgerSummary> {
    let ledger = state.ledger.read().await;
    Json(ledger.summary())
}

/// Re-read the store file, e.g. after an offline import
async fn api_reload(state: axum::extract::State<AppState>) -> Json<serde_json::Value> {
    let mut ledger = state.ledger.write().await;
    match ledger.reload().await {
        Ok(_) => Json(serde_json::json!({ "success": true, "message": "Ledger reloaded" })),
        Err(e) => {
            log::error!("Reload failed: {}", e);
            Json(serde_json::json!({ "success": false, "message": e.to_string() }))
        }
    }
}

/// Page shell with the CDN assets and the table UI bundle
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Moneyweb</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@3.4.1/dist/css/bootstrap.min.css">
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/selectize@0.12.6/dist/css/selectize.bootstrap3.css">
    <script src="https://code.jquery.com/jquery-3.7.1.min.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/selectize@0.12.6/dist/js/standalone/selectize.min.js"></script>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://www.gstatic.com/charts/loader.js"></script>
    <style>
        .transaction .extra {{ display: none; }}
        .transaction td.expand {{ cursor: pointer; }}
        .transaction-table td.category {{ cursor: pointer; min-width: 12em; }}
        .transaction-table td.category.{} .static {{ display: none; }}
        .amount.incoming {{ color: #3c763d; }}
        .amount.outgoing {{ color: #a94442; }}
    </style>
    <script>
        window.{} = function (element) {{
            $(element).selectize({{ create: true, persist: false }});
        }};
    </script>
    <script type="module">
        import init from '/static/pkg/moneyweb_ui.js';
        init();
    </script>
</head>
<body>
    {}
</body>
</html>"#,
        escape_html(title),
        dom::CHANGING_CLASS,
        dom::INIT_FUNCTION,
        content
    )
}

/// Top navigation bar
pub fn nav_bar(current_path: &str) -> String {
    let links = [
        ("/transactions", "Transactions"),
        ("/counterparties/create", "Counterparties"),
    ];

    let mut nav = String::from(
        "<nav class='navbar navbar-default'><div class='container'><div class='navbar-header'><a class='navbar-brand' href='/'>Moneyweb</a></div><ul class='nav navbar-nav'>",
    );

    for (path, label) in &links {
        let is_active = current_path.starts_with(path) || (current_path == "/" && *path == "/transactions");
        nav.push_str(&format!(
            "<li class='{}'><a href='{}'>{}</a></li>",
            if is_active { "active" } else { "" },
            path,
            label
        ));
    }
    nav.push_str("</ul></div></nav>");
    nav
}

/// Full page, or just the container when htmx swaps it in
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if headers.contains_key("hx-request") {
        format!("<div class='container'>{}</div>", inner_content)
    } else {
        base_html(
            title,
            &format!("{}<div class='container'>{}</div>", nav_bar(current_path), inner_content),
        )
    }
}

/// Escape text for HTML content and single- or double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format an amount with the configured currency symbol
pub fn format_amount(amount: Decimal, currency: &CurrencyConfig) -> String {
    let places = currency.decimal_places as usize;
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-{}{:.*}", currency.symbol, places, amount.abs())
    } else {
        format!("{}{:.*}", currency.symbol, places, amount.abs())
    }
}

/// Serve until Ctrl+C
pub async fn start_server(config: Config, ledger: Arc<RwLock<Ledger>>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!(
        "moneyweb listening on http://{} (static assets from {})",
        addr,
        config.server.static_dir.display()
    );

    axum::serve(listener, create_router(AppState { ledger, config }))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    log::info!("moneyweb stopped");
    Ok(())
}
