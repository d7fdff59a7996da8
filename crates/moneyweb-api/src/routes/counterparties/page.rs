//! Counterparty pattern form rendering

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use moneyweb_config::CurrencyConfig;
use moneyweb_core::{category_choices, Category, CoreResult, CounterPartyPatternForm, FormErrors, Transaction};

use crate::{escape_html, format_amount, AppState};

/// Counterparty form, optionally prefilled from the query string
pub async fn page_counterparty_create(
    state: State<AppState>,
    headers: HeaderMap,
    query: Query<CounterPartyPatternForm>,
) -> Html<String> {
    let ledger = state.ledger.read().await;
    let content = render_counterparty_form(&query, &FormErrors::new(), ledger.categories());
    Html(crate::page_response(&headers, "Counterparties", "/counterparties/create", &content))
}

fn field_error(errors: &FormErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|message| format!("<span class='help-block'>{}</span>", escape_html(message)))
        .unwrap_or_default()
}

fn group_class(errors: &FormErrors, field: &str) -> &'static str {
    if errors.contains_key(field) {
        "form-group has-error"
    } else {
        "form-group"
    }
}

pub fn render_counterparty_form(form: &CounterPartyPatternForm, errors: &FormErrors, categories: &[Category]) -> String {
    let mut choices = category_choices(categories);
    let current = form.auto_categorise.trim();
    if !current.is_empty() && !choices.iter().any(|(value, _)| value == current) {
        choices.push((current.to_string(), current.to_string()));
    }

    let options: String = choices
        .iter()
        .map(|(value, label)| {
            format!(
                "<option value='{}'{}>{}</option>",
                escape_html(value),
                if value == current { " selected" } else { "" },
                escape_html(label)
            )
        })
        .collect();

    format!(
        r#"<div class='page-header'><h2>Create counterparty pattern</h2></div>
<form method='post' action='/counterparties/create' class='counterparty-form'>
    <div class='{}'>
        <label for='counterparty'>Counterparty</label>
        <input type='text' class='form-control' id='counterparty' name='counterparty' maxlength='100' value='{}'>
        {}
    </div>
    <div class='{}'>
        <label for='auto_categorise'>Auto categorise</label>
        <select id='auto_categorise' name='auto_categorise'><option value=''>---------</option>{}</select>
        {}
    </div>
    <div class='{}'>
        <label for='pattern'>Pattern</label>
        <input type='text' class='form-control' id='pattern' name='pattern' maxlength='200' value='{}'
            hx-get='/counterparties/preview' hx-trigger='load, keyup changed delay:500ms' hx-target='#pattern-preview'>
        {}
    </div>
    <button type='submit' class='btn btn-primary'>Save</button>
</form>
<h3>Matching transactions</h3>
<div id='pattern-preview'></div>
<script>
document.addEventListener('DOMContentLoaded', function () {{
    window.initSelectize(document.getElementById('auto_categorise'));
}});
</script>"#,
        group_class(errors, "counterparty"),
        escape_html(&form.counterparty),
        field_error(errors, "counterparty"),
        group_class(errors, "auto_categorise"),
        options,
        field_error(errors, "auto_categorise"),
        group_class(errors, "pattern"),
        escape_html(&form.pattern),
        field_error(errors, "pattern")
    )
}

/// Preview fragment for a pattern lookup
pub fn render_preview(result: CoreResult<Vec<Transaction>>, currency: &CurrencyConfig) -> String {
    let transactions = match result {
        Ok(transactions) => transactions,
        Err(e) => return format!("<p class='text-danger'>{}</p>", escape_html(&e.to_string())),
    };

    if transactions.is_empty() {
        return "<p class='text-muted'>No transactions match.</p>".to_string();
    }

    let rows: String = transactions
        .iter()
        .map(|tx| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class='text-right'>{}</td></tr>",
                tx.date,
                escape_html(&tx.description),
                escape_html(tx.counterparty.as_deref().unwrap_or("")),
                format_amount(tx.amount, currency)
            )
        })
        .collect();

    format!(
        "<p>{} matching transactions</p><table class='table table-condensed'><tbody>{}</tbody></table>",
        transactions.len(),
        rows
    )
}
