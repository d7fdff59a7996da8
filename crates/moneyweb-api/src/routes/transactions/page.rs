//! Transactions page rendering
//!
//! The table markup carries the attributes and classes the in-browser table
//! behaviour binds to: `data-pk` on rows, `.static[data-category-id]` and
//! `.dynamic` in category cells, and the hidden categorise container.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use moneyweb_config::CurrencyConfig;
use moneyweb_core::{resolve_month, Category, Direction, Timeline, Transaction};
use moneyweb_ui::dom;
use serde::Deserialize;

use super::month_url;
use crate::{escape_html, format_amount, ApiResult, AppState};

/// `?year=&month=`, both defaulting to today
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

const IN_OUT_CHART_SCRIPT: &str = r#"<script>
google.charts.load('current', { packages: ['corechart'] });
google.charts.setOnLoadCallback(function () {
    var element = document.getElementById('in-out-chart');
    fetch(element.dataset.url)
        .then(function (response) { return response.json(); })
        .then(function (chart) {
            var data = google.visualization.arrayToDataTable(chart.data);
            new google.visualization.BarChart(element).draw(data, chart.options);
        })
        .catch(function (err) { console.error('Failed to load chart data:', err); });
});
</script>"#;

/// Transactions page for one month
pub async fn page_transactions(
    state: State<AppState>,
    headers: HeaderMap,
    query: Query<MonthQuery>,
) -> ApiResult<Html<String>> {
    let today = chrono::Local::now().date_naive();
    let (year, month) = resolve_month(query.year, query.month, today);
    let timeline = Timeline::build(year, month, today)?;

    let ledger = state.ledger.read().await;
    let transactions = ledger.month_transactions(year, month)?;
    let categories = ledger.categories();

    let inner_content = format!(
        r#"<div class='page-header'><h2>Transactions <small>{}</small></h2></div>
        {}
        <div id='in-out-chart' data-url='/transactions/in-out/{}/{}' style='height: 220px'></div>
        {}
        {}
        {}"#,
        timeline.months[month as usize - 1].start.format("%B %Y"),
        render_timeline(&timeline),
        year,
        month,
        render_transaction_table(&transactions, categories, &state.config.currency),
        render_categorise_container(categories),
        IN_OUT_CHART_SCRIPT
    );

    Ok(Html(crate::page_response(&headers, "Transactions", "/transactions", &inner_content)))
}

/// Year/month navigation; future months are disabled
pub fn render_timeline(timeline: &Timeline) -> String {
    let year_link = |(year, is_future): (i32, bool), label: String| {
        if is_future {
            format!("<li class='disabled'><span>{}</span></li>", label)
        } else {
            format!("<li><a href='{}'>{}</a></li>", month_url(year, timeline.current_month), label)
        }
    };

    let mut html = String::from("<nav class='transaction-timeline'><ul class='pagination'>");
    html.push_str(&year_link(timeline.previous_year, format!("&laquo; {}", timeline.previous_year.0)));

    for (index, month) in timeline.months.iter().enumerate() {
        let number = index as u32 + 1;
        let label = month.start.format("%b");
        if month.is_future {
            html.push_str(&format!("<li class='disabled'><span>{}</span></li>", label));
        } else {
            html.push_str(&format!(
                "<li class='{}'><a href='{}'>{}</a></li>",
                if number == timeline.current_month { "active" } else { "" },
                month_url(timeline.year, number),
                label
            ));
        }
    }

    html.push_str(&year_link(timeline.next_year, format!("{} &raquo;", timeline.next_year.0)));
    html.push_str("</ul></nav>");
    html
}

fn category_label<'a>(categories: &'a [Category], id: &'a str) -> &'a str {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.label())
        .unwrap_or(id)
}

fn render_row(tx: &Transaction, categories: &[Category], currency: &CurrencyConfig) -> String {
    let expand = if tx.has_extra() {
        format!("<td class='expand'><span class='glyphicon {}'></span></td>", dom::ICON_COLLAPSED)
    } else {
        "<td></td>".to_string()
    };

    let extra = tx
        .extra
        .as_deref()
        .filter(|_| tx.has_extra())
        .map(|text| format!("<div class='extra text-muted'>{}</div>", escape_html(text)))
        .unwrap_or_default();

    let category = match tx.category.as_deref() {
        Some(id) => escape_html(category_label(categories, id)),
        None => "<em class='text-muted'>Uncategorised</em>".to_string(),
    };

    let direction = match tx.direction() {
        Some(Direction::Incoming) => "incoming",
        Some(Direction::Outgoing) => "outgoing",
        None => "",
    };

    format!(
        r#"<tr class='transaction' {}='{}'>
    {}
    <td class='date'>{}</td>
    <td class='description'>{}{}</td>
    <td class='category'><span class='static' {}='{}'>{}</span><span class='dynamic'></span></td>
    <td class='amount {} text-right'>{}</td>
    <td class='actions'><a href='/counterparties/create?pattern={}' title='Create counterparty'><span class='glyphicon glyphicon-tag'></span></a></td>
</tr>"#,
        dom::PK_ATTR,
        tx.id,
        expand,
        tx.date.format("%d %b"),
        escape_html(&tx.description),
        extra,
        dom::CATEGORY_ATTR,
        escape_html(tx.category_id()),
        category,
        direction,
        format_amount(tx.amount, currency),
        urlencoding::encode(&tx.description)
    )
}

/// The month's transactions table
pub fn render_transaction_table(transactions: &[Transaction], categories: &[Category], currency: &CurrencyConfig) -> String {
    if transactions.is_empty() {
        return "<p class='text-muted text-center'>No transactions this month.</p>".to_string();
    }

    let rows: Vec<String> = transactions
        .iter()
        .map(|tx| render_row(tx, categories, currency))
        .collect();

    format!(
        r#"<table class='table table-condensed transaction-table'>
<thead><tr><th></th><th>Date</th><th>Description</th><th>Category</th><th class='text-right'>Amount</th><th></th></tr></thead>
<tbody>{}</tbody>
</table>"#,
        rows.join("\n")
    )
}

/// Template category select and the hidden categorise form
pub fn render_categorise_container(categories: &[Category]) -> String {
    let options: String = categories
        .iter()
        .map(|c| format!("<option value='{}'>{}</option>", escape_html(&c.id), escape_html(c.label())))
        .collect();

    format!(
        r#"<div class='transaction-categorise-container' style='display: none'>
    <select name='{category}'><option value=''>---------</option>{options}</select>
    <form method='post' action='/transactions/categorise'>
        <input type='hidden' name='{transaction}'>
        <input type='hidden' name='{category}'>
    </form>
</div>"#,
        category = dom::CATEGORY_FIELD,
        transaction = dom::TRANSACTION_FIELD,
        options = options
    )
}
