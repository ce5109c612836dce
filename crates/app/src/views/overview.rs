use dashboard_core::format::{format_currency, format_date};
use dashboard_core::{CardData, InvoiceRow};

use super::invoices::status_badge;
use super::{escape, layout};

/// Dashboard landing page: summary cards and the latest invoices.
pub fn page(cards: &CardData, latest: &[InvoiceRow]) -> String {
    let latest_rows: String = if latest.is_empty() {
        "<li>No invoices yet.</li>".to_string()
    } else {
        latest
            .iter()
            .map(|invoice| {
                format!(
                    r#"<li><img class="avatar" src="{image}" alt="{name}'s profile picture"><strong>{name}</strong> <span>{email}</span> {amount} <small>{date}</small> {status}</li>
"#,
                    image = escape(&invoice.image_url),
                    name = escape(&invoice.name),
                    email = escape(&invoice.email),
                    amount = format_currency(invoice.amount),
                    date = format_date(invoice.date),
                    status = status_badge(invoice.status),
                )
            })
            .collect()
    };

    let body = format!(
        r#"<h1>Dashboard</h1>
<section class="cards">
<div class="card"><h3>Collected</h3><p>{collected}</p></div>
<div class="card"><h3>Pending</h3><p>{pending}</p></div>
<div class="card"><h3>Total Invoices</h3><p>{invoices}</p></div>
<div class="card"><h3>Total Customers</h3><p>{customers}</p></div>
</section>
<section>
<h2>Latest Invoices</h2>
<ul class="latest">
{latest_rows}</ul>
</section>"#,
        collected = format_currency(cards.total_paid),
        pending = format_currency(cards.total_pending),
        invoices = cards.number_of_invoices,
        customers = cards.number_of_customers,
    );
    layout("Dashboard", &body)
}
