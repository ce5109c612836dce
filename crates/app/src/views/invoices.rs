use dashboard_core::format::{cents_to_input, format_currency, format_date};
use dashboard_core::forms::{FIELD_AMOUNT, FIELD_CUSTOMER_ID, FIELD_STATUS};
use dashboard_core::{CustomerField, FormData, FormState, Invoice, InvoiceRow, InvoiceStatus};

use super::components::{
    delete_button, encode_segment, field_errors, form_message, pagination, search_box, FormMode,
};
use super::{escape, layout};

pub const LIST_PATH: &str = "/dashboard/invoices";

/// Status pill shown in tables.
pub fn status_badge(status: InvoiceStatus) -> String {
    format!(
        r#"<span class="badge badge-{}">{}</span>"#,
        status.as_str(),
        status.label()
    )
}

/// Invoices table with search and pagination.
pub fn list_page(query: &str, current_page: u32, total_pages: u32, rows: &[InvoiceRow]) -> String {
    let table_rows: String = if rows.is_empty() {
        r#"<tr><td colspan="6">No invoices found.</td></tr>"#.to_string()
    } else {
        rows.iter().map(table_row).collect()
    };

    let body = format!(
        r#"<h1>Invoices</h1>
<div class="toolbar">
{search}
<a class="button" href="{LIST_PATH}/create">Create Invoice</a>
</div>
<table>
<thead><tr><th>Customer</th><th>Email</th><th>Amount</th><th>Date</th><th>Status</th><th><span class="sr-only">Actions</span></th></tr></thead>
<tbody>
{table_rows}
</tbody>
</table>
{pagination}"#,
        search = search_box(LIST_PATH, "Search invoices...", query),
        pagination = pagination(LIST_PATH, query, current_page, total_pages),
    );
    layout("Invoices", &body)
}

fn table_row(row: &InvoiceRow) -> String {
    let id = encode_segment(&row.id);
    format!(
        r#"<tr>
<td><img class="avatar" src="{image}" alt="{name}'s profile picture">{name}</td>
<td>{email}</td>
<td>{amount}</td>
<td>{date}</td>
<td>{status}</td>
<td><a href="{LIST_PATH}/{id}/edit">Edit</a> {delete}</td>
</tr>
"#,
        image = escape(&row.image_url),
        name = escape(&row.name),
        email = escape(&row.email),
        amount = format_currency(row.amount),
        date = format_date(row.date),
        status = status_badge(row.status),
        delete = delete_button(&format!("{LIST_PATH}/{id}/delete")),
    )
}

/// Form values pre-filled from a stored invoice.
pub fn values_from_invoice(invoice: &Invoice) -> FormData {
    [
        (FIELD_CUSTOMER_ID, invoice.customer_id.clone()),
        (FIELD_AMOUNT, cents_to_input(invoice.amount)),
        (FIELD_STATUS, invoice.status.as_str().to_string()),
    ]
    .into_iter()
    .collect()
}

/// Create/edit form bound to `values`, with any errors from a failed submission.
pub fn form_page(
    mode: FormMode<'_>,
    customers: &[CustomerField],
    values: &FormData,
    state: &FormState,
) -> String {
    let selected_customer = values.get(FIELD_CUSTOMER_ID).unwrap_or_default();
    let customer_options: String = customers
        .iter()
        .map(|customer| {
            let selected = if customer.id == selected_customer {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                escape(&customer.id),
                escape(&customer.name)
            )
        })
        .collect();
    let no_selection = if selected_customer.is_empty() {
        " selected"
    } else {
        ""
    };

    let selected_status = values.get(FIELD_STATUS).unwrap_or_default();
    let status_inputs: String = InvoiceStatus::ALL
        .iter()
        .map(|status| {
            let checked = if status.as_str() == selected_status {
                " checked"
            } else {
                ""
            };
            format!(
                r#"<label><input type="radio" id="{value}" name="status" value="{value}" aria-describedby="status-error"{checked}> {label}</label>
"#,
                value = status.as_str(),
                label = status.label(),
            )
        })
        .collect();

    let title = mode.submit_label("Invoice");
    let body = format!(
        r#"<h1>{title}</h1>
<form method="post" action="{action}">
<div class="field">
<label for="customer">Choose customer</label>
<select id="customer" name="customerId" aria-describedby="customerId-error">
<option value="" disabled{no_selection}>Select a customer</option>
{customer_options}</select>
{customer_errors}
</div>
<div class="field">
<label for="amount">Choose an amount</label>
<input id="amount" name="amount" type="number" step="0.01" placeholder="Enter USD amount" value="{amount}" aria-describedby="amount-error">
{amount_errors}
</div>
<fieldset class="field">
<legend>Set the invoice status</legend>
{status_inputs}{status_errors}
</fieldset>
{message}
<div class="actions">
<a href="{LIST_PATH}">Cancel</a>
<button type="submit">{title}</button>
</div>
</form>"#,
        title = escape(&title),
        action = escape(&mode.action(LIST_PATH)),
        amount = escape(values.get(FIELD_AMOUNT).unwrap_or_default()),
        customer_errors = field_errors(FIELD_CUSTOMER_ID, &state.errors),
        amount_errors = field_errors(FIELD_AMOUNT, &state.errors),
        status_errors = field_errors(FIELD_STATUS, &state.errors),
        message = form_message(state),
    );
    layout(&title, &body)
}
