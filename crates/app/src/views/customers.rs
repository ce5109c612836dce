use dashboard_core::format::format_currency;
use dashboard_core::forms::{FIELD_EMAIL, FIELD_IMAGE_URL, FIELD_NAME};
use dashboard_core::{Customer, CustomerSummary, FormData, FormState};

use super::components::{
    delete_button, encode_segment, field_errors, form_message, pagination, search_box, FormMode,
};
use super::{escape, layout};

pub const LIST_PATH: &str = "/dashboard/customers";

/// Customers table with invoice totals, search and pagination.
pub fn list_page(
    query: &str,
    current_page: u32,
    total_pages: u32,
    rows: &[CustomerSummary],
) -> String {
    let table_rows: String = if rows.is_empty() {
        r#"<tr><td colspan="6">No customers found.</td></tr>"#.to_string()
    } else {
        rows.iter().map(table_row).collect()
    };

    let body = format!(
        r#"<h1>Customers</h1>
<div class="toolbar">
{search}
<a class="button" href="{LIST_PATH}/create">Create Customer</a>
</div>
<table>
<thead><tr><th>Name</th><th>Email</th><th>Total Invoices</th><th>Total Pending</th><th>Total Paid</th><th><span class="sr-only">Actions</span></th></tr></thead>
<tbody>
{table_rows}
</tbody>
</table>
{pagination}"#,
        search = search_box(LIST_PATH, "Search customers...", query),
        pagination = pagination(LIST_PATH, query, current_page, total_pages),
    );
    layout("Customers", &body)
}

fn table_row(row: &CustomerSummary) -> String {
    let id = encode_segment(&row.id);
    format!(
        r#"<tr>
<td><img class="avatar" src="{image}" alt="{name}'s profile picture">{name}</td>
<td>{email}</td>
<td>{total_invoices}</td>
<td>{total_pending}</td>
<td>{total_paid}</td>
<td><a href="{LIST_PATH}/{id}/edit">Edit</a> {delete}</td>
</tr>
"#,
        image = escape(&row.image_url),
        name = escape(&row.name),
        email = escape(&row.email),
        total_invoices = row.total_invoices,
        total_pending = format_currency(row.total_pending),
        total_paid = format_currency(row.total_paid),
        delete = delete_button(&format!("{LIST_PATH}/{id}/delete")),
    )
}

/// Form values pre-filled from a stored customer.
pub fn values_from_customer(customer: &Customer) -> FormData {
    [
        (FIELD_NAME, customer.name.as_str()),
        (FIELD_EMAIL, customer.email.as_str()),
        (FIELD_IMAGE_URL, customer.image_url.as_str()),
    ]
    .into_iter()
    .collect()
}

fn text_input(
    field: &str,
    label: &str,
    input_type: &str,
    values: &FormData,
    state: &FormState,
) -> String {
    format!(
        r#"<div class="field">
<label for="{field}">{label}</label>
<input id="{field}" name="{field}" type="{input_type}" placeholder="{label}" value="{value}" aria-describedby="{field}-error">
{errors}
</div>"#,
        field = escape(field),
        label = escape(label),
        input_type = escape(input_type),
        value = escape(values.get(field).unwrap_or_default()),
        errors = field_errors(field, &state.errors),
    )
}

/// Create/edit form bound to `values`, with any errors from a failed submission.
pub fn form_page(mode: FormMode<'_>, values: &FormData, state: &FormState) -> String {
    let title = mode.submit_label("Customer");
    let body = format!(
        r#"<h1>{title}</h1>
<form method="post" action="{action}">
{name}
{email}
{image_url}
{message}
<div class="actions">
<a href="{LIST_PATH}">Cancel</a>
<button type="submit">{title}</button>
</div>
</form>"#,
        title = escape(&title),
        action = escape(&mode.action(LIST_PATH)),
        name = text_input(FIELD_NAME, "Name", "text", values, state),
        email = text_input(FIELD_EMAIL, "Email", "email", values, state),
        image_url = text_input(FIELD_IMAGE_URL, "Image URL", "text", values, state),
        message = form_message(state),
    );
    layout(&title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::FieldErrors;

    #[test]
    fn create_form_echoes_submitted_values_with_errors() {
        let values: FormData = [("name", "Amy"), ("email", "amy@"), ("image_url", "")]
            .into_iter()
            .collect();
        let mut errors = FieldErrors::new();
        errors.push(FIELD_EMAIL, "Please enter a valid email address.");
        let state = FormState {
            errors,
            message: Some("Missing Fields. Failed to Create Customer.".into()),
        };

        let html = form_page(FormMode::Create, &values, &state);
        assert!(html.contains(r#"action="/dashboard/customers/create""#));
        assert!(html.contains(r#"value="Amy""#));
        assert!(html.contains("Please enter a valid email address."));
        assert!(html.contains("Missing Fields. Failed to Create Customer."));
    }

    #[test]
    fn edit_form_is_prefilled_from_customer() {
        let customer = Customer {
            id: "c-1".into(),
            name: "Hector \"Hex\" Simpson".into(),
            email: "hector@simpson.com".into(),
            image_url: "/customers/hector-simpson.png".into(),
        };
        let html = form_page(
            FormMode::Edit { id: "c-1" },
            &values_from_customer(&customer),
            &FormState::default(),
        );
        assert!(html.contains(r#"value="Hector &quot;Hex&quot; Simpson""#));
        assert!(html.contains(r#"action="/dashboard/customers/c-1/edit""#));
    }

    #[test]
    fn list_page_shows_totals() {
        let row = CustomerSummary {
            id: "c-1".into(),
            name: "Amy Burns".into(),
            email: "amy@burns.com".into(),
            image_url: "/customers/amy-burns.png".into(),
            total_invoices: 2,
            total_pending: 123_400,
            total_paid: 50,
        };
        let html = list_page("", 1, 1, &[row]);
        assert!(html.contains("<td>$1,234.00</td>"));
        assert!(html.contains("<td>$0.50</td>"));
        assert!(list_page("nobody", 1, 0, &[]).contains("No customers found."));
    }
}
