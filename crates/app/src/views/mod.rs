//! Server-rendered HTML for the dashboard pages and forms.
//!
//! Every value interpolated into markup goes through [`escape`].

pub mod components;
pub mod customers;
pub mod invoices;
pub mod login;
pub mod overview;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #111827; background: #f9fafb; }
header { display: flex; gap: 1.5rem; align-items: center; padding: 1rem 2rem; background: #2563eb; }
header a { color: #fff; text-decoration: none; font-weight: 600; }
main { max-width: 72rem; margin: 0 auto; padding: 2rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { text-align: left; padding: 0.75rem; border-bottom: 1px solid #e5e7eb; }
img.avatar { width: 28px; height: 28px; border-radius: 50%; vertical-align: middle; margin-right: 0.5rem; }
.toolbar { display: flex; gap: 0.5rem; justify-content: space-between; margin: 1.5rem 0; }
.badge { padding: 0.125rem 0.5rem; border-radius: 9999px; font-size: 0.75rem; }
.badge-pending { background: #f3f4f6; color: #6b7280; }
.badge-paid { background: #22c55e; color: #fff; }
.error { color: #ef4444; font-size: 0.875rem; margin: 0.5rem 0 0; }
.field { margin-bottom: 1rem; }
.field label { display: block; font-weight: 500; margin-bottom: 0.5rem; }
.pagination { display: flex; gap: 0.25rem; justify-content: center; margin-top: 1.25rem; }
.pagination a, .pagination span { padding: 0.5rem 0.75rem; border: 1px solid #e5e7eb; border-radius: 0.375rem; text-decoration: none; }
.pagination .current { background: #2563eb; color: #fff; }
.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.card { background: #fff; border-radius: 0.75rem; padding: 1rem; }
"#;

/// Escapes text for inclusion in element content or quoted attributes.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Wraps `body` in the shared document shell and navigation.
pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Acme Dashboard</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<a href="/dashboard">Home</a>
<a href="/dashboard/invoices">Invoices</a>
<a href="/dashboard/customers">Customers</a>
</header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

/// Full-page error response with a link back to `back_href`.
pub fn error_page(status: StatusCode, message: &str, back_href: &str) -> Response {
    let body = format!(
        r#"<h1>{title}</h1>
<p class="error">{message}</p>
<p><a href="{back}">Go back</a></p>"#,
        title = escape(status.canonical_reason().unwrap_or("Error")),
        message = escape(message),
        back = escape(back_href),
    );
    (status, Html(layout("Error", &body))).into_response()
}

/// Error page shown when a view cannot read from storage.
pub fn load_failure(what: &str) -> Response {
    error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("Failed to load {what}."),
        "/dashboard",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn layout_escapes_title() {
        let html = layout("<b>", "<p>body</p>");
        assert!(html.contains("<title>&lt;b&gt; | Acme Dashboard</title>"));
        assert!(html.contains("<p>body</p>"));
    }
}
