use dashboard_core::pagination::{generate_pagination, PageLink};
use dashboard_core::{FieldErrors, FormState};
use url::form_urlencoded;

use super::escape;

/// Whether a form creates a record or edits the identified one.
#[derive(Debug, Clone, Copy)]
pub enum FormMode<'a> {
    Create,
    Edit { id: &'a str },
}

impl FormMode<'_> {
    /// Endpoint the form posts to, below the entity's list path.
    pub fn action(&self, list_path: &str) -> String {
        match self {
            Self::Create => format!("{list_path}/create"),
            Self::Edit { id } => format!("{list_path}/{}/edit", encode_segment(id)),
        }
    }

    pub fn submit_label(&self, entity: &str) -> String {
        match self {
            Self::Create => format!("Create {entity}"),
            Self::Edit { .. } => format!("Edit {entity}"),
        }
    }
}

/// Percent-encodes an identifier for use as a single path segment.
pub fn encode_segment(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Builds a list URL carrying the current search and page.
pub fn list_href(path: &str, query: &str, page: u32) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    if !query.is_empty() {
        params.append_pair("query", query);
    }
    params.append_pair("page", &page.to_string());
    format!("{path}?{}", params.finish())
}

/// Search box that submits `query` back to `path`, resetting to page 1.
pub fn search_box(path: &str, placeholder: &str, query: &str) -> String {
    format!(
        r#"<form class="search" method="get" action="{path}" role="search">
<label for="search" class="sr-only">Search</label>
<input id="search" name="query" type="search" placeholder="{placeholder}" value="{query}">
<input type="hidden" name="page" value="1">
<button type="submit">Search</button>
</form>"#,
        path = escape(path),
        placeholder = escape(placeholder),
        query = escape(query),
    )
}

/// Page links under a table; renders nothing when there is at most one page.
pub fn pagination(path: &str, query: &str, current: u32, total: u32) -> String {
    if total <= 1 {
        return String::new();
    }

    let mut html = String::from(r#"<nav class="pagination" aria-label="Pagination">"#);
    if current > 1 {
        html.push_str(&format!(
            r#"<a href="{}" rel="prev">&larr;</a>"#,
            escape(&list_href(path, query, current - 1))
        ));
    }
    for link in generate_pagination(current, total) {
        match link {
            PageLink::Page(page) if page == current => {
                html.push_str(&format!(r#"<span class="current" aria-current="page">{page}</span>"#));
            }
            PageLink::Page(page) => html.push_str(&format!(
                r#"<a href="{}">{page}</a>"#,
                escape(&list_href(path, query, page))
            )),
            PageLink::Ellipsis => html.push_str("<span>&hellip;</span>"),
        }
    }
    if current < total {
        html.push_str(&format!(
            r#"<a href="{}" rel="next">&rarr;</a>"#,
            escape(&list_href(path, query, current + 1))
        ));
    }
    html.push_str("</nav>");
    html
}

/// Live region listing the messages recorded for `field`.
pub fn field_errors(field: &str, errors: &FieldErrors) -> String {
    let messages: String = errors
        .get(field)
        .iter()
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .collect();
    format!(
        r#"<div id="{field}-error" aria-live="polite" aria-atomic="true">{messages}</div>"#,
        field = escape(field),
    )
}

/// Top-level form message, if any.
pub fn form_message(state: &FormState) -> String {
    state
        .message
        .as_deref()
        .map(|message| {
            format!(
                r#"<div class="error" aria-live="polite" aria-atomic="true">{}</div>"#,
                escape(message)
            )
        })
        .unwrap_or_default()
}

/// Inline form posting to a delete endpoint.
pub fn delete_button(action: &str) -> String {
    format!(
        r#"<form method="post" action="{}" class="inline"><button type="submit">Delete</button></form>"#,
        escape(action)
    )
}
