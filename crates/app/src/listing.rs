use std::{future::Future, sync::Arc};

use axum::response::{Html, IntoResponse, Response};
use dashboard_core::pagination::parse_page;
use metrics::counter;
use serde::Deserialize;
use tracing::error;

use crate::cache::{Lookup, PageCache};
use crate::views;

/// `?query=&page=` parameters accepted by list views.
///
/// `page` stays a string so malformed values fall back to page 1 instead of
/// failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl ListParams {
    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or_default().trim()
    }

    pub fn page(&self) -> u32 {
        parse_page(self.page.as_deref())
    }

    /// Normalized cache key, so equivalent URLs share one cached page.
    pub fn cache_key(&self) -> String {
        format!("query={}&page={}", self.query(), self.page())
    }
}

/// Serves the page at `path`/`key` from `cache`, rendering and storing it on a miss.
pub async fn render_cached<F, Fut, E>(
    cache: &PageCache,
    path: &str,
    key: &str,
    render: F,
) -> Result<Arc<str>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, E>>,
{
    match cache.lookup(path, key) {
        Lookup::Hit(html) => Ok(html),
        Lookup::Miss(ticket) => {
            let html: Arc<str> = render().await?.into();
            cache.fill(ticket, html.clone());
            Ok(html)
        }
    }
}

/// Converts a cached render into a response, or a load-failure page.
pub fn respond<E: std::fmt::Display>(
    rendered: Result<Arc<str>, E>,
    view: &'static str,
) -> Response {
    match rendered {
        Ok(html) => Html(html.to_string()).into_response(),
        Err(err) => {
            counter!("list_view_load_failures_total", "view" => view).increment(1);
            error!(stage = "views", view, error = %err, "failed to load view");
            views::load_failure(view)
        }
    }
}
