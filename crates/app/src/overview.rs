use axum::{extract::State, response::Response};
use dashboard_storage::InvoiceError;

use crate::listing::{render_cached, respond};
use crate::router::AppState;
use crate::views;

pub const PATH: &str = "/dashboard";
const LATEST_INVOICES: u32 = 5;

pub async fn show(State(state): State<AppState>) -> Response {
    let storage = state.storage();
    let rendered = render_cached(state.cache(), PATH, "", || async move {
        let invoices = storage.invoices();
        let cards = invoices.card_data().await?;
        let latest = invoices.fetch_latest(LATEST_INVOICES).await?;
        Ok::<_, InvoiceError>(views::overview::page(&cards, &latest))
    })
    .await;

    respond(rendered, "dashboard")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::router::app_router;
    use crate::router::tests::{body_text, setup_state};

    #[tokio::test]
    async fn overview_reflects_mutations_after_revalidation() {
        let state = setup_state().await;
        let app = app_router(state);
        let get = || Request::builder().uri(PATH).body(Body::empty()).unwrap();

        let empty = app.clone().oneshot(get()).await.expect("respond");
        assert_eq!(empty.status(), StatusCode::OK);
        assert!(body_text(empty).await.contains("No invoices yet."));

        let created = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/dashboard/customers/create")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=Hector&email=hector%40example.com&image_url=%2Fh.png"))
                    .unwrap(),
            )
            .await
            .expect("respond");
        assert_eq!(created.status(), StatusCode::SEE_OTHER);

        let refreshed = body_text(app.oneshot(get()).await.expect("respond")).await;
        assert!(refreshed.contains("<h3>Total Customers</h3><p>1</p>"));
    }
}
