use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use dashboard_identity::IdentityClient;
use dashboard_storage::Database;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::cache::PageCache;
use crate::{auth, customers, invoices, overview, telemetry};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    storage: Database,
    cache: PageCache,
    identity: IdentityClient,
    clock: Clock,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database, identity: IdentityClient) -> Self {
        Self {
            metrics,
            storage,
            cache: PageCache::new(),
            identity,
            clock: Arc::new(Utc::now),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn storage(&self) -> &Database {
        &self.storage
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn identity(&self) -> &IdentityClient {
        &self.identity
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/dashboard", get(overview::show))
        .route("/dashboard/invoices", get(invoices::list))
        .route(
            "/dashboard/invoices/create",
            get(invoices::create_form).post(invoices::create),
        )
        .route(
            "/dashboard/invoices/:id/edit",
            get(invoices::edit_form).post(invoices::update),
        )
        .route("/dashboard/invoices/:id/delete", post(invoices::delete))
        .route("/dashboard/customers", get(customers::list))
        .route(
            "/dashboard/customers/create",
            get(customers::create_form).post(customers::create),
        )
        .route(
            "/dashboard/customers/:id/edit",
            get(customers::edit_form).post(customers::update),
        )
        .route("/dashboard/customers/:id/delete", post(customers::delete))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use reqwest::Client;
    use tower::ServiceExt;
    use url::Url;

    pub(crate) async fn setup_state_with_identity(identity_base: &str) -> AppState {
        let metrics = telemetry::init_metrics().expect("metrics init");
        let database = Database::connect("sqlite::memory:")
            .await
            .expect("connect");
        database.run_migrations().await.expect("migrations");
        let identity = IdentityClient::new(
            Url::parse(identity_base).expect("identity url"),
            Client::builder().build().expect("http client"),
        );

        AppState::new(metrics, database, identity)
    }

    pub(crate) async fn setup_state() -> AppState {
        setup_state_with_identity("http://127.0.0.1:9/").await
    }

    pub(crate) async fn body_text(response: Response) -> String {
        let collected = response
            .into_body()
            .collect()
            .await
            .expect("body should read");
        String::from_utf8(collected.to_bytes().to_vec()).expect("utf-8")
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let app = app_router(setup_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("handler should respond");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_exports_build_info() {
        let app = app_router(setup_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("handler should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("app_build_info"));
        assert!(body.contains("app_uptime_seconds"));
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let app = app_router(setup_state().await);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .expect("handler should respond");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    }
}
