use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use dashboard_core::{FormData, FormState};
use dashboard_storage::{CustomerError, InvoiceError};
use tracing::error;

use crate::actions;
use crate::listing::{render_cached, respond, ListParams};
use crate::router::AppState;
use crate::views::{self, components::FormMode, invoices::LIST_PATH};

pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    let (query, page) = (params.query(), params.page());
    let storage = state.storage();
    let rendered = render_cached(state.cache(), LIST_PATH, &params.cache_key(), || async move {
        let repo = storage.invoices();
        let total_pages = repo.count_pages(query).await?;
        let rows = repo.fetch_filtered(query, page).await?;
        Ok::<_, InvoiceError>(views::invoices::list_page(query, page, total_pages, &rows))
    })
    .await;

    respond(rendered, "invoices")
}

/// Renders the invoice form, loading the customer options it needs.
async fn form_response(
    state: &AppState,
    status: StatusCode,
    mode: FormMode<'_>,
    values: &FormData,
    form_state: &FormState,
) -> Response {
    match state.storage().customers().list_fields().await {
        Ok(customers) => {
            let html = views::invoices::form_page(mode, &customers, values, form_state);
            (status, Html(html)).into_response()
        }
        Err(err) => {
            log_load_error("customers", &err);
            views::load_failure("customers")
        }
    }
}

fn log_load_error(view: &'static str, err: &CustomerError) {
    error!(stage = "views", view, error = %err, "failed to load form options");
}

pub async fn create_form(State(state): State<AppState>) -> Response {
    form_response(
        &state,
        StatusCode::OK,
        FormMode::Create,
        &FormData::new(),
        &FormState::default(),
    )
    .await
}

pub async fn create(State(state): State<AppState>, Form(form): Form<FormData>) -> Response {
    match actions::create_invoice(&state, &form).await {
        Ok(redirect) => redirect.into_response(),
        Err(form_state) => {
            form_response(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                FormMode::Create,
                &form,
                &form_state,
            )
            .await
        }
    }
}

pub async fn edit_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.storage().invoices().fetch_by_id(&id).await {
        Ok(Some(invoice)) => {
            let values = views::invoices::values_from_invoice(&invoice);
            form_response(
                &state,
                StatusCode::OK,
                FormMode::Edit { id: &id },
                &values,
                &FormState::default(),
            )
            .await
        }
        Ok(None) => views::error_page(StatusCode::NOT_FOUND, "Invoice not found.", LIST_PATH),
        Err(err) => {
            error!(stage = "views", view = "invoice", %id, error = %err, "failed to load invoice");
            views::load_failure("invoice")
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> Response {
    match actions::update_invoice(&state, &id, &form).await {
        Ok(redirect) => redirect.into_response(),
        Err(form_state) => {
            form_response(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                FormMode::Edit { id: &id },
                &form,
                &form_state,
            )
            .await
        }
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match actions::delete_invoice(&state, &id).await {
        Ok(_) => actions::RedirectTo(LIST_PATH).into_response(),
        Err(message) => views::error_page(StatusCode::INTERNAL_SERVER_ERROR, &message, LIST_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header, http::Request, Router};
    use dashboard_core::CustomerInput;
    use tower::ServiceExt;

    use crate::router::app_router;
    use crate::router::tests::{body_text, setup_state};

    async fn seed(state: &AppState) -> String {
        state
            .storage()
            .customers()
            .insert(&CustomerInput {
                name: "Delba de Oliveira".into(),
                email: "delba@oliveira.com".into(),
                image_url: "/customers/delba-de-oliveira.png".into(),
            })
            .await
            .expect("seed customer")
    }

    fn post_form(uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                serde_urlencoded::to_string(pairs).expect("encode form"),
            ))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone()
            .oneshot(request)
            .await
            .expect("handler should respond")
    }

    #[tokio::test]
    async fn create_redirects_and_list_shows_new_invoice() {
        let state = setup_state().await;
        let customer_id = seed(&state).await;
        let app = app_router(state);

        // Prime the cache so the redirect target must be re-rendered.
        let before = body_text(send(&app, get("/dashboard/invoices")).await).await;
        assert!(before.contains("No invoices found."));

        let response = send(
            &app,
            post_form(
                "/dashboard/invoices/create",
                &[("customerId", customer_id.as_str()), ("amount", "45.50"), ("status", "paid")],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard/invoices");

        let after = body_text(send(&app, get("/dashboard/invoices")).await).await;
        assert!(after.contains("$45.50"));
        assert!(after.contains("Delba de Oliveira"));
    }

    #[tokio::test]
    async fn invalid_submission_rerenders_form_with_errors() {
        let state = setup_state().await;
        let customer_id = seed(&state).await;
        let app = app_router(state.clone());

        let response = send(
            &app,
            post_form(
                "/dashboard/invoices/create",
                &[("customerId", customer_id.as_str()), ("amount", "0"), ("status", "pending")],
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_text(response).await;
        assert!(body.contains("Please enter an amount greater than $0."));
        assert!(body.contains("Missing Fields. Failed to Create Invoice."));
        let cards = state.storage().invoices().card_data().await.expect("cards");
        assert_eq!(cards.number_of_invoices, 0);
    }

    #[tokio::test]
    async fn edit_updates_only_the_target_invoice() {
        let state = setup_state().await;
        let customer_id = seed(&state).await;
        let app = app_router(state.clone());
        for amount in ["10", "20"] {
            send(
                &app,
                post_form(
                    "/dashboard/invoices/create",
                    &[("customerId", customer_id.as_str()), ("amount", amount), ("status", "pending")],
                ),
            )
            .await;
        }
        let invoices = state
            .storage()
            .invoices()
            .fetch_filtered("", 1)
            .await
            .expect("list");
        let (target, other) = (&invoices[0], &invoices[1]);

        let form = send(&app, get(&format!("/dashboard/invoices/{}/edit", target.id))).await;
        assert_eq!(form.status(), StatusCode::OK);

        let response = send(
            &app,
            post_form(
                &format!("/dashboard/invoices/{}/edit", target.id),
                &[("customerId", customer_id.as_str()), ("amount", "99.99"), ("status", "paid")],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let repo = state.storage().invoices();
        let updated = repo.fetch_by_id(&target.id).await.expect("fetch").expect("present");
        let untouched = repo.fetch_by_id(&other.id).await.expect("fetch").expect("present");
        assert_eq!(updated.amount, 9999);
        assert_eq!(updated.date, target.date);
        assert_eq!(untouched.amount, other.amount);
        assert_eq!(untouched.status, other.status);
    }

    #[tokio::test]
    async fn unknown_invoice_edit_page_is_not_found() {
        let app = app_router(setup_state().await);
        let response = send(&app, get("/dashboard/invoices/missing/edit")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_redirects_even_for_unknown_ids() {
        let app = app_router(setup_state().await);
        for _ in 0..2 {
            let response = send(&app, post_form("/dashboard/invoices/missing/delete", &[])).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(response.headers()[header::LOCATION], "/dashboard/invoices");
        }
    }

    #[tokio::test]
    async fn search_with_no_matches_has_no_pagination() {
        let state = setup_state().await;
        seed(&state).await;
        let app = app_router(state);

        let body = body_text(send(&app, get("/dashboard/invoices?query=zzz&page=oops")).await).await;
        assert!(body.contains("No invoices found."));
        assert!(!body.contains("aria-label=\"Pagination\""));
    }
}
