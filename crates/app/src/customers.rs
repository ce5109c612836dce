use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use dashboard_core::{FormData, FormState};
use dashboard_storage::CustomerError;
use tracing::error;

use crate::actions;
use crate::listing::{render_cached, respond, ListParams};
use crate::router::AppState;
use crate::views::{self, components::FormMode, customers::LIST_PATH};

pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    let (query, page) = (params.query(), params.page());
    let storage = state.storage();
    let rendered = render_cached(state.cache(), LIST_PATH, &params.cache_key(), || async move {
        let repo = storage.customers();
        let total_pages = repo.count_pages(query).await?;
        let rows = repo.fetch_filtered(query, page).await?;
        Ok::<_, CustomerError>(views::customers::list_page(query, page, total_pages, &rows))
    })
    .await;

    respond(rendered, "customers")
}

fn form_response(
    status: StatusCode,
    mode: FormMode<'_>,
    values: &FormData,
    form_state: &FormState,
) -> Response {
    let html = views::customers::form_page(mode, values, form_state);
    (status, Html(html)).into_response()
}

pub async fn create_form() -> Response {
    form_response(
        StatusCode::OK,
        FormMode::Create,
        &FormData::new(),
        &FormState::default(),
    )
}

pub async fn create(State(state): State<AppState>, Form(form): Form<FormData>) -> Response {
    match actions::create_customer(&state, &form).await {
        Ok(redirect) => redirect.into_response(),
        Err(form_state) => form_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            FormMode::Create,
            &form,
            &form_state,
        ),
    }
}

pub async fn edit_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.storage().customers().fetch_by_id(&id).await {
        Ok(Some(customer)) => form_response(
            StatusCode::OK,
            FormMode::Edit { id: &id },
            &views::customers::values_from_customer(&customer),
            &FormState::default(),
        ),
        Ok(None) => views::error_page(StatusCode::NOT_FOUND, "Customer not found.", LIST_PATH),
        Err(err) => {
            error!(stage = "views", view = "customer", %id, error = %err, "failed to load customer");
            views::load_failure("customer")
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> Response {
    match actions::update_customer(&state, &id, &form).await {
        Ok(redirect) => redirect.into_response(),
        Err(form_state) => form_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            FormMode::Edit { id: &id },
            &form,
            &form_state,
        ),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match actions::delete_customer(&state, &id).await {
        Ok(_) => actions::RedirectTo(LIST_PATH).into_response(),
        Err(message) => views::error_page(StatusCode::INTERNAL_SERVER_ERROR, &message, LIST_PATH),
    }
}
