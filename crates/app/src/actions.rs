//! Mutation handlers: validate a submitted form, perform one write,
//! revalidate the affected list views and redirect.
//!
//! Failures never escape as errors; they come back as a [`FormState`] (for
//! create and update) or a message (for delete) that the caller renders.

use axum::response::{IntoResponse, Redirect, Response};
use dashboard_core::forms::{database_error_message, deleted_message, not_found_message};
use dashboard_core::{
    CustomerInput, Entity, FieldErrors, FormData, FormState, InvoiceInput, Operation,
};
use dashboard_storage::{CustomerError, InvoiceError, NewInvoice};
use metrics::counter;
use tracing::{error, info, warn};

use crate::router::AppState;

/// Successful mutation: the browser is sent to `0` with 303 See Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectTo(pub &'static str);

impl IntoResponse for RedirectTo {
    fn into_response(self) -> Response {
        Redirect::to(self.0).into_response()
    }
}

pub type MutationResult = Result<RedirectTo, FormState>;

/// List views whose rendering depends on records of `entity`.
///
/// Customer tables aggregate invoice totals and invoice tables show
/// customer names, so both lists and the overview are affected either way.
fn affected_paths(entity: Entity) -> [&'static str; 3] {
    match entity {
        Entity::Invoice => ["/dashboard/invoices", "/dashboard/customers", "/dashboard"],
        Entity::Customer => ["/dashboard/customers", "/dashboard/invoices", "/dashboard"],
    }
}

fn revalidate(state: &AppState, entity: Entity) {
    for path in affected_paths(entity) {
        state.cache().revalidate_path(path);
    }
}

fn record(entity: Entity, op: Operation, result: &'static str) {
    counter!(
        "dashboard_mutations_total",
        "entity" => entity.as_str(),
        "op" => op.as_str(),
        "result" => result
    )
    .increment(1);
}

fn succeeded(state: &AppState, entity: Entity, op: Operation) -> RedirectTo {
    record(entity, op, "ok");
    revalidate(state, entity);
    RedirectTo(entity.list_path())
}

fn rejected(entity: Entity, op: Operation, errors: FieldErrors) -> FormState {
    record(entity, op, "invalid");
    warn!(
        stage = "actions",
        entity = entity.as_str(),
        op = op.as_str(),
        fields = ?errors.iter().map(|(field, _)| field).collect::<Vec<_>>(),
        "submission failed validation"
    );
    FormState::invalid(errors, entity, op)
}

/// Records the failure server-side and returns the generic user-facing message.
fn database_failure_message(entity: Entity, op: Operation, err: &dyn std::error::Error) -> String {
    record(entity, op, "db_error");
    error!(
        stage = "actions",
        entity = entity.as_str(),
        op = op.as_str(),
        error = %err,
        "database write failed"
    );
    database_error_message(entity, op)
}

fn database_failure(entity: Entity, op: Operation, err: &dyn std::error::Error) -> FormState {
    FormState::message(database_failure_message(entity, op, err))
}

fn missing_record(entity: Entity, op: Operation, id: &str) -> FormState {
    record(entity, op, "not_found");
    warn!(stage = "actions", entity = entity.as_str(), op = op.as_str(), %id, "record not found");
    FormState::message(not_found_message(entity, op))
}

pub async fn create_invoice(state: &AppState, form: &FormData) -> MutationResult {
    let (entity, op) = (Entity::Invoice, Operation::Create);
    let input = InvoiceInput::parse(form).map_err(|errors| rejected(entity, op, errors))?;
    let issued_on = state.now().date_naive();

    let id = state
        .storage()
        .invoices()
        .insert(&NewInvoice::from_input(&input, issued_on))
        .await
        .map_err(|err| database_failure(entity, op, &err))?;

    info!(stage = "actions", %id, customer_id = %input.customer_id, amount = input.amount_cents, "invoice created");
    Ok(succeeded(state, entity, op))
}

pub async fn update_invoice(state: &AppState, id: &str, form: &FormData) -> MutationResult {
    let (entity, op) = (Entity::Invoice, Operation::Update);
    let input = InvoiceInput::parse(form).map_err(|errors| rejected(entity, op, errors))?;

    match state.storage().invoices().update(id, &input).await {
        Ok(()) => {
            info!(stage = "actions", %id, "invoice updated");
            Ok(succeeded(state, entity, op))
        }
        Err(InvoiceError::NotFound) => Err(missing_record(entity, op, id)),
        Err(err) => Err(database_failure(entity, op, &err)),
    }
}

/// Deletes an invoice. Deleting an unknown identifier succeeds.
pub async fn delete_invoice(state: &AppState, id: &str) -> Result<String, String> {
    let (entity, op) = (Entity::Invoice, Operation::Delete);
    let outcome = state.storage().invoices().delete(id).await;
    revalidate(state, entity);

    match outcome {
        Ok(removed) => {
            record(entity, op, "ok");
            info!(stage = "actions", %id, removed, "invoice deleted");
            Ok(deleted_message(entity))
        }
        Err(err) => Err(database_failure_message(entity, op, &err)),
    }
}

pub async fn create_customer(state: &AppState, form: &FormData) -> MutationResult {
    let (entity, op) = (Entity::Customer, Operation::Create);
    let input = CustomerInput::parse(form).map_err(|errors| rejected(entity, op, errors))?;

    let id = state
        .storage()
        .customers()
        .insert(&input)
        .await
        .map_err(|err| database_failure(entity, op, &err))?;

    info!(stage = "actions", %id, "customer created");
    Ok(succeeded(state, entity, op))
}

pub async fn update_customer(state: &AppState, id: &str, form: &FormData) -> MutationResult {
    let (entity, op) = (Entity::Customer, Operation::Update);
    let input = CustomerInput::parse(form).map_err(|errors| rejected(entity, op, errors))?;

    match state.storage().customers().update(id, &input).await {
        Ok(()) => {
            info!(stage = "actions", %id, "customer updated");
            Ok(succeeded(state, entity, op))
        }
        Err(CustomerError::NotFound) => Err(missing_record(entity, op, id)),
        Err(err) => Err(database_failure(entity, op, &err)),
    }
}

/// Deletes a customer. Customers that still own invoices are kept and the
/// generic delete failure is reported.
pub async fn delete_customer(state: &AppState, id: &str) -> Result<String, String> {
    let (entity, op) = (Entity::Customer, Operation::Delete);
    let outcome = state.storage().customers().delete(id).await;
    revalidate(state, entity);

    match outcome {
        Ok(removed) => {
            record(entity, op, "ok");
            info!(stage = "actions", %id, removed, "customer deleted");
            Ok(deleted_message(entity))
        }
        Err(err) => Err(database_failure_message(entity, op, &err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    use crate::cache::Lookup;
    use crate::router::tests::setup_state;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs.iter().copied().collect()
    }

    async fn invoice_count(state: &AppState) -> i64 {
        state
            .storage()
            .invoices()
            .card_data()
            .await
            .expect("cards")
            .number_of_invoices
    }

    async fn seed_customer(state: &AppState) -> String {
        state
            .storage()
            .customers()
            .insert(&CustomerInput {
                name: "Evil Rabbit".into(),
                email: "evil@rabbit.com".into(),
                image_url: "/customers/evil-rabbit.png".into(),
            })
            .await
            .expect("seed customer")
    }

    #[tokio::test]
    async fn zero_amount_is_rejected_without_writing() {
        let state = setup_state().await;
        let customer_id = seed_customer(&state).await;

        let outcome = create_invoice(
            &state,
            &form(&[("customerId", customer_id.as_str()), ("amount", "0"), ("status", "pending")]),
        )
        .await;

        let form_state = outcome.expect_err("validation should fail");
        assert_eq!(
            form_state.errors.get("amount"),
            ["Please enter an amount greater than $0.".to_string()]
        );
        assert_eq!(
            form_state.message.as_deref(),
            Some("Missing Fields. Failed to Create Invoice.")
        );
        assert_eq!(invoice_count(&state).await, 0);
    }

    #[tokio::test]
    async fn valid_invoice_is_stored_in_cents_with_todays_date() {
        let fixed = Utc.with_ymd_and_hms(2026, 10, 18, 23, 30, 0).unwrap();
        let state = setup_state().await.with_clock(Arc::new(move || fixed));
        let customer_id = seed_customer(&state).await;

        let outcome = create_invoice(
            &state,
            &form(&[("customerId", customer_id.as_str()), ("amount", "45.50"), ("status", "paid")]),
        )
        .await;
        assert_eq!(outcome, Ok(RedirectTo("/dashboard/invoices")));

        let rows = state
            .storage()
            .invoices()
            .fetch_filtered("", 1)
            .await
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, 4550);
        assert_eq!(rows[0].status, dashboard_core::InvoiceStatus::Paid);
        assert_eq!(rows[0].date.to_string(), "2026-10-18");
    }

    #[tokio::test]
    async fn unknown_customer_yields_generic_database_message() {
        let state = setup_state().await;

        let outcome = create_invoice(
            &state,
            &form(&[("customerId", "123"), ("amount", "10"), ("status", "paid")]),
        )
        .await;

        let form_state = outcome.expect_err("insert should fail");
        assert!(form_state.errors.is_empty());
        assert_eq!(
            form_state.message.as_deref(),
            Some("Database Error: Failed to Create Invoice.")
        );
        assert_eq!(invoice_count(&state).await, 0);
    }

    #[tokio::test]
    async fn successful_mutation_revalidates_list_cache() {
        let state = setup_state().await;
        let customer_id = seed_customer(&state).await;
        if let Lookup::Miss(ticket) = state.cache().lookup("/dashboard/invoices", "page=1") {
            state.cache().fill(ticket, "stale");
        }

        create_invoice(
            &state,
            &form(&[("customerId", customer_id.as_str()), ("amount", "1"), ("status", "pending")]),
        )
        .await
        .expect("create");

        assert!(matches!(
            state.cache().lookup("/dashboard/invoices", "page=1"),
            Lookup::Miss(_)
        ));
    }

    #[tokio::test]
    async fn update_of_missing_invoice_reports_not_found() {
        let state = setup_state().await;
        let customer_id = seed_customer(&state).await;

        let outcome = update_invoice(
            &state,
            "missing",
            &form(&[("customerId", customer_id.as_str()), ("amount", "1"), ("status", "paid")]),
        )
        .await;

        assert_eq!(
            outcome.expect_err("should fail").message.as_deref(),
            Some("Invoice not found. Failed to Update Invoice.")
        );
    }

    #[tokio::test]
    async fn deleting_twice_is_harmless() {
        let state = setup_state().await;
        let customer_id = seed_customer(&state).await;
        create_invoice(
            &state,
            &form(&[("customerId", customer_id.as_str()), ("amount", "1"), ("status", "pending")]),
        )
        .await
        .expect("create");
        let id = state
            .storage()
            .invoices()
            .fetch_latest(1)
            .await
            .expect("latest")
            .remove(0)
            .id;

        assert_eq!(delete_invoice(&state, &id).await, Ok("Deleted Invoice.".to_string()));
        assert_eq!(delete_invoice(&state, &id).await, Ok("Deleted Invoice.".to_string()));
        assert_eq!(invoice_count(&state).await, 0);
    }

    #[tokio::test]
    async fn customer_with_invoices_cannot_be_deleted() {
        let state = setup_state().await;
        let customer_id = seed_customer(&state).await;
        create_invoice(
            &state,
            &form(&[("customerId", customer_id.as_str()), ("amount", "1"), ("status", "pending")]),
        )
        .await
        .expect("create");

        assert_eq!(
            delete_customer(&state, &customer_id).await,
            Err("Database Error: Failed to Delete Customer.".to_string())
        );
        assert!(state
            .storage()
            .customers()
            .fetch_by_id(&customer_id)
            .await
            .expect("fetch")
            .is_some());
    }

    #[tokio::test]
    async fn customer_update_requires_every_field() {
        let state = setup_state().await;
        let customer_id = seed_customer(&state).await;

        let outcome =
            update_customer(&state, &customer_id, &form(&[("name", "Renamed")])).await;
        let form_state = outcome.expect_err("partial update rejected");
        assert!(form_state.errors.contains("email"));
        assert!(form_state.errors.contains("image_url"));

        let stored = state
            .storage()
            .customers()
            .fetch_by_id(&customer_id)
            .await
            .expect("fetch")
            .expect("present");
        assert_eq!(stored.name, "Evil Rabbit");
    }
}
