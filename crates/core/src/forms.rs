use std::sync::LazyLock;

use serde::Serialize;

use crate::model::InvoiceStatus;
use crate::validation::{amount_to_cents, FieldErrors, FormData, Rule, Schema};

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_IMAGE_URL: &str = "image_url";
pub const FIELD_CUSTOMER_ID: &str = "customerId";
pub const FIELD_AMOUNT: &str = "amount";
pub const FIELD_STATUS: &str = "status";

const STATUS_OPTIONS: &[&str] = &["pending", "paid"];

static CUSTOMER_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .rule(FIELD_NAME, Rule::Required, "Please enter a customer name.")
        .rule(FIELD_EMAIL, Rule::Required, "Please enter a valid email address.")
        .rule(FIELD_EMAIL, Rule::Email, "Please enter a valid email address.")
        .rule(FIELD_IMAGE_URL, Rule::Required, "Please enter an image URL.")
});

static INVOICE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .rule(FIELD_CUSTOMER_ID, Rule::Required, "Please select a customer.")
        .rule(FIELD_AMOUNT, Rule::Number, "Please enter a valid amount.")
        .rule(
            FIELD_AMOUNT,
            Rule::GreaterThanZero,
            "Please enter an amount greater than $0.",
        )
        .rule(
            FIELD_STATUS,
            Rule::OneOf(STATUS_OPTIONS),
            "Please select an invoice status.",
        )
});

/// Validated fields for creating or replacing a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub image_url: String,
}

impl CustomerInput {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        CUSTOMER_SCHEMA.validate(form)?;
        Ok(Self {
            name: required(form, FIELD_NAME)?,
            email: required(form, FIELD_EMAIL)?,
            image_url: required(form, FIELD_IMAGE_URL)?,
        })
    }
}

/// Validated fields for creating or replacing an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceInput {
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}

impl InvoiceInput {
    pub fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        INVOICE_SCHEMA.validate(form)?;

        let amount_cents = amount_to_cents(form.get(FIELD_AMOUNT))
            .ok_or_else(|| single_error(FIELD_AMOUNT, "Please enter a valid amount."))?;
        let status = form
            .trimmed(FIELD_STATUS)
            .unwrap_or_default()
            .parse::<InvoiceStatus>()
            .map_err(|_| single_error(FIELD_STATUS, "Please select an invoice status."))?;

        Ok(Self {
            customer_id: required(form, FIELD_CUSTOMER_ID)?,
            amount_cents,
            status,
        })
    }
}

fn required(form: &FormData, field: &str) -> Result<String, FieldErrors> {
    form.trimmed(field)
        .map(str::to_string)
        .ok_or_else(|| single_error(field, "This field is required."))
}

fn single_error(field: &str, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.push(field, message);
    errors
}

/// Record type a mutation applies to; drives messages and list paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Customer,
    Invoice,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Invoice => "invoice",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Invoice => "Invoice",
        }
    }

    /// Path of the list view that must be revalidated after a mutation.
    pub fn list_path(self) -> &'static str {
        match self {
            Self::Customer => "/dashboard/customers",
            Self::Invoice => "/dashboard/invoices",
        }
    }
}

/// The mutation a form submission performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

/// Top-level message when a submission fails validation.
pub fn missing_fields_message(entity: Entity, op: Operation) -> String {
    format!("Missing Fields. Failed to {} {}.", op.title(), entity.title())
}

/// Top-level message when the database rejects a write.
pub fn database_error_message(entity: Entity, op: Operation) -> String {
    format!("Database Error: Failed to {} {}.", op.title(), entity.title())
}

/// Top-level message when an update targets an unknown identifier.
pub fn not_found_message(entity: Entity, op: Operation) -> String {
    format!(
        "{} not found. Failed to {} {}.",
        entity.title(),
        op.title(),
        entity.title()
    )
}

/// Message returned after a successful delete.
pub fn deleted_message(entity: Entity) -> String {
    format!("Deleted {}.", entity.title())
}

/// Outcome of a failed create or update, rendered back into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub errors: FieldErrors,
    pub message: Option<String>,
}

impl FormState {
    pub fn invalid(errors: FieldErrors, entity: Entity, op: Operation) -> Self {
        Self {
            errors,
            message: Some(missing_fields_message(entity, op)),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: FieldErrors::new(),
            message: Some(message.into()),
        }
    }
}
