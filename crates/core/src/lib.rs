//! Domain types and pure logic for the billing dashboard.
//!
//! Nothing in this crate performs I/O: it validates submitted forms, models
//! customers and invoices, and computes pagination and display formatting.

pub mod format;
pub mod forms;
pub mod model;
pub mod pagination;
pub mod validation;

pub use forms::{CustomerInput, Entity, FormState, InvoiceInput, Operation};
pub use model::{
    CardData, Customer, CustomerField, CustomerSummary, Invoice, InvoiceRow, InvoiceStatus,
};
pub use validation::{FieldErrors, FormData};
