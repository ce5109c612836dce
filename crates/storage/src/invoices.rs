use chrono::NaiveDate;
use dashboard_core::model::UnknownStatus;
use dashboard_core::pagination::{offset, total_pages, ITEMS_PER_PAGE};
use dashboard_core::{CardData, Invoice, InvoiceInput, InvoiceRow, InvoiceStatus};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::{contains_pattern, generate_id, is_foreign_key_violation};

const SEARCH_CLAUSE: &str = r#"
 WHERE c.name_search LIKE ? ESCAPE '\'
    OR c.email_search LIKE ? ESCAPE '\'
    OR CAST(i.amount AS TEXT) LIKE ? ESCAPE '\'
    OR i.date LIKE ? ESCAPE '\'
    OR i.status LIKE ? ESCAPE '\'
"#;
const SEARCH_BINDS: usize = 5;

/// Repository responsible for the `invoices` table.
#[derive(Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists one page of invoices matching `query`, newest first.
    pub async fn fetch_filtered(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceRow>, InvoiceError> {
        let sql = format!(
            r#"
SELECT i.id,
       i.customer_id,
       c.name,
       c.email,
       c.image_url,
       i.amount,
       i.status,
       i.date
  FROM invoices AS i
  JOIN customers AS c
    ON c.id = i.customer_id
{SEARCH_CLAUSE}
 ORDER BY i.date DESC, i.id ASC
 LIMIT ? OFFSET ?
            "#
        );
        let pattern = contains_pattern(query);
        let mut statement = sqlx::query_as::<_, InvoiceJoinedRow>(&sql);
        for _ in 0..SEARCH_BINDS {
            statement = statement.bind(pattern.clone());
        }
        let rows = statement
            .bind(i64::from(ITEMS_PER_PAGE))
            .bind(offset(page))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(InvoiceJoinedRow::into_domain).collect()
    }

    /// Number of pages the unpaginated result of `query` spans.
    pub async fn count_pages(&self, query: &str) -> Result<u32, InvoiceError> {
        let sql = format!(
            r#"
SELECT COUNT(*)
  FROM invoices AS i
  JOIN customers AS c
    ON c.id = i.customer_id
{SEARCH_CLAUSE}
            "#
        );
        let pattern = contains_pattern(query);
        let mut statement = sqlx::query_as::<_, (i64,)>(&sql);
        for _ in 0..SEARCH_BINDS {
            statement = statement.bind(pattern.clone());
        }
        let (count,) = statement.fetch_one(&self.pool).await?;

        Ok(total_pages(count))
    }

    /// Loads a single invoice by identifier.
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<Invoice>, InvoiceError> {
        let row = sqlx::query_as::<_, InvoiceTableRow>(
            "SELECT id, customer_id, amount, status, date FROM invoices WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(InvoiceTableRow::into_domain).transpose()
    }

    /// Returns the `limit` most recently issued invoices.
    pub async fn fetch_latest(&self, limit: u32) -> Result<Vec<InvoiceRow>, InvoiceError> {
        let rows = sqlx::query_as::<_, InvoiceJoinedRow>(
            r#"
SELECT i.id,
       i.customer_id,
       c.name,
       c.email,
       c.image_url,
       i.amount,
       i.status,
       i.date
  FROM invoices AS i
  JOIN customers AS c
    ON c.id = i.customer_id
 ORDER BY i.date DESC, i.id ASC
 LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InvoiceJoinedRow::into_domain).collect()
    }

    /// Computes the totals shown on the overview cards.
    pub async fn card_data(&self) -> Result<CardData, InvoiceError> {
        let (number_of_customers, number_of_invoices, total_paid, total_pending): (
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
SELECT (SELECT COUNT(*) FROM customers),
       (SELECT COUNT(*) FROM invoices),
       (SELECT COALESCE(SUM(amount), 0) FROM invoices WHERE status = 'paid'),
       (SELECT COALESCE(SUM(amount), 0) FROM invoices WHERE status = 'pending')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CardData {
            number_of_customers,
            number_of_invoices,
            total_paid,
            total_pending,
        })
    }

    /// Inserts an invoice and returns its generated identifier.
    pub async fn insert(&self, invoice: &NewInvoice<'_>) -> Result<String, InvoiceError> {
        let id = generate_id();
        sqlx::query(
            "INSERT INTO invoices (id, customer_id, amount, status, date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(invoice.customer_id)
        .bind(invoice.amount_cents)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(id)
    }

    /// Replaces customer, amount and status of the identified invoice.
    ///
    /// The issue date is never rewritten.
    pub async fn update(&self, id: &str, input: &InvoiceInput) -> Result<(), InvoiceError> {
        let result =
            sqlx::query("UPDATE invoices SET customer_id = ?, amount = ?, status = ? WHERE id = ?")
                .bind(&input.customer_id)
                .bind(input.amount_cents)
                .bind(input.status.as_str())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(InvoiceError::NotFound);
        }
        Ok(())
    }

    /// Deletes the identified invoice, returning how many rows were removed.
    pub async fn delete(&self, id: &str) -> Result<u64, InvoiceError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn map_write_error(err: sqlx::Error) -> InvoiceError {
    if is_foreign_key_violation(&err) {
        InvoiceError::UnknownCustomer
    } else {
        InvoiceError::Database(err)
    }
}

/// Parameters required to insert an invoice.
pub struct NewInvoice<'a> {
    pub customer_id: &'a str,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl<'a> NewInvoice<'a> {
    /// Stamps validated form input with its issue date.
    pub fn from_input(input: &'a InvoiceInput, date: NaiveDate) -> Self {
        Self {
            customer_id: &input.customer_id,
            amount_cents: input.amount_cents,
            status: input.status,
            date,
        }
    }
}

/// Errors that can occur while reading or mutating invoices.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("invoice not found")]
    NotFound,
    #[error("invoice references an unknown customer")]
    UnknownCustomer,
    #[error("stored invoice is invalid: {0}")]
    Decode(#[from] UnknownStatus),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceTableRow {
    id: String,
    customer_id: String,
    amount: i64,
    status: String,
    date: NaiveDate,
}

impl InvoiceTableRow {
    fn into_domain(self) -> Result<Invoice, InvoiceError> {
        Ok(Invoice {
            id: self.id,
            customer_id: self.customer_id,
            amount: self.amount,
            status: self.status.parse()?,
            date: self.date,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceJoinedRow {
    id: String,
    customer_id: String,
    name: String,
    email: String,
    image_url: String,
    amount: i64,
    status: String,
    date: NaiveDate,
}

impl InvoiceJoinedRow {
    fn into_domain(self) -> Result<InvoiceRow, InvoiceError> {
        Ok(InvoiceRow {
            id: self.id,
            customer_id: self.customer_id,
            name: self.name,
            email: self.email,
            image_url: self.image_url,
            amount: self.amount,
            status: self.status.parse()?,
            date: self.date,
        })
    }
}
