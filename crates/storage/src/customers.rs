use dashboard_core::pagination::{offset, total_pages, ITEMS_PER_PAGE};
use dashboard_core::{Customer, CustomerField, CustomerInput, CustomerSummary};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::{contains_pattern, generate_id, is_foreign_key_violation, search_key};

/// Repository responsible for the `customers` table.
#[derive(Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists one page of customers whose name or email contains `query`,
    /// together with their invoice totals.
    pub async fn fetch_filtered(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<CustomerSummary>, CustomerError> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query_as::<_, CustomerSummaryRow>(
            r#"
SELECT c.id,
       c.name,
       c.email,
       c.image_url,
       COUNT(i.id) AS total_invoices,
       COALESCE(SUM(CASE WHEN i.status = 'pending' THEN i.amount ELSE 0 END), 0) AS total_pending,
       COALESCE(SUM(CASE WHEN i.status = 'paid' THEN i.amount ELSE 0 END), 0) AS total_paid
  FROM customers AS c
  LEFT JOIN invoices AS i
    ON i.customer_id = c.id
 WHERE c.name_search LIKE ? ESCAPE '\'
    OR c.email_search LIKE ? ESCAPE '\'
 GROUP BY c.id, c.name, c.email, c.image_url
 ORDER BY c.name ASC, c.id ASC
 LIMIT ? OFFSET ?
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(i64::from(ITEMS_PER_PAGE))
        .bind(offset(page))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CustomerSummaryRow::into_domain).collect())
    }

    /// Number of pages the unpaginated result of `query` spans.
    pub async fn count_pages(&self, query: &str) -> Result<u32, CustomerError> {
        let pattern = contains_pattern(query);
        let (count,): (i64,) = sqlx::query_as(
            r#"
SELECT COUNT(*)
  FROM customers AS c
 WHERE c.name_search LIKE ? ESCAPE '\'
    OR c.email_search LIKE ? ESCAPE '\'
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(total_pages(count))
    }

    /// Loads a single customer by identifier.
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<Customer>, CustomerError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email, image_url FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CustomerRow::into_domain))
    }

    /// Lists every customer as a select option, ordered by name.
    pub async fn list_fields(&self) -> Result<Vec<CustomerField>, CustomerError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, name FROM customers ORDER BY name ASC, id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| CustomerField { id, name })
            .collect())
    }

    /// Inserts a customer and returns its generated identifier.
    pub async fn insert(&self, input: &CustomerInput) -> Result<String, CustomerError> {
        let id = generate_id();
        sqlx::query(
            r#"
INSERT INTO customers (id, name, email, image_url, name_search, email_search)
VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.image_url)
        .bind(search_key(&input.name))
        .bind(search_key(&input.email))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Replaces every editable field of the identified customer.
    pub async fn update(&self, id: &str, input: &CustomerInput) -> Result<(), CustomerError> {
        let result = sqlx::query(
            r#"
UPDATE customers
   SET name = ?, email = ?, image_url = ?, name_search = ?, email_search = ?
 WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.image_url)
        .bind(search_key(&input.name))
        .bind(search_key(&input.email))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CustomerError::NotFound);
        }
        Ok(())
    }

    /// Deletes the identified customer, returning how many rows were removed.
    ///
    /// Customers that still own invoices are rejected with
    /// [`CustomerError::HasInvoices`].
    pub async fn delete(&self, id: &str) -> Result<u64, CustomerError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    CustomerError::HasInvoices
                } else {
                    CustomerError::Database(err)
                }
            })?;

        Ok(result.rows_affected())
    }
}

/// Errors that can occur while reading or mutating customers.
#[derive(Debug, Error)]
pub enum CustomerError {
    #[error("customer not found")]
    NotFound,
    #[error("customer still has invoices")]
    HasInvoices,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    name: String,
    email: String,
    image_url: String,
}

impl CustomerRow {
    fn into_domain(self) -> Customer {
        Customer {
            id: self.id,
            name: self.name,
            email: self.email,
            image_url: self.image_url,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerSummaryRow {
    id: String,
    name: String,
    email: String,
    image_url: String,
    total_invoices: i64,
    total_pending: i64,
    total_paid: i64,
}

impl CustomerSummaryRow {
    fn into_domain(self) -> CustomerSummary {
        CustomerSummary {
            id: self.id,
            name: self.name,
            email: self.email,
            image_url: self.image_url,
            total_invoices: self.total_invoices,
            total_pending: self.total_pending,
            total_paid: self.total_paid,
        }
    }
}
