mod customers;
mod invoices;

use std::{str::FromStr, time::Duration};

use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use thiserror::Error;
use uuid::Uuid;

pub use customers::{CustomerError, CustomerRepository};
pub use invoices::{InvoiceError, InvoiceRepository, NewInvoice};

/// SQLite extended result code for a violated `REFERENCES` constraint.
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    ///
    /// Every pooled connection enforces foreign keys; file-backed databases
    /// additionally run in WAL mode.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !database_url.contains(":memory:") {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle for the `customers` table.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Returns a handle for the `invoices` table.
    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.pool.clone())
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Case-folded form of a searchable column, stored next to the original.
fn search_key(value: &str) -> String {
    value.to_lowercase()
}

/// Builds a `LIKE` pattern matching the case-folded `query` anywhere,
/// escaping wildcards.
///
/// Statements using the pattern must declare `ESCAPE '\'` and compare it
/// against `*_search` columns.
fn contains_pattern(query: &str) -> String {
    let folded = search_key(query.trim());
    let mut pattern = String::with_capacity(folded.len() + 2);
    pattern.push('%');
    for c in folded.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(SQLITE_CONSTRAINT_FOREIGNKEY)
        }
        _ => false,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{search_key, Database};

    pub async fn setup_db() -> Database {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("connect");
        db.run_migrations().await.expect("migrations");
        db
    }

    pub async fn insert_customer(db: &Database, id: &str, name: &str, email: &str) {
        sqlx::query(
            "INSERT INTO customers (id, name, email, image_url, name_search, email_search) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(format!("/customers/{id}.png"))
        .bind(search_key(name))
        .bind(search_key(email))
            .execute(db.pool())
            .await
            .expect("insert customer");
    }

    pub async fn insert_invoice(
        db: &Database,
        id: &str,
        customer_id: &str,
        amount: i64,
        status: &str,
        date: &str,
    ) {
        sqlx::query(
            "INSERT INTO invoices (id, customer_id, amount, status, date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(customer_id)
        .bind(amount)
        .bind(status)
        .bind(date)
        .execute(db.pool())
        .await
        .expect("insert invoice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(""), "%%");
        assert_eq!(contains_pattern(" amy "), "%amy%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("ÉLODIE"), "%élodie%");
    }

    #[tokio::test]
    async fn migrations_apply() {
        let db = test_support::setup_db().await;

        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('customers', 'invoices')",
        )
        .fetch_one(db.pool())
        .await
        .expect("fetch tables");
        assert_eq!(tables.0, 2);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_support::setup_db().await;
        let err = sqlx::query(
            "INSERT INTO invoices (id, customer_id, amount, status, date) VALUES ('i', 'missing', 1, 'paid', '2024-01-01')",
        )
        .execute(db.pool())
        .await
        .expect_err("orphan invoice should be rejected");
        assert!(is_foreign_key_violation(&err));
    }

    #[tokio::test]
    async fn file_database_persists_between_connections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("dashboard.db").display());

        let db = Database::connect(&url).await.expect("connect");
        db.run_migrations().await.expect("migrations");
        test_support::insert_customer(&db, "c-1", "Amy Burns", "amy@burns.com").await;
        db.pool().close().await;

        let reopened = Database::connect(&url).await.expect("reconnect");
        reopened.run_migrations().await.expect("migrations are idempotent");
        let customer = reopened
            .customers()
            .fetch_by_id("c-1")
            .await
            .expect("query");
        assert_eq!(customer.map(|c| c.name), Some("Amy Burns".to_string()));
    }
}
