//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresStore`, which implements every dashboard service
//! over a `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! invoice-dashboard = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Tables come from `migrations/` (see [`PostgresStore::run_migrations`]).
//! Amounts are `BIGINT` minor units; search uses `ILIKE` with LIKE
//! wildcards in the term escaped.

use super::seed::SeedData;
use crate::core::error::StorageError;
use crate::core::model::{
    CardData, CustomerField, CustomersTableRow, Invoice, InvoiceChanges, InvoiceStatus,
    InvoicesTableRow, LatestInvoice, NewInvoiceRow, Revenue, User,
};
use crate::core::service::{CustomerService, DashboardService, InvoiceService, UserService};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    customer_id: String,
    amount: i64,
    status: String,
    date: NaiveDate,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = anyhow::Error;

    fn try_from(row: InvoiceRow) -> Result<Self> {
        Ok(Invoice {
            id: row.id,
            customer_id: row.customer_id,
            amount: row.amount,
            status: parse_status(&row.status)?,
            date: row.date,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InvoicesTableDbRow {
    id: Uuid,
    customer_id: String,
    name: String,
    email: String,
    image_url: String,
    date: NaiveDate,
    amount: i64,
    status: String,
}

impl TryFrom<InvoicesTableDbRow> for InvoicesTableRow {
    type Error = anyhow::Error;

    fn try_from(row: InvoicesTableDbRow) -> Result<Self> {
        Ok(InvoicesTableRow {
            id: row.id,
            customer_id: row.customer_id,
            name: row.name,
            email: row.email,
            image_url: row.image_url,
            date: row.date,
            amount: row.amount,
            status: parse_status(&row.status)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LatestInvoiceRow {
    id: Uuid,
    name: String,
    image_url: String,
    email: String,
    amount: i64,
}

#[derive(sqlx::FromRow)]
struct CustomersTableDbRow {
    id: String,
    name: String,
    email: String,
    image_url: String,
    total_invoices: i64,
    total_pending: i64,
    total_paid: i64,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password: String,
}

fn parse_status(value: &str) -> Result<InvoiceStatus> {
    value
        .parse::<InvoiceStatus>()
        .map_err(|e| anyhow!("Invalid status in invoices table: {}", e))
}

/// `%term%` with LIKE wildcards in the term matched literally
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn query_error(context: &str, error: sqlx::Error) -> StorageError {
    StorageError::QueryError {
        backend: "PostgreSQL".to_string(),
        message: format!("{}: {}", context, error),
    }
}

const INVOICE_SEARCH_FILTER: &str = "customers.name ILIKE $1 OR \
     customers.email ILIKE $1 OR \
     invoices.amount::text ILIKE $1 OR \
     invoices.date::text ILIKE $1 OR \
     invoices.status ILIKE $1";

// ---------------------------------------------------------------------------
// PostgresStore
// ---------------------------------------------------------------------------

/// Dashboard store backed by PostgreSQL
///
/// # Example
///
/// ```rust,ignore
/// use dashboard::storage::PostgresStore;
///
/// let store = PostgresStore::connect("postgres://localhost/dashboard", 5).await?;
/// store.run_migrations().await?;
/// let invoices = store.count_matching("").await?;
/// ```
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url`
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StorageError::ConnectionError {
                backend: "PostgreSQL".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply `migrations/` (idempotent)
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationError {
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Insert placeholder rows, skipping ones that already exist
    pub async fn seed(&self, data: &SeedData) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("Failed to begin seed transaction", e))?;

        for user in &data.users {
            sqlx::query(
                "INSERT INTO users (id, name, email, password) VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to seed users", e))?;
        }

        for customer in &data.customers {
            sqlx::query(
                "INSERT INTO customers (id, name, email, image_url) VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(&customer.image_url)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to seed customers", e))?;
        }

        for invoice in &data.invoices {
            sqlx::query(
                "INSERT INTO invoices (id, customer_id, amount, status, date) \
                 VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
            )
            .bind(invoice.id)
            .bind(&invoice.customer_id)
            .bind(invoice.amount)
            .bind(invoice.status.as_str())
            .bind(invoice.date)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to seed invoices", e))?;
        }

        for entry in &data.revenue {
            sqlx::query(
                "INSERT INTO revenue (month, revenue) VALUES ($1, $2) \
                 ON CONFLICT (month) DO NOTHING",
            )
            .bind(&entry.month)
            .bind(entry.revenue)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to seed revenue", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| query_error("Failed to commit seed transaction", e))?;

        tracing::info!(
            users = data.users.len(),
            customers = data.customers.len(),
            invoices = data.invoices.len(),
            "seeded postgres store"
        );
        Ok(())
    }
}

#[async_trait]
impl InvoiceService for PostgresStore {
    async fn create(&self, row: NewInvoiceRow) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO invoices (customer_id, amount, status, date) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&row.customer_id)
        .bind(row.amount)
        .bind(row.status.as_str())
        .bind(row.date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("Failed to create invoice", e))?;

        Ok(id)
    }

    async fn update(&self, id: &Uuid, changes: InvoiceChanges) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE invoices SET customer_id = $1, amount = $2, status = $3 WHERE id = $4",
        )
        .bind(&changes.customer_id)
        .bind(changes.amount)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to update invoice", e))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to delete invoice", e))?;

        Ok(result.rows_affected())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, customer_id, amount, status, date FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to get invoice", e))?;

        row.map(Invoice::try_from).transpose()
    }

    async fn latest(&self, limit: usize) -> Result<Vec<LatestInvoice>> {
        let rows = sqlx::query_as::<_, LatestInvoiceRow>(
            "SELECT invoices.id, customers.name, customers.image_url, customers.email, invoices.amount \
             FROM invoices \
             JOIN customers ON invoices.customer_id = customers.id \
             ORDER BY invoices.date DESC \
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to fetch latest invoices", e))?;

        Ok(rows
            .into_iter()
            .map(|row| LatestInvoice {
                id: row.id,
                name: row.name,
                image_url: row.image_url,
                email: row.email,
                amount: row.amount,
            })
            .collect())
    }

    async fn search(
        &self,
        term: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InvoicesTableRow>> {
        let sql = format!(
            "SELECT invoices.id, invoices.customer_id, customers.name, customers.email, \
                    customers.image_url, invoices.date, invoices.amount, invoices.status \
             FROM invoices \
             JOIN customers ON invoices.customer_id = customers.id \
             WHERE {} \
             ORDER BY invoices.date DESC \
             LIMIT $2 OFFSET $3",
            INVOICE_SEARCH_FILTER
        );

        let rows = sqlx::query_as::<_, InvoicesTableDbRow>(&sql)
            .bind(like_pattern(term))
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("Failed to search invoices", e))?;

        rows.into_iter().map(InvoicesTableRow::try_from).collect()
    }

    async fn count_matching(&self, term: &str) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM invoices \
             JOIN customers ON invoices.customer_id = customers.id \
             WHERE {}",
            INVOICE_SEARCH_FILTER
        );

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(like_pattern(term))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("Failed to count invoices", e))?;

        Ok(count.max(0) as usize)
    }
}

#[async_trait]
impl CustomerService for PostgresStore {
    async fn list_fields(&self) -> Result<Vec<CustomerField>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT id, name FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to fetch customers", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| CustomerField { id, name })
            .collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<CustomersTableRow>> {
        let rows = sqlx::query_as::<_, CustomersTableDbRow>(
            "SELECT customers.id, customers.name, customers.email, customers.image_url, \
                    COUNT(invoices.id) AS total_invoices, \
                    COALESCE(SUM(CASE WHEN invoices.status = 'pending' THEN invoices.amount ELSE 0 END), 0)::BIGINT AS total_pending, \
                    COALESCE(SUM(CASE WHEN invoices.status = 'paid' THEN invoices.amount ELSE 0 END), 0)::BIGINT AS total_paid \
             FROM customers \
             LEFT JOIN invoices ON customers.id = invoices.customer_id \
             WHERE customers.name ILIKE $1 OR customers.email ILIKE $1 \
             GROUP BY customers.id, customers.name, customers.email, customers.image_url \
             ORDER BY customers.name ASC",
        )
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to search customers", e))?;

        Ok(rows
            .into_iter()
            .map(|row| CustomersTableRow {
                id: row.id,
                name: row.name,
                email: row.email,
                image_url: row.image_url,
                total_invoices: row.total_invoices,
                total_pending: row.total_pending,
                total_paid: row.total_paid,
            })
            .collect())
    }
}

#[async_trait]
impl UserService for PostgresStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to fetch user", e))?;

        Ok(row.map(|row| User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
        }))
    }
}

#[async_trait]
impl DashboardService for PostgresStore {
    async fn revenue(&self) -> Result<Vec<Revenue>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT month, revenue FROM revenue \
             ORDER BY array_position(\
                ARRAY['Jan','Feb','Mar','Apr','May','Jun','Jul','Aug','Sep','Oct','Nov','Dec']::text[], \
                month::text)",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to fetch revenue", e))?;

        Ok(rows
            .into_iter()
            .map(|(month, revenue)| Revenue { month, revenue })
            .collect())
    }

    async fn card_data(&self) -> Result<CardData> {
        let invoice_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool);
        let customer_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool);
        let totals = sqlx::query_as::<_, (i64, i64)>(
            "SELECT \
                COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END), 0)::BIGINT, \
                COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END), 0)::BIGINT \
             FROM invoices",
        )
        .fetch_one(&self.pool);

        let (number_of_invoices, number_of_customers, (total_paid, total_pending)) =
            tokio::try_join!(invoice_count, customer_count, totals)
                .map_err(|e| query_error("Failed to fetch card data", e))?;

        Ok(CardData {
            number_of_invoices,
            number_of_customers,
            total_paid_invoices: total_paid,
            total_pending_invoices: total_pending,
        })
    }
}
