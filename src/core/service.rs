//! Service traits for the dashboard's persistent store
//!
//! Implementations provide the reads and writes the dashboard needs. The
//! pipeline is agnostic to the underlying storage mechanism; every store
//! failure surfaces as an `anyhow::Error`.

use crate::core::model::{
    CardData, CustomerField, CustomersTableRow, Invoice, InvoiceChanges, InvoicesTableRow,
    LatestInvoice, NewInvoiceRow, Revenue, User,
};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for invoice rows
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// Insert a new invoice; the store assigns and returns the identifier
    async fn create(&self, row: NewInvoiceRow) -> Result<Uuid>;

    /// Overwrite customer, amount and status; returns rows affected
    async fn update(&self, id: &Uuid, changes: InvoiceChanges) -> Result<u64>;

    /// Remove an invoice; returns rows affected
    async fn delete(&self, id: &Uuid) -> Result<u64>;

    /// Get an invoice by ID
    async fn get(&self, id: &Uuid) -> Result<Option<Invoice>>;

    /// Most recent invoices joined with their customer
    async fn latest(&self, limit: usize) -> Result<Vec<LatestInvoice>>;

    /// One page of invoices matching a search term, newest first
    ///
    /// The term is matched case-insensitively against customer name and
    /// email, the amount in minor units, the ISO date and the status.
    async fn search(&self, term: &str, limit: usize, offset: usize)
    -> Result<Vec<InvoicesTableRow>>;

    /// Number of invoices matching a search term
    async fn count_matching(&self, term: &str) -> Result<usize>;
}

/// Service trait for customer reads
#[async_trait]
pub trait CustomerService: Send + Sync {
    /// All customers as form choices, ordered by name
    async fn list_fields(&self) -> Result<Vec<CustomerField>>;

    /// Customers matching a search term on name or email, with invoice totals
    async fn search(&self, term: &str) -> Result<Vec<CustomersTableRow>>;
}

/// Service trait for user lookup during sign-in
#[async_trait]
pub trait UserService: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Service trait for the overview page aggregates
#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn revenue(&self) -> Result<Vec<Revenue>>;

    async fn card_data(&self) -> Result<CardData>;
}

/// A store backing every dashboard service
///
/// Blanket-implemented, so any type providing the four services can be
/// handed to the server builder as one value.
pub trait DashboardStore:
    InvoiceService + CustomerService + UserService + DashboardService + 'static
{
}

impl<T> DashboardStore for T where
    T: InvoiceService + CustomerService + UserService + DashboardService + 'static
{
}
