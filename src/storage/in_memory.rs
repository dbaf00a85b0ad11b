//! In-memory implementation of the dashboard store for testing and development

use crate::core::model::{
    CardData, Customer, CustomerField, CustomersTableRow, Invoice, InvoiceChanges, InvoiceStatus,
    InvoicesTableRow, LatestInvoice, NewInvoiceRow, Revenue, User,
};
use crate::core::service::{CustomerService, DashboardService, InvoiceService, UserService};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory dashboard store
///
/// Tables keep insertion order. Uses RwLock for thread-safe access; clones
/// share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    invoices: Arc<RwLock<IndexMap<Uuid, Invoice>>>,
    customers: Arc<RwLock<IndexMap<String, Customer>>>,
    users: Arc<RwLock<IndexMap<Uuid, User>>>,
    revenue: Arc<RwLock<Vec<Revenue>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a customer
    pub fn insert_customer(&self, customer: Customer) -> Result<()> {
        let mut customers = self
            .customers
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        customers.insert(customer.id.clone(), customer);
        Ok(())
    }

    /// Insert or replace a user
    pub fn insert_user(&self, user: User) -> Result<()> {
        let mut users = self
            .users
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        users.insert(user.id, user);
        Ok(())
    }

    /// Insert or replace an invoice with a known identifier
    pub fn insert_invoice(&self, invoice: Invoice) -> Result<()> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        invoices.insert(invoice.id, invoice);
        Ok(())
    }

    /// Upsert a month's revenue, keeping first-seen month order
    pub fn insert_revenue(&self, entry: Revenue) -> Result<()> {
        let mut revenue = self
            .revenue
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        match revenue.iter_mut().find(|r| r.month == entry.month) {
            Some(existing) => existing.revenue = entry.revenue,
            None => revenue.push(entry),
        }
        Ok(())
    }

    /// Invoices joined with their customer, newest first
    fn joined_rows(&self, term: &str) -> Result<Vec<InvoicesTableRow>> {
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let needle = term.to_lowercase();
        let mut rows: Vec<InvoicesTableRow> = invoices
            .values()
            .filter_map(|invoice| {
                let customer = customers.get(&invoice.customer_id)?;
                Some(InvoicesTableRow {
                    id: invoice.id,
                    customer_id: invoice.customer_id.clone(),
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    image_url: customer.image_url.clone(),
                    date: invoice.date,
                    amount: invoice.amount,
                    status: invoice.status,
                })
            })
            .filter(|row| needle.is_empty() || invoice_matches(row, &needle))
            .collect();

        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }
}

fn invoice_matches(row: &InvoicesTableRow, needle: &str) -> bool {
    row.name.to_lowercase().contains(needle)
        || row.email.to_lowercase().contains(needle)
        || row.amount.to_string().contains(needle)
        || row.date.format("%Y-%m-%d").to_string().contains(needle)
        || row.status.as_str().contains(needle)
}

#[async_trait]
impl InvoiceService for InMemoryStore {
    async fn create(&self, row: NewInvoiceRow) -> Result<Uuid> {
        let invoice = Invoice {
            id: Uuid::new_v4(),
            customer_id: row.customer_id,
            amount: row.amount,
            status: row.status,
            date: row.date,
        };
        let id = invoice.id;
        self.insert_invoice(invoice)?;
        Ok(id)
    }

    async fn update(&self, id: &Uuid, changes: InvoiceChanges) -> Result<u64> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match invoices.get_mut(id) {
            Some(invoice) => {
                invoice.customer_id = changes.customer_id;
                invoice.amount = changes.amount;
                invoice.status = changes.status;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<u64> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(u64::from(invoices.shift_remove(id).is_some()))
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Invoice>> {
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(invoices.get(id).cloned())
    }

    async fn latest(&self, limit: usize) -> Result<Vec<LatestInvoice>> {
        Ok(self
            .joined_rows("")?
            .into_iter()
            .take(limit)
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
        Ok(self
            .joined_rows(term)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count_matching(&self, term: &str) -> Result<usize> {
        Ok(self.joined_rows(term)?.len())
    }
}

#[async_trait]
impl CustomerService for InMemoryStore {
    async fn list_fields(&self) -> Result<Vec<CustomerField>> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut fields: Vec<CustomerField> = customers
            .values()
            .map(|c| CustomerField {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fields)
    }

    async fn search(&self, term: &str) -> Result<Vec<CustomersTableRow>> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let needle = term.to_lowercase();
        let mut rows: Vec<CustomersTableRow> = customers
            .values()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle) || c.email.to_lowercase().contains(&needle)
            })
            .map(|c| -> Result<CustomersTableRow> {
                let totals =
                    StatusTotals::sum(invoices.values().filter(|i| i.customer_id == c.id))?;
                Ok(CustomersTableRow {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    email: c.email.clone(),
                    image_url: c.image_url.clone(),
                    total_invoices: totals.count,
                    total_pending: totals.pending,
                    total_paid: totals.paid,
                })
            })
            .collect::<Result<_>>()?;

        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }
}

#[async_trait]
impl UserService for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl DashboardService for InMemoryStore {
    async fn revenue(&self) -> Result<Vec<Revenue>> {
        let revenue = self
            .revenue
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(revenue.clone())
    }

    async fn card_data(&self) -> Result<CardData> {
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let totals = StatusTotals::sum(invoices.values())?;
        Ok(CardData {
            number_of_invoices: totals.count,
            number_of_customers: customers.len() as i64,
            total_paid_invoices: totals.paid,
            total_pending_invoices: totals.pending,
        })
    }
}

/// Invoice count and per-status amount totals in minor units
struct StatusTotals {
    count: i64,
    pending: i64,
    paid: i64,
}

impl StatusTotals {
    /// Sums in `i128`; a total past the `i64` range is an error, matching
    /// the BIGINT cast of the SQL backend.
    fn sum<'a>(invoices: impl Iterator<Item = &'a Invoice>) -> Result<Self> {
        let (mut count, mut pending, mut paid) = (0i64, 0i128, 0i128);
        for invoice in invoices {
            count += 1;
            match invoice.status {
                InvoiceStatus::Pending => pending += i128::from(invoice.amount),
                InvoiceStatus::Paid => paid += i128::from(invoice.amount),
            }
        }

        let narrow = |total: i128, status: &str| {
            i64::try_from(total)
                .map_err(|_| anyhow!("{} invoice total {} exceeds the supported range", status, total))
        };
        Ok(Self {
            count,
            pending: narrow(pending, "pending")?,
            paid: narrow(paid, "paid")?,
        })
    }
}
