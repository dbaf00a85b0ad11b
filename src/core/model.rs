//! Domain records for the dashboard
//!
//! Amounts are always integer minor units (cents) once they leave the
//! validator. Read models mirror the shapes the dashboard views consume.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Invoice payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    /// Exact match only: `"Paid"` or `" paid"` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(format!("unknown invoice status '{}'", other)),
        }
    }
}

/// A stored invoice row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub customer_id: String,
    /// Minor currency units
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Row handed to the store on create. The store assigns the identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoiceRow {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Columns overwritten on update. Identifier and date are not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// A dashboard user. `password` holds a bcrypt hash, never plain text.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Monthly revenue in whole dollars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub month: String,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestInvoice {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub email: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicesTableRow {
    pub id: Uuid,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// Customer choice for the invoice forms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerField {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomersTableRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: i64,
    pub total_paid: i64,
}

/// Invoice as shown in the edit form, amount back in major units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceForm {
    pub id: Uuid,
    pub customer_id: String,
    pub amount: f64,
    pub status: InvoiceStatus,
}

impl From<Invoice> for InvoiceForm {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: invoice.amount as f64 / 100.0,
            status: invoice.status,
        }
    }
}

/// Totals shown on the overview cards
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardData {
    pub number_of_invoices: i64,
    pub number_of_customers: i64,
    pub total_paid_invoices: i64,
    pub total_pending_invoices: i64,
}
