//! Invoice mutations

use super::{ActionOutcome, FormState};
use crate::core::cache::{INVOICES_PATH, Revalidate};
use crate::core::events::{DashboardEvent, EventBus, InvoiceEvent};
use crate::core::model::{InvoiceChanges, NewInvoiceRow};
use crate::core::service::InvoiceService;
use crate::core::validation::{CreateInvoice, FormData, UpdateInvoice};
use chrono::{NaiveDate, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Source of the issue date stamped on new invoices
pub type DateSource = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Create, update and delete invoices from form submissions
///
/// # Example
///
/// ```rust,ignore
/// let actions = InvoiceActions::new(store.clone(), Arc::new(cache.clone()));
/// match actions.create_invoice(&form).await {
///     ActionOutcome::Redirect(path) => { /* 303 to path */ }
///     ActionOutcome::Invalid(state) => { /* re-render with state.errors */ }
///     _ => { /* ... */ }
/// }
/// ```
#[derive(Clone)]
pub struct InvoiceActions {
    invoices: Arc<dyn InvoiceService>,
    revalidator: Arc<dyn Revalidate>,
    today: DateSource,
    events: Option<EventBus>,
}

impl InvoiceActions {
    pub fn new(invoices: Arc<dyn InvoiceService>, revalidator: Arc<dyn Revalidate>) -> Self {
        Self {
            invoices,
            revalidator,
            today: Arc::new(|| Utc::now().date_naive()),
            events: None,
        }
    }

    /// Replace the date source (UTC today by default)
    pub fn with_date_source(mut self, today: DateSource) -> Self {
        self.today = today;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate and insert a new invoice dated today
    pub async fn create_invoice(&self, form: &FormData) -> ActionOutcome {
        let input = match CreateInvoice::parse(form) {
            Ok(input) => input,
            Err(failure) => return ActionOutcome::Invalid(failure.into()),
        };

        let row = NewInvoiceRow {
            customer_id: input.customer_id,
            amount: input.amount_cents,
            status: input.status,
            date: (self.today)(),
        };

        let invoice_id = match self.invoices.create(row).await {
            Ok(id) => id,
            Err(e) => return store_failure(Mutation::Create, None, e),
        };

        tracing::info!(%invoice_id, "invoice created");
        self.publish(InvoiceEvent::Created { invoice_id });
        self.revalidate();
        ActionOutcome::Redirect(INVOICES_PATH.to_string())
    }

    /// Validate and overwrite customer, amount and status of an invoice
    pub async fn update_invoice(&self, id: Uuid, form: &FormData) -> ActionOutcome {
        let input = match UpdateInvoice::parse(form) {
            Ok(input) => input,
            Err(failure) => return ActionOutcome::Invalid(failure.into()),
        };

        let changes = InvoiceChanges {
            customer_id: input.customer_id,
            amount: input.amount_cents,
            status: input.status,
        };

        let rows_affected = match self.invoices.update(&id, changes).await {
            Ok(rows) => rows,
            Err(e) => return store_failure(Mutation::Update, Some(id), e),
        };

        if rows_affected == 0 {
            tracing::warn!(invoice_id = %id, "update matched no invoice");
        }
        self.publish(InvoiceEvent::Updated {
            invoice_id: id,
            rows_affected,
        });
        self.revalidate();
        ActionOutcome::Redirect(INVOICES_PATH.to_string())
    }

    /// Remove an invoice
    pub async fn delete_invoice(&self, id: Uuid) -> ActionOutcome {
        let rows_affected = match self.invoices.delete(&id).await {
            Ok(rows) => rows,
            Err(e) => return store_failure(Mutation::Delete, Some(id), e),
        };

        if rows_affected == 0 {
            tracing::warn!(invoice_id = %id, "delete matched no invoice");
        }
        self.publish(InvoiceEvent::Deleted {
            invoice_id: id,
            rows_affected,
        });
        self.revalidate();
        ActionOutcome::Deleted
    }

    fn publish(&self, event: InvoiceEvent) {
        if let Some(events) = &self.events {
            events.publish(DashboardEvent::Invoice(event));
        }
    }

    // Best-effort: the write already succeeded.
    fn revalidate(&self) {
        if let Err(e) = self.revalidator.revalidate_path(INVOICES_PATH) {
            tracing::warn!(error = %e, path = INVOICES_PATH, "failed to revalidate path");
        }
    }
}

/// Store write that can fail after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn verb(&self) -> &'static str {
        match self {
            Mutation::Create => "Create",
            Mutation::Update => "Update",
            Mutation::Delete => "Delete",
        }
    }

    /// Summary shown when the store rejects the write
    fn database_error_message(&self) -> String {
        format!("Database Error: Failed to {} Invoice.", self.verb())
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verb().to_lowercase())
    }
}

fn store_failure(mutation: Mutation, id: Option<Uuid>, error: anyhow::Error) -> ActionOutcome {
    match id {
        Some(id) => tracing::error!(%mutation, invoice_id = %id, error = ?error, "invoice store error"),
        None => tracing::error!(%mutation, error = ?error, "invoice store error"),
    }
    ActionOutcome::Failed(FormState::message(mutation.database_error_message()))
}
