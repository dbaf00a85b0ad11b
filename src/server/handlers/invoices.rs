//! Invoice list, forms and mutations

use super::parse_invoice_id;
use crate::actions::ActionOutcome;
use crate::core::cache::INVOICES_PATH;
use crate::core::error::{DashboardResult, InvoiceError};
use crate::core::format::{format_currency, format_date_to_local};
use crate::core::model::{CustomerField, InvoiceForm, InvoiceStatus, InvoicesTableRow};
use crate::core::query::{ITEMS_PER_PAGE, ListParams, PaginationMeta, total_pages};
use crate::core::validation::FormData;
use crate::server::state::AppState;
use axum::extract::{Form, Path, Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// One row of the invoices table, formatted for display
#[derive(Debug, Serialize)]
pub struct InvoiceView {
    pub id: Uuid,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: String,
    pub amount: String,
    pub status: InvoiceStatus,
}

impl From<InvoicesTableRow> for InvoiceView {
    fn from(row: InvoicesTableRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            name: row.name,
            email: row.email,
            image_url: row.image_url,
            date: format_date_to_local(row.date),
            amount: format_currency(row.amount),
            status: row.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoicesPage {
    pub query: String,
    pub invoices: Vec<InvoiceView>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct CreateFormView {
    pub customers: Vec<CustomerField>,
}

#[derive(Debug, Serialize)]
pub struct EditFormView {
    pub invoice: InvoiceForm,
    pub customers: Vec<CustomerField>,
}

/// GET /dashboard/invoices?query=&page=
///
/// Cached per search term and page until the invoices path is revalidated.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> DashboardResult<Json<Value>> {
    let key = params.cache_key(INVOICES_PATH);

    let invoices = state.invoices.clone();
    let body = state
        .cache
        .get_or_load(&key, || async move {
            let term = params.term();
            let (rows, total) = tokio::try_join!(
                invoices.search(term, ITEMS_PER_PAGE, params.offset()),
                invoices.count_matching(term),
            )?;

            let page = InvoicesPage {
                query: term.to_string(),
                invoices: rows.into_iter().map(InvoiceView::from).collect(),
                pagination: PaginationMeta::new(params.page(), total_pages(total)),
            };
            Ok::<Value, anyhow::Error>(serde_json::to_value(page)?)
        })
        .await?;

    Ok(Json(body))
}

/// GET /dashboard/invoices/create
pub async fn create_form(State(state): State<AppState>) -> DashboardResult<Json<CreateFormView>> {
    let customers = state.customers.list_fields().await?;
    Ok(Json(CreateFormView { customers }))
}

/// POST /dashboard/invoices
pub async fn create(State(state): State<AppState>, Form(form): Form<FormData>) -> ActionOutcome {
    state.actions.create_invoice(&form).await
}

/// GET /dashboard/invoices/{id}/edit
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DashboardResult<Json<EditFormView>> {
    let id = parse_invoice_id(&id)?;
    let (invoice, customers) =
        tokio::try_join!(state.invoices.get(&id), state.customers.list_fields())?;
    let invoice = invoice.ok_or(InvoiceError::NotFound { id })?;

    Ok(Json(EditFormView {
        invoice: invoice.into(),
        customers,
    }))
}

/// POST /dashboard/invoices/{id}/edit
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> DashboardResult<ActionOutcome> {
    let id = parse_invoice_id(&id)?;
    Ok(state.actions.update_invoice(id, &form).await)
}

/// POST /dashboard/invoices/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DashboardResult<ActionOutcome> {
    let id = parse_invoice_id(&id)?;
    Ok(state.actions.delete_invoice(id).await)
}
