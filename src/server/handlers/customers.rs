//! Customers table

use crate::core::error::DashboardResult;
use crate::core::format::format_currency;
use crate::core::model::CustomersTableRow;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomerQuery {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: String,
    pub total_paid: String,
}

impl From<CustomersTableRow> for CustomerView {
    fn from(row: CustomersTableRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            image_url: row.image_url,
            total_invoices: row.total_invoices,
            total_pending: format_currency(row.total_pending),
            total_paid: format_currency(row.total_paid),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomersPage {
    pub query: String,
    pub customers: Vec<CustomerView>,
}

/// GET /dashboard/customers?query=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CustomerQuery>,
) -> DashboardResult<Json<CustomersPage>> {
    let term = params.query.trim();
    let rows = state.customers.search(term).await?;

    Ok(Json(CustomersPage {
        query: term.to_string(),
        customers: rows.into_iter().map(CustomerView::from).collect(),
    }))
}
