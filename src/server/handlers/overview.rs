//! Dashboard overview: cards, revenue chart, latest invoices

use crate::core::error::DashboardResult;
use crate::core::format::{format_currency, generate_y_axis};
use crate::core::model::{LatestInvoice, Revenue};
use crate::server::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

/// Invoices shown in the "latest" panel
pub const LATEST_INVOICES: usize = 5;

#[derive(Debug, Serialize)]
pub struct Cards {
    pub number_of_invoices: i64,
    pub number_of_customers: i64,
    pub total_paid_invoices: String,
    pub total_pending_invoices: String,
}

#[derive(Debug, Serialize)]
pub struct RevenueChart {
    pub months: Vec<Revenue>,
    pub y_axis_labels: Vec<String>,
    pub top_label: i64,
}

#[derive(Debug, Serialize)]
pub struct LatestInvoiceView {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub email: String,
    pub amount: String,
}

impl From<LatestInvoice> for LatestInvoiceView {
    fn from(invoice: LatestInvoice) -> Self {
        Self {
            id: invoice.id,
            name: invoice.name,
            image_url: invoice.image_url,
            email: invoice.email,
            amount: format_currency(invoice.amount),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Overview {
    pub cards: Cards,
    pub revenue: RevenueChart,
    pub latest_invoices: Vec<LatestInvoiceView>,
}

/// GET /dashboard
pub async fn overview(State(state): State<AppState>) -> DashboardResult<Json<Overview>> {
    let (card, revenue, latest) = tokio::try_join!(
        state.dashboard.card_data(),
        state.dashboard.revenue(),
        state.invoices.latest(LATEST_INVOICES),
    )?;

    let (y_axis_labels, top_label) = generate_y_axis(&revenue);

    Ok(Json(Overview {
        cards: Cards {
            number_of_invoices: card.number_of_invoices,
            number_of_customers: card.number_of_customers,
            total_paid_invoices: format_currency(card.total_paid_invoices),
            total_pending_invoices: format_currency(card.total_pending_invoices),
        },
        revenue: RevenueChart {
            months: revenue,
            y_axis_labels,
            top_label,
        },
        latest_invoices: latest.into_iter().map(LatestInvoiceView::from).collect(),
    }))
}
