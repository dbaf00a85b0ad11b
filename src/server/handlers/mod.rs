//! HTTP handlers for the dashboard routes
//!
//! Views are JSON documents; mutations accept urlencoded forms and answer
//! with the mapped [`ActionOutcome`].

pub mod auth;
pub mod customers;
pub mod events;
pub mod invoices;
pub mod overview;

use crate::actions::ActionOutcome;
use crate::core::error::InvoiceError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use uuid::Uuid;

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        match self {
            ActionOutcome::Redirect(path) => Redirect::to(&path).into_response(),
            ActionOutcome::Deleted => StatusCode::NO_CONTENT.into_response(),
            ActionOutcome::Invalid(state) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(state)).into_response()
            }
            ActionOutcome::Failed(state) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(state)).into_response()
            }
        }
    }
}

/// Parse an invoice id path segment
pub(crate) fn parse_invoice_id(raw: &str) -> Result<Uuid, InvoiceError> {
    Uuid::parse_str(raw).map_err(|_| InvoiceError::InvalidId {
        value: raw.to_string(),
    })
}
