//! Form actions: validate, persist, report
//!
//! [`InvoiceActions`] runs the create/update/delete pipeline and
//! [`authenticate`] maps identity-provider failures to user-facing messages.
//! Both return plain outcome values; the server layer turns them into HTTP
//! responses.

pub mod auth;
pub mod invoices;

pub use auth::{AuthOutcome, authenticate};
pub use invoices::{DateSource, InvoiceActions};

use crate::core::validation::{FieldErrors, SchemaFailure};
use serde::Serialize;

/// State handed back to a form after a failed submission
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    /// Per-field messages; empty after a store failure
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FormState {
    /// A banner message with no field errors
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: FieldErrors::new(),
            message: Some(message.into()),
        }
    }
}

impl From<SchemaFailure> for FormState {
    fn from(failure: SchemaFailure) -> Self {
        Self {
            errors: failure.errors,
            message: Some(failure.message),
        }
    }
}

/// Result of one invoice form submission
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Success; navigate to this path
    Redirect(String),

    /// Delete succeeded; the caller stays where it is
    Deleted,

    /// The submission failed validation
    Invalid(FormState),

    /// The store failed; only a generic message is carried
    Failed(FormState),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Redirect(_) | ActionOutcome::Deleted)
    }

    /// The form state to render, for failed outcomes
    pub fn form_state(&self) -> Option<&FormState> {
        match self {
            ActionOutcome::Invalid(state) | ActionOutcome::Failed(state) => Some(state),
            ActionOutcome::Redirect(_) | ActionOutcome::Deleted => None,
        }
    }
}
