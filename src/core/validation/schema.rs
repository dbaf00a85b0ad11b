//! Form schemas for invoice mutations and sign-in
//!
//! Create and update each get their own validated record type. Both accept
//! exactly `customerId`, `amount` and `status`.

use super::config::{FieldErrors, FormSchema};
use super::{filters, validators};
use crate::core::format::to_minor_units;
use crate::core::model::InvoiceStatus;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use validator::Validate;

/// Raw form submission: field name -> submitted string
pub type FormData = HashMap<String, String>;

pub const CUSTOMER_ID: &str = "customerId";
pub const AMOUNT: &str = "amount";
pub const STATUS: &str = "status";

pub const CUSTOMER_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_MESSAGE: &str = "Please enter an amount greater than $0.";
pub const STATUS_MESSAGE: &str = "Please select an invoice status.";

/// Which mutation a submission is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

impl Operation {
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
        }
    }

    /// Summary shown when field validation fails
    pub fn missing_fields_message(&self) -> String {
        format!("Missing Fields. Failed to {} Invoice.", self.verb())
    }
}

/// Field errors plus the operation-level summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaFailure {
    pub errors: FieldErrors,
    pub message: String,
}

fn invoice_schema() -> &'static FormSchema {
    static SCHEMA: OnceLock<FormSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let mut schema = FormSchema::new()
            .field(CUSTOMER_ID)
            .field(AMOUNT)
            .field(STATUS);
        schema.add_validator(CUSTOMER_ID, validators::non_empty(CUSTOMER_MESSAGE));
        schema.add_filter(AMOUNT, filters::coerce_number());
        schema.add_validator(AMOUNT, validators::positive_minor_units(AMOUNT_MESSAGE));
        schema.add_validator(STATUS, validators::one_of(&["pending", "paid"], STATUS_MESSAGE));
        schema
    })
}

struct InvoiceFields {
    customer_id: String,
    amount: f64,
    amount_cents: i64,
    status: InvoiceStatus,
}

fn parse_invoice_fields(form: &FormData, operation: Operation) -> Result<InvoiceFields, SchemaFailure> {
    let fail = |errors: FieldErrors| SchemaFailure {
        errors,
        message: operation.missing_fields_message(),
    };

    let values = invoice_schema().validate_and_filter(form).map_err(fail)?;

    // The validators above guarantee these shapes; a mismatch is reported as
    // a field error rather than a panic.
    let customer_id = values
        .get(CUSTOMER_ID)
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let amount = values
        .get(AMOUNT)
        .and_then(|v| v.as_f64())
        .and_then(|major| to_minor_units(major).map(|cents| (major, cents)));
    let status = values
        .get(STATUS)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<InvoiceStatus>().ok());

    match (customer_id, amount, status) {
        (Some(customer_id), Some((amount, amount_cents)), Some(status)) => Ok(InvoiceFields {
            customer_id,
            amount,
            amount_cents,
            status,
        }),
        (customer_id, amount, status) => {
            let mut errors = FieldErrors::new();
            if customer_id.is_none() {
                errors.insert(CUSTOMER_ID.to_string(), vec![CUSTOMER_MESSAGE.to_string()]);
            }
            if amount.is_none() {
                errors.insert(AMOUNT.to_string(), vec![AMOUNT_MESSAGE.to_string()]);
            }
            if status.is_none() {
                errors.insert(STATUS.to_string(), vec![STATUS_MESSAGE.to_string()]);
            }
            Err(fail(errors))
        }
    }
}

/// Validated payload for creating an invoice
#[derive(Debug, Clone, PartialEq)]
pub struct CreateInvoice {
    pub customer_id: String,
    /// Major currency units, at least one cent
    pub amount: f64,
    /// `amount` in minor units, as stored
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}

impl CreateInvoice {
    pub fn parse(form: &FormData) -> Result<Self, SchemaFailure> {
        let fields = parse_invoice_fields(form, Operation::Create)?;
        Ok(Self {
            customer_id: fields.customer_id,
            amount: fields.amount,
            amount_cents: fields.amount_cents,
            status: fields.status,
        })
    }
}

/// Validated payload for updating an invoice
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInvoice {
    pub customer_id: String,
    /// Major currency units, at least one cent
    pub amount: f64,
    /// `amount` in minor units, as stored
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}

impl UpdateInvoice {
    pub fn parse(form: &FormData) -> Result<Self, SchemaFailure> {
        let fields = parse_invoice_fields(form, Operation::Update)?;
        Ok(Self {
            customer_id: fields.customer_id,
            amount: fields.amount,
            amount_cents: fields.amount_cents,
            status: fields.status,
        })
    }
}

/// Sign-in credentials: a well-formed email and a password of 6+ characters
#[derive(Clone, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

impl Credentials {
    /// Read and validate credentials from a sign-in form
    ///
    /// Missing fields are treated as empty and fail validation.
    pub fn parse(form: &FormData) -> Result<Self, validator::ValidationErrors> {
        let credentials = Self {
            email: form.get("email").cloned().unwrap_or_default(),
            password: form.get("password").cloned().unwrap_or_default(),
        };
        credentials.validate()?;
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
