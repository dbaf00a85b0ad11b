//! Validation and filtering system
//!
//! Form submissions pass through a declarative [`FormSchema`]: filters
//! coerce raw strings, validators collect per-field messages. The invoice
//! and credential schemas in [`schema`] build on it.

pub mod config;
pub mod filters;
pub mod schema;
pub mod validators;

pub use config::{FieldErrors, FormSchema};
pub use schema::{
    CreateInvoice, Credentials, FormData, Operation, SchemaFailure, UpdateInvoice,
};
