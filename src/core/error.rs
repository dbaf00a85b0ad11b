//! Typed error handling for the dashboard's HTTP edge
//!
//! Store seams return `anyhow::Result`; handlers convert into
//! [`DashboardError`], which knows its status code, a stable error code and
//! its JSON body.
//!
//! # Error Categories
//!
//! - [`InvoiceError`]: lookups of a specific invoice
//! - [`StorageError`]: store backends
//! - [`ConfigError`]: configuration parsing and validation
//!
//! Mutation outcomes (field errors, generic database messages) and sign-in
//! failures are values, not errors; they never pass through this type.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn edit_form(id: Uuid) -> Result<Json<InvoiceForm>, DashboardError> {
//!     let invoice = invoices.get(&id).await?.ok_or(InvoiceError::NotFound { id })?;
//!     Ok(Json(invoice.into()))
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type at the HTTP edge
#[derive(Debug)]
pub enum DashboardError {
    /// Invoice lookups
    Invoice(InvoiceError),

    /// Storage backend failures
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Anything unexpected; the detail is logged, never returned
    Internal(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Invoice(e) => write!(f, "{}", e),
            DashboardError::Storage(e) => write!(f, "{}", e),
            DashboardError::Config(e) => write!(f, "{}", e),
            DashboardError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Invoice(e) => Some(e),
            DashboardError::Storage(e) => Some(e),
            DashboardError::Config(e) => Some(e),
            DashboardError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl DashboardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Invoice(e) => e.status_code(),
            DashboardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::Invoice(e) => e.error_code(),
            DashboardError::Storage(_) => "STORAGE_ERROR",
            DashboardError::Config(_) => "CONFIG_ERROR",
            DashboardError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the detail must stay in the logs
    fn is_server_fault(&self) -> bool {
        matches!(
            self,
            DashboardError::Storage(_) | DashboardError::Config(_) | DashboardError::Internal(_)
        )
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let message = if self.is_server_fault() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            DashboardError::Invoice(InvoiceError::NotFound { id }) => {
                Some(serde_json::json!({ "id": id.to_string() }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_server_fault() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Invoice Errors
// =============================================================================

#[derive(Debug)]
pub enum InvoiceError {
    /// No invoice with this id
    NotFound { id: Uuid },

    /// Path segment is not a valid invoice id
    InvalidId { value: String },
}

impl fmt::Display for InvoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceError::NotFound { id } => write!(f, "Invoice with id '{}' not found", id),
            InvoiceError::InvalidId { value } => write!(f, "Invalid invoice id: '{}'", value),
        }
    }
}

impl std::error::Error for InvoiceError {}

impl InvoiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InvoiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InvoiceError::InvalidId { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            InvoiceError::NotFound { .. } => "INVOICE_NOT_FOUND",
            InvoiceError::InvalidId { .. } => "INVALID_INVOICE_ID",
        }
    }
}

impl From<InvoiceError> for DashboardError {
    fn from(err: InvoiceError) -> Self {
        DashboardError::Invoice(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    ConnectionError { backend: String, message: String },

    /// Query execution error
    QueryError { backend: String, message: String },

    /// Migration failure at startup
    MigrationError { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::MigrationError { message } => {
                write!(f, "Migration failed: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for DashboardError {
    fn from(err: StorageError) -> Self {
        DashboardError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue { field: String, message: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid value for field '{}': {}", field, message)
            }
            ConfigError::IoError { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Config(err)
    }
}

/// Store and service failures arrive as `anyhow::Error`
///
/// Typed storage and config errors wrapped by a backend keep their category.
impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<StorageError>() {
            Ok(storage) => return DashboardError::Storage(storage),
            Err(err) => err,
        };
        match err.downcast::<ConfigError>() {
            Ok(config) => DashboardError::Config(config),
            Err(err) => DashboardError::Internal(format!("{:#}", err)),
        }
    }
}

/// A specialized Result type for handlers
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_error_display() {
        let err = InvoiceError::NotFound { id: Uuid::nil() };
        assert!(err.to_string().contains("not found"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_dashboard_error_conversion() {
        let err: DashboardError = InvoiceError::NotFound { id: Uuid::nil() }.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "INVOICE_NOT_FOUND");
    }

    #[test]
    fn test_error_response_details() {
        let err = DashboardError::Invoice(InvoiceError::NotFound { id: Uuid::nil() });
        let response = err.to_response();
        assert_eq!(response.code, "INVOICE_NOT_FOUND");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_internal_detail_is_not_returned() {
        let err: DashboardError = anyhow::anyhow!("password authentication failed for user").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = err.to_response();
        assert_eq!(response.message, "Internal server error");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_storage_error_keeps_category_through_anyhow() {
        let err: DashboardError = anyhow::Error::from(StorageError::MigrationError {
            message: "relation exists".to_string(),
        })
        .into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.to_response().message, "Internal server error");
    }

    #[test]
    fn test_invalid_id_has_no_details() {
        let err = DashboardError::Invoice(InvoiceError::InvalidId {
            value: "abc".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_response().details.is_none());
    }
}
