//! Core module containing the dashboard's domain types, traits and utilities

pub mod auth;
pub mod cache;
pub mod error;
pub mod events;
pub mod format;
pub mod model;
pub mod query;
pub mod service;
pub mod validation;

pub use auth::{
    AuthContext, AuthError, AuthErrorKind, CredentialsProvider, IdentityProvider, Session,
    SessionStore, SignInError, SignInMethod,
};
pub use cache::{Revalidate, ViewCache};
pub use error::{DashboardError, DashboardResult};
pub use events::{DashboardEvent, EventBus, EventEnvelope, InvoiceEvent};
pub use model::{Invoice, InvoiceStatus};
pub use service::{CustomerService, DashboardService, DashboardStore, InvoiceService, UserService};
