//! Shared handler state

use crate::actions::InvoiceActions;
use crate::config::AuthConfig;
use crate::core::auth::{IdentityProvider, SessionStore};
use crate::core::cache::ViewCache;
use crate::core::events::EventBus;
use crate::core::service::{CustomerService, DashboardService, InvoiceService};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub invoices: Arc<dyn InvoiceService>,
    pub customers: Arc<dyn CustomerService>,
    pub dashboard: Arc<dyn DashboardService>,
    pub actions: InvoiceActions,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: SessionStore,
    pub auth: Arc<AuthConfig>,
    pub cache: ViewCache,
    pub events: EventBus,
}
