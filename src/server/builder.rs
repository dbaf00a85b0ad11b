//! ServerBuilder for fluent API to build the dashboard server

use super::router::build_router;
use super::state::AppState;
use crate::actions::{DateSource, InvoiceActions};
use crate::config::AppConfig;
use crate::core::auth::{CredentialsProvider, IdentityProvider, SessionStore};
use crate::core::cache::ViewCache;
use crate::core::events::EventBus;
use crate::core::service::{
    CustomerService, DashboardService, DashboardStore, InvoiceService, UserService,
};
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Store handles split per service contract
#[derive(Clone)]
struct Services {
    invoices: Arc<dyn InvoiceService>,
    customers: Arc<dyn CustomerService>,
    users: Arc<dyn UserService>,
    dashboard: Arc<dyn DashboardService>,
}

impl Services {
    fn from_store<S: DashboardStore>(store: Arc<S>) -> Self {
        Self {
            invoices: store.clone(),
            customers: store.clone(),
            users: store.clone(),
            dashboard: store,
        }
    }
}

/// Builder for the dashboard application
///
/// # Example
///
/// ```ignore
/// let store = InMemoryStore::new();
/// SeedData::placeholder()?.load_into(&store)?;
///
/// ServerBuilder::new()
///     .with_config(AppConfig::load()?)
///     .with_store(store)
///     .serve("127.0.0.1:3000")
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    services: Option<Services>,
    identity: Option<Arc<dyn IdentityProvider>>,
    sessions: SessionStore,
    event_bus: Option<EventBus>,
    date_source: Option<DateSource>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            services: None,
            identity: None,
            sessions: SessionStore::new(),
            event_bus: None,
            date_source: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the backing store (required)
    pub fn with_store<S: DashboardStore>(self, store: S) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set a backing store the caller keeps a handle to
    pub fn with_shared_store<S: DashboardStore>(mut self, store: Arc<S>) -> Self {
        self.services = Some(Services::from_store(store));
        self
    }

    /// Replace the credentials provider
    ///
    /// The provider must open its sessions in the store passed to
    /// [`with_session_store`](Self::with_session_store), otherwise requests
    /// carrying its tokens resolve as anonymous.
    pub fn with_identity_provider(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.identity = Some(Arc::new(provider));
        self
    }

    pub fn with_session_store(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// Use an existing event bus instead of creating one from config
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Override "today" for created invoices
    pub fn with_date_source(mut self, today: DateSource) -> Self {
        self.date_source = Some(today);
        self
    }

    /// Add custom routes to the server
    ///
    /// Custom routes sit behind the same route policy as the built-in
    /// ones.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Wire the shared handler state
    pub fn build_state(&mut self) -> Result<AppState> {
        self.config.validate()?;

        let services = self
            .services
            .clone()
            .ok_or_else(|| anyhow!("A store is required. Call .with_store()"))?;

        let events = self
            .event_bus
            .get_or_insert_with(|| EventBus::new(self.config.server.event_bus_capacity))
            .clone();
        let cache = ViewCache::new().with_event_bus(events.clone());

        let mut actions = InvoiceActions::new(services.invoices.clone(), Arc::new(cache.clone()))
            .with_event_bus(events.clone());
        if let Some(today) = self.date_source.clone() {
            actions = actions.with_date_source(today);
        }

        let identity = match &self.identity {
            Some(identity) => identity.clone(),
            None => Arc::new(CredentialsProvider::new(
                services.users.clone(),
                self.sessions.clone(),
                self.config.auth.clone(),
            )),
        };

        Ok(AppState {
            invoices: services.invoices,
            customers: services.customers,
            dashboard: services.dashboard,
            actions,
            identity,
            sessions: self.sessions.clone(),
            auth: Arc::new(self.config.auth.clone()),
            cache,
            events,
        })
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;
        Ok(build_router(state, std::mem::take(&mut self.custom_routes)))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::DashboardEvent;
    use crate::storage::InMemoryStore;

    #[test]
    fn test_build_without_store_fails() {
        let err = ServerBuilder::new().build().err();
        assert!(err.is_some());
        assert!(err.map(|e| e.to_string()).unwrap_or_default().contains("store"));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.auth.session_ttl_minutes = 0;
        let result = ServerBuilder::new()
            .with_config(config)
            .with_store(InMemoryStore::new())
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_state_shares_event_bus_with_cache() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let mut builder = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_event_bus(bus);
        let state = builder.build_state().unwrap();

        state.cache.invalidate("/dashboard/invoices").unwrap();

        let envelope = rx.recv().await.unwrap();
        assert!(matches!(
            envelope.event,
            DashboardEvent::Revalidated { ref path, evicted: 0 } if path == "/dashboard/invoices"
        ));
    }
}
