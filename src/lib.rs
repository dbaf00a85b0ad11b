//! # Invoice Dashboard
//!
//! Backend for a small invoicing dashboard: a paginated, searchable invoice
//! list, customer totals, revenue and summary cards, validated invoice
//! mutations and credential sign-in with route protection.
//!
//! ## Layout
//!
//! - [`core`]: domain model, validation schemas, formatting, pagination,
//!   service traits, sessions, the view cache and the event bus
//! - [`actions`]: the create/update/delete and sign-in pipelines
//! - [`storage`]: in-memory and PostgreSQL stores plus placeholder data
//! - [`server`]: axum handlers, route policy and the [`ServerBuilder`](server::ServerBuilder)
//! - [`config`]: YAML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dashboard::prelude::*;
//!
//! let store = InMemoryStore::new();
//! SeedData::placeholder()?.load_into(&store)?;
//!
//! ServerBuilder::new()
//!     .with_config(AppConfig::load()?)
//!     .with_store(store)
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod actions;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AuthContext, CredentialsProvider, DashboardError, DashboardEvent, DashboardResult,
        DashboardStore, EventBus, IdentityProvider, Invoice, InvoiceStatus, SessionStore,
        ViewCache,
        service::{CustomerService, DashboardService, InvoiceService, UserService},
        validation::{FieldErrors, FormData},
    };

    // === Actions ===
    pub use crate::actions::{ActionOutcome, AuthOutcome, FormState, InvoiceActions};

    // === Storage ===
    pub use crate::storage::{InMemoryStore, SeedData};
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Config ===
    pub use crate::config::{AppConfig, AuthConfig, StorageBackend};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
