//! HTTP server for the dashboard
//!
//! `ServerBuilder` wires a store, the credentials provider, the view cache
//! and the event bus into an [`AppState`], then mounts:
//! - the dashboard views (overview, invoices, customers)
//! - the invoice mutations
//! - sign-in and sign-out
//! - a server-sent event stream and health checks

pub mod builder;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_router;
pub use state::AppState;
