//! Route table for the dashboard

use super::handlers::{auth, customers, events, invoices, overview};
use super::middleware::require_auth;
use super::state::AppState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Build the full application router
///
/// - GET  /                                  - Landing page
/// - GET  /login, POST /login                - Sign-in
/// - POST /logout                            - Sign-out
/// - GET  /dashboard                         - Overview
/// - GET  /dashboard/invoices                - Invoice list (`query`, `page`)
/// - POST /dashboard/invoices                - Create invoice
/// - GET  /dashboard/invoices/create         - Create form data
/// - GET  /dashboard/invoices/{id}/edit      - Edit form data
/// - POST /dashboard/invoices/{id}/edit      - Update invoice
/// - POST /dashboard/invoices/{id}/delete    - Delete invoice
/// - GET  /dashboard/customers               - Customers table (`query`)
/// - GET  /dashboard/events                  - Server-sent events
/// - GET  /health, /healthz                  - Health check
///
/// Custom routes are merged in before the route policy is applied, so any
/// custom route under the protected prefix requires a session too.
pub fn build_router(state: AppState, custom_routes: Vec<Router>) -> Router {
    let dashboard = Router::new()
        .route("/", get(landing))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(overview::overview))
        .route(
            "/dashboard/invoices",
            get(invoices::list).post(invoices::create),
        )
        .route("/dashboard/invoices/create", get(invoices::create_form))
        .route(
            "/dashboard/invoices/{id}/edit",
            get(invoices::edit_form).post(invoices::update),
        )
        .route("/dashboard/invoices/{id}/delete", post(invoices::delete))
        .route("/dashboard/customers", get(customers::list))
        .route("/dashboard/events", get(events::stream))
        .with_state(state.clone());

    let mut app = health_routes().merge(dashboard);
    for custom in custom_routes {
        app = app.merge(custom);
    }

    app.layer(middleware::from_fn_with_state(state, require_auth))
        .layer(TraceLayer::new_for_http())
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn landing(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "title": "Acme Dashboard",
        "sign_in": state.auth.sign_in_page,
    }))
}
