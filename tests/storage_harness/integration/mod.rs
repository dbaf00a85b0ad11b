//! Integration test infrastructure for storage backends.
//!
//! Wraps a seeded store in the full application router and an
//! `axum_test::TestServer`, so backends can be validated through the HTTP
//! layer (form → handler → action → store → response).
//!
//! ```text
//! axum_test::TestServer
//!     └─ Router (ServerBuilder::build_state + build_router)
//!         ├─ route policy middleware (session cookie)
//!         ├─ /login, /logout
//!         └─ /dashboard, /dashboard/invoices/..., /dashboard/customers
//! ```

#[macro_use]
pub mod rest_tests;

use super::{date, seed_credentials};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum_test::TestServer;
use chrono::NaiveDate;
use dashboard::core::service::DashboardStore;
use dashboard::server::{AppState, ServerBuilder, build_router};
use std::sync::Arc;

/// Date stamped on invoices created through the test server
pub fn test_today() -> NaiveDate {
    date(2024, 3, 15)
}

/// Build a test server over `store`, returning the handler state as well
pub fn build_test_server<S: DashboardStore>(store: S) -> (TestServer, AppState) {
    let mut builder = ServerBuilder::new()
        .with_store(store)
        .with_date_source(Arc::new(test_today));
    let state = builder.build_state().unwrap();
    let server = TestServer::new(build_router(state.clone(), Vec::new()));
    (server, state)
}

/// Sign in as the placeholder user and return the session cookie header
pub async fn sign_in(server: &TestServer) -> (HeaderName, HeaderValue) {
    let response = server.post("/login").form(&seed_credentials()).await;
    response.assert_status(StatusCode::SEE_OTHER);

    let set_cookie = response.header(header::SET_COOKIE);
    let pair = set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    (header::COOKIE, HeaderValue::from_str(&pair).unwrap())
}
