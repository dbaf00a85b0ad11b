//! REST integration test macro for storage backends.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that run
//! the dashboard against a seeded store: sign-in, route policy, views and
//! every invoice mutation.

/// Generate a REST integration test suite for a storage backend.
///
/// `$store_factory` must produce a store loaded with the placeholder data.
///
/// # Generated Tests
///
/// ## Route policy (3 tests)
/// - `test_rest_anonymous_redirected_to_login`
/// - `test_rest_signed_in_redirected_from_login`
/// - `test_rest_wrong_password`: 401 with "Invalid credentials."
///
/// ## Views (5 tests)
/// - `test_rest_overview`, `test_rest_invoice_list_paging`,
///   `test_rest_invoice_list_search`, `test_rest_customers`
/// - `test_rest_invoice_list_cache_key_ignores_noise`: one cache entry per
///   term and page
///
/// ## Mutations (6 tests)
/// - `test_rest_create_invoice`: 303, stored with today's date, list revalidated
/// - `test_rest_create_invalid`: 422 with field errors, nothing stored
/// - `test_rest_edit_form` / `test_rest_edit_form_missing`
/// - `test_rest_update_invoice`, `test_rest_delete_invoice`
///
/// ## Error handling (1 test)
/// - `test_rest_invalid_invoice_id`: 400
#[macro_export]
macro_rules! rest_integration_tests {
    ($store_factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use dashboard::core::service::InvoiceService;
            use dashboard::server::AppState;
            use serde_json::Value;
            use crate::storage_harness::integration::{build_test_server, sign_in, test_today};
            use uuid::Uuid;

            async fn make_server() -> (axum_test::TestServer, AppState) {
                build_test_server($store_factory)
            }

            // ==============================================================
            // Route policy
            // ==============================================================

            #[tokio::test]
            async fn test_rest_anonymous_redirected_to_login() {
                let (server, _) = make_server().await;

                let response = server.get("/dashboard/invoices").await;
                response.assert_status(StatusCode::SEE_OTHER);
                assert_eq!(
                    response.header("location"),
                    "/login?callbackUrl=%2Fdashboard%2Finvoices"
                );

                server.get("/health").await.assert_status_ok();
                server.get("/login").await.assert_status_ok();
            }

            #[tokio::test]
            async fn test_rest_signed_in_redirected_from_login() {
                let (server, _) = make_server().await;
                let (name, value) = sign_in(&server).await;

                let response = server.get("/login").add_header(name.clone(), value.clone()).await;
                response.assert_status(StatusCode::SEE_OTHER);
                assert_eq!(response.header("location"), "/dashboard");

                server
                    .get("/dashboard")
                    .add_header(name, value)
                    .await
                    .assert_status_ok();
            }

            #[tokio::test]
            async fn test_rest_wrong_password() {
                let (server, _) = make_server().await;

                let response = server
                    .post("/login")
                    .form(&form(&[
                        ("email", "user@nextmail.com"),
                        ("password", "wrong-password"),
                    ]))
                    .await;

                response.assert_status(StatusCode::UNAUTHORIZED);
                let body: Value = response.json();
                assert_eq!(body["message"], "Invalid credentials.");
            }

            // ==============================================================
            // Views
            // ==============================================================

            #[tokio::test]
            async fn test_rest_overview() {
                let (server, _) = make_server().await;
                let (name, value) = sign_in(&server).await;

                let body: Value = server
                    .get("/dashboard")
                    .add_header(name, value)
                    .await
                    .json();

                assert_eq!(body["cards"]["number_of_invoices"], 13);
                assert_eq!(body["cards"]["number_of_customers"], 6);
                assert_eq!(body["cards"]["total_paid_invoices"], "$1,006.26");
                assert_eq!(body["cards"]["total_pending_invoices"], "$1,256.32");
                assert_eq!(body["revenue"]["top_label"], 5000);
                assert_eq!(body["revenue"]["y_axis_labels"][0], "$5k");
                assert_eq!(body["latest_invoices"].as_array().unwrap().len(), 5);
                assert_eq!(body["latest_invoices"][0]["amount"], "$448.00");
            }

            #[tokio::test]
            async fn test_rest_invoice_list_paging() {
                let (server, _) = make_server().await;
                let (name, value) = sign_in(&server).await;

                let body: Value = server
                    .get("/dashboard/invoices")
                    .add_query_param("page", 3)
                    .add_header(name, value)
                    .await
                    .json();

                assert_eq!(body["invoices"].as_array().unwrap().len(), 1);
                assert_eq!(body["invoices"][0]["date"], "Jun 5, 2022");
                assert_eq!(body["pagination"]["page"], 3);
                assert_eq!(body["pagination"]["total_pages"], 3);
                assert_eq!(body["pagination"]["has_next"], false);
            }

            #[tokio::test]
            async fn test_rest_invoice_list_search() {
                let (server, _) = make_server().await;
                let (name, value) = sign_in(&server).await;

                let body: Value = server
                    .get("/dashboard/invoices")
                    .add_query_param("query", "lee")
                    .add_header(name, value)
                    .await
                    .json();

                let invoices = body["invoices"].as_array().unwrap();
                assert_eq!(invoices.len(), 2);
                assert!(invoices.iter().all(|i| i["name"] == "Lee Robinson"));
                assert_eq!(invoices[0]["amount"], "$542.46");
                assert_eq!(body["pagination"]["total_pages"], 1);
            }

            #[tokio::test]
            async fn test_rest_invoice_list_cache_key_ignores_noise() {
                let (server, state) = make_server().await;
                let (name, value) = sign_in(&server).await;

                for query in [
                    "/dashboard/invoices",
                    "/dashboard/invoices?page=1",
                    "/dashboard/invoices?page=0&query=",
                    "/dashboard/invoices?query=%20%20&utm_source=mail",
                    "/dashboard/invoices?cachebuster=1",
                    "/dashboard/invoices?cachebuster=2",
                ] {
                    server
                        .get(query)
                        .add_header(name.clone(), value.clone())
                        .await
                        .assert_status_ok();
                }
                assert_eq!(state.cache.len(), 1);

                server
                    .get("/dashboard/invoices?query=lee&page=1&x=y")
                    .add_header(name, value)
                    .await
                    .assert_status_ok();
                assert_eq!(state.cache.len(), 2);
            }

            #[tokio::test]
            async fn test_rest_customers() {
                let (server, _) = make_server().await;
                let (name, value) = sign_in(&server).await;

                let body: Value = server
                    .get("/dashboard/customers")
                    .add_query_param("query", "robinson")
                    .add_header(name, value)
                    .await
                    .json();

                let customers = body["customers"].as_array().unwrap();
                assert_eq!(customers.len(), 1);
                assert_eq!(customers[0]["total_invoices"], 2);
                assert_eq!(customers[0]["total_pending"], "$542.46");
                assert_eq!(customers[0]["total_paid"], "$10.00");
            }

            // ==============================================================
            // Mutations
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_invoice() {
                let (server, state) = make_server().await;
                let (name, value) = sign_in(&server).await;

                // Prime the list cache
                server
                    .get("/dashboard/invoices")
                    .add_header(name.clone(), value.clone())
                    .await
                    .assert_status_ok();
                assert_eq!(state.cache.len(), 1);

                let response = server
                    .post("/dashboard/invoices")
                    .add_header(name.clone(), value.clone())
                    .form(&form(&[
                        ("customerId", EVIL_RABBIT),
                        ("amount", "49.99"),
                        ("status", "pending"),
                    ]))
                    .await;

                response.assert_status(StatusCode::SEE_OTHER);
                assert_eq!(response.header("location"), "/dashboard/invoices");
                assert!(state.cache.is_empty());

                let rows = InvoiceService::search(state.invoices.as_ref(), "49.99", 6, 0)
                    .await
                    .unwrap();
                assert!(rows.is_empty(), "amounts are stored in minor units");

                let rows = InvoiceService::search(state.invoices.as_ref(), "4999", 6, 0)
                    .await
                    .unwrap();
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].customer_id, EVIL_RABBIT);
                assert_eq!(rows[0].date, test_today());

                let body: Value = server
                    .get("/dashboard/invoices")
                    .add_header(name, value)
                    .await
                    .json();
                assert_eq!(body["invoices"][0]["amount"], "$49.99");
                assert_eq!(body["invoices"][0]["date"], "Mar 15, 2024");
            }

            #[tokio::test]
            async fn test_rest_create_invalid() {
                let (server, state) = make_server().await;
                let (name, value) = sign_in(&server).await;

                let response = server
                    .post("/dashboard/invoices")
                    .add_header(name, value)
                    .form(&form(&[("customerId", ""), ("amount", "10"), ("status", "paid")]))
                    .await;

                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                let body: Value = response.json();
                assert_eq!(body["errors"]["customerId"][0], "Please select a customer.");
                assert_eq!(body["message"], "Missing Fields. Failed to Create Invoice.");
                assert_eq!(
                    state.invoices.count_matching("").await.unwrap(),
                    SEED_INVOICES
                );
            }

            #[tokio::test]
            async fn test_rest_edit_form() {
                let (server, _) = make_server().await;
                let (name, value) = sign_in(&server).await;
                let invoice = seed_data().invoices[0].clone();

                let body: Value = server
                    .get(&format!("/dashboard/invoices/{}/edit", invoice.id))
                    .add_header(name, value)
                    .await
                    .json();

                assert_eq!(body["invoice"]["id"], invoice.id.to_string());
                assert_eq!(body["invoice"]["amount"], 157.95);
                assert_eq!(body["invoice"]["status"], "pending");
                assert_eq!(body["customers"].as_array().unwrap().len(), SEED_CUSTOMERS);
            }

            #[tokio::test]
            async fn test_rest_edit_form_missing() {
                let (server, _) = make_server().await;
                let (name, value) = sign_in(&server).await;

                let response = server
                    .get(&format!("/dashboard/invoices/{}/edit", Uuid::new_v4()))
                    .add_header(name, value)
                    .await;

                response.assert_status(StatusCode::NOT_FOUND);
                let body: Value = response.json();
                assert_eq!(body["code"], "INVOICE_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_rest_update_invoice() {
                let (server, state) = make_server().await;
                let (name, value) = sign_in(&server).await;
                let original = seed_data().invoices[0].clone();

                let response = server
                    .post(&format!("/dashboard/invoices/{}/edit", original.id))
                    .add_header(name, value)
                    .form(&form(&[
                        ("customerId", AMY_BURNS),
                        ("amount", "12.5"),
                        ("status", "paid"),
                    ]))
                    .await;

                response.assert_status(StatusCode::SEE_OTHER);
                assert_eq!(response.header("location"), "/dashboard/invoices");

                let updated = state.invoices.get(&original.id).await.unwrap().unwrap();
                assert_eq!(updated.customer_id, AMY_BURNS);
                assert_eq!(updated.amount, 1250);
                assert_eq!(updated.date, original.date);
            }

            #[tokio::test]
            async fn test_rest_delete_invoice() {
                let (server, state) = make_server().await;
                let (name, value) = sign_in(&server).await;
                let id = seed_data().invoices[0].id;

                server
                    .post(&format!("/dashboard/invoices/{}/delete", id))
                    .add_header(name, value)
                    .await
                    .assert_status(StatusCode::NO_CONTENT);

                assert!(state.invoices.get(&id).await.unwrap().is_none());
            }

            // ==============================================================
            // Error handling
            // ==============================================================

            #[tokio::test]
            async fn test_rest_invalid_invoice_id() {
                let (server, _) = make_server().await;
                let (name, value) = sign_in(&server).await;

                let response = server
                    .post("/dashboard/invoices/not-a-uuid/delete")
                    .add_header(name, value)
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "INVALID_INVOICE_ID");
            }
        }
    };
}
