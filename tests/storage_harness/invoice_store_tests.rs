//! Macro-generated test suite for dashboard store contract validation.
//!
//! The `invoice_store_tests!` macro generates a test module that validates
//! any type implementing the four dashboard service traits against the
//! placeholder data set.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//!
//! invoice_store_tests!(seeded_in_memory());
//! ```
//!
//! # Generated Tests
//!
//! ## Invoices
//! - `test_create_and_get`: store assigns the id, every field persisted
//! - `test_get_nonexistent`: unknown id returns None
//! - `test_update_keeps_date`: customer/amount/status overwritten, date untouched
//! - `test_update_nonexistent`: zero rows affected
//! - `test_delete_existing` / `test_delete_nonexistent`
//! - `test_latest_newest_first`
//!
//! ## Search
//! - `test_search_pages`: 6 per page, newest first
//! - `test_search_matches_each_column`: name, email, amount, date, status
//! - `test_search_wildcards_are_literal`
//!
//! ## Customers, users, overview
//! - `test_customer_fields_sorted`, `test_customer_search_totals`
//! - `test_find_user_by_email`
//! - `test_revenue_months`, `test_card_data`
//!
//! ## Concurrency
//! - `test_concurrent_creates`: parallel creates from spawned tasks

/// Generate a dashboard store conformance test suite.
///
/// `$factory` must evaluate to a store loaded with the placeholder data. It
/// is re-evaluated for each test.
#[macro_export]
macro_rules! invoice_store_tests {
    ($factory:expr) => {
        mod invoice_store_contract_tests {
            use super::*;
            use dashboard::core::model::{InvoiceChanges, InvoiceStatus};
            use dashboard::core::service::{
                CustomerService, DashboardService, InvoiceService, UserService,
            };
            use dashboard::storage::seed::SEED_USER_EMAIL;
            use uuid::Uuid;

            // ==================================================================
            // Invoices
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = $factory;
                let id = store
                    .create(new_invoice(EVIL_RABBIT, 4999, InvoiceStatus::Pending, date(2024, 1, 15)))
                    .await
                    .unwrap();

                let invoice = store.get(&id).await.unwrap().expect("created invoice");
                assert_eq!(invoice.id, id);
                assert_eq!(invoice.customer_id, EVIL_RABBIT);
                assert_eq!(invoice.amount, 4999);
                assert_eq!(invoice.status, InvoiceStatus::Pending);
                assert_eq!(invoice.date, date(2024, 1, 15));
                assert_eq!(store.count_matching("").await.unwrap(), SEED_INVOICES + 1);
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_update_keeps_date() {
                let store = $factory;
                let original = seed_data().invoices[0].clone();

                let rows = store
                    .update(
                        &original.id,
                        InvoiceChanges {
                            customer_id: AMY_BURNS.to_string(),
                            amount: 12_345,
                            status: InvoiceStatus::Paid,
                        },
                    )
                    .await
                    .unwrap();
                assert_eq!(rows, 1);

                let updated = store.get(&original.id).await.unwrap().unwrap();
                assert_eq!(updated.customer_id, AMY_BURNS);
                assert_eq!(updated.amount, 12_345);
                assert_eq!(updated.status, InvoiceStatus::Paid);
                assert_eq!(updated.date, original.date);
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;
                let rows = store
                    .update(
                        &Uuid::new_v4(),
                        InvoiceChanges {
                            customer_id: AMY_BURNS.to_string(),
                            amount: 100,
                            status: InvoiceStatus::Paid,
                        },
                    )
                    .await
                    .unwrap();
                assert_eq!(rows, 0);
            }

            #[tokio::test]
            async fn test_delete_existing() {
                let store = $factory;
                let id = seed_data().invoices[0].id;

                assert_eq!(store.delete(&id).await.unwrap(), 1);
                assert!(store.get(&id).await.unwrap().is_none());
                assert_eq!(store.count_matching("").await.unwrap(), SEED_INVOICES - 1);
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let store = $factory;
                assert_eq!(store.delete(&Uuid::new_v4()).await.unwrap(), 0);
                assert_eq!(store.count_matching("").await.unwrap(), SEED_INVOICES);
            }

            #[tokio::test]
            async fn test_latest_newest_first() {
                let store = $factory;
                let latest = store.latest(5).await.unwrap();
                assert_count(&latest, 5);
                assert_eq!(latest[0].name, "Michael Novotny");
                assert_eq!(latest[0].amount, 44_800);
                assert_eq!(latest[1].name, "Delba de Oliveira");
                assert_eq!(latest[1].amount, 500);
            }

            // ==================================================================
            // Search
            // ==================================================================

            #[tokio::test]
            async fn test_search_pages() {
                let store = $factory;

                let first = InvoiceService::search(&store, "", 6, 0).await.unwrap();
                assert_count(&first, 6);
                assert_eq!(first[0].date, date(2023, 9, 10));
                assert!(first.windows(2).all(|w| w[0].date >= w[1].date));

                let last = InvoiceService::search(&store, "", 6, 12).await.unwrap();
                assert_count(&last, 1);
                assert_eq!(last[0].date, date(2022, 6, 5));

                assert!(InvoiceService::search(&store, "", 6, 18).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_search_matches_each_column() {
                let store = $factory;

                // customer name, any case
                assert_eq!(store.count_matching("LEE").await.unwrap(), 2);
                // customer email
                assert_eq!(store.count_matching("amy@burns").await.unwrap(), 2);
                // amount in minor units
                assert_eq!(store.count_matching("44800").await.unwrap(), 1);
                // ISO date prefix
                assert_eq!(store.count_matching("2023-06").await.unwrap(), 5);
                // status
                assert_eq!(store.count_matching("pending").await.unwrap(), 5);

                assert_eq!(store.count_matching("nobody-matches").await.unwrap(), 0);

                let rows = InvoiceService::search(&store, "lee", 6, 0).await.unwrap();
                assert!(rows.iter().all(|r| r.customer_id == LEE_ROBINSON));
            }

            #[tokio::test]
            async fn test_search_wildcards_are_literal() {
                let store = $factory;
                assert_eq!(store.count_matching("%").await.unwrap(), 0);
                assert_eq!(store.count_matching("_").await.unwrap(), 0);
            }

            // ==================================================================
            // Customers, users, overview
            // ==================================================================

            #[tokio::test]
            async fn test_customer_fields_sorted() {
                let store = $factory;
                let fields = store.list_fields().await.unwrap();
                assert_count(&fields, SEED_CUSTOMERS);
                assert_eq!(fields[0].name, "Amy Burns");
                assert!(fields.windows(2).all(|w| w[0].name <= w[1].name));
            }

            #[tokio::test]
            async fn test_customer_search_totals() {
                let store = $factory;

                let all = CustomerService::search(&store, "").await.unwrap();
                assert_count(&all, SEED_CUSTOMERS);

                let rows = CustomerService::search(&store, "ROBINSON").await.unwrap();
                assert_count(&rows, 1);
                let lee = &rows[0];
                assert_eq!(lee.id, LEE_ROBINSON);
                assert_eq!(lee.total_invoices, 2);
                assert_eq!(lee.total_pending, 54_246);
                assert_eq!(lee.total_paid, 1_000);
            }

            #[tokio::test]
            async fn test_find_user_by_email() {
                let store = $factory;
                let user = store.find_by_email(SEED_USER_EMAIL).await.unwrap().unwrap();
                assert_eq!(user.email, SEED_USER_EMAIL);
                assert!(user.password.starts_with("$2"));

                assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_revenue_months() {
                let store = $factory;
                let revenue = store.revenue().await.unwrap();
                assert_count(&revenue, 12);
                assert_eq!(revenue[0].month, "Jan");
                assert_eq!(revenue[11].month, "Dec");
                assert_eq!(revenue[11].revenue, 4800);
            }

            #[tokio::test]
            async fn test_card_data() {
                let store = $factory;
                let card = store.card_data().await.unwrap();
                assert_eq!(card.number_of_invoices, SEED_INVOICES as i64);
                assert_eq!(card.number_of_customers, SEED_CUSTOMERS as i64);
                assert_eq!(card.total_paid_invoices, SEED_PAID_TOTAL);
                assert_eq!(card.total_pending_invoices, SEED_PENDING_TOTAL);
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_creates() {
                let store = shared($factory);

                let handles: Vec<_> = (0..10)
                    .map(|i| {
                        let store = store.clone();
                        tokio::spawn(async move {
                            store
                                .create(new_invoice(
                                    LEE_ROBINSON,
                                    100 + i,
                                    InvoiceStatus::Pending,
                                    date(2024, 2, 1),
                                ))
                                .await
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                assert_eq!(store.count_matching("").await.unwrap(), SEED_INVOICES + 10);
            }
        }
    };
}
