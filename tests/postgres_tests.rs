//! Integration tests for the PostgreSQL store using the storage test harness.
//!
//! Invokes `invoice_store_tests!` and `rest_integration_tests!` to validate
//! that `PostgresStore` fully conforms to the dashboard store contract.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a PostgreSQL container)
//! - Feature flag `postgres` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features postgres --test postgres_tests -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single PostgreSQL container (via `OnceLock`). Each test
//! creates a fresh `PgPool`, truncates every table and reloads the
//! placeholder data before running.

#![cfg(feature = "postgres")]

#[macro_use]
mod storage_harness;

use dashboard::storage::PostgresStore;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::OnceLock;
use storage_harness::*;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh pool per test)
// ---------------------------------------------------------------------------

/// Holds the testcontainer handle (keeps it alive) and the connection URL.
///
/// The container lives in a process-global `OnceLock` so it survives across
/// `#[tokio::test]` runtime boundaries. Each test creates its own `PgPool`
/// from the URL, bound to its own runtime.
struct PgTestEnv {
    /// Dropping this stops the PostgreSQL container.
    _container: testcontainers::ContainerAsync<Postgres>,
    connection_url: String,
}

static TEST_ENV: OnceLock<PgTestEnv> = OnceLock::new();

/// Start the shared PostgreSQL container and run migrations once.
async fn init_pg_env() -> &'static PgTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container - is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");
    PostgresStore::new(pool.clone())
        .run_migrations()
        .await
        .expect("Failed to run migrations");

    // The setup pool belongs to this test's runtime
    pool.close().await;

    let _ = TEST_ENV.set(PgTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

async fn pg_pool() -> PgPool {
    let env = init_pg_env().await;
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&env.connection_url)
        .await
        .expect("Failed to connect to PostgreSQL")
}

// ---------------------------------------------------------------------------
// Factory helpers (truncate and reseed before each test)
// ---------------------------------------------------------------------------

async fn seeded_pg_store() -> PostgresStore {
    let pool = pg_pool().await;
    sqlx::query("TRUNCATE invoices, customers, users, revenue CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");

    let store = PostgresStore::new(pool);
    store
        .seed(&seed_data())
        .await
        .expect("Failed to seed placeholder data");
    store
}

// ---------------------------------------------------------------------------
// Test suites via macros
// ---------------------------------------------------------------------------

invoice_store_tests!(seeded_pg_store().await);
rest_integration_tests!(seeded_pg_store().await);

// ---------------------------------------------------------------------------
// Backend-specific behavior
// ---------------------------------------------------------------------------

mod postgres_specific {
    use super::*;
    use dashboard::core::model::InvoiceStatus;
    use dashboard::core::service::InvoiceService;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = seeded_pg_store().await;
        store.seed(&seed_data()).await.unwrap();
        assert_eq!(store.count_matching("").await.unwrap(), SEED_INVOICES);
    }

    #[tokio::test]
    async fn test_orphan_invoice_is_not_listed() {
        let store = seeded_pg_store().await;
        let id = store
            .create(new_invoice(
                "no-such-customer",
                100,
                InvoiceStatus::Paid,
                date(2024, 1, 1),
            ))
            .await
            .unwrap();

        assert!(store.get(&id).await.unwrap().is_some());
        assert_eq!(store.count_matching("").await.unwrap(), SEED_INVOICES);
    }
}
