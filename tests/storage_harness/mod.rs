//! Shared test harness for storage backend testing
//!
//! Every backend under test is loaded with the placeholder [`SeedData`]
//! (bcrypt cost 4), so the contract suites can assert against known rows:
//! 6 customers, 13 invoices, 12 revenue months and one user.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! invoice_store_tests!(seeded_in_memory());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod invoice_store_tests;

#[macro_use]
pub mod integration;

use chrono::NaiveDate;
use dashboard::core::model::{InvoiceStatus, NewInvoiceRow};
use dashboard::storage::seed::{SEED_USER_EMAIL, SEED_USER_PASSWORD};
use dashboard::storage::{InMemoryStore, SeedData};
use std::collections::HashMap;
use std::sync::Arc;

pub const TEST_HASH_COST: u32 = 4;

// Placeholder customer ids
pub const EVIL_RABBIT: &str = "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa";
pub const LEE_ROBINSON: &str = "3958dc9e-742f-4377-85e9-fec4b6a6442a";
pub const AMY_BURNS: &str = "cc27c14a-0acf-4f4a-a6c9-d45682c144b9";

// Placeholder totals
pub const SEED_INVOICES: usize = 13;
pub const SEED_CUSTOMERS: usize = 6;
pub const SEED_PAID_TOTAL: i64 = 100_626;
pub const SEED_PENDING_TOTAL: i64 = 125_632;

pub fn seed_data() -> SeedData {
    SeedData::placeholder_with_cost(TEST_HASH_COST).unwrap()
}

/// An in-memory store holding the placeholder data
pub fn seeded_in_memory() -> InMemoryStore {
    let store = InMemoryStore::new();
    seed_data().load_into(&store).unwrap();
    store
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn new_invoice(customer_id: &str, amount: i64, status: InvoiceStatus, on: NaiveDate) -> NewInvoiceRow {
    NewInvoiceRow {
        customer_id: customer_id.to_string(),
        amount,
        status,
        date: on,
    }
}

/// Build a form submission from field pairs
pub fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Sign-in form for the placeholder user
pub fn seed_credentials() -> HashMap<String, String> {
    form(&[("email", SEED_USER_EMAIL), ("password", SEED_USER_PASSWORD)])
}

/// Assert that a list contains exactly `n` items.
pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
