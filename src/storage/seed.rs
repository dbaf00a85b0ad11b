//! Placeholder data for development and demos
//!
//! Identifiers are fixed, so seeding the same store twice does not
//! duplicate rows.

use super::in_memory::InMemoryStore;
use crate::core::model::{Customer, Invoice, InvoiceStatus, Revenue, User};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use uuid::Uuid;

/// bcrypt cost used for the seed user's password
pub const SEED_HASH_COST: u32 = 10;

pub const SEED_USER_EMAIL: &str = "user@nextmail.com";
pub const SEED_USER_PASSWORD: &str = "123456";

const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    (
        "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa",
        "Evil Rabbit",
        "evil@rabbit.com",
        "/customers/evil-rabbit.png",
    ),
    (
        "3958dc9e-712f-4377-85e9-fec4b6a6442a",
        "Delba de Oliveira",
        "delba@oliveira.com",
        "/customers/delba-de-oliveira.png",
    ),
    (
        "3958dc9e-742f-4377-85e9-fec4b6a6442a",
        "Lee Robinson",
        "lee@robinson.com",
        "/customers/lee-robinson.png",
    ),
    (
        "76d65c26-f784-44a2-ac19-586678f7c2f2",
        "Michael Novotny",
        "michael@novotny.com",
        "/customers/michael-novotny.png",
    ),
    (
        "cc27c14a-0acf-4f4a-a6c9-d45682c144b9",
        "Amy Burns",
        "amy@burns.com",
        "/customers/amy-burns.png",
    ),
    (
        "13d07535-c59e-4157-a011-f8d2ef4e0cbb",
        "Balazs Orban",
        "balazs@orban.com",
        "/customers/balazs-orban.png",
    ),
];

// (customer index, amount in cents, status, date)
const INVOICES: &[(usize, i64, &str, &str)] = &[
    (0, 15795, "pending", "2022-12-06"),
    (1, 20348, "pending", "2022-11-14"),
    (4, 3040, "paid", "2022-10-29"),
    (3, 44800, "paid", "2023-09-10"),
    (5, 34577, "pending", "2023-08-05"),
    (2, 54246, "pending", "2023-07-16"),
    (0, 666, "pending", "2023-06-27"),
    (3, 32545, "paid", "2023-06-09"),
    (4, 1250, "paid", "2023-06-17"),
    (5, 8546, "paid", "2023-06-07"),
    (1, 500, "paid", "2023-08-19"),
    (5, 8945, "paid", "2023-06-03"),
    (2, 1000, "paid", "2022-06-05"),
];

const REVENUE: &[(&str, i64)] = &[
    ("Jan", 2000),
    ("Feb", 1800),
    ("Mar", 2200),
    ("Apr", 2500),
    ("May", 2300),
    ("Jun", 3200),
    ("Jul", 3500),
    ("Aug", 3700),
    ("Sep", 2500),
    ("Oct", 2800),
    ("Nov", 3000),
    ("Dec", 4800),
];

const SEED_USER_ID: Uuid = Uuid::from_u128(0x410544b2_4001_4271_9855_fec4b6a6442a);
const INVOICE_ID_BASE: u128 = 0x5eed0000_0000_4000_8000_000000000000;

/// Every placeholder row, ready to load into a store
#[derive(Debug, Clone)]
pub struct SeedData {
    pub users: Vec<User>,
    pub customers: Vec<Customer>,
    pub invoices: Vec<Invoice>,
    pub revenue: Vec<Revenue>,
}

impl SeedData {
    /// Placeholder data with the user's password hashed at [`SEED_HASH_COST`]
    pub fn placeholder() -> Result<Self> {
        Self::placeholder_with_cost(SEED_HASH_COST)
    }

    /// Placeholder data with a custom bcrypt cost (tests use the minimum)
    pub fn placeholder_with_cost(cost: u32) -> Result<Self> {
        let password = bcrypt::hash(SEED_USER_PASSWORD, cost)?;
        let users = vec![User {
            id: SEED_USER_ID,
            name: "User".to_string(),
            email: SEED_USER_EMAIL.to_string(),
            password,
        }];

        let customers: Vec<Customer> = CUSTOMERS
            .iter()
            .map(|(id, name, email, image_url)| Customer {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                image_url: image_url.to_string(),
            })
            .collect();

        let invoices = INVOICES
            .iter()
            .enumerate()
            .map(|(i, (customer, amount, status, date))| -> Result<Invoice> {
                Ok(Invoice {
                    id: Uuid::from_u128(INVOICE_ID_BASE + i as u128),
                    customer_id: customers
                        .get(*customer)
                        .ok_or_else(|| anyhow!("seed invoice {} has no customer", i))?
                        .id
                        .clone(),
                    amount: *amount,
                    status: status.parse::<InvoiceStatus>().map_err(|e| anyhow!(e))?,
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let revenue = REVENUE
            .iter()
            .map(|(month, revenue)| Revenue {
                month: month.to_string(),
                revenue: *revenue,
            })
            .collect();

        Ok(Self {
            users,
            customers,
            invoices,
            revenue,
        })
    }

    /// Load every row into an in-memory store
    pub fn load_into(&self, store: &InMemoryStore) -> Result<()> {
        for user in &self.users {
            store.insert_user(user.clone())?;
        }
        for customer in &self.customers {
            store.insert_customer(customer.clone())?;
        }
        for invoice in &self.invoices {
            store.insert_invoice(invoice.clone())?;
        }
        for entry in &self.revenue {
            store.insert_revenue(entry.clone())?;
        }
        tracing::info!(
            users = self.users.len(),
            customers = self.customers.len(),
            invoices = self.invoices.len(),
            "seeded in-memory store"
        );
        Ok(())
    }
}
