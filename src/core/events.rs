//! Internal event system for mutation and revalidation notifications
//!
//! The EventBus decouples the mutation pipeline from anything that wants to
//! react to it (the server-sent events stream, tests, future audit sinks).
//! It uses `tokio::sync::broadcast`, so publishing never blocks.
//!
//! ```text
//! InvoiceActions ──┐
//!                  ├──▶ EventBus::publish() ──▶ broadcast channel ──▶ SSE subscribers
//! ViewCache ───────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events related to invoice mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InvoiceEvent {
    Created { invoice_id: Uuid },
    Updated { invoice_id: Uuid, rows_affected: u64 },
    Deleted { invoice_id: Uuid, rows_affected: u64 },
}

/// Top-level dashboard event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// An invoice was written
    Invoice(InvoiceEvent),
    /// Cached views under a path were dropped
    Revalidated { path: String, evicted: usize },
}

impl DashboardEvent {
    pub fn event_kind(&self) -> &str {
        match self {
            DashboardEvent::Invoice(_) => "invoice",
            DashboardEvent::Revalidated { .. } => "revalidated",
        }
    }

    /// Get the invoice this event relates to (if applicable)
    pub fn invoice_id(&self) -> Option<Uuid> {
        match self {
            DashboardEvent::Invoice(
                InvoiceEvent::Created { invoice_id }
                | InvoiceEvent::Updated { invoice_id, .. }
                | InvoiceEvent::Deleted { invoice_id, .. },
            ) => Some(*invoice_id),
            DashboardEvent::Revalidated { .. } => None,
        }
    }

    /// Get the action name (created, updated, deleted, revalidated)
    pub fn action(&self) -> &str {
        match self {
            DashboardEvent::Invoice(InvoiceEvent::Created { .. }) => "created",
            DashboardEvent::Invoice(InvoiceEvent::Updated { .. }) => "updated",
            DashboardEvent::Invoice(InvoiceEvent::Deleted { .. }) => "deleted",
            DashboardEvent::Revalidated { .. } => "revalidated",
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: DashboardEvent,
}

impl EventEnvelope {
    pub fn new(event: DashboardEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone (Arc internally) and shareable across threads.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. With no subscribers the event is dropped.
    /// Returns the number of receivers that will receive the event.
    pub fn publish(&self, event: DashboardEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
