//! View cache and revalidation
//!
//! List views are cached under a path plus a normalised query string, with
//! a bounded number of entries. Revalidating a path drops the entry for that
//! path and for every query-string or sub-path variant of it, so the next
//! read refetches.

use crate::core::events::{DashboardEvent, EventBus};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

/// Path of the invoices collection view
pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// Something that can mark cached views under a path as stale
pub trait Revalidate: Send + Sync {
    fn revalidate_path(&self, path: &str) -> Result<()>;
}

/// Upper bound on cached views unless overridden
pub const DEFAULT_MAX_ENTRIES: usize = 256;

#[derive(Debug, Clone)]
struct CachedView {
    body: Value,
    cached_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CachedView>,
    /// Bumped by every invalidation
    epoch: u64,
    /// Epoch of the latest invalidation of each path
    invalidated_at: HashMap<String, u64>,
}

impl CacheState {
    /// Whether some path covering `key` was invalidated after `epoch`
    fn invalidated_since(&self, key: &str, epoch: u64) -> bool {
        self.invalidated_at
            .iter()
            .any(|(path, at)| *at > epoch && is_under(key, path))
    }

    fn store(&mut self, key: &str, body: Value, max_entries: usize) {
        if !self.entries.contains_key(key) && self.entries.len() >= max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, view)| view.cached_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            key.to_string(),
            CachedView {
                body,
                cached_at: Utc::now(),
            },
        );
    }
}

/// In-process cache of rendered (JSON) views
#[derive(Clone)]
pub struct ViewCache {
    state: Arc<RwLock<CacheState>>,
    max_entries: usize,
    events: Option<EventBus>,
}

impl Default for ViewCache {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            max_entries: DEFAULT_MAX_ENTRIES,
            events: None,
        }
    }
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a `Revalidated` event for every invalidation
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Keep at most `max_entries` views; the oldest is evicted first
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(state.entries.get(key).map(|view| view.body.clone()))
    }

    /// When the entry for `key` was stored, if present
    pub fn cached_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(state.entries.get(key).map(|view| view.cached_at))
    }

    pub fn insert(&self, key: &str, body: Value) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        state.store(key, body, self.max_entries);
        Ok(())
    }

    /// Return the cached view for `key`, loading and storing it on a miss
    ///
    /// Load failures are returned as-is and nothing is cached. A load that
    /// overlaps an invalidation of a path covering `key` is returned to the
    /// caller but not stored.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let started = {
            let state = self
                .state
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

            if let Some(view) = state.entries.get(key) {
                tracing::debug!(key, "view cache hit");
                return Ok(view.body.clone());
            }
            state.epoch
        };

        tracing::debug!(key, "view cache miss");
        let body = load().await?;

        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        if state.invalidated_since(key, started) {
            tracing::debug!(key, "discarding view loaded across a revalidation");
        } else {
            state.store(key, body.clone(), self.max_entries);
        }
        Ok(body)
    }

    /// Drop every entry under `path`; returns how many were dropped
    pub fn invalidate(&self, path: &str) -> Result<usize> {
        let evicted = {
            let mut state = self
                .state
                .write()
                .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

            state.epoch += 1;
            let epoch = state.epoch;
            state.invalidated_at.insert(path.to_string(), epoch);

            let before = state.entries.len();
            state.entries.retain(|key, _| !is_under(key, path));
            before - state.entries.len()
        };

        if let Some(events) = &self.events {
            events.publish(DashboardEvent::Revalidated {
                path: path.to_string(),
                evicted,
            });
        }

        Ok(evicted)
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Revalidate for ViewCache {
    fn revalidate_path(&self, path: &str) -> Result<()> {
        let evicted = self.invalidate(path)?;
        tracing::debug!(path, evicted, "revalidated path");
        Ok(())
    }
}

fn is_under(key: &str, path: &str) -> bool {
    if path.ends_with('/') {
        return key.starts_with(path);
    }
    match key.strip_prefix(path) {
        Some(rest) => rest.is_empty() || rest.starts_with('?') || rest.starts_with('/'),
        None => false,
    }
}
