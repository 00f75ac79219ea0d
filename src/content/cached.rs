//! Revalidation window around a content store.
//!
//! A successful result (including not-found) is reused for the configured
//! window; the first request after expiry fetches again. Failures are never
//! stored, so a transient outage does not outlive the request that saw it.
//! Entries are whole immutable JSON values replaced wholesale, which keeps
//! the lock hold times to a map lookup or insert.

use super::{ContentError, ContentStore, Query};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

struct Entry {
    value: Arc<Value>,
    fetched_at: Instant,
}

pub struct CachedStore<S> {
    inner: S,
    window: Duration,
    entries: Mutex<HashMap<Query, Entry>>,
}

impl<S: ContentStore> CachedStore<S> {
    /// Wrap `inner`. A zero window disables reuse.
    pub fn new(inner: S, window: Duration) -> Self {
        Self {
            inner,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn lookup(&self, query: &Query) -> Option<Arc<Value>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(query)
            .filter(|entry| entry.fetched_at.elapsed() < self.window)
            .map(|entry| Arc::clone(&entry.value))
    }

    fn store(&self, query: &Query, value: Arc<Value>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            query.clone(),
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl<S: ContentStore> ContentStore for CachedStore<S> {
    async fn fetch(&self, query: &Query) -> Result<Value, ContentError> {
        if self.window.is_zero() {
            return self.inner.fetch(query).await;
        }
        if let Some(value) = self.lookup(query) {
            debug!(kind = query.kind(), "content cache hit");
            return Ok(Value::clone(&value));
        }

        debug!(kind = query.kind(), "content cache miss");
        let value = Arc::new(self.inner.fetch(query).await?);
        self.store(query, Arc::clone(&value));
        Ok(Arc::unwrap_or_clone(value))
    }
}
