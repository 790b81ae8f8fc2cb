// Coalescing schema cache.
//
// Each key is in one of three states: absent, in flight, or cached. The first
// caller to miss a key claims it and spawns the fetch; callers arriving while
// the fetch runs join it and receive the same result. Successful results are
// kept for the lifetime of the process, failures are dropped so the next
// caller starts a fresh fetch.
use crate::errors::{FetchFailure, SchemaError};
use crate::fetcher::Fetcher;
use crate::metrics_defs::{
    SCHEMA_CACHE_COALESCED, SCHEMA_CACHE_ENTRIES, SCHEMA_CACHE_HIT, SCHEMA_CACHE_MISS,
};
use bytes::Bytes;
use parking_lot::Mutex;
use shared::{counter, gauge};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

// `None` until the leader publishes its result.
type Outcome = Option<Result<Bytes, SchemaError>>;

enum Slot {
    Cached(Bytes),
    InFlight(watch::Receiver<Outcome>),
}

struct CacheInner {
    fetcher: Arc<dyn Fetcher>,
    slots: Mutex<HashMap<String, Slot>>,
}

/// Process-wide schema cache. Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct SchemaCache {
    inner: Arc<CacheInner>,
}

enum Claim {
    Hit(Bytes),
    Wait(watch::Receiver<Outcome>),
}

impl SchemaCache {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        SchemaCache {
            inner: Arc::new(CacheInner {
                fetcher,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the schema stored under `key`, fetching it if needed.
    ///
    /// At most one fetch per key is in flight at any time. Every caller that
    /// waits on a fetch receives its result, success or failure.
    pub async fn get(&self, key: &str) -> Result<Bytes, SchemaError> {
        let mut rx = match self.claim_or_join(key) {
            Claim::Hit(schema) => return Ok(schema),
            Claim::Wait(rx) => rx,
        };

        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            // The leader went away without publishing a result
            Err(_) => None,
        };

        outcome.unwrap_or_else(|| Err(FetchFailure::Aborted.into()))
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.inner
            .slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Cached(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Lookup and registration happen under one lock so two callers can never
    // both become the leader for a key.
    fn claim_or_join(&self, key: &str) -> Claim {
        let mut slots = self.inner.slots.lock();

        match slots.get(key) {
            Some(Slot::Cached(schema)) => {
                tracing::debug!(key, "Load schema from cache");
                counter!(SCHEMA_CACHE_HIT).increment(1);
                return Claim::Hit(schema.clone());
            }
            Some(Slot::InFlight(rx)) => {
                tracing::debug!(key, "Join in-flight schema fetch");
                counter!(SCHEMA_CACHE_COALESCED).increment(1);
                return Claim::Wait(rx.clone());
            }
            None => {}
        }

        counter!(SCHEMA_CACHE_MISS).increment(1);
        let (tx, rx) = watch::channel(None);
        slots.insert(key.to_string(), Slot::InFlight(rx.clone()));
        drop(slots);

        // Detached so the fetch completes even if every waiting request is dropped.
        let leader = Leader {
            inner: self.inner.clone(),
            key: key.to_string(),
            tx,
            resolved: false,
        };
        tokio::spawn(leader.run());

        Claim::Wait(rx)
    }
}

/// Owns the in-flight slot for one key until the fetch resolves.
struct Leader {
    inner: Arc<CacheInner>,
    key: String,
    tx: watch::Sender<Outcome>,
    resolved: bool,
}

impl Leader {
    async fn run(mut self) {
        let result = self.inner.fetcher.fetch(&self.key).await;
        self.resolve(result);
    }

    fn resolve(&mut self, result: Result<Bytes, SchemaError>) {
        {
            let mut slots = self.inner.slots.lock();
            match &result {
                Ok(schema) => {
                    slots.insert(self.key.clone(), Slot::Cached(schema.clone()));
                    gauge!(SCHEMA_CACHE_ENTRIES).increment(1.0);
                }
                Err(e) => {
                    slots.remove(&self.key);
                    tracing::warn!(key = %self.key, error = %e, "Schema fetch failed");
                }
            }
        }

        self.resolved = true;
        self.tx.send_replace(Some(result));
    }
}

impl Drop for Leader {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }

        // The fetch panicked or its task was cancelled. Free the key so the
        // next caller starts over; waiters see the closed channel.
        tracing::error!(key = %self.key, "Schema fetch ended without a result");
        let mut slots = self.inner.slots.lock();
        if let Some(Slot::InFlight(_)) = slots.get(&self.key) {
            slots.remove(&self.key);
        }
    }
}
