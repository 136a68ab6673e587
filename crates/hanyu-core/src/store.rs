//! Synchronized local-first store
//!
//! The generalized collection manager behind every stateful feature:
//! an in-memory collection that is the single source of truth for the
//! UI, persisted synchronously to the local cache and pushed
//! asynchronously, best-effort, to one field of the user's remote
//! document.
//!
//! ## Consistency model
//!
//! - After `mutate` returns, memory and the local cache always agree.
//! - The remote field may lag and its write may silently fail; every
//!   push carries the full collection, so the last push to complete
//!   wins.
//! - On `load`, a present and decodable remote field fully replaces
//!   local state, even when empty. This is what recovers cloud data
//!   after a device reinstall.
//!
//! All mutation happens on a single UI-bound sequence; the store does
//! not serialize overlapping pushes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::identity::IdentityResolver;
use crate::models::RecordId;
use crate::remote::RemoteDocuments;
use crate::storage::LocalCache;

/// An entity persisted through a [`SyncedStore`]
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable identity, unique within the collection
    fn id(&self) -> &RecordId;

    /// Timestamp used for display ordering, newest first
    ///
    /// Collections whose records return `None` keep insertion order.
    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Names binding one store to its cache blob and remote field
#[derive(Debug, Clone, Copy)]
pub struct StoreName {
    /// Local cache key; embeds the schema version (`quiz_results_v2`)
    pub cache_key: &'static str,
    /// Field on the user's remote document
    pub remote_field: &'static str,
}

/// Observable, ordered, durable collection of `T`
pub struct SyncedStore<T: Record> {
    name: StoreName,
    records: Vec<T>,
    cache: Arc<dyn LocalCache>,
    remote: Arc<dyn RemoteDocuments>,
    identity: Arc<IdentityResolver>,
}

impl<T: Record> SyncedStore<T> {
    /// Create an empty store; call [`load`](Self::load) before first use
    pub fn new(
        name: StoreName,
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteDocuments>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            name,
            records: Vec::new(),
            cache,
            remote,
            identity,
        }
    }

    /// Populate the collection: remote truth first, local cache second
    ///
    /// A present, decodable remote field fully replaces the collection
    /// and is written through to the cache. An absent field, a fetch
    /// failure, or a guest identity falls back to the cached blob; a
    /// missing or corrupt blob starts the collection empty. Never fails.
    pub async fn load(&mut self) {
        if let Some(user) = self.identity.current_key() {
            match self.remote.fetch_field(&user, self.name.remote_field).await {
                Ok(Some(value)) => match decode_field::<T>(&value) {
                    Ok(records) => {
                        self.records = records;
                        self.resort();
                        self.write_cache();
                        debug!(
                            store = self.name.cache_key,
                            count = self.records.len(),
                            "loaded collection from remote"
                        );
                        return;
                    }
                    Err(e) => {
                        warn!(
                            store = self.name.cache_key,
                            error = %e,
                            "remote field undecodable, falling back to cache"
                        );
                    }
                },
                Ok(None) => {
                    debug!(store = self.name.cache_key, "no remote field yet");
                }
                Err(e) => {
                    warn!(
                        store = self.name.cache_key,
                        error = %e,
                        "remote fetch failed, falling back to cache"
                    );
                }
            }
        }

        self.records = self.read_cache();
        self.resort();
    }

    /// Apply a pure transformation to the collection
    ///
    /// Synchronously re-encodes and writes the cache blob, then pushes
    /// the same blob to the remote field fire-and-forget. If encoding
    /// fails the previous collection is restored and nothing is written.
    pub fn mutate<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Vec<T>),
    {
        let previous = self.records.clone();
        f(&mut self.records);
        self.resort();

        let payload = match serde_json::to_string(&self.records) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    store = self.name.cache_key,
                    error = %e,
                    "encode failed, keeping previous collection"
                );
                self.records = previous;
                return;
            }
        };

        if let Err(e) = self.cache.write(self.name.cache_key, payload.as_bytes()) {
            warn!(
                store = self.name.cache_key,
                error = %e,
                "cache write failed, continuing in memory"
            );
        }

        self.push_remote(payload);
    }

    /// Remove the record with the given id
    pub fn delete(&mut self, id: &RecordId) {
        let id = id.clone();
        self.mutate(|records| records.retain(|r| *r.id() != id));
    }

    /// Remove every record whose id is in `ids`
    pub fn delete_all(&mut self, ids: &[RecordId]) {
        let ids = ids.to_vec();
        self.mutate(|records| records.retain(|r| !ids.contains(r.id())));
    }

    /// The ordered in-memory collection
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Look up a record by id
    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display ordering: newest first by `recorded_at`
    ///
    /// Stable sort, so collections without timestamps keep their
    /// insertion order.
    fn resort(&mut self) {
        self.records
            .sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));
    }

    fn read_cache(&self) -> Vec<T> {
        let Some(bytes) = self.cache.read(self.name.cache_key) else {
            return Vec::new();
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                // Corrupt or schema-mismatched blob degrades to absent
                warn!(
                    store = self.name.cache_key,
                    error = %e,
                    "cache blob undecodable, starting empty"
                );
                Vec::new()
            }
        }
    }

    fn write_cache(&self) {
        match serde_json::to_vec(&self.records) {
            Ok(bytes) => {
                if let Err(e) = self.cache.write(self.name.cache_key, &bytes) {
                    warn!(store = self.name.cache_key, error = %e, "cache write failed");
                }
            }
            Err(e) => {
                warn!(store = self.name.cache_key, error = %e, "cache encode failed");
            }
        }
    }

    /// Fire-and-forget push of the full collection to the remote field
    ///
    /// Skipped silently for guests and outside a tokio runtime. A failed
    /// push is logged; the store continues from its last good state.
    fn push_remote(&self, payload: String) {
        let Some(user) = self.identity.current_key() else {
            debug!(store = self.name.cache_key, "guest session, skipping push");
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(
                store = self.name.cache_key,
                "no async runtime, skipping push"
            );
            return;
        };

        let remote = Arc::clone(&self.remote);
        let field = self.name.remote_field;
        let cache_key = self.name.cache_key;
        handle.spawn(async move {
            if let Err(e) = remote.put_field(&user, field, Value::String(payload)).await {
                warn!(store = cache_key, error = %e, "remote push failed");
            }
        });
    }
}

/// Decode a remote field into a collection
///
/// The field normally holds an encoded string blob, but a structured
/// JSON array written by another client is accepted too.
fn decode_field<T: DeserializeOwned>(value: &Value) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::String(blob) => serde_json::from_str(blob),
        other => serde_json::from_value(other.clone()),
    }
}
