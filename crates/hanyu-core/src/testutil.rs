//! Shared test doubles and fixtures

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::identity::UserKey;
use crate::remote::{RemoteDocuments, RemoteError};

/// In-memory remote document store
///
/// One map per user key; counts operations and can be told to fail the
/// next fetch to exercise the silent-degrade paths.
pub struct MemoryRemote {
    documents: Mutex<HashMap<String, serde_json::Map<String, Value>>>,
    fetches: AtomicUsize,
    puts: AtomicUsize,
    fail_next_fetch: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            fail_next_fetch: AtomicBool::new(false),
        }
    }

    /// Seed or overwrite a field directly
    pub fn set_field(&self, user: &str, field: &str, value: Value) {
        self.documents
            .lock()
            .unwrap()
            .entry(user.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }

    /// Read back a field directly
    pub fn field(&self, user: &str, field: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap()
            .get(user)
            .and_then(|doc| doc.get(field))
            .cloned()
    }

    /// Drop every document
    pub fn clear(&self) {
        self.documents.lock().unwrap().clear();
    }

    /// Make the next `fetch_field` fail with a malformed-document error
    pub fn fail_next_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteDocuments for MemoryRemote {
    async fn fetch_field(&self, user: &UserKey, field: &str) -> Result<Option<Value>, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(RemoteError::Malformed("injected failure".to_string()));
        }
        Ok(self.field(user.as_str(), field))
    }

    async fn put_field(
        &self,
        user: &UserKey,
        field: &str,
        value: Value,
    ) -> Result<(), RemoteError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.set_field(user.as_str(), field, value);
        Ok(())
    }
}

/// Let spawned fire-and-forget pushes run to completion
///
/// The in-memory remote never blocks, so a handful of scheduler yields
/// is enough for every pending push to land.
pub async fn drain_pushes() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
