//! The "continue learning" progress pointer
//!
//! A singleton cursor, not a collection, so it bypasses the generic
//! collection store: the remote field holds a structured sub-object with
//! explicit fields rather than an encoded blob. The local-first rules
//! are the same — remote wins on load, cache written synchronously,
//! remote pushed fire-and-forget.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::identity::IdentityResolver;
use crate::models::ProgressPointer;
use crate::remote::RemoteDocuments;
use crate::storage::LocalCache;

const CACHE_KEY: &str = "progress";
const REMOTE_FIELD: &str = "progress";

/// Fixed identity of the singleton sub-object on the remote document
const SINGLETON_ID: &str = "progress";

/// Holder of the single progress pointer
pub struct ProgressStore {
    current: Option<ProgressPointer>,
    cache: Arc<dyn LocalCache>,
    remote: Arc<dyn RemoteDocuments>,
    identity: Arc<IdentityResolver>,
}

impl ProgressStore {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteDocuments>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            current: None,
            cache,
            remote,
            identity,
        }
    }

    /// Populate the pointer: remote truth first, local cache second
    pub async fn load(&mut self) {
        if let Some(user) = self.identity.current_key() {
            match self.remote.fetch_field(&user, REMOTE_FIELD).await {
                Ok(Some(value)) => match serde_json::from_value::<ProgressPointer>(value) {
                    Ok(pointer) => {
                        self.current = Some(pointer);
                        self.write_cache();
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "remote progress undecodable, falling back to cache");
                    }
                },
                Ok(None) => {
                    debug!("no remote progress yet");
                }
                Err(e) => {
                    warn!(error = %e, "remote fetch failed, falling back to cache");
                }
            }
        }

        self.current = self
            .cache
            .read(CACHE_KEY)
            .and_then(|bytes| match serde_json::from_slice(&bytes) {
                Ok(pointer) => Some(pointer),
                Err(e) => {
                    warn!(error = %e, "cached progress undecodable, starting unset");
                    None
                }
            });
    }

    /// The current cursor, `None` until the user has started learning
    pub fn current(&self) -> Option<ProgressPointer> {
        self.current
    }

    /// Move the cursor
    pub fn set(&mut self, pointer: ProgressPointer) {
        self.current = Some(pointer);
        self.write_cache();
        self.push_remote(remote_value(&pointer));
    }

    /// Forget the cursor (fresh start)
    pub fn clear(&mut self) {
        self.current = None;
        if let Err(e) = self.cache.remove(CACHE_KEY) {
            warn!(error = %e, "failed to remove cached progress");
        }
        self.push_remote(Value::Null);
    }

    fn write_cache(&self) {
        let Some(pointer) = &self.current else {
            return;
        };
        match serde_json::to_vec(pointer) {
            Ok(bytes) => {
                if let Err(e) = self.cache.write(CACHE_KEY, &bytes) {
                    warn!(error = %e, "progress cache write failed");
                }
            }
            Err(e) => {
                warn!(error = %e, "progress encode failed");
            }
        }
    }

    fn push_remote(&self, value: Value) {
        let Some(user) = self.identity.current_key() else {
            debug!("guest session, skipping progress push");
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime, skipping progress push");
            return;
        };

        let remote = Arc::clone(&self.remote);
        handle.spawn(async move {
            if let Err(e) = remote.put_field(&user, REMOTE_FIELD, value).await {
                warn!(error = %e, "progress push failed");
            }
        });
    }
}

/// Structured remote representation, explicit fields plus the fixed
/// singleton id
fn remote_value(pointer: &ProgressPointer) -> Value {
    let mut value = serde_json::to_value(pointer).unwrap_or(Value::Null);
    if let Some(object) = value.as_object_mut() {
        object.insert("id".to_string(), Value::String(SINGLETON_ID.to_string()));
    }
    value
}
