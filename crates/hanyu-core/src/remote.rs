//! Remote document store
//!
//! One JSON document per user key in the `users` collection. Each logical
//! store owns a single field on that document holding an encoded blob of
//! the whole collection (the progress pointer is the one structured
//! exception). Writes are whole-field overwrites; the last write to
//! complete wins.
//!
//! There are no retries, timeouts, or backoff here. Callers treat every
//! failure as a silent-degrade event and keep operating from local state.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::identity::UserKey;

/// Errors from the remote document store
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport or server failure
    #[error("remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not a JSON document
    #[error("remote document malformed: {0}")]
    Malformed(String),
}

/// Per-user document access, one field per logical store
#[async_trait]
pub trait RemoteDocuments: Send + Sync {
    /// Fetch one field of the user's document
    ///
    /// `Ok(None)` means the document or field does not exist yet, which
    /// is the normal state for a fresh account.
    async fn fetch_field(&self, user: &UserKey, field: &str) -> Result<Option<Value>, RemoteError>;

    /// Overwrite one field of the user's document, creating the document
    /// if necessary
    async fn put_field(&self, user: &UserKey, field: &str, value: Value)
        -> Result<(), RemoteError>;
}

/// HTTP-backed document store
///
/// Documents live at `{base_url}/users/{key}`. `GET` returns the whole
/// document; `PATCH` merges the given fields into it.
pub struct HttpRemote {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn document_url(&self, user: &UserKey) -> String {
        format!("{}/users/{}", self.base_url, user)
    }
}

#[async_trait]
impl RemoteDocuments for HttpRemote {
    async fn fetch_field(&self, user: &UserKey, field: &str) -> Result<Option<Value>, RemoteError> {
        let url = self.document_url(user);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(field, "no remote document for user yet");
            return Ok(None);
        }

        let document: Value = response.error_for_status()?.json().await?;
        let Some(object) = document.as_object() else {
            return Err(RemoteError::Malformed(format!(
                "expected a JSON object at {url}"
            )));
        };

        Ok(object.get(field).filter(|v| !v.is_null()).cloned())
    }

    async fn put_field(
        &self,
        user: &UserKey,
        field: &str,
        value: Value,
    ) -> Result<(), RemoteError> {
        let mut patch = serde_json::Map::new();
        patch.insert(field.to_string(), value);

        self.client
            .patch(self.document_url(user))
            .json(&Value::Object(patch))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url() {
        let remote = HttpRemote::new("https://sync.example.com/v1/");
        let user = crate::identity::test_key("uid-42");

        assert_eq!(
            remote.document_url(&user),
            "https://sync.example.com/v1/users/uid-42"
        );
    }
}
