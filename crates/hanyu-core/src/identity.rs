//! Identity resolution
//!
//! Every remote document is keyed by a stable per-user key. The resolver
//! prefers an authenticated user id; failing that it derives a key from a
//! previously captured email (URL-safe encoded so it is usable as a
//! document path segment); failing that it yields `None`.
//!
//! `None` is the normal signed-out/guest state, not an error: every
//! remote operation becomes a no-op and the stores keep working purely
//! from the local cache.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Stable per-user key for the remote document store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserKey(String);

impl UserKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External identity provider
///
/// The core only reads from it; issuing and refreshing identity is the
/// host application's concern.
pub trait IdentityProvider: Send + Sync {
    /// Authenticated user id, if signed in
    fn user_id(&self) -> Option<String>;

    /// Email captured during onboarding, if any
    fn email(&self) -> Option<String>;
}

/// Resolves the current user key from the identity provider
pub struct IdentityResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// The key all remote operations are scoped to, `None` when guest
    pub fn current_key(&self) -> Option<UserKey> {
        if let Some(id) = self.provider.user_id().filter(|id| !id.is_empty()) {
            return Some(UserKey(id));
        }

        self.provider
            .email()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .map(|email| UserKey(URL_SAFE_NO_PAD.encode(email)))
    }
}

/// Fixed identity, the simplest provider
///
/// Hosts a signed-in id, a captured email, or nothing (guest). Real
/// applications implement [`IdentityProvider`] over their auth SDK.
pub struct FixedIdentity {
    user_id: Option<String>,
    email: Option<String>,
}

impl FixedIdentity {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: None,
        }
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            user_id: None,
            email: Some(email.into()),
        }
    }

    pub fn guest() -> Self {
        Self {
            user_id: None,
            email: None,
        }
    }
}

impl IdentityProvider for FixedIdentity {
    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn email(&self) -> Option<String> {
        self.email.clone()
    }
}

#[cfg(test)]
pub(crate) fn test_key(s: &str) -> UserKey {
    UserKey(s.to_string())
}
