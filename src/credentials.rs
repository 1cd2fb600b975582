//! Bearer token persistence and lookup.
//!
//! A [`CredentialProvider`] hands the current token to the HTTP client
//! before every request. A [`TokenStore`] additionally persists the token
//! across runs; every store is a provider, so the session and the client
//! can share one store behind an [`Arc`](std::sync::Arc).

#[cfg(feature = "token-file")]
mod file;
mod memory;

#[cfg(feature = "token-file")]
pub use file::FileTokenStore;
pub use memory::InMemoryTokenStore;

use secrecy::SecretString;

use crate::error::Result;

/// Supplies the bearer token attached to outgoing requests.
pub trait CredentialProvider: core::fmt::Debug + Send + Sync {
    /// Returns the current token, or `None` when no user is signed in.
    fn token(&self) -> Option<SecretString>;
}

/// Persistent slot holding the session token.
pub trait TokenStore: core::fmt::Debug + Send + Sync {
    /// Loads the persisted token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<SecretString>>;

    /// Persists a token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &SecretString) -> Result<()>;

    /// Removes the persisted token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<()>;
}

impl<S: TokenStore> CredentialProvider for S {
    #[inline]
    fn token(&self) -> Option<SecretString> {
        match self.load() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored token");
                None
            }
        }
    }
}

/// A fixed token, for scripts and tests that skip the login flow.
#[derive(Debug, Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    /// Wraps a raw token.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(token: T) -> Self {
        Self(SecretString::from(token.into()))
    }
}

impl CredentialProvider for StaticToken {
    #[inline]
    fn token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;

    #[test]
    fn static_token_always_present() {
        let provider = StaticToken::new("abc");
        assert_eq!(provider.token().unwrap().expose_secret(), "abc");
    }

    #[test]
    fn store_acts_as_provider() {
        let store = InMemoryTokenStore::new();
        assert!(store.token().is_none());
        store.save(&SecretString::from("t1".to_owned())).unwrap();
        assert_eq!(store.token().unwrap().expose_secret(), "t1");
        store.clear().unwrap();
        assert!(store.token().is_none());
    }
}
