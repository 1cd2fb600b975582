//! In-memory token store.

use std::sync::{Mutex, MutexGuard};

use secrecy::SecretString;

use crate::error::{FinanceError, Result};

/// Thread-safe token slot that lives only as long as the process.
///
/// Useful for tests and for embedding the client where persistence is
/// handled elsewhere.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use fintrack_rs::credentials::{CredentialProvider as _, InMemoryTokenStore};
///
/// let store = Arc::new(InMemoryTokenStore::new());
/// assert!(store.token().is_none());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    /// Current token behind a mutex for interior mutability.
    inner: Mutex<Option<SecretString>>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    #[inline]
    #[must_use]
    pub fn with_token<T: Into<String>>(token: T) -> Self {
        Self {
            inner: Mutex::new(Some(SecretString::from(token.into()))),
        }
    }

    /// Acquires the lock and applies `op` to the slot.
    fn with_lock<R, F: FnOnce(&mut Option<SecretString>) -> R>(&self, op: F) -> Result<R> {
        let mut guard: MutexGuard<'_, Option<SecretString>> = self
            .inner
            .lock()
            .map_err(|err| FinanceError::TokenStorage(err.to_string().into()))?;
        Ok(op(&mut guard))
    }
}

impl super::TokenStore for InMemoryTokenStore {
    #[inline]
    fn load(&self) -> Result<Option<SecretString>> {
        self.with_lock(|slot| slot.clone())
    }

    #[inline]
    fn save(&self, token: &SecretString) -> Result<()> {
        self.with_lock(|slot| *slot = Some(token.clone()))
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.with_lock(|slot| *slot = None)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;
    use crate::credentials::TokenStore as _;

    #[test]
    fn save_replaces_previous_token() {
        let store = InMemoryTokenStore::with_token("old");
        store.save(&SecretString::from("new".to_owned())).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.expose_secret(), "new");
    }

    #[test]
    fn clear_is_idempotent() {
        let store = InMemoryTokenStore::new();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
