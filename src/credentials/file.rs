//! JSON-file-based token store.
//!
//! Persists the session token in `token.json` under a configurable
//! directory (default: `$XDG_DATA_HOME/fintrack-rs/`).

use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, Result};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "fintrack-rs";

/// File holding the token.
const TOKEN_FILE: &str = "token.json";

/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "token.lock";

/// On-disk layout: a single object with the fixed key `token`.
#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    /// Raw bearer token.
    token: String,
}

/// File-backed token store.
///
/// # Concurrency
///
/// An in-process [`Mutex`] serializes access from threads; an advisory
/// lock on `token.lock` serializes access from other `fintrack` processes.
/// Writes go to a temporary file that is then renamed over `token.json`.
///
/// # File layout
///
/// ```text
/// <dir>/
///   token.lock   (cross-process lock sentinel)
///   token.json   {"token": "<jwt>"}
/// ```
#[derive(Debug)]
pub struct FileTokenStore {
    /// Directory containing the token file.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileTokenStore {
    /// Creates a store rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/fintrack-rs/` (typically
    /// `~/.local/share/fintrack-rs/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                FinanceError::TokenStorage("could not determine platform data directory".into())
            })
    }

    /// Path of the token file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    /// Acquires the in-process mutex and an advisory file lock (shared or
    /// exclusive), executes `op`, then releases the file lock.
    fn with_lock<R, F: FnOnce() -> Result<R>>(&self, exclusive: bool, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        if exclusive {
            self.lock_file.lock().map_err(storage_io_error)?;
        } else {
            self.lock_file.lock_shared().map_err(storage_io_error)?;
        }
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads the token file. A missing file means no token.
    fn read_token(&self) -> Result<Option<SecretString>> {
        match fs::read_to_string(self.path()) {
            Ok(contents) => {
                let file: TokenFile = serde_json::from_str(&contents)?;
                Ok((!file.token.is_empty()).then(|| SecretString::from(file.token)))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Atomically writes the token file (write-to-tmp then rename). The
    /// file is readable by its owner only.
    fn write_token(&self, token: &SecretString) -> Result<()> {
        let path = self.path();
        let tmp_path = self.dir.join(format!("{TOKEN_FILE}.tmp"));
        let json = serde_json::to_string(&TokenFile {
            token: token.expose_secret().to_owned(),
        })?;
        // A stale tmp file would keep its old permissions.
        match fs::remove_file(&tmp_path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(storage_io_error(err)),
        }
        let mut options = fs::OpenOptions::new();
        let _opts = options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt as _;
            let _opts = options.mode(0o600);
        }
        let mut file = options.open(&tmp_path).map_err(storage_io_error)?;
        file.write_all(json.as_bytes()).map_err(storage_io_error)?;
        file.sync_all().map_err(storage_io_error)?;
        drop(file);
        fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
        Ok(())
    }

    /// Deletes the token file, ignoring a file that is already gone.
    fn remove_token(&self) -> Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_io_error(err)),
        }
    }
}

impl super::TokenStore for FileTokenStore {
    #[inline]
    fn load(&self) -> Result<Option<SecretString>> {
        self.with_lock(false, || self.read_token())
    }

    #[inline]
    fn save(&self, token: &SecretString) -> Result<()> {
        tracing::debug!(path = %self.path().display(), "persisting token");
        self.with_lock(true, || self.write_token(token))
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        tracing::debug!(path = %self.path().display(), "clearing token");
        self.with_lock(true, || self.remove_token())
    }
}

/// Wraps an I/O error into a [`FinanceError::TokenStorage`].
fn storage_io_error(err: std::io::Error) -> FinanceError {
    FinanceError::TokenStorage(Box::new(err))
}

/// Wraps a mutex poison error into a [`FinanceError::TokenStorage`].
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> FinanceError {
    FinanceError::TokenStorage(err.to_string().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::TokenStore as _;

    /// Helper to create a [`FileTokenStore`] in a temporary directory.
    fn temp_store() -> (FileTokenStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf()).unwrap();
        (store, dir)
    }

    #[test]
    fn empty_store_has_no_token() {
        let (store, _dir) = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let (store, _dir) = temp_store();
        store.save(&SecretString::from("abc.def.ghi".to_owned())).unwrap();
        let token = store.load().unwrap().unwrap();
        assert_eq!(token.expose_secret(), "abc.def.ghi");
    }

    #[test]
    fn file_uses_fixed_token_key() {
        let (store, _dir) = temp_store();
        store.save(&SecretString::from("jwt".to_owned())).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["token"], "jwt");
    }

    #[test]
    fn token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileTokenStore::new(dir.path().to_path_buf()).unwrap();
            store.save(&SecretString::from("persisted".to_owned())).unwrap();
        }
        let reopened = FileTokenStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            reopened.load().unwrap().unwrap().expose_secret(),
            "persisted"
        );
    }

    #[test]
    fn clear_removes_file() {
        let (store, _dir) = temp_store();
        store.save(&SecretString::from("t".to_owned())).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_serialization_error() {
        let (store, _dir) = temp_store();
        fs::write(store.path(), "not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, FinanceError::Serialization(_)));
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt as _;

        let (store, _dir) = temp_store();
        let tmp_path = store.dir.join(format!("{TOKEN_FILE}.tmp"));
        fs::write(&tmp_path, "stale").unwrap();
        store.save(&SecretString::from("a.b.c".to_owned())).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "mode {mode:o}");
        assert!(!tmp_path.exists());
        assert_eq!(store.load().unwrap().unwrap().expose_secret(), "a.b.c");
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        if let Ok(dir) = FileTokenStore::default_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }
}
