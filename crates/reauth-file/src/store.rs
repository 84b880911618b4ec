//! File-backed credential store.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use reauth_core::{CredentialPair, CredentialStore, StoreError};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// On-disk layout, named like the token fields of the auth endpoints.
#[derive(Serialize, Deserialize)]
struct StoredCredentials {
    access_token: String,
    refresh_token: String,
}

/// A [`CredentialStore`] that keeps the credential pair in one JSON file.
///
/// Writes go to a temporary sibling that is renamed over the target, so a
/// reader sees either the old pair or the new one, never a mix. Access is
/// serialized within the process by a mutex and across processes by an
/// advisory lock on a `.lock` sibling. On Unix the file is created `0600`.
///
/// # Example
///
/// ```no_run
/// use reauth_core::{CredentialPair, CredentialStore};
/// use reauth_file::FileStore;
///
/// let store = FileStore::new("/tmp/reauth/credentials.json");
/// store.set(&CredentialPair::new("access", "refresh"))?;
/// assert!(store.get()?.is_some());
/// # Ok::<(), reauth_core::StoreError>(())
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }

    /// Returns the path of the credentials file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn open_lock(&self) -> io::Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
    }

    fn write_temp(&self, content: &[u8]) -> io::Result<PathBuf> {
        let temp_path = self.temp_path();
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        Ok(temp_path)
    }
}

impl CredentialStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn get(&self) -> Result<Option<CredentialPair>, StoreError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        FileExt::lock_shared(&lock)?;
        let content = fs::read(&self.path);
        FileExt::unlock(&lock)?;

        let content = match content {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredCredentials =
            serde_json::from_slice(&content).map_err(|e| StoreError::Corrupt {
                message: e.to_string(),
            })?;
        Ok(Some(CredentialPair::new(
            stored.access_token,
            stored.refresh_token,
        )))
    }

    #[instrument(skip(self, pair), fields(path = %self.path.display()))]
    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);

        let stored = StoredCredentials {
            access_token: pair.access.as_str().to_string(),
            refresh_token: pair.refresh.as_str().to_string(),
        };
        let content = serde_json::to_vec_pretty(&stored).map_err(|e| StoreError::Corrupt {
            message: e.to_string(),
        })?;

        let lock = self.open_lock()?;
        FileExt::lock_exclusive(&lock)?;
        let written = self
            .write_temp(&content)
            .and_then(|temp_path| fs::rename(temp_path, &self.path));
        FileExt::unlock(&lock)?;
        written?;

        debug!("Stored credentials");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.path.exists() {
            return Ok(());
        }

        let lock = self.open_lock()?;
        FileExt::lock_exclusive(&lock)?;
        let removed = fs::remove_file(&self.path);
        FileExt::unlock(&lock)?;

        match removed {
            Ok(()) => {
                debug!("Cleared credentials");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_and_temp_files_are_siblings() {
        let store = FileStore::new("/data/reauth/credentials.json");
        assert_eq!(store.lock_path(), Path::new("/data/reauth/credentials.lock"));
        assert_eq!(store.temp_path(), Path::new("/data/reauth/credentials.tmp"));
    }
}
