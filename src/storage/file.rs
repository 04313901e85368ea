//! File-backed store
//!
//! One file per key under a root directory. Writes go through a temporary file and a rename
//! so a reader never observes a half-written value.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::storage::{KeyValueStore, StorageError};

/// A [`KeyValueStore`] persisting each key as a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // `:` maps to `--`, so `-` is not a valid key character and the mapping stays injective.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '.'))
            && !key.starts_with('.');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(format!("{}.value", key.replace(':', "--"))))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("value.tmp");

        fs::create_dir_all(&self.root).await?;
        fs::write(&staging, value).await?;
        fs::rename(&staging, &path).await?;

        debug!(key, path = %path.display(), "stored value");

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn values_survive_a_new_store_instance() -> TestResult {
        let dir = tempfile::tempdir()?;

        FileStore::new(dir.path())
            .set("favorites:labs", "[\"L1\",\"L2\"]")
            .await?;

        let reopened = FileStore::new(dir.path());

        assert_eq!(
            reopened.get("favorites:labs").await?.as_deref(),
            Some("[\"L1\",\"L2\"]")
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_root_reads_as_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("not-yet-created"));

        assert_eq!(store.get("token").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn remove_tolerates_missing_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path());

        store.set("token", "abc").await?;
        store.remove("token").await?;
        store.remove("token").await?;

        assert_eq!(store.get("token").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn separator_lookalike_keys_do_not_share_a_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path());

        store.set("favorites:kits", "[\"K1\"]").await?;

        assert!(matches!(
            store.set("favorites--kits", "[]").await,
            Err(StorageError::InvalidKey(key)) if key == "favorites--kits"
        ));
        assert_eq!(
            store.get("favorites:kits").await?.as_deref(),
            Some("[\"K1\"]")
        );

        Ok(())
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let store = FileStore::new("unused");

        for key in ["", "../escape", "a/b", ".hidden"] {
            let result = store.get(key).await;

            assert!(
                matches!(result, Err(StorageError::InvalidKey(_))),
                "expected InvalidKey for {key:?}, got {result:?}"
            );
        }
    }
}
