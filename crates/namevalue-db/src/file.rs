//! JSON file key-value backend.
//!
//! Each key maps to one file in the data directory. Characters outside
//! `[A-Za-z0-9._-]` are replaced by `_`, so `namevalue:participants:v1`
//! lands in `namevalue_participants_v1.json`.
//!
//! Writes go to a sibling `.tmp` file that is then renamed over the target,
//! so a crash mid-write never leaves a truncated document behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::DbError;

/// Key-value store backed by one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, DbError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| io_error(&dir, source))?;
        tracing::info!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }

    /// Read the raw value at `key`. A missing file reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] for any failure other than a missing file.
    pub async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(io_error(&path, source)),
        }
    }

    /// Replace the value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the temp file cannot be written or renamed.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| io_error(&path, source))?;
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> DbError {
    DbError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn key_is_sanitized_into_file_name() {
        let store = FileStore {
            dir: PathBuf::from("/tmp/nv"),
        };
        assert_eq!(
            store.path_for("namevalue:participants:v1"),
            PathBuf::from("/tmp/nv/namevalue_participants_v1.json")
        );
    }

    #[tokio::test]
    async fn round_trip_and_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).await.unwrap();

        assert_eq!(store.get("absent").await.unwrap(), None);

        store.set("k", "[1,2,3]").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[tokio::test]
    async fn set_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.set("k", "{}").await.unwrap();

        let tmp = store.path_for("k").with_extension("json.tmp");
        assert!(!tmp.exists());
        assert!(store.path_for("k").exists());
    }
}
