//! Backend dispatch for the durable key-value store.
//!
//! Uses an enum instead of a trait object: the operations are async and
//! the set of backends is closed.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{StorageBackend, StorageConfig};
use crate::dragonfly::DragonflyPool;
use crate::error::DbError;
use crate::file::FileStore;
use crate::memory::MemoryStore;

/// A durable key-value store holding JSON documents.
#[derive(Debug, Clone)]
pub enum KvStore {
    /// Process memory.
    Memory(MemoryStore),
    /// One JSON file per key.
    File(FileStore),
    /// `Dragonfly` / Redis.
    Dragonfly(DragonflyPool),
}

impl KvStore {
    /// Open the backend selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the data directory cannot be created or the
    /// `Dragonfly` connection fails.
    pub async fn open(config: &StorageConfig) -> Result<Self, DbError> {
        match config.backend {
            StorageBackend::Memory => Ok(Self::Memory(MemoryStore::new())),
            StorageBackend::File => Ok(Self::File(FileStore::open(&config.data_dir).await?)),
            StorageBackend::Dragonfly => Ok(Self::Dragonfly(
                DragonflyPool::connect(&config.dragonfly_url).await?,
            )),
        }
    }

    /// Create a fresh in-memory store.
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Human-readable backend name for logging.
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
            Self::Dragonfly(_) => "dragonfly",
        }
    }

    /// Read the raw string at `key`. Missing keys read as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        match self {
            Self::Memory(store) => Ok(store.get(key).await),
            Self::File(store) => store.get(key).await,
            Self::Dragonfly(pool) => pool.get(key).await,
        }
    }

    /// Replace the raw string at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend write fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        match self {
            Self::Memory(store) => {
                store.set(key, value).await;
                Ok(())
            }
            Self::File(store) => store.set(key, value).await,
            Self::Dragonfly(pool) => pool.set(key, value).await,
        }
    }

    /// Read `key` and deserialize it from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored value is not valid
    /// JSON for `T`, or the backend error if the read fails.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails, or the
    /// backend error if the write fails.
    pub async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        self.set(key, &json).await
    }
}
