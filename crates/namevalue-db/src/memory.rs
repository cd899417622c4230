//! In-memory key-value backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// `BTreeMap`-backed store held in process memory.
///
/// Clones share the same map, so a test can keep a handle and inspect or
/// corrupt the raw values the ledger wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the raw value at `key`.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store a raw value at `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
    }

    /// Whether the store holds no keys. Used by tests to check that a
    /// no-op never wrote.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
