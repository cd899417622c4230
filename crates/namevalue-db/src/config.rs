//! Storage backend selection.
//!
//! Mirrors the `storage` section of `namevalue-config.yaml`:
//!
//! ```yaml
//! storage:
//!   backend: file          # memory | file | dragonfly
//!   data_dir: data
//!   dragonfly_url: redis://localhost:6379
//! ```

use std::path::PathBuf;

use serde::Deserialize;

/// Which backend holds the durable keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on restart.
    Memory,
    /// JSON files under [`StorageConfig::data_dir`].
    #[default]
    File,
    /// A `Dragonfly` (Redis-compatible) server.
    Dragonfly,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Selected backend.
    pub backend: StorageBackend,
    /// Directory for the file backend.
    pub data_dir: PathBuf,
    /// Connection URL for the `Dragonfly` backend.
    pub dragonfly_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("data"),
            dragonfly_url: String::from("redis://localhost:6379"),
        }
    }
}

impl StorageConfig {
    /// Apply environment variable overrides.
    ///
    /// - `DRAGONFLY_URL` overrides `dragonfly_url`
    /// - `NAMEVALUE_DATA_DIR` overrides `data_dir`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DRAGONFLY_URL") {
            self.dragonfly_url = url;
        }
        if let Ok(dir) = std::env::var("NAMEVALUE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_file_backend() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::File);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn backend_parses_lowercase() {
        let parsed: Result<StorageBackend, _> = serde_json::from_str("\"dragonfly\"");
        assert_eq!(parsed.ok(), Some(StorageBackend::Dragonfly));
    }
}
