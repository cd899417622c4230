//! Durable key-value storage for the Name Value leaderboard.
//!
//! The ledger persists two logical keys: the participant collection and the
//! session-metadata record. Both are JSON strings. This crate hides which
//! backend holds them behind the [`KvStore`] enum.
//!
//! # Backends
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`] | Tests and throwaway sessions |
//! | [`FileStore`] | One JSON file per key in a data directory |
//! | [`DragonflyPool`] | `Dragonfly` / Redis-compatible server |
//!
//! # Modules
//!
//! - [`store`] -- The [`KvStore`] dispatch enum and typed JSON helpers
//! - [`memory`] -- In-memory backend
//! - [`file`] -- JSON file backend
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend
//! - [`config`] -- Backend selection from configuration
//! - [`error`] -- Shared error types

pub mod config;
pub mod dragonfly;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use config::{StorageBackend, StorageConfig};
pub use dragonfly::DragonflyPool;
pub use error::DbError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::KvStore;

/// Key holding the participant collection (JSON array).
pub const PARTICIPANTS_KEY: &str = "namevalue:participants:v1";

/// Key holding the session-metadata record (JSON object).
pub const SESSION_KEY: &str = "namevalue:session:v1";
