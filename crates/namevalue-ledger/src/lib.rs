//! Point ledger and ranking projections for the Name Value leaderboard.
//!
//! Every coin a viewer gifts during a broadcast is credited to that
//! viewer's participant record across three scoring windows: the live
//! session, the ISO week, and the calendar year. The ledger is the only
//! writer of participant records; everything else reads snapshots.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`PointLedger`]: gift, country, and reset operations
//!   over a durable key-value store.
//! - [`window`] -- Window keys and lazy rollover of stale counters.
//! - [`ranking`] -- Pure projections: top-N per window and country totals.
//! - [`transfer`] -- Export/import of the full participant collection.
//!
//! # Failure Policy
//!
//! The ledger keeps running during a live broadcast no matter what the
//! store does. A corrupt or unreadable collection loads as empty and a
//! failed write is logged; only a structurally invalid import is reported
//! to the caller as an error.
//!
//! # Usage
//!
//! ```
//! # tokio::runtime::Runtime::new().map(|rt| rt.block_on(async {
//! use namevalue_db::KvStore;
//! use namevalue_ledger::{MatchPolicy, PointLedger};
//!
//! let ledger = PointLedger::new(KvStore::memory(), MatchPolicy::PermissiveName);
//! ledger.apply_gift("u1", "Jean", 10).await;
//! let participants = ledger.apply_gift("u1", "Jean", 5).await;
//!
//! assert_eq!(participants.len(), 1);
//! assert_eq!(participants.first().map(|p| p.points_live), Some(15));
//! # })).ok();
//! ```

pub mod ledger;
pub mod ranking;
pub mod transfer;
pub mod window;

// Re-export primary types at crate root.
pub use ledger::{LedgerConfig, MatchPolicy, PointLedger};
pub use ranking::{LeaderboardView, country_totals, top_by_window};
pub use transfer::{ExportDocument, export_document, parse_import};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by ledger operations.
///
/// Gift, country, reset, and load operations never return these; they
/// degrade silently. Import and export do.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The import payload parsed as JSON but its top level is not a list.
    #[error("import payload must be a JSON list, got {0}")]
    ImportFormatInvalid(&'static str),

    /// The import payload is not valid JSON, or an element is not a valid
    /// participant record.
    #[error("import payload could not be parsed: {0}")]
    ImportParse(serde_json::Error),

    /// Serializing the participant collection failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The durable store rejected a write.
    #[error("storage error: {0}")]
    Storage(#[from] namevalue_db::DbError),
}
