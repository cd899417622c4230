//! Shared type definitions for the Name Value leaderboard.
//!
//! This crate is the single source of truth for the data model shared by the
//! ledger, the announcer, the dispatcher, and the observer API. Types flow
//! downstream to `TypeScript` via `ts-rs` for the broadcast overlay.
//!
//! # Modules
//!
//! - [`enums`] -- Scoring windows and voice profiles
//! - [`structs`] -- Participants, country aggregates, session metadata
//! - [`events`] -- Inbound live events from the broadcast feed

pub mod enums;
pub mod events;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{VoiceProfile, Window};
pub use events::LiveEvent;
pub use structs::{CountryAggregate, Participant, SessionRecord};
