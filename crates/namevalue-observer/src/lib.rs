//! HTTP API for the Name Value leaderboard.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/leaderboard`) pushing a fresh
//!   leaderboard view after every state change
//! - **REST endpoints** for the overlay (leaderboards per window, country
//!   ranking, participants, queue status, session)
//! - **Event injection** (`POST /api/events`) used by the simulator and by
//!   whatever relays the platform's live events
//! - **Operator endpoints** for live reset, export, and import
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Every handler goes through the shared
//! [`EventDispatcher`](namevalue_core::EventDispatcher), which serializes
//! writes. Reads load a fresh snapshot from the ledger so window rollover
//! is always current.

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
