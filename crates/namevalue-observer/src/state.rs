//! Shared application state for the HTTP server.

use std::sync::Arc;

use namevalue_core::EventDispatcher;
use namevalue_ledger::LeaderboardView;
use tokio::sync::broadcast;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The event dispatcher in front of the ledger and the announcer.
    pub dispatcher: Arc<EventDispatcher>,
}

impl AppState {
    /// Create application state around `dispatcher`.
    pub const fn new(dispatcher: Arc<EventDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Subscribe to leaderboard updates.
    pub fn subscribe(&self) -> broadcast::Receiver<LeaderboardView> {
        self.dispatcher.subscribe()
    }
}
