//! Axum router construction.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled so the overlay can be served from another origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/leaderboard` -- `WebSocket` leaderboard stream
/// - `GET /api/leaderboard?window=&limit=` -- top participants
/// - `GET /api/countries?limit=` -- country ranking
/// - `GET /api/participants` -- every participant
/// - `GET /api/status` -- queue and ledger status
/// - `GET /api/session` -- session metadata
/// - `POST /api/events` -- inject a live event
/// - `POST /api/operator/reset-live` -- zero live counters
/// - `GET /api/operator/export` -- download a backup
/// - `POST /api/operator/import` -- restore a backup
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/leaderboard", get(ws::ws_leaderboard))
        // Read API
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .route("/api/countries", get(handlers::get_countries))
        .route("/api/participants", get(handlers::list_participants))
        .route("/api/status", get(handlers::get_status))
        .route("/api/session", get(handlers::get_session))
        // Event injection
        .route("/api/events", post(handlers::post_event))
        // Operator
        .route("/api/operator/reset-live", post(operator::reset_live))
        .route("/api/operator/export", get(operator::export))
        .route("/api/operator/import", post(operator::import))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
