//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/leaderboard` | Top participants for one window |
//! | `GET` | `/api/countries` | Country ranking by live points |
//! | `GET` | `/api/participants` | Every participant |
//! | `GET` | `/api/status` | Announcement queue and ledger status |
//! | `GET` | `/api/session` | Session metadata |
//! | `POST` | `/api/events` | Inject a live event |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use namevalue_announcer::QueueStatus;
use namevalue_core::country_info;
use namevalue_ledger::top_by_window;
use namevalue_types::{LiveEvent, Window};
use serde::Serialize;

use crate::error::ObserverError;
use crate::state::AppState;

/// Upper bound on any `limit` query parameter.
const MAX_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/leaderboard`.
#[derive(Debug, serde::Deserialize)]
pub struct LeaderboardQuery {
    /// `live` (default), `week`, or `year`.
    pub window: Option<String>,
    /// Number of entries (default: configured leaderboard size).
    pub limit: Option<usize>,
}

/// Query parameters for `GET /api/countries`.
#[derive(Debug, serde::Deserialize)]
pub struct CountriesQuery {
    /// Number of entries (default: configured country board size).
    pub limit: Option<usize>,
}

/// Response body for `GET /api/status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Announcement queue status.
    pub queue: QueueStatus,
    /// Number of known participants.
    pub participant_count: usize,
    /// Storage backend name.
    pub storage: &'static str,
}

fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).min(MAX_LIMIT)
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with the live top five and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dispatcher = &state.dispatcher;
    let participants = dispatcher.participants().await;
    let queue = dispatcher.announcer().status();
    let top = top_by_window(&participants, Window::Live, 5);

    let rows: String = top
        .iter()
        .map(|p| {
            let info = country_info(p.country_code.as_deref());
            format!(
                "<li>{} {} <span class=\"points\">{}</span></li>",
                info.flag,
                escape_html(&p.display_name),
                p.points_live
            )
        })
        .collect();
    let participant_count = participants.len();
    let queue_state = format!("{:?}", queue.state);
    let pending = queue.pending;
    let storage = dispatcher.storage_backend();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="utf-8">
    <title>Que vaut ton nom ?</title>
    <style>
        body {{
            background: #0a0a0a;
            color: #e5e5e5;
            font-family: 'Inter', 'Segoe UI', sans-serif;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #fe2c55; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161616;
            border: 1px solid #2a2a2a;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b8b8b; font-size: 0.85rem; }}
        .metric .value {{ color: #25f4ee; font-size: 1.5rem; font-weight: bold; }}
        .points {{ color: #25f4ee; float: right; }}
        a {{ color: #25f4ee; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        hr {{ border: none; border-top: 1px solid #2a2a2a; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Que vaut ton nom ?</h1>
    <div>
        <div class="metric"><div class="label">Participants</div><div class="value">{participant_count}</div></div>
        <div class="metric"><div class="label">Announcer</div><div class="value">{queue_state}</div></div>
        <div class="metric"><div class="label">Pending</div><div class="value">{pending}</div></div>
        <div class="metric"><div class="label">Storage</div><div class="value">{storage}</div></div>
    </div>
    <hr>
    <h2>Live</h2>
    <ul>{rows}</ul>
    <hr>
    <ul>
        <li><a href="/api/leaderboard?window=live">/api/leaderboard?window=live</a></li>
        <li><a href="/api/leaderboard?window=week">/api/leaderboard?window=week</a></li>
        <li><a href="/api/leaderboard?window=year">/api/leaderboard?window=year</a></li>
        <li><a href="/api/countries">/api/countries</a></li>
        <li><a href="/api/participants">/api/participants</a></li>
        <li><a href="/api/status">/api/status</a></li>
        <li><a href="/api/session">/api/session</a></li>
    </ul>
</body>
</html>"#
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Read endpoints
// ---------------------------------------------------------------------------

/// Top participants for one window.
///
/// Returns 400 for an unknown window name.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let window = match query.window.as_deref() {
        None => Window::Live,
        Some(name) => Window::parse(name)
            .ok_or_else(|| ObserverError::InvalidQuery(format!("unknown window: {name}")))?,
    };
    let limit = clamp_limit(query.limit, state.dispatcher.leaderboard_size());
    let participants = state.dispatcher.participants().await;
    Ok(Json(top_by_window(&participants, window, limit)))
}

/// Country ranking by live points.
pub async fn get_countries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountriesQuery>,
) -> impl IntoResponse {
    let limit = clamp_limit(query.limit, state.dispatcher.country_board_size());
    Json(state.dispatcher.countries(limit).await)
}

/// Every participant, in collection order.
pub async fn list_participants(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dispatcher.participants().await)
}

/// Announcement queue and ledger status.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dispatcher = &state.dispatcher;
    Json(StatusResponse {
        queue: dispatcher.announcer().status(),
        participant_count: dispatcher.participants().await.len(),
        storage: dispatcher.storage_backend(),
    })
}

/// The session record.
pub async fn get_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dispatcher.session().await)
}

// ---------------------------------------------------------------------------
// POST /api/events
// ---------------------------------------------------------------------------

/// Handle one live event and report what it did.
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<LiveEvent>,
) -> impl IntoResponse {
    Json(state.dispatcher.handle(event).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None, 15), 15);
        assert_eq!(clamp_limit(Some(3), 15), 3);
        assert_eq!(clamp_limit(Some(10_000), 15), MAX_LIMIT);
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("<b>\"Jean\" & co</b>"), "&lt;b&gt;&quot;Jean&quot; &amp; co&lt;/b&gt;");
    }
}
