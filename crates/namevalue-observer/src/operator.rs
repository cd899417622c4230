//! Operator endpoints for broadcast control.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/reset-live` | Zero every live counter |
//! | `GET` | `/api/operator/export` | Download the participant collection |
//! | `POST` | `/api/operator/import` | Replace the participant collection |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

/// Generic success response.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
    /// Participants in the collection afterwards.
    participant_count: usize,
}

// ---------------------------------------------------------------------------
// POST /api/operator/reset-live
// ---------------------------------------------------------------------------

/// Zero every live counter. Week and year counters are kept.
pub async fn reset_live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let participants = state.dispatcher.reset_live().await;
    Json(OperatorResponse {
        ok: true,
        message: "Live points reset".to_owned(),
        participant_count: participants.len(),
    })
}

// ---------------------------------------------------------------------------
// GET /api/operator/export
// ---------------------------------------------------------------------------

/// Download the participant collection as a dated JSON attachment.
pub async fn export(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let doc = state.dispatcher.export().await?;
    info!(file = %doc.file_name, bytes = doc.body.len(), "participant collection exported");
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", doc.file_name),
            ),
        ],
        doc.body,
    ))
}

// ---------------------------------------------------------------------------
// POST /api/operator/import
// ---------------------------------------------------------------------------

/// Replace the participant collection with the JSON list in the body.
///
/// Returns 400 if the body is not a JSON list of participant records; the
/// collection is untouched in that case.
pub async fn import(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<impl IntoResponse, ObserverError> {
    let participants = state.dispatcher.import(&body).await?;
    Ok(Json(OperatorResponse {
        ok: true,
        message: "Participant collection imported".to_owned(),
        participant_count: participants.len(),
    }))
}
