//! Transcript route.
//!
//! Rendered transcripts go through the bridge; failure detail is logged and
//! only a coarse reason reaches the client.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;
use tubescript_core::Error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/transcript", get(get_transcript))
}

#[derive(Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum TranscriptFormat {
    #[default]
    Text,
    Lines,
}

#[derive(Deserialize)]
struct TranscriptQuery {
    #[serde(default)]
    format: TranscriptFormat,
}

/// GET /api/transcript[?format=lines]
async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranscriptQuery>,
) -> Response {
    if query.format == TranscriptFormat::Lines {
        return match state.extractor.get_transcript_lines().await {
            Ok(lines) => Json(serde_json::json!({ "lines": lines })).into_response(),
            Err(e) => not_found(&e),
        };
    }

    match state.bridge.request().await {
        Ok(transcript) => Json(serde_json::json!({ "transcript": transcript })).into_response(),
        Err(e) => not_found(&e),
    }
}

fn not_found(e: &Error) -> Response {
    warn!("Transcript unavailable: {}", e);
    let reason = if e.is_timeout() { "timeout" } else { "unavailable" };
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "transcript": null, "reason": reason })),
    )
        .into_response()
}
