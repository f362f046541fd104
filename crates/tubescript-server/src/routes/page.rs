//! Page session routes: where the service points and which cookies it
//! carries.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};
use tubescript_extract::{import_cookies, ImportedCookie};

use crate::session::PageStatus;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/page", get(get_page))
        .route("/page/navigate", post(navigate))
        .route("/page/cookies", post(set_cookies))
}

// ---------------------------------------------------------------
// Request types
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct NavigateBody {
    url: String,
}

#[derive(Deserialize)]
struct CookiesBody {
    cookies: Vec<ImportedCookie>,
}

// ---------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------

async fn get_page(State(state): State<Arc<AppState>>) -> Json<PageStatus> {
    Json(state.session.status())
}

async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NavigateBody>,
) -> Response {
    info!("Navigate to: {}", body.url);
    match state.session.navigate(&state.client, &body.url).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            warn!("Navigation to {} failed: {}", body.url, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Page could not be loaded"
                })),
            )
                .into_response()
        }
    }
}

async fn set_cookies(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CookiesBody>,
) -> Json<serde_json::Value> {
    let imported = import_cookies(&state.cookie_jar, &body.cookies);
    state.session.record_cookies(imported);
    Json(serde_json::json!({
        "success": true,
        "imported": imported,
        "skipped": body.cookies.len() - imported,
    }))
}
