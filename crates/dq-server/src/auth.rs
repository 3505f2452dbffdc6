//! `X-API-Key` enforcement.
//!
//! A single opaque key compared against `AppConfig.api_key` — the platform's
//! stated non-goal is multi-tenant isolation, not auth entirely, so there is
//! one shared secret rather than per-user credentials. `AppState.api_key ==
//! None` disables the check (local/dev convenience, matching how the
//! connector dialects each have a bypass for local development).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::state::AppState;

pub const HEADER_NAME: &str = "x-api-key";

pub async fn require_api_key(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = request.headers().get(HEADER_NAME).and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => next.run(request).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": { "message": "missing or invalid X-API-Key header", "type": "validation" }
            })),
        )
            .into_response(),
    }
}
