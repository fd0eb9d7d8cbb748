//! Liveness and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::AppState;

pub async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

/// Ready once the scope cache has produced data at least once. Until then
/// every scope lookup fails closed and namespace resolution would be
/// needlessly empty.
pub async fn readyz(State(state): State<AppState>) -> Response {
    if state.scope_cache.has_data() {
        (StatusCode::OK, "ok").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "scope cache not populated").into_response()
    }
}
