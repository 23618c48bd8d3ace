use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::atomic_level::AtomicLevel;

/// Liveness probe. Also reports the current minimum level.
pub async fn health(State(gate): State<AtomicLevel>) -> impl IntoResponse {
    let mut response = (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "level": gate.level() })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
