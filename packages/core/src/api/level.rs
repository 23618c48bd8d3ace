//! HTTP control surface for the severity gate.
//!
//! `GET` reports the current level, `PUT` replaces it. The body of a `PUT` is
//! either JSON (`{"level":"debug"}`) or a urlencoded form (`level=debug`).
//! Responses are always JSON; failures carry an `error` key.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::atomic_level::AtomicLevel;
use crate::level::Level;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelPayload {
    pub level: Level,
}

#[derive(Debug, Default, Deserialize)]
struct LevelRequest {
    #[serde(default)]
    level: Option<String>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

impl AtomicLevel {
    /// Router serving this gate at `/`. Mount it with `Router::nest`.
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(get_level).put(put_level).fallback(method_not_allowed),
            )
            .with_state(self.clone())
    }
}

async fn get_level(State(gate): State<AtomicLevel>) -> Response {
    level_response(gate.level())
}

async fn put_level(
    State(gate): State<AtomicLevel>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let requested = decode_put(&headers, &body)?;
    let previous = gate.level();
    gate.set_level(requested);

    if previous != requested {
        info!(from = %previous, to = %requested, "log level changed");
    }
    Ok(level_response(requested))
}

async fn method_not_allowed() -> ApiError {
    api_error(
        StatusCode::METHOD_NOT_ALLOWED,
        "Only GET and PUT are supported.",
    )
}

fn level_response(level: Level) -> Response {
    let mut response = Json(LevelPayload { level }).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn decode_put(headers: &HeaderMap, body: &[u8]) -> Result<Level, ApiError> {
    let raw = if is_form(headers) {
        url::form_urlencoded::parse(body)
            .find(|(key, _)| key == "level")
            .map(|(_, value)| value.into_owned())
    } else {
        let request: LevelRequest = serde_json::from_slice(body).map_err(|err| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Request body must be well-formed JSON: {}", err),
            )
        })?;
        request.level
    };

    let raw = raw
        .filter(|value| !value.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "must specify logging level"))?;

    raw.parse::<Level>()
        .map_err(|err| api_error(StatusCode::BAD_REQUEST, err.to_string()))
}
