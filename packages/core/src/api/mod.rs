pub mod health;
pub mod level;

use axum::{routing::get, Router};

use crate::atomic_level::AtomicLevel;

/// Path the level controller is mounted at by [`admin_router`].
pub const LEVEL_PATH: &str = "/admin/log/level";

/// Health probe plus the level controller, as served by the `logkit` binary.
pub fn admin_router(gate: AtomicLevel) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .with_state(gate.clone())
        .nest(LEVEL_PATH, gate.router())
}
