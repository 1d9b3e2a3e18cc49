use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// `GET /health` body. Served without authentication.
#[derive(Serialize)]
pub struct HealthReport {
    /// `ok` when every dependency answers, otherwise `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// The attachment directory exists.
    pub storage_ready: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let (db, storage_ready) = tokio::join!(
        mesa_db::health_check(&state.pool),
        state.storage.is_available()
    );
    let db_healthy = db.is_ok();

    Json(HealthReport {
        status: match (db_healthy, storage_ready) {
            (true, true) => "ok",
            _ => "degraded",
        },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        storage_ready,
    })
}

/// Root-level routes, mounted outside `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
