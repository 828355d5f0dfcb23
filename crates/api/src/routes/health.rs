//! Liveness probe, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Name of the remembered mail transport. `null` until one is verified.
    pub email_transport: Option<String>,
}

/// GET /health
///
/// Reads the mailer's cached choice only, so a probe never opens an SMTP
/// connection.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, mail) = tokio::join!(
        signoff_db::health_check(&state.pool),
        state.mailer.active(),
    );

    Json(HealthResponse {
        status: if db.is_ok() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy: db.is_ok(),
        email_transport: mail.map(|(_, name)| name),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
