use axum::routing::{get, post};
use axum::Router;

use crate::handlers::email;
use crate::state::AppState;

/// Routes mounted at `/email`.
///
/// ```text
/// GET  /status   -> status
/// POST /test     -> send_test
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(email::status))
        .route("/test", post(email::send_test))
}
