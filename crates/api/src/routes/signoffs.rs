//! Route definitions for the `/signoffs` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::signoffs;
use crate::state::AppState;

/// Routes mounted at `/signoffs`.
///
/// ```text
/// GET  /        -> list (?search=)
/// POST /        -> create
/// GET  /{id}    -> get_by_id
/// PUT  /{id}    -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(signoffs::list).post(signoffs::create))
        .route("/{id}", get(signoffs::get_by_id).put(signoffs::update))
}
