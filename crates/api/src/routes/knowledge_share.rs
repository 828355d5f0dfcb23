//! Route definitions for the `/knowledge-share` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use signoff_core::upload::MAX_UPLOAD_BYTES;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::knowledge_share;
use crate::state::AppState;

/// Headroom for multipart boundaries and the text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Routes mounted at `/knowledge-share`.
///
/// ```text
/// GET  /                 -> list
/// POST /                 -> create (multipart)
/// GET  /{id}/download    -> download
/// ```
///
/// Axum's default 2 MiB body limit is replaced with the upload limit.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(knowledge_share::list).post(knowledge_share::create),
        )
        .route("/{id}/download", get(knowledge_share::download))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
        ))
}
