use axum::routing::post;
use axum::Router;

use crate::handlers::tallies;
use crate::state::AppState;

/// Single-row tally routes, merged at the `/api/v1` root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test-cases", post(tallies::create_test_case))
        .route("/defects", post(tallies::create_defect))
}
