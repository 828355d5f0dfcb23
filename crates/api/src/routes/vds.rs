use axum::routing::get;
use axum::Router;

use crate::handlers::vds;
use crate::state::AppState;

/// Routes mounted at `/vds`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(vds::list))
}
