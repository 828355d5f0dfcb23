//! Handlers for the `/vds` reference list.

use axum::extract::State;
use axum::Json;
use signoff_db::models::vds::Vds;
use signoff_db::repositories::VdsRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/vds
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Vds>>> {
    let vds = VdsRepo::list(&state.pool).await?;
    Ok(Json(vds))
}
