//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::Json;
use signoff_core::error::CoreError;
use signoff_db::repositories::UserRepo;

use super::auth::UserEnvelope;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<UserEnvelope>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(UserEnvelope { user: user.into() }))
}
