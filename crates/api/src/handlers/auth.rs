//! Handlers for the `/auth` resource (signup, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use signoff_core::error::CoreError;
use signoff_core::validation::validate;
use signoff_db::models::user::{CreateUser, UserResponse};
use signoff_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
///
/// Missing fields deserialize as empty strings so they surface as
/// validation errors (400) rather than extractor rejections.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "is required"))]
    #[serde(alias = "firstname")]
    pub first_name: String,
    #[validate(length(min = 1, message = "is required"))]
    #[serde(alias = "lastname")]
    pub last_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<UserEnvelope>)> {
    validate(&input)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email: input.email.trim().to_string(),
        password_hash,
    };

    let user = UserRepo::create(&state.pool, &create).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Core(CoreError::Conflict("Email already exists".into()))
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(user_id = user.id, "User signed up");
    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            user: user.into(),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    let token = state
        .config
        .jwt
        .issue(user.id, &user.email)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
