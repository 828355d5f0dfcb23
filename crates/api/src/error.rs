//! HTTP error type and its JSON rendering.
//!
//! Every failure leaves the API as `{"error": <message>, "code": <CODE>}`.
//! Internal details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use signoff_core::error::CoreError;
use signoff_notify::NotifyError;

/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL `foreign_key_violation`.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error returned by every handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Outbound mail failed on an endpoint whose whole purpose is mail.
    ///
    /// Sign-off writes never produce this; they fold mail problems into an
    /// advisory instead.
    #[error(transparent)]
    Mail(#[from] NotifyError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A path that no route matches.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Status, machine-readable code and client-facing message.
struct Rendered {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Rendered {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        )
    }
}

impl AppError {
    fn render(&self) -> Rendered {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => Rendered::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            AppError::Core(CoreError::Validation(msg)) => {
                Rendered::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.as_str())
            }
            AppError::Core(CoreError::Conflict(msg)) => {
                Rendered::new(StatusCode::CONFLICT, "CONFLICT", msg.as_str())
            }
            AppError::Core(CoreError::Unauthorized(msg)) => {
                Rendered::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.as_str())
            }
            AppError::Core(CoreError::Internal(msg)) | AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Rendered::internal()
            }
            AppError::Database(err) => render_sqlx_error(err),
            AppError::Mail(err @ NotifyError::TransportUnavailable) => Rendered::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "EMAIL_UNAVAILABLE",
                err.to_string(),
            ),
            AppError::Mail(err @ NotifyError::DeliveryFailed { .. }) => Rendered::new(
                StatusCode::BAD_GATEWAY,
                "EMAIL_DELIVERY_FAILED",
                err.to_string(),
            ),
            AppError::BadRequest(msg) => {
                Rendered::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.as_str())
            }
            AppError::NotFound(msg) => Rendered::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg.as_str()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Rendered {
            status,
            code,
            message,
        } = self.render();
        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

/// Returns `true` if `err` is a PostgreSQL unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    pg_code(err).as_deref() == Some(PG_UNIQUE_VIOLATION)
}

fn pg_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// `RowNotFound` is a 404, constraint violations are client errors, and
/// everything else is a sanitised 500.
fn render_sqlx_error(err: &sqlx::Error) -> Rendered {
    if matches!(err, sqlx::Error::RowNotFound) {
        return Rendered::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found");
    }

    match pg_code(err).as_deref() {
        Some(PG_UNIQUE_VIOLATION) => {
            let constraint = match err {
                sqlx::Error::Database(db_err) => db_err.constraint().unwrap_or("unknown"),
                _ => "unknown",
            };
            Rendered::new(
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Duplicate value violates unique constraint: {constraint}"),
            )
        }
        Some(PG_FOREIGN_KEY_VIOLATION) => Rendered::new(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Referenced record not found",
        ),
        _ => {
            tracing::error!(error = %err, "Database error");
            Rendered::internal()
        }
    }
}
