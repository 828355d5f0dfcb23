//! Diagnostic endpoints for the outbound mail transport.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use signoff_core::error::CoreError;
use signoff_db::repositories::UserRepo;
use signoff_notify::EmailRequest;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::signoff_email::escape;
use crate::state::AppState;

pub const TEST_EMAIL_SUBJECT: &str = "QA Sign Off - Email Test";

/// Result of `GET /email/status`.
#[derive(Debug, Serialize)]
pub struct EmailStatusResponse {
    pub success: bool,
    pub message: &'static str,
    /// Name of the active transport configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of `POST /email/test`.
#[derive(Debug, Serialize)]
pub struct TestEmailResponse {
    pub success: bool,
    pub message_id: String,
    pub message: &'static str,
    pub config: String,
}

/// GET /api/v1/email/status
///
/// Acquires a transport if none is active, then re-verifies it. Failures
/// are reported in the body; this endpoint always answers 200.
pub async fn status(_auth: AuthUser, State(state): State<AppState>) -> Json<EmailStatusResponse> {
    let status = state.mailer.status().await;

    let response = match (status.active, status.verified) {
        (Some(name), true) => EmailStatusResponse {
            success: true,
            message: "Email configuration is working",
            config: Some(name),
            error: None,
        },
        (Some(name), false) => EmailStatusResponse {
            success: false,
            message: "Email configuration test failed",
            config: Some(name),
            error: status.error,
        },
        (None, _) => EmailStatusResponse {
            success: false,
            message: "Email transporter could not be initialized",
            config: None,
            error: status.error,
        },
    };

    if !response.success {
        tracing::warn!(error = ?response.error, "Email status check failed");
    }
    Json(response)
}

/// POST /api/v1/email/test
///
/// Sends a short test message to the caller's own address. Answers 503
/// when no transport can be verified and 502 when delivery fails.
pub async fn send_test(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<TestEmailResponse>> {
    // Acquire up front so the body can name the configuration tried first.
    // A retry may deliver through another one; the response names that.
    state.mailer.acquire().await?;
    let attempted = state
        .mailer
        .active()
        .await
        .map(|(_, name)| name)
        .unwrap_or_else(|| "Unknown".to_string());

    let recipient = UserRepo::email_of(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let request = EmailRequest::new(
        recipient,
        TEST_EMAIL_SUBJECT,
        test_email_body(&attempted, chrono::Utc::now()),
    );
    let delivery = state.mailer.send(&request).await?;

    tracing::info!(
        user_id = auth.user_id,
        transport = %delivery.transport,
        message_id = %delivery.message_id,
        "Test email sent"
    );
    Ok(Json(TestEmailResponse {
        success: true,
        message_id: delivery.message_id,
        message: "Test email sent successfully",
        config: delivery.transport,
    }))
}

fn test_email_body(attempted: &str, sent_at: chrono::DateTime<chrono::Utc>) -> String {
    format!(
        "<h2>Email Test Successful!</h2>\n\
         <p>This is a test email from the QA Sign Off application.</p>\n\
         <p>If you receive this email, the email functionality is working correctly.</p>\n\
         <p>Configuration attempted: {}</p>\n\
         <p>Sent at: {}</p>\n",
        escape(attempted),
        sent_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
