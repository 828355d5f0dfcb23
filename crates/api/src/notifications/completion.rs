use signoff_core::notification::NotificationOutcome;
use signoff_core::signoff::NOT_AVAILABLE;
use signoff_core::types::DbId;
use signoff_db::repositories::{SignOffRepo, UserRepo, VdsRepo};
use signoff_notify::{Delivery, EmailRequest, NotifyError};

use super::signoff_email::{signoff_subject, SignOffReport};
use crate::state::AppState;

/// Email the sign-off report to the sign-off's owner.
pub async fn notify_completion(
    state: &AppState,
    sign_off_id: DbId,
    owner_id: DbId,
) -> NotificationOutcome {
    let recipient = match UserRepo::email_of(&state.pool, owner_id).await {
        Ok(Some(email)) if !email.trim().is_empty() => email,
        Ok(_) => {
            tracing::warn!(
                sign_off_id,
                user_id = owner_id,
                "Sign-off owner has no email address"
            );
            return NotificationOutcome::RecipientMissing;
        }
        Err(e) => {
            tracing::error!(sign_off_id, error = %e, "Failed to look up sign-off owner");
            return NotificationOutcome::Errored;
        }
    };

    let request = match build_request(state, sign_off_id, recipient).await {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(sign_off_id, error = %e, "Failed to prepare sign-off email");
            return NotificationOutcome::Errored;
        }
    };

    delivery_outcome(sign_off_id, state.mailer.send(&request).await)
}

/// Fold the mailer's answer into an outcome. Mail errors never escape.
fn delivery_outcome(
    sign_off_id: DbId,
    result: Result<Delivery, NotifyError>,
) -> NotificationOutcome {
    match result {
        Ok(delivery) => {
            tracing::info!(
                sign_off_id,
                message_id = %delivery.message_id,
                transport = %delivery.transport,
                "Sign-off notification sent"
            );
            NotificationOutcome::Sent
        }
        Err(NotifyError::TransportUnavailable) => {
            tracing::warn!(sign_off_id, "Email service unavailable, notification skipped");
            NotificationOutcome::Unavailable
        }
        Err(e @ NotifyError::DeliveryFailed { .. }) => {
            tracing::error!(sign_off_id, error = %e, "Sign-off notification failed");
            NotificationOutcome::DeliveryFailed
        }
    }
}

/// Reload the committed record with its tallies and render it.
async fn build_request(
    state: &AppState,
    sign_off_id: DbId,
    recipient: String,
) -> Result<EmailRequest, sqlx::Error> {
    let detail = SignOffRepo::find_detail(&state.pool, sign_off_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let vds_name = match detail.signoff.vds_id {
        Some(vds_id) => VdsRepo::find_name(&state.pool, vds_id).await?,
        None => None,
    };

    let report = SignOffReport {
        detail: &detail,
        vds_name: vds_name.as_deref().unwrap_or(NOT_AVAILABLE),
        generated_at: chrono::Utc::now(),
    };

    Ok(EmailRequest::new(
        recipient,
        signoff_subject(&detail.signoff.project_name),
        report.render(),
    ))
}
