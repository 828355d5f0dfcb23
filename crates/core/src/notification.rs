//! Outcome of the completion email and the advisory text it produces.
//!
//! Email problems never fail a sign-off write. The handler reports success
//! and appends one of these advisories to its message instead.

/// What happened when the completion email was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The message was accepted by a mail transport.
    Sent,
    /// A transport was available but delivery failed (including the retry).
    DeliveryFailed,
    /// No transport, not even the disposable fallback, could be verified.
    Unavailable,
    /// The sign-off owner has no email address on file.
    RecipientMissing,
    /// Loading the data for the email or rendering it failed.
    Errored,
}

impl NotificationOutcome {
    /// Suffix appended to the handler's success message.
    pub fn advisory(self) -> &'static str {
        match self {
            Self::Sent => " Email notification sent successfully.",
            Self::DeliveryFailed => " (Note: Email notification could not be sent)",
            Self::Unavailable => " (Note: Email service unavailable)",
            Self::RecipientMissing => " (Note: User email not found for notification)",
            Self::Errored => " (Note: Email notification failed)",
        }
    }
}

/// Which write produced the sign-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOffWrite {
    Created,
    Updated,
}

/// Build the response message for a sign-off write.
///
/// `notification` is `None` when the status was not `Complete` and no email
/// was attempted.
pub fn write_message(write: SignOffWrite, notification: Option<NotificationOutcome>) -> String {
    match (write, notification) {
        (SignOffWrite::Created, Some(outcome)) => {
            format!("Sign off submitted successfully!{}", outcome.advisory())
        }
        (SignOffWrite::Created, None) => "Sign off saved successfully!".to_string(),
        (SignOffWrite::Updated, Some(outcome)) => {
            format!("Sign off updated and submitted successfully!{}", outcome.advisory())
        }
        (SignOffWrite::Updated, None) => "Sign off updated successfully!".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_drafts_have_no_advisory() {
        assert_eq!(
            write_message(SignOffWrite::Created, None),
            "Sign off saved successfully!"
        );
        assert_eq!(
            write_message(SignOffWrite::Updated, None),
            "Sign off updated successfully!"
        );
    }

    #[test]
    fn submitted_writes_carry_the_advisory() {
        assert_eq!(
            write_message(SignOffWrite::Created, Some(NotificationOutcome::Sent)),
            "Sign off submitted successfully! Email notification sent successfully."
        );
        assert_eq!(
            write_message(SignOffWrite::Updated, Some(NotificationOutcome::Unavailable)),
            "Sign off updated and submitted successfully! (Note: Email service unavailable)"
        );
    }

    #[test]
    fn every_failure_advisory_is_a_note() {
        for outcome in [
            NotificationOutcome::DeliveryFailed,
            NotificationOutcome::Unavailable,
            NotificationOutcome::RecipientMissing,
            NotificationOutcome::Errored,
        ] {
            assert!(outcome.advisory().starts_with(" (Note:"));
        }
    }
}
