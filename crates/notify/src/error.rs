/// Failures surfaced by [`TransportSelector`](crate::TransportSelector).
///
/// Per-candidate verification failures never appear here; they are logged
/// and the selector moves on to the next candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// No candidate, including the disposable fallback, passed verification.
    #[error("Email service unavailable: no transport could be verified")]
    TransportUnavailable,

    /// A verified transport could not deliver the message.
    ///
    /// `retry` is set when the first failure was connection-related and a
    /// second attempt on another transport was made.
    #[error("Email send failed: {first}{}", retry_suffix(.retry))]
    DeliveryFailed {
        first: String,
        retry: Option<String>,
    },
}

fn retry_suffix(retry: &Option<String>) -> String {
    retry
        .as_ref()
        .map(|r| format!(". Retry failed: {r}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_failed_display_keeps_both_attempts() {
        let err = NotifyError::DeliveryFailed {
            first: "Email send timeout after 30s".into(),
            retry: Some("connection refused".into()),
        };
        assert_eq!(
            err.to_string(),
            "Email send failed: Email send timeout after 30s. Retry failed: connection refused"
        );
    }

    #[test]
    fn delivery_failed_display_single_attempt() {
        let err = NotifyError::DeliveryFailed {
            first: "550 mailbox unavailable".into(),
            retry: None,
        };
        assert_eq!(err.to_string(), "Email send failed: 550 mailbox unavailable");
    }
}
