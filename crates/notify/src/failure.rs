//! Closed classification of mail transport failures.
//!
//! Adapters map library-specific errors into [`FailureKind`] at the
//! boundary; the selector's retry policy looks at nothing else.

use std::io;
use std::time::Duration;

/// Coarse reason a verification or send failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No answer within the allotted time (ours or the library's).
    Timeout,
    /// The connection was refused, reset, aborted or dropped mid-session.
    ConnectionRefused,
    /// The server rejected our credentials.
    AuthenticationFailed,
    /// The server refused this particular message (bad recipient, policy).
    Rejected,
    /// Anything we could not place.
    Unknown,
}

impl FailureKind {
    /// Whether switching to another transport could plausibly help.
    pub fn is_connection_related(self) -> bool {
        matches!(self, Self::Timeout | Self::ConnectionRefused)
    }

    /// Operator-facing hint logged next to a failed verification.
    pub fn hint(self) -> &'static str {
        match self {
            Self::Timeout => "connection timed out; the port may be blocked by a firewall",
            Self::ConnectionRefused => "connection refused or dropped by the server",
            Self::AuthenticationFailed => "authentication failed; check username/password",
            Self::Rejected => "server rejected the message",
            Self::Unknown => "unclassified transport error",
        }
    }

    /// Map an I/O error kind found in an error's source chain.
    pub fn from_io_kind(kind: io::ErrorKind) -> Option<Self> {
        match kind {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Some(Self::Timeout),
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Some(Self::ConnectionRefused),
            _ => None,
        }
    }

    /// Map a three-digit SMTP reply code.
    pub fn from_smtp_code(code: u16) -> Option<Self> {
        match code {
            530 | 534 | 535 | 454 => Some(Self::AuthenticationFailed),
            421 => Some(Self::ConnectionRefused),
            500..=599 => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether error text says the operation timed out.
    pub fn indicates_timeout(message: &str) -> bool {
        let lower = message.to_ascii_lowercase();
        lower.contains("timeout") || lower.contains("timed out")
    }

    /// Last-resort classification from error text.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if Self::indicates_timeout(&lower) {
            Self::Timeout
        } else if lower.contains("connection refused")
            || lower.contains("connection reset")
            || lower.contains("broken pipe")
            || lower.contains("connection closed")
        {
            Self::ConnectionRefused
        } else {
            Self::Unknown
        }
    }
}

/// A classified failure from a single transport operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Our own deadline elapsed before the operation finished.
    pub fn deadline(operation: &str, after: Duration) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("{operation} timeout after {}s", after.as_secs_f64()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_and_connection_errors_are_retryable() {
        assert!(FailureKind::Timeout.is_connection_related());
        assert!(FailureKind::ConnectionRefused.is_connection_related());
        assert!(!FailureKind::AuthenticationFailed.is_connection_related());
        assert!(!FailureKind::Rejected.is_connection_related());
        assert!(!FailureKind::Unknown.is_connection_related());
    }

    #[test]
    fn io_kinds_map_to_connection_failures() {
        assert_eq!(
            FailureKind::from_io_kind(io::ErrorKind::TimedOut),
            Some(FailureKind::Timeout)
        );
        assert_eq!(
            FailureKind::from_io_kind(io::ErrorKind::ConnectionReset),
            Some(FailureKind::ConnectionRefused)
        );
        assert_eq!(FailureKind::from_io_kind(io::ErrorKind::NotFound), None);
    }

    #[test]
    fn smtp_codes() {
        assert_eq!(
            FailureKind::from_smtp_code(535),
            Some(FailureKind::AuthenticationFailed)
        );
        assert_eq!(FailureKind::from_smtp_code(550), Some(FailureKind::Rejected));
        assert_eq!(
            FailureKind::from_smtp_code(421),
            Some(FailureKind::ConnectionRefused)
        );
        assert_eq!(FailureKind::from_smtp_code(451), None);
    }

    #[test]
    fn message_heuristics() {
        assert_eq!(
            FailureKind::from_message("Email send timeout"),
            FailureKind::Timeout
        );
        assert_eq!(
            FailureKind::from_message("operation timed out"),
            FailureKind::Timeout
        );
        assert_eq!(
            FailureKind::from_message("Connection refused (os error 111)"),
            FailureKind::ConnectionRefused
        );
        assert_eq!(
            FailureKind::from_message("mailbox unavailable"),
            FailureKind::Unknown
        );
    }

    #[test]
    fn deadline_failures_read_as_timeouts() {
        let failure = TransportFailure::deadline("Email send", Duration::from_secs(30));
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.to_string(), "Email send timeout after 30s");
        assert_eq!(FailureKind::from_message(&failure.message), FailureKind::Timeout);
    }
}
