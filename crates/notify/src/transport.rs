//! Mail transport seams and their `lettre` SMTP implementation.
//!
//! [`TransportSelector`](crate::TransportSelector) only talks to the
//! [`MailTransport`] and [`TransportFactory`] traits so the fallback logic
//! can be exercised without a network. [`SmtpTransportFactory`] is the
//! production factory; it maps every `lettre` error into a
//! [`TransportFailure`] before it leaves this module.

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use crate::candidate::{SmtpSecurity, TransportCandidate};
use crate::failure::{FailureKind, TransportFailure};
use crate::message::EmailRequest;

/// Socket-level timeout handed to `lettre` (connect, greeting, reads).
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(60);

/// A live handle able to probe its server and submit messages.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Connectivity probe. `Ok` means the transport may be trusted for sends.
    async fn verify(&self) -> Result<(), TransportFailure>;

    /// Submit `request` from `from`, returning the assigned `Message-ID`.
    async fn send(&self, from: &str, request: &EmailRequest) -> Result<String, TransportFailure>;
}

/// Builds transports from candidate configurations.
pub trait TransportFactory: Send + Sync {
    fn build(
        &self,
        candidate: &TransportCandidate,
    ) -> Result<Arc<dyn MailTransport>, TransportFailure>;
}

// ---------------------------------------------------------------------------
// lettre implementation
// ---------------------------------------------------------------------------

/// Builds [`SmtpMailTransport`]s over `lettre`'s async SMTP client.
#[derive(Debug, Clone)]
pub struct SmtpTransportFactory {
    socket_timeout: Duration,
}

impl SmtpTransportFactory {
    pub fn new(socket_timeout: Duration) -> Self {
        Self { socket_timeout }
    }
}

impl Default for SmtpTransportFactory {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_TIMEOUT)
    }
}

impl TransportFactory for SmtpTransportFactory {
    fn build(
        &self,
        candidate: &TransportCandidate,
    ) -> Result<Arc<dyn MailTransport>, TransportFailure> {
        let params = &candidate.params;

        let tls_params = || {
            TlsParameters::builder(params.host.clone())
                .dangerous_accept_invalid_certs(params.accept_invalid_certs)
                .build()
                .map_err(|e| classify_smtp_error(&e))
        };
        let tls = match params.security {
            SmtpSecurity::StartTls => Tls::Required(tls_params()?),
            SmtpSecurity::ImplicitTls => Tls::Wrapper(tls_params()?),
            SmtpSecurity::Plain => Tls::None,
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&params.host)
            .port(params.port)
            .tls(tls)
            .timeout(Some(self.socket_timeout));

        if let Some(creds) = &params.credentials {
            builder = builder.credentials(Credentials::new(
                creds.username.clone(),
                creds.password.clone(),
            ));
        }

        Ok(Arc::new(SmtpMailTransport {
            inner: builder.build(),
        }))
    }
}

/// [`MailTransport`] backed by `lettre`'s async SMTP client.
pub struct SmtpMailTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn verify(&self) -> Result<(), TransportFailure> {
        match self.inner.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(TransportFailure::new(
                FailureKind::Unknown,
                "server did not acknowledge the connection test",
            )),
            Err(e) => Err(classify_smtp_error(&e)),
        }
    }

    async fn send(&self, from: &str, request: &EmailRequest) -> Result<String, TransportFailure> {
        let from: Mailbox = from.parse().map_err(|e| {
            TransportFailure::new(FailureKind::Rejected, format!("Invalid sender address: {e}"))
        })?;
        let to: Mailbox = request.recipient.parse().map_err(|e| {
            TransportFailure::new(
                FailureKind::Rejected,
                format!("Invalid recipient address '{}': {e}", request.recipient),
            )
        })?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(request.subject.clone())
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(request.body_html.clone())
            .map_err(|e| {
                TransportFailure::new(FailureKind::Rejected, format!("Email build error: {e}"))
            })?;

        self.inner
            .send(email)
            .await
            .map_err(|e| classify_smtp_error(&e))?;

        Ok(message_id)
    }
}

/// Map a `lettre` SMTP error into a [`TransportFailure`].
pub fn classify_smtp_error(err: &lettre::transport::smtp::Error) -> TransportFailure {
    let message = err.to_string();
    let code = err
        .status()
        .and_then(|code| code.to_string().parse::<u16>().ok());
    let kind = classify(err.is_timeout(), code, || io_kind_in_chain(err), &message);
    TransportFailure::new(kind, message)
}

/// Order: explicit timeout flag, timeout wording in the message, SMTP reply
/// code, I/O error kind in the source chain, remaining message text.
///
/// Timeout wording beats the reply code, so a coded reply such as
/// `554 5.4.7 Delivery timeout` stays retryable.
fn classify(
    timed_out: bool,
    code: Option<u16>,
    io_kind: impl FnOnce() -> Option<FailureKind>,
    message: &str,
) -> FailureKind {
    if timed_out || FailureKind::indicates_timeout(message) {
        return FailureKind::Timeout;
    }
    code.and_then(FailureKind::from_smtp_code)
        .or_else(io_kind)
        .unwrap_or_else(|| FailureKind::from_message(message))
}

fn io_kind_in_chain(err: &(dyn StdError + 'static)) -> Option<FailureKind> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(kind) = e
            .downcast_ref::<io::Error>()
            .and_then(|io_err| FailureKind::from_io_kind(io_err.kind()))
        {
            return Some(kind);
        }
        current = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{SmtpCredentials, SmtpParams};

    fn candidate(security: SmtpSecurity) -> TransportCandidate {
        TransportCandidate::new(
            "test",
            SmtpParams {
                host: "localhost".into(),
                port: security.default_port(),
                security,
                credentials: Some(SmtpCredentials {
                    username: "user".into(),
                    password: "pass".into(),
                }),
                accept_invalid_certs: true,
            },
        )
    }

    #[test]
    fn factory_builds_plain_relay() {
        let factory = SmtpTransportFactory::default();
        assert!(factory.build(&candidate(SmtpSecurity::Plain)).is_ok());
    }

    #[tokio::test]
    async fn bad_recipient_is_rejected_before_connecting() {
        let factory = SmtpTransportFactory::default();
        let transport = factory.build(&candidate(SmtpSecurity::Plain)).unwrap();

        let request = EmailRequest::new("not-an-address", "subject", "<p>hi</p>");
        let failure = transport
            .send("qa@example.com", &request)
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::Rejected);
        assert!(failure.message.contains("not-an-address"));
    }

    #[test]
    fn coded_reply_mentioning_a_timeout_is_a_timeout() {
        let none = || None;
        assert_eq!(
            classify(false, Some(554), none, "permanent error (554): 5.4.7 Delivery timeout"),
            FailureKind::Timeout
        );
        assert_eq!(
            classify(false, Some(535), none, "535 5.7.8 Authentication timed out"),
            FailureKind::Timeout
        );
        assert_eq!(
            classify(false, Some(421), none, "421 4.4.2 Connection timeout, closing"),
            FailureKind::Timeout
        );
    }

    #[test]
    fn reply_code_is_used_when_the_text_is_not_about_timing() {
        let refused = || Some(FailureKind::ConnectionRefused);
        assert_eq!(
            classify(false, Some(550), refused, "550 5.1.1 No such user"),
            FailureKind::Rejected
        );
        assert_eq!(
            classify(false, Some(535), refused, "535 5.7.8 Bad credentials"),
            FailureKind::AuthenticationFailed
        );
        assert_eq!(
            classify(false, None, refused, "network error"),
            FailureKind::ConnectionRefused
        );
        assert_eq!(
            classify(true, Some(550), refused, "550 rejected"),
            FailureKind::Timeout
        );
        assert_eq!(classify(false, None, || None, "mystery"), FailureKind::Unknown);
    }

    #[test]
    fn io_errors_are_found_in_the_source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("wrapper")]
        struct Wrapper(#[source] io::Error);

        let err = Wrapper(io::Error::new(io::ErrorKind::ConnectionRefused, "nope"));
        assert_eq!(
            io_kind_in_chain(&err),
            Some(FailureKind::ConnectionRefused)
        );
    }
}
