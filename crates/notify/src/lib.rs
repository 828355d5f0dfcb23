//! Outbound email for sign-off notifications.
//!
//! The centrepiece is [`TransportSelector`], which picks a working SMTP
//! transport from an ordered list of [`TransportCandidate`]s, falls back to
//! a disposable test inbox when every candidate fails verification, and
//! retries a failed send once on the next candidate.
//!
//! - [`candidate`]: named SMTP connection parameters.
//! - [`config`]: candidate list and timeouts loaded from the environment.
//! - [`failure`]: the closed [`FailureKind`] classification.
//! - [`transport`]: the [`MailTransport`] / [`TransportFactory`] seams and
//!   their `lettre` implementation.
//! - [`disposable`]: provisioning of throwaway test-inbox accounts.
//! - [`selector`]: the verify / fallback / retry state machine.

pub mod candidate;
pub mod config;
pub mod disposable;
pub mod error;
pub mod failure;
pub mod message;
pub mod selector;
pub mod transport;

pub use candidate::{SmtpCredentials, SmtpParams, SmtpSecurity, TransportCandidate};
pub use config::MailConfig;
pub use disposable::{DisposableProvider, EtherealProvider};
pub use error::NotifyError;
pub use failure::{FailureKind, TransportFailure};
pub use message::{Delivery, EmailRequest};
pub use selector::{SelectorConfig, TransportOrigin, TransportSelector, TransportStatus};
pub use transport::{MailTransport, SmtpTransportFactory, TransportFactory};
