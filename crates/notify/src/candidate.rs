//! Named SMTP connection settings tried by the selector in list order.

use std::fmt;

/// How the SMTP session is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Plaintext connect then mandatory STARTTLS upgrade (submission port 587).
    StartTls,
    /// TLS from the first byte (SMTPS port 465).
    ImplicitTls,
    /// No encryption (internal relay on port 25).
    Plain,
}

impl SmtpSecurity {
    /// Parse the configuration spelling: `starttls`, `tls`/`ssl`, or `plain`/`none`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "starttls" => Some(Self::StartTls),
            "tls" | "ssl" | "smtps" => Some(Self::ImplicitTls),
            "plain" | "none" => Some(Self::Plain),
            _ => None,
        }
    }

    /// Conventional port for this security mode.
    pub fn default_port(self) -> u16 {
        match self {
            Self::StartTls => 587,
            Self::ImplicitTls => 465,
            Self::Plain => 25,
        }
    }
}

/// SMTP AUTH credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

// Keep passwords out of logs.
impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Connection parameters for one SMTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpParams {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub credentials: Option<SmtpCredentials>,
    /// Skip certificate validation (self-signed corporate relays).
    pub accept_invalid_certs: bool,
}

/// One named, immutable transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportCandidate {
    pub name: String,
    pub params: SmtpParams,
}

impl TransportCandidate {
    pub fn new(name: impl Into<String>, params: SmtpParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}
