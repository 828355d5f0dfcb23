//! Mail configuration loaded from environment variables.

use std::sync::Arc;
use std::time::Duration;

use crate::candidate::{SmtpCredentials, SmtpParams, SmtpSecurity, TransportCandidate};
use crate::disposable::{DisposableProvider, EtherealProvider, DEFAULT_ETHEREAL_API_URL};
use crate::selector::{SelectorConfig, TransportSelector, DEFAULT_FROM_ADDRESS};
use crate::transport::{SmtpTransportFactory, DEFAULT_SOCKET_TIMEOUT};

/// Everything needed to build a [`TransportSelector`].
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Candidates in priority order.
    pub candidates: Vec<TransportCandidate>,
    pub selector: SelectorConfig,
    /// Socket-level timeout inside the SMTP client.
    pub socket_timeout: Duration,
    /// Whether to provision a disposable test account when all candidates fail.
    pub disposable_fallback: bool,
    pub disposable_api_url: String,
}

impl MailConfig {
    /// Load configuration from the process environment.
    ///
    /// Candidates are numbered from 1 and read until the first missing
    /// `SMTP_<n>_HOST`:
    ///
    /// | Env Var                          | Default                            |
    /// |----------------------------------|------------------------------------|
    /// | `SMTP_<n>_HOST`                  | -- (ends the list)                 |
    /// | `SMTP_<n>_NAME`                  | `SMTP <n> (<host>:<port>)`         |
    /// | `SMTP_<n>_SECURITY`              | `starttls` (`tls`, `plain`)        |
    /// | `SMTP_<n>_PORT`                  | 587 / 465 / 25 by security         |
    /// | `SMTP_<n>_USER`                  | --                                 |
    /// | `SMTP_<n>_PASSWORD`              | --                                 |
    /// | `SMTP_<n>_ACCEPT_INVALID_CERTS`  | `false`                            |
    /// | `SMTP_FROM`                      | `noreply@qa-signoff.local`         |
    /// | `SMTP_VERIFY_TIMEOUT_SECS`       | `10`                               |
    /// | `SMTP_SEND_TIMEOUT_SECS`         | `30`                               |
    /// | `SMTP_SOCKET_TIMEOUT_SECS`       | `60`                               |
    /// | `SMTP_DISPOSABLE_FALLBACK`       | `true`                             |
    /// | `SMTP_DISPOSABLE_API_URL`        | `https://api.nodemailer.com/user`  |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Malformed numbers and unknown security modes fall back to defaults
    /// with a warning rather than aborting startup; mail is never critical.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut candidates = Vec::new();
        for n in 1.. {
            let Some(host) = lookup(&format!("SMTP_{n}_HOST")).filter(|h| !h.trim().is_empty())
            else {
                break;
            };
            candidates.push(candidate_from_lookup(&lookup, n, host.trim().to_string()));
        }

        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| parse_or_warn::<u64>(key, &v))
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let selector = SelectorConfig {
            from_address: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            verify_timeout: secs("SMTP_VERIFY_TIMEOUT_SECS", SelectorConfig::default().verify_timeout),
            send_timeout: secs("SMTP_SEND_TIMEOUT_SECS", SelectorConfig::default().send_timeout),
        };

        Self {
            candidates,
            selector,
            socket_timeout: secs("SMTP_SOCKET_TIMEOUT_SECS", DEFAULT_SOCKET_TIMEOUT),
            disposable_fallback: lookup("SMTP_DISPOSABLE_FALLBACK")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
            disposable_api_url: lookup("SMTP_DISPOSABLE_API_URL")
                .unwrap_or_else(|| DEFAULT_ETHEREAL_API_URL.to_string()),
        }
    }

    /// Build the production selector: `lettre` SMTP transports plus the
    /// Ethereal fallback when enabled.
    pub fn build_selector(&self) -> TransportSelector {
        let disposable: Option<Arc<dyn DisposableProvider>> = if self.disposable_fallback {
            Some(Arc::new(EtherealProvider::new(self.disposable_api_url.clone())))
        } else {
            None
        };

        TransportSelector::new(
            self.candidates.clone(),
            Arc::new(SmtpTransportFactory::new(self.socket_timeout)),
            disposable,
            self.selector.clone(),
        )
    }
}

fn candidate_from_lookup<F>(lookup: &F, n: usize, host: String) -> TransportCandidate
where
    F: Fn(&str) -> Option<String>,
{
    let key = |suffix: &str| format!("SMTP_{n}_{suffix}");

    let security = match lookup(&key("SECURITY")) {
        Some(raw) => SmtpSecurity::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(key = %key("SECURITY"), value = %raw, "Unknown SMTP security mode, using starttls");
            SmtpSecurity::StartTls
        }),
        None => SmtpSecurity::StartTls,
    };

    let port = lookup(&key("PORT"))
        .and_then(|v| parse_or_warn::<u16>(&key("PORT"), &v))
        .unwrap_or_else(|| security.default_port());

    let credentials = match (lookup(&key("USER")), lookup(&key("PASSWORD"))) {
        (Some(username), Some(password)) => Some(SmtpCredentials { username, password }),
        _ => None,
    };

    let name = lookup(&key("NAME")).unwrap_or_else(|| format!("SMTP {n} ({host}:{port})"));

    TransportCandidate::new(
        name,
        SmtpParams {
            host,
            port,
            security,
            credentials,
            accept_invalid_certs: lookup(&key("ACCEPT_INVALID_CERTS"))
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
        },
    )
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value, "Ignoring malformed mail setting");
            None
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
