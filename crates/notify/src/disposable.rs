//! Disposable test-inbox accounts used when every configured transport fails.
//!
//! Mail sent through a disposable account is captured by the test service
//! and never delivered; the fallback keeps the notification path exercised
//! so operators can inspect what would have been sent.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::candidate::{SmtpCredentials, SmtpParams, SmtpSecurity, TransportCandidate};
use crate::failure::{FailureKind, TransportFailure};

/// Public account-provisioning endpoint of the Ethereal test-inbox service.
pub const DEFAULT_ETHEREAL_API_URL: &str = "https://api.nodemailer.com/user";

/// Candidate name reported when the disposable fallback is active.
pub const DISPOSABLE_CANDIDATE_NAME: &str = "Ethereal test account";

/// HTTP timeout for the provisioning request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of on-demand throwaway SMTP accounts.
#[async_trait]
pub trait DisposableProvider: Send + Sync {
    async fn provision(&self) -> Result<TransportCandidate, TransportFailure>;
}

// ---------------------------------------------------------------------------
// Ethereal
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AccountRequest<'a> {
    requestor: &'a str,
    version: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    pass: Option<String>,
    #[serde(default)]
    smtp: Option<SmtpEndpoint>,
    #[serde(default)]
    web: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SmtpEndpoint {
    host: String,
    port: u16,
    secure: bool,
}

/// Provisions accounts from the Ethereal API.
pub struct EtherealProvider {
    client: reqwest::Client,
    api_url: String,
}

impl EtherealProvider {
    pub fn new(api_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_url: api_url.into(),
        }
    }
}

impl Default for EtherealProvider {
    fn default() -> Self {
        Self::new(DEFAULT_ETHEREAL_API_URL)
    }
}

#[async_trait]
impl DisposableProvider for EtherealProvider {
    async fn provision(&self) -> Result<TransportCandidate, TransportFailure> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&AccountRequest {
                requestor: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            })
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        if !response.status().is_success() {
            return Err(TransportFailure::new(
                FailureKind::Unknown,
                format!("Test account service returned HTTP {}", response.status().as_u16()),
            ));
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let candidate = account_to_candidate(account)?;
        tracing::info!(
            user = candidate
                .params
                .credentials
                .as_ref()
                .map(|c| c.username.as_str())
                .unwrap_or_default(),
            host = %candidate.params.host,
            "Provisioned disposable test account; preview messages at https://ethereal.email"
        );
        Ok(candidate)
    }
}

fn account_to_candidate(account: AccountResponse) -> Result<TransportCandidate, TransportFailure> {
    if account.status != "success" {
        return Err(TransportFailure::new(
            FailureKind::Unknown,
            format!(
                "Test account service refused: {}",
                account.error.unwrap_or(account.status)
            ),
        ));
    }

    let (Some(user), Some(pass), Some(smtp)) = (account.user, account.pass, account.smtp) else {
        return Err(TransportFailure::new(
            FailureKind::Unknown,
            "Test account response is missing SMTP credentials",
        ));
    };

    if let Some(web) = &account.web {
        tracing::debug!(web = %web, "Disposable inbox web interface");
    }

    Ok(TransportCandidate::new(
        DISPOSABLE_CANDIDATE_NAME,
        SmtpParams {
            host: smtp.host,
            port: smtp.port,
            security: if smtp.secure {
                SmtpSecurity::ImplicitTls
            } else {
                SmtpSecurity::StartTls
            },
            credentials: Some(SmtpCredentials {
                username: user,
                password: pass,
            }),
            accept_invalid_certs: false,
        },
    ))
}

fn classify_reqwest_error(err: &reqwest::Error) -> TransportFailure {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        FailureKind::ConnectionRefused
    } else {
        FailureKind::Unknown
    };
    TransportFailure::new(kind, format!("Test account request failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AccountResponse {
        serde_json::from_str(json).expect("fixture should parse")
    }

    #[test]
    fn successful_account_becomes_starttls_candidate() {
        let account = parse(
            r#"{
                "status": "success",
                "user": "abc@ethereal.email",
                "pass": "secret",
                "smtp": {"host": "smtp.ethereal.email", "port": 587, "secure": false},
                "imap": {"host": "imap.ethereal.email", "port": 993, "secure": true},
                "web": "https://ethereal.email"
            }"#,
        );

        let candidate = account_to_candidate(account).expect("candidate");
        assert_eq!(candidate.name, DISPOSABLE_CANDIDATE_NAME);
        assert_eq!(candidate.params.host, "smtp.ethereal.email");
        assert_eq!(candidate.params.port, 587);
        assert_eq!(candidate.params.security, SmtpSecurity::StartTls);
        assert_eq!(
            candidate.params.credentials.unwrap().username,
            "abc@ethereal.email"
        );
    }

    #[test]
    fn secure_endpoint_uses_implicit_tls() {
        let account = parse(
            r#"{"status": "success", "user": "u", "pass": "p",
                "smtp": {"host": "smtp.ethereal.email", "port": 465, "secure": true}}"#,
        );
        let candidate = account_to_candidate(account).expect("candidate");
        assert_eq!(candidate.params.security, SmtpSecurity::ImplicitTls);
    }

    #[test]
    fn refused_account_reports_service_error() {
        let account = parse(r#"{"status": "error", "error": "rate limited"}"#);
        let failure = account_to_candidate(account).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Unknown);
        assert!(failure.message.contains("rate limited"));
    }

    #[test]
    fn incomplete_account_is_an_error() {
        let account = parse(r#"{"status": "success", "user": "u"}"#);
        assert!(account_to_candidate(account).is_err());
    }
}
