//! Server settings read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// HTTP server configuration.
///
/// Mail transports are configured separately, see
/// [`signoff_notify::MailConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
    /// Whole-request deadline. Must leave room for a full mail fallback
    /// scan on sign-off submission.
    pub request_timeout_secs: u64,
    /// Directory knowledge-share documents are stored in.
    pub upload_dir: PathBuf,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:8080` |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                   |
    /// | `UPLOAD_DIR`           | `uploads`               |
    ///
    /// # Panics
    ///
    /// Panics on unparseable numbers; see also [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: split_origins(&env_or(
                "CORS_ORIGINS",
                "http://localhost:8080".to_string(),
            )),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 120),
            upload_dir: env_or("UPLOAD_DIR", PathBuf::from("uploads")),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is invalid ('{raw}'): {e}")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
