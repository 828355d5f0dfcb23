//! Signed session tokens.
//!
//! A token carries the user's id and login email, lives for
//! `JWT_EXPIRY_HOURS`, and is signed with HS256 using `JWT_SECRET`.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use signoff_core::types::DbId;
use uuid::Uuid;

const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Payload of a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub email: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issue time, seconds since the epoch.
    pub iat: i64,
    /// Random per-token id.
    pub jti: String,
}

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

impl JwtConfig {
    /// Reads `JWT_SECRET` (required, non-empty) and `JWT_EXPIRY_HOURS`
    /// (default 24).
    ///
    /// # Panics
    ///
    /// Panics when the secret is missing or empty, or the expiry is not an
    /// integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set and non-empty");

        Self {
            secret,
            expiry_hours: crate::config::env_or("JWT_EXPIRY_HOURS", DEFAULT_EXPIRY_HOURS),
        }
    }

    /// Sign a fresh token for `user_id`.
    pub fn issue(&self, user_id: DbId, email: &str) -> Result<String, JwtError> {
        let issued = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_owned(),
            exp: (issued + Duration::hours(self.expiry_hours)).timestamp(),
            iat: issued.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    /// Check signature and expiry, returning the claims on success.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        jsonwebtoken::decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiry_hours: 24,
        }
    }

    #[test]
    fn issued_token_carries_user_and_lifetime() {
        let jwt = config("signing-secret-for-session-tests");
        let claims = jwt.verify(&jwt.issue(42, "qa@example.com").unwrap()).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "qa@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn tokens_get_distinct_ids() {
        let jwt = config("signing-secret-for-session-tests");
        let a = jwt.verify(&jwt.issue(1, "a@example.com").unwrap()).unwrap();
        let b = jwt.verify(&jwt.issue(1, "a@example.com").unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = config("signing-secret-for-session-tests");
        let now = Utc::now().timestamp();
        let stale = jwt
            .sign(&Claims {
                sub: 1,
                email: "qa@example.com".into(),
                exp: now - 3600,
                iat: now - 7200,
                jti: Uuid::new_v4().to_string(),
            })
            .unwrap();

        assert!(jwt.verify(&stale).is_err());
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = config("first-secret").issue(1, "qa@example.com").unwrap();
        assert!(config("second-secret").verify(&token).is_err());
    }
}
