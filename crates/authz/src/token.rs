//! Signed, time-limited identity tokens.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the decimal user id. They are
//! stateless: nothing is stored on issue and there is no revocation list.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use shelf_kernel::settings::AuthSettings;

/// Why a token was refused or could not be produced.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed or its signature does not verify")]
    InvalidToken,

    #[error("token has expired")]
    Expired,

    #[error("token subject {0:?} is not a user id")]
    MalformedSubject(String),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid_token",
            Self::Expired => "expired",
            Self::MalformedSubject(_) => "malformed_subject",
            Self::Signing(_) => "signing",
        }
    }
}

/// Claims carried by every token.
///
/// `jti` makes two tokens minted for the same user within one second distinct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(default)]
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub jti: String,
}

/// Issues and verifies identity tokens with one symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_ms: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::milliseconds(i64::try_from(ttl_ms).unwrap_or(i64::MAX)),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(&settings.jwt_secret, settings.token_ttl_ms)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` that expires one TTL from now.
    pub fn issue(&self, user_id: u64) -> Result<String, TokenError> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    /// Issue a token as if the clock read `issued_at`.
    pub fn issue_at(&self, user_id: u64, issued_at: OffsetDateTime) -> Result<String, TokenError> {
        let expires_at = issued_at.saturating_add(self.ttl);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.unix_timestamp(),
            iat: issued_at.unix_timestamp(),
            jti: Uuid::now_v7().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verify signature and expiry, then resolve the subject to a user id.
    pub fn verify(&self, token: &str) -> Result<u64, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidToken,
            }
        })?;

        let subject = data.claims.sub;
        subject
            .parse::<u64>()
            .map_err(|_| TokenError::MalformedSubject(subject))
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}
