//! Authorization gate: turns a request credential into an [`Identity`].

use thiserror::Error;

use crate::ownership::Identity;
use crate::token::{TokenError, TokenService};

const BEARER: &str = "bearer";

/// Terminal gate failures. Both surface as unauthorized; the split only matters for logs.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("missing credential")]
    MissingCredential,

    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] TokenError),
}

impl GateError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential(_) => "invalid_credential",
        }
    }
}

/// Verifies bearer credentials with the shared [`TokenService`].
#[derive(Debug, Clone)]
pub struct AuthGate {
    tokens: TokenService,
}

impl AuthGate {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Resolve the value of an `Authorization` header.
    ///
    /// An absent or blank header is `MissingCredential`. Anything else that is
    /// not a verifiable `Bearer` token is `InvalidCredential`.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Identity, GateError> {
        self.resolve(authorization).inspect_err(log_rejection)
    }

    /// Like [`AuthGate::authorize`] for raw header bytes; non-UTF-8 input is
    /// an invalid credential.
    pub fn authorize_bytes(&self, authorization: Option<&[u8]>) -> Result<Identity, GateError> {
        let header = match authorization.map(std::str::from_utf8).transpose() {
            Ok(header) => header,
            Err(_) => {
                let err = GateError::InvalidCredential(TokenError::InvalidToken);
                log_rejection(&err);
                return Err(err);
            }
        };
        self.authorize(header)
    }

    fn resolve(&self, authorization: Option<&str>) -> Result<Identity, GateError> {
        let header = authorization
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(GateError::MissingCredential)?;

        let (scheme, token) = header
            .split_once(' ')
            .ok_or(GateError::InvalidCredential(TokenError::InvalidToken))?;
        if !scheme.eq_ignore_ascii_case(BEARER) {
            return Err(TokenError::InvalidToken.into());
        }

        let user_id = self.tokens.verify(token.trim())?;
        Ok(Identity::new(user_id))
    }
}

fn log_rejection(err: &GateError) {
    match err {
        GateError::MissingCredential => {
            tracing::warn!(kind = err.kind(), "request rejected by authorization gate")
        }
        GateError::InvalidCredential(reason) => tracing::warn!(
            kind = err.kind(),
            reason = reason.kind(),
            "request rejected by authorization gate"
        ),
    }
}
