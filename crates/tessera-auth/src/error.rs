//! Authentication error types.

use tessera_core::error::{RejectReason, TesseraError};
use thiserror::Error;

/// Token verification failures, distinguished internally.
///
/// The authorization gate collapses these into `Unauthenticated` with a
/// machine-readable reason; only `Expired` stays distinguishable so
/// clients know a refresh is worth attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token could not be parsed at all.
    #[error("malformed token")]
    Malformed,

    /// Cryptographic verification failed — wrong secret, tampered
    /// payload, or a header asserting a non-pinned algorithm.
    #[error("bad token signature")]
    BadSignature,

    /// Signature valid, expiry in the past.
    #[error("token has expired")]
    Expired,

    /// A valid token of the other kind (access vs refresh).
    #[error("wrong token type")]
    WrongType,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("invalid API key: {0}")]
    ApiKeyInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for TesseraError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => TesseraError::InvalidCredentials,
            AuthError::Token(TokenError::Expired) => TesseraError::Unauthenticated {
                reason: RejectReason::Expired,
            },
            AuthError::Token(_) | AuthError::ApiKeyInvalid(_) => TesseraError::Unauthenticated {
                reason: RejectReason::Invalid,
            },
            AuthError::Crypto(msg) => TesseraError::Crypto(msg),
        }
    }
}
