//! Error types for the Tessera system.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable rejection code attached to `Unauthenticated`.
///
/// Clients use this to decide whether a token refresh is worth
/// attempting: `Expired` means the credential was otherwise valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No credential material was presented at all.
    Missing,
    /// The credential failed parsing, signature, type, or lookup checks.
    Invalid,
    /// The credential was well-formed and correctly signed but past its
    /// expiry.
    Expired,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::Missing => "missing",
            RejectReason::Invalid => "invalid",
            RejectReason::Expired => "expired",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("conflict on {entity}: {reason}")]
    Conflict { entity: String, reason: String },

    /// Deliberately carries no detail: user-not-found, inactive account,
    /// and wrong password all collapse into this one value so callers
    /// cannot enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthenticated ({reason})")]
    Unauthenticated { reason: RejectReason },

    /// The presented credential is valid but was issued for a different
    /// tenant than the one resolved for this request.
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// The data store (or transport to it) failed. Distinct from any
    /// authorization outcome: "don't know" is never reported as "no".
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

pub type TesseraResult<T> = Result<T, TesseraError>;
