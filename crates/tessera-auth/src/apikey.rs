//! API key generation, format validation, hashing, and the
//! issuance/validation service.
//!
//! The plaintext secret is returned exactly once, at issuance; only its
//! SHA-256 digest is persisted. Request-time validation hashes the
//! candidate and looks it up scoped to the claimed tenant, so a key can
//! never authenticate against another tenant.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tessera_core::error::{RejectReason, TesseraError, TesseraResult};
use tessera_core::models::api_key::{ApiKey, CreateApiKey};
use tessera_core::repository::ApiKeyRepository;
use uuid::Uuid;

use crate::error::AuthError;

/// Generate an opaque API key: 32 bytes of CSPRNG output, hex-encoded
/// (64 characters).
pub fn generate_key() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Generate an operator-distinguishable key formatted
/// `prefix_<random>`, where the random part is 24 bytes base64url
/// encoded (32 characters).
pub fn generate_key_with_prefix(prefix: &str) -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 24] = rng.random();
    format!("{prefix}_{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// SHA-256 digest of a raw key, hex-encoded. This is the only form
/// that ever reaches the store.
pub fn hash_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cheap surface check run before any store access: candidates shorter
/// than the configured minimum can never be valid keys.
pub fn validate_format(candidate: &str, min_length: usize) -> Result<(), AuthError> {
    if candidate.len() < min_length {
        return Err(AuthError::ApiKeyInvalid(format!(
            "shorter than {min_length} characters"
        )));
    }
    Ok(())
}

/// Constant-time byte equality. Branch-free over the full length so a
/// mismatch position cannot be inferred from timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// API key issuance and request-time validation, generic over the
/// key store contract.
#[derive(Clone)]
pub struct ApiKeyService<K: ApiKeyRepository> {
    keys: K,
    min_key_length: usize,
}

impl<K: ApiKeyRepository> ApiKeyService<K> {
    pub fn new(keys: K, min_key_length: usize) -> Self {
        Self {
            keys,
            min_key_length,
        }
    }

    /// Issue a new key for a user. Returns the stored record and the
    /// plaintext secret — the only time the plaintext exists.
    pub async fn issue(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        label: &str,
        expires_in_days: Option<i64>,
        prefix: Option<&str>,
    ) -> TesseraResult<(ApiKey, String)> {
        let raw = match prefix {
            Some(p) => generate_key_with_prefix(p),
            None => generate_key(),
        };

        let key = self
            .keys
            .create(CreateApiKey {
                tenant_id,
                user_id,
                key_hash: hash_key(&raw),
                label: label.to_string(),
                expires_at: expires_in_days.map(|days| Utc::now() + Duration::days(days)),
            })
            .await?;

        tracing::info!(%tenant_id, %user_id, key_id = %key.id, "issued API key");

        Ok((key, raw))
    }

    /// Validate a presented key within the tenant. Every failure mode —
    /// bad format, unknown hash, inactive, expired — produces the same
    /// rejection value, so expired keys are indistinguishable from
    /// absent ones. Store failures propagate as `Unavailable`.
    pub async fn validate(&self, tenant_id: Uuid, candidate: &str) -> TesseraResult<ApiKey> {
        validate_format(candidate, self.min_key_length).map_err(|_| rejected())?;

        let candidate_hash = hash_key(candidate);
        let key = match self.keys.find_by_hash(tenant_id, &candidate_hash).await {
            Ok(key) => key,
            Err(TesseraError::NotFound { .. }) => return Err(rejected()),
            Err(other) => return Err(other),
        };

        if !constant_time_eq(key.key_hash.as_bytes(), candidate_hash.as_bytes()) {
            return Err(rejected());
        }
        if !key.active {
            return Err(rejected());
        }
        if let Some(expires_at) = key.expires_at {
            if expires_at <= Utc::now() {
                return Err(rejected());
            }
        }

        Ok(key)
    }

    /// All keys belonging to a user (hashes included; the transport
    /// layer decides what to expose).
    pub async fn list_for_user(&self, tenant_id: Uuid, user_id: Uuid) -> TesseraResult<Vec<ApiKey>> {
        self.keys.list_by_user(tenant_id, user_id).await
    }

    /// Deactivate (or reactivate) a key. Keys are never rotated in
    /// place: deactivate and issue a replacement instead.
    pub async fn set_active(&self, tenant_id: Uuid, id: Uuid, active: bool) -> TesseraResult<()> {
        self.keys.set_active(tenant_id, id, active).await
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> TesseraResult<()> {
        self.keys.delete(tenant_id, id).await
    }
}

fn rejected() -> TesseraError {
    TesseraError::Unauthenticated {
        reason: RejectReason::Invalid,
    }
}
