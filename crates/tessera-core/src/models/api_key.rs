//! API key domain model.
//!
//! Only the SHA-256 hash of the opaque secret is persisted; the
//! plaintext exists exactly once, at issuance time. Keys are never
//! rotated in place — deactivate and reissue instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// The user this key authenticates as.
    pub user_id: Uuid,
    /// SHA-256 hex digest of the opaque secret.
    pub key_hash: String,
    /// Human label ("CI deploy key").
    pub label: String,
    pub active: bool,
    /// Expired keys validate identically to absent keys.
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKey {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub key_hash: String,
    pub label: String,
    pub expires_at: Option<DateTime<Utc>>,
}
