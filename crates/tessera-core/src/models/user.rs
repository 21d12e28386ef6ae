//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Unique within the tenant.
    pub username: String,
    /// Unique within the tenant.
    pub email: String,
    /// Argon2id PHC-format hash. Never serialized out to clients by the
    /// transport layer; the raw password never reaches this type.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub password_hash: String,
    /// Legacy single-string role label carried in token claims. The
    /// RBAC graph (roles/permissions) is authoritative for permission
    /// checks; this label feeds the coarse role guard only.
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new user.
///
/// Carries the already-hashed password: hashing lives in the auth layer,
/// the store only ever sees hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub tenant_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Fields that can be updated on an existing user.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}
