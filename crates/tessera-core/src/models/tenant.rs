//! Tenant domain model.
//!
//! A tenant is an isolated customer/organization boundary. All user,
//! role, permission, and API-key data is partitioned by tenant id; the
//! same username may exist in two tenants as two distinct users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Globally unique human-readable name (also usable as the
    /// subdomain/header identifier resolved by the transport layer).
    pub name: String,
    /// Unique isolation-namespace label. Kept as an opaque row-scoping
    /// identifier; there is no physical per-tenant schema behind it.
    pub namespace: String,
    /// An inactive tenant rejects all authentication for its users.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
}

/// Fields that can be updated on an existing tenant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
}
