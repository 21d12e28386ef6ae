//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter on every call to enforce data
//! isolation; cross-tenant reads are impossible through these
//! contracts. The engine depends only on these traits, so tests can
//! substitute instrumented fakes for the real store.

use uuid::Uuid;

use crate::error::TesseraResult;
use crate::models::{
    api_key::{ApiKey, CreateApiKey},
    permission::{CreatePermission, Permission},
    role::{CreateRole, Role},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenant (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    /// Create a tenant. Names are globally unique; a duplicate name is a
    /// `Conflict`.
    fn create(&self, input: CreateTenant) -> impl Future<Output = TesseraResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TesseraResult<Tenant>> + Send;
    /// Lookup by unique name — used by the tenant-identification
    /// collaborator that resolves a subdomain/header to a tenant.
    fn get_by_name(&self, name: &str) -> impl Future<Output = TesseraResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = TesseraResult<Tenant>> + Send;
    /// Activate or deactivate. Deactivation shuts off authentication for
    /// every user of the tenant.
    fn set_active(&self, id: Uuid, active: bool) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Create a user. (tenant, username) and (tenant, email) are unique;
    /// duplicates are a `Conflict`. The input carries an already-hashed
    /// password.
    fn create(&self, input: CreateUser) -> impl Future<Output = TesseraResult<User>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TesseraResult<User>> + Send;
    fn get_by_username(
        &self,
        tenant_id: Uuid,
        username: &str,
    ) -> impl Future<Output = TesseraResult<User>> + Send;
    fn get_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> impl Future<Output = TesseraResult<User>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = TesseraResult<User>> + Send;
    /// Replace the stored password hash (single atomic write).
    fn set_password_hash(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        password_hash: &str,
    ) -> impl Future<Output = TesseraResult<()>> + Send;
    fn set_active(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        active: bool,
    ) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<User>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    /// Create a role; (tenant, name) duplicates are a `Conflict`.
    fn create(&self, input: CreateRole) -> impl Future<Output = TesseraResult<Role>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TesseraResult<Role>> + Send;
    fn get_by_name(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> impl Future<Output = TesseraResult<Role>> + Send;
    /// Delete the role and cascade its user-assignment and
    /// permission-grant edges; edges cannot outlive either endpoint.
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<Role>>> + Send;

    /// Assign a role to a user. Idempotent: re-assigning an existing
    /// pair leaves exactly one edge.
    fn assign_to_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Remove a role assignment. Removing a non-existent edge is a
    /// no-op, not an error.
    fn unassign_from_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// All roles assigned to a user within the tenant.
    fn get_user_roles(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Role>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    /// Create a permission; (tenant, name) duplicates are a `Conflict`.
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = TesseraResult<Permission>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TesseraResult<Permission>> + Send;
    fn get_by_name(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> impl Future<Output = TesseraResult<Permission>> + Send;
    /// Delete the permission and cascade its grant edges.
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<Permission>>> + Send;

    /// Grant a permission to a role (creates a `grants` edge).
    /// Idempotent.
    fn grant_to_role(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Revoke a permission from a role. No-op if not granted.
    fn revoke_from_role(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// All permissions granted to a role within the tenant.
    fn get_role_permissions(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Permission>>> + Send;
}

pub trait ApiKeyRepository: Send + Sync {
    fn create(&self, input: CreateApiKey) -> impl Future<Output = TesseraResult<ApiKey>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TesseraResult<ApiKey>> + Send;
    /// Tenant-scoped lookup by secret hash — the request-time validation
    /// path. A miss is `NotFound`.
    fn find_by_hash(
        &self,
        tenant_id: Uuid,
        key_hash: &str,
    ) -> impl Future<Output = TesseraResult<ApiKey>> + Send;
    fn list_by_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<ApiKey>>> + Send;
    fn set_active(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        active: bool,
    ) -> impl Future<Output = TesseraResult<()>> + Send;
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
}
