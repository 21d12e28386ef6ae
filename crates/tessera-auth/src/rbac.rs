//! RBAC permission resolution over the tenant→user→role→permission
//! graph.
//!
//! Permissions are granted to roles and roles to users, never
//! permissions directly to users. Resolution is a per-query transitive
//! closure — nothing is cached — and every hop is scoped by tenant id,
//! so an edge added in one tenant can never influence answers computed
//! for another.

use tessera_core::error::TesseraResult;
use tessera_core::models::permission::{CreatePermission, Permission};
use tessera_core::models::role::{CreateRole, Role};
use tessera_core::repository::{PermissionRepository, RoleRepository};
use uuid::Uuid;

/// Permission resolver and RBAC graph management, generic over the
/// role/permission store contracts.
pub struct RbacService<R: RoleRepository, P: PermissionRepository> {
    roles: R,
    permissions: P,
}

impl<R: RoleRepository, P: PermissionRepository> RbacService<R, P> {
    pub fn new(roles: R, permissions: P) -> Self {
        Self { roles, permissions }
    }

    /// Point query: does the user hold a role (within the tenant) that
    /// grants a permission of this name (within the same tenant)?
    ///
    /// A store failure is not an answer: it propagates so callers can
    /// distinguish "no" from "don't know".
    pub async fn has_permission(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        permission_name: &str,
    ) -> TesseraResult<bool> {
        let roles = self.roles.get_user_roles(tenant_id, user_id).await?;

        for role in roles {
            let granted = self
                .permissions
                .get_role_permissions(tenant_id, role.id)
                .await?;
            if granted.iter().any(|p| p.name == permission_name) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// All roles assigned to a user within the tenant.
    pub async fn list_user_roles(&self, tenant_id: Uuid, user_id: Uuid) -> TesseraResult<Vec<Role>> {
        self.roles.get_user_roles(tenant_id, user_id).await
    }

    /// All permissions granted to a role within the tenant.
    pub async fn list_role_permissions(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
    ) -> TesseraResult<Vec<Permission>> {
        self.permissions.get_role_permissions(tenant_id, role_id).await
    }

    pub async fn create_role(&self, input: CreateRole) -> TesseraResult<Role> {
        self.roles.create(input).await
    }

    pub async fn create_permission(&self, input: CreatePermission) -> TesseraResult<Permission> {
        self.permissions.create(input).await
    }

    /// Assign a role to a user. Idempotent: assigning an existing pair
    /// leaves exactly one edge.
    pub async fn assign_role_to_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> TesseraResult<()> {
        self.roles.assign_to_user(tenant_id, user_id, role_id).await
    }

    /// Remove a role from a user. Removing an absent edge is a no-op.
    pub async fn remove_role_from_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> TesseraResult<()> {
        self.roles
            .unassign_from_user(tenant_id, user_id, role_id)
            .await
    }

    /// Grant a permission to a role. Idempotent.
    pub async fn add_permission_to_role(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> TesseraResult<()> {
        self.permissions
            .grant_to_role(tenant_id, role_id, permission_id)
            .await
    }

    /// Revoke a permission from a role. No-op when not granted.
    pub async fn remove_permission_from_role(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> TesseraResult<()> {
        self.permissions
            .revoke_from_role(tenant_id, role_id, permission_id)
            .await
    }
}
