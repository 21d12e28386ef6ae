//! Integration tests for RBAC permission resolution against in-memory
//! SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tessera_auth::rbac::RbacService;
use tessera_core::models::permission::CreatePermission;
use tessera_core::models::role::CreateRole;
use tessera_core::models::tenant::CreateTenant;
use tessera_core::models::user::CreateUser;
use tessera_core::repository::{RoleRepository, TenantRepository, UserRepository};
use tessera_db::repository::{
    SurrealPermissionRepository, SurrealRoleRepository, SurrealTenantRepository,
    SurrealUserRepository,
};
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;
type Rbac = RbacService<SurrealRoleRepository<Db>, SurrealPermissionRepository<Db>>;

async fn setup() -> (Rbac, Surreal<Db>, Uuid, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tessera_db::run_migrations(&db).await.unwrap();

    let tenant = SurrealTenantRepository::new(db.clone())
        .create(CreateTenant {
            name: "acme".into(),
        })
        .await
        .unwrap();

    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            tenant_id: tenant.id,
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$stub-hash".into(),
            role: "member".into(),
        })
        .await
        .unwrap();

    let rbac = RbacService::new(
        SurrealRoleRepository::new(db.clone()),
        SurrealPermissionRepository::new(db.clone()),
    );

    (rbac, db, tenant.id, user.id)
}

#[tokio::test]
async fn permission_appears_only_after_role_assignment() {
    let (rbac, _db, tenant_id, user_id) = setup().await;

    let viewer = rbac
        .create_role(CreateRole {
            tenant_id,
            name: "viewer".into(),
            description: "Can view".into(),
        })
        .await
        .unwrap();
    let users_read = rbac
        .create_permission(CreatePermission {
            tenant_id,
            name: "users.read".into(),
            description: "Read users".into(),
        })
        .await
        .unwrap();

    rbac.add_permission_to_role(tenant_id, viewer.id, users_read.id)
        .await
        .unwrap();

    // Not yet assigned to alice.
    assert!(
        !rbac
            .has_permission(tenant_id, user_id, "users.read")
            .await
            .unwrap()
    );

    rbac.assign_role_to_user(tenant_id, user_id, viewer.id)
        .await
        .unwrap();

    // Now reachable through alice → viewer → users.read.
    assert!(
        rbac.has_permission(tenant_id, user_id, "users.read")
            .await
            .unwrap()
    );

    // A permission never granted anywhere stays false.
    assert!(
        !rbac
            .has_permission(tenant_id, user_id, "users.delete")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn removing_the_edge_removes_the_permission() {
    let (rbac, _db, tenant_id, user_id) = setup().await;

    let viewer = rbac
        .create_role(CreateRole {
            tenant_id,
            name: "viewer".into(),
            description: "Can view".into(),
        })
        .await
        .unwrap();
    let perm = rbac
        .create_permission(CreatePermission {
            tenant_id,
            name: "users.read".into(),
            description: "Read users".into(),
        })
        .await
        .unwrap();

    rbac.add_permission_to_role(tenant_id, viewer.id, perm.id)
        .await
        .unwrap();
    rbac.assign_role_to_user(tenant_id, user_id, viewer.id)
        .await
        .unwrap();
    assert!(
        rbac.has_permission(tenant_id, user_id, "users.read")
            .await
            .unwrap()
    );

    rbac.remove_role_from_user(tenant_id, user_id, viewer.id)
        .await
        .unwrap();
    assert!(
        !rbac
            .has_permission(tenant_id, user_id, "users.read")
            .await
            .unwrap()
    );

    // Removing it again is a no-op, not an error.
    rbac.remove_role_from_user(tenant_id, user_id, viewer.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn assignment_is_idempotent_through_the_service() {
    let (rbac, _db, tenant_id, user_id) = setup().await;

    let viewer = rbac
        .create_role(CreateRole {
            tenant_id,
            name: "viewer".into(),
            description: "Can view".into(),
        })
        .await
        .unwrap();

    rbac.assign_role_to_user(tenant_id, user_id, viewer.id)
        .await
        .unwrap();
    rbac.assign_role_to_user(tenant_id, user_id, viewer.id)
        .await
        .unwrap();

    let roles = rbac.list_user_roles(tenant_id, user_id).await.unwrap();
    assert_eq!(roles.len(), 1);
}

#[tokio::test]
async fn list_projections_reflect_the_graph() {
    let (rbac, _db, tenant_id, user_id) = setup().await;

    let editor = rbac
        .create_role(CreateRole {
            tenant_id,
            name: "editor".into(),
            description: "Can edit".into(),
        })
        .await
        .unwrap();
    let read = rbac
        .create_permission(CreatePermission {
            tenant_id,
            name: "docs.read".into(),
            description: "Read docs".into(),
        })
        .await
        .unwrap();
    let write = rbac
        .create_permission(CreatePermission {
            tenant_id,
            name: "docs.write".into(),
            description: "Write docs".into(),
        })
        .await
        .unwrap();

    rbac.add_permission_to_role(tenant_id, editor.id, read.id)
        .await
        .unwrap();
    rbac.add_permission_to_role(tenant_id, editor.id, write.id)
        .await
        .unwrap();
    rbac.assign_role_to_user(tenant_id, user_id, editor.id)
        .await
        .unwrap();

    let roles = rbac.list_user_roles(tenant_id, user_id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "editor");

    let perms = rbac
        .list_role_permissions(tenant_id, editor.id)
        .await
        .unwrap();
    let names: Vec<&str> = perms.iter().map(|p| p.name.as_str()).collect();
    assert!(names.contains(&"docs.read"));
    assert!(names.contains(&"docs.write"));
}

#[tokio::test]
async fn permission_resolution_never_crosses_tenants() {
    let (rbac, db, acme_id, acme_user) = setup().await;

    // A second tenant with an identically named user, role, and
    // permission.
    let other = SurrealTenantRepository::new(db.clone())
        .create(CreateTenant {
            name: "other".into(),
        })
        .await
        .unwrap();
    let other_user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            tenant_id: other.id,
            username: "alice".into(),
            email: "alice@other.example".into(),
            password_hash: "$argon2id$stub-hash".into(),
            role: "member".into(),
        })
        .await
        .unwrap();

    for &tid in &[acme_id, other.id] {
        let role = rbac
            .create_role(CreateRole {
                tenant_id: tid,
                name: "viewer".into(),
                description: "Can view".into(),
            })
            .await
            .unwrap();
        let perm = rbac
            .create_permission(CreatePermission {
                tenant_id: tid,
                name: "users.read".into(),
                description: "Read users".into(),
            })
            .await
            .unwrap();
        rbac.add_permission_to_role(tid, role.id, perm.id)
            .await
            .unwrap();
    }

    // Grant the role in acme only.
    let acme_roles = rbac.list_user_roles(acme_id, acme_user).await.unwrap();
    assert!(acme_roles.is_empty());
    let acme_viewer = SurrealRoleRepository::new(db.clone())
        .get_by_name(acme_id, "viewer")
        .await
        .unwrap();
    rbac.assign_role_to_user(acme_id, acme_user, acme_viewer.id)
        .await
        .unwrap();

    assert!(
        rbac.has_permission(acme_id, acme_user, "users.read")
            .await
            .unwrap()
    );

    // The identically named graph in the other tenant is unaffected.
    assert!(
        !rbac
            .has_permission(other.id, other_user.id, "users.read")
            .await
            .unwrap()
    );
}
