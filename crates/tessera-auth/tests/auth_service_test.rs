//! Integration tests for the authentication service against in-memory
//! SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tessera_auth::config::AuthConfig;
use tessera_auth::password;
use tessera_auth::service::AuthService;
use tessera_auth::token::TokenKind;
use tessera_core::error::TesseraError;
use tessera_core::models::tenant::CreateTenant;
use tessera_core::models::user::CreateUser;
use tessera_core::repository::{TenantRepository, UserRepository};
use tessera_db::repository::{SurrealTenantRepository, SurrealUserRepository};
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

fn test_config() -> AuthConfig {
    AuthConfig {
        access_secret: "access-secret-for-testing-0123456789".into(),
        refresh_secret: "refresh-secret-for-testing-0123456789".into(),
        ..Default::default()
    }
}

/// Spin up in-memory DB, run migrations, create tenant + active user.
async fn setup() -> (
    AuthService<SurrealTenantRepository<Db>, SurrealUserRepository<Db>>,
    SurrealTenantRepository<Db>,
    SurrealUserRepository<Db>,
    Uuid, // tenant_id
    Uuid, // user_id
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tessera_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            name: "acme".into(),
        })
        .await
        .unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo
        .create(CreateUser {
            tenant_id: tenant.id,
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: password::hash_password("S3cret!!", 2).unwrap(),
            role: "manager".into(),
        })
        .await
        .unwrap();

    let svc = AuthService::new(tenant_repo.clone(), user_repo.clone(), test_config());

    (svc, tenant_repo, user_repo, tenant.id, user.id)
}

#[tokio::test]
async fn login_happy_path() {
    let (svc, _, _, tenant_id, user_id) = setup().await;

    let out = svc.login(tenant_id, "alice", "S3cret!!").await.unwrap();

    assert!(!out.access_token.is_empty());
    assert!(!out.refresh_token.is_empty());
    assert!(out.expires_at > chrono::Utc::now());
    assert_eq!(out.user.id, user_id);

    // The issued access token decodes back to the issuing inputs.
    let claims = svc
        .token_codec()
        .verify(&out.access_token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.user_id, user_id.to_string());
    assert_eq!(claims.tenant_id, tenant_id.to_string());
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.email, "alice@x.com");
    assert_eq!(claims.role, "manager");
}

#[tokio::test]
async fn login_by_email() {
    let (svc, _, _, tenant_id, _) = setup().await;

    let result = svc.login(tenant_id, "alice@x.com", "S3cret!!").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let (svc, _, _, tenant_id, _) = setup().await;

    let wrong_password = svc
        .login(tenant_id, "alice", "wrong")
        .await
        .unwrap_err();
    let unknown_user = svc
        .login(tenant_id, "bob-does-not-exist", "whatever")
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, TesseraError::InvalidCredentials));
    assert!(matches!(unknown_user, TesseraError::InvalidCredentials));
    // Identical error shape, down to the rendered message.
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn inactive_user_cannot_login() {
    let (svc, _, users, tenant_id, user_id) = setup().await;

    users.set_active(tenant_id, user_id, false).await.unwrap();

    let err = svc.login(tenant_id, "alice", "S3cret!!").await.unwrap_err();
    assert!(matches!(err, TesseraError::InvalidCredentials));
}

#[tokio::test]
async fn inactive_tenant_rejects_all_logins() {
    let (svc, tenants, _, tenant_id, _) = setup().await;

    tenants.set_active(tenant_id, false).await.unwrap();

    let err = svc.login(tenant_id, "alice", "S3cret!!").await.unwrap_err();
    assert!(matches!(err, TesseraError::InvalidCredentials));
}

#[tokio::test]
async fn unknown_tenant_rejected() {
    let (svc, _, _, _, _) = setup().await;

    let err = svc
        .login(Uuid::new_v4(), "alice", "S3cret!!")
        .await
        .unwrap_err();
    assert!(matches!(err, TesseraError::InvalidCredentials));
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let (svc, _, _, tenant_id, user_id) = setup().await;

    let err = svc
        .change_password(tenant_id, user_id, "wrong-current", "NewPass!1")
        .await
        .unwrap_err();
    assert!(matches!(err, TesseraError::InvalidCredentials));

    // Old password still works: nothing was persisted.
    assert!(svc.login(tenant_id, "alice", "S3cret!!").await.is_ok());
}

#[tokio::test]
async fn change_password_rehashes_and_persists() {
    let (svc, _, _, tenant_id, user_id) = setup().await;

    svc.change_password(tenant_id, user_id, "S3cret!!", "NewPass!1")
        .await
        .unwrap();

    // Old password rejected, new one accepted.
    let err = svc.login(tenant_id, "alice", "S3cret!!").await.unwrap_err();
    assert!(matches!(err, TesseraError::InvalidCredentials));
    assert!(svc.login(tenant_id, "alice", "NewPass!1").await.is_ok());
}

#[tokio::test]
async fn refresh_reissues_token_pair() {
    let (svc, _, _, tenant_id, user_id) = setup().await;

    let login = svc.login(tenant_id, "alice", "S3cret!!").await.unwrap();
    let refreshed = svc.refresh(&login.refresh_token).unwrap();

    assert!(!refreshed.access_token.is_empty());
    assert!(!refreshed.refresh_token.is_empty());

    let claims = svc
        .token_codec()
        .verify(&refreshed.access_token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.user_id, user_id.to_string());
    assert_eq!(claims.tenant_id, tenant_id.to_string());
    assert_eq!(claims.role, "manager");
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let (svc, _, _, tenant_id, _) = setup().await;

    let login = svc.login(tenant_id, "alice", "S3cret!!").await.unwrap();
    let err = svc.refresh(&login.access_token).unwrap_err();

    assert!(matches!(err, TesseraError::Unauthenticated { .. }));
}

#[tokio::test]
async fn refresh_rejects_garbage() {
    let (svc, _, _, _, _) = setup().await;

    let err = svc.refresh("totally-bogus-token").unwrap_err();
    assert!(matches!(err, TesseraError::Unauthenticated { .. }));
}
