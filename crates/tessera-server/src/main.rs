//! Tessera Server — application entry point.
//!
//! Wires configuration, the store, and the core services. The HTTP
//! transport (routing, request binding, tenant resolution from
//! host/header) is mounted on top of these services and lives outside
//! this binary.

use tracing_subscriber::EnvFilter;

use tessera_auth::{ApiKeyService, AuthConfig, AuthService, AuthorizationGate, RbacService};
use tessera_db::repository::{
    SurrealApiKeyRepository, SurrealPermissionRepository, SurrealRoleRepository,
    SurrealTenantRepository, SurrealUserRepository,
};
use tessera_db::{DbConfig, DbManager};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("tessera=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Tessera server...");

    let auth_config = AuthConfig::from_env();
    if auth_config.access_secret.is_empty() {
        tracing::error!("TESSERA_ACCESS_SECRET is not set");
        std::process::exit(1);
    }

    let db_config = DbConfig::from_env();
    let db = match DbManager::connect(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = tessera_db::run_migrations(db.client()).await {
        tracing::error!(error = %e, "schema migration failed");
        std::process::exit(1);
    }

    let client = db.client().clone();

    let auth_service = AuthService::new(
        SurrealTenantRepository::new(client.clone()),
        SurrealUserRepository::new(client.clone()),
        auth_config.clone(),
    );
    let api_keys = ApiKeyService::new(
        SurrealApiKeyRepository::new(client.clone()),
        auth_config.min_api_key_length,
    );
    let _rbac = RbacService::new(
        SurrealRoleRepository::new(client.clone()),
        SurrealPermissionRepository::new(client.clone()),
    );
    let _gate = AuthorizationGate::new(
        auth_service.token_codec(),
        api_keys,
        auth_config.super_role.clone(),
    );

    tracing::info!("Tessera core services ready");

    // TODO: mount the HTTP transport (tenant resolution + routing) on
    // top of the gate and services.

    tracing::info!("Tessera server stopped.");
}
