//! SurrealDB implementation of [`ApiKeyRepository`].
//!
//! Rows hold only the SHA-256 digest of the key; the plaintext never
//! reaches this layer. `find_by_hash` is the request-time validation
//! lookup, scoped by tenant so a key cannot resolve across tenants.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::api_key::{ApiKey, CreateApiKey};
use tessera_core::repository::ApiKeyRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ApiKeyRow {
    tenant_id: String,
    user_id: String,
    key_hash: String,
    label: String,
    active: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApiKeyRow {
    fn into_api_key(self, id: Uuid) -> Result<ApiKey, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Decode(format!("invalid tenant UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        Ok(ApiKey {
            id,
            tenant_id,
            user_id,
            key_hash: self.key_hash,
            label: self.label,
            active: self.active,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct ApiKeyRowWithId {
    record_id: String,
    tenant_id: String,
    user_id: String,
    key_hash: String,
    label: String,
    active: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApiKeyRowWithId {
    fn try_into_api_key(self) -> Result<ApiKey, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Decode(format!("invalid tenant UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        Ok(ApiKey {
            id,
            tenant_id,
            user_id,
            key_hash: self.key_hash,
            label: self.label,
            active: self.active,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the ApiKey repository.
#[derive(Clone)]
pub struct SurrealApiKeyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealApiKeyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ApiKeyRepository for SurrealApiKeyRepository<C> {
    async fn create(&self, input: CreateApiKey) -> TesseraResult<ApiKey> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // Single statement: the key either exists fully or not at all.
        let result = self
            .db
            .query(
                "CREATE type::record('api_key', $id) SET \
                 tenant_id = $tenant_id, \
                 user_id = $user_id, \
                 key_hash = $key_hash, \
                 label = $label, \
                 active = true, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("key_hash", input.key_hash))
            .bind(("label", input.label))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ApiKeyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "api_key".into(),
            id: id_str,
        })?;

        Ok(row.into_api_key(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> TesseraResult<ApiKey> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('api_key', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApiKeyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "api_key".into(),
            id: id_str,
        })?;

        Ok(row.into_api_key(id)?)
    }

    async fn find_by_hash(&self, tenant_id: Uuid, key_hash: &str) -> TesseraResult<ApiKey> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM api_key \
                 WHERE tenant_id = $tenant_id AND key_hash = $key_hash",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("key_hash", key_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApiKeyRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "api_key".into(),
            id: "hash=<redacted>".into(),
        })?;

        Ok(row.try_into_api_key()?)
    }

    async fn list_by_user(&self, tenant_id: Uuid, user_id: Uuid) -> TesseraResult<Vec<ApiKey>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM api_key \
                 WHERE tenant_id = $tenant_id AND user_id = $user_id \
                 ORDER BY created_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApiKeyRowWithId> = result.take(0).map_err(DbError::from)?;

        let keys = rows
            .into_iter()
            .map(|row| row.try_into_api_key())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(keys)
    }

    async fn set_active(&self, tenant_id: Uuid, id: Uuid, active: bool) -> TesseraResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('api_key', $id) SET \
                 active = $active, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ApiKeyRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "api_key".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> TesseraResult<()> {
        self.db
            .query("DELETE type::record('api_key', $id) WHERE tenant_id = $tenant_id")
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
