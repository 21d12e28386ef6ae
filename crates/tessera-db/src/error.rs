//! Database-specific error types and conversions.

use tessera_core::error::TesseraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("query failed: {0}")]
    Query(String),

    #[error("row decode failed: {0}")]
    Decode(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("conflict on {entity}: {reason}")]
    Conflict { entity: String, reason: String },
}

impl From<DbError> for TesseraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TesseraError::NotFound { entity, id },
            DbError::Conflict { entity, reason } => TesseraError::Conflict { entity, reason },
            // Transport/query/decode failures mean "don't know", never
            // an authorization outcome.
            other => TesseraError::Unavailable(other.to_string()),
        }
    }
}
