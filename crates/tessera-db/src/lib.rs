//! Tessera Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Implementations of every `tessera-core` repository contract
//! - Error types ([`DbError`])
//!
//! Tenant isolation is row-level: every tenant-scoped query filters on
//! `tenant_id`, and the per-tenant uniqueness constraints are compound
//! indexes over `(tenant_id, …)`.

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
