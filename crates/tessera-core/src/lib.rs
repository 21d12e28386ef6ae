//! Tessera Core — domain models, error taxonomy, and repository trait
//! contracts shared across all crates.
//!
//! This crate carries no I/O and no cryptography; it defines the shapes
//! the engine (`tessera-auth`) and the store adapter (`tessera-db`)
//! agree on.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{RejectReason, TesseraError, TesseraResult};
