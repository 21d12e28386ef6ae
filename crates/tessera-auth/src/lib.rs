//! Tessera Auth — password verification, JWT access/refresh tokens,
//! API keys, RBAC resolution, and the request-time authorization gate.
//!
//! Everything here is generic over the repository contracts defined in
//! `tessera-core`; dependencies are injected at construction time and
//! held as immutable fields, so all services are safe for concurrent
//! use.

pub mod apikey;
pub mod config;
pub mod error;
pub mod gate;
pub mod password;
pub mod rbac;
pub mod service;
pub mod token;

pub use apikey::ApiKeyService;
pub use config::AuthConfig;
pub use error::{AuthError, TokenError};
pub use gate::{AuthorizationGate, Credentials, Principal};
pub use rbac::RbacService;
pub use service::{AuthService, LoginOutput, RefreshOutput};
pub use token::{TokenClaims, TokenCodec, TokenKind};
