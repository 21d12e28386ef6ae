//! Request-time authorization gate.
//!
//! The transport layer extracts the raw credential material (bearer
//! token and/or API key header value) and resolves the tenant context;
//! the gate turns that into an authenticated principal or a typed
//! rejection. It never parses hosts or headers itself.

use tessera_core::error::{RejectReason, TesseraError, TesseraResult};
use tessera_core::repository::ApiKeyRepository;
use uuid::Uuid;

use crate::apikey::ApiKeyService;
use crate::error::TokenError;
use crate::token::{TokenCodec, TokenKind};

/// Credential material extracted from an inbound request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Credentials<'a> {
    /// Token from an `Authorization: Bearer <token>` header.
    pub bearer_token: Option<&'a str>,
    /// Value of the configured API key header.
    pub api_key: Option<&'a str>,
}

impl<'a> Credentials<'a> {
    pub fn bearer(token: &'a str) -> Self {
        Self {
            bearer_token: Some(token),
            api_key: None,
        }
    }

    pub fn api_key(key: &'a str) -> Self {
        Self {
            bearer_token: None,
            api_key: Some(key),
        }
    }
}

/// The authenticated identity attached to a request.
///
/// API-key principals carry no role claim: role guards deny them unless
/// downstream logic consults the RBAC graph itself.
#[derive(Debug, Clone)]
pub struct Principal {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// The request-time decision point.
pub struct AuthorizationGate<K: ApiKeyRepository> {
    codec: TokenCodec,
    api_keys: ApiKeyService<K>,
    super_role: String,
}

impl<K: ApiKeyRepository> AuthorizationGate<K> {
    pub fn new(codec: TokenCodec, api_keys: ApiKeyService<K>, super_role: impl Into<String>) -> Self {
        Self {
            codec,
            api_keys,
            super_role: super_role.into(),
        }
    }

    /// Authenticate the request's credential material against the
    /// resolved tenant.
    ///
    /// Bearer tokens are checked first. A valid token issued for a
    /// different tenant is rejected with [`TesseraError::TenantMismatch`]
    /// even though its signature verifies — a token minted for tenant A
    /// cannot be replayed against tenant B. Expired tokens are
    /// distinguishable (reason `expired`) so clients know to attempt the
    /// refresh flow; every other failure reads as reason `invalid`.
    pub async fn authenticate(
        &self,
        tenant_id: Uuid,
        credentials: Credentials<'_>,
    ) -> TesseraResult<Principal> {
        if let Some(token) = credentials.bearer_token {
            return self.authenticate_bearer(tenant_id, token);
        }

        if let Some(key) = credentials.api_key {
            let api_key = self.api_keys.validate(tenant_id, key).await?;
            return Ok(Principal {
                tenant_id,
                user_id: api_key.user_id,
                username: None,
                email: None,
                role: None,
            });
        }

        Err(TesseraError::Unauthenticated {
            reason: RejectReason::Missing,
        })
    }

    fn authenticate_bearer(&self, tenant_id: Uuid, token: &str) -> TesseraResult<Principal> {
        let claims = self
            .codec
            .verify(token, TokenKind::Access)
            .map_err(|e| {
                tracing::debug!(error = %e, "bearer token rejected");
                let reason = match e {
                    TokenError::Expired => RejectReason::Expired,
                    _ => RejectReason::Invalid,
                };
                TesseraError::Unauthenticated { reason }
            })?;

        let claim_tenant = parse_claim_uuid(&claims.tenant_id)?;
        if claim_tenant != tenant_id {
            tracing::debug!(
                token_tenant = %claim_tenant,
                request_tenant = %tenant_id,
                "token presented against foreign tenant"
            );
            return Err(TesseraError::TenantMismatch);
        }

        Ok(Principal {
            tenant_id,
            user_id: parse_claim_uuid(&claims.user_id)?,
            username: Some(claims.username),
            email: Some(claims.email),
            role: Some(claims.role),
        })
    }

    /// Role guard composing with a successful authentication: the
    /// principal's role must equal the required role or the configured
    /// super-role.
    pub fn require_role(&self, principal: &Principal, required: &str) -> TesseraResult<()> {
        match principal.role.as_deref() {
            Some(role) if role == required || role == self.super_role => Ok(()),
            _ => Err(TesseraError::Forbidden {
                reason: format!("requires role '{required}'"),
            }),
        }
    }
}

fn parse_claim_uuid(value: &str) -> TesseraResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| TesseraError::Unauthenticated {
        reason: RejectReason::Invalid,
    })
}
