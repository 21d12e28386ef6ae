//! Authentication service — login, password change, and token refresh
//! orchestration.

use chrono::{DateTime, Utc};
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::user::User;
use tessera_core::repository::{TenantRepository, UserRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{RefreshedTokens, TokenCodec, TokenKind};

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Signed JWT refresh token (stateless; nothing is stored).
    pub refresh_token: String,
    /// Expiry of the access token.
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Successful refresh result (new token pair).
#[derive(Debug)]
pub struct RefreshOutput {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service.
///
/// Generic over repository implementations so this layer has no
/// dependency on the store crate.
pub struct AuthService<T: TenantRepository, U: UserRepository> {
    tenants: T,
    users: U,
    codec: TokenCodec,
    config: AuthConfig,
}

impl<T: TenantRepository, U: UserRepository> AuthService<T, U> {
    pub fn new(tenants: T, users: U, config: AuthConfig) -> Self {
        Self {
            tenants,
            users,
            codec: TokenCodec::new(&config),
            config,
        }
    }

    /// Authenticate a user with username/email + password and issue a
    /// token pair.
    ///
    /// Unknown tenant, inactive tenant, unknown user, inactive user,
    /// and wrong password all produce the identical
    /// [`TesseraError::InvalidCredentials`] value — callers cannot tell
    /// which check failed. Store failures are the one exception: they
    /// propagate as `Unavailable`.
    pub async fn login(
        &self,
        tenant_id: Uuid,
        username_or_email: &str,
        password: &str,
    ) -> TesseraResult<LoginOutput> {
        // 1. The tenant must exist and be active; an inactive tenant
        //    rejects authentication for all of its users.
        let tenant = match self.tenants.get_by_id(tenant_id).await {
            Ok(t) => t,
            Err(TesseraError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };
        if !tenant.active {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 2. Look up the user — try username first, then email.
        let user = match self.users.get_by_username(tenant_id, username_or_email).await {
            Ok(u) => u,
            Err(TesseraError::NotFound { .. }) => {
                match self.users.get_by_email(tenant_id, username_or_email).await {
                    Ok(u) => u,
                    Err(TesseraError::NotFound { .. }) => {
                        return Err(AuthError::InvalidCredentials.into());
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };

        // 3. Account state and password. Verification always runs to
        //    completion once started.
        if !user.active {
            return Err(AuthError::InvalidCredentials.into());
        }
        if !password::verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 4. Issue the stateless pair.
        let (access_token, expires_at) = self.codec.issue(&user, TokenKind::Access)?;
        let (refresh_token, _) = self.codec.issue(&user, TokenKind::Refresh)?;

        tracing::debug!(%tenant_id, user_id = %user.id, "login succeeded");

        Ok(LoginOutput {
            access_token,
            refresh_token,
            expires_at,
            user,
        })
    }

    /// Change a user's password after re-verifying the current one.
    ///
    /// Never proceeds on a mismatch; the rehash-and-persist is a single
    /// store write, so no intermediate credential state is observable.
    pub async fn change_password(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> TesseraResult<()> {
        let user = self.users.get_by_id(tenant_id, user_id).await?;

        if !password::verify_password(current_password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let new_hash = password::hash_password(new_password, self.config.hash_work_factor)?;
        self.users
            .set_password_hash(tenant_id, user_id, &new_hash)
            .await?;

        tracing::info!(%tenant_id, %user_id, "password changed");
        Ok(())
    }

    /// Exchange a valid refresh token for a new access/refresh pair.
    ///
    /// Purely stateless — no session lookup, no invalidation of the
    /// presented token.
    pub fn refresh(&self, refresh_token: &str) -> TesseraResult<RefreshOutput> {
        let RefreshedTokens {
            access_token,
            refresh_token,
            expires_at,
        } = self.codec.refresh(refresh_token)?;

        Ok(RefreshOutput {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    /// The codec sharing this service's secrets, for wiring the
    /// authorization gate.
    pub fn token_codec(&self) -> TokenCodec {
        self.codec.clone()
    }
}
