//! JWT access/refresh token issuance, verification, and refresh.
//!
//! Tokens are stateless: every claim needed to reconstruct the
//! principal travels inside the signed payload and nothing is persisted
//! server-side. The signing algorithm is pinned to HS256 — a token
//! whose header asserts anything else fails verification outright.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tessera_core::models::user::User;

use crate::config::AuthConfig;
use crate::error::{AuthError, TokenError};

/// The two token kinds. The kind is part of the trust boundary: it is
/// carried as a claim and checked on verification, so an access-typed
/// secret never validates a token presented as a refresh token even
/// when both kinds share one secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID (UUID string).
    pub user_id: String,
    /// Tenant ID (UUID string).
    pub tenant_id: String,
    pub username: String,
    pub email: String,
    /// Legacy single-string role label.
    pub role: String,
    /// Access or refresh; verified against the expected kind.
    pub token_type: TokenKind,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
}

/// A freshly rotated token pair.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the new access token.
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies access/refresh tokens.
///
/// Holds the per-deployment symmetric secrets; constructed once at
/// startup and shared immutably.
#[derive(Clone)]
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    issuer: String,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
            issuer: config.issuer.clone(),
        }
    }

    /// Issue a signed token of the given kind for a user. Returns the
    /// compact token string and its expiry.
    pub fn issue(
        &self,
        user: &User,
        kind: TokenKind,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        self.sign(
            user.id.to_string(),
            user.tenant_id.to_string(),
            user.username.clone(),
            user.email.clone(),
            user.role.clone(),
            kind,
        )
    }

    /// Verify a token of the expected kind and return its claims.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let key = match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };

        // Pinning the algorithm here is what rejects downgrade attempts:
        // a header asserting anything but HS256 fails before signature
        // evaluation.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        let claims = jsonwebtoken::decode::<TokenClaims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::BadSignature,
            })?;

        if claims.token_type != kind {
            return Err(TokenError::WrongType);
        }

        Ok(claims)
    }

    /// Validate a refresh token and reissue a full token pair carrying
    /// the same identity claims.
    ///
    /// No server-side state is consulted or written: the presented
    /// refresh token stays valid until its own expiry, and replaying it
    /// yields further independent pairs.
    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, AuthError> {
        let claims = self.verify(refresh_token, TokenKind::Refresh)?;

        let (access_token, expires_at) = self.sign(
            claims.user_id.clone(),
            claims.tenant_id.clone(),
            claims.username.clone(),
            claims.email.clone(),
            claims.role.clone(),
            TokenKind::Access,
        )?;
        let (refresh_token, _) = self.sign(
            claims.user_id,
            claims.tenant_id,
            claims.username,
            claims.email,
            claims.role,
            TokenKind::Refresh,
        )?;

        Ok(RefreshedTokens {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    fn sign(
        &self,
        user_id: String,
        tenant_id: String,
        username: String,
        email: String,
        role: String,
        kind: TokenKind,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let (key, ttl) = match kind {
            TokenKind::Access => (&self.access_encoding, self.access_ttl_secs),
            TokenKind::Refresh => (&self.refresh_encoding, self.refresh_ttl_secs),
        };

        let now = Utc::now();
        let expires_at = now + Duration::seconds(ttl);

        let claims = TokenClaims {
            user_id,
            tenant_id,
            username,
            email,
            role,
            token_type: kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))?;

        Ok((token, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            role: "viewer".into(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Distinct access and refresh secrets.
    fn split_config() -> AuthConfig {
        AuthConfig {
            access_secret: "access-secret-for-testing-0123456789".into(),
            refresh_secret: "refresh-secret-for-testing-0123456789".into(),
            ..Default::default()
        }
    }

    /// One secret shared by both kinds.
    fn shared_config() -> AuthConfig {
        AuthConfig {
            access_secret: "shared-secret-for-testing-0123456789".into(),
            refresh_secret: "shared-secret-for-testing-0123456789".into(),
            ..Default::default()
        }
    }

    #[test]
    fn roundtrip_access_token() {
        let codec = TokenCodec::new(&split_config());
        let user = test_user();

        let (token, expires_at) = codec.issue(&user, TokenKind::Access).unwrap();
        let claims = codec.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id, user.id.to_string());
        assert_eq!(claims.tenant_id, user.tenant_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "viewer");
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.iss, "tessera");
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn wrong_secret_rejected() {
        let codec1 = TokenCodec::new(&split_config());
        let other = AuthConfig {
            access_secret: "a-completely-different-secret-value".into(),
            refresh_secret: "another-completely-different-value".into(),
            ..Default::default()
        };
        let codec2 = TokenCodec::new(&other);

        let (token, _) = codec1.issue(&test_user(), TokenKind::Access).unwrap();
        let err = codec2.verify(&token, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::BadSignature);
    }

    #[test]
    fn expired_token_rejected() {
        let config = AuthConfig {
            access_ttl_secs: -3600,
            ..split_config()
        };
        let codec = TokenCodec::new(&config);

        let (token, _) = codec.issue(&test_user(), TokenKind::Access).unwrap();
        let err = codec.verify(&token, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn kind_mismatch_under_shared_secret_is_wrong_type() {
        let codec = TokenCodec::new(&shared_config());
        let user = test_user();

        let (refresh, _) = codec.issue(&user, TokenKind::Refresh).unwrap();
        let err = codec.verify(&refresh, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::WrongType);

        let (access, _) = codec.issue(&user, TokenKind::Access).unwrap();
        let err = codec.verify(&access, TokenKind::Refresh).unwrap_err();
        assert_eq!(err, TokenError::WrongType);
    }

    #[test]
    fn kind_mismatch_under_split_secrets_fails_signature() {
        let codec = TokenCodec::new(&split_config());

        let (refresh, _) = codec.issue(&test_user(), TokenKind::Refresh).unwrap();
        let err = codec.verify(&refresh, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::BadSignature);
    }

    #[test]
    fn tampered_token_rejected() {
        let codec = TokenCodec::new(&split_config());
        let (token, _) = codec.issue(&test_user(), TokenKind::Access).unwrap();

        let tampered = format!("{token}x");
        let err = codec.verify(&tampered, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::BadSignature);
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = TokenCodec::new(&split_config());
        let err = codec.verify("not.a.token", TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::Malformed);
    }

    #[test]
    fn asserted_foreign_algorithm_rejected() {
        let config = shared_config();
        let codec = TokenCodec::new(&config);
        let user = test_user();

        // Sign a structurally valid token with HS512 and the correct
        // secret; the codec must still refuse it.
        let now = Utc::now();
        let claims = TokenClaims {
            user_id: user.id.to_string(),
            tenant_id: user.tenant_id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            token_type: TokenKind::Access,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            iss: "tessera".into(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.access_secret.as_bytes()),
        )
        .unwrap();

        let err = codec.verify(&token, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::BadSignature);
    }

    #[test]
    fn refresh_reissues_pair_with_same_identity() {
        let codec = TokenCodec::new(&split_config());
        let user = test_user();

        let (refresh_token, _) = codec.issue(&user, TokenKind::Refresh).unwrap();
        let rotated = codec.refresh(&refresh_token).unwrap();

        let access_claims = codec
            .verify(&rotated.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(access_claims.user_id, user.id.to_string());
        assert_eq!(access_claims.tenant_id, user.tenant_id.to_string());
        assert_eq!(access_claims.role, "viewer");

        let refresh_claims = codec
            .verify(&rotated.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert_eq!(refresh_claims.user_id, user.id.to_string());
    }

    #[test]
    fn refresh_rejects_access_token() {
        let codec = TokenCodec::new(&shared_config());
        let (access, _) = codec.issue(&test_user(), TokenKind::Access).unwrap();

        let err = codec.refresh(&access).unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::WrongType)));
    }

    #[test]
    fn replayed_refresh_token_stays_valid() {
        // No server-side state: both uses of the same refresh token
        // succeed and produce independent pairs.
        let codec = TokenCodec::new(&split_config());
        let (refresh_token, _) = codec.issue(&test_user(), TokenKind::Refresh).unwrap();

        let first = codec.refresh(&refresh_token).unwrap();
        let second = codec.refresh(&refresh_token).unwrap();
        assert!(!first.access_token.is_empty());
        assert!(!second.access_token.is_empty());
    }
}
