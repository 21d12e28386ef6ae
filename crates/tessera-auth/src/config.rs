//! Authentication configuration.

use std::env;

/// Configuration for the authentication engine.
///
/// Loaded once at startup and shared immutably; this is the only state
/// the token codec and gate carry besides their injected dependencies.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric secret for signing/verifying access tokens.
    pub access_secret: String,
    /// Symmetric secret for refresh tokens. May equal `access_secret`;
    /// the token-type claim still keeps the two kinds apart.
    pub refresh_secret: String,
    /// Access token lifetime in seconds (default: 86_400 = 24 hours).
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_ttl_secs: i64,
    /// JWT issuer (`iss` claim).
    pub issuer: String,
    /// Request header carrying API keys.
    pub api_key_header: String,
    /// Minimum accepted API key length; shorter candidates are rejected
    /// before any store lookup.
    pub min_api_key_length: usize,
    /// Role that passes every role guard (default: `admin`).
    pub super_role: String,
    /// Argon2id iteration count (time cost). Raise as hardware improves.
    pub hash_work_factor: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_secs: 86_400,
            refresh_ttl_secs: 604_800,
            issuer: "tessera".into(),
            api_key_header: "x-api-key".into(),
            min_api_key_length: 32,
            super_role: "admin".into(),
            hash_work_factor: 2,
        }
    }
}

impl AuthConfig {
    /// Load configuration from `TESSERA_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// `TESSERA_REFRESH_SECRET` defaults to the access secret when
    /// absent.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let access_secret = get_env("TESSERA_ACCESS_SECRET", "");
        let refresh_secret = match env::var("TESSERA_REFRESH_SECRET") {
            Ok(v) if !v.is_empty() => v,
            _ => access_secret.clone(),
        };

        Self {
            access_secret,
            refresh_secret,
            access_ttl_secs: get_parsed_env("TESSERA_ACCESS_TTL_SECS", defaults.access_ttl_secs),
            refresh_ttl_secs: get_parsed_env("TESSERA_REFRESH_TTL_SECS", defaults.refresh_ttl_secs),
            issuer: get_env("TESSERA_ISSUER", &defaults.issuer),
            api_key_header: get_env("TESSERA_API_KEY_HEADER", &defaults.api_key_header),
            min_api_key_length: get_parsed_env(
                "TESSERA_MIN_API_KEY_LENGTH",
                defaults.min_api_key_length,
            ),
            super_role: get_env("TESSERA_SUPER_ROLE", &defaults.super_role),
            hash_work_factor: get_parsed_env(
                "TESSERA_HASH_WORK_FACTOR",
                defaults.hash_work_factor,
            ),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

fn get_parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
