//! Password hashing and verification using Argon2id.
//!
//! The salt is randomly generated per hash and embedded in the
//! PHC-format output. Memory cost follows the OWASP recommendation
//! (19 MiB); the iteration count is the tunable work factor from
//! [`crate::config::AuthConfig`].

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// Argon2id memory cost in KiB (19 MiB, OWASP ASVS recommended).
const MEMORY_COST_KIB: u32 = 19_456;

fn argon2(work_factor: u32) -> Result<Argon2<'static>, AuthError> {
    let params = argon2::Params::new(MEMORY_COST_KIB, work_factor, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a password with Argon2id at the given work factor (iteration
/// count). The salt is freshly generated for each call, so hashing the
/// same password twice yields different outputs.
pub fn hash_password(password: &str, work_factor: u32) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2(work_factor)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Fails closed: a malformed stored hash is treated as a non-match,
/// never surfaced as an error that could bypass the check. The
/// plaintext is never logged or returned.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match argon2::PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => {
            tracing::warn!("stored password hash is malformed; treating as non-match");
            return false;
        }
    };

    // Verification parameters come from the stored hash itself, so a
    // work-factor bump only affects newly hashed passwords.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter2", 2).unwrap();
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter2", 2).unwrap();
        assert!(!verify_password("hunter2x", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        // Per-call random salt.
        let h1 = hash_password("hunter2", 2).unwrap();
        let h2 = hash_password("hunter2", 2).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("pw", "not-a-hash"));
        assert!(!verify_password("pw", ""));
    }

    #[test]
    fn work_factor_is_embedded_in_hash() {
        let hash = hash_password("pw", 3).unwrap();
        assert!(hash.contains("t=3"), "hash should carry its params: {hash}");
        // Still verifiable without knowing the original work factor.
        assert!(verify_password("pw", &hash));
    }
}
