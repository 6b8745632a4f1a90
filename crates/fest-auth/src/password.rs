//! Password digests and random tokens.
//!
//! The digest is a single salted SHA-256 pass. It backs the local
//! stand-in for an external identity provider and is too fast to be a
//! general-purpose password hash; do not reuse it outside
//! [`LocalAuthProvider`](crate::provider::LocalAuthProvider).

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{AuthError, AuthResult};

pub const MIN_PASSWORD_LEN: usize = 6;

/// `n` random bytes, hex encoded.
pub fn random_hex(n: usize) -> AuthResult<String> {
    let mut buf = vec![0u8; n];
    getrandom::getrandom(&mut buf).map_err(|e| AuthError::Internal(format!("getrandom failed: {e}")))?;
    Ok(hex::encode(buf))
}

/// Hex SHA-256 of `salt || password`.
pub fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a candidate password against a stored digest without
/// short-circuiting on the first differing byte.
pub fn verify(salt: &str, password: &str, expected_digest: &str) -> bool {
    let actual = digest(salt, password);
    actual.as_bytes().ct_eq(expected_digest.as_bytes()).into()
}

pub fn check_strength(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

pub fn check_email(email: &str) -> AuthResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AuthError::InvalidEmail);
    }
    Ok(())
}
