//! Password hashing with bcrypt and verification of bcrypt or Argon2
//! hashes.
//!
//! New hashes are always bcrypt. Verification dispatches on the PHC
//! prefix so accounts imported with Argon2id hashes keep working.

use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// bcrypt only reads this many bytes of input; anything longer would be
/// silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a plaintext password with bcrypt at the given work factor.
///
/// The salt is randomly generated for each call. This is deliberately
/// slow; call it from a blocking context.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::Validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    bcrypt::hash(password, cost).map_err(|e| AuthError::Crypto(format!("bcrypt hash: {e}")))
}

/// Verify a plaintext password against a stored bcrypt or Argon2 hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed. The error
/// never echoes the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    if hash.starts_with("$argon2") {
        verify_argon2(password, hash)
    } else if hash.starts_with("$2") {
        // No stored bcrypt hash was made from a longer input.
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        // bcrypt's own error text can contain the hash, so drop it.
        bcrypt::verify(password, hash)
            .map_err(|_| AuthError::Crypto("bcrypt verify: malformed hash".into()))
    } else {
        Err(AuthError::Crypto("unrecognised password hash format".into()))
    }
}

fn verify_argon2(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}
