//! Authentication configuration.

use crate::error::AuthError;

/// Work factors accepted by bcrypt.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Longest session lifetime accepted: one year.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration for the authentication service.
///
/// Built once at start-up and injected into [`crate::AuthService`];
/// nothing in this crate reads configuration from the environment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify HS256 session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in seconds (default: 86_400 = 24 hours).
    pub token_lifetime_secs: u64,
    /// bcrypt work factor for newly hashed passwords (default: 10).
    pub bcrypt_cost: u32,
    /// Minimum password length for policy enforcement (default: 6).
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_lifetime_secs: 86_400,
            bcrypt_cost: 10,
            min_password_length: 6,
        }
    }
}

impl AuthConfig {
    /// Reject configurations that cannot sign tokens or hash passwords.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.is_empty() {
            return Err(AuthError::Validation("JWT secret must not be empty".into()));
        }
        if self.token_lifetime_secs == 0 {
            return Err(AuthError::Validation(
                "token lifetime must be positive".into(),
            ));
        }
        if self.token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(AuthError::Validation(format!(
                "token lifetime must not exceed {MAX_TOKEN_LIFETIME_SECS} seconds"
            )));
        }
        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(AuthError::Validation(format!(
                "bcrypt cost must be between {} and {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end()
            )));
        }
        Ok(())
    }
}
