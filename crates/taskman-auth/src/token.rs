//! HS256 session token issuance and verification.
//!
//! Tokens are compact JWTs (`header.payload.signature`) signed with the
//! process-wide secret from [`AuthConfig`]. Expiry is checked here with
//! no leeway: a token is dead from the second named in `exp` onwards.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use taskman_core::models::account::Role;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — account ID (UUID string).
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// Parse the subject back into an account ID.
    pub fn subject_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::InvalidToken("subject is not an account id".into()))
    }
}

/// Issue a session token for an account, stamped with the current time.
pub fn issue_session_token(
    account_id: Uuid,
    email: &str,
    role: Role,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    issue_session_token_at(account_id, email, role, config, Utc::now().timestamp())
}

/// Issue a session token as if the current time were `now`.
pub fn issue_session_token_at(
    account_id: Uuid,
    email: &str,
    role: Role,
    config: &AuthConfig,
    now: i64,
) -> Result<String, AuthError> {
    let lifetime = i64::try_from(config.token_lifetime_secs)
        .map_err(|_| AuthError::Validation("token lifetime out of range".into()))?;
    let claims = SessionClaims {
        sub: account_id.to_string(),
        email: email.to_string(),
        role,
        iat: now,
        exp: now
            .checked_add(lifetime)
            .ok_or_else(|| AuthError::Validation("token expiry out of range".into()))?,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Verify signature and expiry of a session token.
///
/// Purely stateless; the service layer additionally re-resolves the
/// subject against the store.
pub fn decode_session_token(token: &str, config: &AuthConfig) -> Result<SessionClaims, AuthError> {
    decode_session_token_at(token, config, Utc::now().timestamp())
}

/// Verify a session token as if the current time were `now`.
pub fn decode_session_token_at(
    token: &str,
    config: &AuthConfig,
    now: i64,
) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is enforced below against `now` with an exclusive bound.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["sub", "exp", "iat"]);

    let claims = jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    if now >= claims.exp {
        return Err(AuthError::InvalidToken("token has expired".into()));
    }

    Ok(claims)
}

/// Extract the token from an `Authorization` header value of the form
/// `Bearer <token>`.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
