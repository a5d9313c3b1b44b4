//! Authentication service — registration, login, token validation and
//! account maintenance.

use std::fmt;
use std::sync::OnceLock;

use taskman_core::models::account::{AccountProfile, CreateAccount, Role, UpdateAccount};
use taskman_core::repository::AccountRepository;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::token::{self, SessionClaims};

/// Hash checked against when the email is unknown, so a miss costs
/// about as much as a wrong password.
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Input for the registration flow.
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Defaults to [`Role::Member`].
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

impl fmt::Debug for RegisterInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Partial account update. A new password is hashed before it reaches
/// the store.
#[derive(Default)]
pub struct UpdateAccountInput {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub phone: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub bio: Option<Option<String>>,
}

impl fmt::Debug for UpdateAccountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateAccountInput")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed session token; the client resends it as a bearer credential.
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub account: AccountProfile,
}

/// Authentication service.
///
/// Generic over the account store so that the auth layer has no
/// dependency on the database crate. Holds nothing mutable: the signing
/// secret and lifetimes are fixed at construction.
pub struct AuthService<A: AccountRepository> {
    accounts: A,
    config: AuthConfig,
}

impl<A: AccountRepository> AuthService<A> {
    pub fn new(accounts: A, config: AuthConfig) -> Self {
        Self { accounts, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an account with a freshly hashed password.
    pub async fn register(&self, input: RegisterInput) -> AuthResult<AccountProfile> {
        validate_email(&input.email)?;
        validate_name(&input.name)?;
        self.check_password_policy(&input.password)?;

        // The store's unique index is the real guard; this check only
        // spares a hash computation in the common case.
        if self.accounts.find_by_email(&input.email).await?.is_some() {
            debug!("Registration rejected: email already bound");
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = self.hash(&input.password).await?;
        let account = self
            .accounts
            .create(CreateAccount {
                email: input.email,
                name: input.name.trim().to_string(),
                password_hash,
                role: input.role.unwrap_or_default(),
                phone: input.phone,
                location: input.location,
                bio: input.bio,
            })
            .await?;

        info!(account_id = %account.id, role = %account.role, "Account registered");
        Ok(account.into())
    }

    /// Exchange email + password for a session token.
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<LoginOutput> {
        // 1. Look up the active account.
        let Some(account) = self.accounts.find_by_email(email).await? else {
            self.burn_verification(password).await;
            warn!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        // 2. Verify password.
        if !self.verify(password, &account.password_hash).await? {
            warn!(account_id = %account.id, "Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        // 3. Issue the session token.
        let access_token =
            token::issue_session_token(account.id, &account.email, account.role, &self.config)?;

        info!(account_id = %account.id, "Login succeeded");
        Ok(LoginOutput {
            access_token,
            expires_in: self.config.token_lifetime_secs,
            account: account.into(),
        })
    }

    /// Turn a presented token back into a trusted claim.
    ///
    /// Besides signature and expiry, the subject must still resolve to
    /// an active account whose email and role match the token, so a
    /// deletion or role change takes effect before the token expires.
    pub async fn validate(&self, token: &str) -> AuthResult<SessionClaims> {
        let claims = token::decode_session_token(token, &self.config)?;
        let account_id = claims.subject_id()?;

        let Some(account) = self.accounts.find_by_id(account_id).await? else {
            debug!(%account_id, "Token rejected: subject no longer resolvable");
            return Err(AuthError::InvalidToken("subject no longer resolvable".into()));
        };

        if account.role != claims.role || account.email != claims.email {
            debug!(%account_id, "Token rejected: account changed since issuance");
            return Err(AuthError::InvalidToken("account changed since issuance".into()));
        }

        Ok(claims)
    }

    pub async fn get_account(&self, id: Uuid) -> AuthResult<AccountProfile> {
        self.accounts
            .find_by_id(id)
            .await?
            .map(AccountProfile::from)
            .ok_or(AuthError::AccountNotFound)
    }

    /// Active account bound to `email`, matched exactly.
    pub async fn find_account_by_email(&self, email: &str) -> AuthResult<Option<AccountProfile>> {
        Ok(self
            .accounts
            .find_by_email(email)
            .await?
            .map(AccountProfile::from))
    }

    /// All active accounts.
    pub async fn list_accounts(&self) -> AuthResult<Vec<AccountProfile>> {
        let accounts = self.accounts.list_active().await?;
        Ok(accounts.into_iter().map(AccountProfile::from).collect())
    }

    /// Apply a profile or administrative update.
    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> AuthResult<AccountProfile> {
        let current = self
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let mut update = UpdateAccount {
            role: input.role,
            phone: input.phone,
            location: input.location,
            bio: input.bio,
            ..Default::default()
        };

        if let Some(email) = input.email.filter(|e| *e != current.email) {
            validate_email(&email)?;
            if let Some(other) = self.accounts.find_by_email(&email).await? {
                if other.id != id {
                    return Err(AuthError::DuplicateAccount);
                }
            }
            update.email = Some(email);
        }

        if let Some(name) = input.name {
            validate_name(&name)?;
            update.name = Some(name.trim().to_string());
        }

        if let Some(new_password) = input.password {
            self.check_password_policy(&new_password)?;
            update.password_hash = Some(self.hash(&new_password).await?);
        }

        if update.is_empty() {
            return Ok(current.into());
        }

        let password_changed = update.password_hash.is_some();
        let updated = self
            .accounts
            .update(id, update)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        info!(account_id = %id, password_changed, "Account updated");
        Ok(updated.into())
    }

    /// Soft-delete an account. Its outstanding tokens stop validating.
    pub async fn remove_account(&self, id: Uuid) -> AuthResult<()> {
        if self.accounts.find_by_id(id).await?.is_none() {
            return Err(AuthError::AccountNotFound);
        }
        self.accounts.soft_delete(id).await?;
        info!(account_id = %id, "Account soft-deleted");
        Ok(())
    }

    fn check_password_policy(&self, password: &str) -> AuthResult<()> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::Validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        if password.len() > password::MAX_PASSWORD_BYTES {
            return Err(AuthError::Validation(format!(
                "password must be at most {} bytes",
                password::MAX_PASSWORD_BYTES
            )));
        }
        Ok(())
    }

    async fn hash(&self, plaintext: &str) -> AuthResult<String> {
        let plaintext = plaintext.to_owned();
        let cost = self.config.bcrypt_cost;
        tokio::task::spawn_blocking(move || password::hash_password(&plaintext, cost))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
    }

    async fn verify(&self, plaintext: &str, hash: &str) -> AuthResult<bool> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))?
    }

    async fn burn_verification(&self, plaintext: &str) {
        let plaintext = plaintext.to_owned();
        let cost = self.config.bcrypt_cost;
        let _ = tokio::task::spawn_blocking(move || {
            let hash = DUMMY_HASH.get_or_init(|| {
                password::hash_password("taskman-unknown-account", cost).unwrap_or_default()
            });
            let _ = password::verify_password(&plaintext, hash);
        })
        .await;
    }
}

/// Syntactic email check: `local@domain.tld` with no whitespace.
pub fn validate_email(email: &str) -> AuthResult<()> {
    let invalid = || AuthError::Validation("email must be a valid address".into());

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

fn validate_name(name: &str) -> AuthResult<()> {
    if name.trim().is_empty() {
        return Err(AuthError::Validation("name must not be empty".into()));
    }
    Ok(())
}
