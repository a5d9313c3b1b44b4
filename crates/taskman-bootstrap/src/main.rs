//! Taskman bootstrap: connect to the store, apply migrations and seed
//! the first administrator.

mod config;

use std::process::ExitCode;

use taskman_auth::{AuthError, AuthService, RegisterInput};
use taskman_core::models::account::{AccountProfile, Role};
use taskman_core::repository::AccountRepository;
use taskman_db::{DbManager, SurrealAccountRepository};
use tracing::{error, info, warn};
use uuid::Uuid;
use tracing_subscriber::EnvFilter;

use crate::config::{AdminSeed, Config};

#[derive(Debug, thiserror::Error)]
enum BootstrapError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Db(#[from] taskman_db::DbError),

    #[error("seed email {email} belongs to an existing {role} account")]
    SeedConflict { email: String, role: Role },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskman=info")),
        )
        .json()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Bootstrap failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BootstrapError> {
    let config = Config::from_env()?;
    config.auth.validate()?;

    let db = DbManager::connect(&config.db).await?;
    db.migrate().await?;

    if let Some(seed) = config.admin {
        let auth = AuthService::new(SurrealAccountRepository::new(db.client().clone()), config.auth);
        seed_admin(&auth, seed).await?;
    }

    info!("Bootstrap complete");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum SeedOutcome {
    Created(Uuid),
    AlreadyPresent(Uuid),
}

/// Create the administrator account unless an administrator already
/// holds the email. A member holding it is an error: the seed would
/// otherwise report success while no administrator exists.
async fn seed_admin<A: AccountRepository>(
    auth: &AuthService<A>,
    seed: AdminSeed,
) -> Result<SeedOutcome, BootstrapError> {
    if let Some(existing) = auth.find_account_by_email(&seed.email).await? {
        return existing_admin(existing);
    }

    let email = seed.email.clone();
    let registered = auth
        .register(RegisterInput {
            email: seed.email,
            password: seed.password,
            name: seed.name,
            role: Some(Role::Admin),
            phone: None,
            location: None,
            bio: None,
        })
        .await;

    match registered {
        Ok(profile) => {
            info!(account_id = %profile.id, "Administrator created");
            Ok(SeedOutcome::Created(profile.id))
        }
        // Lost a race with another writer; judge whoever won.
        Err(AuthError::DuplicateAccount) => match auth.find_account_by_email(&email).await? {
            Some(existing) => existing_admin(existing),
            None => Err(AuthError::DuplicateAccount.into()),
        },
        Err(e) => Err(e.into()),
    }
}

fn existing_admin(profile: AccountProfile) -> Result<SeedOutcome, BootstrapError> {
    if profile.role != Role::Admin {
        warn!(account_id = %profile.id, role = %profile.role, "Seed email held by a non-admin");
        return Err(BootstrapError::SeedConflict {
            email: profile.email,
            role: profile.role,
        });
    }
    info!(account_id = %profile.id, "Administrator already present, skipping");
    Ok(SeedOutcome::AlreadyPresent(profile.id))
}
