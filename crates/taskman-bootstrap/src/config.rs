//! Process configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured. Parsing goes
//! through a lookup function so tests never touch the real environment.

use std::env;
use std::str::FromStr;

use taskman_auth::AuthConfig;
use taskman_db::DbConfig;

/// Credentials for the administrator created on first start.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub db: DbConfig,
    /// Present only when both admin email and password are set.
    pub admin: Option<AdminSeed>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} is set but {1} is not")]
    Incomplete(&'static str, &'static str),
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_defaults = AuthConfig::default();
        let db_defaults = DbConfig::default();

        let jwt_secret = lookup("TASKMAN_JWT_SECRET")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("TASKMAN_JWT_SECRET"))?;

        let auth = AuthConfig {
            jwt_secret,
            token_lifetime_secs: parsed(
                &lookup,
                "TASKMAN_TOKEN_LIFETIME_SECS",
                auth_defaults.token_lifetime_secs,
            )?,
            bcrypt_cost: parsed(&lookup, "TASKMAN_BCRYPT_COST", auth_defaults.bcrypt_cost)?,
            min_password_length: parsed(
                &lookup,
                "TASKMAN_MIN_PASSWORD_LENGTH",
                auth_defaults.min_password_length,
            )?,
        };

        let db = DbConfig {
            url: lookup("TASKMAN_DB_URL").unwrap_or(db_defaults.url),
            namespace: lookup("TASKMAN_DB_NS").unwrap_or(db_defaults.namespace),
            database: lookup("TASKMAN_DB_DB").unwrap_or(db_defaults.database),
            username: lookup("TASKMAN_DB_USER").unwrap_or(db_defaults.username),
            password: lookup("TASKMAN_DB_PASS").unwrap_or(db_defaults.password),
        };

        let admin = match (
            lookup("TASKMAN_ADMIN_EMAIL"),
            lookup("TASKMAN_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                password,
                name: lookup("TASKMAN_ADMIN_NAME").unwrap_or_else(|| "Administrator".into()),
            }),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete(
                    "TASKMAN_ADMIN_EMAIL",
                    "TASKMAN_ADMIN_PASSWORD",
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete(
                    "TASKMAN_ADMIN_PASSWORD",
                    "TASKMAN_ADMIN_EMAIL",
                ));
            }
            (None, None) => None,
        };

        Ok(Self { auth, db, admin })
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
