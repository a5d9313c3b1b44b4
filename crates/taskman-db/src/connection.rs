//! Remote SurrealDB connection for the deployed store.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::{debug, info};

use crate::error::DbError;
use crate::schema::run_migrations;

/// Where the store lives and how to sign in to it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `host:port` of the WebSocket endpoint.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials; the store is shared by a single service.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "taskman".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Owns the signed-in client that the repositories clone from.
#[derive(Clone)]
pub struct DbManager {
    client: Surreal<Client>,
}

impl DbManager {
    /// Open the WebSocket, sign in as root and select the configured
    /// namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let client = Surreal::new::<Ws>(config.url.as_str()).await?;
        debug!(url = %config.url, "Store endpoint reachable");

        client
            .signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;
        client
            .use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        info!(
            url = %config.url,
            ns = %config.namespace,
            db = %config.database,
            "Store connected"
        );
        Ok(Self { client })
    }

    /// Bring the schema up to date. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.client).await
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_the_local_taskman_namespace() {
        let config = DbConfig::default();
        assert_eq!(config.namespace, "taskman");
        assert_eq!(config.database, "main");
        assert_eq!(config.url, "127.0.0.1:8000");
    }
}
