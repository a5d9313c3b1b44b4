//! Taskman Database — SurrealDB connection management, schema
//! migrations and the account/task store adapters.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations for the `taskman-core` traits
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{SurrealAccountRepository, SurrealTaskRepository};
pub use schema::{run_migrations, schema_v1};
