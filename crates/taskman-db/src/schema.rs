//! Versioned SurrealDB schema for accounts and tasks.
//!
//! Tables are SCHEMAFULL. Ids and foreign keys are UUID strings, enum
//! columns are strings guarded by `ASSERT`.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "accounts_and_tasks",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — accounts and tasks
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Accounts
-- =======================================================================
-- email_key mirrors email while the account is active and holds a
-- per-row tombstone once it is soft-deleted, so the unique index only
-- constrains active accounts.
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD email ON TABLE account TYPE string;
DEFINE FIELD email_key ON TABLE account TYPE string;
DEFINE FIELD name ON TABLE account TYPE string;
DEFINE FIELD password_hash ON TABLE account TYPE string;
DEFINE FIELD role ON TABLE account TYPE string \
    ASSERT $value IN ['member', 'admin'];
DEFINE FIELD phone ON TABLE account TYPE option<string>;
DEFINE FIELD location ON TABLE account TYPE option<string>;
DEFINE FIELD bio ON TABLE account TYPE option<string>;
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE account TYPE option<datetime>;
DEFINE INDEX idx_account_email_key ON TABLE account \
    COLUMNS email_key UNIQUE;
DEFINE INDEX idx_account_email ON TABLE account COLUMNS email;

-- =======================================================================
-- Tasks
-- =======================================================================
DEFINE TABLE task SCHEMAFULL;
DEFINE FIELD title ON TABLE task TYPE string;
DEFINE FIELD description ON TABLE task TYPE option<string>;
DEFINE FIELD status ON TABLE task TYPE string \
    ASSERT $value IN ['pending', 'in_progress', 'completed', 'cancelled'];
DEFINE FIELD priority ON TABLE task TYPE string \
    ASSERT $value IN ['low', 'medium', 'high', 'urgent'];
DEFINE FIELD due_date ON TABLE task TYPE option<datetime>;
DEFINE FIELD assignee_id ON TABLE task TYPE option<string>;
DEFINE FIELD owner_id ON TABLE task TYPE string;
DEFINE FIELD created_at ON TABLE task TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE task TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE task TYPE option<datetime>;
DEFINE INDEX idx_task_owner ON TABLE task COLUMNS owner_id;
";

// -----------------------------------------------------------------------
// Runner
// -----------------------------------------------------------------------

/// Bring `db` up to the newest schema version.
///
/// Each migration runs at most once; the `_migration` table records
/// which versions a database already holds, so repeated calls are
/// no-ops.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("tracking table: {e}")))?;

    let applied = applied_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > applied).collect();
    if pending.is_empty() {
        debug!(version = applied, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        apply(db, migration).await?;
    }
    Ok(())
}

/// Highest recorded version, or 0 on a fresh database.
async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut response = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let latest: Vec<MigrationRecord> = response.take(0)?;
    Ok(latest.into_iter().next().map_or(0, |m| m.version))
}

/// Run one migration's DDL and record it.
async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    let failed = |stage: &str, e: surrealdb::Error| {
        DbError::Migration(format!(
            "v{} ({}) {stage}: {e}",
            migration.version, migration.name
        ))
    };

    db.query(migration.sql)
        .await?
        .check()
        .map_err(|e| failed("ddl", e))?;

    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| failed("record", e))?;

    info!(
        version = migration.version,
        name = migration.name,
        "Schema migrated"
    );
    Ok(())
}

/// DDL of the first schema version, for inspection and tooling.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_both_tables() {
        assert!(SCHEMA_V1.contains("DEFINE TABLE account"));
        assert!(SCHEMA_V1.contains("DEFINE TABLE task"));
        assert!(SCHEMA_V1.contains("COLUMNS email_key UNIQUE"));
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
