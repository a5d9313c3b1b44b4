//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct AppliedMigration {
    version: u32,
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    taskman_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("account"), "missing account table");
    assert!(info_str.contains("task"), "missing task table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    taskman_db::run_migrations(&db).await.unwrap();
    // Second run must skip already-applied versions.
    taskman_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT version FROM _migration").await.unwrap();
    let applied: Vec<AppliedMigration> = result.take(0).unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].version, 1);
}

#[tokio::test]
async fn schema_rejects_unknown_role() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    taskman_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE account SET email = 'x@example.com', \
             email_key = 'x@example.com', name = 'X', \
             password_hash = 'h', role = 'superuser'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "role outside member/admin must be rejected");
}
