//! SurrealDB schema migrations and initialization
//!
//! This module sets up every table the service uses, with the unique
//! indexes that back id and alias uniqueness.

use crate::error::StateError;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all tables in SurrealDB
///
/// Called once per connection. Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing validation service schema");

    init_results_table(db).await?;
    init_models_table(db).await?;
    init_tests_table(db).await?;

    info!("Schema initialization complete");
    Ok(())
}

async fn apply(db: &Surreal<Any>, table: &str, sql: &str) -> Result<()> {
    db.query(sql)
        .await
        .and_then(|response| response.check())
        .map_err(|e| StateError::SchemaSetup(format!("{table}: {e}")))?;
    info!("✓ {} table initialized", table);
    Ok(())
}

/// Initialize `results` table
///
/// Schema:
/// ```text
/// TABLE results {
///   result_id:         STRING (unique)
///   model_version_id:  STRING (indexed)
///   test_code_id:      STRING (indexed)
///   timestamp:         DATETIME (indexed, listing order)
///   score:             FLOAT
///   normalized_score:  FLOAT?
///   passed:            BOOL?
///   results_storage:   ARRAY<STRING>
/// }
/// ```
async fn init_results_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing results table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS results SCHEMALESS;

        DEFINE INDEX IF NOT EXISTS idx_result_id ON TABLE results COLUMNS result_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_model_version_id ON TABLE results COLUMNS model_version_id;
        DEFINE INDEX IF NOT EXISTS idx_test_code_id ON TABLE results COLUMNS test_code_id;
        DEFINE INDEX IF NOT EXISTS idx_timestamp ON TABLE results COLUMNS timestamp;
    "#;

    apply(db, "results", sql).await
}

/// Initialize `models` table
///
/// Instances are embedded as an array of objects keyed by `instance_id`.
/// `alias_key` is the alias, or the project id for unaliased projects, so
/// its unique index rejects a duplicate alias even when two creates race.
async fn init_models_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing models table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS models SCHEMALESS;

        DEFINE INDEX IF NOT EXISTS idx_model_project_id ON TABLE models COLUMNS project_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_model_alias ON TABLE models COLUMNS alias;
        DEFINE INDEX IF NOT EXISTS idx_model_alias_key ON TABLE models COLUMNS alias_key UNIQUE;
    "#;

    apply(db, "models", sql).await
}

/// Initialize `tests` table
async fn init_tests_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing tests table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS tests SCHEMALESS;

        DEFINE INDEX IF NOT EXISTS idx_test_project_id ON TABLE tests COLUMNS project_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_test_alias ON TABLE tests COLUMNS alias;
        DEFINE INDEX IF NOT EXISTS idx_test_alias_key ON TABLE tests COLUMNS alias_key UNIQUE;
    "#;

    apply(db, "tests", sql).await
}
