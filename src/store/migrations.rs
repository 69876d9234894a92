//! Schema versions for the project store.
//!
//! Versions are recorded in `_migrations`. On open, every step above the
//! recorded maximum is applied in order, each inside its own transaction
//! together with its version row.

use libsql::Connection;

use crate::error::DatabaseError;

struct SchemaStep {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Append only.
const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "projects_and_documents",
        sql: "
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_projects_updated_at ON projects(updated_at);

            CREATE TABLE IF NOT EXISTS onboarding (
                project_id TEXT PRIMARY KEY REFERENCES projects(id) ON DELETE CASCADE,
                document TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        ",
    },
    SchemaStep {
        version: 2,
        name: "onboarding_status",
        sql: "
            ALTER TABLE onboarding ADD COLUMN status TEXT NOT NULL DEFAULT 'draft';
            CREATE INDEX IF NOT EXISTS idx_onboarding_status ON onboarding(status);
        ",
    },
];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    STEPS.last().map_or(0, |s| s.version)
}

/// Bring the schema up to `latest_version()`.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("creating _migrations: {e}")))?;

    let applied = schema_version(conn).await?;
    let pending: Vec<&SchemaStep> = STEPS.iter().filter(|s| s.version > applied).collect();
    if pending.is_empty() {
        tracing::debug!(version = applied, "Schema up to date");
        return Ok(());
    }

    for step in pending {
        tracing::info!(version = step.version, name = step.name, "Applying schema step");
        let batch = format!(
            "BEGIN;\n{}\nINSERT INTO _migrations (version, name) VALUES ({}, '{}');\nCOMMIT;",
            step.sql, step.version, step.name
        );
        if let Err(e) = conn.execute_batch(&batch).await {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(DatabaseError::Migration(format!(
                "V{} {}: {e}",
                step.version, step.name
            )));
        }
    }

    tracing::info!(version = latest_version(), "Schema migrated");
    Ok(())
}

/// Highest recorded version, 0 for a fresh database.
pub async fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("reading schema version: {e}")))?;

    let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("reading schema version: {e}")))?
    else {
        return Ok(0);
    };
    row.get::<i64>(0)
        .map_err(|e| DatabaseError::Migration(format!("parsing schema version: {e}")))
}
