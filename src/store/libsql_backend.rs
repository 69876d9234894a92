//! libSQL backend: async `ProjectStore` implementation.
//!
//! Supports local file and in-memory databases. Onboarding documents are
//! stored as JSON text, one row per project.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::onboarding::model::{OnboardingDocument, ProjectMeta};
use crate::store::migrations;
use crate::store::traits::ProjectStore;

const PROJECT_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(backend.conn()).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(backend.conn()).await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Canonical timestamp format. Fixed width with a `Z` suffix so that
/// lexical order in SQL equals chronological order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Map a libsql Row (in `PROJECT_COLUMNS` order) to a ProjectMeta.
fn row_to_project(row: &libsql::Row) -> Result<ProjectMeta, libsql::Error> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let description: String = row.get::<String>(2).unwrap_or_default();
    let created_str: String = row.get(3)?;
    let updated_str: String = row.get(4)?;

    Ok(ProjectMeta {
        id,
        name,
        description,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn document_to_json(document: &OnboardingDocument) -> Result<String, DatabaseError> {
    serde_json::to_string(document).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

#[async_trait]
impl ProjectStore for LibSqlBackend {
    async fn insert_project(
        &self,
        project: &ProjectMeta,
        document: &OnboardingDocument,
    ) -> Result<(), DatabaseError> {
        let document_json = document_to_json(document)?;
        let created = format_datetime(&project.created_at);
        let updated = format_datetime(&project.updated_at);

        // Both rows or neither.
        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_project begin: {e}")))?;

        let inserted = async {
            tx.execute(
                "INSERT INTO projects (id, name, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    project.id.as_str(),
                    project.name.as_str(),
                    project.description.as_str(),
                    created.as_str(),
                    updated.as_str()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_project: {e}")))?;

            tx.execute(
                "INSERT INTO onboarding (project_id, document, status, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    project.id.as_str(),
                    document_json,
                    document.status.to_string(),
                    updated.as_str()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_project onboarding: {e}")))?;
            Ok::<(), DatabaseError>(())
        }
        .await;

        if let Err(e) = inserted {
            let _ = tx.rollback().await;
            return Err(e);
        }
        tx.commit()
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_project commit: {e}")))?;

        debug!(project_id = %project.id, "Project inserted");
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectMeta>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY updated_at DESC, name ASC"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_projects: {e}")))?;

        let mut projects = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_projects: {e}")))?
        {
            match row_to_project(&row) {
                Ok(project) => projects.push(project),
                // Skip broken rows
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable project row"),
            }
        }
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> Result<Option<ProjectMeta>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_project: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_project(&row)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("get_project: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_project: {e}"))),
        }
    }

    async fn update_project(&self, project: &ProjectMeta) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let updated = format_datetime(&project.updated_at);
        conn.execute(
            "UPDATE projects SET name = ?2, description = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                project.id.as_str(),
                project.name.as_str(),
                project.description.as_str(),
                updated
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("update_project: {e}")))?;
        Ok(())
    }

    async fn touch_project(&self, id: &str, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let conn = self.conn();
        conn.execute(
            "UPDATE projects SET updated_at = ?2 WHERE id = ?1",
            params![id, format_datetime(&at)],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("touch_project: {e}")))?;
        Ok(())
    }

    async fn get_document(
        &self,
        project_id: &str,
    ) -> Result<Option<OnboardingDocument>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                "SELECT document FROM onboarding WHERE project_id = ?1",
                params![project_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_document: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let json: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("get_document: {e}")))?;
                let document = serde_json::from_str(&json).unwrap_or_else(|e| {
                    tracing::warn!(
                        project_id,
                        error = %e,
                        "Stored onboarding document is unreadable, starting from empty"
                    );
                    OnboardingDocument::default()
                });
                Ok(Some(document))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_document: {e}"))),
        }
    }

    async fn put_document(
        &self,
        project_id: &str,
        document: &OnboardingDocument,
    ) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let json = document_to_json(document)?;
        let now = format_datetime(&Utc::now());

        conn.execute(
            "INSERT INTO onboarding (project_id, document, status, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (project_id) DO UPDATE SET document = ?2, status = ?3, updated_at = ?4",
            params![project_id, json, document.status.to_string(), now],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("put_document: {e}")))?;

        debug!(project_id, status = %document.status, "Onboarding document stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::{OnboardingStatus, Persona};

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    fn make_project(id: &str, name: &str) -> ProjectMeta {
        let now = Utc::now();
        ProjectMeta {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_get_project() {
        let db = test_db().await;
        let project = make_project("acme-1a2b3c", "Acme");
        db.insert_project(&project, &OnboardingDocument::default())
            .await
            .unwrap();

        let fetched = db.get_project("acme-1a2b3c").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Acme");
        assert_eq!(fetched.description, "");

        let document = db.get_document("acme-1a2b3c").await.unwrap().unwrap();
        assert_eq!(document, OnboardingDocument::default());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let db = test_db().await;
        assert!(db.get_project("nope").await.unwrap().is_none());
        assert!(db.get_document("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let db = test_db().await;
        let project = make_project("dup", "Dup");
        db.insert_project(&project, &OnboardingDocument::default())
            .await
            .unwrap();
        let err = db
            .insert_project(&project, &OnboardingDocument::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Query(_)));
    }

    #[tokio::test]
    async fn failed_document_insert_leaves_no_project() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO onboarding (project_id, document, updated_at) VALUES ('acme-1', '{}', 't')",
                (),
            )
            .await
            .unwrap();

        let result = db
            .insert_project(&make_project("acme-1", "Acme"), &OnboardingDocument::default())
            .await;
        assert!(matches!(result, Err(DatabaseError::Query(_))));
        assert!(db.get_project("acme-1").await.unwrap().is_none());
        assert!(db.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_document_replaces() {
        let db = test_db().await;
        db.insert_project(&make_project("p1", "P1"), &OnboardingDocument::default())
            .await
            .unwrap();

        let mut document = OnboardingDocument::default();
        document.users.personas.push(Persona {
            name: "Alex".to_string(),
        });
        document.status = OnboardingStatus::Committed;
        db.put_document("p1", &document).await.unwrap();

        let fetched = db.get_document("p1").await.unwrap().unwrap();
        assert_eq!(fetched.users.personas.len(), 1);
        assert!(fetched.is_committed());
    }

    #[tokio::test]
    async fn list_orders_by_updated_desc_then_name() {
        let db = test_db().await;
        let base = Utc::now();

        let mut older = make_project("older", "Zeta");
        older.updated_at = base - chrono::Duration::hours(1);
        let mut tie_b = make_project("tie-b", "Beta");
        tie_b.updated_at = base;
        let mut tie_a = make_project("tie-a", "Alpha");
        tie_a.updated_at = base;

        for p in [&older, &tie_b, &tie_a] {
            db.insert_project(p, &OnboardingDocument::default())
                .await
                .unwrap();
        }

        let ids: Vec<String> = db
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["tie-a", "tie-b", "older"]);

        db.touch_project("older", base + chrono::Duration::hours(1))
            .await
            .unwrap();
        let first = db.list_projects().await.unwrap().remove(0);
        assert_eq!(first.id, "older");
    }

    #[tokio::test]
    async fn update_project_overwrites_summary() {
        let db = test_db().await;
        let mut project = make_project("p2", "Draft name");
        db.insert_project(&project, &OnboardingDocument::default())
            .await
            .unwrap();

        project.name = "Final name".to_string();
        project.description = "One line".to_string();
        db.update_project(&project).await.unwrap();

        let fetched = db.get_project("p2").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Final name");
        assert_eq!(fetched.description, "One line");
    }

    #[tokio::test]
    async fn local_database_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("pm.db");

        {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.insert_project(&make_project("keep", "Keep"), &OnboardingDocument::default())
                .await
                .unwrap();
        }

        let db = LibSqlBackend::new_local(&path).await.unwrap();
        assert!(db.get_project("keep").await.unwrap().is_some());
    }

    #[test]
    fn datetime_format_round_trips() {
        let now = Utc::now();
        let parsed = parse_datetime(&format_datetime(&now));
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
        assert_eq!(parse_datetime("garbage"), DateTime::<Utc>::MIN_UTC);
    }
}
