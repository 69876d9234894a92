//! OnboardingManager: project creation, draft saves, and commit on top of a
//! `ProjectStore`.

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::store::ProjectStore;

use super::derived::compute_derived;
use super::merge::{deep_merge, strip_server_owned};
use super::model::{OnboardingDocument, OnboardingStatus, ProjectMeta};

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\-\s]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

fn short_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..6].to_string()
}

/// Lowercase, strip punctuation, and dash-join a project name.
pub fn slugify(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lower, "");
    let dashed = WHITESPACE.replace_all(&cleaned, "-");
    let collapsed = DASHES.replace_all(&dashed, "-");
    let slug = collapsed.trim_matches('-');
    if slug.is_empty() {
        format!("project-{}", short_suffix())
    } else {
        slug.to_string()
    }
}

/// Coordinates the Document Store semantics: merge, derive, commit.
pub struct OnboardingManager {
    store: Arc<dyn ProjectStore>,
    /// Serializes read-modify-write cycles on documents.
    write_lock: Mutex<()>,
}

impl OnboardingManager {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectMeta>, StoreError> {
        Ok(self.store.list_projects().await?)
    }

    /// Create a project with an empty draft document.
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProjectMeta, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("name is required".to_string()));
        }

        let now = Utc::now();
        let project = ProjectMeta {
            id: format!("{}-{}", slugify(name), short_suffix()),
            name: name.to_string(),
            description: description.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut document = OnboardingDocument::default();
        document.derived = compute_derived(&document);

        self.store.insert_project(&project, &document).await?;
        info!(project_id = %project.id, name = %project.name, "Project created");
        Ok(project)
    }

    pub async fn get_onboarding(&self, project_id: &str) -> Result<OnboardingDocument, StoreError> {
        self.store
            .get_document(project_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(project_id.to_string()))
    }

    /// Deep-merge `patch` into the stored draft and return the result.
    ///
    /// Server-owned keys in the patch are ignored. The merged value must
    /// still be a valid document; otherwise nothing is written.
    pub async fn save_draft(
        &self,
        project_id: &str,
        patch: &Value,
    ) -> Result<OnboardingDocument, StoreError> {
        if !patch.is_object() {
            return Err(StoreError::InvalidInput(
                "patch must be a JSON object".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let existing = self.get_onboarding(project_id).await?;
        if existing.is_committed() {
            warn!(project_id, "Rejected patch on committed onboarding");
            return Err(StoreError::Committed(project_id.to_string()));
        }

        let mut patch = patch.clone();
        strip_server_owned(&mut patch);

        let mut merged_value = serde_json::to_value(&existing)
            .map_err(|e| StoreError::InvalidInput(format!("invalid stored document: {e}")))?;
        deep_merge(&mut merged_value, &patch);

        let mut merged: OnboardingDocument = serde_json::from_value(merged_value)
            .map_err(|e| StoreError::InvalidInput(format!("invalid onboarding patch: {e}")))?;
        merged.derived = compute_derived(&merged);

        self.store.put_document(project_id, &merged).await?;
        self.store.touch_project(project_id, Utc::now()).await?;

        info!(
            project_id,
            confidence = merged.derived.confidence_index,
            "Onboarding draft saved"
        );
        Ok(merged)
    }

    /// Validate required fields and mark the document committed.
    ///
    /// Re-committing returns the committed document with `committed_at`
    /// unchanged. The project's name and description are synced from the
    /// document for list views.
    pub async fn commit(&self, project_id: &str) -> Result<OnboardingDocument, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.get_onboarding(project_id).await?;

        let missing = document.missing_required();
        if !missing.is_empty() {
            warn!(project_id, missing = ?missing, "Commit rejected");
            return Err(StoreError::MissingRequired(missing));
        }

        let now = Utc::now();
        document.derived = compute_derived(&document);
        if !document.is_committed() {
            document.status = OnboardingStatus::Committed;
            document.committed_at = Some(now);
        }
        self.store.put_document(project_id, &document).await?;

        if let Some(mut project) = self.store.get_project(project_id).await? {
            let name = document.identity.name.trim();
            if !name.is_empty() {
                project.name = name.to_string();
            }
            if let Some(summary) = summary_line(&document) {
                project.description = summary;
            }
            project.updated_at = now;
            self.store.update_project(&project).await?;
        }

        info!(project_id, "Onboarding committed");
        Ok(document)
    }
}

/// Prefer the one-line, then the north star.
fn summary_line(document: &OnboardingDocument) -> Option<String> {
    [&document.identity.one_line, &document.intent.north_star]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
