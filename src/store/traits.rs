//! `ProjectStore` trait: async persistence for projects and their
//! onboarding documents.
//!
//! The store is deliberately dumb: it reads and writes whole records.
//! Merge, derive, and commit semantics live in `OnboardingManager`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::onboarding::model::{OnboardingDocument, ProjectMeta};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a project together with its initial onboarding document.
    async fn insert_project(
        &self,
        project: &ProjectMeta,
        document: &OnboardingDocument,
    ) -> Result<(), DatabaseError>;

    /// All projects, most recently updated first, then by name.
    async fn list_projects(&self) -> Result<Vec<ProjectMeta>, DatabaseError>;

    async fn get_project(&self, id: &str) -> Result<Option<ProjectMeta>, DatabaseError>;

    /// Overwrite name, description and `updated_at` of an existing project.
    async fn update_project(&self, project: &ProjectMeta) -> Result<(), DatabaseError>;

    /// Bump a project's `updated_at`.
    async fn touch_project(&self, id: &str, at: DateTime<Utc>) -> Result<(), DatabaseError>;

    async fn get_document(
        &self,
        project_id: &str,
    ) -> Result<Option<OnboardingDocument>, DatabaseError>;

    /// Replace the stored document for a project.
    async fn put_document(
        &self,
        project_id: &str,
        document: &OnboardingDocument,
    ) -> Result<(), DatabaseError>;
}
