//! HTTP client for the Document Store.
//!
//! `OnboardingApi` is the seam the wizard talks to. `ApiClient` implements
//! it over reqwest; `LocalApi` calls an in-process `OnboardingManager`
//! directly. No retries and no timeouts are applied.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, TransportError};
use crate::onboarding::manager::OnboardingManager;
use crate::onboarding::model::{OnboardingDocument, ProjectMeta};
use crate::onboarding::patch::OnboardingPatch;

/// Typed calls against the Document Store.
#[async_trait]
pub trait OnboardingApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<ProjectMeta>, TransportError>;

    /// Not idempotent: every call creates a new project.
    async fn create_project(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProjectMeta, TransportError>;

    async fn get_onboarding(&self, project_id: &str)
    -> Result<OnboardingDocument, TransportError>;

    async fn patch_onboarding(
        &self,
        project_id: &str,
        patch: &OnboardingPatch,
    ) -> Result<OnboardingDocument, TransportError>;

    async fn commit_onboarding(
        &self,
        project_id: &str,
    ) -> Result<OnboardingDocument, TransportError>;
}

#[derive(Serialize)]
struct CreateProjectBody<'a> {
    name: &'a str,
    description: &'a str,
}

/// reqwest-backed client.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn onboarding_url(&self, project_id: &str) -> String {
        self.url(&format!("/projects/{project_id}/onboarding"))
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<Value, TransportError> {
        self.send(self.client.get(self.url("/health"))).await
    }

    /// PATCH with an arbitrary JSON body, for callers that already hold one.
    pub async fn patch_raw(
        &self,
        project_id: &str,
        patch: &Value,
    ) -> Result<OnboardingDocument, TransportError> {
        self.send(self.client.patch(self.onboarding_url(project_id)).json(patch))
            .await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "API response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Pick the message for a failed response: `detail`, raw text, or
/// `HTTP <status>`.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(detail) = json.get("detail") {
            match detail {
                Value::String(s) if !s.trim().is_empty() => return s.clone(),
                Value::Null => {}
                other if !other.is_string() => return other.to_string(),
                _ => {}
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl OnboardingApi for ApiClient {
    async fn list_projects(&self) -> Result<Vec<ProjectMeta>, TransportError> {
        self.send(self.client.get(self.url("/projects"))).await
    }

    async fn create_project(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProjectMeta, TransportError> {
        let body = CreateProjectBody { name, description };
        self.send(self.client.post(self.url("/projects")).json(&body))
            .await
    }

    async fn get_onboarding(
        &self,
        project_id: &str,
    ) -> Result<OnboardingDocument, TransportError> {
        self.send(self.client.get(self.onboarding_url(project_id)))
            .await
    }

    async fn patch_onboarding(
        &self,
        project_id: &str,
        patch: &OnboardingPatch,
    ) -> Result<OnboardingDocument, TransportError> {
        self.send(self.client.patch(self.onboarding_url(project_id)).json(patch))
            .await
    }

    async fn commit_onboarding(
        &self,
        project_id: &str,
    ) -> Result<OnboardingDocument, TransportError> {
        let url = format!("{}/commit", self.onboarding_url(project_id));
        self.send(self.client.post(url)).await
    }
}

/// In-process API over a local store, with the same error surface as HTTP.
#[derive(Clone)]
pub struct LocalApi {
    manager: Arc<OnboardingManager>,
}

impl LocalApi {
    pub fn new(manager: Arc<OnboardingManager>) -> Self {
        Self { manager }
    }
}

impl From<StoreError> for TransportError {
    fn from(e: StoreError) -> Self {
        TransportError::Status {
            status: e.http_status(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl OnboardingApi for LocalApi {
    async fn list_projects(&self) -> Result<Vec<ProjectMeta>, TransportError> {
        Ok(self.manager.list_projects().await?)
    }

    async fn create_project(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProjectMeta, TransportError> {
        Ok(self.manager.create_project(name, description).await?)
    }

    async fn get_onboarding(
        &self,
        project_id: &str,
    ) -> Result<OnboardingDocument, TransportError> {
        Ok(self.manager.get_onboarding(project_id).await?)
    }

    async fn patch_onboarding(
        &self,
        project_id: &str,
        patch: &OnboardingPatch,
    ) -> Result<OnboardingDocument, TransportError> {
        let patch =
            serde_json::to_value(patch).map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(self.manager.save_draft(project_id, &patch).await?)
    }

    async fn commit_onboarding(
        &self,
        project_id: &str,
    ) -> Result<OnboardingDocument, TransportError> {
        Ok(self.manager.commit(project_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_field_wins() {
        assert_eq!(
            error_message(400, r#"{"detail": "name is required"}"#),
            "name is required"
        );
    }

    #[test]
    fn structured_detail_is_stringified() {
        assert_eq!(
            error_message(422, r#"{"detail": [{"msg": "bad"}]}"#),
            r#"[{"msg":"bad"}]"#
        );
    }

    #[test]
    fn raw_text_then_status_fallback() {
        assert_eq!(error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(500, r#"{"error": "x"}"#), r#"{"error": "x"}"#);
        assert_eq!(error_message(503, "   "), "HTTP 503");
        assert_eq!(error_message(400, r#"{"detail": null}"#), r#"{"detail": null}"#);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.onboarding_url("acme-1"),
            "http://localhost:8000/projects/acme-1/onboarding"
        );
    }

    #[tokio::test]
    async fn local_api_maps_store_errors_to_statuses() {
        let store: Arc<dyn crate::store::ProjectStore> =
            Arc::new(crate::store::LibSqlBackend::new_memory().await.unwrap());
        let api = LocalApi::new(Arc::new(OnboardingManager::new(store)));

        let err = api.get_onboarding("ghost").await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        let err = api.create_project(" ", "").await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "name is required");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = ApiClient::new(format!("http://127.0.0.1:{port}"));
        let err = client.list_projects().await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
