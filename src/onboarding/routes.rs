//! REST endpoints for projects and onboarding documents.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use super::manager::OnboardingManager;
use crate::error::StoreError;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub manager: Arc<OnboardingManager>,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        if let StoreError::Database(e) = &self {
            error!(error = %e, "Store failure");
        }
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(serde_json::json!({"detail": self.to_string()}))).into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn list_projects(State(state): State<OnboardingRouteState>) -> Response {
    match state.manager.list_projects().await {
        Ok(projects) => Json(projects).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct CreateProjectRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

async fn create_project(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<CreateProjectRequest>,
) -> Response {
    let description = body.description.unwrap_or_default();
    match state.manager.create_project(&body.name, &description).await {
        Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(e) => {
            warn!(error = %e, "Create project failed");
            e.into_response()
        }
    }
}

async fn get_onboarding(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> Response {
    match state.manager.get_onboarding(&id).await {
        Ok(document) => Json(document).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn patch_onboarding(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    match state.manager.save_draft(&id, &patch).await {
        Ok(document) => Json(document).into_response(),
        Err(e) => {
            warn!(project_id = %id, error = %e, "Patch failed");
            e.into_response()
        }
    }
}

async fn commit_onboarding(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> Response {
    match state.manager.commit(&id).await {
        Ok(document) => Json(document).into_response(),
        Err(e) => e.into_response(),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any)
}

/// Build the Document Store router.
pub fn onboarding_routes(state: OnboardingRouteState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}/onboarding",
            get(get_onboarding).patch(patch_onboarding),
        )
        .route("/projects/{id}/onboarding/commit", post(commit_onboarding))
        .layer(ServiceBuilder::new().layer(cors_layer(cors_origins)))
        .with_state(state)
}
