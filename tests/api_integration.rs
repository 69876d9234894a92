//! Integration tests for the Document Store REST API.
//!
//! Each test spins up an Axum server on a random port over an in-memory
//! store and talks to it through the real HTTP client.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use pm_onboard::client::{ApiClient, OnboardingApi};
use pm_onboard::error::TransportError;
use pm_onboard::onboarding::model::{OnboardingStatus, Persona};
use pm_onboard::onboarding::patch::{IdentityPatch, IntentPatch, OnboardingPatch, UsersPatch};
use pm_onboard::onboarding::{OnboardingManager, OnboardingRouteState, onboarding_routes};
use pm_onboard::store::{LibSqlBackend, ProjectStore};
use pm_onboard::wizard::{WizardContext, WizardController};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an Axum server on a random port, return its base URL.
async fn start_server() -> String {
    let store: Arc<dyn ProjectStore> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let manager = Arc::new(OnboardingManager::new(store));
    let app = onboarding_routes(
        OnboardingRouteState { manager },
        &["http://localhost:3000".to_string()],
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

fn complete_basics() -> OnboardingPatch {
    OnboardingPatch::default()
        .with_identity(IdentityPatch {
            name: Some("Acme Checkout".to_string()),
            one_line: Some("One-tap checkout".to_string()),
        })
        .with_intent(IntentPatch {
            problem_statement: Some("Carts are abandoned".to_string()),
            ..Default::default()
        })
}

// ── Projects ─────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        assert_eq!(client.health().await.unwrap(), json!({"status": "ok"}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn created_project_is_listed() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);

        let created = client.create_project("Acme", "").await.unwrap();
        assert_eq!(created.name, "Acme");
        assert!(created.id.starts_with("acme-"));

        let projects = client.list_projects().await.unwrap();
        assert!(
            projects
                .iter()
                .any(|p| p.id == created.id && p.name == "Acme")
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn create_returns_201_and_blank_name_400() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let http = reqwest::Client::new();

        let resp = http
            .post(format!("{base}/projects"))
            .json(&json!({"name": "Acme"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);

        let resp = http
            .post(format!("{base}/projects"))
            .json(&json!({"name": "  ", "description": ""}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["detail"], "name is required");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_project_is_404_with_detail() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        let err = client.get_onboarding("ghost").await.unwrap_err();
        match err {
            TransportError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Project not found: ghost");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

// ── Patch semantics ──────────────────────────────────────────────────

#[tokio::test]
async fn patch_touches_only_its_section() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        let project = client.create_project("Acme", "").await.unwrap();
        let before = client
            .patch_onboarding(&project.id, &complete_basics())
            .await
            .unwrap();

        let personas = vec![Persona {
            name: "Alex".to_string(),
        }];
        let after = client
            .patch_onboarding(
                &project.id,
                &OnboardingPatch::default().with_users(UsersPatch {
                    personas: Some(personas.clone()),
                }),
            )
            .await
            .unwrap();

        assert_eq!(after.users.personas, personas);
        assert_eq!(after.identity, before.identity);
        assert_eq!(after.intent, before.intent);
        assert_eq!(after.metrics, before.metrics);
        assert_eq!(after.delivery, before.delivery);
        assert_eq!(after.artifacts, before.artifacts);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_patch_returns_document_unchanged() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        let project = client.create_project("Acme", "").await.unwrap();

        let fresh = client.get_onboarding(&project.id).await.unwrap();
        let patched = client
            .patch_onboarding(&project.id, &OnboardingPatch::default())
            .await
            .unwrap();
        assert_eq!(patched, fresh);

        let saved = client
            .patch_onboarding(&project.id, &complete_basics())
            .await
            .unwrap();
        let again = client.patch_raw(&project.id, &json!({})).await.unwrap();
        assert_eq!(again, saved);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn nested_patch_deep_merges() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        let project = client.create_project("Acme", "").await.unwrap();
        client
            .patch_onboarding(&project.id, &complete_basics())
            .await
            .unwrap();

        let doc = client
            .patch_raw(&project.id, &json!({"intent": {"north_star": "Weekly checkouts"}}))
            .await
            .unwrap();
        assert_eq!(doc.intent.problem_statement, "Carts are abandoned");
        assert_eq!(doc.intent.north_star.as_deref(), Some("Weekly checkouts"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn invalid_patch_is_rejected_without_writing() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        let project = client.create_project("Acme", "").await.unwrap();
        let before = client.get_onboarding(&project.id).await.unwrap();

        let err = client
            .patch_raw(&project.id, &json!({"users": {"personas": "Alex"}}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));

        let err = client.patch_raw(&project.id, &json!([1, 2])).await.unwrap_err();
        assert_eq!(err.status(), Some(400));

        assert_eq!(client.get_onboarding(&project.id).await.unwrap(), before);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn server_owned_fields_are_ignored() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        let project = client.create_project("Acme", "").await.unwrap();

        let doc = client
            .patch_raw(
                &project.id,
                &json!({
                    "status": "committed",
                    "derived": {"confidence_index": 1.0, "next_best_actions": []}
                }),
            )
            .await
            .unwrap();
        assert_eq!(doc.status, OnboardingStatus::Draft);
        assert_eq!(doc.derived.confidence_index, 0.0);
        assert_eq!(doc.derived.next_best_actions.len(), 4);
    })
    .await
    .expect("test timed out");
}

// ── Commit ───────────────────────────────────────────────────────────

#[tokio::test]
async fn commit_with_missing_fields_is_400() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        let project = client.create_project("Acme", "").await.unwrap();

        let err = client.commit_onboarding(&project.id).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "Missing required: identity.name, intent.problem_statement"
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn commit_is_idempotent_and_locks_the_draft() {
    timeout(TEST_TIMEOUT, async {
        let client = ApiClient::new(start_server().await);
        let project = client.create_project("Acme", "").await.unwrap();
        client
            .patch_onboarding(&project.id, &complete_basics())
            .await
            .unwrap();

        let first = client.commit_onboarding(&project.id).await.unwrap();
        assert_eq!(first.status, OnboardingStatus::Committed);
        assert!(first.committed_at.is_some());

        let second = client.commit_onboarding(&project.id).await.unwrap();
        assert_eq!(second.committed_at, first.committed_at);

        let err = client
            .patch_onboarding(&project.id, &complete_basics())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));

        // Commit syncs the project's name and description.
        let projects = client.list_projects().await.unwrap();
        let meta = projects.iter().find(|p| p.id == project.id).unwrap();
        assert_eq!(meta.name, "Acme Checkout");
        assert_eq!(meta.description, "One-tap checkout");
    })
    .await
    .expect("test timed out");
}

// ── Wizard over HTTP ─────────────────────────────────────────────────

#[tokio::test]
async fn wizard_commit_failure_keeps_step() {
    timeout(TEST_TIMEOUT, async {
        let api: Arc<dyn OnboardingApi> = Arc::new(ApiClient::new(start_server().await));
        let mut wizard = WizardController::new(WizardContext::new(api));
        let mut toasts = wizard.notifier().subscribe();

        wizard.create_project("Acme", "").await.unwrap();
        wizard.save(complete_basics()).await.unwrap();
        while !wizard.step().is_last() {
            wizard.advance().unwrap();
        }
        wizard
            .save(OnboardingPatch::default().with_intent(IntentPatch {
                problem_statement: Some(String::new()),
                ..Default::default()
            }))
            .await
            .unwrap();

        let step = wizard.step();
        assert!(wizard.commit().await.is_err());
        assert_eq!(wizard.step(), step);

        let mut last = None;
        while let Ok(toast) = toasts.try_recv() {
            last = Some(toast);
        }
        assert_eq!(
            last.unwrap().message,
            "Missing required: intent.problem_statement"
        );
    })
    .await
    .expect("test timed out");
}
