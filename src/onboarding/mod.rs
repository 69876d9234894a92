//! Onboarding documents: model, merge rules, derived scores, and the
//! Document Store service with its REST routes.
//!
//! `OnboardingManager` is the single writer: every PATCH is deep-merged into
//! the stored draft, re-validated against the model, and re-scored before it
//! is persisted. Commit is a one-way transition; later patches are rejected.

pub mod derived;
pub mod manager;
pub mod merge;
pub mod model;
pub mod patch;
pub mod routes;
pub mod state;

pub use manager::OnboardingManager;
pub use model::{OnboardingDocument, OnboardingStatus, ProjectMeta};
pub use patch::OnboardingPatch;
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::WizardStep;
