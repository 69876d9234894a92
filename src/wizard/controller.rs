//! WizardController: current step, selected project, and the working copy
//! of its onboarding document.
//!
//! Every async action catches its own failure, logs it, and turns it into a
//! toast. The error is still returned so callers (step forms) can decide
//! whether to clear their buffers, but nothing needs to handle it.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::{TransportError, WizardError};
use crate::onboarding::model::{OnboardingDocument, ProjectMeta};
use crate::onboarding::patch::OnboardingPatch;
use crate::onboarding::state::WizardStep;

use super::context::{Notifier, WizardContext};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name and Problem Statement are required.";

pub struct WizardController {
    ctx: WizardContext,
    step: WizardStep,
    selected_project: Option<String>,
    document: Option<OnboardingDocument>,
    projects: Vec<ProjectMeta>,
    /// Last step reached per project, for this session.
    steps_by_project: HashMap<String, WizardStep>,
}

impl WizardController {
    pub fn new(ctx: WizardContext) -> Self {
        Self {
            ctx,
            step: WizardStep::default(),
            selected_project: None,
            document: None,
            projects: Vec::new(),
            steps_by_project: HashMap::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selected_project(&self) -> Option<&str> {
        self.selected_project.as_deref()
    }

    /// The working copy. `None` until the selected project's document has
    /// been fetched.
    pub fn document(&self) -> Option<&OnboardingDocument> {
        self.document.as_ref()
    }

    pub fn projects(&self) -> &[ProjectMeta] {
        &self.projects
    }

    /// Metadata of the selected project, if it is in the cached list.
    pub fn selected_meta(&self) -> Option<&ProjectMeta> {
        let id = self.selected_project.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.ctx.notifier
    }

    // ── Projects ────────────────────────────────────────────────────

    pub async fn refresh_projects(&mut self) -> Result<(), WizardError> {
        match self.ctx.api.list_projects().await {
            Ok(projects) => {
                self.projects = projects;
                Ok(())
            }
            Err(e) => Err(self.transport_failure("Loading projects", e)),
        }
    }

    /// Create a project and select it.
    pub async fn create_project(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<ProjectMeta, WizardError> {
        if name.trim().is_empty() {
            return Err(self.validation_failure("Project name is required."));
        }

        let project = match self.ctx.api.create_project(name.trim(), description).await {
            Ok(project) => project,
            Err(e) => return Err(self.transport_failure("Creating project", e)),
        };
        self.ctx.notifier.success(format!("Created {}", project.name));
        info!(project_id = %project.id, "Project created from wizard");

        // A failed refresh has already been reported; the project exists.
        let _ = self.refresh_projects().await;
        self.select_project(&project.id).await?;
        Ok(project)
    }

    /// Select a project and fetch its document. The working copy is cleared
    /// until the fetch resolves.
    pub async fn select_project(&mut self, project_id: &str) -> Result<(), WizardError> {
        self.selected_project = Some(project_id.to_string());
        self.document = None;
        self.step = self
            .steps_by_project
            .get(project_id)
            .copied()
            .unwrap_or_default();

        match self.ctx.api.get_onboarding(project_id).await {
            Ok(document) => {
                self.document = Some(document);
                Ok(())
            }
            Err(e) => Err(self.transport_failure("Loading onboarding", e)),
        }
    }

    /// Forget the selection and return to the project picker.
    pub fn deselect(&mut self) {
        self.selected_project = None;
        self.document = None;
        self.step = WizardStep::default();
    }

    // ── Document ────────────────────────────────────────────────────

    /// Send `patch` and replace the working copy with the server's answer.
    pub async fn save(&mut self, patch: OnboardingPatch) -> Result<(), WizardError> {
        let project_id = self.require_project()?;
        match self.ctx.api.patch_onboarding(&project_id, &patch).await {
            Ok(document) => {
                self.document = Some(document);
                Ok(())
            }
            Err(e) => Err(self.transport_failure("Save", e)),
        }
    }

    /// Commit from the final step. On failure nothing local changes.
    pub async fn commit(&mut self) -> Result<(), WizardError> {
        let project_id = self.require_project()?;
        if !self.step.is_last() {
            return Err(self.validation_failure("Commit is available from the final step."));
        }

        match self.ctx.api.commit_onboarding(&project_id).await {
            Ok(document) => {
                self.document = Some(document);
                self.ctx.notifier.success("Onboarding committed!");
                info!(project_id = %project_id, "Onboarding committed");
                Ok(())
            }
            Err(e) => Err(self.transport_failure("Commit", e)),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Move forward one step. Leaving the first step requires the two
    /// required fields on the working copy. No network call is made.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let document = match (&self.selected_project, &self.document) {
            (Some(_), Some(document)) => document,
            _ => return Err(self.validation_failure("Select a project first.")),
        };
        if self.step == WizardStep::Basics && !document.missing_required().is_empty() {
            return Err(self.validation_failure(REQUIRED_FIELDS_MESSAGE));
        }
        if let Some(next) = self.step.next() {
            self.set_step(next);
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(prev) = self.step.prev() {
            self.set_step(prev);
        }
        self.step
    }

    fn set_step(&mut self, step: WizardStep) {
        self.step = step;
        if let Some(id) = &self.selected_project {
            self.steps_by_project.insert(id.clone(), step);
        }
    }

    // ── Failure containment ─────────────────────────────────────────

    fn require_project(&self) -> Result<String, WizardError> {
        match (&self.selected_project, &self.document) {
            (Some(id), Some(_)) => Ok(id.clone()),
            _ => {
                self.ctx.notifier.error("Select a project first.");
                Err(WizardError::NoProject)
            }
        }
    }

    /// Report a client-local validation failure.
    pub fn validation_failure(&self, message: &str) -> WizardError {
        warn!(step = self.step.number(), reason = message, "Validation failed");
        self.ctx.notifier.error(message);
        WizardError::Validation(message.to_string())
    }

    fn transport_failure(&self, action: &str, err: TransportError) -> WizardError {
        warn!(action, error = %err, "Wizard action failed");
        let message = match &err {
            TransportError::Status { message, .. } => message.clone(),
            other => format!("{action} failed: {other}"),
        };
        self.ctx.notifier.error(message);
        WizardError::Transport(err)
    }
}
