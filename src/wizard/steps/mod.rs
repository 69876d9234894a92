//! Step views. Each step owns a typed form buffer and renders from the
//! working document; actions build a partial document for one top-level
//! section and hand it to the controller.

pub mod artifacts;
pub mod basics;
pub mod direction;
pub mod metrics;
pub mod milestones;
pub mod users;

pub use artifacts::ArtifactsForm;
pub use basics::BasicsForm;
pub use direction::DirectionForm;
pub use metrics::MetricsForm;
pub use milestones::MilestonesForm;
pub use users::UsersForm;

use crate::onboarding::model::{OnboardingDocument, ProjectMeta};
use crate::onboarding::state::WizardStep;

/// Read-only rendering of one step.
pub trait StepView {
    fn step(&self) -> WizardStep;

    /// Text block summarizing the step's slice of `doc`.
    fn render(&self, doc: &OnboardingDocument) -> String;
}

/// The six forms, one per step.
#[derive(Debug, Clone, Default)]
pub struct StepForms {
    pub basics: BasicsForm,
    pub direction: DirectionForm,
    pub users: UsersForm,
    pub metrics: MetricsForm,
    pub milestones: MilestonesForm,
    pub artifacts: ArtifactsForm,
}

impl StepForms {
    /// Forms with editable scalar fields prefilled from `doc`, and from
    /// `meta` where step 1 is still blank. "Add item" buffers start empty.
    pub fn from_document(doc: &OnboardingDocument, meta: Option<&ProjectMeta>) -> Self {
        Self {
            basics: BasicsForm::from_document(doc, meta),
            direction: DirectionForm::from_document(doc),
            users: UsersForm::default(),
            metrics: MetricsForm::default(),
            milestones: MilestonesForm::default(),
            artifacts: ArtifactsForm::from_document(doc),
        }
    }

    pub fn view(&self, step: WizardStep) -> &dyn StepView {
        match step {
            WizardStep::Basics => &self.basics,
            WizardStep::Direction => &self.direction,
            WizardStep::UsersAndUseCases => &self.users,
            WizardStep::Metrics => &self.metrics,
            WizardStep::Milestones => &self.milestones,
            WizardStep::ArtifactsAndReview => &self.artifacts,
        }
    }
}

// ── Input helpers ───────────────────────────────────────────────────

/// One item per non-blank line.
pub fn lines_to_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// One item per non-blank comma-separated entry.
pub fn csv_to_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn list_to_lines(items: &[String]) -> String {
    items.join("\n")
}

/// Lenient number parse: anything unparsable or non-finite is absent.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Trimmed text, or `None` when blank.
pub fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn bullet_list(out: &mut String, heading: &str, items: &[String]) {
    out.push_str(heading);
    out.push('\n');
    if items.is_empty() {
        out.push_str("  (none)\n");
    }
    for item in items {
        out.push_str("  - ");
        out.push_str(item);
        out.push('\n');
    }
}
