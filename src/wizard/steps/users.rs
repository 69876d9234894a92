//! Step 3: personas and top use cases.

use super::{StepView, lines_to_list};
use crate::error::WizardError;
use crate::onboarding::model::{OnboardingDocument, Persona, UseCase};
use crate::onboarding::patch::{IntentPatch, OnboardingPatch, UsersPatch};
use crate::onboarding::state::WizardStep;
use crate::wizard::controller::WizardController;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsersForm {
    pub persona_name: String,
    pub use_case_title: String,
    /// One criterion per line.
    pub use_case_criteria: String,
}

impl UsersForm {
    /// Append a persona. Returns `false` when the name buffer is blank.
    pub async fn add_persona(&mut self, wizard: &mut WizardController) -> Result<bool, WizardError> {
        let name = self.persona_name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        let mut personas = wizard
            .document()
            .map(|d| d.users.personas.clone())
            .unwrap_or_default();
        personas.push(Persona {
            name: name.to_string(),
        });

        let patch = OnboardingPatch::default().with_users(UsersPatch {
            personas: Some(personas),
        });
        wizard.save(patch).await?;
        self.persona_name.clear();
        Ok(true)
    }

    /// Append a use case. Returns `false` when the title buffer is blank.
    pub async fn add_use_case(
        &mut self,
        wizard: &mut WizardController,
    ) -> Result<bool, WizardError> {
        let title = self.use_case_title.trim();
        if title.is_empty() {
            return Ok(false);
        }

        let mut use_cases = wizard
            .document()
            .map(|d| d.intent.top_use_cases.clone())
            .unwrap_or_default();
        use_cases.push(UseCase {
            title: title.to_string(),
            success_criteria: lines_to_list(&self.use_case_criteria),
        });

        let patch = OnboardingPatch::default().with_intent(IntentPatch {
            top_use_cases: Some(use_cases),
            ..Default::default()
        });
        wizard.save(patch).await?;
        self.use_case_title.clear();
        self.use_case_criteria.clear();
        Ok(true)
    }
}

impl StepView for UsersForm {
    fn step(&self) -> WizardStep {
        WizardStep::UsersAndUseCases
    }

    fn render(&self, doc: &OnboardingDocument) -> String {
        let mut out = String::from("Personas:\n");
        if doc.users.personas.is_empty() {
            out.push_str("  (none)\n");
        }
        for persona in &doc.users.personas {
            out.push_str(&format!("  - {}\n", persona.name));
        }

        out.push_str("Top use cases:\n");
        if doc.intent.top_use_cases.is_empty() {
            out.push_str("  (none)\n");
        }
        for uc in &doc.intent.top_use_cases {
            out.push_str(&format!("  - {}\n", uc.title));
            for criterion in &uc.success_criteria {
                out.push_str(&format!("      * {criterion}\n"));
            }
        }
        out
    }
}
