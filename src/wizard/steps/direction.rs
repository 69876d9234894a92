//! Step 2: north star, business objectives, out of scope.

use super::{StepView, bullet_list, csv_to_list, lines_to_list, list_to_lines};
use crate::error::WizardError;
use crate::onboarding::model::OnboardingDocument;
use crate::onboarding::patch::{IntentPatch, OnboardingPatch};
use crate::onboarding::state::WizardStep;
use crate::wizard::controller::WizardController;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionForm {
    pub north_star: String,
    /// Comma-separated.
    pub business_objectives: String,
    /// One per line.
    pub out_of_scope: String,
}

impl DirectionForm {
    pub fn from_document(doc: &OnboardingDocument) -> Self {
        Self {
            north_star: doc.intent.north_star.clone().unwrap_or_default(),
            business_objectives: doc.intent.business_objectives.join(", "),
            out_of_scope: list_to_lines(&doc.intent.out_of_scope),
        }
    }

    pub fn patch(&self) -> OnboardingPatch {
        OnboardingPatch::default().with_intent(IntentPatch {
            north_star: Some(self.north_star.trim().to_string()),
            business_objectives: Some(csv_to_list(&self.business_objectives)),
            out_of_scope: Some(lines_to_list(&self.out_of_scope)),
            ..Default::default()
        })
    }

    pub async fn save_and_continue(
        &self,
        wizard: &mut WizardController,
    ) -> Result<(), WizardError> {
        wizard.save(self.patch()).await?;
        wizard.advance()?;
        Ok(())
    }
}

impl StepView for DirectionForm {
    fn step(&self) -> WizardStep {
        WizardStep::Direction
    }

    fn render(&self, doc: &OnboardingDocument) -> String {
        let mut out = format!(
            "North star: {}\n",
            doc.intent.north_star.as_deref().unwrap_or("")
        );
        bullet_list(&mut out, "Business objectives:", &doc.intent.business_objectives);
        bullet_list(&mut out, "Out of scope:", &doc.intent.out_of_scope);
        out
    }
}
