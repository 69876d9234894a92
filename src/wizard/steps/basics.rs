//! Step 1: project name, one-liner, and problem statement.

use super::{StepView, optional_text};
use crate::error::WizardError;
use crate::onboarding::model::{OnboardingDocument, ProjectMeta};
use crate::onboarding::patch::{IdentityPatch, IntentPatch, OnboardingPatch};
use crate::onboarding::state::WizardStep;
use crate::wizard::controller::{REQUIRED_FIELDS_MESSAGE, WizardController};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicsForm {
    pub name: String,
    pub one_line: String,
    pub problem_statement: String,
}

impl BasicsForm {
    /// Blank name and one-liner fall back to the project's name and
    /// description.
    pub fn from_document(doc: &OnboardingDocument, meta: Option<&ProjectMeta>) -> Self {
        let name = optional_text(&doc.identity.name)
            .or_else(|| meta.map(|m| m.name.clone()))
            .unwrap_or_default();
        let one_line = doc
            .identity
            .one_line
            .as_deref()
            .and_then(optional_text)
            .or_else(|| meta.map(|m| m.description.clone()))
            .unwrap_or_default();
        Self {
            name,
            one_line,
            problem_statement: doc.intent.problem_statement.clone(),
        }
    }

    /// Both required fields present.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.problem_statement.trim().is_empty()
    }

    pub fn patch(&self) -> OnboardingPatch {
        OnboardingPatch::default()
            .with_identity(IdentityPatch {
                name: Some(self.name.trim().to_string()),
                one_line: Some(self.one_line.trim().to_string()),
            })
            .with_intent(IntentPatch {
                problem_statement: Some(self.problem_statement.trim().to_string()),
                ..Default::default()
            })
    }

    pub async fn save_draft(&self, wizard: &mut WizardController) -> Result<(), WizardError> {
        wizard.save(self.patch()).await?;
        wizard.notifier().success("Draft saved.");
        Ok(())
    }

    /// Validate locally, save, then move to step 2.
    pub async fn save_and_continue(
        &self,
        wizard: &mut WizardController,
    ) -> Result<(), WizardError> {
        if !self.is_complete() {
            return Err(wizard.validation_failure(REQUIRED_FIELDS_MESSAGE));
        }
        wizard.save(self.patch()).await?;
        wizard.advance()?;
        Ok(())
    }
}

impl StepView for BasicsForm {
    fn step(&self) -> WizardStep {
        WizardStep::Basics
    }

    fn render(&self, doc: &OnboardingDocument) -> String {
        let one_line = doc.identity.one_line.as_deref().unwrap_or("");
        format!(
            "Name*: {}\nOne-line: {}\nProblem statement*: {}\n",
            doc.identity.name, one_line, doc.intent.problem_statement
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::testing::local_context;

    #[tokio::test]
    async fn incomplete_form_is_rejected_before_any_call() {
        let (ctx, api) = local_context().await;
        let mut wizard = WizardController::new(ctx);
        wizard.create_project("Acme", "").await.unwrap();
        let before = api.calls();

        let form = BasicsForm {
            name: "Acme".to_string(),
            ..Default::default()
        };
        let err = form.save_and_continue(&mut wizard).await.unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
        assert_eq!(api.calls(), before);
        assert_eq!(wizard.step(), WizardStep::Basics);
    }

    #[tokio::test]
    async fn save_and_continue_moves_to_direction() {
        let (ctx, _api) = local_context().await;
        let mut wizard = WizardController::new(ctx);
        wizard.create_project("Acme", "").await.unwrap();

        let form = BasicsForm {
            name: " Acme ".to_string(),
            one_line: "Checkout in one tap".to_string(),
            problem_statement: "Carts are abandoned".to_string(),
        };
        form.save_and_continue(&mut wizard).await.unwrap();

        assert_eq!(wizard.step(), WizardStep::Direction);
        let doc = wizard.document().unwrap();
        assert_eq!(doc.identity.name, "Acme");
        assert_eq!(doc.identity.one_line.as_deref(), Some("Checkout in one tap"));
    }

    #[test]
    fn blank_identity_falls_back_to_project() {
        let now = chrono::Utc::now();
        let meta = ProjectMeta {
            id: "acme-1a2b3c".to_string(),
            name: "Acme".to_string(),
            description: "One tap".to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut doc = OnboardingDocument::default();
        doc.identity.one_line = Some("  ".to_string());

        let form = BasicsForm::from_document(&doc, Some(&meta));
        assert_eq!(form.name, "Acme");
        assert_eq!(form.one_line, "One tap");

        doc.identity.name = "Acme Checkout".to_string();
        doc.identity.one_line = Some("Faster carts".to_string());
        let form = BasicsForm::from_document(&doc, Some(&meta));
        assert_eq!(form.name, "Acme Checkout");
        assert_eq!(form.one_line, "Faster carts");

        assert_eq!(
            BasicsForm::from_document(&OnboardingDocument::default(), None),
            BasicsForm::default()
        );
    }

    #[tokio::test]
    async fn draft_may_be_incomplete() {
        let (ctx, _api) = local_context().await;
        let mut wizard = WizardController::new(ctx);
        wizard.create_project("Acme", "").await.unwrap();

        let form = BasicsForm {
            problem_statement: "Only the problem".to_string(),
            ..Default::default()
        };
        form.save_draft(&mut wizard).await.unwrap();
        assert_eq!(
            wizard.document().unwrap().intent.problem_statement,
            "Only the problem"
        );
        assert_eq!(wizard.step(), WizardStep::Basics);
    }
}
