//! Step 5: delivery milestones.

use super::{StepView, lines_to_list, optional_text};
use crate::error::WizardError;
use crate::onboarding::model::{Milestone, OnboardingDocument};
use crate::onboarding::patch::{DeliveryPatch, OnboardingPatch};
use crate::onboarding::state::WizardStep;
use crate::wizard::controller::WizardController;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestonesForm {
    pub name: String,
    pub date: String,
    /// One per line.
    pub exit_criteria: String,
}

impl MilestonesForm {
    pub async fn add_milestone(
        &mut self,
        wizard: &mut WizardController,
    ) -> Result<bool, WizardError> {
        let Some(name) = optional_text(&self.name) else {
            return Ok(false);
        };
        let mut milestones = wizard
            .document()
            .map(|d| d.delivery.milestones.clone())
            .unwrap_or_default();
        milestones.push(Milestone {
            name,
            date: optional_text(&self.date),
            exit_criteria: lines_to_list(&self.exit_criteria),
        });

        let patch = OnboardingPatch::default().with_delivery(DeliveryPatch {
            milestones: Some(milestones),
        });
        wizard.save(patch).await?;
        *self = Self::default();
        Ok(true)
    }
}

impl StepView for MilestonesForm {
    fn step(&self) -> WizardStep {
        WizardStep::Milestones
    }

    fn render(&self, doc: &OnboardingDocument) -> String {
        let mut out = String::from("Milestones:\n");
        if doc.delivery.milestones.is_empty() {
            out.push_str("  (none)\n");
        }
        for m in &doc.delivery.milestones {
            match &m.date {
                Some(date) => out.push_str(&format!("  - {} ({date})\n", m.name)),
                None => out.push_str(&format!("  - {}\n", m.name)),
            }
            for criterion in &m.exit_criteria {
                out.push_str(&format!("      * {criterion}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::testing::local_context;

    #[tokio::test]
    async fn milestones_append_in_order() {
        let (ctx, _api) = local_context().await;
        let mut wizard = WizardController::new(ctx);
        wizard.create_project("Acme", "").await.unwrap();

        let mut form = MilestonesForm {
            name: "Alpha".to_string(),
            date: "2026-11-01".to_string(),
            exit_criteria: "5 pilot users\n".to_string(),
        };
        assert!(form.add_milestone(&mut wizard).await.unwrap());
        form.name = "GA".to_string();
        assert!(form.add_milestone(&mut wizard).await.unwrap());

        let milestones = &wizard.document().unwrap().delivery.milestones;
        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[0].exit_criteria, vec!["5 pilot users"]);
        assert_eq!(milestones[1].name, "GA");
        assert_eq!(milestones[1].date, None);
        assert_eq!(form, MilestonesForm::default());

        let text = form.render(wizard.document().unwrap());
        assert!(text.contains("  - Alpha (2026-11-01)"));
    }
}
