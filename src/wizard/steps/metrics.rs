//! Step 4: primary objectives and guardrails.
//!
//! Numeric buffers are parsed leniently; a value that does not parse is
//! stored as absent instead of blocking the add.

use super::{StepView, optional_text, parse_number};
use crate::error::WizardError;
use crate::onboarding::model::{Direction, Guardrail, OnboardingDocument, PrimaryObjective};
use crate::onboarding::patch::{MetricsPatch, OnboardingPatch};
use crate::onboarding::state::WizardStep;
use crate::wizard::controller::WizardController;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveBuffer {
    pub name: String,
    pub definition: String,
    pub unit: String,
    pub baseline: String,
    pub target: String,
    pub target_date: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuardrailBuffer {
    pub name: String,
    pub definition: String,
    pub unit: String,
    pub threshold: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsForm {
    pub objective: ObjectiveBuffer,
    pub guardrail: GuardrailBuffer,
}

impl ObjectiveBuffer {
    fn build(&self) -> Option<PrimaryObjective> {
        let name = optional_text(&self.name)?;
        Some(PrimaryObjective {
            name,
            unit: optional_text(&self.unit),
            definition: optional_text(&self.definition),
            baseline: parse_number(&self.baseline),
            target: parse_number(&self.target),
            target_date: optional_text(&self.target_date),
        })
    }
}

impl GuardrailBuffer {
    fn build(&self) -> Option<Guardrail> {
        let name = optional_text(&self.name)?;
        Some(Guardrail {
            name,
            unit: optional_text(&self.unit),
            definition: optional_text(&self.definition),
            threshold: parse_number(&self.threshold),
            direction: self.direction,
        })
    }
}

impl MetricsForm {
    pub async fn add_objective(
        &mut self,
        wizard: &mut WizardController,
    ) -> Result<bool, WizardError> {
        let Some(objective) = self.objective.build() else {
            return Ok(false);
        };
        let mut objectives = wizard
            .document()
            .map(|d| d.metrics.primary_objectives.clone())
            .unwrap_or_default();
        objectives.push(objective);

        let patch = OnboardingPatch::default().with_metrics(MetricsPatch {
            primary_objectives: Some(objectives),
            ..Default::default()
        });
        wizard.save(patch).await?;
        self.objective = ObjectiveBuffer::default();
        Ok(true)
    }

    pub async fn add_guardrail(
        &mut self,
        wizard: &mut WizardController,
    ) -> Result<bool, WizardError> {
        let Some(guardrail) = self.guardrail.build() else {
            return Ok(false);
        };
        let mut guardrails = wizard
            .document()
            .map(|d| d.metrics.guardrails.clone())
            .unwrap_or_default();
        guardrails.push(guardrail);

        let patch = OnboardingPatch::default().with_metrics(MetricsPatch {
            guardrails: Some(guardrails),
            ..Default::default()
        });
        wizard.save(patch).await?;
        self.guardrail = GuardrailBuffer::default();
        Ok(true)
    }
}

fn fmt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

impl StepView for MetricsForm {
    fn step(&self) -> WizardStep {
        WizardStep::Metrics
    }

    fn render(&self, doc: &OnboardingDocument) -> String {
        let mut out = String::from("Primary objectives:\n");
        if doc.metrics.primary_objectives.is_empty() {
            out.push_str("  (none)\n");
        }
        for o in &doc.metrics.primary_objectives {
            out.push_str(&format!(
                "  - {} [{}] {} -> {} by {}\n",
                o.name,
                o.unit.as_deref().unwrap_or(""),
                fmt_number(o.baseline),
                fmt_number(o.target),
                o.target_date.as_deref().unwrap_or("-"),
            ));
        }

        out.push_str("Guardrails:\n");
        if doc.metrics.guardrails.is_empty() {
            out.push_str("  (none)\n");
        }
        for g in &doc.metrics.guardrails {
            out.push_str(&format!(
                "  - {} ({} {})\n",
                g.name,
                g.direction,
                fmt_number(g.threshold)
            ));
        }
        out
    }
}
