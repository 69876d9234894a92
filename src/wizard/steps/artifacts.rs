//! Step 6: artifact links, data schema, review, and commit.

use super::{StepView, bullet_list, lines_to_list, list_to_lines, optional_text};
use crate::error::WizardError;
use crate::onboarding::model::{DataSchema, OnboardingDocument, SchemaKind};
use crate::onboarding::patch::{ArtifactsPatch, OnboardingPatch};
use crate::onboarding::state::WizardStep;
use crate::wizard::controller::WizardController;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactsForm {
    /// One link per line.
    pub prds: String,
    pub designs: String,
    pub tech_docs: String,
    /// `None` means no schema.
    pub schema_kind: Option<SchemaKind>,
    pub schema_value: String,
}

/// Parse the schema type selector: `none`, `link`, or `inline`.
pub fn parse_schema_kind(text: &str) -> Result<Option<SchemaKind>, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(None),
        "link" => Ok(Some(SchemaKind::Link)),
        "inline" => Ok(Some(SchemaKind::Inline)),
        other => Err(format!("unknown schema type: {other}")),
    }
}

impl ArtifactsForm {
    pub fn from_document(doc: &OnboardingDocument) -> Self {
        let (schema_kind, schema_value) = match &doc.artifacts.data_schema {
            Some(schema) => (Some(schema.kind), schema.value.clone()),
            None => (None, String::new()),
        };
        Self {
            prds: list_to_lines(&doc.artifacts.prds),
            designs: list_to_lines(&doc.artifacts.designs),
            tech_docs: list_to_lines(&doc.artifacts.tech_docs),
            schema_kind,
            schema_value,
        }
    }

    fn data_schema(&self) -> Option<DataSchema> {
        let kind = self.schema_kind?;
        let value = optional_text(&self.schema_value)?;
        Some(DataSchema { kind, value })
    }

    pub fn patch(&self) -> OnboardingPatch {
        OnboardingPatch::default().with_artifacts(ArtifactsPatch {
            prds: Some(lines_to_list(&self.prds)),
            designs: Some(lines_to_list(&self.designs)),
            tech_docs: Some(lines_to_list(&self.tech_docs)),
            data_schema: Some(self.data_schema()),
        })
    }

    pub async fn save_artifacts(&self, wizard: &mut WizardController) -> Result<(), WizardError> {
        wizard.save(self.patch()).await?;
        wizard.notifier().success("Artifacts saved.");
        Ok(())
    }

    pub async fn commit(&self, wizard: &mut WizardController) -> Result<(), WizardError> {
        wizard.commit().await
    }
}

impl StepView for ArtifactsForm {
    fn step(&self) -> WizardStep {
        WizardStep::ArtifactsAndReview
    }

    fn render(&self, doc: &OnboardingDocument) -> String {
        let mut out = String::new();
        bullet_list(&mut out, "PRDs:", &doc.artifacts.prds);
        bullet_list(&mut out, "Designs:", &doc.artifacts.designs);
        bullet_list(&mut out, "Tech docs:", &doc.artifacts.tech_docs);
        match &doc.artifacts.data_schema {
            Some(schema) => out.push_str(&format!("Data schema ({}): {}\n", schema.kind, schema.value)),
            None => out.push_str("Data schema: none\n"),
        }

        out.push_str(&format!(
            "\nConfidence index: {:.0}%\n",
            doc.derived.confidence_index * 100.0
        ));
        if doc.derived.next_best_actions.is_empty() {
            out.push_str("Next best actions: none\n");
        } else {
            out.push_str("Next best actions:\n");
            for (i, action) in doc.derived.next_best_actions.iter().enumerate() {
                out.push_str(&format!("  {}. {action}\n", i + 1));
            }
        }
        out.push_str(&format!("Status: {}\n", doc.status));
        out
    }
}
