//! Typed partial documents sent by the client as PATCH bodies.
//!
//! Every field is optional and omitted from the JSON when unset, so a patch
//! only touches what the caller filled in. The server deep-merges objects and
//! replaces everything else, which means list fields always carry the full
//! list.

use serde::Serialize;

use super::model::{DataSchema, Guardrail, Milestone, Persona, PrimaryObjective, UseCase};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IdentityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_line: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IntentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_statement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub north_star: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_objectives: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_scope: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_use_cases: Option<Vec<UseCase>>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UsersPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personas: Option<Vec<Persona>>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MetricsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_objectives: Option<Vec<PrimaryObjective>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<Vec<Guardrail>>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DeliveryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestones: Option<Vec<Milestone>>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ArtifactsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prds: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_docs: Option<Vec<String>>,
    /// `Some(None)` clears the schema (serialized as `null`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_schema: Option<Option<DataSchema>>,
}

/// A partial onboarding document.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct OnboardingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<UsersPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactsPatch>,
}

impl OnboardingPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_identity(mut self, identity: IdentityPatch) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_intent(mut self, intent: IntentPatch) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_users(mut self, users: UsersPatch) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsPatch) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryPatch) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn with_artifacts(mut self, artifacts: ArtifactsPatch) -> Self {
        self.artifacts = Some(artifacts);
        self
    }
}
