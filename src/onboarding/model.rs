//! Onboarding document and project data models.
//!
//! The document is stored as one JSON blob per project. Every section
//! deserializes with defaults so older or partial blobs still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an onboarding document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    #[default]
    Draft,
    Committed,
}

impl std::fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Committed => write!(f, "committed"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub one_line: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UseCase {
    pub title: String,
    #[serde(default)]
    pub success_criteria: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Intent {
    pub problem_statement: String,
    pub north_star: Option<String>,
    pub business_objectives: Vec<String>,
    pub out_of_scope: Vec<String>,
    pub top_use_cases: Vec<UseCase>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Users {
    pub personas: Vec<Persona>,
}

/// A metric the project is trying to move.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrimaryObjective {
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub baseline: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
    /// `YYYY-MM-DD`, kept as entered.
    #[serde(default)]
    pub target_date: Option<String>,
}

/// Which side of the threshold a guardrail protects.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Min,
    Max,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// A metric that must not regress past `threshold`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Guardrail {
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Metrics {
    pub primary_objectives: Vec<PrimaryObjective>,
    pub guardrails: Vec<Guardrail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub exit_criteria: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Delivery {
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Link,
    Inline,
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Link => write!(f, "link"),
            Self::Inline => write!(f, "inline"),
        }
    }
}

/// Data schema reference: a URL or inline DDL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataSchema {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Artifacts {
    pub prds: Vec<String>,
    pub designs: Vec<String>,
    pub tech_docs: Vec<String>,
    pub data_schema: Option<DataSchema>,
}

impl Artifacts {
    pub fn is_empty(&self) -> bool {
        self.prds.is_empty()
            && self.designs.is_empty()
            && self.tech_docs.is_empty()
            && self.data_schema.is_none()
    }
}

/// Server-computed summary. Never edited by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Derived {
    pub confidence_index: f64,
    pub next_best_actions: Vec<String>,
}

/// The full onboarding record for one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OnboardingDocument {
    pub identity: Identity,
    pub intent: Intent,
    pub users: Users,
    pub metrics: Metrics,
    pub delivery: Delivery,
    pub artifacts: Artifacts,
    pub derived: Derived,
    pub status: OnboardingStatus,
    pub committed_at: Option<DateTime<Utc>>,
}

impl OnboardingDocument {
    /// Dotted paths of required fields that are blank.
    pub fn missing_required(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.identity.name.trim().is_empty() {
            missing.push("identity.name".to_string());
        }
        if self.intent.problem_statement.trim().is_empty() {
            missing.push("intent.problem_statement".to_string());
        }
        missing
    }

    pub fn is_committed(&self) -> bool {
        self.status == OnboardingStatus::Committed
    }
}

/// Project metadata shown in the project picker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_is_draft_and_incomplete() {
        let doc = OnboardingDocument::default();
        assert_eq!(doc.status, OnboardingStatus::Draft);
        assert!(doc.committed_at.is_none());
        assert_eq!(
            doc.missing_required(),
            vec!["identity.name", "intent.problem_statement"]
        );
        assert!(doc.artifacts.is_empty());
    }

    #[test]
    fn whitespace_name_counts_as_missing() {
        let mut doc = OnboardingDocument::default();
        doc.identity.name = "   ".to_string();
        doc.intent.problem_statement = "Slow checkout".to_string();
        assert_eq!(doc.missing_required(), vec!["identity.name"]);
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let doc: OnboardingDocument = serde_json::from_value(serde_json::json!({
            "identity": {"name": "Acme"},
            "metrics": {"guardrails": [{"name": "p95 latency", "threshold": null}]}
        }))
        .unwrap();

        assert_eq!(doc.identity.name, "Acme");
        assert!(doc.identity.one_line.is_none());
        assert!(doc.intent.top_use_cases.is_empty());
        let guardrail = &doc.metrics.guardrails[0];
        assert_eq!(guardrail.direction, Direction::Min);
        assert!(guardrail.threshold.is_none());
    }

    #[test]
    fn data_schema_uses_type_tag() {
        let schema = DataSchema {
            kind: SchemaKind::Inline,
            value: "CREATE TABLE t (id INT)".to_string(),
        };
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "inline");

        let parsed: DataSchema =
            serde_json::from_value(serde_json::json!({"type": "link", "value": "https://x"}))
                .unwrap();
        assert_eq!(parsed.kind, SchemaKind::Link);
    }

    #[test]
    fn direction_rejects_unknown_values() {
        assert!(
            serde_json::from_value::<Guardrail>(serde_json::json!({
                "name": "errors",
                "direction": "sideways"
            }))
            .is_err()
        );
        assert_eq!("MAX".parse::<Direction>().unwrap(), Direction::Max);
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn status_display_matches_serde() {
        for status in [OnboardingStatus::Draft, OnboardingStatus::Committed] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(format!("\"{status}\""), json);
        }
    }
}
