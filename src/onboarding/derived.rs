//! Confidence index and next-best-action computation.
//!
//! Six coverage points are checked: name, problem statement, direction
//! (north star or a primary metric), users plus use cases, milestones, and
//! artifacts. The index is the covered fraction rounded to two decimals.

use super::model::{Derived, OnboardingDocument};

pub const ACTION_DIRECTION: &str = "Define 1-2 primary metrics tied to the North Star";
pub const ACTION_USERS: &str = "Add at least 1 persona and 1 top use case";
pub const ACTION_MILESTONES: &str = "Draft 2-3 milestones with dates and exit criteria";
pub const ACTION_ARTIFACTS: &str = "Link a PRD/design/tech doc or data schema";

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Compute the derived section for a document.
pub fn compute_derived(doc: &OnboardingDocument) -> Derived {
    let has_direction = doc.intent.north_star.as_deref().is_some_and(filled)
        || !doc.metrics.primary_objectives.is_empty();
    let has_users = !doc.users.personas.is_empty() && !doc.intent.top_use_cases.is_empty();
    let has_milestones = !doc.delivery.milestones.is_empty();
    let has_artifacts = !doc.artifacts.is_empty();

    let points = [
        filled(&doc.identity.name),
        filled(&doc.intent.problem_statement),
        has_direction,
        has_users,
        has_milestones,
        has_artifacts,
    ];
    let covered = points.iter().filter(|p| **p).count();
    let confidence_index = round2(covered as f64 / points.len() as f64);

    let mut next_best_actions = Vec::new();
    if !has_direction {
        next_best_actions.push(ACTION_DIRECTION.to_string());
    }
    if !has_users {
        next_best_actions.push(ACTION_USERS.to_string());
    }
    if !has_milestones {
        next_best_actions.push(ACTION_MILESTONES.to_string());
    }
    if !has_artifacts {
        next_best_actions.push(ACTION_ARTIFACTS.to_string());
    }

    Derived {
        confidence_index,
        next_best_actions,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
