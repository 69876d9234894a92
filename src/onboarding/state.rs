//! Wizard step sequence.

use serde::{Deserialize, Serialize};

/// The six wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Basics,
    Direction,
    UsersAndUseCases,
    Metrics,
    Milestones,
    ArtifactsAndReview,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Basics,
        WizardStep::Direction,
        WizardStep::UsersAndUseCases,
        WizardStep::Metrics,
        WizardStep::Milestones,
        WizardStep::ArtifactsAndReview,
    ];

    /// Total number of steps.
    pub const COUNT: u8 = 6;

    /// 1-based position.
    pub fn number(&self) -> u8 {
        match self {
            Self::Basics => 1,
            Self::Direction => 2,
            Self::UsersAndUseCases => 3,
            Self::Metrics => 4,
            Self::Milestones => 5,
            Self::ArtifactsAndReview => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn prev(&self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// Heading shown above the step.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Basics => "Basics",
            Self::Direction => "Direction",
            Self::UsersAndUseCases => "Users & Use Cases",
            Self::Metrics => "Metrics: Primary Objectives & Guardrails",
            Self::Milestones => "Milestones",
            Self::ArtifactsAndReview => "Artifacts & Review",
        }
    }

    /// Fraction of the wizard reached, in (0, 1].
    pub fn progress(&self) -> f64 {
        f64::from(self.number()) / f64::from(Self::COUNT)
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Step {} of {}", self.number(), Self::COUNT)
    }
}
