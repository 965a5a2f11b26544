use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Subscription tier offered at the end of onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlanTier {
    Free,
    Premium,
    Pro,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            "pro" => Ok(Self::Pro),
            other => Err(CoreError::UnknownTier(other.to_string())),
        }
    }
}

/// A suggested tier together with the human-readable justification shown
/// on the plan-selection step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlanRecommendation {
    pub tier: PlanTier,
    pub reason: String,
}

/// Where the plan in a [`SelectedPlan`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlanSource {
    /// Picked on a pricing page before onboarding started.
    Preselected,
    /// Accepted from the screening-based recommendation.
    Recommended,
    /// Chosen manually on the plan-selection step.
    UserChoice,
}

/// Payload stored under [`crate::flow_keys::SELECTED_PLAN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectedPlan {
    pub tier: PlanTier,
    pub source: PlanSource,
}
