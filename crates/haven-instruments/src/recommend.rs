//! Risk level → subscription tier.

use haven_core::models::{PlanRecommendation, PlanTier};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::scoring::{RiskLevel, ScoreResult};

/// Tier offered for each risk level. A product decision, kept configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct RecommendationPolicy {
    pub high: PlanTier,
    pub moderate: PlanTier,
    pub low: PlanTier,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            high: PlanTier::Pro,
            moderate: PlanTier::Premium,
            low: PlanTier::Free,
        }
    }
}

impl RecommendationPolicy {
    pub fn tier_for(&self, risk: RiskLevel) -> PlanTier {
        match risk {
            RiskLevel::High => self.high,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::Low => self.low,
        }
    }
}

/// Recommend a plan from a score. Only the risk level is consulted; crisis
/// handling is triggered separately by the host.
pub fn recommend(result: &ScoreResult, policy: &RecommendationPolicy) -> PlanRecommendation {
    let tier = policy.tier_for(result.risk_level);
    PlanRecommendation {
        tier,
        reason: reason_for(tier).to_string(),
    }
}

/// Describes the plan actually offered, whatever risk level mapped to it.
fn reason_for(tier: PlanTier) -> &'static str {
    match tier {
        PlanTier::Pro => {
            "Your answers suggest you could benefit from working with a licensed professional. \
             This plan includes therapist sessions and access to crisis-capable care."
        }
        PlanTier::Premium => {
            "Your answers suggest you would benefit from comprehensive, structured support. \
             This plan unlocks the full library of guided programs and progress tracking."
        }
        PlanTier::Free => {
            "Your answers suggest you are doing fairly well. \
             This plan covers the daily check-ins and exercises that help you maintain it."
        }
    }
}

/// [`recommend`] with the default tier mapping.
pub fn recommend_default(result: &ScoreResult) -> PlanRecommendation {
    recommend(result, &RecommendationPolicy::default())
}
