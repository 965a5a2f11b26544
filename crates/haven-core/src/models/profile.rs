use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Basic profile collected on the `profile` step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfileInfo {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
}

/// Cultural and language preferences used to match content and therapists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CulturalPreferences {
    /// BCP 47 tag, e.g. "en-US".
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_background: Option<String>,
    #[serde(default)]
    pub include_faith_perspectives: bool,
    #[serde(default)]
    pub therapist_preferences: Vec<String>,
}

/// Screening answers keyed by question item id, plus when they were taken.
///
/// Values are the raw option values (0–3). Validation against the question
/// catalog happens in `haven-instruments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MentalHealthAssessment {
    pub responses: BTreeMap<String, u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<jiff::Timestamp>,
}
