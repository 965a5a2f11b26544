use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::error::InstrumentError;
use crate::Instrument;

/// Lowest option value on every item.
pub const MIN_RESPONSE: u8 = 0;

/// Highest option value on every item ("nearly every day").
pub const MAX_RESPONSE: u8 = 3;

/// Which total an item contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ScoreDomain {
    Depression,
    Anxiety,
}

/// One selectable answer on a question item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResponseOption {
    pub value: u8,
    pub label: String,
}

/// A single screening question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionItem {
    pub id: String,
    pub prompt: String,
    pub domain: ScoreDomain,
    pub options: Vec<ResponseOption>,
}

impl QuestionItem {
    pub fn new(id: &str, prompt: &str, domain: ScoreDomain) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            domain,
            options: frequency_options(),
        }
    }
}

/// The shared "over the last 2 weeks" frequency scale.
pub fn frequency_options() -> Vec<ResponseOption> {
    [
        (0, "Not at all"),
        (1, "Several days"),
        (2, "More than half the days"),
        (3, "Nearly every day"),
    ]
    .into_iter()
    .map(|(value, label)| ResponseOption {
        value,
        label: label.to_string(),
    })
    .collect()
}

/// Answers keyed by item id. Partial sets are normal.
///
/// [`ResponseSet::record`] checks each answer against the catalog.
/// Sets built from raw maps (deserialized, or via `From`) are unchecked;
/// call [`ResponseSet::validate`] on them. Scoring ignores entries it
/// cannot place regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet(BTreeMap<String, u8>);

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, replacing any earlier answer to the same item.
    pub fn record(&mut self, item_id: &str, value: u8) -> Result<(), InstrumentError> {
        let item = crate::find_item(item_id)
            .ok_or_else(|| InstrumentError::UnknownItem(item_id.to_string()))?;
        check_value(&item, value)?;
        self.0.insert(item_id.to_string(), value);
        Ok(())
    }

    /// Build a checked set from raw answers. Fails on the first bad entry.
    pub fn from_answers(answers: &BTreeMap<String, u8>) -> Result<Self, InstrumentError> {
        let mut set = Self::new();
        for (item_id, value) in answers {
            set.record(item_id, *value)?;
        }
        Ok(set)
    }

    /// Remove an answer. Unset items count as absent, not zero.
    pub fn clear(&mut self, item_id: &str) -> Option<u8> {
        self.0.remove(item_id)
    }

    pub fn get(&self, item_id: &str) -> Option<u8> {
        self.0.get(item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn into_inner(self) -> BTreeMap<String, u8> {
        self.0
    }

    /// Report every entry that is not a catalog item or is out of range.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (item_id, value) in self.iter() {
            match crate::find_item(item_id) {
                Some(item) => {
                    if let Err(e) = check_value(&item, value) {
                        errors.push(e);
                    }
                }
                None => errors.push(ValidationError {
                    item_id: item_id.to_string(),
                    value,
                    message: format!("{item_id} is not a known screening item"),
                }),
            }
        }
        errors
    }
}

impl From<BTreeMap<String, u8>> for ResponseSet {
    fn from(answers: BTreeMap<String, u8>) -> Self {
        Self(answers)
    }
}

fn check_value(item: &QuestionItem, value: u8) -> Result<(), ValidationError> {
    if item.options.iter().any(|o| o.value == value) {
        Ok(())
    } else {
        Err(ValidationError {
            item_id: item.id.clone(),
            value,
            message: format!(
                "{}: response {} is outside range [{}, {}]",
                item.id, value, MIN_RESPONSE, MAX_RESPONSE,
            ),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("{message}")]
pub struct ValidationError {
    pub item_id: String,
    pub value: u8,
    pub message: String,
}

/// Coarse classification that drives the plan recommendation. Not a diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Conventional severity band for a single instrument total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

/// Product thresholds. These are not validated clinical cutoffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ScoringConfig {
    /// Either total strictly above this is high risk.
    pub high_threshold: u32,
    /// Either total strictly above this is at least moderate risk.
    pub moderate_threshold: u32,
    /// Item whose maximum answer raises the crisis flag.
    pub crisis_item_id: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            high_threshold: 14,
            moderate_threshold: 9,
            crisis_item_id: crate::instruments::phq9::SELF_HARM_ITEM.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreResult {
    pub depression_total: u32,
    pub anxiety_total: u32,
    pub risk_level: RiskLevel,
    pub crisis_flag: bool,
    pub depression_severity: Severity,
    pub anxiety_severity: Severity,
    /// Number of catalog items that contributed to a total.
    pub answered: u32,
}

/// Score a (possibly partial, possibly empty) response set. Never fails.
///
/// Entries for unknown items or with out-of-range values are skipped, which
/// keeps each total within its instrument's maximum.
pub fn score(responses: &ResponseSet, config: &ScoringConfig) -> ScoreResult {
    let mut depression_total = 0;
    let mut anxiety_total = 0;
    let mut answered = 0;
    let mut crisis_flag = false;

    for instrument in crate::all_instruments() {
        for item in instrument.items() {
            let Some(value) = responses.get(&item.id) else {
                continue;
            };
            if value > MAX_RESPONSE {
                tracing::debug!(item = %item.id, value, "ignoring out-of-range response");
                continue;
            }
            match item.domain {
                ScoreDomain::Depression => depression_total += u32::from(value),
                ScoreDomain::Anxiety => anxiety_total += u32::from(value),
            }
            answered += 1;
            if item.id == config.crisis_item_id && value == MAX_RESPONSE {
                crisis_flag = true;
            }
        }
    }

    ScoreResult {
        depression_total,
        anxiety_total,
        risk_level: classify_risk(depression_total, anxiety_total, config),
        crisis_flag,
        depression_severity: crate::instruments::phq9::Phq9.severity(depression_total),
        anxiety_severity: crate::instruments::gad7::Gad7.severity(anxiety_total),
        answered,
    }
}

/// [`score`] with the default thresholds.
pub fn score_default(responses: &ResponseSet) -> ScoreResult {
    score(responses, &ScoringConfig::default())
}

/// Strict `>` comparison: a total equal to a threshold stays in the lower tier.
pub fn classify_risk(depression_total: u32, anxiety_total: u32, config: &ScoringConfig) -> RiskLevel {
    if depression_total > config.high_threshold || anxiety_total > config.high_threshold {
        RiskLevel::High
    } else if depression_total > config.moderate_threshold
        || anxiety_total > config.moderate_threshold
    {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}
