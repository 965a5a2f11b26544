//! Flow-state key conventions.
//!
//! Each onboarding step writes its output under one of these keys. The
//! helpers convert between typed payloads and the untyped map the flow
//! controller accumulates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;

pub const PROFILE: &str = "profile";
pub const CULTURAL_PREFERENCES: &str = "culturalPreferences";
pub const ACCOUNT: &str = "account";
pub const MENTAL_HEALTH_ASSESSMENT: &str = "mentalHealthAssessment";
pub const SELECTED_PLAN: &str = "selectedPlan";

/// Wrap a typed payload as a single-key delta ready for `submit_step`.
pub fn delta<T: Serialize>(key: &str, payload: &T) -> Result<Map<String, Value>, CoreError> {
    let mut map = Map::new();
    map.insert(key.to_string(), serde_json::to_value(payload)?);
    Ok(map)
}

/// Read a typed payload back out of accumulated flow data.
///
/// Returns `Ok(None)` when the key is absent and an error when it is present
/// but does not have the expected shape.
pub fn read<T: DeserializeOwned>(data: &Map<String, Value>, key: &str) -> Result<Option<T>, CoreError> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| CoreError::InvalidPayload {
                key: key.to_string(),
                message: e.to_string(),
            }),
    }
}

/// Like [`read`], but a missing key is an error.
pub fn require<T: DeserializeOwned>(data: &Map<String, Value>, key: &str) -> Result<T, CoreError> {
    read(data, key)?.ok_or_else(|| CoreError::MissingField(key.to_string()))
}
