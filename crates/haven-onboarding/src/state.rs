use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Everything the steps have produced so far, plus ambient flags that no
/// single step owns.
///
/// Data only grows: [`FlowState::merge`] overwrites keys, and only a full
/// reset clears them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FlowState {
    #[ts(type = "Record<string, unknown>")]
    data: Map<String, Value>,
    is_authenticated: bool,
    has_preselected_plan: bool,
}

impl FlowState {
    pub fn new(is_authenticated: bool, has_preselected_plan: bool) -> Self {
        Self {
            data: Map::new(),
            is_authenticated,
            has_preselected_plan,
        }
    }

    /// Shallow merge: each key in `delta` replaces the stored value.
    pub fn merge(&mut self, delta: Map<String, Value>) {
        for (key, value) in delta {
            self.data.insert(key, value);
        }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn has_preselected_plan(&self) -> bool {
        self.has_preselected_plan
    }

    pub(crate) fn set_authenticated(&mut self, value: bool) {
        self.is_authenticated = value;
    }

    pub(crate) fn set_preselected_plan(&mut self, value: bool) {
        self.has_preselected_plan = value;
    }

    /// Drop all step output. Ambient flags describe the outside world and
    /// are kept.
    pub(crate) fn clear_data(&mut self) {
        self.data.clear();
    }
}

/// Where the cursor is in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "phase", content = "index", rename_all = "snake_case")]
#[ts(export)]
pub enum Phase {
    /// Before the first step.
    Intro,
    /// On the catalog step with this index.
    AtStep(usize),
    /// Past the last visible step; the flow state has been handed off.
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intro => f.write_str("in intro"),
            Self::AtStep(i) => write!(f, "at step {i}"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CursorState {
    pub phase: Phase,
    pub intro_shown: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            phase: Phase::Intro,
            intro_shown: false,
        }
    }
}

impl CursorState {
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            Phase::AtStep(i) => Some(i),
            Phase::Intro | Phase::Complete => None,
        }
    }
}
