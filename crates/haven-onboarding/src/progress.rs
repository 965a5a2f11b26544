//! Position of the cursor within the currently visible steps.
//!
//! Always recomputed from the flow state: the visible set can grow or shrink
//! between two reads when a predicate flips.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{StepCatalog, Visibility};
use crate::state::FlowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Progress {
    /// 1-based rank of the current step among visible steps.
    pub position: usize,
    /// Number of visible steps.
    pub total: usize,
    /// `round(100 * position / total)`, in `0..=100`.
    pub percent: u8,
}

/// Project `current_index` onto the steps visible under `state`.
///
/// `None` if the index is not visible, which the controller never allows
/// for its own cursor.
pub fn project(catalog: &StepCatalog, state: &FlowState, current_index: usize) -> Option<Progress> {
    from_visibility(&catalog.visible_steps(state), current_index)
}

pub(crate) fn from_visibility(visible: &Visibility<'_>, current_index: usize) -> Option<Progress> {
    let position = visible.rank(current_index)?;
    let total = visible.len();
    Some(Progress {
        position,
        total,
        percent: percent(position, total),
    })
}

/// Integer round-half-up of `100 * position / total`.
fn percent(position: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let scaled = (200 * position + total) / (2 * total);
    scaled.min(100) as u8
}
