//! haven-onboarding
//!
//! The onboarding wizard as a state machine: an ordered step catalog with
//! visibility predicates, a controller that walks the visible steps while
//! accumulating step output, and a progress projection for rendering.
//!
//! Public API:
//! - `StepCatalog::standard()` / `StepCatalog::builder()`: declare steps
//! - `FlowController`: `start()`, `submit_step()`, `go_back()`, `reconcile()`
//! - `progress::project()`: position / total / percent over visible steps
//! - `SharedFlow`: async handle that serializes transitions and folds in
//!   authentication changes
//! - `PlanStore`: where a pre-selected plan is read from before the flow starts

pub mod catalog;
pub mod controller;
pub mod error;
pub mod progress;
pub mod shared;
pub mod state;
pub mod store;

pub use crate::catalog::{step_ids, StepCatalog, StepDescriptor, Visibility};
pub use crate::controller::{FlowController, StepView};
pub use crate::error::{CatalogError, FlowError, PredicateError, StoreError};
pub use crate::progress::Progress;
pub use crate::shared::SharedFlow;
pub use crate::state::{CursorState, FlowState, Phase};
pub use crate::store::{JsonFilePlanStore, PlanStore};

/// Build a controller for the given catalog, reading the pre-selected plan
/// from `store` once.
pub async fn controller_from_store(
    catalog: StepCatalog,
    store: &dyn PlanStore,
    is_authenticated: bool,
) -> Result<FlowController, FlowError> {
    let preselected = store.load_preselected().await?;
    if let Some(plan) = &preselected {
        tracing::info!(tier = %plan.tier, "found pre-selected plan");
    }
    Ok(FlowController::new(catalog)
        .with_authenticated(is_authenticated)
        .with_preselected_plan(preselected))
}
