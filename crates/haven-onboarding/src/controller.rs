use haven_core::flow_keys;
use haven_core::models::{PlanRecommendation, PlanSource, SelectedPlan};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{StepCatalog, Visibility};
use crate::error::{FlowError, PredicateError};
use crate::progress::{self, Progress};
use crate::state::{CursorState, FlowState, Phase};

/// Receives the accumulated flow state when the wizard finishes.
pub type CompletionHook = Box<dyn FnOnce(&FlowState) + Send>;

/// What the host needs to render the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StepView {
    pub id: String,
    pub title: String,
    pub position: usize,
    pub total: usize,
    pub percent: u8,
}

/// Drives one onboarding run over a [`StepCatalog`].
///
/// Invariant: while the phase is `AtStep(i)`, catalog step `i` is visible
/// under the current [`FlowState`]. Every mutator re-establishes it before
/// returning.
pub struct FlowController {
    run_id: Uuid,
    catalog: StepCatalog,
    state: FlowState,
    cursor: CursorState,
    on_complete: Option<CompletionHook>,
    diagnostics: Vec<PredicateError>,
}

impl FlowController {
    pub fn new(catalog: StepCatalog) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            catalog,
            state: FlowState::default(),
            cursor: CursorState::default(),
            on_complete: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_authenticated(mut self, is_authenticated: bool) -> Self {
        self.state.set_authenticated(is_authenticated);
        self
    }

    /// Seed the flow with a plan chosen before onboarding. The plan is
    /// recorded under `selectedPlan` so the completed state carries it.
    pub fn with_preselected_plan(mut self, plan: Option<PlanRecommendation>) -> Self {
        self.state.set_preselected_plan(plan.is_some());
        if let Some(plan) = plan {
            let selected = SelectedPlan {
                tier: plan.tier,
                source: PlanSource::Preselected,
            };
            match flow_keys::delta(flow_keys::SELECTED_PLAN, &selected) {
                Ok(delta) => self.state.merge(delta),
                Err(e) => tracing::warn!(error = %e, "could not record pre-selected plan"),
            }
        }
        self
    }

    /// Install the hook called once when the flow reaches `Complete`.
    pub fn on_complete<F>(&mut self, hook: F)
    where
        F: FnOnce(&FlowState) + Send + 'static,
    {
        self.on_complete = Some(Box::new(hook));
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.cursor.phase
    }

    pub fn is_complete(&self) -> bool {
        self.cursor.phase == Phase::Complete
    }

    /// Predicate faults seen since the last call, latest per step.
    pub fn take_diagnostics(&mut self) -> Vec<PredicateError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Leave the intro and land on the first visible step.
    pub fn start(&mut self) -> Result<Phase, FlowError> {
        if self.cursor.phase != Phase::Intro {
            return Err(self.invalid("start"));
        }
        self.cursor.intro_shown = true;

        let first = self.visible().first();
        match first {
            Some(index) => {
                self.move_to(Phase::AtStep(index));
                Ok(self.cursor.phase)
            }
            None => {
                tracing::error!(run = %self.run_id, "no visible step at start");
                Err(FlowError::NoVisibleStep)
            }
        }
    }

    /// Merge the current step's output and move to the next visible step,
    /// or complete the flow if there is none.
    pub fn submit_step(&mut self, delta: Map<String, Value>) -> Result<Phase, FlowError> {
        let Phase::AtStep(current) = self.cursor.phase else {
            return Err(self.invalid("submit_step"));
        };

        tracing::debug!(
            run = %self.run_id,
            step = %self.step_id(current),
            keys = ?delta.keys().collect::<Vec<_>>(),
            "step submitted"
        );
        self.state.merge(delta);

        let next = self.visible().next_after(current);
        match next {
            Some(index) => self.move_to(Phase::AtStep(index)),
            None => self.complete(),
        }
        Ok(self.cursor.phase)
    }

    /// Move to the previous visible step, or back to the intro. Merged step
    /// output is kept.
    pub fn go_back(&mut self) -> Result<Phase, FlowError> {
        let Phase::AtStep(current) = self.cursor.phase else {
            return Err(self.invalid("go_back"));
        };

        let prev = self.visible().prev_before(current);
        self.move_to(prev.map_or(Phase::Intro, Phase::AtStep));
        Ok(self.cursor.phase)
    }

    /// Restore the visibility invariant after the flow state changed without
    /// a navigation event. Idempotent; a no-op outside `AtStep`.
    ///
    /// If the current step became hidden the cursor moves forward to the
    /// nearest visible step, else back to the nearest earlier one.
    pub fn reconcile(&mut self) -> Result<Phase, FlowError> {
        let Phase::AtStep(current) = self.cursor.phase else {
            return Ok(self.cursor.phase);
        };

        let (still_visible, target) = {
            let visible = self.visible();
            let target = visible
                .next_after(current)
                .or_else(|| visible.prev_before(current));
            (visible.contains(current), target)
        };
        if still_visible {
            return Ok(self.cursor.phase);
        }

        match target {
            Some(index) => {
                self.move_to(Phase::AtStep(index));
                Ok(self.cursor.phase)
            }
            None => {
                // Nothing visible at all. Park in the intro so no hidden step
                // is ever current, and let the host show its error state.
                tracing::error!(run = %self.run_id, "no visible step during reconcile");
                self.cursor.phase = Phase::Intro;
                Err(FlowError::NoVisibleStep)
            }
        }
    }

    /// Apply an authentication change from outside the wizard.
    pub fn set_authenticated(&mut self, is_authenticated: bool) -> Result<Phase, FlowError> {
        if self.state.is_authenticated() == is_authenticated {
            return Ok(self.cursor.phase);
        }
        tracing::info!(run = %self.run_id, is_authenticated, "authentication changed");
        self.state.set_authenticated(is_authenticated);
        self.reconcile()
    }

    /// Discard all step output and return to the intro under a new run id.
    /// Ambient flags and an unused completion hook are kept.
    pub fn reset(&mut self) {
        let previous = std::mem::replace(&mut self.run_id, Uuid::new_v4());
        tracing::info!(run = %self.run_id, previous = %previous, "flow reset");
        self.state.clear_data();
        self.cursor = CursorState::default();
        self.diagnostics.clear();
    }

    pub fn progress(&self) -> Option<Progress> {
        let index = self.cursor.current_index()?;
        progress::project(&self.catalog, &self.state, index)
    }

    /// The step to render, or `None` in the intro and after completion.
    pub fn current_step(&self) -> Option<StepView> {
        let index = self.cursor.current_index()?;
        let step = self.catalog.get(index)?;
        let visible = self.catalog.visible_steps(&self.state);
        let progress = progress::from_visibility(&visible, index)?;
        Some(StepView {
            id: step.id().to_string(),
            title: step.title().to_string(),
            position: progress.position,
            total: progress.total,
            percent: progress.percent,
        })
    }

    fn visible(&mut self) -> Visibility<'_> {
        let visible = self.catalog.visible_steps(&self.state);
        for fault in visible.faults() {
            match self.diagnostics.iter_mut().find(|d| d.step_id == fault.step_id) {
                Some(existing) => existing.clone_from(fault),
                None => self.diagnostics.push(fault.clone()),
            }
        }
        visible
    }

    fn move_to(&mut self, phase: Phase) {
        let from = self.cursor.phase;
        self.cursor.phase = phase;
        tracing::debug!(
            run = %self.run_id,
            from = %self.phase_label(from),
            to = %self.phase_label(phase),
            "cursor moved"
        );
    }

    fn complete(&mut self) {
        self.move_to(Phase::Complete);
        tracing::info!(
            run = %self.run_id,
            keys = self.state.data().len(),
            "onboarding complete"
        );
        if let Some(hook) = self.on_complete.take() {
            hook(&self.state);
        }
    }

    fn invalid(&self, operation: &'static str) -> FlowError {
        tracing::warn!(run = %self.run_id, operation, phase = %self.cursor.phase, "rejected transition");
        FlowError::InvalidTransition {
            operation,
            phase: self.cursor.phase,
        }
    }

    fn step_id(&self, index: usize) -> &str {
        self.catalog.get(index).map_or("?", |s| s.id())
    }

    fn phase_label(&self, phase: Phase) -> String {
        match phase {
            Phase::AtStep(i) => self.step_id(i).to_string(),
            other => other.to_string(),
        }
    }
}
