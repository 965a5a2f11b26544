use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{CatalogError, PredicateError};
use crate::state::FlowState;

/// Ids of the steps in [`StepCatalog::standard`]. Hosts map these to
/// renderers.
pub mod step_ids {
    pub const WELCOME: &str = "welcome";
    pub const PROFILE: &str = "profile";
    pub const CULTURAL_PREFERENCES: &str = "cultural-preferences";
    pub const ACCOUNT: &str = "account";
    pub const SCREENING: &str = "screening";
    pub const PLAN_SELECTION: &str = "plan-selection";
    pub const COMPLETE: &str = "complete";
}

/// Decides whether a step is part of the active sequence. Must be pure and
/// cheap; an `Err` hides the step.
pub type Predicate = Arc<dyn Fn(&FlowState) -> Result<bool, String> + Send + Sync>;

/// An immutable catalog entry.
#[derive(Clone)]
pub struct StepDescriptor {
    id: String,
    /// Translation key, passed through to the host untouched.
    title: String,
    predicate: Predicate,
}

impl StepDescriptor {
    /// A step that is always visible.
    pub fn always(id: &str, title: &str) -> Self {
        Self::fallible(id, title, |_| Ok(true))
    }

    /// A step whose visibility is a plain boolean function of the flow state.
    pub fn when<F>(id: &str, title: &str, predicate: F) -> Self
    where
        F: Fn(&FlowState) -> bool + Send + Sync + 'static,
    {
        Self::fallible(id, title, move |state| Ok(predicate(state)))
    }

    /// A step whose predicate can fail, e.g. because it inspects a payload
    /// that may not have the expected shape.
    pub fn fallible<F>(id: &str, title: &str, predicate: F) -> Self
    where
        F: Fn(&FlowState) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_visible(&self, state: &FlowState) -> Result<bool, PredicateError> {
        (self.predicate)(state).map_err(|message| PredicateError {
            step_id: self.id.clone(),
            message,
        })
    }
}

impl fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Ordered, non-empty list of steps with unique ids. Order is declaration
/// order and never changes.
#[derive(Debug, Clone)]
pub struct StepCatalog {
    steps: Vec<StepDescriptor>,
}

impl StepCatalog {
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self, CatalogError> {
        if steps.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(CatalogError::DuplicateStep(step.id.clone()));
            }
        }
        Ok(Self { steps })
    }

    pub fn builder() -> StepCatalogBuilder {
        StepCatalogBuilder::default()
    }

    /// The product onboarding sequence.
    ///
    /// `account` is skipped for signed-in users and `plan-selection` when a
    /// plan was picked before onboarding started.
    pub fn standard() -> Self {
        use self::step_ids::*;

        Self {
            steps: vec![
                StepDescriptor::always(WELCOME, "onboarding.steps.welcome"),
                StepDescriptor::always(PROFILE, "onboarding.steps.profile"),
                StepDescriptor::always(CULTURAL_PREFERENCES, "onboarding.steps.cultural_preferences"),
                StepDescriptor::when(ACCOUNT, "onboarding.steps.account", |s| !s.is_authenticated()),
                StepDescriptor::always(SCREENING, "onboarding.steps.screening"),
                StepDescriptor::when(PLAN_SELECTION, "onboarding.steps.plan_selection", |s| {
                    !s.has_preselected_plan()
                }),
                StepDescriptor::always(COMPLETE, "onboarding.steps.complete"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    /// Evaluate every predicate against `state`. Failing predicates hide
    /// their step and are reported in [`Visibility::faults`].
    pub fn visible_steps(&self, state: &FlowState) -> Visibility<'_> {
        let mut indices = Vec::with_capacity(self.steps.len());
        let mut faults = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            match step.is_visible(state) {
                Ok(true) => indices.push(index),
                Ok(false) => {}
                Err(fault) => {
                    tracing::warn!(step = %step.id, error = %fault.message, "visibility predicate failed, hiding step");
                    faults.push(fault);
                }
            }
        }

        Visibility {
            catalog: self,
            indices,
            faults,
        }
    }
}

#[derive(Default)]
pub struct StepCatalogBuilder {
    steps: Vec<StepDescriptor>,
}

impl StepCatalogBuilder {
    pub fn step(mut self, step: StepDescriptor) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Result<StepCatalog, CatalogError> {
        StepCatalog::new(self.steps)
    }
}

/// The visible subset of a catalog for one flow state, in catalog order.
#[derive(Debug)]
pub struct Visibility<'a> {
    catalog: &'a StepCatalog,
    indices: Vec<usize>,
    faults: Vec<PredicateError>,
}

impl<'a> Visibility<'a> {
    /// Catalog indices of the visible steps, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn steps(&self) -> impl Iterator<Item = &'a StepDescriptor> + '_ {
        let catalog = self.catalog;
        self.indices.iter().map(move |&i| &catalog.steps[i])
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.steps().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// 1-based rank of a catalog index among the visible steps.
    pub fn rank(&self, index: usize) -> Option<usize> {
        self.indices.binary_search(&index).ok().map(|r| r + 1)
    }

    /// Predicates that failed during this evaluation.
    pub fn faults(&self) -> &[PredicateError] {
        &self.faults
    }

    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    /// Smallest visible index strictly after `index`.
    pub fn next_after(&self, index: usize) -> Option<usize> {
        self.indices.iter().copied().find(|&i| i > index)
    }

    /// Largest visible index strictly before `index`.
    pub fn prev_before(&self, index: usize) -> Option<usize> {
        self.indices.iter().rev().copied().find(|&i| i < index)
    }
}
