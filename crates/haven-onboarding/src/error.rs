use thiserror::Error;

use crate::state::Phase;

#[derive(Debug, Error)]
pub enum FlowError {
    /// The catalog has no visible step to land on. Fatal for this run.
    #[error("no visible step to land on")]
    NoVisibleStep,

    #[error("{operation} is not allowed while {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("plan store error: {0}")]
    Store(#[from] StoreError),
}

/// A visibility predicate could not decide. The step is treated as hidden.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("visibility predicate for step '{step_id}' failed: {message}")]
pub struct PredicateError {
    pub step_id: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog has no steps")]
    Empty,

    #[error("duplicate step id: {0}")]
    DuplicateStep(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
