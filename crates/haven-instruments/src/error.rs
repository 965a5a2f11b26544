use thiserror::Error;

use crate::scoring::ValidationError;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("unknown question item: {0}")]
    UnknownItem(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}
