//! Errors surfaced by the scheduler.

use thiserror::Error;

/// Result alias for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors produced during agent selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// No agent passed the admission filter, even after relaxation.
    #[error("no agent available for model {model}")]
    NoAgentsAvailable {
        /// The model name the caller requested.
        model: String,
    },
}
