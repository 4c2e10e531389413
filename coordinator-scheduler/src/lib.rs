//! MCDA agent selection: admission filter, fallback relaxation, weighted
//! scoring, and the external performance-sample feedback channel.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod estimate;
mod performance;
mod scheduler;
mod scoring;

pub use error::{SchedulerError, SchedulerResult};
pub use estimate::estimated_vram_requirement;
pub use performance::PerformanceTracker;
pub use scheduler::{Scheduler, Selection};
pub use scoring::{ScoreBreakdown, ScoringWeights};
