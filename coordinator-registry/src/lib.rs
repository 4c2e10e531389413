//! Agent registry: liveness tracking, health pressure, and a per-agent
//! circuit breaker, synchronized over a single `RwLock`-guarded map.
//!
//! Callers drive the periodic cleanup tick themselves (see
//! [`AgentRegistry::run_cleanup_tick`]); the coordinator binary wraps it in a
//! `tokio::time::interval` loop.

#![warn(missing_docs, clippy::pedantic)]

mod config;
mod error;
mod record;
mod registry;
mod state;

pub use config::RegistryConfig;
pub use error::{RegistryError, RegistryResult};
pub use record::{AgentRecord, AgentStatus, HeartbeatInput, RegisterInput};
pub use registry::{AgentRegistry, RegistryStats};
pub use state::CleanupOutcome;
