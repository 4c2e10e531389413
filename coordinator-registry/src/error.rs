//! Errors surfaced by the agent registry.

use coordinator_primitives::AgentId;
use thiserror::Error;

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors produced by [`crate::AgentRegistry`] operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A registration payload was missing a required field.
    #[error("invalid registration: {reason}")]
    BadRequest {
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
    /// The referenced agent id is not present in the registry.
    #[error("unknown agent: {agent_id}")]
    NotFound {
        /// The agent id that was looked up.
        agent_id: AgentId,
    },
}
