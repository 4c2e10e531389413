//! The control-plane surface: configuration, error-to-status mapping, wire
//! DTOs, and an Axum router exposing both the RPC-shaped control-plane
//! methods and the equivalent client HTTP surface.

#![warn(missing_docs, clippy::pedantic)]

mod config;
mod error;
mod handlers;
mod router;
mod state;
mod wire;
mod ws;

pub use config::CoordinatorConfig;
pub use error::SurfaceError;
pub use router::build_router;
pub use state::AppState;
pub use wire::{
    AckStatus, AgentSnapshot, HealthResponse, HeartbeatAck, HeartbeatMessage, InferenceRequest,
    InferenceResponse, PublicKeyResponse, RegisterAgentRequest, RegisterAgentResponse,
    SystemStatus,
};
