//! Wire-level request/response shapes for the RPC and HTTP surfaces.
//!
//! Shared by both surfaces: the RPC-shaped POST routes and the client HTTP
//! routes are thin wrappers around the same handler functions, so they
//! exchange the same JSON shapes.

use std::collections::{HashMap, HashSet};

use coordinator_primitives::{AgentId, ClientId};
use coordinator_registry::AgentStatus;
use serde::{Deserialize, Serialize};

/// `RegisterAgent` request payload (§3 `AgentRecord` fields minus runtime
/// metrics and status).
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAgentRequest {
    pub agent_id: AgentId,
    pub endpoint: String,
    pub total_vram_mb: i64,
    pub total_ram_mb: i64,
    pub max_jobs: i32,
    #[serde(default)]
    pub supported_models: HashSet<String>,
    #[serde(default)]
    pub capabilities: HashMap<String, String>,
}

/// `RegisterAgent` response payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterAgentResponse {
    pub agent_id: AgentId,
    /// Suggested heartbeat interval, in seconds (`heartbeat_timeout / 2`).
    pub heartbeat_interval_secs: u64,
}

/// Inbound heartbeat payload, per §6.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatMessage {
    pub agent_id: AgentId,
    pub free_vram_mb: i64,
    pub free_ram_mb: i64,
    pub running_jobs: i32,
    pub queued_jobs: i32,
    pub cpu_percent: f64,
    pub rtt_ms: f64,
}

/// Per-message ack for `ReportHealth`.
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatAck {
    pub agent_id: AgentId,
    pub status: AckStatus,
    pub message: String,
}

/// Whether a single heartbeat message applied cleanly.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Ok,
    Error,
}

/// `RequestInference` request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceRequest {
    pub client_id: ClientId,
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// `RequestInference` response payload.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceResponse {
    pub agent_endpoint: String,
    pub session_token: String,
    pub expires_at: i64,
    pub job_id: String,
    pub estimated_rtt_ms: f64,
    pub agent_id: AgentId,
}

/// `QuerySystemStatus` response payload.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub total_agents: usize,
    pub healthy_agents: usize,
    pub uptime_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<AgentSnapshot>>,
}

/// Per-agent snapshot included when `include_agents` is requested.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    pub free_vram_mb: i64,
    pub running_jobs: i32,
    /// Seconds since the agent's last heartbeat, as of this snapshot.
    ///
    /// `last_heartbeat` itself is a monotonic `Instant` and has no stable
    /// wire representation, so this derives the liveness signal a consumer
    /// actually needs from it via the injected clock.
    pub last_heartbeat_age_secs: u64,
}

/// `GetPublicKey` response payload.
#[derive(Debug, Clone, Serialize)]
pub struct PublicKeyResponse {
    pub pem: String,
    pub algorithm: &'static str,
    pub issuer: &'static str,
}

/// Liveness probe response for `/api/v1/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
