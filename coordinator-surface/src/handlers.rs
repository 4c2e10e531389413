//! Handler functions shared by the RPC-shaped POST routes and the client
//! HTTP surface. Both routers call into these directly; nothing here knows
//! which router dispatched to it.

use coordinator_registry::{HeartbeatInput, RegisterInput};
use uuid::Uuid;

use crate::error::SurfaceError;
use crate::state::AppState;
use crate::wire::{
    AgentSnapshot, HealthResponse, InferenceRequest, InferenceResponse, PublicKeyResponse,
    RegisterAgentRequest, RegisterAgentResponse, SystemStatus,
};

/// `/api/v1/health`, a plain liveness probe.
pub fn health() -> HealthResponse {
    HealthResponse { status: "healthy" }
}

/// `RegisterAgent` / `POST /rpc/register-agent`.
///
/// # Errors
///
/// Returns [`SurfaceError::InvalidArgument`] if `agent_id` or `endpoint` is empty.
pub async fn register_agent(
    state: &AppState,
    request: RegisterAgentRequest,
) -> Result<RegisterAgentResponse, SurfaceError> {
    let agent_id = request.agent_id.clone();
    state
        .registry
        .register(RegisterInput {
            id: request.agent_id,
            endpoint: request.endpoint,
            total_vram_mb: request.total_vram_mb,
            total_ram_mb: request.total_ram_mb,
            max_jobs: request.max_jobs,
            supported_models: request.supported_models,
            capabilities: request.capabilities,
        })
        .await?;

    Ok(RegisterAgentResponse {
        agent_id,
        heartbeat_interval_secs: state.config.registry.heartbeat_timeout.as_secs() / 2,
    })
}

/// Applies one heartbeat to the registry. Used by the `ReportHealth`
/// WebSocket stream; does not terminate the stream on failure, per §4.5 —
/// the caller turns any `Err` here into an error ack and keeps reading.
///
/// # Errors
///
/// Returns [`SurfaceError::NotFound`] if the agent id is unknown.
pub async fn apply_heartbeat(
    state: &AppState,
    message: coordinator_registry::HeartbeatInput,
    agent_id: &coordinator_primitives::AgentId,
) -> Result<(), SurfaceError> {
    state.registry.update_health(agent_id, message).await?;
    Ok(())
}

pub(crate) fn heartbeat_input(message: &crate::wire::HeartbeatMessage) -> HeartbeatInput {
    HeartbeatInput {
        free_vram_mb: message.free_vram_mb,
        free_ram_mb: message.free_ram_mb,
        running_jobs: message.running_jobs,
        queued_jobs: message.queued_jobs,
        cpu_percent: message.cpu_percent,
        rtt_ms: message.rtt_ms,
    }
}

/// `RequestInference` / `POST /rpc/request-inference` and
/// `POST /api/v1/inference/request`.
///
/// # Errors
///
/// Returns [`SurfaceError::InvalidArgument`] if `client_id`, `model`, or
/// `prompt` is empty; [`SurfaceError::Unavailable`] if no agent can serve
/// the request; [`SurfaceError::Internal`] if token minting fails.
pub async fn request_inference(
    state: &AppState,
    request: InferenceRequest,
) -> Result<InferenceResponse, SurfaceError> {
    if request.client_id.as_str().trim().is_empty() {
        return Err(SurfaceError::InvalidArgument(
            "client_id must not be empty".to_string(),
        ));
    }
    if request.model.trim().is_empty() {
        return Err(SurfaceError::InvalidArgument(
            "model must not be empty".to_string(),
        ));
    }
    if request.prompt.trim().is_empty() {
        return Err(SurfaceError::InvalidArgument(
            "prompt must not be empty".to_string(),
        ));
    }

    let selection = state.scheduler.select(&request.model).await?;

    let (token, claims) = state.signing.mint(
        selection.agent.id.clone(),
        request.client_id,
        request.model,
    )?;

    Ok(InferenceResponse {
        agent_endpoint: selection.agent.endpoint,
        session_token: token,
        expires_at: claims.exp,
        job_id: Uuid::new_v4().to_string(),
        estimated_rtt_ms: selection.agent.rtt_ms,
        agent_id: selection.agent.id,
    })
}

/// `QuerySystemStatus` / `GET /api/v1/status`. Includes the per-agent
/// snapshot array only when `include_agents` is set.
pub async fn query_system_status(state: &AppState, include_agents: bool) -> SystemStatus {
    let stats = state.registry.stats().await;
    let agents = if include_agents {
        let records = state.registry.list_all_agents().await;
        let now = state.clock.now();
        Some(
            records
                .into_iter()
                .map(|record| AgentSnapshot {
                    agent_id: record.id,
                    status: record.status,
                    free_vram_mb: record.free_vram_mb,
                    running_jobs: record.running_jobs,
                    last_heartbeat_age_secs: now.duration_since(record.last_heartbeat).as_secs(),
                })
                .collect(),
        )
    } else {
        None
    };

    SystemStatus {
        total_agents: stats.total,
        healthy_agents: stats.healthy,
        uptime_secs: state.uptime_secs(),
        agents,
    }
}

/// `GetPublicKey` / `POST /rpc/public-key`.
#[must_use]
pub fn get_public_key(state: &AppState) -> PublicKeyResponse {
    let info = state.signing.public_key_info();
    PublicKeyResponse {
        pem: info.pem,
        algorithm: info.algorithm,
        issuer: info.issuer,
    }
}
