//! Agent record and its liveness/health/circuit status.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use coordinator_primitives::AgentId;
use serde::{Deserialize, Serialize};

/// Observable status of an agent, collapsing liveness, health, and circuit
/// state into a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Normal operation; admitted and scored without penalty.
    Healthy,
    /// Under resource pressure; admitted but scored at half weight.
    Degraded,
    /// Probing recovery after a circuit-open period; admitted, not penalized.
    HalfOpen,
    /// Circuit open or heartbeat expired; excluded from scheduling.
    Offline,
}

impl AgentStatus {
    /// Returns `true` when the admission filter of the scheduler should
    /// consider an agent in this status.
    #[must_use]
    pub const fn is_admissible(self) -> bool {
        !matches!(self, Self::Offline)
    }
}

/// Static capacity and identity declared by an agent at registration time.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Caller-supplied, unique agent identifier.
    pub id: AgentId,
    /// host:port the client uses to stream directly to the agent.
    pub endpoint: String,
    /// Total VRAM, in megabytes, declared at registration.
    pub total_vram_mb: i64,
    /// Total RAM, in megabytes, declared at registration.
    pub total_ram_mb: i64,
    /// Declared concurrency cap.
    pub max_jobs: i32,
    /// Models this agent accepts; an empty set means "accepts any model".
    pub supported_models: HashSet<String>,
    /// Opaque metadata propagated unchanged to schedulers and status queries.
    pub capabilities: HashMap<String, String>,
}

/// Latest resource and liveness report from an agent.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatInput {
    pub free_vram_mb: i64,
    pub free_ram_mb: i64,
    pub running_jobs: i32,
    pub queued_jobs: i32,
    pub cpu_percent: f64,
    pub rtt_ms: f64,
}

/// One registered agent and its full liveness/health/circuit state.
#[derive(Debug, Clone)]
pub struct AgentRecord {
    pub id: AgentId,
    pub endpoint: String,

    pub total_vram_mb: i64,
    pub total_ram_mb: i64,
    pub max_jobs: i32,
    pub supported_models: HashSet<String>,
    pub capabilities: HashMap<String, String>,

    pub free_vram_mb: i64,
    pub free_ram_mb: i64,
    pub running_jobs: i32,
    pub queued_jobs: i32,
    pub cpu_percent: f64,
    pub rtt_ms: f64,

    pub last_heartbeat: Instant,
    pub registered_at: Instant,

    pub status: AgentStatus,

    pub failure_count: i32,
    pub success_count: i32,
    pub last_failure_time: Option<Instant>,
    pub next_retry_time: Option<Instant>,
}

impl AgentRecord {
    /// Builds a fresh, `Healthy` record for a newly registered agent.
    ///
    /// Per §3's invariants, registration seeds `free_* = total_*` and resets
    /// the circuit-breaker counters (this also covers re-registration of an
    /// existing id, which replaces the prior record wholesale).
    #[must_use]
    pub fn from_registration(input: RegisterInput, now: Instant) -> Self {
        Self {
            id: input.id,
            endpoint: input.endpoint,
            total_vram_mb: input.total_vram_mb,
            total_ram_mb: input.total_ram_mb,
            max_jobs: input.max_jobs,
            supported_models: input.supported_models,
            capabilities: input.capabilities,
            free_vram_mb: input.total_vram_mb,
            free_ram_mb: input.total_ram_mb,
            running_jobs: 0,
            queued_jobs: 0,
            cpu_percent: 0.0,
            rtt_ms: 0.0,
            last_heartbeat: now,
            registered_at: now,
            status: AgentStatus::Healthy,
            failure_count: 0,
            success_count: 0,
            last_failure_time: None,
            next_retry_time: None,
        }
    }

    /// Fraction of VRAM currently in use, in `[0, 1]`.
    #[must_use]
    pub fn vram_utilization(&self) -> f64 {
        if self.total_vram_mb <= 0 {
            return 0.0;
        }
        let used = (self.total_vram_mb - self.free_vram_mb).max(0) as f64;
        used / self.total_vram_mb as f64
    }
}
