//! The liveness/health/circuit state machine.
//!
//! Three event sources mutate an [`AgentRecord`]'s `status`: heartbeat apply
//! (A), circuit-breaker events (B), and the periodic cleanup tick (C). Each
//! is a free function here so the registry can run them inside a single
//! write-lock critical section without re-deriving the rules per caller.

use std::collections::HashMap;
use std::time::Instant;

use coordinator_primitives::AgentId;
use tracing::{debug, info};

use crate::config::RegistryConfig;
use crate::record::{AgentRecord, AgentStatus, HeartbeatInput};

const DEGRADED_VRAM_UTIL: f64 = 0.9;
const DEGRADED_CPU_PERCENT: f64 = 90.0;
const DEGRADED_FREE_VRAM_MB: i64 = 512;

const RECOVER_VRAM_UTIL: f64 = 0.7;
const RECOVER_CPU_PERCENT: f64 = 70.0;

const CLEANUP_RECOVER_FREE_VRAM_MB: i64 = 2048;
const CLEANUP_RECOVER_CPU_PERCENT: f64 = 80.0;

/// (A) Applies a heartbeat to a record: refreshes resource fields and
/// re-evaluates the Healthy/Degraded boundary. Never moves a record out of
/// `Offline` or `HalfOpen` — those are owned by the circuit breaker and the
/// cleanup tick respectively.
pub fn apply_heartbeat(record: &mut AgentRecord, input: HeartbeatInput, now: Instant) {
    record.free_vram_mb = input.free_vram_mb.clamp(0, record.total_vram_mb.max(0));
    record.free_ram_mb = input.free_ram_mb.clamp(0, record.total_ram_mb.max(0));
    record.running_jobs = input.running_jobs.clamp(0, record.max_jobs.max(0));
    record.queued_jobs = input.queued_jobs.max(0);
    record.cpu_percent = input.cpu_percent;
    record.rtt_ms = input.rtt_ms;
    record.last_heartbeat = now;

    match record.status {
        AgentStatus::Healthy => {
            if is_under_pressure(record) {
                record.status = AgentStatus::Degraded;
                info!(agent_id = %record.id, "agent degraded under resource pressure");
            }
        }
        AgentStatus::Degraded => {
            if record.vram_utilization() < RECOVER_VRAM_UTIL && record.cpu_percent < RECOVER_CPU_PERCENT {
                record.status = AgentStatus::Healthy;
                record.failure_count = 0;
                info!(agent_id = %record.id, "agent recovered to healthy");
            }
        }
        AgentStatus::HalfOpen | AgentStatus::Offline => {}
    }
}

fn is_under_pressure(record: &AgentRecord) -> bool {
    record.vram_utilization() > DEGRADED_VRAM_UTIL
        || record.cpu_percent > DEGRADED_CPU_PERCENT
        || record.free_vram_mb < DEGRADED_FREE_VRAM_MB
}

/// (B) Records a failure against the circuit breaker, opening the circuit
/// once `failure_threshold` consecutive failures have been recorded.
pub fn record_failure(record: &mut AgentRecord, now: Instant, config: &RegistryConfig) {
    record.failure_count += 1;
    record.success_count = 0;
    record.last_failure_time = Some(now);

    if record.failure_count >= config.failure_threshold {
        record.status = AgentStatus::Offline;
        record.next_retry_time = Some(now + config.recovery_timeout);
        info!(
            agent_id = %record.id,
            failure_count = record.failure_count,
            "circuit opened after repeated failures"
        );
    }
}

/// (B) Records a success against the circuit breaker. Closes the circuit
/// (transitioning `HalfOpen` -> `Healthy`) once `success_threshold`
/// consecutive successes have been recorded from a probe window.
pub fn record_success(record: &mut AgentRecord, config: &RegistryConfig) {
    record.success_count += 1;
    record.failure_count = 0;

    if record.status == AgentStatus::HalfOpen && record.success_count >= config.success_threshold {
        record.status = AgentStatus::Healthy;
        record.success_count = 0;
        info!(agent_id = %record.id, "circuit closed after successful probes");
    }
}

/// Outcome of one cleanup tick: ids removed outright (heartbeat death).
pub struct CleanupOutcome {
    /// Agent ids removed from the map because their heartbeat expired.
    pub removed: Vec<AgentId>,
}

/// (C) Runs every timer-driven transition and heartbeat-death removal for
/// the whole map inside one critical section, as required by §5's ordering
/// guarantee ("the tick is idempotent" and torn reads are disallowed).
pub fn cleanup_tick(
    records: &mut HashMap<AgentId, AgentRecord>,
    now: Instant,
    config: &RegistryConfig,
) -> CleanupOutcome {
    let mut removed = Vec::new();

    records.retain(|id, record| {
        if now.duration_since(record.last_heartbeat) > config.heartbeat_timeout {
            debug!(agent_id = %id, "agent removed after heartbeat timeout");
            removed.push(id.clone());
            return false;
        }
        true
    });

    for record in records.values_mut() {
        match record.status {
            AgentStatus::Offline => {
                if record.next_retry_time.is_some_and(|retry| now > retry) {
                    record.status = AgentStatus::HalfOpen;
                    record.next_retry_time = Some(now + config.half_open_timeout);
                    info!(agent_id = %record.id, "circuit probing recovery (half-open)");
                }
            }
            AgentStatus::HalfOpen => {
                if record.next_retry_time.is_some_and(|retry| now > retry) {
                    record.status = AgentStatus::Offline;
                    record.next_retry_time = Some(now + config.recovery_timeout);
                    info!(agent_id = %record.id, "half-open probe window expired, circuit re-opened");
                }
            }
            AgentStatus::Degraded => {
                if record.free_vram_mb > CLEANUP_RECOVER_FREE_VRAM_MB
                    && record.cpu_percent < CLEANUP_RECOVER_CPU_PERCENT
                {
                    record.status = AgentStatus::Healthy;
                    record.failure_count = 0;
                    info!(agent_id = %record.id, "agent recovered to healthy during cleanup");
                }
            }
            AgentStatus::Healthy => {}
        }
    }

    CleanupOutcome { removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RegisterInput;
    use std::collections::{HashMap as StdHashMap, HashSet};
    use std::time::Duration;

    fn base_record(now: Instant) -> AgentRecord {
        AgentRecord::from_registration(
            RegisterInput {
                id: AgentId::new("a1").unwrap(),
                endpoint: "127.0.0.1:9000".into(),
                total_vram_mb: 8192,
                total_ram_mb: 16384,
                max_jobs: 4,
                supported_models: HashSet::new(),
                capabilities: StdHashMap::new(),
            },
            now,
        )
    }

    #[test]
    fn heartbeat_degrades_on_vram_pressure() {
        let now = Instant::now();
        let mut record = base_record(now);
        apply_heartbeat(
            &mut record,
            HeartbeatInput {
                free_vram_mb: 400,
                free_ram_mb: 8000,
                running_jobs: 1,
                queued_jobs: 0,
                cpu_percent: 10.0,
                rtt_ms: 5.0,
            },
            now,
        );
        assert_eq!(record.status, AgentStatus::Degraded);
    }

    #[test]
    fn heartbeat_never_promotes_out_of_offline() {
        let now = Instant::now();
        let mut record = base_record(now);
        record.status = AgentStatus::Offline;
        apply_heartbeat(
            &mut record,
            HeartbeatInput {
                free_vram_mb: 8000,
                free_ram_mb: 16000,
                running_jobs: 0,
                queued_jobs: 0,
                cpu_percent: 1.0,
                rtt_ms: 1.0,
            },
            now,
        );
        assert_eq!(record.status, AgentStatus::Offline);
    }

    #[test]
    fn exactly_threshold_failures_opens_circuit() {
        let now = Instant::now();
        let config = RegistryConfig::default();
        let mut record = base_record(now);

        for _ in 0..(config.failure_threshold - 1) {
            record_failure(&mut record, now, &config);
        }
        assert_eq!(record.status, AgentStatus::Healthy);

        record_failure(&mut record, now, &config);
        assert_eq!(record.status, AgentStatus::Offline);
        assert_eq!(record.next_retry_time, Some(now + config.recovery_timeout));
    }

    #[test]
    fn half_open_recovers_after_success_threshold() {
        let now = Instant::now();
        let config = RegistryConfig::default();
        let mut record = base_record(now);
        record.status = AgentStatus::HalfOpen;

        record_success(&mut record, &config);
        assert_eq!(record.status, AgentStatus::HalfOpen);
        record_success(&mut record, &config);
        assert_eq!(record.status, AgentStatus::Healthy);
        assert_eq!(record.failure_count, 0);
    }

    #[test]
    fn cleanup_removes_dead_agents_and_rotates_circuit_timers() {
        let now = Instant::now();
        let config = RegistryConfig::default();
        let mut records = StdHashMap::new();

        let mut dead = base_record(now);
        dead.last_heartbeat = now - config.heartbeat_timeout - Duration::from_secs(1);
        records.insert(dead.id.clone(), dead);

        let mut offline = base_record(now);
        offline.id = AgentId::new("a2").unwrap();
        offline.status = AgentStatus::Offline;
        offline.next_retry_time = Some(now - Duration::from_secs(1));
        records.insert(offline.id.clone(), offline);

        let outcome = cleanup_tick(&mut records, now, &config);

        assert_eq!(outcome.removed.len(), 1);
        assert!(!records.contains_key(&AgentId::new("a1").unwrap()));
        assert_eq!(
            records[&AgentId::new("a2").unwrap()].status,
            AgentStatus::HalfOpen
        );
    }
}
