//! The agent registry: single source of truth for liveness and resource
//! state, synchronized by one reader-writer lock over the agent map.

use std::collections::HashMap;
use std::sync::Arc;

use coordinator_primitives::{AgentId, Clock};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::record::{AgentRecord, AgentStatus, HeartbeatInput, RegisterInput};
use crate::state;

/// Aggregate counts returned by [`AgentRegistry::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Total number of agents currently tracked.
    pub total: usize,
    /// Number of those agents in the `Healthy` status.
    pub healthy: usize,
}

/// Shared, internally-synchronized agent registry.
///
/// Cheaply cloneable: clones share the same underlying map via `Arc`, so it
/// can be handed out to many concurrent callers (handlers, the cleanup
/// ticker, the scheduler) without any of them owning it outright.
#[derive(Clone)]
pub struct AgentRegistry {
    inner: Arc<RwLock<HashMap<AgentId, AgentRecord>>>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AgentRegistry {
    /// Constructs an empty registry using the supplied clock and thresholds.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            clock,
            config,
        }
    }

    /// Returns the configuration this registry was constructed with.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers a new agent, or replaces an existing record for the same
    /// id and resets its circuit-breaker counters, per §3's invariant.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BadRequest`] if the id or endpoint is empty.
    pub async fn register(&self, input: RegisterInput) -> RegistryResult<()> {
        if input.id.as_str().trim().is_empty() {
            return Err(RegistryError::BadRequest {
                reason: "agent id cannot be empty",
            });
        }
        if input.endpoint.trim().is_empty() {
            return Err(RegistryError::BadRequest {
                reason: "endpoint cannot be empty",
            });
        }

        let now = self.clock.now();
        let record = AgentRecord::from_registration(input, now);
        let agent_id = record.id.clone();
        let mut guard = self.inner.write().await;
        guard.insert(agent_id.clone(), record);
        debug!(agent_id = %agent_id, "agent registered");
        Ok(())
    }

    /// Removes an agent from the registry outright.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the id is unknown.
    pub async fn deregister(&self, agent_id: &AgentId) -> RegistryResult<()> {
        let mut guard = self.inner.write().await;
        guard
            .remove(agent_id)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound {
                agent_id: agent_id.clone(),
            })
    }

    /// Applies a heartbeat payload to the named agent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the id is unknown.
    pub async fn update_health(
        &self,
        agent_id: &AgentId,
        heartbeat: HeartbeatInput,
    ) -> RegistryResult<()> {
        let now = self.clock.now();
        let mut guard = self.inner.write().await;
        let record = guard
            .get_mut(agent_id)
            .ok_or_else(|| RegistryError::NotFound {
                agent_id: agent_id.clone(),
            })?;
        state::apply_heartbeat(record, heartbeat, now);
        Ok(())
    }

    /// Returns a defensive copy of the named agent's record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the id is unknown.
    pub async fn get_agent(&self, agent_id: &AgentId) -> RegistryResult<AgentRecord> {
        let guard = self.inner.read().await;
        guard
            .get(agent_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                agent_id: agent_id.clone(),
            })
    }

    /// Returns defensive copies of every agent currently in `Healthy` status.
    pub async fn list_healthy_agents(&self) -> Vec<AgentRecord> {
        let guard = self.inner.read().await;
        guard
            .values()
            .filter(|record| record.status == AgentStatus::Healthy)
            .cloned()
            .collect()
    }

    /// Returns defensive copies of every agent currently tracked.
    pub async fn list_all_agents(&self) -> Vec<AgentRecord> {
        let guard = self.inner.read().await;
        guard.values().cloned().collect()
    }

    /// Returns `(total, healthy)` counts in a single pass.
    pub async fn stats(&self) -> RegistryStats {
        let guard = self.inner.read().await;
        let total = guard.len();
        let healthy = guard
            .values()
            .filter(|record| record.status == AgentStatus::Healthy)
            .count();
        RegistryStats { total, healthy }
    }

    /// Records a successful call against the named agent's circuit breaker.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the id is unknown.
    pub async fn record_success(&self, agent_id: &AgentId) -> RegistryResult<()> {
        let mut guard = self.inner.write().await;
        let record = guard
            .get_mut(agent_id)
            .ok_or_else(|| RegistryError::NotFound {
                agent_id: agent_id.clone(),
            })?;
        state::record_success(record, &self.config);
        Ok(())
    }

    /// Records a failed call against the named agent's circuit breaker.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the id is unknown.
    pub async fn record_failure(&self, agent_id: &AgentId) -> RegistryResult<()> {
        let now = self.clock.now();
        let mut guard = self.inner.write().await;
        let record = guard
            .get_mut(agent_id)
            .ok_or_else(|| RegistryError::NotFound {
                agent_id: agent_id.clone(),
            })?;
        state::record_failure(record, now, &self.config);
        Ok(())
    }

    /// Returns the current circuit/health status of the named agent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the id is unknown.
    pub async fn circuit_state(&self, agent_id: &AgentId) -> RegistryResult<AgentStatus> {
        self.get_agent(agent_id).await.map(|record| record.status)
    }

    /// Runs one cleanup tick: timer-driven transitions plus heartbeat-death
    /// removal, inside a single write-lock critical section.
    pub async fn run_cleanup_tick(&self) -> usize {
        let now = self.clock.now();
        let mut guard = self.inner.write().await;
        let outcome = state::cleanup_tick(&mut guard, now, &self.config);
        outcome.removed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinator_primitives::FixedClock;
    use std::collections::{HashMap as StdHashMap, HashSet};
    use std::time::Duration;

    fn registration(id: &str) -> RegisterInput {
        RegisterInput {
            id: AgentId::new(id).unwrap(),
            endpoint: "127.0.0.1:9000".into(),
            total_vram_mb: 8192,
            total_ram_mb: 16384,
            max_jobs: 4,
            supported_models: HashSet::new(),
            capabilities: StdHashMap::new(),
        }
    }

    #[tokio::test]
    async fn register_seeds_free_equal_total_and_healthy_status() {
        let clock = Arc::new(FixedClock::new());
        let registry = AgentRegistry::new(clock, RegistryConfig::default());
        registry.register(registration("a1")).await.unwrap();

        let record = registry
            .get_agent(&AgentId::new("a1").unwrap())
            .await
            .unwrap();
        assert_eq!(record.free_vram_mb, record.total_vram_mb);
        assert_eq!(record.status, AgentStatus::Healthy);
    }

    #[tokio::test]
    async fn reregistration_resets_circuit_breaker_counters() {
        let clock = Arc::new(FixedClock::new());
        let registry = AgentRegistry::new(clock, RegistryConfig::default());
        let id = AgentId::new("a1").unwrap();

        registry.register(registration("a1")).await.unwrap();
        registry.record_failure(&id).await.unwrap();
        registry.record_failure(&id).await.unwrap();
        assert_eq!(registry.get_agent(&id).await.unwrap().failure_count, 2);

        registry.register(registration("a1")).await.unwrap();
        assert_eq!(registry.get_agent(&id).await.unwrap().failure_count, 0);
    }

    #[tokio::test]
    async fn heartbeat_death_removes_agent_after_timeout_and_cleanup() {
        let clock = Arc::new(FixedClock::new());
        let registry = AgentRegistry::new(Arc::clone(&clock) as Arc<dyn Clock>, RegistryConfig::default());
        registry.register(registration("a1")).await.unwrap();

        clock.advance(Duration::from_secs(31));
        let removed = registry.run_cleanup_tick().await;
        assert_eq!(removed, 1);

        let id = AgentId::new("a1").unwrap();
        assert!(registry.get_agent(&id).await.is_err());
        assert!(registry.list_all_agents().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_agent_operations_return_not_found() {
        let clock = Arc::new(FixedClock::new());
        let registry = AgentRegistry::new(clock, RegistryConfig::default());
        let id = AgentId::new("ghost").unwrap();

        assert!(matches!(
            registry.get_agent(&id).await,
            Err(RegistryError::NotFound { .. })
        ));
        assert!(matches!(
            registry.deregister(&id).await,
            Err(RegistryError::NotFound { .. })
        ));
    }
}
