//! Shared application state handed to every Axum handler.

use std::sync::Arc;
use std::time::Instant;

use coordinator_primitives::Clock;
use coordinator_registry::AgentRegistry;
use coordinator_scheduler::Scheduler;
use coordinator_signing::SigningAuthority;

use crate::config::CoordinatorConfig;

/// Everything a request handler needs: the registry, the scheduler built
/// over it, the signing authority, resolved configuration, and the
/// coordinator's start time for uptime reporting.
#[derive(Clone)]
pub struct AppState {
    pub registry: AgentRegistry,
    pub scheduler: Arc<Scheduler>,
    pub signing: Arc<SigningAuthority>,
    pub config: CoordinatorConfig,
    pub clock: Arc<dyn Clock>,
    pub started_at: Instant,
}

impl AppState {
    /// Builds application state over an already-constructed registry,
    /// scheduler, and signing authority.
    #[must_use]
    pub fn new(
        registry: AgentRegistry,
        scheduler: Arc<Scheduler>,
        signing: Arc<SigningAuthority>,
        config: CoordinatorConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let started_at = clock.now();
        Self {
            registry,
            scheduler,
            signing,
            config,
            clock,
            started_at,
        }
    }

    /// Seconds elapsed since construction.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.clock
            .now()
            .duration_since(self.started_at)
            .as_secs()
    }
}
