//! Tunable thresholds for heartbeat liveness, health pressure, and the
//! per-agent circuit breaker.

use std::time::Duration;

/// Configuration for the registry's timers and circuit-breaker thresholds.
///
/// Defaults match `spec.md` §4.1/§6 exactly; callers needing different
/// values should construct this explicitly rather than relying on `Default`
/// for production use.
#[derive(Debug, Clone, Copy)]
pub struct RegistryConfig {
    /// Age of the last heartbeat after which an agent is considered dead.
    pub heartbeat_timeout: Duration,
    /// Period between cleanup ticks.
    pub cleanup_interval: Duration,
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: i32,
    /// Consecutive successes from `HalfOpen` before the circuit closes.
    pub success_threshold: i32,
    /// How long the circuit stays open before probing recovery.
    pub recovery_timeout: Duration,
    /// How long a `HalfOpen` probe window lasts before reverting to `Offline`.
    pub half_open_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(60),
            failure_threshold: 3,
            success_threshold: 2,
            recovery_timeout: Duration::from_secs(30),
            half_open_timeout: Duration::from_secs(10),
        }
    }
}
