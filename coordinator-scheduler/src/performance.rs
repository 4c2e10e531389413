//! Per-agent tokens/sec performance history, updated by an external channel
//! (the surface layer or an observability hook) via [`PerformanceTracker::record_sample`].

use std::collections::HashMap;

use coordinator_primitives::AgentId;
use tokio::sync::Mutex;

/// Tracks a rolling tokens/sec estimate per agent.
///
/// Uses a two-sample moving average rather than a textbook EWMA with a decay
/// constant: `spec.md` explicitly allows `ewma' = (ewma + sample) / 2` as a
/// valid simple implementation, and it needs no extra configuration knob.
#[derive(Debug, Default)]
pub struct PerformanceTracker {
    samples: Mutex<HashMap<AgentId, f64>>,
}

impl PerformanceTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: Mutex::new(HashMap::new()),
        }
    }

    /// Folds a fresh `(agent_id, tokens_per_sec)` sample into the running average.
    pub async fn record_sample(&self, agent_id: AgentId, tokens_per_sec: f64) {
        let mut guard = self.samples.lock().await;
        guard
            .entry(agent_id)
            .and_modify(|ewma| *ewma = (*ewma + tokens_per_sec) / 2.0)
            .or_insert(tokens_per_sec);
    }

    /// Returns the current tokens/sec estimate for an agent, if any history exists.
    pub async fn get(&self, agent_id: &AgentId) -> Option<f64> {
        self.samples.lock().await.get(agent_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_sample_seeds_the_average_directly() {
        let tracker = PerformanceTracker::new();
        let id = AgentId::new("a1").unwrap();
        tracker.record_sample(id.clone(), 80.0).await;
        assert_eq!(tracker.get(&id).await, Some(80.0));
    }

    #[tokio::test]
    async fn subsequent_samples_average_with_the_prior_value() {
        let tracker = PerformanceTracker::new();
        let id = AgentId::new("a1").unwrap();
        tracker.record_sample(id.clone(), 80.0).await;
        tracker.record_sample(id.clone(), 100.0).await;
        assert_eq!(tracker.get(&id).await, Some(90.0));
    }

    #[tokio::test]
    async fn unknown_agent_has_no_history() {
        let tracker = PerformanceTracker::new();
        assert_eq!(tracker.get(&AgentId::new("ghost").unwrap()).await, None);
    }
}
