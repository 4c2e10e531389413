//! Admission filtering, fallback relaxation, and candidate selection.

use coordinator_primitives::AgentId;
use coordinator_registry::{AgentRecord, AgentRegistry, AgentStatus};
use tracing::info;

use crate::error::{SchedulerError, SchedulerResult};
use crate::estimate::estimated_vram_requirement;
use crate::performance::PerformanceTracker;
use crate::scoring::{score_candidate, ScoreBreakdown, ScoringWeights};

/// Selects agents for inference requests using MCDA scoring over a live
/// [`AgentRegistry`] snapshot. Holds no mutable scheduling state of its own
/// beyond the performance history; selection itself is a pure function of
/// the snapshot it's given.
#[derive(Debug)]
pub struct Scheduler {
    registry: AgentRegistry,
    performance: PerformanceTracker,
    weights: ScoringWeights,
}

/// The chosen agent plus the score breakdown that won the selection.
#[derive(Debug, Clone)]
pub struct Selection {
    /// The selected agent's full record, as of the snapshot used to select it.
    pub agent: AgentRecord,
    /// The winning score breakdown, useful for diagnostics and logging.
    pub score: ScoreBreakdown,
}

impl Scheduler {
    /// Builds a scheduler over the given registry, using the default MCDA weights.
    #[must_use]
    pub fn new(registry: AgentRegistry) -> Self {
        Self::with_weights(registry, ScoringWeights::default())
    }

    /// Builds a scheduler with explicit scoring weights.
    #[must_use]
    pub fn with_weights(registry: AgentRegistry, weights: ScoringWeights) -> Self {
        Self {
            registry,
            performance: PerformanceTracker::new(),
            weights,
        }
    }

    /// Posts a `(agent_id, tokens_per_sec)` sample into the performance history.
    pub async fn record_performance_sample(&self, agent_id: AgentId, tokens_per_sec: f64) {
        self.performance.record_sample(agent_id, tokens_per_sec).await;
    }

    /// Selects the agent that maximizes weighted utility for `model`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NoAgentsAvailable`] if no agent passes the
    /// admission filter, even after the resource-constraint relaxation.
    pub async fn select(&self, model: &str) -> SchedulerResult<Selection> {
        let candidates = self.registry.list_all_agents().await;
        let required_vram = estimated_vram_requirement(model);

        let mut admitted: Vec<&AgentRecord> = candidates
            .iter()
            .filter(|record| is_admitted(record, model, required_vram))
            .collect();

        if admitted.is_empty() {
            admitted = candidates
                .iter()
                .filter(|record| record.status == AgentStatus::Healthy)
                .collect();
        }

        if admitted.is_empty() {
            return Err(SchedulerError::NoAgentsAvailable {
                model: model.to_string(),
            });
        }

        let mut scored = Vec::with_capacity(admitted.len());
        for record in admitted {
            let perf_sample = self.performance.get(&record.id).await;
            let score = score_candidate(record, perf_sample, self.weights);
            scored.push((record, score));
        }

        scored.sort_by(|(left_record, left_score), (right_record, right_score)| {
            right_score
                .total
                .partial_cmp(&left_score.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| left_record.id.as_str().cmp(right_record.id.as_str()))
        });

        let (winner, score) = scored[0];
        info!(
            agent_id = %winner.id,
            vram_score = score.vram_score,
            load_score = score.load_score,
            rtt_score = score.rtt_score,
            perf_score = score.perf_score,
            total = score.total,
            "selected agent for inference request"
        );

        Ok(Selection {
            agent: winner.clone(),
            score,
        })
    }
}

fn is_admitted(record: &AgentRecord, model: &str, required_vram: i64) -> bool {
    record.status.is_admissible()
        && record.free_vram_mb >= required_vram
        && record.running_jobs < record.max_jobs
        && (record.supported_models.is_empty() || record.supported_models.contains(model))
}
