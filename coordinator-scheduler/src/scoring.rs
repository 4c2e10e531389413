//! Weighted MCDA scoring over a registry snapshot.

use coordinator_registry::{AgentRecord, AgentStatus};

const RTT_CAP_MS: f64 = 500.0;
const PERF_CAP_TOKENS_PER_SEC: f64 = 100.0;
const NO_HISTORY_PERF_SCORE: f64 = 0.5;
const DEGRADED_PENALTY: f64 = 0.5;

/// Weights applied to the four sub-scores. Defaults are part of the
/// contract: vram 0.40, load 0.30, rtt 0.20, perf 0.10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weight applied to `vram_score`.
    pub vram: f64,
    /// Weight applied to `load_score`.
    pub load: f64,
    /// Weight applied to `rtt_score`.
    pub rtt: f64,
    /// Weight applied to `perf_score`.
    pub perf: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            vram: 0.40,
            load: 0.30,
            rtt: 0.20,
            perf: 0.10,
        }
    }
}

/// The four normalized sub-scores and the final weighted, penalty-adjusted total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Higher free VRAM scores better.
    pub vram_score: f64,
    /// Lower running-job load scores better.
    pub load_score: f64,
    /// Lower round-trip time scores better.
    pub rtt_score: f64,
    /// Recent tokens/sec performance, or the neutral default with no history.
    pub perf_score: f64,
    /// `0.40*vram + 0.30*load + 0.20*rtt + 0.10*perf`, halved if Degraded.
    pub total: f64,
}

/// Scores a single candidate against the supplied weights, using
/// `perf_sample` as the agent's EWMA tokens/sec if any history exists.
#[must_use]
pub fn score_candidate(
    record: &AgentRecord,
    perf_sample: Option<f64>,
    weights: ScoringWeights,
) -> ScoreBreakdown {
    let vram_score =
        1.0 - (record.total_vram_mb - record.free_vram_mb) as f64 / (record.total_vram_mb.max(1)) as f64;
    let load_score = 1.0 - f64::from(record.running_jobs) / f64::from(record.max_jobs.max(1));
    let rtt_score = 1.0 - (record.rtt_ms / RTT_CAP_MS).min(1.0);
    let perf_score = perf_sample.map_or(NO_HISTORY_PERF_SCORE, |tokens_per_sec| {
        (tokens_per_sec / PERF_CAP_TOKENS_PER_SEC).min(1.0)
    });

    let raw_total = weights.vram * vram_score
        + weights.load * load_score
        + weights.rtt * rtt_score
        + weights.perf * perf_score;

    let total = if record.status == AgentStatus::Degraded {
        raw_total * DEGRADED_PENALTY
    } else {
        raw_total
    };

    ScoreBreakdown {
        vram_score,
        load_score,
        rtt_score,
        perf_score,
        total,
    }
}
