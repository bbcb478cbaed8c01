// Scoring through ranking over one snapshot.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use fanvise_core::config::StrategyConfig;
use fanvise_core::moves::{DropScore, RankedMove, SimulatedMove, StreamScore};
use fanvise_core::snapshot::LeagueSnapshot;

use crate::policy::{ConfidencePolicy, ScoringPolicy};
use crate::rank::rank_moves;
use crate::scoring::{score_drop_candidates, score_stream_candidates};
use crate::selection::{select_candidates, CandidateSet, SelectionLimits};
use crate::simulate::simulate_moves;

/// Tunables for the compute stages, resolved once from strategy.toml.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub scoring: ScoringPolicy,
    pub limits: SelectionLimits,
    pub confidence: ConfidencePolicy,
}

impl EngineSettings {
    pub fn from_strategy(strategy: &StrategyConfig) -> Self {
        Self {
            scoring: ScoringPolicy::from_config(&strategy.scoring),
            limits: SelectionLimits::from_config(&strategy.selection),
            confidence: ConfidencePolicy::from_config(&strategy.confidence),
        }
    }
}

/// Every intermediate result of a compute run, kept for eval-mode tracing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Computation {
    pub drop_scores: Vec<DropScore>,
    pub stream_scores: Vec<StreamScore>,
    pub candidates: CandidateSet,
    pub simulated: Vec<SimulatedMove>,
    pub ranked: Vec<RankedMove>,
}

pub async fn compute_moves(snapshot: Arc<LeagueSnapshot>, settings: &EngineSettings) -> Computation {
    let started = Instant::now();

    let drop_scores = score_drop_candidates(&snapshot, &settings.scoring);
    let stream_scores = score_stream_candidates(&snapshot, &settings.scoring);
    let candidates = select_candidates(&drop_scores, &stream_scores, &settings.limits);
    debug!(
        drops = candidates.drops.len(),
        streams = candidates.streams.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "candidates selected"
    );

    let simulated = simulate_moves(snapshot, &candidates, settings.confidence.clone()).await;
    debug!(
        pairs = simulated.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation finished"
    );

    let ranked = rank_moves(&simulated, &candidates, settings.limits.max_ranked_moves);

    Computation {
        drop_scores,
        stream_scores,
        candidates,
        simulated,
        ranked,
    }
}
