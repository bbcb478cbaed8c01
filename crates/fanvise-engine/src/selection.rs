// Candidate selection: threshold, sort, cap.

use std::cmp::Ordering;

use serde::Serialize;

use fanvise_core::config::SelectionConfig;
use fanvise_core::moves::{DropScore, StreamScore};
use fanvise_core::player::PlayerId;

/// Thresholds and caps bounding the simulated pair count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionLimits {
    pub drop_threshold: f64,
    pub max_drop_candidates: usize,
    pub stream_threshold: f64,
    pub max_stream_candidates: usize,
    pub max_ranked_moves: usize,
}

impl SelectionLimits {
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self {
            drop_threshold: config.drop_threshold,
            max_drop_candidates: config.max_drop_candidates,
            stream_threshold: config.stream_threshold,
            max_stream_candidates: config.max_stream_candidates,
            max_ranked_moves: config.max_ranked_moves,
        }
    }

    /// Upper bound on (drop, add) pairs handed to the simulator.
    pub fn max_pairs(&self) -> usize {
        self.max_drop_candidates * self.max_stream_candidates
    }
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self::from_config(&SelectionConfig::default())
    }
}

/// The shortlists whose cartesian product gets simulated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateSet {
    pub drops: Vec<DropScore>,
    pub streams: Vec<StreamScore>,
}

impl CandidateSet {
    pub fn pair_count(&self) -> usize {
        self.drops.len() * self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pair_count() == 0
    }

    pub fn drop_score(&self, player_id: PlayerId) -> Option<&DropScore> {
        self.drops.iter().find(|d| d.player_id == player_id)
    }

    pub fn stream_score(&self, player_id: PlayerId) -> Option<&StreamScore> {
        self.streams.iter().find(|s| s.player_id == player_id)
    }
}

fn by_score_desc(a_score: f64, a_id: PlayerId, b_score: f64, b_id: PlayerId) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then(a_id.cmp(&b_id))
}

/// Keep drop candidates at or above the threshold and stream candidates at or
/// above theirs with games left, best first, capped.
pub fn select_candidates(
    drops: &[DropScore],
    streams: &[StreamScore],
    limits: &SelectionLimits,
) -> CandidateSet {
    let mut drops: Vec<DropScore> = drops
        .iter()
        .filter(|d| d.score.is_finite() && d.score >= limits.drop_threshold)
        .cloned()
        .collect();
    drops.sort_by(|a, b| by_score_desc(a.score, a.player_id, b.score, b.player_id));
    drops.truncate(limits.max_drop_candidates);

    let mut streams: Vec<StreamScore> = streams
        .iter()
        .filter(|s| s.score.is_finite() && s.score >= limits.stream_threshold && s.games_remaining > 0)
        .cloned()
        .collect();
    streams.sort_by(|a, b| by_score_desc(a.score, a.player_id, b.score, b.player_id));
    streams.truncate(limits.max_stream_candidates);

    CandidateSet { drops, streams }
}
