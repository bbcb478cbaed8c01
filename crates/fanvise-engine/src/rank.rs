// Final move ordering.

use std::cmp::Ordering;

use tracing::debug;

use fanvise_core::moves::{RankedMove, SimulatedMove};

use crate::selection::CandidateSet;

/// Keep legal, positive-gain moves, best first, and cap the list. Ties break
/// on drop id then add id.
pub fn rank_moves(
    simulated: &[SimulatedMove],
    candidates: &CandidateSet,
    max_ranked: usize,
) -> Vec<RankedMove> {
    let mut kept: Vec<&SimulatedMove> = simulated
        .iter()
        .filter(|m| m.is_legal && m.net_gain.is_finite() && m.net_gain > 0.0)
        .collect();
    debug!(
        "{} of {} simulated moves are legal with positive gain",
        kept.len(),
        simulated.len()
    );

    kept.sort_by(|a, b| {
        b.net_gain
            .partial_cmp(&a.net_gain)
            .unwrap_or(Ordering::Equal)
            .then(a.drop_player_id.cmp(&b.drop_player_id))
            .then(a.add_player_id.cmp(&b.add_player_id))
    });

    kept.into_iter()
        .filter_map(|m| {
            let drop = candidates.drop_score(m.drop_player_id)?;
            let add = candidates.stream_score(m.add_player_id)?;
            Some((m, drop, add))
        })
        .take(max_ranked)
        .enumerate()
        .map(|(i, (m, drop, add))| RankedMove {
            rank: i + 1,
            simulated: m.clone(),
            drop: drop.clone(),
            add: add.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanvise_core::moves::{Confidence, DropScore, StreamScore};
    use fanvise_core::player::PlayerId;

    fn sim(drop: PlayerId, add: PlayerId, gain: f64, legal: bool) -> SimulatedMove {
        SimulatedMove {
            drop_player_id: drop,
            add_player_id: add,
            is_legal: legal,
            baseline_window_fpts: 100.0,
            projected_window_fpts: 100.0 + gain,
            net_gain: gain,
            confidence: Confidence::High,
            warnings: vec![],
        }
    }

    fn candidates() -> CandidateSet {
        CandidateSet {
            drops: (1..=3)
                .map(|id| DropScore {
                    player_id: id,
                    player_name: format!("D{id}"),
                    score: 40.0,
                })
                .collect(),
            streams: (10..=12)
                .map(|id| StreamScore {
                    player_id: id,
                    player_name: format!("S{id}"),
                    score: 40.0,
                    games_remaining: 3,
                })
                .collect(),
        }
    }

    #[test]
    fn filters_illegal_and_non_positive() {
        let moves = vec![
            sim(1, 10, 50.0, false),
            sim(1, 11, 0.0, true),
            sim(2, 10, -5.0, true),
            sim(2, 11, f64::NAN, true),
            sim(3, 12, 12.0, true),
        ];
        let ranked = rank_moves(&moves, &candidates(), 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].simulated.add_player_id, 12);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].drop.player_name, "D3");
        assert_eq!(ranked[0].add.player_name, "S12");
    }

    #[test]
    fn sorts_caps_and_numbers_contiguously() {
        let moves = vec![
            sim(1, 10, 10.0, true),
            sim(1, 11, 40.0, true),
            sim(2, 10, 25.0, true),
            sim(3, 12, 30.0, true),
        ];
        let ranked = rank_moves(&moves, &candidates(), 3);
        let gains: Vec<f64> = ranked.iter().map(|m| m.net_gain()).collect();
        assert_eq!(gains, vec![40.0, 30.0, 25.0]);
        let ranks: Vec<usize> = ranked.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn equal_gains_break_on_ids() {
        let moves = vec![sim(2, 10, 20.0, true), sim(1, 11, 20.0, true), sim(1, 10, 20.0, true)];
        let ranked = rank_moves(&moves, &candidates(), 3);
        let pairs: Vec<(PlayerId, PlayerId)> = ranked
            .iter()
            .map(|m| (m.simulated.drop_player_id, m.simulated.add_player_id))
            .collect();
        assert_eq!(pairs, vec![(1, 10), (1, 11), (2, 10)]);
    }

    #[test]
    fn empty_input_is_a_valid_result() {
        assert!(rank_moves(&[], &candidates(), 3).is_empty());
    }
}
