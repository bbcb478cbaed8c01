// Move simulation: every (drop, add) pair is projected over the window in its
// own task. A pair that errors or panics is logged and left out; the rest of
// the batch is unaffected.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use fanvise_core::moves::SimulatedMove;
use fanvise_core::player::{PlayerId, PlayerProfile};
use fanvise_core::snapshot::LeagueSnapshot;

use crate::lineup::{best_lineup, overflow};
use crate::policy::ConfidencePolicy;
use crate::selection::CandidateSet;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("drop candidate {0} is not on the roster")]
    UnknownDrop(PlayerId),
    #[error("add candidate {0} is not an available free agent")]
    UnknownAdd(PlayerId),
    #[error("projection for drop {drop} / add {add} is not a finite number")]
    NonFinite { drop: PlayerId, add: PlayerId },
}

/// Points a player is expected to contribute over the window. Players who
/// will not play contribute nothing.
pub fn window_value(player: &PlayerProfile, snapshot: &LeagueSnapshot) -> f64 {
    if player.injury_status.is_unavailable() {
        return 0.0;
    }
    player.avg_fpts.max(0.0) * f64::from(snapshot.games_for(player))
}

fn lineup_total(players: &[&PlayerProfile], snapshot: &LeagueSnapshot) -> f64 {
    let values: Vec<f64> = players.iter().map(|p| window_value(p, snapshot)).collect();
    best_lineup(players, &values, &snapshot.slots).total
}

/// Project a single swap.
pub fn simulate_pair(
    snapshot: &LeagueSnapshot,
    drop_id: PlayerId,
    add_id: PlayerId,
    confidence: &ConfidencePolicy,
) -> Result<SimulatedMove, SimulationError> {
    let drop = snapshot
        .roster_player(drop_id)
        .ok_or(SimulationError::UnknownDrop(drop_id))?;
    let add = snapshot
        .free_agent(add_id)
        .ok_or(SimulationError::UnknownAdd(add_id))?;

    let before: Vec<&PlayerProfile> = snapshot.roster.iter().map(|p| &**p).collect();
    let after: Vec<&PlayerProfile> = snapshot
        .roster
        .iter()
        .filter(|p| p.id != drop_id)
        .map(|p| &**p)
        .chain(std::iter::once(&**add))
        .collect();

    let baseline_window_fpts = lineup_total(&before, snapshot);
    let projected_window_fpts = lineup_total(&after, snapshot);
    let net_gain = projected_window_fpts - baseline_window_fpts;
    if !net_gain.is_finite() {
        return Err(SimulationError::NonFinite {
            drop: drop_id,
            add: add_id,
        });
    }

    let is_legal = overflow(&after, &snapshot.slots) <= overflow(&before, &snapshot.slots);

    let (confidence, mut warnings) = confidence.assess(drop, add);
    if !is_legal {
        warnings.push(format!(
            "No open roster slot for {} after dropping {}",
            add.name, drop.name
        ));
    }
    for id in [drop_id, add_id] {
        warnings.extend(snapshot.notes_for(id).iter().cloned());
    }

    Ok(SimulatedMove {
        drop_player_id: drop_id,
        add_player_id: add_id,
        is_legal,
        baseline_window_fpts,
        projected_window_fpts,
        net_gain,
        confidence,
        warnings,
    })
}

/// Simulate every pair in `candidates` concurrently.
pub async fn simulate_moves(
    snapshot: Arc<LeagueSnapshot>,
    candidates: &CandidateSet,
    confidence: ConfidencePolicy,
) -> Vec<SimulatedMove> {
    simulate_moves_with(snapshot, candidates, move |snap, drop, add| {
        simulate_pair(snap, drop, add, &confidence)
    })
    .await
}

/// Run `simulate` over the cartesian product of drop and stream candidates,
/// one task per pair. Output is ordered by pair index, never by completion.
pub async fn simulate_moves_with<F>(
    snapshot: Arc<LeagueSnapshot>,
    candidates: &CandidateSet,
    simulate: F,
) -> Vec<SimulatedMove>
where
    F: Fn(&LeagueSnapshot, PlayerId, PlayerId) -> Result<SimulatedMove, SimulationError>
        + Send
        + Sync
        + 'static,
{
    let simulate = Arc::new(simulate);
    let mut set = JoinSet::new();

    let pairs = candidates
        .drops
        .iter()
        .flat_map(|d| candidates.streams.iter().map(move |s| (d.player_id, s.player_id)));
    for (index, (drop, add)) in pairs.enumerate() {
        let snapshot = Arc::clone(&snapshot);
        let simulate = Arc::clone(&simulate);
        set.spawn(async move { (index, drop, add, (*simulate)(&*snapshot, drop, add)) });
    }

    let mut results: Vec<(usize, SimulatedMove)> = Vec::with_capacity(candidates.pair_count());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, _, _, Ok(simulated))) => {
                debug!(
                    drop_player_id = simulated.drop_player_id,
                    add_player_id = simulated.add_player_id,
                    legal = simulated.is_legal,
                    "pair {index}: net gain {:.1}",
                    simulated.net_gain
                );
                results.push((index, simulated));
            }
            Ok((index, drop, add, Err(e))) => {
                warn!(drop_player_id = drop, add_player_id = add, "pair {index} skipped: {e}");
            }
            Err(e) => {
                warn!("pair simulation task failed: {e}");
            }
        }
    }

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, m)| m).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{select_candidates, SelectionLimits};
    use crate::testutil::{free_agent, roster_player, snapshot_with, snapshot_with_slots};
    use fanvise_core::moves::{Confidence, DropScore, StreamScore};
    use fanvise_core::slot::{RosterSlotConfiguration, Slot};
    use std::collections::BTreeMap;

    fn candidates(drops: &[PlayerId], adds: &[PlayerId]) -> CandidateSet {
        CandidateSet {
            drops: drops
                .iter()
                .map(|&id| DropScore {
                    player_id: id,
                    player_name: format!("Player {id}"),
                    score: 50.0,
                })
                .collect(),
            streams: adds
                .iter()
                .map(|&id| StreamScore {
                    player_id: id,
                    player_name: format!("Player {id}"),
                    score: 50.0,
                    games_remaining: 3,
                })
                .collect(),
        }
    }

    #[test]
    fn upgrade_swap_gains_the_difference() {
        let snapshot = snapshot_with(
            vec![
                roster_player(1, "PG,G", 10.0, 1, None),
                roster_player(2, "C", 40.0, 4, None),
            ],
            vec![free_agent(10, "PG,G", 30.0, 4, None, 40.0)],
        );
        let m = simulate_pair(&snapshot, 1, 10, &ConfidencePolicy::default()).unwrap();
        assert!(m.is_legal);
        assert_eq!(m.baseline_window_fpts, 170.0);
        assert_eq!(m.projected_window_fpts, 280.0);
        assert_eq!(m.net_gain, 110.0);
        assert_eq!(m.confidence, Confidence::High);
        assert!(m.warnings.is_empty());
    }

    #[test]
    fn out_player_contributes_nothing() {
        let snapshot = snapshot_with(
            vec![roster_player(1, "PG", 50.0, 4, Some("OUT"))],
            vec![free_agent(10, "PG", 20.0, 3, None, 40.0)],
        );
        let m = simulate_pair(&snapshot, 1, 10, &ConfidencePolicy::default()).unwrap();
        assert_eq!(m.baseline_window_fpts, 0.0);
        assert_eq!(m.net_gain, 60.0);
    }

    #[test]
    fn add_without_eligible_slot_is_illegal() {
        let slots = RosterSlotConfiguration::new(BTreeMap::from([
            (Slot::PointGuard, 1),
            (Slot::Center, 1),
        ]));
        let snapshot = snapshot_with_slots(
            vec![
                roster_player(1, "PG", 10.0, 2, None),
                roster_player(2, "C", 30.0, 3, None),
            ],
            vec![free_agent(10, "C", 45.0, 4, None, 40.0)],
            slots,
        );
        let m = simulate_pair(&snapshot, 1, 10, &ConfidencePolicy::default()).unwrap();
        assert!(!m.is_legal);
        assert!(m.warnings.iter().any(|w| w.contains("No open roster slot")));
    }

    #[test]
    fn notes_are_appended_without_lowering_confidence() {
        let mut snapshot = snapshot_with(
            vec![roster_player(1, "PG", 10.0, 1, None)],
            vec![free_agent(10, "PG", 30.0, 4, None, 40.0)],
        );
        snapshot
            .player_notes
            .insert(10, vec!["Returned to practice Tuesday".to_string()]);
        let m = simulate_pair(&snapshot, 1, 10, &ConfidencePolicy::default()).unwrap();
        assert_eq!(m.confidence, Confidence::High);
        assert_eq!(m.warnings, vec!["Returned to practice Tuesday".to_string()]);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let snapshot = snapshot_with(vec![roster_player(1, "PG", 10.0, 1, None)], vec![]);
        assert_eq!(
            simulate_pair(&snapshot, 99, 10, &ConfidencePolicy::default()),
            Err(SimulationError::UnknownDrop(99))
        );
        assert_eq!(
            simulate_pair(&snapshot, 1, 10, &ConfidencePolicy::default()),
            Err(SimulationError::UnknownAdd(10))
        );
    }

    #[tokio::test]
    async fn results_follow_pair_order() {
        let snapshot = Arc::new(snapshot_with(
            vec![
                roster_player(1, "PG", 10.0, 1, None),
                roster_player(2, "SG", 12.0, 1, None),
            ],
            vec![
                free_agent(10, "PG,SG", 30.0, 4, None, 40.0),
                free_agent(11, "PG,SG", 25.0, 3, None, 40.0),
            ],
        ));
        let set = candidates(&[1, 2], &[10, 11]);
        let moves = simulate_moves(snapshot, &set, ConfidencePolicy::default()).await;
        let pairs: Vec<(PlayerId, PlayerId)> = moves
            .iter()
            .map(|m| (m.drop_player_id, m.add_player_id))
            .collect();
        assert_eq!(pairs, vec![(1, 10), (1, 11), (2, 10), (2, 11)]);
    }

    #[tokio::test]
    async fn failing_pairs_are_isolated() {
        let snapshot = Arc::new(snapshot_with(
            vec![
                roster_player(1, "PG", 10.0, 1, None),
                roster_player(2, "SG", 12.0, 1, None),
            ],
            vec![free_agent(10, "PG,SG", 30.0, 4, None, 40.0)],
        ));
        let set = candidates(&[1, 2, 3], &[10]);
        let policy = ConfidencePolicy::default();
        let moves = simulate_moves_with(snapshot, &set, move |snap, drop, add| {
            if drop == 2 {
                panic!("boom");
            }
            simulate_pair(snap, drop, add, &policy)
        })
        .await;
        // Pair (2, 10) panicked and (3, 10) has an unknown drop; (1, 10) survives.
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].drop_player_id, 1);
    }

    #[tokio::test]
    async fn empty_candidates_simulate_nothing() {
        let snapshot = Arc::new(snapshot_with(vec![], vec![]));
        let set = select_candidates(&[], &[], &SelectionLimits::default());
        let moves = simulate_moves(snapshot, &set, ConfidencePolicy::default()).await;
        assert!(moves.is_empty());
    }
}
