// Drop and stream candidate scoring over a league snapshot.

use fanvise_core::moves::{DropScore, StreamScore};
use fanvise_core::snapshot::LeagueSnapshot;
use tracing::debug;

use crate::policy::ScoringPolicy;

/// Score every rostered player for droppability.
pub fn score_drop_candidates(snapshot: &LeagueSnapshot, policy: &ScoringPolicy) -> Vec<DropScore> {
    snapshot
        .roster
        .iter()
        .map(|player| {
            let games = snapshot.games_for(player);
            let score = policy.drop_score(
                player.avg_fpts,
                games,
                player.injury_status,
                snapshot.league_average_fpts,
            );
            debug!(
                player_id = player.id,
                games,
                status = %player.injury_status,
                "drop score {score:.1} for {}",
                player.name
            );
            DropScore {
                player_id: player.id,
                player_name: player.name.clone(),
                score,
            }
        })
        .collect()
}

/// Score every free agent for streaming value.
pub fn score_stream_candidates(snapshot: &LeagueSnapshot, policy: &ScoringPolicy) -> Vec<StreamScore> {
    snapshot
        .free_agents
        .iter()
        .map(|player| {
            let games = snapshot.games_for(player);
            StreamScore {
                player_id: player.id,
                player_name: player.name.clone(),
                score: policy.stream_score(
                    player.avg_fpts,
                    games,
                    player.injury_status,
                    snapshot.league_average_fpts,
                ),
                games_remaining: games,
            }
        })
        .collect()
}
