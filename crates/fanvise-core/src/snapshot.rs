// The immutable per-run snapshot every scoring stage reads from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::player::{FreeAgentPlayer, PlayerId, PlayerProfile, RosterPlayer};
use crate::schedule::GamesInWindow;
use crate::slot::RosterSlotConfiguration;
use crate::window::ScoringWindow;

/// Current head-to-head score. Display context only; never used in scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupScore {
    #[serde(default)]
    pub score_for: f64,
    #[serde(default)]
    pub score_against: f64,
    #[serde(default)]
    pub opponent_name: Option<String>,
}

/// Team and league identifiers for a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueIds {
    pub league_id: String,
    pub team_id: String,
}

/// Everything the pipeline knows about one team at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct LeagueSnapshot {
    pub team_name: String,
    pub window: ScoringWindow,
    pub roster: Vec<RosterPlayer>,
    pub free_agents: Vec<FreeAgentPlayer>,
    pub games: GamesInWindow,
    pub slots: RosterSlotConfiguration,
    pub matchup: MatchupScore,
    pub league_average_fpts: f64,
    /// Injury notes from auxiliary lookups, keyed by player id. Missing
    /// entries mean no data.
    pub player_notes: HashMap<PlayerId, Vec<String>>,
}

impl LeagueSnapshot {
    pub fn games_for(&self, player: &PlayerProfile) -> u32 {
        self.games.for_team(player.pro_team_id)
    }

    pub fn roster_player(&self, id: PlayerId) -> Option<&RosterPlayer> {
        self.roster.iter().find(|p| p.id == id)
    }

    pub fn free_agent(&self, id: PlayerId) -> Option<&FreeAgentPlayer> {
        self.free_agents.iter().find(|p| p.id == id)
    }

    pub fn notes_for(&self, id: PlayerId) -> &[String] {
        self.player_notes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Games left in the window across rostered players who can play.
    pub fn roster_games_remaining(&self) -> u32 {
        self.roster
            .iter()
            .filter(|p| !p.injury_status.is_unavailable())
            .map(|p| self.games_for(p))
            .sum()
    }
}

/// League-average fantasy points per game: the mean of the roster's nonzero,
/// finite season averages, or `fallback` when there are none.
pub fn league_average_baseline(roster: &[RosterPlayer], fallback: f64) -> f64 {
    let valid: Vec<f64> = roster
        .iter()
        .map(|p| p.avg_fpts)
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if valid.is_empty() {
        return fallback;
    }
    valid.iter().sum::<f64>() / valid.len() as f64
}
