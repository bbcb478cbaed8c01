// Pro-team game schedule, reduced to games-in-window counts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::player::ProTeamId;
use crate::window::ScoringWindow;

/// A single pro game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub home_pro_team_id: ProTeamId,
    pub away_pro_team_id: ProTeamId,
    pub date: DateTime<Utc>,
}

/// Number of games each pro team plays inside a scoring window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GamesInWindow {
    counts: HashMap<ProTeamId, u32>,
}

impl GamesInWindow {
    /// Count games falling inside `window`. Duplicate game entries (the same
    /// matchup on the same instant reported twice) are counted once.
    pub fn from_games(games: &[Game], window: &ScoringWindow) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut counts: HashMap<ProTeamId, u32> = HashMap::new();
        for game in games.iter().filter(|g| window.contains(g.date)) {
            if !seen.insert((game.home_pro_team_id, game.away_pro_team_id, game.date)) {
                continue;
            }
            *counts.entry(game.home_pro_team_id).or_insert(0) += 1;
            *counts.entry(game.away_pro_team_id).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn for_team(&self, team: ProTeamId) -> u32 {
        self.counts.get(&team).copied().unwrap_or(0)
    }

    pub fn team_count(&self) -> usize {
        self.counts.len()
    }
}
