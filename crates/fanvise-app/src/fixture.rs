// Offline provider backed by a JSON snapshot file.
//
// Used by `fanvise --snapshot <file>` and by the integration tests. The file
// holds one team's view of the league; the requested ids are not checked.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use fanvise_core::player::{PlayerId, PlayerRecord};
use fanvise_core::schedule::Game;
use fanvise_core::slot::RosterSlotConfiguration;
use fanvise_core::snapshot::{LeagueIds, MatchupScore};
use fanvise_core::window::ScoringWindow;

use crate::provider::{LeagueDataProvider, ProviderError, TeamRoster};

#[derive(Debug, Clone, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    team_name: String,
    #[serde(default)]
    roster: Vec<PlayerRecord>,
    #[serde(default)]
    free_agents: Vec<PlayerRecord>,
    #[serde(default)]
    games: Vec<Game>,
    /// Slot string to count, e.g. `{"PG": 1, "UTIL": 3, "BE": 3}`.
    #[serde(default)]
    slots: Option<HashMap<String, usize>>,
    #[serde(default)]
    matchup: MatchupScore,
    /// Keyed by player id as a string (JSON object keys).
    #[serde(default)]
    notes: HashMap<String, Vec<String>>,
}

pub struct SnapshotFileProvider {
    file: SnapshotFile,
}

impl SnapshotFileProvider {
    pub fn from_path(path: &Path) -> Result<Self, ProviderError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = serde_json::from_str(&contents).map_err(|source| ProviderError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            file: serde_json::from_str(json)?,
        })
    }
}

#[async_trait]
impl LeagueDataProvider for SnapshotFileProvider {
    async fn fetch_roster(&self, _ids: &LeagueIds) -> Result<TeamRoster, ProviderError> {
        Ok(TeamRoster {
            team_name: self.file.team_name.clone(),
            players: self.file.roster.clone(),
        })
    }

    async fn fetch_free_agents(&self, _ids: &LeagueIds) -> Result<Vec<PlayerRecord>, ProviderError> {
        Ok(self.file.free_agents.clone())
    }

    async fn fetch_schedule(
        &self,
        _ids: &LeagueIds,
        window: &ScoringWindow,
    ) -> Result<Vec<Game>, ProviderError> {
        Ok(self
            .file
            .games
            .iter()
            .filter(|g| window.contains(g.date))
            .cloned()
            .collect())
    }

    async fn fetch_slot_config(
        &self,
        _ids: &LeagueIds,
    ) -> Result<RosterSlotConfiguration, ProviderError> {
        self.file
            .slots
            .as_ref()
            .map(RosterSlotConfiguration::from_config)
            .ok_or(ProviderError::Missing("slot configuration"))
    }

    async fn fetch_matchup(&self, _ids: &LeagueIds) -> Result<MatchupScore, ProviderError> {
        Ok(self.file.matchup.clone())
    }

    async fn fetch_player_notes(&self, player_id: PlayerId) -> Result<Vec<String>, ProviderError> {
        Ok(self
            .file
            .notes
            .get(&player_id.to_string())
            .cloned()
            .unwrap_or_default())
    }
}
