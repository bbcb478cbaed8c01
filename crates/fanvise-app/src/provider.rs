// League data provider port.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use fanvise_core::player::{PlayerId, PlayerRecord};
use fanvise_core::schedule::Game;
use fanvise_core::slot::RosterSlotConfiguration;
use fanvise_core::snapshot::{LeagueIds, MatchupScore};
use fanvise_core::window::ScoringWindow;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("team {team_id} not found in league {league_id}")]
    TeamNotFound { league_id: String, team_id: String },

    #[error("no {0} in snapshot")]
    Missing(&'static str),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A team's roster as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRoster {
    pub team_name: String,
    pub players: Vec<PlayerRecord>,
}

/// Source of league data for one run. Implementations must be shareable
/// across the aggregator's concurrent fetches.
#[async_trait]
pub trait LeagueDataProvider: Send + Sync {
    async fn fetch_roster(&self, ids: &LeagueIds) -> Result<TeamRoster, ProviderError>;

    /// Players not on any fantasy roster.
    async fn fetch_free_agents(&self, ids: &LeagueIds) -> Result<Vec<PlayerRecord>, ProviderError>;

    /// Pro games overlapping `window`. Games outside it may be included.
    async fn fetch_schedule(
        &self,
        ids: &LeagueIds,
        window: &ScoringWindow,
    ) -> Result<Vec<Game>, ProviderError>;

    async fn fetch_slot_config(
        &self,
        ids: &LeagueIds,
    ) -> Result<RosterSlotConfiguration, ProviderError>;

    async fn fetch_matchup(&self, ids: &LeagueIds) -> Result<MatchupScore, ProviderError>;

    /// Recent injury notes for a player. Auxiliary: callers treat a failure
    /// as "no data".
    async fn fetch_player_notes(&self, _player_id: PlayerId) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}
