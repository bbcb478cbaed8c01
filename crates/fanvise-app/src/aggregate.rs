// Data aggregation: one concurrent fetch round that produces the immutable
// `LeagueSnapshot` for a run.
//
// Roster, free agents, schedule and matchup are required and joined
// fail-fast. The slot configuration and injury notes are soft: a failure
// degrades to a fallback and a log line.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use fanvise_core::config::Config;
use fanvise_core::player::{FreeAgentPlayer, InjuryStatus, PlayerId, RosterPlayer};
use fanvise_core::schedule::GamesInWindow;
use fanvise_core::slot::RosterSlotConfiguration;
use fanvise_core::snapshot::{league_average_baseline, LeagueIds, LeagueSnapshot};
use fanvise_core::window::ScoringWindow;

use crate::provider::{LeagueDataProvider, ProviderError};

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("failed to fetch {source_name}: {source}")]
    Fetch {
        source_name: &'static str,
        source: ProviderError,
    },

    #[error("fetching {source_name} timed out after {timeout_ms}ms")]
    Timeout {
        source_name: &'static str,
        timeout_ms: u64,
    },
}

impl AggregationError {
    pub fn source_name(&self) -> &'static str {
        match self {
            AggregationError::Fetch { source_name, .. } | AggregationError::Timeout { source_name, .. } => {
                source_name
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    /// Limit for each required fetch and the slot configuration.
    pub fetch_timeout: Duration,
    /// Limit for each injury-note lookup.
    pub aux_timeout: Duration,
    pub baseline_fallback: f64,
    /// Used when the provider's slot configuration is unavailable.
    pub fallback_slots: RosterSlotConfiguration,
}

impl AggregatorSettings {
    pub fn from_config(config: &Config) -> Self {
        let configured = RosterSlotConfiguration::from_config(&config.league.roster);
        let fallback_slots = if configured.is_empty() {
            RosterSlotConfiguration::standard()
        } else {
            configured
        };
        Self {
            fetch_timeout: Duration::from_secs(config.fetch.timeout_secs),
            aux_timeout: Duration::from_millis(config.fetch.aux_timeout_ms),
            baseline_fallback: config.strategy.scoring.baseline_fallback,
            fallback_slots,
        }
    }
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(8),
            aux_timeout: Duration::from_millis(1500),
            baseline_fallback: 20.0,
            fallback_slots: RosterSlotConfiguration::standard(),
        }
    }
}

/// Run a required fetch under `limit`, tagging failures with the source name.
async fn required<T, F>(source_name: &'static str, limit: Duration, fetch: F) -> Result<T, AggregationError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, fetch).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(AggregationError::Fetch {
            source_name,
            source,
        }),
        Err(_) => Err(AggregationError::Timeout {
            source_name,
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

async fn slot_config_or_fallback(
    provider: &dyn LeagueDataProvider,
    ids: &LeagueIds,
    settings: &AggregatorSettings,
) -> RosterSlotConfiguration {
    match tokio::time::timeout(settings.fetch_timeout, provider.fetch_slot_config(ids)).await {
        Ok(Ok(config)) if !config.is_empty() => config,
        Ok(Ok(_)) => {
            warn!("provider returned an empty slot configuration, using fallback");
            settings.fallback_slots.clone()
        }
        Ok(Err(e)) => {
            warn!("slot configuration unavailable ({e}), using fallback");
            settings.fallback_slots.clone()
        }
        Err(_) => {
            warn!("slot configuration fetch timed out, using fallback");
            settings.fallback_slots.clone()
        }
    }
}

/// Fetch injury notes for every player whose status is not ACTIVE. Each
/// lookup gets `aux_timeout`; failures become "no data".
async fn fetch_notes(
    provider: &dyn LeagueDataProvider,
    players: Vec<PlayerId>,
    aux_timeout: Duration,
) -> HashMap<PlayerId, Vec<String>> {
    let lookups = players.into_iter().map(|id| async move {
        match tokio::time::timeout(aux_timeout, provider.fetch_player_notes(id)).await {
            Ok(Ok(notes)) => (id, notes),
            Ok(Err(e)) => {
                debug!(player_id = id, "injury notes unavailable: {e}");
                (id, Vec::new())
            }
            Err(_) => {
                debug!(player_id = id, "injury notes lookup timed out");
                (id, Vec::new())
            }
        }
    });
    join_all(lookups)
        .await
        .into_iter()
        .filter(|(_, notes)| !notes.is_empty())
        .collect()
}

/// Build the run's snapshot for `ids` over `window`.
pub async fn aggregate(
    provider: &dyn LeagueDataProvider,
    ids: &LeagueIds,
    window: ScoringWindow,
    settings: &AggregatorSettings,
) -> Result<LeagueSnapshot, AggregationError> {
    let started = Instant::now();
    let limit = settings.fetch_timeout;

    let (team, free_agent_records, games, matchup, slots) = tokio::try_join!(
        required("roster", limit, provider.fetch_roster(ids)),
        required("free agents", limit, provider.fetch_free_agents(ids)),
        required("schedule", limit, provider.fetch_schedule(ids, &window)),
        required("matchup", limit, provider.fetch_matchup(ids)),
        async { Ok::<_, AggregationError>(slot_config_or_fallback(provider, ids, settings).await) },
    )?;
    debug!(
        roster = team.players.len(),
        free_agents = free_agent_records.len(),
        games = games.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "required fetches complete"
    );

    let roster: Vec<RosterPlayer> = team.players.iter().map(RosterPlayer::from_record).collect();

    // Unavailable free agents are dropped at construction. A player who
    // somehow shows up on both lists stays rostered.
    let mut seen: HashSet<PlayerId> = roster.iter().map(|p| p.id).collect();
    let free_agents: Vec<FreeAgentPlayer> = free_agent_records
        .iter()
        .filter_map(FreeAgentPlayer::from_record)
        .filter(|fa| seen.insert(fa.id))
        .collect();

    let flagged: Vec<PlayerId> = roster
        .iter()
        .map(|p| (p.id, p.injury_status))
        .chain(free_agents.iter().map(|p| (p.id, p.injury_status)))
        .filter(|(_, status)| *status != InjuryStatus::Active)
        .map(|(id, _)| id)
        .collect();
    let flagged_count = flagged.len();
    let player_notes = fetch_notes(provider, flagged, settings.aux_timeout).await;
    debug!(
        flagged = flagged_count,
        with_notes = player_notes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "injury notes complete"
    );

    let league_average_fpts = league_average_baseline(&roster, settings.baseline_fallback);
    let team_name = if team.team_name.trim().is_empty() {
        format!("Team {}", ids.team_id)
    } else {
        team.team_name
    };

    Ok(LeagueSnapshot {
        team_name,
        games: GamesInWindow::from_games(&games, &window),
        window,
        roster,
        free_agents,
        slots,
        matchup,
        league_average_fpts,
        player_notes,
    })
}
