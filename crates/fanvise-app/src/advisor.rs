// Public entry point: one request in, one response out.
//
// Stages: identifier check, window, aggregation, compute, composition. The
// identifier check returns before any provider call. Everything after it runs
// in a spawned task so a panic surfaces as an internal-error response.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use fanvise_core::config::Config;
use fanvise_core::moves::RankedMove;
use fanvise_core::snapshot::LeagueIds;
use fanvise_core::window::WindowError;
use fanvise_engine::pipeline::{compute_moves, EngineSettings};
use fanvise_engine::window::{resolve_window, CalendarError, LeagueCalendar};
use fanvise_llm::client::LlmClient;
use fanvise_llm::compose::{Composer, CompositionInput};
use fanvise_llm::template::{FailureKind, Language};

use crate::aggregate::{aggregate, AggregationError, AggregatorSettings};
use crate::provider::LeagueDataProvider;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdviceRequest {
    pub team_id: Option<String>,
    pub league_id: Option<String>,
    pub language: Language,
    pub query: String,
    /// Attach intermediate results to the response.
    pub eval_mode: bool,
}

impl AdviceRequest {
    /// Both identifiers, when present and non-blank.
    fn ids(&self) -> Option<LeagueIds> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        Some(LeagueIds {
            league_id: non_blank(&self.league_id)?,
            team_id: non_blank(&self.team_id)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdviceResponse {
    pub text: String,
    /// Empty whenever `error` is set.
    pub moves: Vec<RankedMove>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_context: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("no active team or league selected")]
    MissingIdentifiers,

    #[error("invalid league calendar: {0}")]
    Calendar(#[from] CalendarError),

    #[error("could not resolve scoring window: {0}")]
    Window(#[from] WindowError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AdviceError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            AdviceError::MissingIdentifiers => FailureKind::MissingIdentifiers,
            AdviceError::Aggregation(_) => FailureKind::DataUnavailable,
            AdviceError::Calendar(_) | AdviceError::Window(_) | AdviceError::Internal(_) => {
                FailureKind::Internal
            }
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            AdviceError::MissingIdentifiers | AdviceError::Calendar(_) => "configuration",
            AdviceError::Window(_) => "window",
            AdviceError::Aggregation(_) => "aggregation",
            AdviceError::Internal(_) => "internal",
        }
    }
}

struct Inner {
    provider: Arc<dyn LeagueDataProvider>,
    calendar: LeagueCalendar,
    aggregation: AggregatorSettings,
    engine: EngineSettings,
    composer: Composer,
}

/// Cheap to clone; clones share the provider and composer.
#[derive(Clone)]
pub struct Advisor {
    inner: Arc<Inner>,
}

impl Advisor {
    pub fn new(
        provider: Arc<dyn LeagueDataProvider>,
        calendar: LeagueCalendar,
        aggregation: AggregatorSettings,
        engine: EngineSettings,
        composer: Composer,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                calendar,
                aggregation,
                engine,
                composer,
            }),
        }
    }

    pub fn from_config(
        config: &Config,
        provider: Arc<dyn LeagueDataProvider>,
    ) -> Result<Self, AdviceError> {
        let calendar = LeagueCalendar::from_config(&config.league.calendar)?;
        let client = LlmClient::from_config(config);
        if client.is_enabled() {
            info!("LLM narration enabled (model {})", config.strategy.llm.model);
        } else {
            info!("LLM narration disabled (no API key), using templates");
        }
        Ok(Self::new(
            provider,
            calendar,
            AggregatorSettings::from_config(config),
            EngineSettings::from_strategy(&config.strategy),
            Composer::new(client, &config.strategy.llm),
        ))
    }

    pub async fn advise(&self, request: AdviceRequest) -> AdviceResponse {
        self.advise_at(request, Utc::now()).await
    }

    /// `advise` with an explicit clock.
    pub async fn advise_at(&self, request: AdviceRequest, now: DateTime<Utc>) -> AdviceResponse {
        let started = Instant::now();
        let team_id = request.team_id.clone().unwrap_or_default();
        let league_id = request.league_id.clone().unwrap_or_default();

        let Some(ids) = request.ids() else {
            let err = AdviceError::MissingIdentifiers;
            warn!(
                stage = err.stage(),
                team_id = %team_id,
                league_id = %league_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "{err}"
            );
            return self.failure(&err, &request);
        };

        let inner = Arc::clone(&self.inner);
        let task_request = request.clone();
        let outcome = tokio::spawn(async move { inner.run(ids, &task_request, now).await })
            .await
            .unwrap_or_else(|join_err| Err(AdviceError::Internal(join_err.to_string())));

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(response) => {
                info!(
                    team_id = %team_id,
                    league_id = %league_id,
                    moves = response.moves.len(),
                    elapsed_ms,
                    "advice ready"
                );
                response
            }
            Err(err) => {
                error!(
                    stage = err.stage(),
                    team_id = %team_id,
                    league_id = %league_id,
                    elapsed_ms,
                    "advice failed: {err}"
                );
                self.failure(&err, &request)
            }
        }
    }

    fn failure(&self, err: &AdviceError, request: &AdviceRequest) -> AdviceResponse {
        let composition = self
            .inner
            .composer
            .compose_error(err.failure_kind(), request.language);
        AdviceResponse {
            text: composition.text,
            moves: Vec::new(),
            error: Some(err.to_string()),
            debug_context: request.eval_mode.then(|| {
                json!({
                    "stage": err.stage(),
                    "error": err.to_string(),
                    "composition": composition.source,
                })
            }),
        }
    }
}

impl Inner {
    async fn run(
        &self,
        ids: LeagueIds,
        request: &AdviceRequest,
        now: DateTime<Utc>,
    ) -> Result<AdviceResponse, AdviceError> {
        let started = Instant::now();

        let window = resolve_window(now, &self.calendar)?;
        debug!(window = %window.label(), "window resolved");

        let snapshot = aggregate(self.provider.as_ref(), &ids, window, &self.aggregation).await?;
        let snapshot = Arc::new(snapshot);
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation finished"
        );

        let computation = compute_moves(Arc::clone(&snapshot), &self.engine).await;
        debug!(
            ranked = computation.ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "compute finished"
        );

        let input = CompositionInput {
            team_name: snapshot.team_name.clone(),
            window_label: window.label(),
            matchup: snapshot.matchup.clone(),
            games_remaining: snapshot.roster_games_remaining(),
            moves: computation.ranked.clone(),
            query: request.query.clone(),
            language: request.language,
        };
        let composition = self.composer.compose(&input).await;
        debug!(
            source = ?composition.source,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "composition finished"
        );

        let debug_context = request.eval_mode.then(|| {
            json!({
                "window": {
                    "start": window.start(),
                    "end": window.end(),
                    "label": window.label(),
                },
                "league_average_fpts": snapshot.league_average_fpts,
                "roster_games_remaining": input.games_remaining,
                "drop_scores": computation.drop_scores,
                "stream_scores": computation.stream_scores,
                "candidates": computation.candidates,
                "simulated": computation.simulated,
                "composition": {
                    "source": composition.source,
                    "fallback_reason": composition.fallback_reason,
                },
            })
        });

        Ok(AdviceResponse {
            text: composition.text,
            moves: computation.ranked,
            error: None,
            debug_context,
        })
    }
}
