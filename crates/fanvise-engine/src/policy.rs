// Tunable scoring weights and confidence rules.
//
// Every number the drop and stream scorers use lives here, loaded from
// `strategy.toml [scoring]` and `[confidence]`.

use fanvise_core::config::{ConfidenceConfig, ScoringConfig};
use fanvise_core::moves::Confidence;
use fanvise_core::player::{FreeAgentPlayer, InjuryStatus, RosterPlayer};

/// Weights for the drop and stream heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    pub performance_weight: f64,
    pub unavailable_weight: f64,
    pub questionable_weight: f64,
    pub schedule_weight: f64,
    pub reference_games: f64,
    pub production_weight: f64,
    pub volume_weight: f64,
    pub volume_cap: f64,
    pub questionable_stream_factor: f64,
}

impl ScoringPolicy {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            performance_weight: config.performance_weight,
            unavailable_weight: config.unavailable_weight,
            questionable_weight: config.questionable_weight,
            schedule_weight: config.schedule_weight,
            reference_games: config.reference_games.max(1.0),
            production_weight: config.production_weight,
            volume_weight: config.volume_weight,
            volume_cap: config.volume_cap,
            questionable_stream_factor: config.questionable_stream_factor,
        }
    }

    /// Droppability of a rostered player. Three additive parts: how far the
    /// season average trails the league baseline, availability, and how few
    /// games the player's team has left in the window.
    pub fn drop_score(&self, avg_fpts: f64, games: u32, status: InjuryStatus, baseline: f64) -> f64 {
        let performance = if baseline > 0.0 && avg_fpts < baseline {
            (baseline - avg_fpts.max(0.0)) / baseline * self.performance_weight
        } else {
            0.0
        };

        let availability = if status.is_unavailable() {
            self.unavailable_weight
        } else if status.is_unresolved() {
            self.questionable_weight
        } else {
            0.0
        };

        let games = f64::from(games);
        let schedule = if games < self.reference_games {
            (self.reference_games - games) / self.reference_games * self.schedule_weight
        } else {
            0.0
        };

        performance + availability + schedule
    }

    /// Streaming value of a free agent: production relative to the baseline
    /// plus capped game volume, discounted for an open injury tag, in [0, 100].
    pub fn stream_score(&self, avg_fpts: f64, games: u32, status: InjuryStatus, baseline: f64) -> f64 {
        if games == 0 || status.is_unavailable() {
            return 0.0;
        }
        let production = if baseline > 0.0 {
            avg_fpts.max(0.0) / baseline * self.production_weight
        } else {
            0.0
        };
        let volume = (f64::from(games) / self.reference_games).min(self.volume_cap) * self.volume_weight;

        let mut score = production + volume;
        if status.is_unresolved() {
            score *= self.questionable_stream_factor;
        }
        if score.is_finite() {
            score.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

/// Rules that downgrade a move's confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidencePolicy {
    pub min_games_played: u32,
    pub low_ownership_pct: f64,
}

impl ConfidencePolicy {
    pub fn from_config(config: &ConfidenceConfig) -> Self {
        Self {
            min_games_played: config.min_games_played,
            low_ownership_pct: config.low_ownership_pct,
        }
    }

    /// Confidence label and warnings for swapping `drop` for `add`.
    pub fn assess(&self, drop: &RosterPlayer, add: &FreeAgentPlayer) -> (Confidence, Vec<String>) {
        let mut confidence = Confidence::High;
        let mut warnings = Vec::new();

        if add.games_played < self.min_games_played {
            confidence = confidence.lowered();
            warnings.push(format!(
                "{} has only {} games played this season",
                add.name, add.games_played
            ));
        }
        if add.injury_status.is_unresolved() {
            confidence = confidence.lowered();
            warnings.push(format!("{} is listed {}", add.name, add.injury_status));
        }
        if drop.injury_status.is_unresolved() {
            confidence = confidence.lowered();
            warnings.push(format!(
                "{} is listed {} and may return sooner than expected",
                drop.name, drop.injury_status
            ));
        }
        if add.percent_owned() < self.low_ownership_pct {
            confidence = confidence.lowered();
            warnings.push(format!(
                "{} is rostered in only {:.1}% of leagues",
                add.name,
                add.percent_owned()
            ));
        }

        (confidence, warnings)
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self::from_config(&ConfidenceConfig::default())
    }
}
