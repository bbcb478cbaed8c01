// Configuration loading and parsing (league.toml, strategy.toml, credentials.toml).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Weekday};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub strategy: StrategyConfig,
    pub fetch: FetchConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub platform: String,
    /// ESPN game code; "fba" is fantasy basketball.
    #[serde(default = "default_sport")]
    pub sport: String,
    pub season: u16,
    /// Default league for CLI runs. Requests may override it.
    #[serde(default)]
    pub league_id: Option<String>,
    /// Default team for CLI runs. Requests may override it.
    #[serde(default)]
    pub team_id: Option<String>,
    pub roster: HashMap<String, usize>,
    pub calendar: CalendarConfig,
}

fn default_sport() -> String {
    "fba".to_string()
}

/// League calendar rules used to resolve the scoring window.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// First day of a matchup week, e.g. "Mon".
    pub week_start: String,
    pub matchup_length_days: u32,
    /// League-local offset from UTC in whole hours.
    pub utc_offset_hours: i32,
    /// Anchor for multi-week periods, as a quoted "YYYY-MM-DD" string.
    #[serde(default)]
    pub season_start: Option<NaiveDate>,
}

impl CalendarConfig {
    pub fn weekday(&self) -> Option<Weekday> {
        self.week_start.trim().parse::<Weekday>().ok()
    }
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    selection: SelectionConfig,
    scoring: ScoringConfig,
    confidence: ConfidenceConfig,
    llm: LlmConfig,
    fetch: FetchConfig,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone, Default)]
pub struct StrategyConfig {
    pub selection: SelectionConfig,
    pub scoring: ScoringConfig,
    pub confidence: ConfidenceConfig,
    pub llm: LlmConfig,
}

/// Candidate thresholds and caps.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    pub drop_threshold: f64,
    pub max_drop_candidates: usize,
    pub stream_threshold: f64,
    pub max_stream_candidates: usize,
    pub max_ranked_moves: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            drop_threshold: 30.0,
            max_drop_candidates: 3,
            stream_threshold: 10.0,
            max_stream_candidates: 5,
            max_ranked_moves: 3,
        }
    }
}

/// Weights for the droppability and streaming scores.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub performance_weight: f64,
    pub unavailable_weight: f64,
    pub questionable_weight: f64,
    pub schedule_weight: f64,
    pub reference_games: f64,
    pub production_weight: f64,
    pub volume_weight: f64,
    pub volume_cap: f64,
    pub questionable_stream_factor: f64,
    pub baseline_fallback: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            performance_weight: 60.0,
            unavailable_weight: 40.0,
            questionable_weight: 10.0,
            schedule_weight: 40.0,
            reference_games: 4.0,
            production_weight: 40.0,
            volume_weight: 40.0,
            volume_cap: 1.5,
            questionable_stream_factor: 0.75,
            baseline_fallback: 20.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceConfig {
    pub min_games_played: u32,
    pub low_ownership_pct: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            min_games_played: 5,
            low_ownership_pct: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 700,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub aux_timeout_ms: u64,
    pub free_agent_limit: usize,
    pub espn_base_url: String,
    pub news_base_url: String,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
    /// ESPN session cookies, needed only for private leagues.
    pub espn_s2: Option<String>,
    pub swid: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml`,
/// `config/strategy.toml`, and (optionally) `config/credentials.toml`,
/// all relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;
    let league = league_file.league;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let strategy = StrategyConfig {
        selection: strategy_file.selection,
        scoring: strategy_file.scoring,
        confidence: strategy_file.confidence,
        llm: strategy_file.llm,
    };
    let fetch = strategy_file.fetch;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        league,
        strategy,
        fetch,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Pick the directory holding `config/` and `defaults/`: the working
/// directory when it has either, else the platform config directory
/// (e.g. `~/.config/fanvise`) when that has a `config/` folder.
pub fn resolve_base_dir(cwd: &Path) -> PathBuf {
    if cwd.join("config").exists() || cwd.join("defaults").exists() {
        return cwd.to_path_buf();
    }
    if let Some(dirs) = directories::ProjectDirs::from("com", "fanvise", "fanvise") {
        let candidate = dirs.config_dir().to_path_buf();
        if candidate.join("config").exists() {
            debug!("using platform config directory {}", candidate.display());
            return candidate;
        }
    }
    cwd.to_path_buf()
}

/// Convenience wrapper: loads config relative to the current working directory
/// (or the platform config directory). Copies defaults before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    let base = resolve_base_dir(&cwd);
    ensure_config_files(&base)?;
    load_config_from(&base)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    // League
    if config.league.roster.values().all(|&n| n == 0) {
        return Err(invalid("league.roster", "must define at least one slot"));
    }

    let cal = &config.league.calendar;
    if cal.weekday().is_none() {
        return Err(invalid(
            "league.calendar.week_start",
            format!("not a weekday: {:?}", cal.week_start),
        ));
    }
    if cal.matchup_length_days == 0 {
        return Err(invalid("league.calendar.matchup_length_days", "must be > 0"));
    }
    if cal.matchup_length_days != 7 && cal.season_start.is_none() {
        return Err(invalid(
            "league.calendar.season_start",
            format!(
                "required when matchup_length_days is {} (only weekly periods align to week_start)",
                cal.matchup_length_days
            ),
        ));
    }
    if !(-12..=14).contains(&cal.utc_offset_hours) {
        return Err(invalid(
            "league.calendar.utc_offset_hours",
            format!("must be between -12 and 14, got {}", cal.utc_offset_hours),
        ));
    }

    // Selection caps must be positive; thresholds non-negative
    let sel = &config.strategy.selection;
    let caps: &[(&str, usize)] = &[
        ("selection.max_drop_candidates", sel.max_drop_candidates),
        ("selection.max_stream_candidates", sel.max_stream_candidates),
        ("selection.max_ranked_moves", sel.max_ranked_moves),
    ];
    for (name, val) in caps {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }
    let thresholds: &[(&str, f64)] = &[
        ("selection.drop_threshold", sel.drop_threshold),
        ("selection.stream_threshold", sel.stream_threshold),
    ];
    for (name, val) in thresholds {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }

    // Scoring weights
    let s = &config.strategy.scoring;
    let weights: &[(&str, f64)] = &[
        ("scoring.performance_weight", s.performance_weight),
        ("scoring.unavailable_weight", s.unavailable_weight),
        ("scoring.questionable_weight", s.questionable_weight),
        ("scoring.schedule_weight", s.schedule_weight),
        ("scoring.production_weight", s.production_weight),
        ("scoring.volume_weight", s.volume_weight),
    ];
    for (name, val) in weights {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }
    let positive: &[(&str, f64)] = &[
        ("scoring.reference_games", s.reference_games),
        ("scoring.volume_cap", s.volume_cap),
        ("scoring.baseline_fallback", s.baseline_fallback),
    ];
    for (name, val) in positive {
        if !val.is_finite() || *val <= 0.0 {
            return Err(invalid(name, format!("must be > 0, got {val}")));
        }
    }
    if !(0.0..=1.0).contains(&s.questionable_stream_factor) {
        return Err(invalid(
            "scoring.questionable_stream_factor",
            format!(
                "must be between 0.0 and 1.0 inclusive, got {}",
                s.questionable_stream_factor
            ),
        ));
    }

    let conf = &config.strategy.confidence;
    if !(0.0..=100.0).contains(&conf.low_ownership_pct) {
        return Err(invalid(
            "confidence.low_ownership_pct",
            format!("must be a percentage, got {}", conf.low_ownership_pct),
        ));
    }

    if config.strategy.llm.timeout_secs == 0 {
        return Err(invalid("llm.timeout_secs", "must be > 0"));
    }
    if config.fetch.timeout_secs == 0 {
        return Err(invalid("fetch.timeout_secs", "must be > 0"));
    }
    if config.fetch.aux_timeout_ms == 0 {
        return Err(invalid("fetch.aux_timeout_ms", "must be > 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
