// fanvise command-line entry point.
//
// 1. Initialize tracing (stderr, so stdout carries only the answer)
// 2. Load config
// 3. Pick the data provider (ESPN or a snapshot file)
// 4. Run one advice request and print the result

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use fanvise_app::advisor::{AdviceRequest, Advisor};
use fanvise_app::espn::{EspnClient, EspnSettings};
use fanvise_app::fixture::SnapshotFileProvider;
use fanvise_app::provider::LeagueDataProvider;
use fanvise_core::config;
use fanvise_llm::template::Language;

#[derive(Debug, Parser)]
#[command(name = "fanvise")]
#[command(about = "Single drop/add streaming advice for ESPN fantasy basketball points leagues")]
struct Cli {
    /// Fantasy team id (defaults to league.toml `team_id`)
    #[arg(long, env = "FANVISE_TEAM_ID")]
    team: Option<String>,

    /// League id (defaults to league.toml `league_id`)
    #[arg(long, env = "FANVISE_LEAGUE_ID")]
    league: Option<String>,

    /// Response language code, e.g. `en` or `el`
    #[arg(long, default_value = "en")]
    lang: String,

    /// Read league data from a JSON snapshot instead of ESPN
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print the full response as JSON
    #[arg(long)]
    json: bool,

    /// Attach intermediate pipeline results to the response
    #[arg(long)]
    eval: bool,

    /// Question for the advisor
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season {}",
        config.league.name, config.league.season
    );

    let provider: Arc<dyn LeagueDataProvider> = match &cli.snapshot {
        Some(path) => {
            info!("Using snapshot {}", path.display());
            Arc::new(
                SnapshotFileProvider::from_path(path)
                    .with_context(|| format!("failed to load snapshot {}", path.display()))?,
            )
        }
        None => Arc::new(
            EspnClient::new(EspnSettings::from_config(&config))
                .context("failed to create ESPN client")?,
        ),
    };

    let advisor = Advisor::from_config(&config, provider).context("invalid league calendar")?;

    let request = AdviceRequest {
        team_id: cli.team.or_else(|| config.league.team_id.clone()),
        league_id: cli.league.or_else(|| config.league.league_id.clone()),
        language: Language::from_code(Some(cli.lang.as_str())),
        query: cli.query.join(" "),
        eval_mode: cli.eval,
    };

    let response = advisor.advise(request).await;

    if cli.json {
        let rendered =
            serde_json::to_string_pretty(&response).context("failed to serialize response")?;
        println!("{rendered}");
    } else {
        println!("{}", response.text);
    }

    Ok(())
}

/// Initialize tracing to stderr. `RUST_LOG` overrides the default filter.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fanvise=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
