// Snapshot builders shared by the engine's unit tests.

use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};

use fanvise_core::player::{FreeAgentPlayer, PlayerId, PlayerRecord, RosterPlayer};
use fanvise_core::schedule::{Game, GamesInWindow};
use fanvise_core::slot::RosterSlotConfiguration;
use fanvise_core::snapshot::{league_average_baseline, LeagueSnapshot, MatchupScore};
use fanvise_core::window::ScoringWindow;

/// Monday 2026-10-19 through Sunday 2026-10-25 UTC.
pub(crate) fn window() -> ScoringWindow {
    ScoringWindow::new(
        Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 10, 25, 23, 59, 59).unwrap(),
    )
    .unwrap()
}

fn record(id: PlayerId, eligible: &str, avg: f64, status: Option<&str>) -> PlayerRecord {
    let eligible_slots: Vec<String> = eligible.split(',').map(|s| s.trim().to_string()).collect();
    PlayerRecord {
        id,
        name: format!("Player {id}"),
        position: eligible_slots.first().cloned().unwrap_or_default(),
        eligible_slots,
        // Each player gets a pro team of their own so game counts stay independent.
        pro_team_id: id as u32,
        injury_status: status.map(String::from),
        avg_fpts: avg,
        total_fpts: avg * 40.0,
        games_played: 40,
        percent_owned: 50.0,
    }
}

/// A rostered player and the number of games their team plays in the window.
pub(crate) fn roster_player(
    id: PlayerId,
    eligible: &str,
    avg: f64,
    games: u32,
    status: Option<&str>,
) -> (RosterPlayer, u32) {
    (RosterPlayer::from_record(&record(id, eligible, avg, status)), games)
}

pub(crate) fn free_agent(
    id: PlayerId,
    eligible: &str,
    avg: f64,
    games: u32,
    status: Option<&str>,
    percent_owned: f64,
) -> (FreeAgentPlayer, u32) {
    let mut rec = record(id, eligible, avg, status);
    rec.percent_owned = percent_owned;
    let player = FreeAgentPlayer::from_record(&rec).expect("test free agent must be available");
    (player, games)
}

pub(crate) fn snapshot_with(
    roster: Vec<(RosterPlayer, u32)>,
    free_agents: Vec<(FreeAgentPlayer, u32)>,
) -> LeagueSnapshot {
    snapshot_with_slots(roster, free_agents, RosterSlotConfiguration::standard())
}

pub(crate) fn snapshot_with_slots(
    roster: Vec<(RosterPlayer, u32)>,
    free_agents: Vec<(FreeAgentPlayer, u32)>,
    slots: RosterSlotConfiguration,
) -> LeagueSnapshot {
    let window = window();
    let first_tip = window.start() + Duration::hours(23);

    let team_games = roster
        .iter()
        .map(|(p, g)| (p.pro_team_id, *g))
        .chain(free_agents.iter().map(|(p, g)| (p.pro_team_id, *g)));
    let mut games = Vec::new();
    for (team, count) in team_games {
        for day in 0..count {
            games.push(Game {
                home_pro_team_id: team,
                away_pro_team_id: 9000 + team,
                date: first_tip + Duration::days(i64::from(day)),
            });
        }
    }

    let roster: Vec<RosterPlayer> = roster.into_iter().map(|(p, _)| p).collect();
    let league_average_fpts = league_average_baseline(&roster, 20.0);

    LeagueSnapshot {
        team_name: "Test Team".to_string(),
        games: GamesInWindow::from_games(&games, &window),
        window,
        roster,
        free_agents: free_agents.into_iter().map(|(p, _)| p).collect(),
        slots,
        matchup: MatchupScore::default(),
        league_average_fpts,
        player_notes: HashMap::new(),
    }
}
