// Prompt templates for move narration.
//
// The numbers in every prompt are already final. The model explains the
// moves; it never ranks, adds, or recalculates them.

use fanvise_core::moves::RankedMove;

use crate::compose::CompositionInput;
use crate::template::Language;

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

pub fn system_prompt(language: Language) -> String {
    format!(
        "You are a fantasy basketball (ESPN points league) advisor helping a manager decide on a \
         single drop/add move for the current head-to-head scoring window.\n\
         \n\
         Rules:\n\
         1. Recommend only the moves listed under RANKED MOVES, in the given order.\n\
         2. Quote the projected gains, window totals, games remaining and confidence exactly as \
         given. Do NOT do arithmetic and do NOT invent statistics.\n\
         3. Mention every warning attached to a move.\n\
         4. Keep it short: a one-line verdict, then one or two sentences per move.\n\
         5. Answer in {}.",
        language.prompt_name()
    )
}

// ---------------------------------------------------------------------------
// Recommendation prompt
// ---------------------------------------------------------------------------

pub fn build_recommendation_prompt(input: &CompositionInput) -> String {
    let mut prompt = String::with_capacity(1024 + input.moves.len() * 384);

    // Section 1: TEAM
    prompt.push_str(&format!(
        "## TEAM\n\
         Team: {}\n\
         Scoring window: {}\n\
         Games remaining for active roster players: {}\n",
        input.team_name, input.window_label, input.games_remaining,
    ));
    if input.matchup.score_for != 0.0 || input.matchup.score_against != 0.0 {
        prompt.push_str(&format!(
            "Current matchup score: {:.1} - {:.1}",
            input.matchup.score_for, input.matchup.score_against
        ));
        if let Some(opponent) = &input.matchup.opponent_name {
            prompt.push_str(&format!(" vs {opponent}"));
        }
        prompt.push('\n');
    }
    prompt.push('\n');

    // Section 2: RANKED MOVES
    prompt.push_str("## RANKED MOVES\n");
    for m in &input.moves {
        prompt.push_str(&format_move(m));
    }
    prompt.push('\n');

    // Section 3: QUESTION
    prompt.push_str("## MANAGER QUESTION\n");
    let query = input.query.trim();
    if query.is_empty() {
        prompt.push_str("What is the best streaming move for this window?\n");
    } else {
        prompt.push_str(query);
        prompt.push('\n');
    }
    prompt.push('\n');

    prompt.push_str(&format!(
        "Respond in {}.",
        input.language.prompt_name()
    ));
    prompt
}

fn format_move(m: &RankedMove) -> String {
    let sim = &m.simulated;
    let mut out = format!(
        "{}. DROP {} (drop score {:.1}) -> ADD {} (stream score {:.1}, {} games left)\n   \
         Window points: {:.1} -> {:.1} | Net gain: +{:.1} | Confidence: {}\n",
        m.rank,
        m.drop.player_name,
        m.drop.score,
        m.add.player_name,
        m.add.score,
        m.add.games_remaining,
        sim.baseline_window_fpts,
        sim.projected_window_fpts,
        sim.net_gain,
        sim.confidence,
    );
    for warning in &sim.warnings {
        out.push_str(&format!("   Warning: {warning}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanvise_core::moves::{Confidence, DropScore, SimulatedMove, StreamScore};
    use fanvise_core::snapshot::MatchupScore;

    fn input(language: Language, query: &str) -> CompositionInput {
        CompositionInput {
            team_name: "Dunkers".to_string(),
            window_label: "Oct 21 – Oct 25".to_string(),
            matchup: MatchupScore {
                score_for: 402.0,
                score_against: 377.5,
                opponent_name: Some("Rivals".to_string()),
            },
            games_remaining: 31,
            moves: vec![RankedMove {
                rank: 1,
                simulated: SimulatedMove {
                    drop_player_id: 1,
                    add_player_id: 10,
                    is_legal: true,
                    baseline_window_fpts: 330.0,
                    projected_window_fpts: 440.0,
                    net_gain: 110.0,
                    confidence: Confidence::High,
                    warnings: vec!["Jones has only 3 games played this season".to_string()],
                },
                drop: DropScore {
                    player_id: 1,
                    player_name: "Smith".to_string(),
                    score: 62.5,
                },
                add: StreamScore {
                    player_id: 10,
                    player_name: "Jones".to_string(),
                    score: 80.0,
                    games_remaining: 4,
                },
            }],
            query: query.to_string(),
            language,
        }
    }

    #[test]
    fn prompt_has_all_sections() {
        let prompt = build_recommendation_prompt(&input(Language::English, "Who should I stream?"));
        assert!(prompt.contains("## TEAM"));
        assert!(prompt.contains("## RANKED MOVES"));
        assert!(prompt.contains("## MANAGER QUESTION"));
        assert!(prompt.contains("Who should I stream?"));
        assert!(prompt.contains("402.0 - 377.5 vs Rivals"));
    }

    #[test]
    fn prompt_carries_final_numbers() {
        let prompt = build_recommendation_prompt(&input(Language::English, ""));
        assert!(prompt.contains("DROP Smith (drop score 62.5) -> ADD Jones (stream score 80.0, 4 games left)"));
        assert!(prompt.contains("Window points: 330.0 -> 440.0 | Net gain: +110.0 | Confidence: HIGH"));
        assert!(prompt.contains("Warning: Jones has only 3 games played"));
        assert!(prompt.contains("What is the best streaming move"));
    }

    #[test]
    fn language_is_requested_in_both_prompts() {
        let prompt = build_recommendation_prompt(&input(Language::Greek, "ποιον να πάρω;"));
        assert!(prompt.ends_with("Respond in Greek (Ελληνικά)."));
        assert!(system_prompt(Language::Greek).contains("Answer in Greek"));
    }
}
