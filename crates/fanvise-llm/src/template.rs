// Deterministic, localized text built only from structured move fields.
// Used when there is nothing to narrate, when the LLM is unavailable, and for
// error responses.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use fanvise_core::moves::{Confidence, RankedMove};
use fanvise_core::snapshot::MatchupScore;

/// Response language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "el")]
    Greek,
}

impl Language {
    /// Parse an ISO 639-1 code (or a locale like `el-GR`). Anything
    /// unrecognized falls back to English.
    pub fn from_code(code: Option<&str>) -> Self {
        let Some(code) = code else {
            return Language::English;
        };
        let primary = code.trim().split(['-', '_']).next().unwrap_or("").to_lowercase();
        match primary.as_str() {
            "el" | "gr" | "greek" => Language::Greek,
            _ => Language::English,
        }
    }

    /// How the language is named in LLM instructions.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Greek => "Greek (Ελληνικά)",
        }
    }
}

/// Which deterministic error message to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No active team or league selected.
    MissingIdentifiers,
    /// League data could not be fetched.
    DataUnavailable,
    /// Anything unexpected, including a crashed pipeline.
    Internal,
}

pub fn failure_message(kind: FailureKind, language: Language) -> String {
    let text = match (kind, language) {
        (FailureKind::MissingIdentifiers, Language::English) => {
            "I can't analyze moves yet: no active team or league is selected. \
             Pick your team and league, then ask again."
        }
        (FailureKind::MissingIdentifiers, Language::Greek) => {
            "Δεν μπορώ να αναλύσω κινήσεις ακόμη: δεν έχει επιλεγεί ενεργή ομάδα ή λίγκα. \
             Διάλεξε ομάδα και λίγκα και ρώτησε ξανά."
        }
        (FailureKind::DataUnavailable, Language::English) => {
            "I couldn't load your league data right now, so I can't recommend a move. \
             Please try again in a moment."
        }
        (FailureKind::DataUnavailable, Language::Greek) => {
            "Δεν ήταν δυνατή η φόρτωση των δεδομένων της λίγκας σου αυτή τη στιγμή, \
             οπότε δεν μπορώ να προτείνω κίνηση. Δοκίμασε ξανά σε λίγο."
        }
        (FailureKind::Internal, Language::English) => {
            "Something went wrong while analyzing your roster. No move is recommended; \
             please try again."
        }
        (FailureKind::Internal, Language::Greek) => {
            "Κάτι πήγε στραβά κατά την ανάλυση του ρόστερ σου. Δεν προτείνεται καμία κίνηση. \
             Δοκίμασε ξανά."
        }
    };
    text.to_string()
}

fn confidence_label(confidence: Confidence, language: Language) -> &'static str {
    match (language, confidence) {
        (Language::English, c) => c.label(),
        (Language::Greek, Confidence::High) => "ΥΨΗΛΗ",
        (Language::Greek, Confidence::Medium) => "ΜΕΤΡΙΑ",
        (Language::Greek, Confidence::Low) => "ΧΑΜΗΛΗ",
    }
}

fn matchup_line(matchup: &MatchupScore, language: Language) -> Option<String> {
    if matchup.score_for == 0.0 && matchup.score_against == 0.0 && matchup.opponent_name.is_none() {
        return None;
    }
    let opponent = matchup.opponent_name.as_deref();
    Some(match (language, opponent) {
        (Language::English, Some(opp)) => format!(
            "Matchup: {:.1} - {:.1} vs {opp}.",
            matchup.score_for, matchup.score_against
        ),
        (Language::English, None) => format!(
            "Matchup: {:.1} - {:.1}.",
            matchup.score_for, matchup.score_against
        ),
        (Language::Greek, Some(opp)) => format!(
            "Σκορ: {:.1} - {:.1} (αντίπαλος: {opp}).",
            matchup.score_for, matchup.score_against
        ),
        (Language::Greek, None) => format!(
            "Σκορ: {:.1} - {:.1}.",
            matchup.score_for, matchup.score_against
        ),
    })
}

/// The "hold your roster" answer for a run with no qualifying move.
pub fn hold_message(window_label: &str, matchup: &MatchupScore, language: Language) -> String {
    let mut text = match language {
        Language::English => format!(
            "No roster move is worth making for {window_label}: none of the available free \
             agents projects to add fantasy points over your current lineup. Hold your roster."
        ),
        Language::Greek => format!(
            "Καμία κίνηση δεν αξίζει για το διάστημα {window_label}: κανένας διαθέσιμος \
             ελεύθερος παίκτης δεν προβλέπεται να προσθέσει fantasy πόντους στη σημερινή σου \
             σύνθεση. Κράτα το ρόστερ ως έχει."
        ),
    };
    if let Some(line) = matchup_line(matchup, language) {
        text.push(' ');
        text.push_str(&line);
    }
    text
}

/// Plain listing of ranked moves. Every number comes straight from the move.
pub fn moves_message(
    team_name: &str,
    window_label: &str,
    matchup: &MatchupScore,
    moves: &[RankedMove],
    language: Language,
) -> String {
    let mut text = String::with_capacity(256 + moves.len() * 256);

    let _ = match language {
        Language::English => writeln!(text, "Recommended moves for {team_name} ({window_label}):"),
        Language::Greek => writeln!(text, "Προτεινόμενες κινήσεις για {team_name} ({window_label}):"),
    };
    if let Some(line) = matchup_line(matchup, language) {
        let _ = writeln!(text, "{line}");
    }

    for m in moves {
        let sim = &m.simulated;
        let confidence = confidence_label(sim.confidence, language);
        let _ = match language {
            Language::English => writeln!(
                text,
                "{}. Drop {}, add {}: +{:.1} projected fantasy points ({:.1} -> {:.1}), \
                 confidence {}. {} has {} games left in the window.",
                m.rank,
                m.drop.player_name,
                m.add.player_name,
                sim.net_gain,
                sim.baseline_window_fpts,
                sim.projected_window_fpts,
                confidence,
                m.add.player_name,
                m.add.games_remaining,
            ),
            Language::Greek => writeln!(
                text,
                "{}. Αφαίρεσε τον/την {}, πρόσθεσε τον/την {}: +{:.1} προβλεπόμενοι fantasy \
                 πόντοι ({:.1} -> {:.1}), βεβαιότητα {}. {}: {} αγώνες μέχρι το τέλος της περιόδου.",
                m.rank,
                m.drop.player_name,
                m.add.player_name,
                sim.net_gain,
                sim.baseline_window_fpts,
                sim.projected_window_fpts,
                confidence,
                m.add.player_name,
                m.add.games_remaining,
            ),
        };
        for warning in &sim.warnings {
            let _ = match language {
                Language::English => writeln!(text, "   Note: {warning}"),
                Language::Greek => writeln!(text, "   Προσοχή: {warning}"),
            };
        }
    }

    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanvise_core::moves::{DropScore, SimulatedMove, StreamScore};

    fn ranked() -> RankedMove {
        RankedMove {
            rank: 1,
            simulated: SimulatedMove {
                drop_player_id: 1,
                add_player_id: 10,
                is_legal: true,
                baseline_window_fpts: 330.0,
                projected_window_fpts: 440.0,
                net_gain: 110.0,
                confidence: Confidence::Medium,
                warnings: vec!["Jones is listed DAY_TO_DAY".to_string()],
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
        }
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code(Some("el")), Language::Greek);
        assert_eq!(Language::from_code(Some("EL-gr")), Language::Greek);
        assert_eq!(Language::from_code(Some("en")), Language::English);
        assert_eq!(Language::from_code(Some("fr")), Language::English);
        assert_eq!(Language::from_code(None), Language::English);
        assert_eq!(serde_json::to_string(&Language::Greek).unwrap(), "\"el\"");
    }

    #[test]
    fn moves_message_uses_move_numbers_verbatim() {
        let text = moves_message(
            "Dunkers",
            "Oct 19 – Oct 25",
            &MatchupScore::default(),
            &[ranked()],
            Language::English,
        );
        assert!(text.starts_with("Recommended moves for Dunkers"));
        assert!(text.contains("Drop Smith, add Jones: +110.0"));
        assert!(text.contains("(330.0 -> 440.0)"));
        assert!(text.contains("confidence MEDIUM"));
        assert!(text.contains("4 games left"));
        assert!(text.contains("Note: Jones is listed DAY_TO_DAY"));
    }

    #[test]
    fn greek_moves_message() {
        let matchup = MatchupScore {
            score_for: 512.5,
            score_against: 498.0,
            opponent_name: Some("Rivals".to_string()),
        };
        let text = moves_message("Dunkers", "Oct 19 – Oct 25", &matchup, &[ranked()], Language::Greek);
        assert!(text.contains("Αφαίρεσε"));
        assert!(text.contains("ΜΕΤΡΙΑ"));
        assert!(text.contains("+110.0"));
        assert!(text.contains("Σκορ: 512.5 - 498.0 (αντίπαλος: Rivals)."));
    }

    #[test]
    fn hold_message_is_localized() {
        let en = hold_message("Oct 19 – Oct 25", &MatchupScore::default(), Language::English);
        assert!(en.contains("Hold your roster"));
        let el = hold_message("Oct 19 – Oct 25", &MatchupScore::default(), Language::Greek);
        assert!(el.contains("Κράτα το ρόστερ"));
    }

    #[test]
    fn failure_messages_are_non_empty() {
        for kind in [
            FailureKind::MissingIdentifiers,
            FailureKind::DataUnavailable,
            FailureKind::Internal,
        ] {
            for language in [Language::English, Language::Greek] {
                assert!(!failure_message(kind, language).trim().is_empty());
            }
        }
    }
}
