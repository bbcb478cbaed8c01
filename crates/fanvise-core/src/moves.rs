// Candidate scores and move records passed from the compute stages to the
// narrator. Everything here is produced once per run and never edited.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// Droppability of a rostered player. Higher = safer to release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropScore {
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: f64,
}

/// Streaming value of a free agent. Higher = better volume play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamScore {
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: f64,
    pub games_remaining: u32,
}

/// Reliability label attached to a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// One step down, saturating at `Low`.
    pub fn lowered(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium | Confidence::Low => Confidence::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome of simulating one drop/add swap over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedMove {
    pub drop_player_id: PlayerId,
    pub add_player_id: PlayerId,
    pub is_legal: bool,
    pub baseline_window_fpts: f64,
    pub projected_window_fpts: f64,
    pub net_gain: f64,
    pub confidence: Confidence,
    pub warnings: Vec<String>,
}

/// A legal, positive-gain move in the final ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMove {
    pub rank: usize,
    #[serde(flatten)]
    pub simulated: SimulatedMove,
    pub drop: DropScore,
    pub add: StreamScore,
}

impl RankedMove {
    pub fn net_gain(&self) -> f64 {
        self.simulated.net_gain
    }
}
