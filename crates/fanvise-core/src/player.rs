// Player records as delivered by providers, and the typed roster / free-agent
// views the pipeline works on.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::slot::Slot;

pub type PlayerId = u64;
pub type ProTeamId = u32;

// ---------------------------------------------------------------------------
// Injury status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InjuryStatus {
    Active,
    DayToDay,
    Questionable,
    Out,
    InjuryReserve,
    Suspended,
}

impl InjuryStatus {
    /// Parse a provider status tag. Missing or empty means active; an
    /// unrecognized tag is treated as unresolved (questionable).
    pub fn parse(tag: Option<&str>) -> Self {
        let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) else {
            return InjuryStatus::Active;
        };
        match tag.to_uppercase().replace(['-', ' '], "_").as_str() {
            "ACTIVE" | "HEALTHY" | "NORMAL" => InjuryStatus::Active,
            "DAY_TO_DAY" | "DTD" => InjuryStatus::DayToDay,
            "QUESTIONABLE" | "GTD" | "PROBABLE" | "DOUBTFUL" => InjuryStatus::Questionable,
            "OUT" | "O" => InjuryStatus::Out,
            "INJURY_RESERVE" | "IR" | "INJURED_RESERVE" => InjuryStatus::InjuryReserve,
            "SUSPENSION" | "SUSPENDED" | "SSPD" => InjuryStatus::Suspended,
            other => {
                warn!("unknown injury status '{other}', treating as questionable");
                InjuryStatus::Questionable
            }
        }
    }

    /// Player will not play in the window.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            InjuryStatus::Out | InjuryStatus::InjuryReserve | InjuryStatus::Suspended
        )
    }

    /// Player carries an injury tag whose outcome is still open.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, InjuryStatus::DayToDay | InjuryStatus::Questionable)
    }

    /// Whether an IR slot may hold this player.
    pub fn is_ir_eligible(&self) -> bool {
        matches!(self, InjuryStatus::Out | InjuryStatus::InjuryReserve)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InjuryStatus::Active => "ACTIVE",
            InjuryStatus::DayToDay => "DAY_TO_DAY",
            InjuryStatus::Questionable => "QUESTIONABLE",
            InjuryStatus::Out => "OUT",
            InjuryStatus::InjuryReserve => "INJURY_RESERVE",
            InjuryStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for InjuryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Provider record
// ---------------------------------------------------------------------------

/// A player as reported by a roster / free-agent provider. Optional fields
/// default to zero and an absent status means ACTIVE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub eligible_slots: Vec<String>,
    #[serde(default)]
    pub pro_team_id: ProTeamId,
    #[serde(default)]
    pub injury_status: Option<String>,
    #[serde(default)]
    pub avg_fpts: f64,
    #[serde(default)]
    pub total_fpts: f64,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub percent_owned: f64,
}

// ---------------------------------------------------------------------------
// Typed players
// ---------------------------------------------------------------------------

/// Fields shared by rostered players and free agents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    pub eligible_slots: Vec<Slot>,
    pub pro_team_id: ProTeamId,
    pub injury_status: InjuryStatus,
    pub avg_fpts: f64,
    pub total_fpts: f64,
    pub games_played: u32,
}

impl PlayerProfile {
    fn from_record(record: &PlayerRecord) -> Self {
        let mut eligible_slots: Vec<Slot> = record
            .eligible_slots
            .iter()
            .filter_map(|s| Slot::from_str_slot(s))
            .collect();
        // Fall back to the primary position when no slot list was supplied.
        if eligible_slots.is_empty() {
            if let Some(slot) = Slot::from_str_slot(&record.position) {
                eligible_slots.push(slot);
            }
        }
        eligible_slots.sort_by_key(|s| s.sort_order());
        eligible_slots.dedup();

        let sanitize = |v: f64| if v.is_finite() { v } else { 0.0 };

        PlayerProfile {
            id: record.id,
            name: record.name.trim().to_string(),
            position: record.position.trim().to_uppercase(),
            eligible_slots,
            pro_team_id: record.pro_team_id,
            injury_status: InjuryStatus::parse(record.injury_status.as_deref()),
            avg_fpts: sanitize(record.avg_fpts),
            total_fpts: sanitize(record.total_fpts),
            games_played: record.games_played,
        }
    }

    /// Whether the player may occupy `slot`: UTIL and bench take anyone, IR
    /// only takes OUT / injury-reserve players, and a combo slot takes anyone
    /// eligible at one of its member positions.
    pub fn can_fill(&self, slot: Slot) -> bool {
        match slot {
            open if open.is_open_slot() => true,
            Slot::InjuredReserve => self.injury_status.is_ir_eligible(),
            positional => {
                self.eligible_slots.contains(&positional)
                    || positional
                        .combo_members()
                        .iter()
                        .any(|member| self.eligible_slots.contains(member))
            }
        }
    }
}

/// A player on the user's roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterPlayer {
    profile: PlayerProfile,
}

impl RosterPlayer {
    pub fn from_record(record: &PlayerRecord) -> Self {
        Self {
            profile: PlayerProfile::from_record(record),
        }
    }
}

impl Deref for RosterPlayer {
    type Target = PlayerProfile;

    fn deref(&self) -> &PlayerProfile {
        &self.profile
    }
}

/// An available player who can be added. Only constructible from a record
/// whose status is available, so OUT / IR / suspended players never reach
/// scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeAgentPlayer {
    profile: PlayerProfile,
    percent_owned: f64,
}

impl FreeAgentPlayer {
    /// Returns `None` for players who will not play.
    pub fn from_record(record: &PlayerRecord) -> Option<Self> {
        let profile = PlayerProfile::from_record(record);
        if profile.injury_status.is_unavailable() {
            debug!(
                player_id = profile.id,
                status = %profile.injury_status,
                "excluding unavailable free agent"
            );
            return None;
        }
        let percent_owned = if record.percent_owned.is_finite() {
            record.percent_owned.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Some(Self {
            profile,
            percent_owned,
        })
    }

    pub fn percent_owned(&self) -> f64 {
        self.percent_owned
    }
}

impl Deref for FreeAgentPlayer {
    type Target = PlayerProfile;

    fn deref(&self) -> &PlayerProfile {
        &self.profile
    }
}
