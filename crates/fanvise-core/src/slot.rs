// Lineup slot vocabulary and roster slot capacities.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// ESPN lineup slot ID constants (fantasy basketball, API v3)
// ---------------------------------------------------------------------------

pub const ESPN_SLOT_PG: u16 = 0;
pub const ESPN_SLOT_SG: u16 = 1;
pub const ESPN_SLOT_SF: u16 = 2;
pub const ESPN_SLOT_PF: u16 = 3;
pub const ESPN_SLOT_C: u16 = 4;
pub const ESPN_SLOT_G: u16 = 5;
pub const ESPN_SLOT_F: u16 = 6;
pub const ESPN_SLOT_SG_SF: u16 = 7;
pub const ESPN_SLOT_G_F: u16 = 8;
pub const ESPN_SLOT_PF_C: u16 = 9;
pub const ESPN_SLOT_F_C: u16 = 10;
pub const ESPN_SLOT_UTIL: u16 = 11;
pub const ESPN_SLOT_BE: u16 = 12;
pub const ESPN_SLOT_IR: u16 = 13;

/// Basketball lineup slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    PointGuard,
    ShootingGuard,
    SmallForward,
    PowerForward,
    Center,
    Guard,
    Forward,
    ShootingGuardSmallForward,
    GuardForward,
    PowerForwardCenter,
    ForwardCenter,
    Utility,
    Bench,
    InjuredReserve,
}

impl Slot {
    /// Parse a slot string. Accepts ESPN abbreviations ("UT" and "BN" too).
    pub fn from_str_slot(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PG" => Some(Slot::PointGuard),
            "SG" => Some(Slot::ShootingGuard),
            "SF" => Some(Slot::SmallForward),
            "PF" => Some(Slot::PowerForward),
            "C" => Some(Slot::Center),
            "G" => Some(Slot::Guard),
            "F" => Some(Slot::Forward),
            "SG/SF" => Some(Slot::ShootingGuardSmallForward),
            "G/F" => Some(Slot::GuardForward),
            "PF/C" => Some(Slot::PowerForwardCenter),
            "F/C" => Some(Slot::ForwardCenter),
            "UTIL" | "UT" => Some(Slot::Utility),
            "BE" | "BN" => Some(Slot::Bench),
            "IR" | "IL" => Some(Slot::InjuredReserve),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Slot::PointGuard => "PG",
            Slot::ShootingGuard => "SG",
            Slot::SmallForward => "SF",
            Slot::PowerForward => "PF",
            Slot::Center => "C",
            Slot::Guard => "G",
            Slot::Forward => "F",
            Slot::ShootingGuardSmallForward => "SG/SF",
            Slot::GuardForward => "G/F",
            Slot::PowerForwardCenter => "PF/C",
            Slot::ForwardCenter => "F/C",
            Slot::Utility => "UTIL",
            Slot::Bench => "BE",
            Slot::InjuredReserve => "IR",
        }
    }

    /// Whether a player in this slot contributes to the matchup score.
    pub fn is_starting(&self) -> bool {
        !matches!(self, Slot::Bench | Slot::InjuredReserve)
    }

    /// Whether the slot accepts any player regardless of eligibility.
    pub fn is_open_slot(&self) -> bool {
        matches!(self, Slot::Utility | Slot::Bench)
    }

    /// Positional slots whose players may also fill this combo slot. Empty
    /// for every other slot.
    pub fn combo_members(&self) -> &'static [Slot] {
        match self {
            Slot::ShootingGuardSmallForward => &[Slot::ShootingGuard, Slot::SmallForward],
            Slot::GuardForward => &[
                Slot::PointGuard,
                Slot::ShootingGuard,
                Slot::SmallForward,
                Slot::PowerForward,
                Slot::Guard,
                Slot::Forward,
            ],
            Slot::PowerForwardCenter => &[Slot::PowerForward, Slot::Center],
            Slot::ForwardCenter => &[
                Slot::SmallForward,
                Slot::PowerForward,
                Slot::Center,
                Slot::Forward,
            ],
            _ => &[],
        }
    }

    /// Deterministic ordering index for lineup display and solving.
    pub fn sort_order(&self) -> u8 {
        match self {
            Slot::PointGuard => 0,
            Slot::ShootingGuard => 1,
            Slot::SmallForward => 2,
            Slot::PowerForward => 3,
            Slot::Center => 4,
            Slot::Guard => 5,
            Slot::Forward => 6,
            Slot::ShootingGuardSmallForward => 7,
            Slot::GuardForward => 8,
            Slot::PowerForwardCenter => 9,
            Slot::ForwardCenter => 10,
            Slot::Utility => 11,
            Slot::Bench => 12,
            Slot::InjuredReserve => 13,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Map an ESPN lineup slot ID to a `Slot`.
pub fn slot_from_espn_id(slot_id: u16) -> Option<Slot> {
    match slot_id {
        ESPN_SLOT_PG => Some(Slot::PointGuard),
        ESPN_SLOT_SG => Some(Slot::ShootingGuard),
        ESPN_SLOT_SF => Some(Slot::SmallForward),
        ESPN_SLOT_PF => Some(Slot::PowerForward),
        ESPN_SLOT_C => Some(Slot::Center),
        ESPN_SLOT_G => Some(Slot::Guard),
        ESPN_SLOT_F => Some(Slot::Forward),
        ESPN_SLOT_SG_SF => Some(Slot::ShootingGuardSmallForward),
        ESPN_SLOT_G_F => Some(Slot::GuardForward),
        ESPN_SLOT_PF_C => Some(Slot::PowerForwardCenter),
        ESPN_SLOT_F_C => Some(Slot::ForwardCenter),
        ESPN_SLOT_UTIL => Some(Slot::Utility),
        ESPN_SLOT_BE => Some(Slot::Bench),
        ESPN_SLOT_IR => Some(Slot::InjuredReserve),
        _ => None,
    }
}

/// ESPN `defaultPositionId` to a display position string.
pub fn position_from_espn_id(position_id: u16) -> &'static str {
    match position_id {
        1 => "PG",
        2 => "SG",
        3 => "SF",
        4 => "PF",
        5 => "C",
        _ => "UTIL",
    }
}

// ---------------------------------------------------------------------------
// RosterSlotConfiguration
// ---------------------------------------------------------------------------

/// Slot capacities for a league roster, e.g. `{PG: 1, ..., UTIL: 3, BE: 3, IR: 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlotConfiguration {
    capacities: BTreeMap<Slot, usize>,
}

impl RosterSlotConfiguration {
    pub fn new(capacities: BTreeMap<Slot, usize>) -> Self {
        Self { capacities }
    }

    /// Build from a config mapping of slot strings to counts (league.toml
    /// `[league.roster]`). Unknown keys are logged and skipped.
    pub fn from_config(roster: &HashMap<String, usize>) -> Self {
        let mut capacities = BTreeMap::new();
        for (key, &count) in roster {
            match Slot::from_str_slot(key) {
                Some(slot) => {
                    *capacities.entry(slot).or_insert(0) += count;
                }
                None => warn!("ignoring unknown roster slot '{key}'"),
            }
        }
        Self { capacities }
    }

    /// The standard ESPN points-league layout: one of each position, G, F,
    /// three UTIL, three bench, one IR.
    pub fn standard() -> Self {
        let capacities = BTreeMap::from([
            (Slot::PointGuard, 1),
            (Slot::ShootingGuard, 1),
            (Slot::SmallForward, 1),
            (Slot::PowerForward, 1),
            (Slot::Center, 1),
            (Slot::Guard, 1),
            (Slot::Forward, 1),
            (Slot::Utility, 3),
            (Slot::Bench, 3),
            (Slot::InjuredReserve, 1),
        ]);
        Self { capacities }
    }

    pub fn capacity(&self, slot: Slot) -> usize {
        self.capacities.get(&slot).copied().unwrap_or(0)
    }

    /// One entry per slot instance, in deterministic slot order.
    pub fn expand(&self) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self
            .capacities
            .iter()
            .flat_map(|(&slot, &count)| std::iter::repeat(slot).take(count))
            .collect();
        slots.sort_by_key(|s| s.sort_order());
        slots
    }

    /// Slot instances that count toward the matchup (no bench, no IR).
    pub fn starting_slots(&self) -> Vec<Slot> {
        self.expand().into_iter().filter(|s| s.is_starting()).collect()
    }

    pub fn total_capacity(&self) -> usize {
        self.capacities.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_capacity() == 0
    }
}

impl Default for RosterSlotConfiguration {
    fn default() -> Self {
        Self::standard()
    }
}
