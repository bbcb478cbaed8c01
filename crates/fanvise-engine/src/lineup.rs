// Lineup assignment over slot instances.
//
// Players are matched to individual slot instances with Kuhn's augmenting
// path algorithm. Adding players greedily in descending value order and
// keeping each one only if the matching can grow yields a max-weight
// independent set of the transversal matroid, which is the optimal starting
// lineup.

use std::cmp::Ordering;

use fanvise_core::player::{PlayerId, PlayerProfile};
use fanvise_core::slot::{RosterSlotConfiguration, Slot};

/// Best achievable starting lineup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineupValue {
    pub total: f64,
    /// Starters in the order they were seated (highest value first).
    pub starters: Vec<PlayerId>,
}

struct Matcher<'a> {
    players: &'a [&'a PlayerProfile],
    slots: &'a [Slot],
    owner: Vec<Option<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(players: &'a [&'a PlayerProfile], slots: &'a [Slot]) -> Self {
        Self {
            players,
            slots,
            owner: vec![None; slots.len()],
        }
    }

    /// Try to seat `player`, reshuffling already seated players if needed.
    fn seat(&mut self, player: usize) -> bool {
        let mut visited = vec![false; self.slots.len()];
        self.augment(player, &mut visited)
    }

    fn augment(&mut self, player: usize, visited: &mut [bool]) -> bool {
        for slot in 0..self.slots.len() {
            if visited[slot] || !self.players[player].can_fill(self.slots[slot]) {
                continue;
            }
            visited[slot] = true;
            let free = match self.owner[slot] {
                None => true,
                Some(current) => self.augment(current, visited),
            };
            if free {
                self.owner[slot] = Some(player);
                return true;
            }
        }
        false
    }
}

/// Highest total window value reachable by placing `players` into the
/// starting slots of `config`. `values[i]` is the value of `players[i]`.
pub fn best_lineup(
    players: &[&PlayerProfile],
    values: &[f64],
    config: &RosterSlotConfiguration,
) -> LineupValue {
    let slots = config.starting_slots();
    let mut order: Vec<usize> = (0..players.len())
        .filter(|&i| values.get(i).is_some_and(|v| v.is_finite() && *v > 0.0))
        .collect();
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(Ordering::Equal)
            .then(players[a].id.cmp(&players[b].id))
    });

    let mut matcher = Matcher::new(players, &slots);
    let mut lineup = LineupValue::default();
    for i in order {
        if lineup.starters.len() == slots.len() {
            break;
        }
        if matcher.seat(i) {
            lineup.total += values[i];
            lineup.starters.push(players[i].id);
        }
    }
    lineup
}

/// Number of players who cannot be given any roster slot (bench and IR
/// included). A legal roster has zero; a swap must never make it worse.
pub fn overflow(players: &[&PlayerProfile], config: &RosterSlotConfiguration) -> usize {
    let slots = config.expand();
    let mut matcher = Matcher::new(players, &slots);
    let seated = (0..players.len()).filter(|&i| matcher.seat(i)).count();
    players.len() - seated
}
