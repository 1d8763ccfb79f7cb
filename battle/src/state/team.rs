//! One player's side of the battle

use std::collections::{BTreeMap, BTreeSet};

use deduce_protocol::{Player, to_id};
use serde::Serialize;

use super::pokemon::Pokemon;
use super::stats::StatStages;
use super::status::Volatile;

/// State of one side condition (hazards, screens, Tailwind)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SideConditionState {
    pub layers: u8,
    /// Turn the condition started
    pub started: u32,
}

/// What Baton Pass hands over to the next pokemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatonPass {
    pub boosts: StatStages,
    pub conditions: BTreeSet<Volatile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub player: Player,
    pub username: String,
    /// Roster size announced by `teamsize`
    pub size: usize,
    /// Pokemon in the order they were revealed
    pub pokemon: Vec<Pokemon>,
    /// Index into `pokemon` of the active pokemon
    pub active: Option<usize>,
    /// Side conditions keyed by id ("stealthrock", "spikes", "reflect")
    pub conditions: BTreeMap<String, SideConditionState>,
    pub baton_pass: Option<BatonPass>,
}

impl Team {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            username: String::new(),
            size: 6,
            pokemon: Vec::new(),
            active: None,
            conditions: BTreeMap::new(),
            baton_pass: None,
        }
    }

    /// Find a revealed pokemon by its identifier name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.pokemon.iter().position(|p| p.name == name)
    }

    pub fn active_pokemon(&self) -> Option<&Pokemon> {
        self.active.and_then(|i| self.pokemon.get(i))
    }

    /// Unrevealed roster slots
    pub fn unrevealed(&self) -> usize {
        self.size.saturating_sub(self.pokemon.len())
    }

    pub fn add_condition(&mut self, condition: &str, turn: u32) {
        let id = condition_id(condition);
        let state = self.conditions.entry(id).or_insert(SideConditionState {
            layers: 0,
            started: turn,
        });
        state.layers += 1;
    }

    pub fn remove_condition(&mut self, condition: &str) {
        self.conditions.remove(&condition_id(condition));
    }

    pub fn has_condition(&self, id: &str) -> bool {
        self.conditions.contains_key(id)
    }
}

/// `move: Stealth Rock` -> `stealthrock`
pub fn condition_id(condition: &str) -> String {
    to_id(condition.strip_prefix("move: ").unwrap_or(condition))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_layers() {
        let mut team = Team::new(Player::P1);
        team.add_condition("Spikes", 3);
        team.add_condition("Spikes", 4);
        team.add_condition("move: Stealth Rock", 4);

        assert_eq!(team.conditions["spikes"].layers, 2);
        assert_eq!(team.conditions["spikes"].started, 3);
        assert!(team.has_condition("stealthrock"));

        team.remove_condition("Spikes");
        assert!(!team.has_condition("spikes"));
    }
}
