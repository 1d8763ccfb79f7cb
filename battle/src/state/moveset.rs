//! Known and possible moves of one pokemon

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

pub const MAX_MOVES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveSlot {
    /// Remaining PP; a lower bound for the opponent's pokemon
    pub pp: u32,
    pub max_pp: u32,
}

/// Revealed moves plus the pool the unrevealed slots are drawn from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Moveset {
    moves: BTreeMap<String, MoveSlot>,
    pool: BTreeSet<String>,
    size: usize,
}

impl Moveset {
    pub fn new(pool: impl IntoIterator<Item = String>) -> Self {
        Self {
            moves: BTreeMap::new(),
            pool: pool.into_iter().collect(),
            size: MAX_MOVES,
        }
    }

    pub fn moves(&self) -> &BTreeMap<String, MoveSlot> {
        &self.moves
    }

    pub fn get(&self, id: &str) -> Option<&MoveSlot> {
        self.moves.get(id)
    }

    /// Candidates for the slots still unrevealed
    pub fn pool(&self) -> &BTreeSet<String> {
        &self.pool
    }

    pub fn is_complete(&self) -> bool {
        self.moves.len() >= self.size
    }

    pub fn contains(&self, id: &str) -> bool {
        self.moves.contains_key(id)
    }

    /// Whether `id` is known or might still be revealed
    pub fn could_have(&self, id: &str) -> bool {
        self.moves.contains_key(id) || (!self.is_complete() && self.pool.contains(id))
    }

    /// Add a move; once every slot is known the pool is emptied.
    pub fn reveal(&mut self, id: &str, max_pp: u32) {
        if !self.moves.contains_key(id) {
            self.moves.insert(
                id.to_string(),
                MoveSlot {
                    pp: max_pp,
                    max_pp,
                },
            );
            self.pool.remove(id);
        }
        if self.is_complete() {
            self.pool.clear();
        }
    }

    /// Replace the whole moveset with the list a request reports
    pub fn reveal_all<'a>(&mut self, moves: impl IntoIterator<Item = (&'a str, u32)>) {
        let moves: Vec<_> = moves.into_iter().collect();
        self.moves.retain(|id, _| moves.iter().any(|(m, _)| m == id));
        for (id, max_pp) in &moves {
            self.reveal(id, *max_pp);
        }
        self.size = moves.len().max(1);
        self.pool.clear();
    }

    /// Drop unrevealed candidates matching `pred`
    pub fn rule_out(&mut self, pred: impl Fn(&str) -> bool) {
        self.pool.retain(|id| !pred(id));
    }

    pub fn use_pp(&mut self, id: &str, amount: u32) {
        if let Some(slot) = self.moves.get_mut(id) {
            slot.pp = slot.pp.saturating_sub(amount);
        }
    }

    pub fn set_pp(&mut self, id: &str, pp: u32) {
        if let Some(slot) = self.moves.get_mut(id) {
            slot.pp = pp.min(slot.max_pp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moveset() -> Moveset {
        Moveset::new(
            ["thunderbolt", "surf", "grassknot", "hiddenpower", "voltswitch"]
                .map(String::from),
        )
    }

    #[test]
    fn test_reveal_fills_slots_and_clears_pool() {
        let mut set = moveset();
        for id in ["thunderbolt", "surf", "grassknot"] {
            set.reveal(id, 24);
        }
        assert!(set.could_have("hiddenpower"));

        set.reveal("hiddenpower", 24);
        assert!(set.is_complete());
        assert!(!set.could_have("voltswitch"));
        assert!(set.pool().is_empty());
    }

    #[test]
    fn test_use_pp_saturates() {
        let mut set = moveset();
        set.reveal("surf", 1);
        set.use_pp("surf", 2);
        assert_eq!(set.get("surf").unwrap().pp, 0);
    }

    #[test]
    fn test_rule_out_only_touches_pool() {
        let mut set = moveset();
        set.reveal("surf", 24);
        set.rule_out(|id| id == "surf" || id == "grassknot");
        assert!(set.contains("surf"));
        assert!(!set.could_have("grassknot"));
    }
}
