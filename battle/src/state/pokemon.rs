//! Pokemon belief state

use std::collections::BTreeSet;

use deduce_protocol::{HpStatus, PokemonDetails, to_id};
use serde::Serialize;

use super::moveset::Moveset;
use super::stats::{StatStages, StatTable};
use super::status::{Status, Volatile};
use crate::dex::{Dex, Type};
use crate::error::Result;
use crate::inference::{ClassId, Inference, Reasons, given};

/// Item id used for "holds nothing"
pub const NO_ITEM: &str = "none";

/// HP as the protocol reports it: exact for our side, percent for the opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HpTracker {
    pub current: u32,
    pub max: u32,
    /// Whether `max` is the real max HP rather than 100 percent
    pub exact: bool,
}

impl HpTracker {
    pub fn percent() -> Self {
        Self {
            current: 100,
            max: 100,
            exact: false,
        }
    }

    pub fn update(&mut self, hp: &HpStatus) {
        self.current = hp.current;
        if let Some(max) = hp.max {
            self.max = max.max(1);
        }
        if hp.is_fainted() {
            self.current = 0;
        }
    }

    pub fn set_exact(&mut self, current: u32, max: u32) {
        self.current = current;
        self.max = max;
        self.exact = true;
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Whether `100 * hp / maxhp <= percent`.
    ///
    /// Percentages are rounded up by the server, so the comparison is exact
    /// for both views.
    pub fn at_most_percent(&self, percent: u32) -> bool {
        100 * self.current <= percent * self.max
    }
}

/// State that is reset when the pokemon leaves the field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolatileState {
    pub boosts: StatStages,
    pub conditions: BTreeSet<Volatile>,
    /// Ability replaced mid-battle (Trace, Skill Swap, Worry Seed), or suppressed by Gastro Acid
    pub override_ability: Option<String>,
    /// Types replaced by Conversion, Roost and similar effects
    pub override_types: Option<Vec<Type>>,
    /// Last move chosen since switching in, for choice-lock inference
    pub last_move: Option<String>,
    /// End-of-turn upkeeps survived since switching in
    pub turns_active: u32,
}

impl VolatileState {
    pub fn has(&self, volatile: &Volatile) -> bool {
        self.conditions.contains(volatile)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pokemon {
    /// Nickname as it appears in identifiers
    pub name: String,
    /// Species id
    pub species: String,
    pub level: u8,
    pub gender: Option<char>,
    pub types: Vec<Type>,
    pub hp: HpTracker,
    pub stats: StatTable,
    pub status: Option<Status>,
    pub volatile: VolatileState,
    pub moveset: Moveset,
    pub ability: ClassId,
    pub item: ClassId,
    pub hp_type: ClassId,
    /// Item consumed or removed most recently
    pub last_item: Option<String>,
    pub fainted: bool,
    pub active: bool,
}

impl Pokemon {
    /// Create a pokemon on first reveal, with every hidden attribute fully open
    pub fn new(
        inference: &mut Inference,
        dex: &Dex,
        name: &str,
        details: &PokemonDetails,
    ) -> Result<Self> {
        let species = dex.species(&details.species)?;
        let level = details.level.unwrap_or(100);
        let label = format!("{} ({})", name, species.name);

        let ability = inference.add_class(
            format!("{} ability", label),
            species.abilities.iter().map(String::as_str),
        )?;
        let item = inference.add_class(
            format!("{} item", label),
            dex.item_ids().chain([NO_ITEM]),
        )?;
        let hp_type = inference.add_class(
            format!("{} hidden power", label),
            Type::hidden_power_types().map(|t| t.as_id()),
        )?;

        let pool: Vec<String> = if species.movepool.is_empty() {
            dex.move_ids().map(String::from).collect()
        } else {
            species.movepool.clone()
        };

        Ok(Self {
            name: name.to_string(),
            species: to_id(&species.name),
            level,
            gender: details.gender,
            types: species.types.clone(),
            hp: HpTracker::percent(),
            stats: StatTable::from_base(&species.base_stats, level),
            status: None,
            volatile: VolatileState::default(),
            moveset: Moveset::new(pool),
            ability,
            item,
            hp_type,
            last_item: None,
            fainted: false,
            active: false,
        })
    }

    pub fn current_types(&self) -> &[Type] {
        self.volatile.override_types.as_deref().unwrap_or(&self.types)
    }

    pub fn has_type(&self, t: Type) -> bool {
        self.current_types().contains(&t)
    }

    /// The ability is one of `ids`
    pub fn ability_in(&self, inference: &Inference, ids: &[&str]) -> Option<Reasons> {
        match &self.volatile.override_ability {
            Some(current) => given(ids.contains(&current.as_str())),
            None => inference.reason_in(self.ability, ids.iter().copied()),
        }
    }

    /// The ability is none of `ids`
    pub fn ability_not_in(&self, inference: &Inference, ids: &[&str]) -> Option<Reasons> {
        match &self.volatile.override_ability {
            Some(current) => given(!ids.contains(&current.as_str())),
            None => inference.reason_not_in(self.ability, ids.iter().copied()),
        }
    }

    /// The ability is known to be `id`
    pub fn ability_is_definitely(&self, inference: &Inference, id: &str) -> bool {
        match &self.volatile.override_ability {
            Some(current) => current == id,
            None => inference.definite(self.ability) == Some(id),
        }
    }

    /// The ability is known to be one of `ids`
    pub fn ability_surely_in(&self, inference: &Inference, ids: &[&str]) -> bool {
        self.ability_in(inference, ids).is_some_and(|r| r.is_empty())
    }

    pub fn item_in(&self, inference: &Inference, ids: &[&str]) -> Option<Reasons> {
        inference.reason_in(self.item, ids.iter().copied())
    }

    pub fn item_not_in(&self, inference: &Inference, ids: &[&str]) -> Option<Reasons> {
        inference.reason_not_in(self.item, ids.iter().copied())
    }

    pub fn has_item(&self, inference: &Inference) -> bool {
        inference.definite(self.item) != Some(NO_ITEM)
    }

    pub fn is_alive(&self) -> bool {
        !self.fainted && self.hp.current > 0
    }

    /// Reset volatile state when leaving the field
    pub fn switch_out(&mut self) {
        self.volatile = VolatileState::default();
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_threshold_is_exact_for_both_views() {
        let mut hp = HpTracker::percent();
        hp.current = 50;
        assert!(hp.at_most_percent(50));
        hp.current = 51;
        assert!(!hp.at_most_percent(50));

        let mut exact = HpTracker::percent();
        exact.set_exact(101, 202);
        assert!(exact.at_most_percent(50));
        exact.set_exact(102, 202);
        assert!(!exact.at_most_percent(50));
    }

    #[test]
    fn test_update_keeps_real_max() {
        let mut hp = HpTracker::percent();
        hp.set_exact(200, 250);
        hp.update(&HpStatus::parse("120/250").unwrap());
        assert_eq!((hp.current, hp.max), (120, 250));

        hp.update(&HpStatus::parse("0 fnt").unwrap());
        assert_eq!(hp.current, 0);
    }
}
