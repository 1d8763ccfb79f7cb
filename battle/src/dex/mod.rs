//! Static rule data and the rule wrappers built over it
//!
//! The [`Dex`] is read-only input: it is loaded once from JSON and shared by
//! every battle. [`Ability`], [`Item`] and [`Move`] are borrowed views over
//! one row each; they carry the `can_*` legality checks and `on_*` event
//! parsers for the hooks their row declares.

mod ability;
pub mod data;
mod item;
mod moves;
pub mod types;

use deduce_protocol::to_id;

pub use ability::Ability;
pub use data::{
    AbilityData, BaseStats, DexFile, ItemData, MoveCategory, MoveData, SpeciesData,
};
pub use item::Item;
pub use moves::Move;
pub use types::{Effectiveness, Type, type_effectiveness, type_multiplier};

use crate::error::{BattleError, Result};

/// Read-only species/ability/item/move tables.
#[derive(Debug, Clone, Default)]
pub struct Dex {
    file: DexFile,
}

impl Dex {
    pub fn new(file: DexFile) -> Self {
        Self { file }
    }

    /// Load a dex document: `{"species": {...}, "abilities": {...}, "items": {...}, "moves": {...}}`
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DexFile =
            serde_json::from_str(json).map_err(|e| BattleError::Dex(e.to_string()))?;
        Ok(Self::new(file))
    }

    pub fn species(&self, name: &str) -> Result<&SpeciesData> {
        let id = to_id(name);
        self.file
            .species
            .get(&id)
            .ok_or_else(|| BattleError::unsupported(format!("unknown species {}", name)))
    }

    pub fn ability(&self, name: &str) -> Result<Ability<'_>> {
        let id = to_id(name);
        self.file
            .abilities
            .get_key_value(&id)
            .map(|(id, data)| Ability::new(self, id, data))
            .ok_or_else(|| BattleError::unsupported(format!("unknown ability {}", name)))
    }

    pub fn item(&self, name: &str) -> Result<Item<'_>> {
        let id = to_id(name);
        self.file
            .items
            .get_key_value(&id)
            .map(|(id, data)| Item::new(self, id, data))
            .ok_or_else(|| BattleError::unsupported(format!("unknown item {}", name)))
    }

    pub fn move_(&self, name: &str) -> Result<Move<'_>> {
        let id = to_id(name);
        self.file
            .moves
            .get_key_value(&id)
            .map(|(id, data)| Move::new(id, data))
            .ok_or_else(|| BattleError::unsupported(format!("unknown move {}", name)))
    }

    /// Ability row for an id taken from a possibility-class domain
    pub fn find_ability(&self, id: &str) -> Option<Ability<'_>> {
        self.file
            .abilities
            .get_key_value(id)
            .map(|(id, data)| Ability::new(self, id, data))
    }

    /// Item row for an id taken from a possibility-class domain; `none` has no row
    pub fn find_item(&self, id: &str) -> Option<Item<'_>> {
        self.file
            .items
            .get_key_value(id)
            .map(|(id, data)| Item::new(self, id, data))
    }

    pub fn find_move(&self, id: &str) -> Option<Move<'_>> {
        self.file
            .moves
            .get_key_value(id)
            .map(|(id, data)| Move::new(id, data))
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.file.items.keys().map(String::as_str)
    }

    pub fn move_ids(&self) -> impl Iterator<Item = &str> {
        self.file.moves.keys().map(String::as_str)
    }

    /// Ability ids whose row satisfies `pred`
    pub fn abilities_where(&self, pred: impl Fn(&AbilityData) -> bool) -> Vec<&str> {
        self.file
            .abilities
            .iter()
            .filter(|(_, data)| pred(data))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Item ids whose row satisfies `pred`
    pub fn items_where(&self, pred: impl Fn(&ItemData) -> bool) -> Vec<&str> {
        self.file
            .items
            .iter()
            .filter(|(_, data)| pred(data))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEX: &str = r#"{
        "species": {
            "pikachu": {"name": "Pikachu", "types": ["electric"],
                "baseStats": {"hp": 35, "atk": 55, "def": 30, "spa": 50, "spd": 40, "spe": 90},
                "abilities": ["static"]}
        },
        "abilities": {"static": {"name": "Static", "onContact": {"kind": "status", "statuses": ["par"]}}},
        "items": {"leftovers": {"name": "Leftovers", "onResidual": {"kind": "heal"}}},
        "moves": {"thunderbolt": {"name": "Thunderbolt", "type": "electric", "category": "Special", "basePower": 95, "pp": 15}}
    }"#;

    #[test]
    fn test_lookup_by_display_name() {
        let dex = Dex::from_json(DEX).unwrap();
        assert_eq!(dex.species("Pikachu").unwrap().types, vec![Type::Electric]);
        assert_eq!(dex.move_("Thunderbolt").unwrap().id(), "thunderbolt");
        assert_eq!(dex.item("Leftovers").unwrap().name(), "Leftovers");
        assert!(dex.ability("Static").unwrap().data().on_contact.is_some());
    }

    #[test]
    fn test_unknown_names_are_unsupported() {
        let dex = Dex::from_json(DEX).unwrap();
        assert!(matches!(
            dex.ability("Sheer Force"),
            Err(BattleError::UnsupportedFormat(_))
        ));
        assert!(dex.find_item("none").is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Dex::from_json("{"), Err(BattleError::Dex(_))));
    }
}
