//! Rule-data rows as stored in the dex JSON
//!
//! Rows describe only the hooks the battle parser interprets. Every field is
//! optional in the JSON so a row for a passive ability can be as small as
//! `{"name": "Keen Eye"}`.

use std::collections::BTreeMap;

use deduce_protocol::Stat;
use serde::Deserialize;

use super::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesData {
    pub name: String,
    pub types: Vec<Type>,
    pub base_stats: BaseStats,
    /// Ability ids this species may have
    pub abilities: Vec<String>,
    /// Move ids this species may know; empty means any move in the dex
    #[serde(default)]
    pub movepool: Vec<String>,
}

// === Abilities ===

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityData {
    pub name: String,
    #[serde(default)]
    pub on_switch_out: Option<SwitchOutEffect>,
    #[serde(default)]
    pub on_start: Option<StartEffect>,
    #[serde(default)]
    pub on_block: Option<BlockEffect>,
    #[serde(default)]
    pub on_residual: Option<AbilityResidual>,
    #[serde(default)]
    pub on_contact: Option<ContactEffect>,
    /// Major statuses this ability prevents ("slp", "psn", ...)
    #[serde(default)]
    pub status_immunity: Vec<String>,
    /// Weathers whose residual damage this ability prevents
    #[serde(default)]
    pub weather_immunity: Vec<String>,
    #[serde(default)]
    pub flags: AbilityFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwitchOutEffect {
    /// Natural Cure
    CureStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StartEffect {
    /// Drizzle, Drought, Sand Stream, Snow Warning
    Weather { weather: String },
    /// Lowers the opponent's stat, announced with `-ability ... boost`
    Intimidate {
        #[serde(default = "default_intimidate_stat")]
        stat: Stat,
        #[serde(default = "default_intimidate_amount")]
        amount: i8,
    },
    Forewarn,
    Frisk,
    /// Raises Atk or SpA depending on the opponent's defenses
    Download,
    /// Abilities that only announce themselves on entry (Pressure, Mold Breaker)
    Announce,
}

fn default_intimidate_stat() -> Stat {
    Stat::Atk
}

fn default_intimidate_amount() -> i8 {
    -1
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEffect {
    /// Move types this ability blocks
    #[serde(default)]
    pub types: Vec<Type>,
    /// Blocks sound-based moves
    #[serde(default)]
    pub sound: bool,
    /// Blocks damaging moves that are not super effective (Wonder Guard)
    #[serde(default)]
    pub not_super_effective: bool,
    #[serde(default)]
    pub absorb: Option<Absorb>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Absorb {
    /// Heals instead of taking damage (Volt Absorb, Water Absorb, Dry Skin)
    Heal,
    /// Raises a stat instead of taking damage (Motor Drive)
    Boost { stat: Stat, amount: i8 },
    /// Flash Fire
    FlashFire,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AbilityResidual {
    /// Speed Boost
    Boost { stat: Stat, amount: i8 },
    /// Rain Dish, Ice Body
    WeatherHeal { weather: String },
    /// Shed Skin (chance-based)
    CureStatus,
    /// Poison Heal: replaces poison damage with healing
    PoisonHeal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContactEffect {
    /// Static, Flame Body, Poison Point, Effect Spore (chance-based)
    Status { statuses: Vec<String> },
    /// Rough Skin
    Damage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityFlags {
    /// Mold Breaker
    #[serde(default)]
    pub ignore_abilities: bool,
    /// Klutz
    #[serde(default)]
    pub ignore_item: bool,
    /// Magic Guard
    #[serde(default)]
    pub no_indirect_damage: bool,
    /// Gluttony
    #[serde(default)]
    pub early_berry: bool,
    /// Shadow Tag, Arena Trap, Magnet Pull
    #[serde(default)]
    pub trap: Option<TrapKind>,
    /// Levitate-style ground immunity, for Arena Trap checks
    #[serde(default)]
    pub levitate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrapKind {
    /// Traps anything but another Shadow Tag user
    All,
    /// Traps grounded targets
    Grounded,
    /// Traps Steel types
    Steel,
}

// === Items ===

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub name: String,
    #[serde(default)]
    pub on_residual: Option<ItemResidual>,
    #[serde(default)]
    pub on_update: Option<ItemUpdate>,
    #[serde(default)]
    pub on_post_damage: Option<ItemPostDamage>,
    /// Type whose super-effective hits this berry weakens; `normal` always triggers
    #[serde(default)]
    pub weaken_type: Option<Type>,
    #[serde(default)]
    pub flags: ItemFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemResidual {
    /// Leftovers
    Heal,
    /// Black Sludge: heals poison types, damages everything else
    PoisonHeal,
    /// Flame Orb, Toxic Orb
    Status { status: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemUpdate {
    /// Sitrus, Oran, and the 50% confusion berries
    HpHeal { threshold: u32 },
    /// Liechi, Salac and the other pinch berries
    HpBoost {
        threshold: u32,
        #[serde(default)]
        boosts: BTreeMap<Stat, i8>,
    },
    /// Lum, Chesto and the other status berries
    Cure { statuses: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemPostDamage {
    /// Life Orb
    Recoil,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFlags {
    /// Choice Band, Choice Specs, Choice Scarf
    #[serde(default)]
    pub choice: bool,
    #[serde(default)]
    pub berry: bool,
    /// Weather this rock extends from 5 to 8 turns
    #[serde(default)]
    pub extends_weather: Option<String>,
    /// Shed Shell
    #[serde(default)]
    pub escape: bool,
}

// === Moves ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFlags {
    #[serde(default)]
    pub contact: bool,
    #[serde(default)]
    pub sound: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: Type,
    pub category: MoveCategory,
    #[serde(default)]
    pub base_power: u32,
    pub pp: u32,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default)]
    pub flags: MoveFlags,
    #[serde(default)]
    pub ohko: bool,
    /// Major status inflicted on the target by a status move
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub boosts: BTreeMap<Stat, i8>,
    #[serde(default)]
    pub self_boosts: BTreeMap<Stat, i8>,
    /// Weather started by this move
    #[serde(default)]
    pub weather: Option<String>,
}

fn default_target() -> String {
    "normal".to_string()
}

/// Top-level layout of a dex JSON document, keyed by id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexFile {
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesData>,
    #[serde(default)]
    pub abilities: BTreeMap<String, AbilityData>,
    #[serde(default)]
    pub items: BTreeMap<String, ItemData>,
    #[serde(default)]
    pub moves: BTreeMap<String, MoveData>,
}
