//! `|request|` JSON for gen 4 singles
//!
//! The server sends a request ahead of the log lines it answers. Only this
//! side's view is included: exact HP, stats, abilities and items of our own
//! team, plus per-move PP and trapping flags for the active slot.

use super::battle::{HpStatus, Player, PokemonDetails, PokemonIdent};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Echoed back with the choice so stale answers are ignored
    pub rqid: Option<u64>,
    #[serde(default)]
    pub active: Option<Vec<ActivePokemon>>,
    pub side: Option<SideInfo>,
    #[serde(default)]
    pub force_switch: Option<Vec<bool>>,
    #[serde(default)]
    pub team_preview: bool,
    /// The opponent is still choosing
    #[serde(default)]
    pub wait: bool,
}

impl BattleRequest {
    pub fn needs_decision(&self) -> bool {
        if self.wait {
            return false;
        }
        self.team_preview || self.is_force_switch() || self.active.is_some()
    }

    /// A fainted or pivoting pokemon has to be replaced before the turn goes on
    pub fn is_force_switch(&self) -> bool {
        matches!(&self.force_switch, Some(slots) if slots.contains(&true))
    }

    pub fn active_pokemon(&self) -> Option<&ActivePokemon> {
        self.active.as_deref()?.first()
    }

    pub fn player(&self) -> Option<Player> {
        self.side.as_ref()?.player()
    }

    /// Benched, conscious team members paired with their `switch N` index
    pub fn available_switches(&self) -> Vec<(usize, &SidePokemon)> {
        let Some(side) = &self.side else {
            return Vec::new();
        };
        (1..)
            .zip(&side.pokemon)
            .filter(|(_, mon)| !mon.active && !mon.is_fainted())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePokemon {
    #[serde(default)]
    pub moves: Vec<MoveSlot>,
    #[serde(default)]
    pub trapped: bool,
    /// Set instead of `trapped` when only an unrevealed ability could trap
    #[serde(default)]
    pub maybe_trapped: bool,
}

impl ActivePokemon {
    /// Usable moves paired with their `move N` index
    pub fn available_moves(&self) -> Vec<(usize, &MoveSlot)> {
        (1..).zip(&self.moves).filter(|(_, slot)| slot.is_usable()).collect()
    }

    /// `maybe_trapped` still offers switches; the server decides
    pub fn can_switch(&self) -> bool {
        !self.trapped
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub name: String,
    pub id: String,
    /// Missing while locked into a multi-turn move
    #[serde(default)]
    pub pp: Option<u32>,
    #[serde(rename = "maxpp", default)]
    pub max_pp: Option<u32>,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub disabled: bool,
}

impl MoveSlot {
    pub fn is_usable(&self) -> bool {
        if self.disabled {
            return false;
        }
        self.pp.is_none_or(|pp| pp > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SideInfo {
    pub name: String,
    /// "p1" or "p2"
    pub id: String,
    #[serde(default)]
    pub pokemon: Vec<SidePokemon>,
}

impl SideInfo {
    pub fn player(&self) -> Option<Player> {
        Player::parse(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePokemon {
    /// "p1: Pikachu"
    pub ident: String,
    /// "Pikachu, L88, M"
    pub details: String,
    /// "211/211", "97/211 par" or "0 fnt"
    pub condition: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub stats: PokemonStats,
    /// Move ids in slot order; hidden power carries its type and power suffix
    #[serde(default)]
    pub moves: Vec<String>,
    #[serde(default)]
    pub base_ability: String,
    /// Empty once the item is gone
    #[serde(default)]
    pub item: String,
}

impl SidePokemon {
    pub fn is_fainted(&self) -> bool {
        self.condition.ends_with("fnt")
    }

    pub fn ident(&self) -> Option<PokemonIdent> {
        PokemonIdent::parse(&self.ident)
    }

    pub fn details(&self) -> PokemonDetails {
        PokemonDetails::parse(&self.details)
    }

    pub fn hp_status(&self) -> Option<HpStatus> {
        HpStatus::parse(&self.condition)
    }

    /// Major status from the condition string, if any
    pub fn status(&self) -> Option<&str> {
        self.condition
            .split_once(' ')
            .map(|(_, status)| status)
            .filter(|status| *status != "fnt")
    }
}

/// Stats as shown in a request; HP is only known through `condition`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PokemonStats {
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}
