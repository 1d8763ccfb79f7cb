//! Root battle belief state

use deduce_protocol::{Player, PokemonIdent, to_id};
use serde::Serialize;
use tracing::debug;

use super::field::FieldState;
use super::pokemon::{NO_ITEM, Pokemon};
use super::switch_in::SwitchIn;
use super::team::Team;
use crate::dex::{Dex, Type};
use crate::error::{BattleError, Result};
use crate::inference::Inference;

/// Handle to one pokemon: its side and its index in that team's roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonRef {
    pub side: Player,
    pub index: usize,
}

/// Everything the parser believes about one battle.
///
/// All hidden attributes live in `inference`; pokemon hold handles into it.
#[derive(Debug, Clone, Serialize)]
pub struct BattleState {
    pub generation: u8,
    pub format: String,
    pub turn: u32,
    /// The side our requests are for, once known
    pub perspective: Option<Player>,
    pub teams: [Team; 2],
    pub field: FieldState,
    pub inference: Inference,
    pub ended: bool,
    pub winner: Option<String>,
    pub tie: bool,
}

impl Default for BattleState {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleState {
    pub fn new() -> Self {
        Self {
            generation: 4,
            format: String::new(),
            turn: 0,
            perspective: None,
            teams: [Team::new(Player::P1), Team::new(Player::P2)],
            field: FieldState::new(),
            inference: Inference::new(),
            ended: false,
            winner: None,
            tie: false,
        }
    }

    pub fn team(&self, player: Player) -> &Team {
        &self.teams[player.index()]
    }

    pub fn team_mut(&mut self, player: Player) -> &mut Team {
        &mut self.teams[player.index()]
    }

    pub fn mon(&self, mon: MonRef) -> &Pokemon {
        &self.teams[mon.side.index()].pokemon[mon.index]
    }

    pub fn mon_mut(&mut self, mon: MonRef) -> &mut Pokemon {
        &mut self.teams[mon.side.index()].pokemon[mon.index]
    }

    pub fn active(&self, player: Player) -> Option<MonRef> {
        self.team(player).active.map(|index| MonRef {
            side: player,
            index,
        })
    }

    /// The pokemon facing `mon`
    pub fn foe(&self, mon: MonRef) -> Option<MonRef> {
        self.active(mon.side.opponent())
    }

    /// Both active pokemon, p1 first
    pub fn actives(&self) -> Vec<MonRef> {
        [Player::P1, Player::P2]
            .into_iter()
            .filter_map(|p| self.active(p))
            .collect()
    }

    pub fn find(&self, ident: &PokemonIdent) -> Option<MonRef> {
        self.team(ident.player).find(&ident.name).map(|index| MonRef {
            side: ident.player,
            index,
        })
    }

    /// Look up a pokemon an event refers to; it must already be revealed
    pub fn resolve(&self, ident: &PokemonIdent) -> Result<MonRef> {
        self.find(ident).ok_or_else(|| BattleError::ParseMismatch {
            expected: "a revealed pokemon".to_string(),
            event: ident.to_string(),
            context: "pokemon lookup".to_string(),
        })
    }

    /// Add a pokemon to its team on first sight, or return the existing one
    pub fn reveal(&mut self, dex: &Dex, info: &SwitchIn) -> Result<MonRef> {
        let team = self.team(info.player);
        if let Some(index) = team.find(&info.name) {
            return Ok(MonRef {
                side: info.player,
                index,
            });
        }

        let mut pokemon = Pokemon::new(&mut self.inference, dex, &info.name, &info.details())?;
        debug!(player = info.player.as_str(), name = %info.name, "revealed pokemon");
        if let Some(hp) = &info.hp {
            pokemon.hp.update(hp);
        }

        let team = self.team_mut(info.player);
        team.pokemon.push(pokemon);
        let mon = MonRef {
            side: info.player,
            index: team.pokemon.len() - 1,
        };
        self.learn(dex, mon, info)?;
        Ok(mon)
    }

    /// Apply the hidden attributes a switch-in description carries
    pub fn learn(&mut self, dex: &Dex, mon: MonRef, info: &SwitchIn) -> Result<()> {
        if let Some(ability) = &info.ability {
            let id = dex.ability(ability)?.id().to_string();
            let class = self.mon(mon).ability;
            self.inference.reveal(class, &id)?;
        }
        if let Some(item) = &info.item {
            let id = if item.is_empty() {
                NO_ITEM.to_string()
            } else {
                dex.item(item)?.id().to_string()
            };
            let class = self.mon(mon).item;
            self.inference.reveal(class, &id)?;
        }

        if !info.moves.is_empty() {
            let mut moves = Vec::new();
            for name in &info.moves {
                let (id, hp_type) = split_hidden_power(name);
                if let Some(hp_type) = hp_type {
                    let class = self.mon(mon).hp_type;
                    self.inference.reveal(class, hp_type.as_id())?;
                }
                let max_pp = dex.move_(&id)?.max_pp();
                moves.push((id, max_pp));
            }
            self.mon_mut(mon)
                .moveset
                .reveal_all(moves.iter().map(|(id, pp)| (id.as_str(), *pp)));
        }

        if let Some(stats) = &info.stats {
            let max_hp = info.hp.as_ref().and_then(|hp| hp.max);
            let pokemon = self.mon_mut(mon);
            pokemon.stats.reveal(stats, max_hp);
            if let Some(hp) = &info.hp {
                if let Some(max) = hp.max {
                    pokemon.hp.set_exact(hp.current, max);
                }
            }
        }
        Ok(())
    }

    /// JSON snapshot of the full state, stable across identical event logs
    pub fn snapshot(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BattleError::Protocol(e.to_string()))
    }
}

/// `hiddenpowerfire60` -> (`hiddenpower`, Fire)
pub fn split_hidden_power(name: &str) -> (String, Option<Type>) {
    let id = to_id(name);
    match id.strip_prefix("hiddenpower") {
        Some(rest) if !rest.is_empty() => {
            let type_name = rest.trim_end_matches(|c: char| c.is_ascii_digit());
            ("hiddenpower".to_string(), Type::from_protocol(type_name))
        }
        _ => (id, None),
    }
}
