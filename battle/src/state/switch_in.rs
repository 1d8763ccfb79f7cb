//! Flat description of a pokemon entering the field

use deduce_protocol::{HpStatus, Player, PokemonDetails, PokemonIdent, PokemonStats, SidePokemon};

use crate::error::{BattleError, Result};

/// Everything known about a pokemon as it is revealed.
///
/// Switch events fill the identity and HP; our own requests add the hidden
/// attributes. Fields a source cannot provide stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchIn {
    pub player: Player,
    pub name: String,
    pub species: String,
    pub level: Option<u8>,
    pub gender: Option<char>,
    pub shiny: bool,
    pub hp: Option<HpStatus>,
    /// Dragged in by Roar/Whirlwind rather than chosen
    pub forced: bool,
    pub ability: Option<String>,
    pub item: Option<String>,
    pub moves: Vec<String>,
    pub stats: Option<PokemonStats>,
}

impl SwitchIn {
    pub fn details(&self) -> PokemonDetails {
        PokemonDetails {
            species: self.species.clone(),
            level: self.level,
            gender: self.gender,
            shiny: self.shiny,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwitchInBuilder {
    player: Player,
    name: String,
    species: Option<String>,
    level: Option<u8>,
    gender: Option<char>,
    shiny: bool,
    hp: Option<HpStatus>,
    forced: bool,
    ability: Option<String>,
    item: Option<String>,
    moves: Vec<String>,
    stats: Option<PokemonStats>,
}

impl SwitchInBuilder {
    pub fn new(player: Player, name: impl Into<String>) -> Self {
        Self {
            player,
            name: name.into(),
            species: None,
            level: None,
            gender: None,
            shiny: false,
            hp: None,
            forced: false,
            ability: None,
            item: None,
            moves: Vec::new(),
            stats: None,
        }
    }

    pub fn from_ident(ident: &PokemonIdent) -> Self {
        Self::new(ident.player, ident.name.clone())
    }

    /// Start from one entry of our own request's team list
    pub fn from_request(player: Player, pokemon: &SidePokemon) -> Result<Self> {
        let ident = pokemon.ident().ok_or_else(|| {
            BattleError::Protocol(format!("bad request ident {}", pokemon.ident))
        })?;

        let mut builder = Self::new(player, ident.name)
            .details(&pokemon.details())
            .moves(pokemon.moves.iter().cloned())
            .stats(pokemon.stats.clone());
        if let Some(hp) = pokemon.hp_status() {
            builder = builder.hp(hp);
        }
        if !pokemon.base_ability.is_empty() {
            builder = builder.ability(pokemon.base_ability.clone());
        }
        builder = builder.item(pokemon.item.clone());
        Ok(builder)
    }

    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn details(mut self, details: &PokemonDetails) -> Self {
        self.species = Some(details.species.clone());
        self.level = details.level;
        self.gender = details.gender;
        self.shiny = details.shiny;
        self
    }

    pub fn hp(mut self, hp: HpStatus) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn forced(mut self, forced: bool) -> Self {
        self.forced = forced;
        self
    }

    pub fn ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = Some(ability.into());
        self
    }

    /// Held item id; an empty string means no item
    pub fn item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn moves(mut self, moves: impl IntoIterator<Item = String>) -> Self {
        self.moves = moves.into_iter().collect();
        self
    }

    pub fn stats(mut self, stats: PokemonStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn build(self) -> Result<SwitchIn> {
        let species = self.species.ok_or_else(|| {
            BattleError::Protocol(format!("switch-in of {} without species", self.name))
        })?;

        Ok(SwitchIn {
            player: self.player,
            name: self.name,
            species,
            level: self.level,
            gender: self.gender,
            shiny: self.shiny,
            hp: self.hp,
            forced: self.forced,
            ability: self.ability,
            item: self.item,
            moves: self.moves,
            stats: self.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_from_switch_event() {
        let ident = PokemonIdent::parse("p2a: Gyarados").unwrap();
        let switch = SwitchInBuilder::from_ident(&ident)
            .details(&PokemonDetails::parse("Gyarados, L81, F"))
            .hp(HpStatus::parse("100/100").unwrap())
            .build()
            .unwrap();

        assert_eq!(switch.player, Player::P2);
        assert_eq!(switch.species, "Gyarados");
        assert_eq!(switch.level, Some(81));
        assert!(switch.ability.is_none());
        assert!(!switch.forced);
    }

    #[test]
    fn test_builder_requires_species() {
        assert!(SwitchInBuilder::new(Player::P1, "Ditto").build().is_err());
    }
}
