//! Shared types for battle protocol messages

use crate::ParseError;
use serde::{Deserialize, Serialize};

/// Player in a two-player battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    P1,
    P2,
}

impl Player {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "p1" => Some(Player::P1),
            "p2" => Some(Player::P2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
        }
    }

    /// Zero-based side index
    pub fn index(&self) -> usize {
        match self {
            Player::P1 => 0,
            Player::P2 => 1,
        }
    }

    pub fn opponent(&self) -> Player {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }
}

/// Pokemon identifier in the form "POSITION: NAME" (e.g., "p1a: Pikachu")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonIdent {
    /// Player who owns this pokemon
    pub player: Player,
    /// Position letter (a for the active slot, or None for a bench reference)
    pub position: Option<char>,
    /// Pokemon's name/nickname
    pub name: String,
}

impl PokemonIdent {
    /// Parse a pokemon ID string like "p1a: Pikachu" or "p1: Pikachu"
    pub fn parse(s: &str) -> Option<Self> {
        let (pos_part, name) = s.split_once(": ")?;
        let player = Player::parse(pos_part.get(..2)?)?;
        let position = pos_part.chars().nth(2);

        Some(PokemonIdent {
            player,
            position,
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for PokemonIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}{}: {}", self.player.as_str(), pos, self.name),
            None => write!(f, "{}: {}", self.player.as_str(), self.name),
        }
    }
}

/// Pokemon details string (species, level, gender, shiny)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PokemonDetails {
    pub species: String,
    pub level: Option<u8>,
    pub gender: Option<char>,
    pub shiny: bool,
}

impl PokemonDetails {
    /// Parse a details string like "Pikachu, L50, M, shiny"
    pub fn parse(s: &str) -> Self {
        let mut details = PokemonDetails::default();
        let mut parts = s.split(", ");

        if let Some(species) = parts.next() {
            details.species = species.to_string();
        }

        for part in parts {
            if let Some(level_str) = part.strip_prefix('L') {
                details.level = level_str.parse().ok();
            } else if part == "M" {
                details.gender = Some('M');
            } else if part == "F" {
                details.gender = Some('F');
            } else if part == "shiny" {
                details.shiny = true;
            }
        }

        details
    }
}

/// HP and status as printed by the server: "211/211", "50/100 slp", "0 fnt".
///
/// Our own side reports raw HP; the opponent's is out of 100 (or 48 in
/// some formats), so `max` is kept as reported rather than assumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpStatus {
    pub current: u32,
    pub max: Option<u32>,
    pub status: Option<String>,
}

impl HpStatus {
    pub fn parse(s: &str) -> Option<Self> {
        let (hp, status) = match s.split_once(' ') {
            Some((hp, status)) => (hp, Some(status.trim().to_string())),
            None => (s, None),
        };
        let (current, max) = match hp.split_once('/') {
            Some((current, max)) => (current.parse().ok()?, Some(max.parse().ok()?)),
            None => (hp.parse().ok()?, None),
        };
        Some(HpStatus { current, max, status })
    }

    pub fn is_fainted(&self) -> bool {
        self.current == 0 || self.status.as_deref() == Some("fnt")
    }
}

/// `|gametype|`; anything but singles is rejected by the battle parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    Singles,
    Doubles,
    Triples,
    Multi,
    FreeForAll,
}

impl GameType {
    pub fn parse(s: &str) -> Option<Self> {
        let game_type = match s {
            "singles" => GameType::Singles,
            "doubles" => GameType::Doubles,
            "triples" => GameType::Triples,
            "multi" => GameType::Multi,
            "freeforall" => GameType::FreeForAll,
            _ => return None,
        };
        Some(game_type)
    }
}

/// A stat that takes boost stages
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

const STAT_NAMES: [(Stat, &str); 7] = [
    (Stat::Atk, "atk"),
    (Stat::Def, "def"),
    (Stat::Spa, "spa"),
    (Stat::Spd, "spd"),
    (Stat::Spe, "spe"),
    (Stat::Accuracy, "accuracy"),
    (Stat::Evasion, "evasion"),
];

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::Atk,
        Stat::Def,
        Stat::Spa,
        Stat::Spd,
        Stat::Spe,
        Stat::Accuracy,
        Stat::Evasion,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        STAT_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(stat, _)| *stat)
    }

    pub fn as_str(&self) -> &'static str {
        STAT_NAMES[*self as usize].1
    }
}

/// A side reference such as "p1: Alice" in `-sidestart`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub player: Player,
    pub raw: String,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        let player = Player::parse(s.get(..2)?)?;
        Some(Side {
            player,
            raw: s.to_string(),
        })
    }
}

fn required<T>(
    parts: &[&str],
    index: usize,
    field: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> anyhow::Result<T> {
    parts
        .get(index)
        .and_then(|&part| parse(part))
        .ok_or_else(|| ParseError::MissingField(field.to_string()).into())
}

pub fn parse_pokemon(parts: &[&str], index: usize) -> anyhow::Result<PokemonIdent> {
    required(parts, index, "pokemon", PokemonIdent::parse)
}

pub fn parse_side(parts: &[&str], index: usize) -> anyhow::Result<Side> {
    required(parts, index, "side", Side::parse)
}

pub fn parse_stat(parts: &[&str], index: usize) -> anyhow::Result<Stat> {
    required(parts, index, "stat", Stat::parse)
}

/// Missing details parse as an unknown species
pub fn parse_details(parts: &[&str], index: usize) -> PokemonDetails {
    parts
        .get(index)
        .map(|s| PokemonDetails::parse(s))
        .unwrap_or_default()
}

pub fn parse_hp_status(parts: &[&str], index: usize) -> Option<HpStatus> {
    parts.get(index).and_then(|s| HpStatus::parse(s))
}

/// Take positional arguments up to the first `[keyword]` part.
pub fn positional<'a>(parts: &[&'a str], index: usize) -> Option<&'a str> {
    parts
        .get(index)
        .copied()
        .filter(|p| !p.starts_with('['))
}
