//! Gen 4 type system and effectiveness chart

use serde::{Deserialize, Serialize};

/// Pokemon types (17 types, Gen 2 through Gen 5)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Type {
    Normal = 0,
    Fire = 1,
    Water = 2,
    Electric = 3,
    Grass = 4,
    Ice = 5,
    Fighting = 6,
    Poison = 7,
    Ground = 8,
    Flying = 9,
    Psychic = 10,
    Bug = 11,
    Rock = 12,
    Ghost = 13,
    Dragon = 14,
    Dark = 15,
    Steel = 16,
}

impl Type {
    pub const ALL: [Type; 17] = [
        Type::Normal,
        Type::Fire,
        Type::Water,
        Type::Electric,
        Type::Grass,
        Type::Ice,
        Type::Fighting,
        Type::Poison,
        Type::Ground,
        Type::Flying,
        Type::Psychic,
        Type::Bug,
        Type::Rock,
        Type::Ghost,
        Type::Dragon,
        Type::Dark,
        Type::Steel,
    ];

    /// Effectiveness of this attacking type against one defending type
    pub fn effectiveness(&self, defender: Type) -> f32 {
        TYPE_CHART[*self as usize][defender as usize]
    }

    /// Parse a protocol or dex type name (case-insensitive)
    pub fn from_protocol(s: &str) -> Option<Self> {
        Type::ALL
            .into_iter()
            .find(|t| t.as_id() == s.to_ascii_lowercase())
    }

    pub fn as_id(&self) -> &'static str {
        match self {
            Type::Normal => "normal",
            Type::Fire => "fire",
            Type::Water => "water",
            Type::Electric => "electric",
            Type::Grass => "grass",
            Type::Ice => "ice",
            Type::Fighting => "fighting",
            Type::Poison => "poison",
            Type::Ground => "ground",
            Type::Flying => "flying",
            Type::Psychic => "psychic",
            Type::Bug => "bug",
            Type::Rock => "rock",
            Type::Ghost => "ghost",
            Type::Dragon => "dragon",
            Type::Dark => "dark",
            Type::Steel => "steel",
        }
    }

    /// Types Hidden Power can take (every type except Normal)
    pub fn hidden_power_types() -> impl Iterator<Item = Type> {
        Type::ALL.into_iter().filter(|t| *t != Type::Normal)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_id())
    }
}

/// Classified damage multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effectiveness {
    Immune,
    Resist,
    Regular,
    Super,
}

impl Effectiveness {
    /// Classify a multiplier; `binary` collapses everything but immunity to regular
    pub fn classify(multiplier: f32, binary: bool) -> Self {
        if multiplier <= 0.0 {
            Effectiveness::Immune
        } else if binary {
            Effectiveness::Regular
        } else if multiplier < 1.0 {
            Effectiveness::Resist
        } else if multiplier == 1.0 {
            Effectiveness::Regular
        } else {
            Effectiveness::Super
        }
    }
}

/// Product of per-type multipliers of `attacker` against every defending type
pub fn type_multiplier(defenders: &[Type], attacker: Type) -> f32 {
    defenders.iter().map(|t| attacker.effectiveness(*t)).product()
}

pub fn type_effectiveness(defenders: &[Type], attacker: Type, binary: bool) -> Effectiveness {
    Effectiveness::classify(type_multiplier(defenders, attacker), binary)
}

/// 17x17 type effectiveness chart
/// Row = attacking type, Column = defending type
///
/// Order: Normal, Fire, Water, Electric, Grass, Ice, Fighting, Poison, Ground,
///        Flying, Psychic, Bug, Rock, Ghost, Dragon, Dark, Steel
#[rustfmt::skip]
pub static TYPE_CHART: [[f32; 17]; 17] = [
    // Normal
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 0.0, 1.0, 1.0, 0.5],
    // Fire
    [1.0, 0.5, 0.5, 1.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 0.5, 1.0, 0.5, 1.0, 2.0],
    // Water
    [1.0, 2.0, 0.5, 1.0, 0.5, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5, 1.0, 1.0],
    // Electric
    [1.0, 1.0, 2.0, 0.5, 0.5, 1.0, 1.0, 1.0, 0.0, 2.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0],
    // Grass
    [1.0, 0.5, 2.0, 1.0, 0.5, 1.0, 1.0, 0.5, 2.0, 0.5, 1.0, 0.5, 2.0, 1.0, 0.5, 1.0, 0.5],
    // Ice
    [1.0, 0.5, 0.5, 1.0, 2.0, 0.5, 1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5],
    // Fighting
    [2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5, 1.0, 0.5, 0.5, 0.5, 2.0, 0.0, 1.0, 2.0, 2.0],
    // Poison
    [1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 0.5, 0.5, 1.0, 1.0, 1.0, 0.5, 0.5, 1.0, 1.0, 0.0],
    // Ground
    [1.0, 2.0, 1.0, 2.0, 0.5, 1.0, 1.0, 2.0, 1.0, 0.0, 1.0, 0.5, 2.0, 1.0, 1.0, 1.0, 2.0],
    // Flying
    [1.0, 1.0, 1.0, 0.5, 2.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 0.5, 1.0, 1.0, 1.0, 0.5],
    // Psychic
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 0.0, 0.5],
    // Bug
    [1.0, 0.5, 1.0, 1.0, 2.0, 1.0, 0.5, 0.5, 1.0, 0.5, 2.0, 1.0, 1.0, 0.5, 1.0, 2.0, 0.5],
    // Rock
    [1.0, 2.0, 1.0, 1.0, 1.0, 2.0, 0.5, 1.0, 0.5, 2.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 0.5],
    // Ghost
    [0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 1.0, 0.5, 0.5],
    // Dragon
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5],
    // Dark
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 1.0, 0.5, 0.5],
    // Steel
    [1.0, 0.5, 0.5, 0.5, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 0.5],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_multiplier() {
        assert_eq!(type_multiplier(&[Type::Water], Type::Electric), 2.0);
        assert_eq!(type_multiplier(&[Type::Ground], Type::Electric), 0.0);
        assert_eq!(type_multiplier(&[Type::Water, Type::Flying], Type::Electric), 4.0);
        assert_eq!(type_multiplier(&[Type::Water, Type::Rock], Type::Fire), 0.25);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Effectiveness::classify(0.5, false), Effectiveness::Resist);
        assert_eq!(Effectiveness::classify(0.0, false), Effectiveness::Immune);
        assert_eq!(Effectiveness::classify(1.0, false), Effectiveness::Regular);
        assert_eq!(Effectiveness::classify(4.0, false), Effectiveness::Super);
        assert_eq!(Effectiveness::classify(4.0, true), Effectiveness::Regular);
        assert_eq!(Effectiveness::classify(0.0, true), Effectiveness::Immune);
    }

    #[test]
    fn test_steel_resists_ghost_and_dark() {
        assert_eq!(Type::Ghost.effectiveness(Type::Steel), 0.5);
        assert_eq!(Type::Dark.effectiveness(Type::Steel), 0.5);
    }

    #[test]
    fn test_from_protocol() {
        assert_eq!(Type::from_protocol("Fire"), Some(Type::Fire));
        assert_eq!(Type::from_protocol("STEEL"), Some(Type::Steel));
        assert_eq!(Type::from_protocol("fairy"), None);
        assert_eq!(Type::hidden_power_types().count(), 16);
    }
}
