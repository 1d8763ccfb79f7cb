//! Status conditions (volatile and non-volatile)

use serde::Serialize;

/// Non-volatile status conditions (persist through switching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Burn,
    Freeze,
    Paralysis,
    Poison,
    BadPoison,
    Sleep,
}

impl Status {
    /// Parse from protocol string ("brn", "frz", "par", "psn", "tox", "slp")
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s {
            "brn" => Some(Status::Burn),
            "frz" => Some(Status::Freeze),
            "par" => Some(Status::Paralysis),
            "psn" => Some(Status::Poison),
            "tox" => Some(Status::BadPoison),
            "slp" => Some(Status::Sleep),
            _ => None,
        }
    }

    pub fn to_protocol(&self) -> &'static str {
        match self {
            Status::Burn => "brn",
            Status::Freeze => "frz",
            Status::Paralysis => "par",
            Status::Poison => "psn",
            Status::BadPoison => "tox",
            Status::Sleep => "slp",
        }
    }

    pub fn is_poison(&self) -> bool {
        matches!(self, Status::Poison | Status::BadPoison)
    }
}

/// Volatile conditions (cleared on switching)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatile {
    Confusion,
    Substitute,
    LeechSeed,
    Curse,
    Nightmare,
    Ingrain,
    AquaRing,
    MagnetRise,
    FlashFire,
    Taunt,
    Encore,
    Disable,
    Torment,
    Attract,
    Yawn,
    Embargo,
    HealBlock,
    FocusEnergy,
    Charge,
    PerishSong,
    /// Mean Look, Block, Spider Web
    Trapped,
    /// Wrap, Bind, Fire Spin, Whirlpool, Sand Tomb, Clamp, Magma Storm
    PartialTrap,
    /// Two-turn semi-invulnerable moves (Fly, Dig, Dive, Bounce, Shadow Force)
    SemiInvulnerable,
    Transformed,
    /// Anything else shown with `-start`, keyed by id
    Other(String),
}

impl Volatile {
    /// Parse a `-start`/`-end` effect, with or without a `move: `/`ability: ` prefix
    pub fn from_protocol(effect: &str) -> Self {
        let name = effect
            .strip_prefix("move: ")
            .or_else(|| effect.strip_prefix("ability: "))
            .unwrap_or(effect);
        let id = deduce_protocol::to_id(name);

        match id.as_str() {
            "confusion" => Volatile::Confusion,
            "substitute" => Volatile::Substitute,
            "leechseed" => Volatile::LeechSeed,
            "curse" => Volatile::Curse,
            "nightmare" => Volatile::Nightmare,
            "ingrain" => Volatile::Ingrain,
            "aquaring" => Volatile::AquaRing,
            "magnetrise" => Volatile::MagnetRise,
            "flashfire" => Volatile::FlashFire,
            "taunt" => Volatile::Taunt,
            "encore" => Volatile::Encore,
            "disable" => Volatile::Disable,
            "torment" => Volatile::Torment,
            "attract" => Volatile::Attract,
            "yawn" => Volatile::Yawn,
            "embargo" => Volatile::Embargo,
            "healblock" => Volatile::HealBlock,
            "focusenergy" => Volatile::FocusEnergy,
            "charge" => Volatile::Charge,
            "perish0" | "perish1" | "perish2" | "perish3" => Volatile::PerishSong,
            "meanlook" | "block" | "spiderweb" | "trapped" => Volatile::Trapped,
            "wrap" | "bind" | "firespin" | "whirlpool" | "sandtomb" | "clamp" | "magmastorm"
            | "partiallytrapped" => Volatile::PartialTrap,
            "fly" | "dig" | "dive" | "bounce" | "shadowforce" => Volatile::SemiInvulnerable,
            _ => Volatile::Other(id),
        }
    }

    /// Whether this condition prevents switching (Shed Shell aside)
    pub fn traps(&self) -> bool {
        matches!(self, Volatile::Trapped | Volatile::PartialTrap | Volatile::Ingrain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_protocol_round_names() {
        assert_eq!(Status::from_protocol("tox"), Some(Status::BadPoison));
        assert!(Status::BadPoison.is_poison());
        assert_eq!(Status::from_protocol("fnt"), None);
    }

    #[test]
    fn test_volatile_prefixes() {
        assert_eq!(Volatile::from_protocol("move: Leech Seed"), Volatile::LeechSeed);
        assert_eq!(Volatile::from_protocol("ability: Flash Fire"), Volatile::FlashFire);
        assert_eq!(Volatile::from_protocol("perish2"), Volatile::PerishSong);
        assert_eq!(
            Volatile::from_protocol("Stockpile"),
            Volatile::Other("stockpile".to_string())
        );
        assert!(Volatile::from_protocol("move: Mean Look").traps());
    }
}
