//! Keyword arguments trailing a protocol line, e.g. `[from] item: Leftovers|[of] p2a: Snorlax`

use super::battle::PokemonIdent;

/// Keyword suffixes of one protocol line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KwArgs {
    /// `[from] EFFECT`
    pub from: Option<String>,
    /// `[of] POKEMON`
    pub of: Option<PokemonIdent>,
    /// Valueless flags such as `eat`, `miss`, `still`, `silent`, `upkeep`
    pub flags: Vec<String>,
    /// Any other keyword with a value, e.g. `[anim] Tackle` or `[wisher] Blissey`
    pub values: Vec<(String, String)>,
}

impl KwArgs {
    /// Collect every `[key]` part from `start` onwards.
    pub fn parse(parts: &[&str], start: usize) -> Self {
        let mut kwargs = KwArgs::default();

        for part in parts.iter().skip(start) {
            let Some(rest) = part.strip_prefix('[') else {
                continue;
            };
            let Some((key, value)) = rest.split_once(']') else {
                continue;
            };
            let value = value.trim();

            match (key, value.is_empty()) {
                ("from", false) => kwargs.from = Some(value.to_string()),
                ("of", false) => kwargs.of = PokemonIdent::parse(value),
                (_, true) => kwargs.flags.push(key.to_string()),
                (_, false) => kwargs.values.push((key.to_string(), value.to_string())),
            }
        }

        kwargs
    }

    pub fn has(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn source(&self) -> Option<EffectSource> {
        self.from.as_deref().map(EffectSource::parse)
    }

    /// Ability named by `[from] ability: X`
    pub fn from_ability(&self) -> Option<&str> {
        self.from.as_deref()?.strip_prefix("ability: ")
    }

    /// Item named by `[from] item: X`
    pub fn from_item(&self) -> Option<&str> {
        self.from.as_deref()?.strip_prefix("item: ")
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.of.is_none() && self.flags.is_empty() && self.values.is_empty()
    }
}

/// Classified `[from]` effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectSource {
    Ability(String),
    Item(String),
    Move(String),
    /// Statuses, weather, hazards and other unprefixed effects ("psn", "Stealth Rock")
    Other(String),
}

impl EffectSource {
    pub fn parse(s: &str) -> Self {
        if let Some(name) = s.strip_prefix("ability: ") {
            EffectSource::Ability(name.to_string())
        } else if let Some(name) = s.strip_prefix("item: ") {
            EffectSource::Item(name.to_string())
        } else if let Some(name) = s.strip_prefix("move: ") {
            EffectSource::Move(name.to_string())
        } else {
            EffectSource::Other(s.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EffectSource::Ability(n)
            | EffectSource::Item(n)
            | EffectSource::Move(n)
            | EffectSource::Other(n) => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Player;

    #[test]
    fn test_parse_from_and_of() {
        let parts = [
            "",
            "-damage",
            "p1a: Pikachu",
            "88/100",
            "[from] ability: Rough Skin",
            "[of] p2a: Garchomp",
        ];
        let kwargs = KwArgs::parse(&parts, 4);

        assert_eq!(kwargs.from_ability(), Some("Rough Skin"));
        let of = kwargs.of.unwrap();
        assert_eq!(of.player, Player::P2);
        assert_eq!(of.name, "Garchomp");
    }

    #[test]
    fn test_parse_flags_and_values() {
        let parts = ["", "move", "p1a: X", "Tackle", "", "[miss]", "[anim] Tackle"];
        let kwargs = KwArgs::parse(&parts, 4);

        assert!(kwargs.has("miss"));
        assert!(!kwargs.has("still"));
        assert_eq!(kwargs.value("anim"), Some("Tackle"));
    }

    #[test]
    fn test_effect_source() {
        assert_eq!(
            EffectSource::parse("item: Leftovers"),
            EffectSource::Item("Leftovers".into())
        );
        assert_eq!(EffectSource::parse("psn"), EffectSource::Other("psn".into()));
        assert_eq!(
            EffectSource::parse("move: Leech Seed").name(),
            "Leech Seed"
        );
    }
}
