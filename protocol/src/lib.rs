use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{Choice, ClientCommand, ClientMessage};
pub use server::battle::{
    GameType, HpStatus, Player, PokemonDetails, PokemonIdent, Side, Stat, parse_details,
    parse_hp_status, parse_pokemon,
};
pub use server::kwargs::{EffectSource, KwArgs};
pub use server::request::{
    ActivePokemon, BattleRequest, MoveSlot, PokemonStats, SideInfo, SidePokemon,
};
pub use server::{
    BattleEvent, ChoiceError, ChoiceErrorKind, ServerFrame, parse_server_frame,
    parse_server_message,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty message")]
    EmptyMessage,
}

/// Normalize a display name into a dex identifier ("Water Absorb" -> "waterabsorb")
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::to_id;

    #[test]
    fn test_to_id() {
        assert_eq!(to_id("Water Absorb"), "waterabsorb");
        assert_eq!(to_id("King's Rock"), "kingsrock");
        assert_eq!(to_id("Hidden Power [Fire]"), "hiddenpowerfire");
        assert_eq!(to_id(""), "");
    }
}
