//! Battle initialization message parsers
//!
//! These messages are sent at the start of a battle to set up the game state.

use super::BattleEvent;
use super::battle::{GameType, Player, PokemonDetails};
use anyhow::Result;

fn parse_player_slot(parts: &[&str]) -> Result<Player> {
    parts
        .get(2)
        .and_then(|s| Player::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing player"))
}

/// Parse |player|PLAYER|USERNAME|AVATAR|RATING
pub fn parse_player(parts: &[&str]) -> Result<BattleEvent> {
    let player = parse_player_slot(parts)?;
    let username = parts.get(3).unwrap_or(&"").to_string();
    let avatar = parts.get(4).unwrap_or(&"").to_string();
    let rating = parts.get(5).and_then(|s| s.parse().ok());

    Ok(BattleEvent::Player {
        player,
        username,
        avatar,
        rating,
    })
}

/// Parse |teamsize|PLAYER|NUMBER
pub fn parse_teamsize(parts: &[&str]) -> Result<BattleEvent> {
    let player = parse_player_slot(parts)?;
    let size = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing team size"))?;

    Ok(BattleEvent::TeamSize { player, size })
}

/// Parse |gametype|GAMETYPE
pub fn parse_gametype(parts: &[&str]) -> Result<BattleEvent> {
    let game_type = parts
        .get(2)
        .and_then(|s| GameType::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing game type"))?;

    Ok(BattleEvent::GameType(game_type))
}

/// Parse |gen|GENNUM
pub fn parse_gen(parts: &[&str]) -> Result<BattleEvent> {
    let generation = parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing generation"))?;

    Ok(BattleEvent::Gen(generation))
}

/// Parse |tier|FORMATNAME
pub fn parse_tier(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Tier(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |rated| or |rated|MESSAGE
pub fn parse_rated(parts: &[&str]) -> Result<BattleEvent> {
    let message = parts.get(2).filter(|s| !s.is_empty()).map(|s| s.to_string());
    Ok(BattleEvent::Rated(message))
}

/// Parse |rule|RULE: DESCRIPTION
pub fn parse_rule(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Rule(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |poke|PLAYER|DETAILS|ITEM
pub fn parse_poke(parts: &[&str]) -> Result<BattleEvent> {
    let player = parse_player_slot(parts)?;
    let details = parts
        .get(3)
        .map(|s| PokemonDetails::parse(s))
        .unwrap_or_default();
    let has_item = parts.get(4).is_some_and(|s| *s == "item");

    Ok(BattleEvent::Poke {
        player,
        details,
        has_item,
    })
}

/// Parse |teampreview or |teampreview|NUMBER
pub fn parse_teampreview(parts: &[&str]) -> Result<BattleEvent> {
    let count = parts.get(2).and_then(|s| s.parse().ok());
    Ok(BattleEvent::TeamPreview(count))
}
