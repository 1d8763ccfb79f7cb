//! Major battle action message parsers
//!
//! These are the primary actions in battle: moves, switches, faints, etc.

use super::BattleEvent;
use super::battle::{PokemonIdent, parse_details, parse_hp_status, parse_pokemon, positional};
use super::kwargs::KwArgs;
use anyhow::Result;

/// Parse |move|POKEMON|MOVE|TARGET with optional tags
pub fn parse_move(parts: &[&str]) -> Result<BattleEvent> {
    let pokemon = parse_pokemon(parts, 2)?;
    let move_name = parts.get(3).unwrap_or(&"").to_string();
    let target = positional(parts, 4).and_then(PokemonIdent::parse);

    Ok(BattleEvent::Move {
        pokemon,
        move_name,
        target,
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |switch|POKEMON|DETAILS|HP STATUS
pub fn parse_switch(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Switch {
        pokemon: parse_pokemon(parts, 2)?,
        details: parse_details(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |drag|POKEMON|DETAILS|HP STATUS
pub fn parse_drag(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Drag {
        pokemon: parse_pokemon(parts, 2)?,
        details: parse_details(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |detailschange|POKEMON|DETAILS|HP STATUS
pub fn parse_detailschange(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::DetailsChange {
        pokemon: parse_pokemon(parts, 2)?,
        details: parse_details(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |-formechange|POKEMON|SPECIES|HP STATUS
pub fn parse_formechange(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::FormeChange {
        pokemon: parse_pokemon(parts, 2)?,
        species: parts.get(3).unwrap_or(&"").to_string(),
        hp_status: positional(parts, 4).and_then(super::battle::HpStatus::parse),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |replace|POKEMON|DETAILS|HP STATUS
pub fn parse_replace(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Replace {
        pokemon: parse_pokemon(parts, 2)?,
        details: parse_details(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |swap|POKEMON|POSITION
pub fn parse_swap(parts: &[&str]) -> Result<BattleEvent> {
    let pokemon = parse_pokemon(parts, 2)?;
    let position = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing position"))?;

    Ok(BattleEvent::Swap { pokemon, position })
}

/// Parse |cant|POKEMON|REASON or |cant|POKEMON|REASON|MOVE
pub fn parse_cant(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Cant {
        pokemon: parse_pokemon(parts, 2)?,
        reason: parts.get(3).unwrap_or(&"").to_string(),
        move_name: positional(parts, 4).map(|s| s.to_string()),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |faint|POKEMON
pub fn parse_faint(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Faint(parse_pokemon(parts, 2)?))
}
