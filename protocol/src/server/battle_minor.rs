//! Minor battle action message parsers
//!
//! These are secondary effects in battle: damage, stat changes, status, etc.
//! In the official client, they're usually displayed in smaller font.

use super::BattleEvent;
use super::battle::{
    PokemonIdent, Stat, parse_hp_status, parse_pokemon, parse_side, parse_stat, positional,
};
use super::kwargs::KwArgs;
use anyhow::Result;

/// Positional arguments from `start` up to the first keyword part
fn rest_positional(parts: &[&str], start: usize) -> Vec<String> {
    parts
        .iter()
        .skip(start)
        .take_while(|p| !p.starts_with('['))
        .map(|p| p.to_string())
        .collect()
}

fn parse_amount(parts: &[&str], index: usize) -> Result<i8> {
    parts
        .get(index)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing amount"))
}

/// Parse |-fail|POKEMON|ACTION
pub fn parse_fail(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Fail {
        pokemon: parse_pokemon(parts, 2)?,
        action: positional(parts, 3).map(|s| s.to_string()),
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-block|POKEMON|EFFECT|MOVE|ATTACKER
pub fn parse_block(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Block {
        pokemon: parse_pokemon(parts, 2)?,
        effect: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-notarget|POKEMON
pub fn parse_notarget(parts: &[&str]) -> Result<BattleEvent> {
    let pokemon = parts.get(2).and_then(|s| PokemonIdent::parse(s));
    Ok(BattleEvent::NoTarget(pokemon))
}

/// Parse |-miss|SOURCE|TARGET
pub fn parse_miss(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Miss {
        source: parse_pokemon(parts, 2)?,
        target: positional(parts, 3).and_then(PokemonIdent::parse),
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-damage|POKEMON|HP STATUS
pub fn parse_damage(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Damage {
        pokemon: parse_pokemon(parts, 2)?,
        hp_status: parse_hp_status(parts, 3),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-heal|POKEMON|HP STATUS
pub fn parse_heal(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Heal {
        pokemon: parse_pokemon(parts, 2)?,
        hp_status: parse_hp_status(parts, 3),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-sethp|POKEMON|HP
pub fn parse_sethp(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::SetHp {
        pokemon: parse_pokemon(parts, 2)?,
        hp_status: parse_hp_status(parts, 3),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-status|POKEMON|STATUS
pub fn parse_status(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Status {
        pokemon: parse_pokemon(parts, 2)?,
        status: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-curestatus|POKEMON|STATUS
pub fn parse_curestatus(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::CureStatus {
        pokemon: parse_pokemon(parts, 2)?,
        status: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-cureteam|POKEMON
pub fn parse_cureteam(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::CureTeam {
        pokemon: parse_pokemon(parts, 2)?,
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-boost|POKEMON|STAT|AMOUNT
pub fn parse_boost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Boost {
        pokemon: parse_pokemon(parts, 2)?,
        stat: parse_stat(parts, 3)?,
        amount: parse_amount(parts, 4)?,
        kwargs: KwArgs::parse(parts, 5),
    })
}

/// Parse |-unboost|POKEMON|STAT|AMOUNT
pub fn parse_unboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Unboost {
        pokemon: parse_pokemon(parts, 2)?,
        stat: parse_stat(parts, 3)?,
        amount: parse_amount(parts, 4)?,
        kwargs: KwArgs::parse(parts, 5),
    })
}

/// Parse |-setboost|POKEMON|STAT|AMOUNT
pub fn parse_setboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::SetBoost {
        pokemon: parse_pokemon(parts, 2)?,
        stat: parse_stat(parts, 3)?,
        amount: parse_amount(parts, 4)?,
        kwargs: KwArgs::parse(parts, 5),
    })
}

/// Parse |-swapboost|SOURCE|TARGET|STATS
pub fn parse_swapboost(parts: &[&str]) -> Result<BattleEvent> {
    let source = parse_pokemon(parts, 2)?;
    let target = parse_pokemon(parts, 3)?;
    let stats = positional(parts, 4)
        .map(|s| s.split(", ").filter_map(Stat::parse).collect())
        .unwrap_or_else(|| Stat::ALL.to_vec());

    Ok(BattleEvent::SwapBoost {
        source,
        target,
        stats,
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-invertboost|POKEMON
pub fn parse_invertboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::InvertBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-clearboost|POKEMON
pub fn parse_clearboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::ClearBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-clearpositiveboost|TARGET|POKEMON|EFFECT
pub fn parse_clearpositiveboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::ClearPositiveBoost {
        target: parse_pokemon(parts, 2)?,
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-clearnegativeboost|POKEMON
pub fn parse_clearnegativeboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::ClearNegativeBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-copyboost|SOURCE|TARGET
pub fn parse_copyboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::CopyBoost {
        source: parse_pokemon(parts, 2)?,
        target: parse_pokemon(parts, 3)?,
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-weather|WEATHER with optional [upkeep] / [from] / [of]
pub fn parse_weather(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Weather {
        weather: parts.get(2).unwrap_or(&"none").to_string(),
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-fieldstart|CONDITION
pub fn parse_fieldstart(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::FieldStart {
        condition: parts.get(2).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-fieldend|CONDITION
pub fn parse_fieldend(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::FieldEnd {
        condition: parts.get(2).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-sidestart|SIDE|CONDITION
pub fn parse_sidestart(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::SideStart {
        side: parse_side(parts, 2)?,
        condition: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-sideend|SIDE|CONDITION
pub fn parse_sideend(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::SideEnd {
        side: parse_side(parts, 2)?,
        condition: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-start|POKEMON|EFFECT|ARGS...
pub fn parse_start(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::VolatileStart {
        pokemon: parse_pokemon(parts, 2)?,
        effect: parts.get(3).unwrap_or(&"").to_string(),
        args: rest_positional(parts, 4),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-end|POKEMON|EFFECT
pub fn parse_end(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::VolatileEnd {
        pokemon: parse_pokemon(parts, 2)?,
        effect: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-crit|POKEMON
pub fn parse_crit(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Crit(parse_pokemon(parts, 2)?))
}

/// Parse |-supereffective|POKEMON
pub fn parse_supereffective(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::SuperEffective(parse_pokemon(parts, 2)?))
}

/// Parse |-resisted|POKEMON
pub fn parse_resisted(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Resisted(parse_pokemon(parts, 2)?))
}

/// Parse |-immune|POKEMON
pub fn parse_immune(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Immune {
        pokemon: parse_pokemon(parts, 2)?,
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-item|POKEMON|ITEM
pub fn parse_item(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Item {
        pokemon: parse_pokemon(parts, 2)?,
        item: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-enditem|POKEMON|ITEM
pub fn parse_enditem(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::EndItem {
        pokemon: parse_pokemon(parts, 2)?,
        item: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-ability|POKEMON|ABILITY
///
/// A trailing positional marker such as `boost` (Intimidate) is kept as a flag.
pub fn parse_ability(parts: &[&str]) -> Result<BattleEvent> {
    let mut kwargs = KwArgs::parse(parts, 4);
    kwargs.flags.extend(rest_positional(parts, 4));

    Ok(BattleEvent::Ability {
        pokemon: parse_pokemon(parts, 2)?,
        ability: parts.get(3).unwrap_or(&"").to_string(),
        kwargs,
    })
}

/// Parse |-endability|POKEMON
pub fn parse_endability(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::EndAbility {
        pokemon: parse_pokemon(parts, 2)?,
        kwargs: KwArgs::parse(parts, 3),
    })
}

/// Parse |-transform|POKEMON|TARGET
pub fn parse_transform(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Transform {
        pokemon: parse_pokemon(parts, 2)?,
        target: positional(parts, 3).and_then(PokemonIdent::parse),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-activate|POKEMON|EFFECT|ARGS...
pub fn parse_activate(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Activate {
        pokemon: parts.get(2).and_then(|s| PokemonIdent::parse(s)),
        effect: parts.get(3).unwrap_or(&"").to_string(),
        args: rest_positional(parts, 4),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-prepare|ATTACKER|MOVE
pub fn parse_prepare(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Prepare {
        pokemon: parse_pokemon(parts, 2)?,
        move_name: parts.get(3).unwrap_or(&"").to_string(),
    })
}

/// Parse |-mustrecharge|POKEMON
pub fn parse_mustrecharge(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::MustRecharge(parse_pokemon(parts, 2)?))
}

/// Parse |-hitcount|POKEMON|NUM
pub fn parse_hitcount(parts: &[&str]) -> Result<BattleEvent> {
    let pokemon = parse_pokemon(parts, 2)?;
    let count = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing hit count"))?;

    Ok(BattleEvent::HitCount { pokemon, count })
}

/// Parse |-singlemove|POKEMON|MOVE
pub fn parse_singlemove(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::SingleMove {
        pokemon: parse_pokemon(parts, 2)?,
        move_name: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}

/// Parse |-singleturn|POKEMON|MOVE
pub fn parse_singleturn(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::SingleTurn {
        pokemon: parse_pokemon(parts, 2)?,
        move_name: parts.get(3).unwrap_or(&"").to_string(),
        kwargs: KwArgs::parse(parts, 4),
    })
}
