//! State updates for minor battle events
//!
//! Every event that is not a major action ends up here once no pathway
//! claims it. Besides applying the visible change, `[from]` suffixes that name
//! an ability or item reveal it on the pokemon that owns the effect.

use deduce_protocol::{BattleEvent, EffectSource, KwArgs, PokemonIdent, Stat, to_id};
use tracing::debug;

use super::ParserContext;
use super::effects::observe_status;
use crate::dex::{Dex, Effectiveness, Type};
use crate::error::{BattleError, Result};
use crate::state::{MonRef, NO_ITEM, Status, Volatile, WEATHER_TURNS, Weather};

/// Consume the next event and apply it
pub(super) fn apply_next(ctx: &mut ParserContext<'_>) -> Result<()> {
    let Some(event) = ctx.events.next() else {
        return Ok(());
    };

    match event {
        // === Handled by the parser loop ===
        BattleEvent::Player { .. }
        | BattleEvent::TeamSize { .. }
        | BattleEvent::GameType(_)
        | BattleEvent::Gen(_)
        | BattleEvent::Tier(_)
        | BattleEvent::Rated(_)
        | BattleEvent::Rule(_)
        | BattleEvent::ClearPoke
        | BattleEvent::Poke { .. }
        | BattleEvent::TeamPreview(_)
        | BattleEvent::Start
        | BattleEvent::Request(_)
        | BattleEvent::Error(_)
        | BattleEvent::Upkeep
        | BattleEvent::Turn(_)
        | BattleEvent::Win(_)
        | BattleEvent::Tie
        | BattleEvent::Halt
        | BattleEvent::Move { .. }
        | BattleEvent::Switch { .. }
        | BattleEvent::Drag { .. }
        | BattleEvent::Replace { .. }
        | BattleEvent::Swap { .. }
        | BattleEvent::Cant { .. } => {
            return Err(BattleError::mismatch("a minor event", event, "effect window"));
        }
        BattleEvent::Unsupported(tag) => {
            return Err(BattleError::unsupported(format!("{} is outside gen 4", tag)));
        }

        // === Nothing to track ===
        BattleEvent::Inactive(_)
        | BattleEvent::InactiveOff(_)
        | BattleEvent::Raw(_)
        | BattleEvent::Hint(_)
        | BattleEvent::Center
        | BattleEvent::Message(_)
        | BattleEvent::Crit(_)
        | BattleEvent::NoTarget(_)
        | BattleEvent::Miss { .. }
        | BattleEvent::Prepare { .. }
        | BattleEvent::MustRecharge(_)
        | BattleEvent::Nothing
        | BattleEvent::HitCount { .. }
        | BattleEvent::SingleMove { .. }
        | BattleEvent::SingleTurn { .. } => {}

        // === Pokemon ===
        BattleEvent::Faint(pokemon) => {
            let mon = ctx.state.resolve(pokemon)?;
            let record = ctx.state.mon_mut(mon);
            record.fainted = true;
            record.hp.current = 0;
            debug!(pokemon = %pokemon, "fainted");
        }
        BattleEvent::DetailsChange {
            pokemon,
            details,
            hp_status,
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            let species = ctx.dex.species(&details.species)?;
            let record = ctx.state.mon_mut(mon);
            record.species = to_id(&species.name);
            record.types = species.types.clone();
            if let Some(hp) = hp_status {
                record.hp.update(hp);
            }
        }
        BattleEvent::FormeChange {
            pokemon,
            species,
            hp_status,
            ..
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            let forme = ctx.dex.species(species)?;
            let record = ctx.state.mon_mut(mon);
            record.volatile.override_types = Some(forme.types.clone());
            if let Some(hp) = hp_status {
                record.hp.update(hp);
            }
        }
        BattleEvent::Transform {
            pokemon, target, ..
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            let copied = match target {
                Some(target) => {
                    let source = ctx.state.mon(ctx.state.resolve(target)?);
                    let ability = match &source.volatile.override_ability {
                        Some(ability) => Some(ability.clone()),
                        None => ctx.state.inference.definite(source.ability).map(String::from),
                    };
                    Some((
                        source.current_types().to_vec(),
                        source.volatile.boosts.clone(),
                        ability,
                    ))
                }
                None => None,
            };
            let record = ctx.state.mon_mut(mon);
            record.volatile.conditions.insert(Volatile::Transformed);
            if let Some((types, boosts, ability)) = copied {
                record.volatile.override_types = Some(types);
                record.volatile.boosts = boosts;
                record.volatile.override_ability = ability;
            }
        }

        // === HP ===
        BattleEvent::Damage {
            pokemon,
            hp_status,
            kwargs,
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            if let Some(hp) = hp_status {
                ctx.state.mon_mut(mon).hp.update(hp);
            }
            if kwargs.from.is_none()
                && let Some(move_ctx) = &mut ctx.move_ctx
                && move_ctx.target == Some(mon)
            {
                move_ctx.damaged = true;
            }
            let holder = owner(ctx, kwargs, mon)?;
            attribute(ctx, kwargs, holder)?;
        }
        BattleEvent::Heal {
            pokemon,
            hp_status,
            kwargs,
        }
        | BattleEvent::SetHp {
            pokemon,
            hp_status,
            kwargs,
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            if let Some(hp) = hp_status {
                ctx.state.mon_mut(mon).hp.update(hp);
            }
            attribute(ctx, kwargs, mon)?;
        }

        // === Status ===
        BattleEvent::Status {
            pokemon,
            status,
            kwargs,
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            let holder = owner(ctx, kwargs, mon)?;
            attribute(ctx, kwargs, holder)?;
            if let Some(status) = Status::from_protocol(status) {
                ctx.state.mon_mut(mon).status = Some(status);
                let source = match &ctx.move_ctx {
                    _ if holder != mon => Some(holder),
                    Some(move_ctx) if kwargs.from.is_none() => Some(move_ctx.user),
                    _ => None,
                };
                observe_status(ctx, mon, status, source)?;
            }
        }
        BattleEvent::CureStatus {
            pokemon, kwargs, ..
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            ctx.state.mon_mut(mon).status = None;
            attribute(ctx, kwargs, mon)?;
        }
        BattleEvent::CureTeam { pokemon, .. } => {
            for member in &mut ctx.state.team_mut(pokemon.player).pokemon {
                member.status = None;
            }
        }

        // === Boosts ===
        BattleEvent::Boost {
            pokemon,
            stat,
            amount,
            kwargs,
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            ctx.state.mon_mut(mon).volatile.boosts.boost(*stat, *amount);
            attribute(ctx, kwargs, mon)?;
        }
        BattleEvent::Unboost {
            pokemon,
            stat,
            amount,
            kwargs,
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            ctx.state
                .mon_mut(mon)
                .volatile
                .boosts
                .boost(*stat, amount.saturating_neg());
            attribute(ctx, kwargs, mon)?;
        }
        BattleEvent::SetBoost {
            pokemon,
            stat,
            amount,
            ..
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            ctx.state.mon_mut(mon).volatile.boosts.set(*stat, *amount);
        }
        BattleEvent::SwapBoost {
            source,
            target,
            stats,
            ..
        } => {
            let source = ctx.state.resolve(source)?;
            let target = ctx.state.resolve(target)?;
            let stats: Vec<Stat> = if stats.is_empty() {
                Stat::ALL.to_vec()
            } else {
                stats.clone()
            };
            for stat in stats {
                let a = ctx.state.mon(source).volatile.boosts.get(stat);
                let b = ctx.state.mon(target).volatile.boosts.get(stat);
                ctx.state.mon_mut(source).volatile.boosts.set(stat, b);
                ctx.state.mon_mut(target).volatile.boosts.set(stat, a);
            }
        }
        BattleEvent::CopyBoost { source, target, .. } => {
            let boosts = ctx.state.mon(ctx.state.resolve(source)?).volatile.boosts.clone();
            let target = ctx.state.resolve(target)?;
            ctx.state.mon_mut(target).volatile.boosts = boosts;
        }
        BattleEvent::InvertBoost(pokemon) => {
            let mon = ctx.state.resolve(pokemon)?;
            ctx.state.mon_mut(mon).volatile.boosts.invert();
        }
        BattleEvent::ClearBoost(pokemon) => {
            let mon = ctx.state.resolve(pokemon)?;
            ctx.state.mon_mut(mon).volatile.boosts.clear();
        }
        BattleEvent::ClearAllBoost => {
            for mon in ctx.state.actives() {
                ctx.state.mon_mut(mon).volatile.boosts.clear();
            }
        }
        BattleEvent::ClearPositiveBoost { target, .. } => {
            let mon = ctx.state.resolve(target)?;
            ctx.state.mon_mut(mon).volatile.boosts.clear_positive();
        }
        BattleEvent::ClearNegativeBoost(pokemon) => {
            let mon = ctx.state.resolve(pokemon)?;
            ctx.state.mon_mut(mon).volatile.boosts.clear_negative();
        }

        // === Field ===
        BattleEvent::Weather { weather, kwargs } => apply_weather(ctx, weather, kwargs)?,
        BattleEvent::FieldStart { condition, .. } => ctx.state.field.start_condition(condition),
        BattleEvent::FieldEnd { condition, .. } => ctx.state.field.end_condition(condition),
        BattleEvent::SideStart {
            side, condition, ..
        } => {
            let turn = ctx.state.turn;
            ctx.state.team_mut(side.player).add_condition(condition, turn);
        }
        BattleEvent::SideEnd {
            side, condition, ..
        } => ctx.state.team_mut(side.player).remove_condition(condition),

        // === Volatiles ===
        BattleEvent::VolatileStart {
            pokemon,
            effect,
            args,
            kwargs,
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            let holder = owner(ctx, kwargs, mon)?;
            attribute(ctx, kwargs, holder)?;
            if let Some(ability) = effect.strip_prefix("ability: ") {
                reveal_ability(ctx, mon, ability)?;
            }

            if to_id(effect) == "typechange" {
                let types: Vec<Type> = args
                    .first()
                    .map(|t| t.split('/').filter_map(Type::from_protocol).collect())
                    .unwrap_or_default();
                if !types.is_empty() {
                    ctx.state.mon_mut(mon).volatile.override_types = Some(types);
                }
            } else {
                ctx.state
                    .mon_mut(mon)
                    .volatile
                    .conditions
                    .insert(Volatile::from_protocol(effect));
            }
        }
        BattleEvent::VolatileEnd { pokemon, effect, .. } => {
            let mon = ctx.state.resolve(pokemon)?;
            let volatile = Volatile::from_protocol(effect);
            ctx.state.mon_mut(mon).volatile.conditions.remove(&volatile);
        }
        BattleEvent::Activate {
            pokemon,
            effect,
            kwargs,
            ..
        } => {
            let Some(pokemon) = pokemon else {
                return Ok(());
            };
            let mon = ctx.state.resolve(pokemon)?;
            match EffectSource::parse(effect) {
                EffectSource::Ability(name) => reveal_ability(ctx, mon, &name)?,
                EffectSource::Item(name) => reveal_item(ctx, mon, &name)?,
                EffectSource::Move(name) if matches!(to_id(&name).as_str(), "trick" | "switcheroo") => {
                    let other = kwargs
                        .of
                        .as_ref()
                        .map(|of| ctx.state.resolve(of))
                        .transpose()?;
                    if let Some(other) = other {
                        swap_items(ctx, mon, other)?;
                    }
                }
                _ => {
                    let volatile = Volatile::from_protocol(effect);
                    if volatile.traps() {
                        ctx.state.mon_mut(mon).volatile.conditions.insert(volatile);
                    }
                }
            }
        }
        BattleEvent::Block {
            pokemon, effect, ..
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            match EffectSource::parse(effect) {
                EffectSource::Ability(name) => reveal_ability(ctx, mon, &name)?,
                EffectSource::Item(name) => reveal_item(ctx, mon, &name)?,
                _ => {}
            }
        }
        BattleEvent::Fail {
            pokemon, kwargs, ..
        } => {
            let mon = ctx.state.resolve(pokemon)?;
            let holder = owner(ctx, kwargs, mon)?;
            attribute(ctx, kwargs, holder)?;
        }

        // === Effectiveness ===
        BattleEvent::SuperEffective(pokemon) => {
            let mon = ctx.state.resolve(pokemon)?;
            note_effectiveness(ctx, mon, Effectiveness::Super);
        }
        BattleEvent::Resisted(pokemon) => {
            let mon = ctx.state.resolve(pokemon)?;
            note_effectiveness(ctx, mon, Effectiveness::Resist);
        }
        BattleEvent::Immune { pokemon, kwargs } => {
            let mon = ctx.state.resolve(pokemon)?;
            attribute(ctx, kwargs, mon)?;
            note_effectiveness(ctx, mon, Effectiveness::Immune);
            if kwargs.from_ability().is_some()
                && let Some(move_ctx) = &mut ctx.move_ctx
                && move_ctx.target == Some(mon)
            {
                move_ctx.blocked = true;
            }
        }

        // === Items and abilities ===
        BattleEvent::Item {
            pokemon,
            item,
            kwargs,
        } => apply_item(ctx, pokemon, item, kwargs)?,
        BattleEvent::EndItem { pokemon, item, .. } => {
            let mon = ctx.state.resolve(pokemon)?;
            let id = ctx.dex.item(item)?.id().to_string();
            reveal_item(ctx, mon, &id)?;
            consume_item(ctx, mon, &id)?;
        }
        BattleEvent::Ability {
            pokemon,
            ability,
            kwargs,
        } => apply_ability(ctx, pokemon, ability, kwargs)?,
        BattleEvent::EndAbility { pokemon, .. } => {
            let mon = ctx.state.resolve(pokemon)?;
            ctx.state.mon_mut(mon).volatile.override_ability = Some(NO_ITEM.to_string());
        }
    }
    Ok(())
}

/// Pokemon that owns an ability or item effect named by `[from]`
fn owner(ctx: &ParserContext<'_>, kwargs: &KwArgs, subject: MonRef) -> Result<MonRef> {
    match (&kwargs.of, kwargs.source()) {
        (Some(of), Some(EffectSource::Ability(_) | EffectSource::Item(_))) => {
            ctx.state.resolve(of)
        }
        _ => Ok(subject),
    }
}

/// Reveal the ability or item a `[from]` suffix names on `holder`
fn attribute(ctx: &mut ParserContext<'_>, kwargs: &KwArgs, holder: MonRef) -> Result<()> {
    match kwargs.source() {
        Some(EffectSource::Ability(name)) => reveal_ability(ctx, holder, &name),
        Some(EffectSource::Item(name)) => reveal_item(ctx, holder, &name),
        _ => Ok(()),
    }
}

pub(super) fn reveal_ability(ctx: &mut ParserContext<'_>, holder: MonRef, name: &str) -> Result<()> {
    let id = ctx.dex.ability(name)?.id().to_string();
    let mon = ctx.state.mon(holder);
    let replaced = mon.volatile.override_ability.is_some() || mon.volatile.has(&Volatile::Transformed);
    if replaced {
        ctx.state.mon_mut(holder).volatile.override_ability = Some(id);
        return Ok(());
    }
    let class = mon.ability;
    ctx.state.inference.reveal(class, &id)
}

pub(super) fn reveal_item(ctx: &mut ParserContext<'_>, holder: MonRef, name: &str) -> Result<()> {
    let id = ctx.dex.item(name)?.id().to_string();
    let mon = ctx.state.mon(holder);
    // follow-up lines of an item that was just used up
    if mon.last_item.as_deref() == Some(id.as_str())
        && ctx.state.inference.definite(mon.item) == Some(NO_ITEM)
    {
        return Ok(());
    }
    let class = mon.item;
    ctx.state.inference.reveal(class, &id)
}

/// The held item is gone: the pokemon now holds nothing
pub(super) fn consume_item(ctx: &mut ParserContext<'_>, holder: MonRef, id: &str) -> Result<()> {
    let label = format!("{} item", ctx.state.mon(holder).name);
    let empty = ctx.state.inference.add_class(label, [NO_ITEM])?;
    let mon = ctx.state.mon_mut(holder);
    mon.item = empty;
    mon.last_item = Some(id.to_string());
    debug!(pokemon = %mon.name, item = id, "item consumed");
    Ok(())
}

/// The pokemon now holds `id`, which it did not hold before
fn gain_item(ctx: &mut ParserContext<'_>, holder: MonRef, id: &str) -> Result<()> {
    let previous = ctx.state.mon(holder).item;
    ctx.state.inference.reveal(previous, NO_ITEM)?;
    let label = format!("{} item", ctx.state.mon(holder).name);
    let class = ctx.state.inference.add_class(label, [id])?;
    ctx.state.mon_mut(holder).item = class;
    Ok(())
}

/// Trick and Switcheroo: exchange item handles, then read what each side received
fn swap_items(ctx: &mut ParserContext<'_>, user: MonRef, target: MonRef) -> Result<()> {
    let user_item = ctx.state.mon(user).item;
    let target_item = ctx.state.mon(target).item;
    ctx.state.mon_mut(user).item = target_item;
    ctx.state.mon_mut(target).item = user_item;
    for mon in [user, target] {
        ctx.state.mon_mut(mon).volatile.last_move = None;
    }

    let mut received = Vec::new();
    while let Some(BattleEvent::Item {
        pokemon,
        item,
        kwargs,
    }) = ctx.peek()
    {
        let from_swap = matches!(
            kwargs.source(),
            Some(EffectSource::Move(name)) if matches!(to_id(&name).as_str(), "trick" | "switcheroo")
        );
        if !from_swap {
            break;
        }
        let mon = ctx.state.resolve(pokemon)?;
        ctx.events.next();
        reveal_item(ctx, mon, item)?;
        received.push(mon);
    }

    for mon in [user, target] {
        if !received.contains(&mon) {
            let class = ctx.state.mon(mon).item;
            ctx.state.inference.reveal(class, NO_ITEM)?;
        }
    }
    debug!(?user, ?target, "items swapped");
    Ok(())
}

fn apply_item(
    ctx: &mut ParserContext<'_>,
    pokemon: &PokemonIdent,
    item: &str,
    kwargs: &KwArgs,
) -> Result<()> {
    let mon = ctx.state.resolve(pokemon)?;
    let id = ctx.dex.item(item)?.id().to_string();

    match kwargs.source() {
        Some(EffectSource::Ability(name)) => {
            // Frisk: the subject holds the item, `[of]` has the ability
            let frisker = match &kwargs.of {
                Some(of) => ctx.state.resolve(of)?,
                None => mon,
            };
            reveal_ability(ctx, frisker, &name)?;
            reveal_item(ctx, mon, &id)
        }
        Some(EffectSource::Move(name)) => match to_id(&name).as_str() {
            "trick" | "switcheroo" => reveal_item(ctx, mon, &id),
            _ => gain_item(ctx, mon, &id),
        },
        _ => reveal_item(ctx, mon, &id),
    }
}

fn apply_ability(
    ctx: &mut ParserContext<'_>,
    pokemon: &PokemonIdent,
    ability: &str,
    kwargs: &KwArgs,
) -> Result<()> {
    let mon = ctx.state.resolve(pokemon)?;
    let id = ctx.dex.ability(ability)?.id().to_string();

    match kwargs.source() {
        Some(EffectSource::Ability(name)) => {
            // Trace: the subject traced `ability` from `[of]`
            reveal_ability(ctx, mon, &name)?;
            if let Some(of) = &kwargs.of {
                let source = ctx.state.resolve(of)?;
                reveal_ability(ctx, source, &id)?;
            }
            ctx.state.mon_mut(mon).volatile.override_ability = Some(id);
        }
        Some(EffectSource::Move(_)) => {
            ctx.state.mon_mut(mon).volatile.override_ability = Some(id);
        }
        _ => reveal_ability(ctx, mon, &id)?,
    }
    Ok(())
}

fn apply_weather(ctx: &mut ParserContext<'_>, weather: &str, kwargs: &KwArgs) -> Result<()> {
    let Some(weather) = Weather::from_protocol(weather) else {
        return end_weather(ctx);
    };

    if kwargs.has("upkeep") {
        let Some(current) = ctx.state.field.weather.as_mut() else {
            ctx.state.field.start_weather(weather, false, None);
            return Ok(());
        };
        current.upkeeps += 1;
        let extended = !current.permanent && current.upkeeps >= WEATHER_TURNS;
        if extended && let Some(class) = current.source_item {
            let rocks = weather_rocks(ctx.dex, weather);
            debug!(weather = weather.as_id(), "weather outlasted its turns");
            ctx.state
                .inference
                .narrow(class, |v| rocks.iter().any(|r| r == v))?;
        }
        return Ok(());
    }

    if let Some(ability) = kwargs.from_ability() {
        let setter = match &kwargs.of {
            Some(of) => Some(ctx.state.resolve(of)?),
            None => None,
        };
        if let Some(setter) = setter {
            reveal_ability(ctx, setter, ability)?;
        }
        ctx.state.field.start_weather(weather, true, None);
        return Ok(());
    }

    let source_item = ctx
        .move_ctx
        .as_ref()
        .map(|move_ctx| ctx.state.mon(move_ctx.user).item);
    ctx.state.field.start_weather(weather, false, source_item);
    Ok(())
}

fn end_weather(ctx: &mut ParserContext<'_>) -> Result<()> {
    if let Some(current) = ctx.state.field.weather.clone()
        && !current.permanent
        && current.upkeeps + 1 == WEATHER_TURNS
        && let Some(class) = current.source_item
    {
        let rocks = weather_rocks(ctx.dex, current.weather);
        ctx.state
            .inference
            .remove(class, |v| rocks.iter().any(|r| r == v))?;
    }
    ctx.state.field.clear_weather();
    Ok(())
}

fn weather_rocks(dex: &Dex, weather: Weather) -> Vec<String> {
    dex.items_where(|i| i.flags.extends_weather.as_deref() == Some(weather.as_id()))
        .into_iter()
        .map(String::from)
        .collect()
}

fn note_effectiveness(ctx: &mut ParserContext<'_>, mon: MonRef, effectiveness: Effectiveness) {
    if let Some(move_ctx) = &mut ctx.move_ctx
        && move_ctx.target == Some(mon)
    {
        move_ctx.effectiveness = Some(effectiveness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MoveContext;
    use crate::testing::{Fixture, events};

    fn run(fixture: &mut Fixture, lines: &[&str]) {
        let batch = events(lines);
        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        while ctx.peek().is_some() {
            apply_next(&mut ctx).unwrap();
        }
    }

    #[test]
    fn test_from_reveals_on_of() {
        let mut fixture = Fixture::new("Pikachu", "Dugtrio");
        run(
            &mut fixture,
            &["|-status|p2a: Dugtrio|par|[from] ability: Static|[of] p1a: Pikachu"],
        );
        let pikachu = fixture.state.mon(fixture.p1());
        assert_eq!(fixture.state.inference.definite(pikachu.ability), Some("static"));
        assert_eq!(fixture.state.mon(fixture.p2()).status, Some(Status::Paralysis));
    }

    #[test]
    fn test_eaten_berry_leaves_nothing() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let snorlax = fixture.p2();
        let old = fixture.state.mon(snorlax).item;
        run(
            &mut fixture,
            &[
                "|-enditem|p2a: Snorlax|Sitrus Berry|[eat]",
                "|-heal|p2a: Snorlax|75/100|[from] item: Sitrus Berry",
            ],
        );
        let mon = fixture.state.mon(snorlax);
        assert_eq!(fixture.state.inference.definite(old), Some("sitrusberry"));
        assert_eq!(fixture.state.inference.definite(mon.item), Some(NO_ITEM));
        assert_eq!(mon.last_item.as_deref(), Some("sitrusberry"));
        assert_eq!(mon.hp.current, 75);
    }

    #[test]
    fn test_trick_swaps_handles() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let (pikachu, snorlax) = (fixture.p1(), fixture.p2());
        let pikachu_item = fixture.state.mon(pikachu).item;
        run(
            &mut fixture,
            &[
                "|-activate|p1a: Pikachu|move: Trick|[of] p2a: Snorlax",
                "|-item|p2a: Snorlax|Choice Scarf|[from] move: Trick",
                "|-item|p1a: Pikachu|Leftovers|[from] move: Trick",
            ],
        );
        assert_eq!(fixture.state.mon(snorlax).item, pikachu_item);
        assert_eq!(fixture.state.inference.definite(pikachu_item), Some("choicescarf"));
        let now = fixture.state.mon(pikachu).item;
        assert_eq!(fixture.state.inference.definite(now), Some("leftovers"));
    }

    #[test]
    fn test_item_less_trick_partner_held_nothing() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let snorlax_item = fixture.state.mon(fixture.p2()).item;
        run(
            &mut fixture,
            &[
                "|-activate|p1a: Pikachu|move: Trick|[of] p2a: Snorlax",
                "|-item|p2a: Snorlax|Choice Scarf|[from] move: Trick",
            ],
        );
        // pikachu now holds what snorlax had: nothing
        assert_eq!(fixture.state.inference.definite(snorlax_item), Some(NO_ITEM));
    }

    #[test]
    fn test_weather_rock_inferred_from_duration() {
        let mut fixture = Fixture::new("Tyranitar", "Snorlax");
        let setter = fixture.p1();
        let item = fixture.state.mon(setter).item;
        {
            let batch = events(&["|-weather|Sandstorm"]);
            let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
            ctx.move_ctx = Some(MoveContext {
                user: setter,
                target: None,
                move_id: "sandstorm".to_string(),
                damaged: false,
                effectiveness: None,
                blocked: false,
            });
            apply_next(&mut ctx).unwrap();
        }
        let upkeeps = vec!["|-weather|Sandstorm|[upkeep]"; 5];
        run(&mut fixture, &upkeeps);
        assert_eq!(fixture.state.inference.definite(item), Some("smoothrock"));
    }

    #[test]
    fn test_weather_ending_on_time_rules_out_rock() {
        let mut fixture = Fixture::new("Tyranitar", "Snorlax");
        let setter = fixture.p1();
        let item = fixture.state.mon(setter).item;
        fixture.state.field.start_weather(Weather::Sand, false, Some(item));
        let mut lines = vec!["|-weather|Sandstorm|[upkeep]"; 4];
        lines.push("|-weather|none");
        run(&mut fixture, &lines);
        assert!(!fixture.state.inference.is_possible(item, "smoothrock"));
        assert!(fixture.state.field.weather.is_none());
    }

    #[test]
    fn test_unsupported_tag_is_fatal() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let batch = vec![BattleEvent::Unsupported("-mega".to_string())];
        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        assert!(matches!(
            apply_next(&mut ctx),
            Err(BattleError::UnsupportedFormat(_))
        ));
    }
}
