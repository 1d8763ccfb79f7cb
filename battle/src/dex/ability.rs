//! Ability rule wrapper
//!
//! Each hook the row declares comes as a pair: a `can_*` check that says
//! whether the ability could produce its effect right now, and an `on_*`
//! parser that consumes the effect's events if they are next.

use std::fmt;

use deduce_protocol::{BattleEvent, EffectSource, KwArgs, Stat, to_id};
use tracing::debug;

use super::Dex;
use super::data::{
    Absorb, AbilityData, AbilityResidual, ContactEffect, StartEffect, TrapKind,
};
use super::types::{Effectiveness, Type, type_effectiveness};
use crate::error::Result;
use crate::inference::{Reasons, all_of, given};
use crate::parser::effects::status::ability_breakers;
use crate::parser::effects::{
    BoostTable, can_status, from_ability, parse_boosts, parse_cure, parse_damage, parse_heal,
    parse_status, unattributed,
};
use crate::parser::{Attempt, Hook, Legality, MoveContext, ParserContext};
use crate::state::{BattleState, MAX_STAGE, MonRef, NO_ITEM, Status, Volatile, Weather};

#[derive(Clone, Copy)]
pub struct Ability<'a> {
    dex: &'a Dex,
    id: &'a str,
    data: &'a AbilityData,
}

impl<'a> Ability<'a> {
    pub fn new(dex: &'a Dex, id: &'a str, data: &'a AbilityData) -> Self {
        Self { dex, id, data }
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    pub fn data(&self) -> &'a AbilityData {
        self.data
    }

    pub fn has_hook(&self, hook: Hook) -> bool {
        match hook {
            Hook::SwitchOut => self.data.on_switch_out.is_some(),
            Hook::Start => self.data.on_start.is_some(),
            Hook::Block => self.data.on_block.is_some(),
            Hook::Residual => self.data.on_residual.is_some(),
            Hook::Contact => self.data.on_contact.is_some(),
            Hook::Update | Hook::PostDamage => false,
        }
    }

    /// `holder` has this ability
    fn held(&self, state: &BattleState, holder: MonRef) -> Option<Reasons> {
        state.mon(holder).ability_in(&state.inference, &[self.id])
    }

    /// The foe's ability does not cancel this one
    fn unbroken(&self, state: &BattleState, user: MonRef) -> Option<Reasons> {
        let breakers = ability_breakers(self.dex);
        state.mon(user).ability_not_in(&state.inference, &breakers)
    }

    // === Switch out ===

    pub fn can_switch_out(&self, state: &BattleState, holder: MonRef) -> Option<Legality> {
        self.data.on_switch_out?;
        state.mon(holder).status?;
        // the cure is only announced in some cases
        self.held(state, holder).map(Legality::possible)
    }

    pub fn on_switch_out(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        let id = self.id;
        let cured = parse_cure(ctx, holder, &[], |k| from_ability(k, id) || k.has("msg"))?;
        Ok(committed(cured.is_some()))
    }

    // === Start ===

    pub fn can_start(&self, state: &BattleState, holder: MonRef) -> Option<Legality> {
        let effect = self.data.on_start.as_ref()?;
        let held = self.held(state, holder)?;
        let foe = state.foe(holder).filter(|f| state.mon(*f).is_alive());

        let reasons = match effect {
            StartEffect::Weather { weather } => {
                let weather = Weather::from_protocol(weather)?;
                let current = state.field.weather.as_ref();
                if current.is_some_and(|w| w.weather == weather && w.permanent) {
                    return None;
                }
                held
            }
            StartEffect::Intimidate { .. } | StartEffect::Forewarn | StartEffect::Download => {
                foe?;
                held
            }
            StartEffect::Frisk => {
                let foe = state.mon(foe?);
                all_of([Some(held), foe.item_not_in(&state.inference, &[NO_ITEM])])?
            }
            StartEffect::Announce => held,
        };
        Some(Legality::certain(reasons))
    }

    pub fn on_start(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        let Some(effect) = self.data.on_start.as_ref() else {
            return Ok(Attempt::NoMatch);
        };
        let id = self.id;

        match effect {
            StartEffect::Weather { weather } => {
                let expected = Weather::from_protocol(weather);
                let Some(BattleEvent::Weather { weather, kwargs }) = ctx.peek() else {
                    return Ok(Attempt::NoMatch);
                };
                if Weather::from_protocol(weather) != expected || !from_ability(kwargs, id) {
                    return Ok(Attempt::NoMatch);
                }
                ctx.apply_next()?;
            }
            StartEffect::Intimidate { stat, amount } => {
                if !self.announced(ctx, holder) {
                    return Ok(Attempt::NoMatch);
                }
                ctx.apply_next()?;
                if let Some(foe) = ctx.state.foe(holder) {
                    self.intimidate(ctx, foe, *stat, *amount)?;
                }
            }
            StartEffect::Forewarn => return self.forewarn(ctx, holder),
            StartEffect::Frisk => {
                let Some(BattleEvent::Item { kwargs, .. }) = ctx.peek() else {
                    return Ok(Attempt::NoMatch);
                };
                let by_holder = kwargs.of.as_ref().is_some_and(|of| ctx.is(of, holder));
                if !from_ability(kwargs, id) || !by_holder {
                    return Ok(Attempt::NoMatch);
                }
                ctx.apply_next()?;
            }
            StartEffect::Download => {
                let Some(BattleEvent::Boost {
                    pokemon,
                    stat: Stat::Atk | Stat::Spa,
                    kwargs,
                    ..
                }) = ctx.peek()
                else {
                    return Ok(Attempt::NoMatch);
                };
                if !ctx.is(pokemon, holder) || !from_ability(kwargs, id) {
                    return Ok(Attempt::NoMatch);
                }
                ctx.apply_next()?;
            }
            StartEffect::Announce => {
                if !self.announced(ctx, holder) {
                    return Ok(Attempt::NoMatch);
                }
                ctx.apply_next()?;
            }
        }
        Ok(Attempt::Committed)
    }

    /// The next event is `-ability` naming this ability on `holder`
    fn announced(&self, ctx: &ParserContext<'_>, holder: MonRef) -> bool {
        matches!(
            ctx.peek(),
            Some(BattleEvent::Ability { pokemon, ability, .. })
                if ctx.is(pokemon, holder) && to_id(ability) == self.id
        )
    }

    /// What follows the Intimidate announcement on `foe`
    fn intimidate(
        &self,
        ctx: &mut ParserContext<'_>,
        foe: MonRef,
        stat: Stat,
        amount: i8,
    ) -> Result<()> {
        match ctx.peek() {
            Some(BattleEvent::Fail { pokemon, .. } | BattleEvent::Immune { pokemon, .. })
                if ctx.is(pokemon, foe) =>
            {
                ctx.apply_next()
            }
            Some(BattleEvent::Activate {
                pokemon: Some(pokemon),
                ..
            }) if ctx.is(pokemon, foe) => ctx.apply_next(),
            _ => {
                let pending = BoostTable::from([(stat, amount)]);
                let missing = parse_boosts(ctx, foe, &pending, true, unattributed)?;
                if !missing.is_empty() {
                    debug!(?missing, "intimidate had no visible effect");
                }
                Ok(())
            }
        }
    }

    fn forewarn(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        let Some(BattleEvent::Activate {
            pokemon: Some(pokemon),
            effect,
            args,
            kwargs,
        }) = ctx.peek()
        else {
            return Ok(Attempt::NoMatch);
        };
        let names_self =
            matches!(EffectSource::parse(effect), EffectSource::Ability(name) if to_id(&name) == self.id);
        if !ctx.is(pokemon, holder) || !names_self {
            return Ok(Attempt::NoMatch);
        }
        let warned = match &kwargs.of {
            Some(of) => ctx.state.find(of),
            None => ctx.state.foe(holder),
        };
        let shown = args.first().map(|name| self.dex.move_(name)).transpose()?;
        ctx.apply_next()?;

        let warned = warned.filter(|f| !ctx.state.mon(*f).volatile.has(&Volatile::Transformed));
        if let (Some(foe), Some(shown)) = (warned, shown) {
            let power = shown.forewarn_power();
            let dex = self.dex;
            let moveset = &mut ctx.state.mon_mut(foe).moveset;
            moveset.reveal(shown.id(), shown.max_pp());
            moveset.rule_out(|id| dex.find_move(id).is_some_and(|m| m.forewarn_power() > power));
            debug!(shown = shown.id(), power, "forewarn");
        }
        Ok(Attempt::Committed)
    }

    // === Block ===

    pub fn can_block(
        &self,
        state: &BattleState,
        holder: MonRef,
        move_ctx: &MoveContext,
    ) -> Option<Legality> {
        let block = self.data.on_block.as_ref()?;
        if move_ctx.target != Some(holder) || move_ctx.user == holder {
            return None;
        }
        let mv = self.dex.find_move(&move_ctx.move_id)?;
        let types = mv.possible_types(state, move_ctx.user);
        let defenders = state.mon(holder).current_types();

        let blocked_types: Vec<Type> = types
            .iter()
            .copied()
            .filter(|t| {
                block.types.contains(t)
                    || (block.not_super_effective
                        && mv.is_damaging()
                        && type_effectiveness(defenders, *t, false) != Effectiveness::Super)
            })
            .collect();
        let by_sound = block.sound && mv.is_sound();
        if blocked_types.is_empty() && !by_sound {
            return None;
        }

        let reasons = all_of([
            self.held(state, holder),
            self.unbroken(state, move_ctx.user),
        ])?;
        let certain = by_sound || blocked_types.len() == types.len();
        Some(Legality::when(reasons, certain))
    }

    pub fn on_block(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        let Some(block) = self.data.on_block.as_ref() else {
            return Ok(Attempt::NoMatch);
        };
        let id = self.id;

        let matched = match ctx.peek() {
            Some(BattleEvent::Immune { pokemon, kwargs }) => {
                if !ctx.is(pokemon, holder) || !from_ability(kwargs, id) {
                    return Ok(Attempt::NoMatch);
                }
                ctx.apply_next()?;
                true
            }
            _ => match block.absorb {
                Some(Absorb::Heal) => parse_heal(ctx, holder, |k| from_ability(k, id))?,
                Some(Absorb::Boost { stat, amount }) => {
                    let before = ctx.events.position();
                    let pending = BoostTable::from([(stat, amount)]);
                    parse_boosts(ctx, holder, &pending, false, |k| from_ability(k, id))?;
                    ctx.events.position() != before
                }
                Some(Absorb::FlashFire) => match ctx.peek() {
                    Some(BattleEvent::VolatileStart { pokemon, effect, .. })
                        if ctx.is(pokemon, holder)
                            && Volatile::from_protocol(effect) == Volatile::FlashFire =>
                    {
                        ctx.apply_next()?;
                        true
                    }
                    _ => false,
                },
                None => false,
            },
        };

        if matched && let Some(move_ctx) = &mut ctx.move_ctx {
            move_ctx.blocked = true;
        }
        Ok(committed(matched))
    }

    // === Residual ===

    pub fn can_residual(&self, state: &BattleState, holder: MonRef) -> Option<Legality> {
        let residual = self.data.on_residual.as_ref()?;
        let mon = state.mon(holder);
        let held = self.held(state, holder)?;

        match residual {
            AbilityResidual::Boost { stat, amount } => {
                if mon.volatile.turns_active == 0 {
                    return None;
                }
                let current = mon.volatile.boosts.get(*stat);
                let capped = if *amount > 0 {
                    current >= MAX_STAGE
                } else {
                    current <= -MAX_STAGE
                };
                Some(Legality::when(held, !capped))
            }
            AbilityResidual::WeatherHeal { weather } => {
                let weather = Weather::from_protocol(weather)?;
                if state.field.weather() != Some(weather) || mon.hp.is_full() {
                    return None;
                }
                Some(Legality::certain(held))
            }
            AbilityResidual::CureStatus => {
                mon.status?;
                Some(Legality::possible(held))
            }
            AbilityResidual::PoisonHeal => {
                if !mon.status.is_some_and(|s| s.is_poison()) || mon.hp.is_full() {
                    return None;
                }
                Some(Legality::certain(held))
            }
        }
    }

    pub fn on_residual(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        let Some(residual) = self.data.on_residual.as_ref() else {
            return Ok(Attempt::NoMatch);
        };
        let id = self.id;

        let matched = match residual {
            AbilityResidual::Boost { stat, amount } => {
                let before = ctx.events.position();
                let pending = BoostTable::from([(*stat, *amount)]);
                parse_boosts(ctx, holder, &pending, false, |k| from_ability(k, id))?;
                ctx.events.position() != before
            }
            AbilityResidual::WeatherHeal { .. } | AbilityResidual::PoisonHeal => {
                parse_heal(ctx, holder, |k| from_ability(k, id))?
            }
            AbilityResidual::CureStatus => parse_cure(ctx, holder, &[], |k| from_ability(k, id))?.is_some(),
        };
        Ok(committed(matched))
    }

    // === Contact ===

    pub fn can_contact(
        &self,
        state: &BattleState,
        holder: MonRef,
        move_ctx: &MoveContext,
    ) -> Option<Legality> {
        let effect = self.data.on_contact.as_ref()?;
        if move_ctx.target != Some(holder) || move_ctx.user == holder || move_ctx.blocked {
            return None;
        }
        let mv = self.dex.find_move(&move_ctx.move_id)?;
        if !mv.makes_contact() {
            return None;
        }
        let user = state.mon(move_ctx.user);
        if !user.is_alive() {
            return None;
        }
        let held = self.held(state, holder)?;

        match effect {
            ContactEffect::Status { statuses } => {
                if user.status.is_some() {
                    return None;
                }
                let any_status = statuses.iter().filter_map(|s| Status::from_protocol(s)).any(|s| {
                    can_status(state, self.dex, move_ctx.user, s, Some(holder)).is_some()
                });
                given(any_status)?;
                Some(Legality::possible(held))
            }
            ContactEffect::Damage => {
                if !move_ctx.damaged {
                    return Some(Legality::possible(held));
                }
                let guards = self.dex.abilities_where(|a| a.flags.no_indirect_damage);
                let reasons = all_of([Some(held), user.ability_not_in(&state.inference, &guards)])?;
                Some(Legality::certain(reasons))
            }
        }
    }

    pub fn on_contact(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        let Some(effect) = self.data.on_contact.as_ref() else {
            return Ok(Attempt::NoMatch);
        };
        let Some(user) = ctx.move_ctx.as_ref().map(|m| m.user) else {
            return Ok(Attempt::NoMatch);
        };
        let id = self.id;
        let holder_name = ctx.state.mon(holder).name.clone();
        // `[of]` names the holder when present
        let attributed = |k: &KwArgs| {
            from_ability(k, id)
                && k.of
                    .as_ref()
                    .is_none_or(|of| of.player == holder.side && of.name == holder_name)
        };

        let matched = match effect {
            ContactEffect::Status { statuses } => {
                let statuses: Vec<Status> =
                    statuses.iter().filter_map(|s| Status::from_protocol(s)).collect();
                parse_status(ctx, user, &statuses, attributed)?.is_some()
            }
            ContactEffect::Damage => parse_damage(ctx, user, attributed)?,
        };
        Ok(committed(matched))
    }

    // === Trapping ===

    /// Whether this ability on `trapper` keeps `target` from switching
    pub fn can_trap(&self, state: &BattleState, trapper: MonRef, target: MonRef) -> bool {
        let Some(kind) = self.data.flags.trap else {
            return false;
        };
        let mon = state.mon(target);
        let inference = &state.inference;
        if !state.mon(trapper).is_alive() {
            return false;
        }
        let escapes = self.dex.items_where(|i| i.flags.escape);
        if inference
            .definite(mon.item)
            .is_some_and(|item| escapes.contains(&item))
        {
            return false;
        }

        match kind {
            TrapKind::All => !mon.ability_is_definitely(inference, self.id),
            TrapKind::Grounded => {
                let floating = self.dex.abilities_where(|a| a.flags.levitate);
                !mon.has_type(Type::Flying)
                    && !mon.volatile.has(&Volatile::MagnetRise)
                    && !mon.ability_surely_in(inference, &floating)
            }
            TrapKind::Steel => mon.has_type(Type::Steel),
        }
    }
}

fn committed(matched: bool) -> Attempt {
    if matched {
        Attempt::Committed
    } else {
        Attempt::NoMatch
    }
}

impl fmt::Debug for Ability<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ability").field(&self.id).finish()
    }
}
