//! Item rule wrapper

use std::fmt;

use deduce_protocol::{BattleEvent, to_id};

use super::Dex;
use super::data::{ItemData, ItemResidual, ItemUpdate};
use super::types::{Effectiveness, Type, type_effectiveness};
use crate::error::Result;
use crate::inference::{Reasons, all_of};
use crate::parser::effects::{
    BoostTable, any, can_status, from_item, parse_boosts, parse_cure, parse_damage, parse_heal,
    parse_status,
};
use crate::parser::{Attempt, Hook, Legality, MoveContext, ParserContext};
use crate::state::{BattleState, MonRef, Status, Volatile};

/// Pinch berries Gluttony lets the holder eat at half HP
const GLUTTONY_THRESHOLD: u32 = 25;

#[derive(Clone, Copy)]
pub struct Item<'a> {
    dex: &'a Dex,
    id: &'a str,
    data: &'a ItemData,
}

impl<'a> Item<'a> {
    pub fn new(dex: &'a Dex, id: &'a str, data: &'a ItemData) -> Self {
        Self { dex, id, data }
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    pub fn data(&self) -> &'a ItemData {
        self.data
    }

    pub fn has_hook(&self, hook: Hook) -> bool {
        match hook {
            Hook::Residual => self.data.on_residual.is_some(),
            Hook::Update => self.data.on_update.is_some() || self.data.weaken_type.is_some(),
            Hook::PostDamage => self.data.on_post_damage.is_some(),
            Hook::SwitchOut | Hook::Start | Hook::Block | Hook::Contact => false,
        }
    }

    /// `holder` has this item and neither Embargo nor its ability suppresses it
    fn held(&self, state: &BattleState, holder: MonRef) -> Option<Reasons> {
        let mon = state.mon(holder);
        if mon.volatile.has(&Volatile::Embargo) {
            return None;
        }
        let klutz = self.dex.abilities_where(|a| a.flags.ignore_item);
        all_of([
            mon.item_in(&state.inference, &[self.id]),
            mon.ability_not_in(&state.inference, &klutz),
        ])
    }

    /// Indirect damage to `holder` is not prevented by its ability
    fn hurts(&self, state: &BattleState, holder: MonRef) -> Option<Reasons> {
        let guards = self.dex.abilities_where(|a| a.flags.no_indirect_damage);
        state.mon(holder).ability_not_in(&state.inference, &guards)
    }

    // === Residual ===

    pub fn can_residual(&self, state: &BattleState, holder: MonRef) -> Option<Legality> {
        let residual = self.data.on_residual.as_ref()?;
        let mon = state.mon(holder);
        let held = self.held(state, holder)?;

        let reasons = match residual {
            ItemResidual::Heal => {
                if mon.hp.is_full() {
                    return None;
                }
                held
            }
            ItemResidual::PoisonHeal if mon.has_type(Type::Poison) => {
                if mon.hp.is_full() {
                    return None;
                }
                held
            }
            ItemResidual::PoisonHeal => all_of([Some(held), self.hurts(state, holder)])?,
            ItemResidual::Status { status } => {
                let status = Status::from_protocol(status)?;
                all_of([Some(held), can_status(state, self.dex, holder, status, Some(holder))])?
            }
        };
        Some(Legality::certain(reasons))
    }

    pub fn on_residual(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        let Some(residual) = self.data.on_residual.as_ref() else {
            return Ok(Attempt::NoMatch);
        };
        let id = self.id;

        let matched = match residual {
            ItemResidual::Heal => parse_heal(ctx, holder, |k| from_item(k, id))?,
            ItemResidual::PoisonHeal => {
                parse_heal(ctx, holder, |k| from_item(k, id))?
                    || parse_damage(ctx, holder, |k| from_item(k, id))?
            }
            ItemResidual::Status { status } => {
                let statuses: Vec<Status> = Status::from_protocol(status).into_iter().collect();
                parse_status(ctx, holder, &statuses, |k| from_item(k, id))?.is_some()
            }
        };
        Ok(committed(matched))
    }

    // === Update ===

    pub fn can_update(
        &self,
        state: &BattleState,
        holder: MonRef,
        move_ctx: Option<&MoveContext>,
    ) -> Option<Legality> {
        let mon = state.mon(holder);
        if !mon.is_alive() {
            return None;
        }
        if let Some(weakened) = self.data.weaken_type {
            return self.can_weaken(state, holder, weakened, move_ctx?);
        }
        let update = self.data.on_update.as_ref()?;
        let held = self.held(state, holder)?;

        match update {
            ItemUpdate::HpHeal { threshold } => {
                mon.hp.at_most_percent(*threshold).then(|| Legality::certain(held))
            }
            ItemUpdate::HpBoost { threshold, .. } => {
                if mon.hp.at_most_percent(*threshold) {
                    return Some(Legality::certain(held));
                }
                if *threshold != GLUTTONY_THRESHOLD || !mon.hp.at_most_percent(50) {
                    return None;
                }
                let gluttony = self.dex.abilities_where(|a| a.flags.early_berry);
                let reasons =
                    all_of([Some(held), mon.ability_in(&state.inference, &gluttony)])?;
                Some(Legality::certain(reasons))
            }
            ItemUpdate::Cure { statuses } => {
                let status = mon.status?;
                statuses
                    .iter()
                    .any(|s| s == status.to_protocol())
                    .then(|| Legality::certain(held))
            }
        }
    }

    /// Resist berries trigger on a super-effective hit of their type
    fn can_weaken(
        &self,
        state: &BattleState,
        holder: MonRef,
        weakened: Type,
        move_ctx: &MoveContext,
    ) -> Option<Legality> {
        if move_ctx.target != Some(holder) || move_ctx.user == holder || move_ctx.blocked {
            return None;
        }
        let mv = self.dex.find_move(&move_ctx.move_id)?;
        if !mv.is_damaging() || !mv.possible_types(state, move_ctx.user).contains(&weakened) {
            return None;
        }
        let defenders = state.mon(holder).current_types();
        let super_effective =
            type_effectiveness(defenders, weakened, false) == Effectiveness::Super;
        if weakened != Type::Normal && !super_effective {
            return None;
        }
        let held = self.held(state, holder)?;
        Some(Legality::when(held, move_ctx.damaged))
    }

    pub fn on_update(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        let flag = if self.data.weaken_type.is_some() {
            "weaken"
        } else {
            "eat"
        };
        let Some(BattleEvent::EndItem {
            pokemon,
            item,
            kwargs,
        }) = ctx.peek()
        else {
            return Ok(Attempt::NoMatch);
        };
        if !ctx.is(pokemon, holder) || to_id(item) != self.id || !kwargs.has(flag) {
            return Ok(Attempt::NoMatch);
        }
        ctx.apply_next()?;

        let id = self.id;
        match &self.data.on_update {
            Some(ItemUpdate::HpHeal { .. }) => {
                parse_heal(ctx, holder, |k| from_item(k, id))?;
            }
            Some(ItemUpdate::HpBoost { boosts, .. }) => {
                let pending: BoostTable = boosts.clone();
                parse_boosts(ctx, holder, &pending, true, |k| from_item(k, id))?;
            }
            Some(ItemUpdate::Cure { .. }) => {
                parse_cure(ctx, holder, &[], any)?;
            }
            None => {}
        }
        Ok(Attempt::Committed)
    }

    // === Post damage ===

    pub fn can_post_damage(
        &self,
        state: &BattleState,
        holder: MonRef,
        move_ctx: &MoveContext,
    ) -> Option<Legality> {
        self.data.on_post_damage?;
        if move_ctx.user != holder || !move_ctx.damaged || !state.mon(holder).is_alive() {
            return None;
        }
        if !self.dex.find_move(&move_ctx.move_id)?.is_damaging() {
            return None;
        }
        let reasons = all_of([self.held(state, holder), self.hurts(state, holder)])?;
        Some(Legality::certain(reasons))
    }

    pub fn on_post_damage(&self, ctx: &mut ParserContext<'_>, holder: MonRef) -> Result<Attempt> {
        if self.data.on_post_damage.is_none() {
            return Ok(Attempt::NoMatch);
        }
        let id = self.id;
        Ok(committed(parse_damage(ctx, holder, |k| from_item(k, id))?))
    }
}

fn committed(matched: bool) -> Attempt {
    if matched {
        Attempt::Committed
    } else {
        Attempt::NoMatch
    }
}

impl fmt::Debug for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Item").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, events};

    #[test]
    fn test_leftovers_waits_for_damage() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let snorlax = fixture.p2();
        let leftovers = fixture.dex.item("Leftovers").unwrap();
        assert!(leftovers.can_residual(&fixture.state, snorlax).is_none());

        fixture.state.mon_mut(snorlax).hp.current = 70;
        let legality = leftovers.can_residual(&fixture.state, snorlax).unwrap();
        assert!(legality.certain);
        assert_eq!(legality.reasons.len(), 1);
    }

    #[test]
    fn test_klutz_suppresses_items() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let snorlax = fixture.p2();
        fixture.state.mon_mut(snorlax).hp.current = 70;
        fixture.state.mon_mut(snorlax).volatile.override_ability = Some("klutz".into());
        let leftovers = fixture.dex.item("Leftovers").unwrap();
        assert!(leftovers.can_residual(&fixture.state, snorlax).is_none());
    }

    #[test]
    fn test_sitrus_berry_is_eaten() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let snorlax = fixture.p2();
        fixture.state.mon_mut(snorlax).hp.current = 40;
        let sitrus = fixture.dex.item("Sitrus Berry").unwrap();
        assert!(sitrus.can_update(&fixture.state, snorlax, None).unwrap().certain);

        let batch = events(&[
            "|-enditem|p2a: Snorlax|Sitrus Berry|[eat]",
            "|-heal|p2a: Snorlax|65/100|[from] item: Sitrus Berry",
        ]);
        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        assert_eq!(sitrus.on_update(&mut ctx, snorlax).unwrap(), Attempt::Committed);
        assert!(ctx.peek().is_none());

        let mon = fixture.state.mon(snorlax);
        assert_eq!(fixture.state.inference.definite(mon.item), Some("none"));
        assert_eq!(mon.last_item.as_deref(), Some("sitrusberry"));
        assert_eq!(mon.hp.current, 65);
    }

    #[test]
    fn test_gluttony_pinch_berry() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let snorlax = fixture.p2();
        let liechi = fixture.dex.item("Liechi Berry").unwrap();
        fixture.state.mon_mut(snorlax).hp.current = 40;
        // snorlax cannot have gluttony
        assert!(liechi.can_update(&fixture.state, snorlax, None).is_none());

        fixture.state.mon_mut(snorlax).volatile.override_ability = Some("gluttony".into());
        assert!(liechi.can_update(&fixture.state, snorlax, None).unwrap().certain);
        fixture.state.mon_mut(snorlax).hp.current = 60;
        assert!(liechi.can_update(&fixture.state, snorlax, None).is_none());
    }

    fn undecided_gluttony(fixture: &mut Fixture) -> MonRef {
        let linoone = fixture.p2();
        fixture.state.mon_mut(linoone).hp.current = 40;
        let liechi = fixture.dex.item("Liechi Berry").unwrap();
        let legality = liechi.can_update(&fixture.state, linoone, None).unwrap();
        assert!(legality.certain);
        assert_eq!(legality.reasons.len(), 2);

        // berry never eaten
        fixture.state.inference.reject_one(legality.reasons).unwrap();
        let mon = fixture.state.mon(linoone);
        assert!(fixture.state.inference.is_possible(mon.item, "liechiberry"));
        assert!(fixture.state.inference.is_possible(mon.ability, "gluttony"));
        linoone
    }

    #[test]
    fn test_uneaten_pinch_berry_waits_for_gluttony() {
        let mut fixture = Fixture::new("Pikachu", "Linoone");
        let linoone = undecided_gluttony(&mut fixture);
        let (item, ability) = (fixture.state.mon(linoone).item, fixture.state.mon(linoone).ability);

        fixture.state.inference.reveal(ability, "gluttony").unwrap();
        assert!(!fixture.state.inference.is_possible(item, "liechiberry"));
    }

    #[test]
    fn test_uneaten_pinch_berry_without_gluttony() {
        let mut fixture = Fixture::new("Pikachu", "Linoone");
        let linoone = undecided_gluttony(&mut fixture);
        let (item, ability) = (fixture.state.mon(linoone).item, fixture.state.mon(linoone).ability);

        fixture.state.inference.reveal(ability, "pickup").unwrap();
        assert!(fixture.state.inference.is_possible(item, "liechiberry"));
    }

    #[test]
    fn test_lum_berry_needs_status() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let snorlax = fixture.p2();
        let lum = fixture.dex.item("Lum Berry").unwrap();
        assert!(lum.can_update(&fixture.state, snorlax, None).is_none());

        fixture.state.mon_mut(snorlax).status = Some(Status::Paralysis);
        assert!(lum.can_update(&fixture.state, snorlax, None).is_some());
    }

    #[test]
    fn test_resist_berry_needs_super_effective_hit() {
        let fixture = Fixture::new("Pikachu", "Gyarados");
        let (pikachu, gyarados) = (fixture.p1(), fixture.p2());
        let wacan = fixture.dex.item("Wacan Berry").unwrap();
        let mut move_ctx = MoveContext {
            user: pikachu,
            target: Some(gyarados),
            move_id: "thunderbolt".to_string(),
            damaged: true,
            effectiveness: Some(Effectiveness::Super),
            blocked: false,
        };
        assert!(wacan.can_update(&fixture.state, gyarados, Some(&move_ctx)).unwrap().certain);

        move_ctx.move_id = "surf".to_string();
        assert!(wacan.can_update(&fixture.state, gyarados, Some(&move_ctx)).is_none());
        assert!(wacan.can_update(&fixture.state, gyarados, None).is_none());
    }

    #[test]
    fn test_magic_guard_prevents_life_orb_recoil() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let (pikachu, snorlax) = (fixture.p1(), fixture.p2());
        let life_orb = fixture.dex.item("Life Orb").unwrap();
        let move_ctx = MoveContext {
            user: pikachu,
            target: Some(snorlax),
            move_id: "thunderbolt".to_string(),
            damaged: true,
            effectiveness: None,
            blocked: false,
        };
        assert!(life_orb.can_post_damage(&fixture.state, pikachu, &move_ctx).is_some());

        fixture.state.mon_mut(pikachu).volatile.override_ability = Some("magicguard".into());
        assert!(life_orb.can_post_damage(&fixture.state, pikachu, &move_ctx).is_none());
    }
}
