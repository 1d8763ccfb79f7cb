//! `move` and `cant` events

use deduce_protocol::{BattleEvent, EffectSource};
use tracing::debug;

use super::cursor::Boundary;
use super::matcher::run_window;
use super::pathway::{move_window, update_window};
use super::{MoveContext, ParserContext, reveal_ability, turn};
use crate::dex::{Effectiveness, Move, Type, type_effectiveness};
use crate::error::{BattleError, Result};
use crate::state::{MonRef, Volatile};

const PRESSURE: &str = "pressure";

/// Moves that never occupy a moveset slot
const NOT_IN_MOVESET: &[&str] = &["struggle", "recharge"];

pub(super) fn handle_move(ctx: &mut ParserContext<'_>) -> Result<()> {
    let Some(event) = ctx.events.next() else {
        return Ok(());
    };
    let BattleEvent::Move {
        pokemon,
        move_name,
        target,
        kwargs,
    } = event
    else {
        return Err(BattleError::mismatch("move", event, "move handler"));
    };

    let user = ctx.state.resolve(pokemon)?;
    let target = target.as_ref().and_then(|t| ctx.state.find(t));
    let dex = ctx.dex;
    let mv = dex.move_(move_name)?;
    let id = mv.id().to_string();

    // moves called by another effect or locked in from an earlier turn
    if kwargs.from.is_none() {
        use_move(ctx, user, target, &mv)?;
        choice_lock(ctx, user, &id)?;
        ctx.state.mon_mut(user).volatile.last_move = Some(id.clone());
    }
    if id == "batonpass" {
        turn::baton_pass(ctx, user);
    }
    debug!(pokemon = %pokemon, move_id = %id, "move");

    ctx.move_ctx = Some(MoveContext {
        user,
        target,
        move_id: id,
        damaged: false,
        effectiveness: None,
        blocked: false,
    });
    let pathways = move_window(ctx);
    let outcome = run_window(ctx, pathways, Boundary::Action).and_then(|()| {
        if mv.id() == "hiddenpower" {
            narrow_hidden_power(ctx)
        } else {
            Ok(())
        }
    });
    ctx.move_ctx = None;
    outcome
}

/// Reveal the move and spend its PP
fn use_move(
    ctx: &mut ParserContext<'_>,
    user: MonRef,
    target: Option<MonRef>,
    mv: &Move<'_>,
) -> Result<()> {
    let id = mv.id();
    if NOT_IN_MOVESET.contains(&id) {
        return Ok(());
    }

    let record = ctx.state.mon(user);
    if record.volatile.has(&Volatile::Transformed) {
        return Ok(());
    }
    let pressured = target.filter(|t| *t != user).is_some_and(|t| {
        let foe = ctx.state.mon(t);
        match &foe.volatile.override_ability {
            Some(ability) => ability == PRESSURE,
            None => foe.ability_is_definitely(&ctx.state.inference, PRESSURE),
        }
    });
    let cost = if pressured { 2 } else { 1 };

    let moveset = &mut ctx.state.mon_mut(user).moveset;
    moveset.reveal(id, mv.max_pp());
    moveset.use_pp(id, cost);
    Ok(())
}

/// A different move than last time rules out choice items
fn choice_lock(ctx: &mut ParserContext<'_>, user: MonRef, id: &str) -> Result<()> {
    let record = ctx.state.mon(user);
    let Some(previous) = &record.volatile.last_move else {
        return Ok(());
    };
    if previous == id || NOT_IN_MOVESET.contains(&id) {
        return Ok(());
    }

    let choice = ctx.dex.items_where(|i| i.flags.choice);
    let class = record.item;
    debug!(previous = %previous, current = id, "switched moves without switching out");
    ctx.state
        .inference
        .remove(class, |v| choice.contains(&v))
}

/// Hidden Power's type must give the effectiveness that was shown
fn narrow_hidden_power(ctx: &mut ParserContext<'_>) -> Result<()> {
    let Some(move_ctx) = &ctx.move_ctx else {
        return Ok(());
    };
    let Some(target) = move_ctx.target.filter(|t| *t != move_ctx.user) else {
        return Ok(());
    };
    let defender = ctx.state.mon(target);
    let allowed: Vec<&str> = if move_ctx.blocked {
        // stopped by an ability: only the types it blocks are left
        let ability = match &defender.volatile.override_ability {
            Some(id) => Some(id.as_str()),
            None => ctx.state.inference.definite(defender.ability),
        };
        let Some(block) = ability
            .and_then(|id| ctx.dex.find_ability(id))
            .and_then(|a| a.data().on_block.as_ref())
            .filter(|block| !block.types.is_empty())
        else {
            return Ok(());
        };
        Type::hidden_power_types()
            .filter(|t| block.types.contains(t))
            .map(|t| t.as_id())
            .collect()
    } else {
        let shown = match move_ctx.effectiveness {
            Some(effectiveness) => effectiveness,
            None if move_ctx.damaged => Effectiveness::Regular,
            None => return Ok(()),
        };
        let defenders = defender.current_types();
        Type::hidden_power_types()
            .filter(|t| type_effectiveness(defenders, *t, false) == shown)
            .map(|t| t.as_id())
            .collect()
    };

    let class = ctx.state.mon(move_ctx.user).hp_type;
    debug!(?allowed, "hidden power type");
    ctx.state
        .inference
        .narrow(class, |v| allowed.contains(&v))
}

pub(super) fn handle_cant(ctx: &mut ParserContext<'_>) -> Result<()> {
    let Some(event) = ctx.events.next() else {
        return Ok(());
    };
    let BattleEvent::Cant {
        pokemon,
        reason,
        move_name,
        ..
    } = event
    else {
        return Err(BattleError::mismatch("cant", event, "cant handler"));
    };

    let mon = ctx.state.resolve(pokemon)?;
    if let EffectSource::Ability(ability) = EffectSource::parse(reason) {
        reveal_ability(ctx, mon, &ability)?;
    }
    if let Some(name) = move_name {
        let mv = ctx.dex.move_(name)?;
        let record = ctx.state.mon_mut(mon);
        if !record.volatile.has(&Volatile::Transformed) && !NOT_IN_MOVESET.contains(&mv.id()) {
            record.moveset.reveal(mv.id(), mv.max_pp());
        }
    }
    debug!(pokemon = %pokemon, reason = %reason, "cannot move");

    let pathways = update_window(ctx);
    run_window(ctx, pathways, Boundary::Action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, events};

    fn run(fixture: &mut Fixture, lines: &[&str]) {
        let batch = events(lines);
        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        handle_move(&mut ctx).unwrap();
        assert!(ctx.peek().is_none(), "left {:?}", ctx.peek());
        assert!(ctx.move_ctx.is_none());
    }

    #[test]
    fn test_move_reveals_and_spends_pp() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        run(
            &mut fixture,
            &[
                "|move|p1a: Pikachu|Thunderbolt|p2a: Snorlax",
                "|-damage|p2a: Snorlax|60/100",
            ],
        );
        let slot = fixture.state.mon(fixture.p1()).moveset.get("thunderbolt").cloned().unwrap();
        assert_eq!(slot.max_pp, 24);
        assert_eq!(slot.pp, 23);
    }

    #[test]
    fn test_second_move_rules_out_choice_items() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        run(
            &mut fixture,
            &["|move|p1a: Pikachu|Thunder Wave|p2a: Snorlax", "|-status|p2a: Snorlax|par"],
        );
        run(
            &mut fixture,
            &[
                "|move|p1a: Pikachu|Thunderbolt|p2a: Snorlax",
                "|-damage|p2a: Snorlax|60/100",
            ],
        );
        let item = fixture.state.mon(fixture.p1()).item;
        assert!(!fixture.state.inference.is_possible(item, "choicescarf"));
        assert!(!fixture.state.inference.is_possible(item, "choiceband"));
        assert!(fixture.state.inference.is_possible(item, "leftovers"));
    }

    #[test]
    fn test_hidden_power_type_from_effectiveness() {
        let mut fixture = Fixture::new("Pikachu", "Gyarados");
        run(
            &mut fixture,
            &[
                "|move|p1a: Pikachu|Hidden Power|p2a: Gyarados",
                "|-supereffective|p2a: Gyarados",
                "|-damage|p2a: Gyarados|70/100",
            ],
        );
        // water/flying: super effective types are electric and rock
        let class = fixture.state.mon(fixture.p1()).hp_type;
        let domain: Vec<&str> = fixture
            .state
            .inference
            .domain(class)
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(domain, vec!["electric", "rock"]);
    }

    #[test]
    fn test_hidden_power_into_levitate_is_ground() {
        let mut fixture = Fixture::new("Pikachu", "Gengar");
        run(
            &mut fixture,
            &[
                "|move|p1a: Pikachu|Hidden Power|p2a: Gengar",
                "|-immune|p2a: Gengar|[from] ability: Levitate",
            ],
        );
        let class = fixture.state.mon(fixture.p1()).hp_type;
        assert_eq!(fixture.state.inference.definite(class), Some("ground"));
    }

    #[test]
    fn test_volt_absorb_blocks_electric_moves() {
        let mut fixture = Fixture::new("Pikachu", "Lanturn");
        run(
            &mut fixture,
            &[
                "|move|p1a: Pikachu|Thunderbolt|p2a: Lanturn",
                "|-heal|p2a: Lanturn|100/100|[from] ability: Volt Absorb|[of] p1a: Pikachu",
            ],
        );
        let class = fixture.state.mon(fixture.p2()).ability;
        assert_eq!(fixture.state.inference.definite(class), Some("voltabsorb"));
    }

    #[test]
    fn test_missing_volt_absorb_proves_illuminate() {
        let mut fixture = Fixture::new("Pikachu", "Lanturn");
        run(
            &mut fixture,
            &[
                "|move|p1a: Pikachu|Thunderbolt|p2a: Lanturn",
                "|-damage|p2a: Lanturn|80/100",
            ],
        );
        let class = fixture.state.mon(fixture.p2()).ability;
        assert_eq!(fixture.state.inference.definite(class), Some("illuminate"));
    }

    #[test]
    fn test_static_reveal_on_contact() {
        let mut fixture = Fixture::new("Snorlax", "Pikachu");
        run(
            &mut fixture,
            &[
                "|move|p1a: Snorlax|Body Slam|p2a: Pikachu",
                "|-damage|p2a: Pikachu|20/100",
                "|-status|p1a: Snorlax|par|[from] ability: Static|[of] p2a: Pikachu",
            ],
        );
        let snorlax = fixture.state.mon(fixture.p1());
        assert_eq!(snorlax.status, Some(crate::state::Status::Paralysis));
        let class = fixture.state.mon(fixture.p2()).ability;
        assert_eq!(fixture.state.inference.definite(class), Some("static"));
    }

    #[test]
    fn test_life_orb_recoil() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        run(
            &mut fixture,
            &[
                "|move|p1a: Pikachu|Thunderbolt|p2a: Snorlax",
                "|-damage|p2a: Snorlax|60/100",
                "|-damage|p1a: Pikachu|90/100|[from] item: Life Orb",
            ],
        );
        let item = fixture.state.mon(fixture.p1()).item;
        assert_eq!(fixture.state.inference.definite(item), Some("lifeorb"));
    }

    #[test]
    fn test_no_recoil_rules_out_life_orb() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        run(
            &mut fixture,
            &[
                "|move|p1a: Pikachu|Thunderbolt|p2a: Snorlax",
                "|-damage|p2a: Snorlax|60/100",
            ],
        );
        let item = fixture.state.mon(fixture.p1()).item;
        assert!(!fixture.state.inference.is_possible(item, "lifeorb"));
    }

    #[test]
    fn test_cant_reveals_ability() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let batch = events(&["|cant|p2a: Snorlax|par"]);
        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        handle_cant(&mut ctx).unwrap();
        assert!(ctx.peek().is_none());
    }
}
