//! Damage and heal matching

use deduce_protocol::{BattleEvent, HpStatus, KwArgs};

use crate::error::Result;
use crate::parser::ParserContext;
use crate::state::MonRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Down,
    Up,
}

fn parse_hp_change(
    ctx: &mut ParserContext<'_>,
    target: MonRef,
    direction: Direction,
    accept: impl Fn(&KwArgs) -> bool,
) -> Result<bool> {
    let (pokemon, hp_status, kwargs) = match (ctx.peek(), direction) {
        (
            Some(BattleEvent::Damage {
                pokemon,
                hp_status,
                kwargs,
            }),
            Direction::Down,
        )
        | (
            Some(BattleEvent::Heal {
                pokemon,
                hp_status,
                kwargs,
            }),
            Direction::Up,
        ) => (pokemon, hp_status, kwargs),
        _ => return Ok(false),
    };
    if !ctx.is(pokemon, target) || !accept(kwargs) {
        return Ok(false);
    }
    if !moves_hp(ctx, target, hp_status.as_ref(), direction) {
        return Ok(false);
    }

    ctx.apply_next()?;
    Ok(true)
}

/// The reported HP lies on the expected side of the current HP
fn moves_hp(
    ctx: &ParserContext<'_>,
    target: MonRef,
    hp: Option<&HpStatus>,
    direction: Direction,
) -> bool {
    let Some(hp) = hp else {
        return true;
    };
    let tracker = &ctx.state.mon(target).hp;
    // both sides of the comparison in the tracker's scale
    let reported = match hp.max {
        Some(max) if max != tracker.max && max > 0 => hp.current * tracker.max / max,
        _ => hp.current,
    };
    match direction {
        Direction::Down => reported <= tracker.current,
        Direction::Up => reported >= tracker.current,
    }
}

/// Consume a `-damage` on `target` whose suffixes `accept` approves
pub fn parse_damage(
    ctx: &mut ParserContext<'_>,
    target: MonRef,
    accept: impl Fn(&KwArgs) -> bool,
) -> Result<bool> {
    parse_hp_change(ctx, target, Direction::Down, accept)
}

/// Consume a `-heal` on `target` whose suffixes `accept` approves
pub fn parse_heal(
    ctx: &mut ParserContext<'_>,
    target: MonRef,
    accept: impl Fn(&KwArgs) -> bool,
) -> Result<bool> {
    parse_hp_change(ctx, target, Direction::Up, accept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::effects::from_item;
    use crate::testing::{Fixture, events};

    #[test]
    fn test_heal_needs_matching_source() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let target = fixture.p2();
        fixture.state.mon_mut(target).hp.current = 80;
        let batch = events(&["|-heal|p2a: Snorlax|86/100|[from] item: Leftovers"]);

        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        assert!(!parse_heal(&mut ctx, target, |k| from_item(k, "blacksludge")).unwrap());
        assert!(!parse_damage(&mut ctx, target, |k| from_item(k, "leftovers")).unwrap());
        assert!(parse_heal(&mut ctx, target, |k| from_item(k, "leftovers")).unwrap());
        assert_eq!(ctx.state.mon(target).hp.current, 86);
    }

    #[test]
    fn test_damage_cannot_raise_hp() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let target = fixture.p2();
        fixture.state.mon_mut(target).hp.current = 50;
        let batch = events(&["|-damage|p2a: Snorlax|60/100"]);

        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        assert!(!parse_damage(&mut ctx, target, |_| true).unwrap());
    }
}
