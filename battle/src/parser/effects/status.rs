//! Major status matching and status immunities

use deduce_protocol::{BattleEvent, KwArgs};
use tracing::debug;

use crate::dex::{Dex, Type};
use crate::error::Result;
use crate::inference::{Reasons, all_of, given};
use crate::parser::ParserContext;
use crate::state::{BattleState, MonRef, Status};

/// Consume a `-status` on `target` naming one of `candidates` (any status if empty).
pub fn parse_status(
    ctx: &mut ParserContext<'_>,
    target: MonRef,
    candidates: &[Status],
    accept: impl Fn(&KwArgs) -> bool,
) -> Result<Option<Status>> {
    let Some(BattleEvent::Status {
        pokemon,
        status,
        kwargs,
    }) = ctx.peek()
    else {
        return Ok(None);
    };
    if !ctx.is(pokemon, target) || !accept(kwargs) {
        return Ok(None);
    }
    let Some(status) = Status::from_protocol(status) else {
        return Ok(None);
    };
    if !candidates.is_empty() && !candidates.contains(&status) {
        return Ok(None);
    }

    ctx.apply_next()?;
    Ok(Some(status))
}

fn immune_by_type(status: Status, types: &[Type]) -> bool {
    match status {
        Status::Poison | Status::BadPoison => {
            types.contains(&Type::Poison) || types.contains(&Type::Steel)
        }
        Status::Burn => types.contains(&Type::Fire),
        Status::Freeze => types.contains(&Type::Ice),
        Status::Paralysis | Status::Sleep => false,
    }
}

/// Abilities that prevent `status`
fn immune_abilities(dex: &Dex, status: Status) -> Vec<&str> {
    dex.abilities_where(|a| a.status_immunity.iter().any(|s| s == status.to_protocol()))
}

/// Abilities that ignore the target's ability
pub(crate) fn ability_breakers(dex: &Dex) -> Vec<&str> {
    dex.abilities_where(|a| a.flags.ignore_abilities)
}

/// Preconditions for `target` to receive `status` from `source`.
///
/// `None` when it already has a status, its types or Safeguard forbid it.
pub fn can_status(
    state: &BattleState,
    dex: &Dex,
    target: MonRef,
    status: Status,
    source: Option<MonRef>,
) -> Option<Reasons> {
    let mon = state.mon(target);
    if mon.status.is_some() || !mon.is_alive() {
        return None;
    }
    if immune_by_type(status, mon.current_types()) {
        return None;
    }
    if state.team(target.side).has_condition("safeguard") && source != Some(target) {
        return None;
    }

    let immune = immune_abilities(dex, status);
    let breakers = ability_breakers(dex);
    let broken = source
        .filter(|s| *s != target)
        .is_some_and(|s| state.mon(s).ability_surely_in(&state.inference, &breakers));
    if broken {
        return given(true);
    }
    all_of([mon.ability_not_in(&state.inference, &immune)])
}

/// Learn from a status that was just inflicted on `target`.
///
/// Its ability cannot prevent the status unless the source ignores abilities.
pub fn observe_status(
    ctx: &mut ParserContext<'_>,
    target: MonRef,
    status: Status,
    source: Option<MonRef>,
) -> Result<()> {
    let dex = ctx.dex;
    let immune = immune_abilities(dex, status);
    if immune.is_empty() {
        return Ok(());
    }

    let state = &*ctx.state;
    let Some(mut reasons) = state.mon(target).ability_in(&state.inference, &immune) else {
        return Ok(());
    };
    if let Some(source) = source.filter(|s| *s != target) {
        let breakers = ability_breakers(dex);
        let Some(unbroken) = state.mon(source).ability_not_in(&state.inference, &breakers) else {
            return Ok(());
        };
        reasons.extend(unbroken);
    }

    debug!(status = status.to_protocol(), "status shows the ability is not an immunity");
    ctx.state.inference.reject_one(reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::effects::any;
    use crate::testing::{Fixture, events};

    #[test]
    fn test_poison_types_cannot_be_poisoned() {
        let fixture = Fixture::new("Pikachu", "Gengar");
        let dex = &fixture.dex;
        assert!(can_status(&fixture.state, dex, fixture.p2(), Status::BadPoison, None).is_none());
        assert!(can_status(&fixture.state, dex, fixture.p2(), Status::Burn, None).is_some());
    }

    #[test]
    fn test_immunity_is_a_reason() {
        let fixture = Fixture::new("Pikachu", "Snorlax");
        let reasons =
            can_status(&fixture.state, &fixture.dex, fixture.p2(), Status::Poison, None).unwrap();
        assert_eq!(reasons.len(), 1);
    }

    #[test]
    fn test_observed_poison_rules_out_immunity() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let target = fixture.p2();
        let batch = events(&["|-status|p2a: Snorlax|psn"]);

        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        let status = parse_status(&mut ctx, target, &[], any).unwrap();
        assert_eq!(status, Some(Status::Poison));
        observe_status(&mut ctx, target, Status::Poison, None).unwrap();

        let ability = ctx.state.mon(target).ability;
        assert_eq!(ctx.state.inference.definite(ability), Some("thickfat"));
    }

    #[test]
    fn test_parse_status_filters_candidates() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let target = fixture.p2();
        let batch = events(&["|-status|p2a: Snorlax|brn"]);

        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        assert_eq!(parse_status(&mut ctx, target, &[Status::Paralysis], any).unwrap(), None);
        assert!(ctx.peek().is_some());
    }
}
