//! Stat boost matching

use std::collections::BTreeMap;

use deduce_protocol::{BattleEvent, KwArgs, Stat};

use crate::error::Result;
use crate::parser::ParserContext;
use crate::state::{MonRef, clamp_stage};

/// Boost amounts keyed by stat
pub type BoostTable = BTreeMap<Stat, i8>;

/// Whether an observed boost of `given` stages accounts for a `pending` one.
///
/// The server reports the amount actually applied, so a boost cut short by
/// the stage cap still matches.
pub fn match_boost(pending: i8, given: i8, current: i8) -> bool {
    clamp_stage(current as i32 + given as i32) == clamp_stage(current as i32 + pending as i32)
}

/// Consume `-boost`/`-unboost` events on `target` that account for `pending`.
///
/// Events are taken in any order while they match a still-pending stat and
/// `accept` their suffixes. Returns the boosts that were not seen. With
/// `silent`, boosts that could not have changed anything are also treated as
/// seen, since the server may omit them.
pub fn parse_boosts(
    ctx: &mut ParserContext<'_>,
    target: MonRef,
    pending: &BoostTable,
    silent: bool,
    accept: impl Fn(&KwArgs) -> bool,
) -> Result<BoostTable> {
    let mut remaining = pending.clone();

    while let Some(event) = ctx.peek() {
        let (pokemon, stat, given, kwargs) = match event {
            BattleEvent::Boost {
                pokemon,
                stat,
                amount,
                kwargs,
            } => (pokemon, *stat, *amount, kwargs),
            BattleEvent::Unboost {
                pokemon,
                stat,
                amount,
                kwargs,
            } => (pokemon, *stat, -*amount, kwargs),
            _ => break,
        };
        if !ctx.is(pokemon, target) || !accept(kwargs) {
            break;
        }
        let Some(&want) = remaining.get(&stat) else {
            break;
        };
        let current = ctx.state.mon(target).volatile.boosts.get(stat);
        if !match_boost(want, given, current) {
            break;
        }

        ctx.apply_next()?;
        remaining.remove(&stat);
    }

    if silent {
        let boosts = &ctx.state.mon(target).volatile.boosts;
        remaining.retain(|stat, want| {
            let current = boosts.get(*stat);
            clamp_stage(current as i32 + *want as i32) != current
        });
    }
    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::effects::any;
    use crate::testing::{Fixture, events};
    use proptest::prelude::*;

    #[test]
    fn test_match_boost_at_caps() {
        assert!(match_boost(2, 1, 5));
        assert!(match_boost(1, 0, 6));
        assert!(match_boost(-1, 0, -6));
        assert!(!match_boost(1, 0, 5));
        assert!(!match_boost(-1, 1, 0));
    }

    #[test]
    fn test_parse_boosts_in_any_order() {
        let mut fixture = Fixture::new("Pikachu", "Gyarados");
        let target = fixture.p2();
        let batch = events(&["|-boost|p2a: Gyarados|spe|1", "|-boost|p2a: Gyarados|atk|1"]);
        let pending = BoostTable::from([(Stat::Atk, 1), (Stat::Spe, 1)]);

        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        let remaining = parse_boosts(&mut ctx, target, &pending, false, any).unwrap();
        assert!(remaining.is_empty());
        assert!(ctx.peek().is_none());
        assert_eq!(ctx.state.mon(target).volatile.boosts.atk, 1);
    }

    #[test]
    fn test_parse_boosts_silent_cap() {
        let mut fixture = Fixture::new("Pikachu", "Gyarados");
        let target = fixture.p1();
        fixture.state.mon_mut(target).volatile.boosts.atk = -6;
        let batch = events(&["|-unboost|p1a: Pikachu|def|1"]);
        let pending = BoostTable::from([(Stat::Atk, -1)]);

        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        let loud = parse_boosts(&mut ctx, target, &pending, false, any).unwrap();
        assert_eq!(loud, pending);
        let quiet = parse_boosts(&mut ctx, target, &pending, true, any).unwrap();
        assert!(quiet.is_empty());
        // the unrelated stat is left alone
        assert_eq!(ctx.events.position(), 0);
    }

    proptest! {
        #[test]
        fn prop_match_boost_is_clamped_equality(
            pending in -12i8..=12,
            given in -12i8..=12,
            current in -6i8..=6,
        ) {
            let clamp = |v: i8| (current as i32 + v as i32).clamp(-6, 6);
            prop_assert_eq!(match_boost(pending, given, current), clamp(given) == clamp(pending));
        }
    }
}
