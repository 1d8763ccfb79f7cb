//! Status cure matching

use deduce_protocol::{BattleEvent, KwArgs};

use crate::error::Result;
use crate::parser::ParserContext;
use crate::state::{MonRef, Status, Volatile};

/// Consume a `-curestatus` on `target` for one of `statuses` (any if empty).
///
/// The cured status must be the one the pokemon currently has.
pub fn parse_cure(
    ctx: &mut ParserContext<'_>,
    target: MonRef,
    statuses: &[Status],
    accept: impl Fn(&KwArgs) -> bool,
) -> Result<Option<Status>> {
    let Some(BattleEvent::CureStatus {
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
    if !statuses.is_empty() && !statuses.contains(&status) {
        return Ok(None);
    }
    if ctx.state.mon(target).status.is_some_and(|current| current != status) {
        return Ok(None);
    }

    ctx.apply_next()?;
    Ok(Some(status))
}

/// Consume an `-end` of `volatile` on `target`
pub fn parse_volatile_end(
    ctx: &mut ParserContext<'_>,
    target: MonRef,
    volatile: &Volatile,
    accept: impl Fn(&KwArgs) -> bool,
) -> Result<bool> {
    let Some(BattleEvent::VolatileEnd {
        pokemon,
        effect,
        kwargs,
    }) = ctx.peek()
    else {
        return Ok(false);
    };
    if !ctx.is(pokemon, target) || !accept(kwargs) || Volatile::from_protocol(effect) != *volatile
    {
        return Ok(false);
    }

    ctx.apply_next()?;
    Ok(true)
}
