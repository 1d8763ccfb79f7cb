//! Unordered matching of effect pathways against upcoming events

use tracing::{debug, trace};

use super::cursor::Boundary;
use super::pathway::{Attempt, Pathway};
use super::ParserContext;
use crate::error::{BattleError, Result};
use crate::inference::ReasonState;

/// Try every pathway against the upcoming events until none matches.
///
/// Pathways whose holder can no longer be their source are dropped. When one
/// commits, the preconditions it was attempted under are asserted, it leaves
/// the pool, and the search restarts from the first remaining pathway.
/// Returns how many pathways committed.
pub fn match_unordered(ctx: &mut ParserContext<'_>, pathways: &mut Vec<Pathway>) -> Result<usize> {
    let mut committed = 0;

    'search: loop {
        let mut index = 0;
        while index < pathways.len() {
            if !pathways[index].is_possible(ctx.state) {
                let dropped = pathways.remove(index);
                trace!(pathway = %dropped, "no longer possible");
                continue;
            }

            let Some(legality) = pathways[index].legality(ctx) else {
                index += 1;
                continue;
            };

            match pathways[index].attempt(ctx)? {
                Attempt::Committed => {
                    let pathway = pathways.remove(index);
                    debug!(pathway = %pathway, "matched");
                    for reason in &legality.reasons {
                        ctx.state.inference.assert(reason)?;
                    }
                    committed += 1;
                    continue 'search;
                }
                Attempt::NoMatch => index += 1,
            }
        }
        return Ok(committed);
    }
}

/// Account for pathways that never matched.
///
/// A pathway that was certain to fire under its preconditions proves one of
/// them false. If they all held, the log disagrees with the rules.
pub fn expect_unordered(ctx: &mut ParserContext<'_>, pathways: &[Pathway]) -> Result<()> {
    for pathway in pathways {
        if !pathway.is_possible(ctx.state) {
            continue;
        }
        let Some(legality) = pathway.expected(ctx) else {
            continue;
        };
        if !legality.certain {
            continue;
        }

        match ctx.state.inference.status_all(&legality.reasons) {
            ReasonState::Rejected => {}
            ReasonState::Held => {
                let event = ctx
                    .peek()
                    .map(|e| format!("{:?}", e))
                    .unwrap_or_else(|| "end of batch".to_string());
                return Err(BattleError::ParseMismatch {
                    expected: pathway.to_string(),
                    event,
                    context: "effect that must have activated".to_string(),
                });
            }
            ReasonState::Undecided => {
                debug!(pathway = %pathway, "did not activate");
                ctx.state
                    .inference
                    .reject_one(legality.reasons.iter().cloned())?;
            }
        }
    }
    Ok(())
}

/// Match `pathways` against the events up to `boundary`.
///
/// Events no pathway claims are applied as ordinary minor events in between.
pub fn run_window(
    ctx: &mut ParserContext<'_>,
    mut pathways: Vec<Pathway>,
    boundary: Boundary,
) -> Result<()> {
    loop {
        match_unordered(ctx, &mut pathways)?;
        if ctx.at_boundary(boundary) {
            break;
        }
        ctx.apply_next()?;
    }
    expect_unordered(ctx, &pathways)
}
