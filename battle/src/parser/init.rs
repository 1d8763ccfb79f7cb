//! Battle initialization events

use deduce_protocol::{BattleEvent, GameType};
use tracing::debug;

use super::ParserContext;
use crate::error::{BattleError, Result};

/// Generation this parser models
pub const SUPPORTED_GEN: u8 = 4;

pub(super) fn handle(ctx: &mut ParserContext<'_>) -> Result<()> {
    let Some(event) = ctx.events.next() else {
        return Ok(());
    };

    match event {
        BattleEvent::Player {
            player, username, ..
        } => {
            if !username.is_empty() {
                ctx.state.team_mut(*player).username = username.clone();
            }
        }
        BattleEvent::TeamSize { player, size } => {
            ctx.state.team_mut(*player).size = *size as usize;
        }
        BattleEvent::GameType(game_type) => {
            if *game_type != GameType::Singles {
                return Err(BattleError::unsupported(format!(
                    "game type {:?}",
                    game_type
                )));
            }
        }
        BattleEvent::Gen(generation) => {
            if *generation != SUPPORTED_GEN {
                return Err(BattleError::unsupported(format!("gen {}", generation)));
            }
            ctx.state.generation = *generation;
        }
        BattleEvent::Tier(tier) => {
            debug!(tier = %tier, "format");
            ctx.state.format = tier.clone();
        }
        BattleEvent::Rated(_) | BattleEvent::Rule(_) | BattleEvent::ClearPoke => {}
        BattleEvent::Poke { .. } | BattleEvent::TeamPreview(_) => {
            return Err(BattleError::unsupported("team preview"));
        }
        other => {
            return Err(BattleError::mismatch(
                "an initialization event",
                other,
                "battle init",
            ));
        }
    }
    Ok(())
}
