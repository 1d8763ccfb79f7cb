//! Choice requests: syncing our side and computing legal choices

use deduce_protocol::{BattleRequest, Choice};
use tracing::debug;

use super::ParserContext;
use crate::error::{BattleError, Result};
use crate::state::{Status, SwitchInBuilder, split_hidden_power};

/// Legal choices for a request, in request order.
///
/// A forced switch only allows switches. Otherwise every usable move is legal
/// (or `move 1` when none is, which the server turns into Struggle), plus a
/// switch to each healthy benched pokemon unless the active one is trapped.
pub fn legal_choices(request: &BattleRequest) -> Vec<Choice> {
    let switches = request
        .available_switches()
        .into_iter()
        .map(|(index, _)| Choice::Switch(index));

    if request.is_force_switch() {
        return switches.collect();
    }

    let mut choices = Vec::new();
    if let Some(active) = request.active_pokemon() {
        let moves = active.available_moves();
        if moves.is_empty() {
            choices.push(Choice::Move(1));
        } else {
            choices.extend(moves.into_iter().map(|(index, _)| Choice::Move(index)));
        }
        if active.can_switch() {
            choices.extend(switches);
        }
    }
    choices
}

/// Apply what our own request reveals: abilities, items, movesets, exact HP and stats
pub(super) fn sync(ctx: &mut ParserContext<'_>, request: &BattleRequest) -> Result<()> {
    if request.team_preview {
        return Err(BattleError::unsupported("team preview"));
    }
    let Some(side) = &request.side else {
        return Ok(());
    };
    let player = side
        .player()
        .ok_or_else(|| BattleError::Protocol(format!("bad side id {}", side.id)))?;
    ctx.state.perspective = Some(player);

    for pokemon in &side.pokemon {
        let info = SwitchInBuilder::from_request(player, pokemon)?.build()?;
        let mon = match ctx.state.team(player).find(&info.name) {
            Some(index) => {
                let mon = crate::state::MonRef {
                    side: player,
                    index,
                };
                ctx.state.learn(ctx.dex, mon, &info)?;
                mon
            }
            None => ctx.state.reveal(ctx.dex, &info)?,
        };

        let record = ctx.state.mon_mut(mon);
        record.status = pokemon.status().and_then(Status::from_protocol);
        if pokemon.is_fainted() {
            record.fainted = true;
            record.hp.current = 0;
        }

        if pokemon.active {
            if let Some(active) = request.active_pokemon() {
                for slot in &active.moves {
                    let (id, _) = split_hidden_power(&slot.id);
                    if let Some(pp) = slot.pp {
                        record.moveset.set_pp(&id, pp);
                    }
                }
            }
        }
    }
    debug!(player = player.as_str(), rqid = ?request.rqid, "synced request");
    Ok(())
}

/// A switch was refused because our active pokemon is trapped.
///
/// Unless a visible effect explains it, the opponent's active pokemon must
/// have an ability able to trap ours.
pub(super) fn infer_trapper(ctx: &mut ParserContext<'_>) -> Result<()> {
    let Some(player) = ctx.state.perspective else {
        return Ok(());
    };
    let Some(mine) = ctx.state.active(player) else {
        return Ok(());
    };
    let Some(foe) = ctx.state.foe(mine) else {
        return Ok(());
    };
    if ctx.state.mon(mine).volatile.conditions.iter().any(|v| v.traps()) {
        return Ok(());
    }

    let trapper = ctx.state.mon(foe);
    if trapper.volatile.override_ability.is_some() {
        return Ok(());
    }
    let class = trapper.ability;
    let dex = ctx.dex;
    let state = &*ctx.state;
    let trappers: Vec<String> = state
        .inference
        .domain(class)
        .iter()
        .filter(|id| {
            dex.find_ability(id)
                .is_some_and(|ability| ability.can_trap(state, foe, mine))
        })
        .cloned()
        .collect();

    debug!(?trappers, "inferring trapping ability");
    ctx.state
        .inference
        .narrow(class, |id| trappers.iter().any(|t| t == id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deduce_protocol::{BattleEvent, parse_server_message};

    fn request(json: &str) -> BattleRequest {
        let line = format!("|request|{}", json);
        match parse_server_message(&line).unwrap() {
            BattleEvent::Request(request) => *request,
            other => panic!("expected request, got {:?}", other),
        }
    }

    const TEAM: &str = r#""side":{"name":"Alice","id":"p1","pokemon":[
        {"ident":"p1: Pikachu","details":"Pikachu, L88","condition":"211/211","active":true,
         "stats":{"atk":170,"def":140,"spa":160,"spd":150,"spe":240},"moves":["thunderbolt"],
         "baseAbility":"static","item":"lightball"},
        {"ident":"p1: Snorlax","details":"Snorlax, L80","condition":"400/400","active":false,
         "stats":{"atk":250,"def":180,"spa":160,"spd":250,"spe":100},"moves":["bodyslam"],
         "baseAbility":"thickfat","item":"leftovers"},
        {"ident":"p1: Gengar","details":"Gengar, L80","condition":"0 fnt","active":false,
         "stats":{"atk":150,"def":160,"spa":280,"spd":180,"spe":260},"moves":["shadowball"],
         "baseAbility":"levitate","item":""}
    ]}"#;

    #[test]
    fn test_moves_and_switches() {
        let request = request(&format!(
            r#"{{"active":[{{"moves":[{{"move":"Thunderbolt","id":"thunderbolt","pp":24,"maxpp":24}}]}}],{},"rqid":1}}"#,
            TEAM
        ));
        assert_eq!(
            legal_choices(&request),
            vec![Choice::Move(1), Choice::Switch(2)]
        );
    }

    #[test]
    fn test_trapped_drops_switches() {
        let request = request(&format!(
            r#"{{"active":[{{"moves":[{{"move":"Thunderbolt","id":"thunderbolt","pp":24,"maxpp":24}}],"trapped":true}}],{}}}"#,
            TEAM
        ));
        assert_eq!(legal_choices(&request), vec![Choice::Move(1)]);
    }

    #[test]
    fn test_force_switch_only_switches() {
        let request = request(&format!(r#"{{"forceSwitch":[true],{}}}"#, TEAM));
        assert_eq!(legal_choices(&request), vec![Choice::Switch(2)]);
    }

    #[test]
    fn test_no_usable_move_struggles() {
        let request = request(&format!(
            r#"{{"active":[{{"moves":[{{"move":"Thunderbolt","id":"thunderbolt","pp":0,"maxpp":24}}],"trapped":true}}],{}}}"#,
            TEAM
        ));
        assert_eq!(legal_choices(&request), vec![Choice::Move(1)]);
    }
}
