//! Switch-ins, the end-of-turn phase and turn numbering

use deduce_protocol::{BattleEvent, HpStatus, Player, PokemonDetails, PokemonIdent};
use tracing::{debug, info};

use super::cursor::Boundary;
use super::matcher::{match_unordered, run_window};
use super::pathway::{Hook, ability_pathways, residual_window, start_window};
use super::ParserContext;
use crate::error::{BattleError, Result};
use crate::state::{BatonPass, MonRef, Status, SwitchInBuilder, Volatile};

/// Volatile conditions Baton Pass hands to the replacement
const PASSED_VOLATILES: &[Volatile] = &[
    Volatile::Substitute,
    Volatile::Confusion,
    Volatile::LeechSeed,
    Volatile::Curse,
    Volatile::Ingrain,
    Volatile::AquaRing,
    Volatile::MagnetRise,
    Volatile::FocusEnergy,
    Volatile::PerishSong,
    Volatile::Embargo,
    Volatile::HealBlock,
];

pub(super) fn start_turn(ctx: &mut ParserContext<'_>, turn: u32) {
    ctx.state.turn = turn;
    for mon in ctx.state.actives() {
        ctx.state.mon_mut(mon).volatile.turns_active += 1;
    }
    info!(turn, "turn started");
}

/// End-of-turn effects up to `upkeep`
pub(super) fn residual(ctx: &mut ParserContext<'_>) -> Result<()> {
    let pathways = residual_window(ctx);
    debug!(candidates = pathways.len(), "residual window");
    run_window(ctx, pathways, Boundary::Residual)
}

/// A run of `switch`/`drag` events and the entry effects that follow them
pub(super) fn handle_switches(ctx: &mut ParserContext<'_>) -> Result<()> {
    let mut entering = Vec::new();

    while let Some(event) = ctx.peek() {
        let (pokemon, details, hp_status, forced) = match event {
            BattleEvent::Switch {
                pokemon,
                details,
                hp_status,
            } => (pokemon, details, hp_status, false),
            BattleEvent::Drag {
                pokemon,
                details,
                hp_status,
            } => (pokemon, details, hp_status, true),
            _ => break,
        };
        ctx.events.next();
        let mon = switch_in(ctx, pokemon, details, hp_status.as_ref(), forced)?;
        entering.retain(|m: &MonRef| m.side != mon.side);
        entering.push(mon);
    }

    if entering.is_empty() {
        let event = ctx.peek().map(|e| format!("{:?}", e)).unwrap_or_default();
        return Err(BattleError::ParseMismatch {
            expected: "switch".to_string(),
            event,
            context: "switch-in".to_string(),
        });
    }
    let pathways = start_window(ctx, &entering);
    run_window(ctx, pathways, Boundary::Action)
}

fn switch_in(
    ctx: &mut ParserContext<'_>,
    pokemon: &PokemonIdent,
    details: &PokemonDetails,
    hp_status: Option<&HpStatus>,
    forced: bool,
) -> Result<MonRef> {
    let player = pokemon.player;
    let passed = leave_field(ctx, player, forced)?;

    let mut builder = SwitchInBuilder::from_ident(pokemon)
        .details(details)
        .forced(forced);
    if let Some(hp) = hp_status {
        builder = builder.hp(hp.clone());
    }
    let info = builder.build()?;
    let mon = ctx.state.reveal(ctx.dex, &info)?;

    let team = ctx.state.team_mut(player);
    team.active = Some(mon.index);
    let record = ctx.state.mon_mut(mon);
    record.active = true;
    if let Some(hp) = hp_status {
        record.hp.update(hp);
        record.status = hp.status.as_deref().and_then(Status::from_protocol);
        record.fainted = hp.is_fainted();
    }
    if let Some(pass) = passed {
        record.volatile.boosts = pass.boosts;
        record.volatile.conditions = pass.conditions;
    }

    debug!(pokemon = %pokemon, forced, "switched in");
    Ok(mon)
}

/// Take the current active pokemon of `player` off the field.
///
/// Its switch-out effects are matched first, while it is still active.
fn leave_field(
    ctx: &mut ParserContext<'_>,
    player: Player,
    forced: bool,
) -> Result<Option<BatonPass>> {
    let pass = ctx.state.team_mut(player).baton_pass.take();
    let Some(previous) = ctx.state.active(player) else {
        return Ok(None);
    };

    if ctx.state.mon(previous).status.is_some() {
        let mut pathways = ability_pathways(ctx, previous, Hook::SwitchOut);
        match_unordered(ctx, &mut pathways)?;
        silent_switch_out(ctx, previous);
    }
    ctx.state.mon_mut(previous).switch_out();

    Ok(if forced { None } else { pass })
}

/// Natural Cure heals without a message once the ability is known
fn silent_switch_out(ctx: &mut ParserContext<'_>, mon: MonRef) {
    let record = ctx.state.mon(mon);
    let cures = match &record.volatile.override_ability {
        Some(id) => ctx
            .dex
            .find_ability(id)
            .is_some_and(|a| a.data().on_switch_out.is_some()),
        None => ctx
            .state
            .inference
            .definite(record.ability)
            .and_then(|id| ctx.dex.find_ability(id))
            .is_some_and(|a| a.data().on_switch_out.is_some()),
    };
    if cures {
        ctx.state.mon_mut(mon).status = None;
    }
}

/// Boosts and volatiles Baton Pass carries from `mon`
pub(super) fn baton_pass(ctx: &mut ParserContext<'_>, mon: MonRef) {
    let record = ctx.state.mon(mon);
    let pass = BatonPass {
        boosts: record.volatile.boosts.clone(),
        conditions: record
            .volatile
            .conditions
            .iter()
            .filter(|v| PASSED_VOLATILES.contains(v))
            .cloned()
            .collect(),
    };
    ctx.state.team_mut(mon.side).baton_pass = Some(pass);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, events};

    fn run(fixture: &mut Fixture, lines: &[&str]) {
        let batch = events(lines);
        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        handle_switches(&mut ctx).unwrap();
        assert!(ctx.peek().is_none(), "left {:?}", ctx.peek());
    }

    #[test]
    fn test_intimidate_on_entry() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        run(
            &mut fixture,
            &[
                "|switch|p2a: Gyarados|Gyarados, L80, M|100/100",
                "|-ability|p2a: Gyarados|Intimidate|boost",
                "|-unboost|p1a: Pikachu|atk|1",
            ],
        );
        let gyarados = fixture.p2();
        let class = fixture.state.mon(gyarados).ability;
        assert_eq!(fixture.state.inference.definite(class), Some("intimidate"));
        assert_eq!(fixture.state.mon(fixture.p1()).volatile.boosts.atk, -1);
    }

    #[test]
    fn test_switch_resets_volatiles() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let pikachu = fixture.p1();
        fixture.state.mon_mut(pikachu).volatile.boosts.spa = 2;
        run(&mut fixture, &["|switch|p1a: Starmie|Starmie|100/100"]);
        assert_eq!(fixture.state.mon(pikachu).volatile.boosts.spa, 0);
        assert!(!fixture.state.mon(pikachu).active);
    }

    #[test]
    fn test_baton_pass_carries_boosts() {
        let mut fixture = Fixture::new("Ninjask", "Snorlax");
        let ninjask = fixture.p1();
        fixture.state.mon_mut(ninjask).volatile.boosts.spe = 2;
        fixture
            .state
            .mon_mut(ninjask)
            .volatile
            .conditions
            .insert(Volatile::Substitute);
        fixture
            .state
            .mon_mut(ninjask)
            .volatile
            .conditions
            .insert(Volatile::Taunt);
        {
            let batch = events(&[]);
            let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
            baton_pass(&mut ctx, ninjask);
        }
        run(&mut fixture, &["|switch|p1a: Pikachu|Pikachu|100/100"]);
        let pikachu = fixture.state.mon(fixture.p1());
        assert_eq!(pikachu.volatile.boosts.spe, 2);
        assert!(pikachu.volatile.has(&Volatile::Substitute));
        assert!(!pikachu.volatile.has(&Volatile::Taunt));
    }

    #[test]
    fn test_sand_stream_is_certain_on_entry() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let batch = events(&["|switch|p2a: Tyranitar|Tyranitar|100/100", "|turn|2"]);
        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        // tyranitar can only have sand stream, which always announces itself
        assert!(matches!(
            handle_switches(&mut ctx),
            Err(BattleError::ParseMismatch { .. })
        ));
    }

    fn end_of_turn(fixture: &mut Fixture) {
        let batch = events(&["|upkeep"]);
        let mut ctx = ParserContext::new(&mut fixture.state, &fixture.dex, &batch);
        residual(&mut ctx).unwrap();
    }

    #[test]
    fn test_embargo_keeps_residual_items_possible() {
        let mut fixture = Fixture::new("Pikachu", "Snorlax");
        let snorlax = fixture.p2();
        fixture.state.mon_mut(snorlax).hp.current = 70;
        fixture
            .state
            .mon_mut(snorlax)
            .volatile
            .conditions
            .insert(Volatile::Embargo);
        end_of_turn(&mut fixture);

        let item = fixture.state.mon(snorlax).item;
        assert!(fixture.state.inference.is_possible(item, "leftovers"));
        assert!(fixture.state.inference.is_possible(item, "blacksludge"));

        fixture
            .state
            .mon_mut(snorlax)
            .volatile
            .conditions
            .remove(&Volatile::Embargo);
        end_of_turn(&mut fixture);
        assert!(!fixture.state.inference.is_possible(item, "leftovers"));
    }

    #[test]
    fn test_natural_cure_on_switch_out() {
        let mut fixture = Fixture::new("Starmie", "Snorlax");
        let starmie = fixture.p1();
        fixture.state.mon_mut(starmie).status = Some(Status::Paralysis);
        run(
            &mut fixture,
            &[
                "|switch|p1a: Pikachu|Pikachu|100/100",
                "|-curestatus|p1a: Starmie|par|[from] ability: Natural Cure",
            ],
        );
        let record = fixture.state.mon(starmie);
        assert_eq!(record.status, None);
        assert_eq!(fixture.state.inference.definite(record.ability), Some("naturalcure"));
    }
}
