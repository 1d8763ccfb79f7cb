//! Forward-only view over one batch of decoded events

use deduce_protocol::{BattleEvent, EffectSource, to_id};
use tracing::trace;

use crate::dex::Dex;
use crate::state::Volatile;

/// Non-ability, non-item `[from]` effects that only happen at end of turn
const RESIDUAL_SOURCES: &[&str] = &[
    "psn",
    "tox",
    "brn",
    "leechseed",
    "sandstorm",
    "hail",
    "nightmare",
    "curse",
    "ingrain",
    "aquaring",
    "wrap",
    "bind",
    "firespin",
    "whirlpool",
    "sandtomb",
    "clamp",
    "magmastorm",
    "partiallytrapped",
    "wish",
    "futuresight",
    "doomdesire",
];

/// Where a matching window stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The minor events following one action; also stops where end-of-turn effects begin
    Action,
    /// End-of-turn effects; stops at `upkeep`
    Residual,
}

#[derive(Debug, Clone)]
pub struct EventCursor<'a> {
    events: &'a [BattleEvent],
    pos: usize,
}

impl<'a> EventCursor<'a> {
    pub fn new(events: &'a [BattleEvent]) -> Self {
        Self { events, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a BattleEvent> {
        self.events.get(self.pos)
    }

    pub fn peek_nth(&self, n: usize) -> Option<&'a BattleEvent> {
        self.events.get(self.pos + n)
    }

    pub fn next(&mut self) -> Option<&'a BattleEvent> {
        let event = self.events.get(self.pos)?;
        trace!(tag = event.tag(), ?event, "consumed");
        self.pos += 1;
        Some(event)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the next event closes a window of the given kind
    pub fn at_boundary(&self, dex: &Dex, boundary: Boundary) -> bool {
        match self.peek() {
            None => true,
            Some(event) if closes_block(event) => true,
            Some(event) => {
                boundary == Boundary::Action
                    && is_residual_marker(dex, event)
                    && self.residual_ahead()
            }
        }
    }

    /// An `upkeep` follows in this batch with no action in between
    pub fn residual_ahead(&self) -> bool {
        for event in &self.events[self.pos..] {
            match event {
                BattleEvent::Upkeep => return true,
                BattleEvent::Turn(_) | BattleEvent::Halt => return false,
                e if e.is_major() => return false,
                _ => {}
            }
        }
        false
    }
}

fn closes_block(event: &BattleEvent) -> bool {
    event.is_major()
        || matches!(
            event,
            BattleEvent::Halt
                | BattleEvent::Upkeep
                | BattleEvent::Turn(_)
                | BattleEvent::Win(_)
                | BattleEvent::Tie
                | BattleEvent::Request(_)
                | BattleEvent::Error(_)
                | BattleEvent::Start
        )
}

/// Events that can only come from the end-of-turn phase
pub fn is_residual_marker(dex: &Dex, event: &BattleEvent) -> bool {
    let residual_source = |kwargs: &deduce_protocol::KwArgs| match kwargs.source() {
        Some(EffectSource::Ability(name)) => dex
            .ability(&name)
            .is_ok_and(|a| a.data().on_residual.is_some()),
        Some(EffectSource::Item(name)) => {
            dex.item(&name).is_ok_and(|i| i.data().on_residual.is_some())
        }
        Some(EffectSource::Move(name)) | Some(EffectSource::Other(name)) => {
            RESIDUAL_SOURCES.contains(&to_id(&name).as_str())
        }
        None => false,
    };

    match event {
        BattleEvent::Weather { weather, kwargs } => kwargs.has("upkeep") || weather == "none",
        BattleEvent::Damage { kwargs, .. }
        | BattleEvent::Heal { kwargs, .. }
        | BattleEvent::Status { kwargs, .. }
        | BattleEvent::CureStatus { kwargs, .. }
        | BattleEvent::Boost { kwargs, .. } => residual_source(kwargs),
        BattleEvent::VolatileEnd { effect, kwargs, .. } => {
            kwargs.from.is_none()
                && matches!(
                    Volatile::from_protocol(effect),
                    Volatile::Taunt
                        | Volatile::Encore
                        | Volatile::Disable
                        | Volatile::MagnetRise
                        | Volatile::HealBlock
                        | Volatile::Embargo
                        | Volatile::Yawn
                        | Volatile::PartialTrap
                )
        }
        BattleEvent::VolatileStart { effect, kwargs, .. } => {
            kwargs.from.is_none() && effect.starts_with("perish")
        }
        BattleEvent::SideEnd { kwargs, .. } | BattleEvent::FieldEnd { kwargs, .. } => {
            kwargs.from.is_none()
        }
        _ => false,
    }
}
