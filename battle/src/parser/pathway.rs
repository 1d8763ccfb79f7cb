//! Candidate effects for the unordered matcher
//!
//! A [`Pathway`] names one rule-wrapper hook of one possible ability or item
//! of one pokemon. It is plain data: the matcher asks it whether it is still
//! possible, whether it is legal right now, and then lets it try to consume the
//! upcoming events. An attempt either commits fully or leaves the events and
//! the state untouched.

use std::fmt;

use tracing::trace;

use super::{MoveContext, ParserContext};
use crate::error::Result;
use crate::inference::Reasons;
use crate::state::{BattleState, MonRef, Volatile};

/// Outcome of one pathway attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// The upcoming events are this effect; they were consumed and applied
    Committed,
    /// The upcoming events are something else; nothing was consumed
    NoMatch,
}

/// Result of a `can_*` check that did not rule the effect out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legality {
    /// Preconditions that must additionally hold for the effect to fire
    pub reasons: Reasons,
    /// The effect must fire whenever `reasons` hold
    pub certain: bool,
}

impl Legality {
    pub fn certain(reasons: Reasons) -> Self {
        Self {
            reasons,
            certain: true,
        }
    }

    /// Chance-based or otherwise optional effects
    pub fn possible(reasons: Reasons) -> Self {
        Self {
            reasons,
            certain: false,
        }
    }

    pub fn when(reasons: Reasons, certain: bool) -> Self {
        Self { reasons, certain }
    }
}

/// Rule-engine hook a pathway runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Hook {
    SwitchOut,
    Start,
    Block,
    Residual,
    Contact,
    /// Held-item reactions to HP or status changes (berries)
    Update,
    /// After the holder's move dealt damage (Life Orb)
    PostDamage,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Effect {
    Ability(String),
    Item(String),
}

impl Effect {
    pub fn id(&self) -> &str {
        match self {
            Effect::Ability(id) | Effect::Item(id) => id,
        }
    }
}

/// When a pathway's "must have fired" check is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Against the state when the window opened
    Open,
    /// Against the state when the window closed
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pathway {
    pub holder: MonRef,
    pub effect: Effect,
    pub hook: Hook,
    checkpoint: Checkpoint,
    opened: Option<Legality>,
}

impl Pathway {
    pub fn new(holder: MonRef, effect: Effect, hook: Hook) -> Self {
        let checkpoint = match hook {
            Hook::SwitchOut | Hook::Start | Hook::Residual => Checkpoint::Open,
            Hook::Block | Hook::Contact | Hook::Update | Hook::PostDamage => Checkpoint::Close,
        };
        Self {
            holder,
            effect,
            hook,
            checkpoint,
            opened: None,
        }
    }

    /// Record the legality at the moment the window opens
    pub fn open(mut self, ctx: &ParserContext<'_>) -> Self {
        self.opened = self.legality(ctx);
        self
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    /// Whether the holder can still be the source of this effect at all
    pub fn is_possible(&self, state: &BattleState) -> bool {
        let mon = state.mon(self.holder);
        if !mon.active || !mon.is_alive() {
            return false;
        }
        match &self.effect {
            Effect::Ability(id) => {
                !mon.volatile.has(&Volatile::Transformed)
                    && mon.ability_in(&state.inference, &[id.as_str()]).is_some()
            }
            Effect::Item(id) => state.inference.is_possible(mon.item, id),
        }
    }

    /// Current `can_*` check of the hook
    pub fn legality(&self, ctx: &ParserContext<'_>) -> Option<Legality> {
        let state = &*ctx.state;
        let holder = self.holder;
        let move_ctx: Option<&MoveContext> = ctx.move_ctx.as_ref();

        match &self.effect {
            Effect::Ability(id) => {
                let ability = ctx.dex.find_ability(id)?;
                match self.hook {
                    Hook::SwitchOut => ability.can_switch_out(state, holder),
                    Hook::Start => ability.can_start(state, holder),
                    Hook::Block => ability.can_block(state, holder, move_ctx?),
                    Hook::Residual => ability.can_residual(state, holder),
                    Hook::Contact => ability.can_contact(state, holder, move_ctx?),
                    Hook::Update | Hook::PostDamage => None,
                }
            }
            Effect::Item(id) => {
                let item = ctx.dex.find_item(id)?;
                match self.hook {
                    Hook::Residual => item.can_residual(state, holder),
                    Hook::Update => item.can_update(state, holder, move_ctx),
                    Hook::PostDamage => item.can_post_damage(state, holder, move_ctx?),
                    Hook::SwitchOut | Hook::Start | Hook::Block | Hook::Contact => None,
                }
            }
        }
    }

    /// Legality used to decide whether the effect should have fired
    pub fn expected(&self, ctx: &ParserContext<'_>) -> Option<Legality> {
        match self.checkpoint {
            Checkpoint::Open => self.opened.clone(),
            Checkpoint::Close => self.legality(ctx),
        }
    }

    /// Try to match the upcoming events against this effect
    pub fn attempt(&self, ctx: &mut ParserContext<'_>) -> Result<Attempt> {
        let dex = ctx.dex;
        let holder = self.holder;

        let attempt = match &self.effect {
            Effect::Ability(id) => {
                let Some(ability) = dex.find_ability(id) else {
                    return Ok(Attempt::NoMatch);
                };
                match self.hook {
                    Hook::SwitchOut => ability.on_switch_out(ctx, holder)?,
                    Hook::Start => ability.on_start(ctx, holder)?,
                    Hook::Block => ability.on_block(ctx, holder)?,
                    Hook::Residual => ability.on_residual(ctx, holder)?,
                    Hook::Contact => ability.on_contact(ctx, holder)?,
                    Hook::Update | Hook::PostDamage => Attempt::NoMatch,
                }
            }
            Effect::Item(id) => {
                let Some(item) = dex.find_item(id) else {
                    return Ok(Attempt::NoMatch);
                };
                match self.hook {
                    Hook::Residual => item.on_residual(ctx, holder)?,
                    Hook::Update => item.on_update(ctx, holder)?,
                    Hook::PostDamage => item.on_post_damage(ctx, holder)?,
                    Hook::SwitchOut | Hook::Start | Hook::Block | Hook::Contact => {
                        Attempt::NoMatch
                    }
                }
            }
        };
        trace!(pathway = %self, ?attempt, "attempted");
        Ok(attempt)
    }
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.effect {
            Effect::Ability(_) => "ability",
            Effect::Item(_) => "item",
        };
        write!(
            f,
            "{}[{}] {} {} {:?}",
            self.holder.side.as_str(),
            self.holder.index,
            kind,
            self.effect.id(),
            self.hook
        )
    }
}

// === Window builders ===

/// Ability candidates of `holder` that declare `hook`
pub fn ability_pathways(ctx: &ParserContext<'_>, holder: MonRef, hook: Hook) -> Vec<Pathway> {
    let mon = ctx.state.mon(holder);
    let candidates: Vec<String> = match &mon.volatile.override_ability {
        Some(current) => vec![current.clone()],
        None => ctx
            .state
            .inference
            .domain(mon.ability)
            .iter()
            .cloned()
            .collect(),
    };

    candidates
        .into_iter()
        .filter(|id| ctx.dex.find_ability(id).is_some_and(|a| a.has_hook(hook)))
        .map(|id| Pathway::new(holder, Effect::Ability(id), hook).open(ctx))
        .collect()
}

/// Item candidates of `holder` that declare `hook`
pub fn item_pathways(ctx: &ParserContext<'_>, holder: MonRef, hook: Hook) -> Vec<Pathway> {
    let mon = ctx.state.mon(holder);
    ctx.state
        .inference
        .domain(mon.item)
        .iter()
        .filter(|id| ctx.dex.find_item(id).is_some_and(|i| i.has_hook(hook)))
        .map(|id| Pathway::new(holder, Effect::Item(id.clone()), hook).open(ctx))
        .collect()
}

/// Berry reactions of every active pokemon
pub fn update_window(ctx: &ParserContext<'_>) -> Vec<Pathway> {
    ctx.state
        .actives()
        .into_iter()
        .flat_map(|mon| item_pathways(ctx, mon, Hook::Update))
        .collect()
}

/// Entry effects of the pokemon that just switched in
pub fn start_window(ctx: &ParserContext<'_>, entering: &[MonRef]) -> Vec<Pathway> {
    let mut pathways: Vec<Pathway> = entering
        .iter()
        .flat_map(|mon| ability_pathways(ctx, *mon, Hook::Start))
        .collect();
    pathways.extend(update_window(ctx));
    pathways
}

/// End-of-turn effects of both active pokemon, p1 first
pub fn residual_window(ctx: &ParserContext<'_>) -> Vec<Pathway> {
    let mut pathways = Vec::new();
    for mon in ctx.state.actives() {
        pathways.extend(ability_pathways(ctx, mon, Hook::Residual));
        pathways.extend(item_pathways(ctx, mon, Hook::Residual));
    }
    pathways.extend(update_window(ctx));
    pathways
}

/// Reactions to the move in `ctx.move_ctx`
pub fn move_window(ctx: &ParserContext<'_>) -> Vec<Pathway> {
    let mut pathways = Vec::new();
    if let Some(move_ctx) = &ctx.move_ctx {
        if let Some(target) = move_ctx.target.filter(|t| *t != move_ctx.user) {
            pathways.extend(ability_pathways(ctx, target, Hook::Block));
            pathways.extend(ability_pathways(ctx, target, Hook::Contact));
        }
        pathways.extend(item_pathways(ctx, move_ctx.user, Hook::PostDamage));
    }
    pathways.extend(update_window(ctx));
    pathways
}
