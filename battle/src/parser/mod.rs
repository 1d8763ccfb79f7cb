//! Battle event parser
//!
//! [`BattleParser`] consumes decoded event batches and keeps one
//! [`BattleState`] in sync with them. Events are dispatched with an exhaustive
//! match; blocks of effects whose order the protocol does not fix are handed to
//! the unordered matcher in [`matcher`], which tries the rule-wrapper pathways
//! from [`pathway`] against the upcoming events.
//!
//! The parser is synchronous. It reports what the driver has to do next as
//! [`Progress`] values rather than calling out to an agent.

mod cursor;
pub mod effects;
mod init;
mod matcher;
mod minor;
mod moves;
pub mod pathway;
mod request;
mod turn;

use std::sync::Arc;

use deduce_protocol::{
    BattleEvent, BattleRequest, Choice, ChoiceError, ChoiceErrorKind, PokemonIdent,
};
use tracing::{debug, warn};

use crate::dex::{Dex, Effectiveness};
use crate::error::Result;
use crate::state::{BattleState, MonRef};

pub use cursor::{Boundary, EventCursor, is_residual_marker};
pub use matcher::{expect_unordered, match_unordered, run_window};
pub use pathway::{Attempt, Checkpoint, Effect, Hook, Legality, Pathway};
pub use request::legal_choices;

use minor::reveal_ability;

/// What the driver should do after a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A request is pending and the state is current: pick one of `choices`
    Decide {
        choices: Vec<Choice>,
        rqid: Option<u64>,
    },
    /// The server refused the last choice
    Rejected(ChoiceError),
    /// `win` or `tie` was seen
    Finished,
}

/// Coarse parser phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    AwaitingInit,
    TurnLoop,
    Finished,
}

/// The move currently being resolved, for hooks that react to it
#[derive(Debug, Clone, PartialEq)]
pub struct MoveContext {
    pub user: MonRef,
    pub target: Option<MonRef>,
    pub move_id: String,
    /// The target took damage from the move itself
    pub damaged: bool,
    /// Effectiveness message seen for the target
    pub effectiveness: Option<Effectiveness>,
    /// An ability of the target stopped the move
    pub blocked: bool,
}

/// Mutable view handed to every handler and rule-wrapper hook
pub struct ParserContext<'a> {
    pub state: &'a mut BattleState,
    pub dex: &'a Dex,
    pub events: EventCursor<'a>,
    pub move_ctx: Option<MoveContext>,
}

impl<'a> ParserContext<'a> {
    pub fn new(state: &'a mut BattleState, dex: &'a Dex, events: &'a [BattleEvent]) -> Self {
        Self {
            state,
            dex,
            events: EventCursor::new(events),
            move_ctx: None,
        }
    }

    pub fn peek(&self) -> Option<&'a BattleEvent> {
        self.events.peek()
    }

    /// Whether `ident` names `mon`
    pub fn is(&self, ident: &PokemonIdent, mon: MonRef) -> bool {
        self.state.find(ident) == Some(mon)
    }

    pub fn at_boundary(&self, boundary: Boundary) -> bool {
        self.events.at_boundary(self.dex, boundary)
    }

    /// Consume the next event and apply it to the state
    pub fn apply_next(&mut self) -> Result<()> {
        minor::apply_next(self)
    }
}

/// Decision bookkeeping carried across batches.
///
/// A request describes the state after the battle log that follows it, so it
/// is only applied and answered once that log has been parsed.
#[derive(Debug, Clone, Default)]
struct Flow {
    phase: Phase,
    pending: Option<BattleRequest>,
    /// Battle log seen since the pending request arrived
    caught_up: bool,
    /// The last choice was refused; the next request is answered immediately
    after_error: bool,
    residual_done: bool,
}

/// Synchronous battle parser for one battle.
pub struct BattleParser {
    state: BattleState,
    dex: Arc<Dex>,
    flow: Flow,
}

impl BattleParser {
    pub fn new(dex: Arc<Dex>) -> Self {
        Self {
            state: BattleState::new(),
            dex,
            flow: Flow::default(),
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.flow.phase
    }

    pub fn pending_request(&self) -> Option<&BattleRequest> {
        self.flow.pending.as_ref()
    }

    /// Parse one or more batches, each terminated by [`BattleEvent::Halt`]
    pub fn feed(&mut self, events: &[BattleEvent]) -> Result<Vec<Progress>> {
        let dex = Arc::clone(&self.dex);
        let mut ctx = ParserContext::new(&mut self.state, &dex, events);
        let flow = &mut self.flow;
        let mut progress = Vec::new();

        while ctx.peek().is_some() {
            step(&mut ctx, flow, &mut progress)?;
        }
        Ok(progress)
    }
}

fn step(ctx: &mut ParserContext<'_>, flow: &mut Flow, progress: &mut Vec<Progress>) -> Result<()> {
    let Some(event) = ctx.peek() else {
        return Ok(());
    };

    match event {
        BattleEvent::Player { .. }
        | BattleEvent::TeamSize { .. }
        | BattleEvent::GameType(_)
        | BattleEvent::Gen(_)
        | BattleEvent::Tier(_)
        | BattleEvent::Rated(_)
        | BattleEvent::Rule(_)
        | BattleEvent::ClearPoke
        | BattleEvent::Poke { .. }
        | BattleEvent::TeamPreview(_) => {
            init::handle(ctx)?;
            flow.caught_up = true;
        }
        BattleEvent::Start => {
            ctx.events.next();
            flow.phase = Phase::TurnLoop;
            flow.caught_up = true;
        }

        BattleEvent::Request(request) => {
            ctx.events.next();
            if request.needs_decision() {
                flow.pending = Some(request.as_ref().clone());
                flow.caught_up = std::mem::take(&mut flow.after_error);
            } else {
                flow.pending = None;
            }
        }
        BattleEvent::Error(error) => {
            ctx.events.next();
            warn!(kind = ?error.kind, message = %error.message, "choice rejected");
            if error.is_trapped() {
                request::infer_trapper(ctx)?;
            }
            // only an unavailable choice is followed by a fresh request
            flow.after_error = error.kind == ChoiceErrorKind::Unavailable;
            progress.push(Progress::Rejected(error.clone()));
        }
        BattleEvent::Inactive(_) | BattleEvent::InactiveOff(_) | BattleEvent::Raw(_) => {
            ctx.events.next();
        }
        BattleEvent::Upkeep => {
            if !flow.residual_done {
                turn::residual(ctx)?;
            }
            ctx.events.next();
            flow.residual_done = true;
            flow.caught_up = true;
        }
        BattleEvent::Turn(number) => {
            ctx.events.next();
            turn::start_turn(ctx, *number);
            flow.residual_done = false;
            flow.caught_up = true;
        }
        BattleEvent::Win(winner) => {
            ctx.events.next();
            ctx.state.ended = true;
            ctx.state.winner = Some(winner.clone());
            flow.phase = Phase::Finished;
            flow.pending = None;
            progress.push(Progress::Finished);
        }
        BattleEvent::Tie => {
            ctx.events.next();
            ctx.state.ended = true;
            ctx.state.tie = true;
            flow.phase = Phase::Finished;
            flow.pending = None;
            progress.push(Progress::Finished);
        }
        BattleEvent::Halt => {
            ctx.events.next();
            if flow.phase != Phase::Finished && flow.caught_up {
                if let Some(request) = flow.pending.take() {
                    request::sync(ctx, &request)?;
                    let choices = legal_choices(&request);
                    debug!(?choices, rqid = ?request.rqid, "deciding");
                    progress.push(Progress::Decide {
                        choices,
                        rqid: request.rqid,
                    });
                }
            }
        }

        BattleEvent::Move { .. } => {
            moves::handle_move(ctx)?;
            flow.caught_up = true;
        }
        BattleEvent::Cant { .. } => {
            moves::handle_cant(ctx)?;
            flow.caught_up = true;
        }
        BattleEvent::Switch { .. } | BattleEvent::Drag { .. } => {
            turn::handle_switches(ctx)?;
            flow.caught_up = true;
        }
        BattleEvent::Replace { .. } | BattleEvent::Swap { .. } | BattleEvent::Unsupported(_) => {
            return Err(crate::error::BattleError::unsupported(format!(
                "{} is outside gen 4 singles",
                event.tag()
            )));
        }

        _ => {
            if flow.phase == Phase::TurnLoop && !flow.residual_done && ctx.events.residual_ahead() {
                turn::residual(ctx)?;
                flow.residual_done = true;
            } else {
                ctx.apply_next()?;
            }
            flow.caught_up = true;
        }
    }
    Ok(())
}
