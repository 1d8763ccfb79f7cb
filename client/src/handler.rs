//! Per-battle driver
//!
//! [`BattleHandler`] feeds frames to a [`BattleParser`], asks the agent to
//! rank the legal choices when a decision is due, and sends the best one.
//! Refused choices are retried without re-ranking:
//!
//! - `[Invalid choice]`: the choice contradicted what we already knew. The
//!   next-best candidate is sent straight away.
//! - `[Unavailable choice]`: the server knew something we did not (a trapping
//!   ability, a disabled move). The refused choice is dropped and the rest of
//!   the ranking waits for the next request, which is used to filter it.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use deduce_battle::{BattleParser, Dex, Progress};
use deduce_protocol::{ChoiceError, ChoiceErrorKind, Choice, ServerFrame};
use futures_util::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::agent::BattleAgent;
use crate::config::HandlerConfig;
use crate::error::RejectedChoiceError;
use crate::sender::ChoiceSender;

/// How a battle ended, from the handler's point of view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BattleResult {
    pub winner: Option<String>,
    pub tie: bool,
    /// The battle was not followed to the end
    pub truncated: bool,
}

impl BattleResult {
    /// The stream ended before `win` or `tie`
    pub fn abandoned() -> Self {
        Self {
            winner: None,
            tie: false,
            truncated: true,
        }
    }
}

/// Ranked candidates for the decision being answered
#[derive(Debug, Default)]
struct Decision {
    /// Remaining candidates, best first; the head is the one last sent
    ranked: Vec<Choice>,
    rqid: Option<u64>,
    /// Waiting for a request that tells us what the server already knew
    pending_reveal: bool,
    retries: usize,
}

pub struct BattleHandler<A, S> {
    parser: BattleParser,
    agent: A,
    sender: S,
    config: HandlerConfig,
    decision: Decision,
}

impl<A: BattleAgent, S: ChoiceSender> BattleHandler<A, S> {
    pub fn new(dex: Arc<Dex>, agent: A, sender: S, config: HandlerConfig) -> Self {
        Self {
            parser: BattleParser::new(dex),
            agent,
            sender,
            config,
            decision: Decision::default(),
        }
    }

    pub fn parser(&self) -> &BattleParser {
        &self.parser
    }

    /// Follow the battle until it ends, the stream closes, or a fatal error
    pub async fn run<St>(&mut self, mut frames: St) -> Result<BattleResult>
    where
        St: Stream<Item = Result<ServerFrame>> + Unpin,
    {
        while let Some(frame) = frames.next().await {
            let frame = frame.context("Failed to receive battle frame")?;
            if let Some(result) = self.handle_frame(&frame).await? {
                return Ok(result);
            }
        }
        info!("battle stream ended before a result");
        Ok(BattleResult::abandoned())
    }

    /// Process one frame; `Some` once the battle is over for us
    pub async fn handle_frame(&mut self, frame: &ServerFrame) -> Result<Option<BattleResult>> {
        let progress = match self.parser.feed(&frame.events) {
            Ok(progress) => progress,
            Err(err) => {
                if self.config.dump_state_on_error {
                    let dump = self.parser.state().snapshot().unwrap_or_default();
                    error!(error = %err, state = %dump, "battle aborted");
                } else {
                    error!(error = %err, "battle aborted");
                }
                return Err(err).context("Battle parser failed");
            }
        };

        for step in progress {
            match step {
                Progress::Decide { choices, rqid } => {
                    if let Some(limit) = self.config.max_turns
                        && self.parser.state().turn > limit
                    {
                        info!(turn = self.parser.state().turn, limit, "turn limit reached");
                        return Ok(Some(BattleResult {
                            truncated: true,
                            ..BattleResult::default()
                        }));
                    }
                    self.decide(choices, rqid).await?;
                }
                Progress::Rejected(error) => self.rejected(error).await?,
                Progress::Finished => {
                    let state = self.parser.state();
                    info!(winner = ?state.winner, tie = state.tie, turn = state.turn, "battle finished");
                    return Ok(Some(BattleResult {
                        winner: state.winner.clone(),
                        tie: state.tie,
                        truncated: false,
                    }));
                }
            }
        }
        Ok(None)
    }

    async fn decide(&mut self, choices: Vec<Choice>, rqid: Option<u64>) -> Result<()> {
        if choices.is_empty() {
            bail!("Request has no legal choices");
        }

        if self.decision.pending_reveal {
            let mut ranked = std::mem::take(&mut self.decision.ranked);
            ranked.retain(|c| choices.contains(c));
            if !ranked.is_empty() {
                debug!(?ranked, "reusing ranking after reveal");
                self.decision.ranked = ranked;
                self.decision.rqid = rqid;
                self.decision.pending_reveal = false;
                return self.send_best().await;
            }
        }

        let mut ranked = choices;
        self.agent
            .rank(self.parser.state(), &mut ranked)
            .await
            .context("Agent failed to rank choices")?;
        self.decision = Decision {
            ranked,
            rqid,
            pending_reveal: false,
            retries: 0,
        };
        self.send_best().await
    }

    async fn rejected(&mut self, error: ChoiceError) -> Result<()> {
        let Some(&choice) = self.decision.ranked.first() else {
            warn!(message = %error.message, "rejection without a pending choice");
            return Ok(());
        };
        let rejected = RejectedChoiceError {
            kind: error.kind,
            choice,
            message: error.message,
        };
        warn!(%rejected, "choice rejected");

        self.decision.ranked.remove(0);
        self.decision.retries += 1;
        if self.decision.retries > self.config.max_choice_retries {
            return Err(anyhow::Error::new(rejected).context("Too many rejected choices"));
        }
        if self.decision.ranked.is_empty() {
            return Err(anyhow::Error::new(rejected).context("Every ranked choice was rejected"));
        }

        match rejected.kind {
            ChoiceErrorKind::Unavailable => {
                self.decision.pending_reveal = true;
                Ok(())
            }
            ChoiceErrorKind::Invalid | ChoiceErrorKind::Other => self.send_best().await,
        }
    }

    async fn send_best(&mut self) -> Result<()> {
        let Some(&choice) = self.decision.ranked.first() else {
            bail!("No choice left to send");
        };
        debug!(%choice, rqid = ?self.decision.rqid, "sending choice");
        self.sender
            .send(choice, self.decision.rqid)
            .await
            .context("Failed to send choice")
    }
}
