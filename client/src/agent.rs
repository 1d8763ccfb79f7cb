//! Decision makers
//!
//! An agent never picks a single choice: it reorders the legal choices best
//! first, so the handler can fall back to the next one when the server
//! refuses a choice.

use std::future::Future;

use anyhow::Result;
use deduce_battle::BattleState;
use deduce_protocol::Choice;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{AgentConfig, AgentKind};

pub trait BattleAgent: Send {
    /// Reorder `choices` in place, best first
    fn rank(
        &mut self,
        state: &BattleState,
        choices: &mut [Choice],
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Keeps the server's order
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoiceAgent;

impl BattleAgent for FirstChoiceAgent {
    async fn rank(&mut self, _state: &BattleState, _choices: &mut [Choice]) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: StdRng,
    prefer_moves: bool,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            prefer_moves: false,
        }
    }

    /// Rank every move ahead of every switch
    pub fn prefer_moves(mut self) -> Self {
        self.prefer_moves = true;
        self
    }
}

impl BattleAgent for RandomAgent {
    async fn rank(&mut self, _state: &BattleState, choices: &mut [Choice]) -> Result<()> {
        choices.shuffle(&mut self.rng);
        if self.prefer_moves {
            // stable, so the shuffled order survives within each group
            choices.sort_by_key(|c| c.is_switch());
        }
        Ok(())
    }
}

/// Agent selected by an [`AgentConfig`]
#[derive(Debug, Clone)]
pub enum ConfiguredAgent {
    First(FirstChoiceAgent),
    Random(RandomAgent),
}

impl From<AgentConfig> for ConfiguredAgent {
    fn from(config: AgentConfig) -> Self {
        match config.kind {
            AgentKind::First => ConfiguredAgent::First(FirstChoiceAgent),
            AgentKind::Random => ConfiguredAgent::Random(RandomAgent::new(config.seed)),
            AgentKind::RandomMove => {
                ConfiguredAgent::Random(RandomAgent::new(config.seed).prefer_moves())
            }
        }
    }
}

impl BattleAgent for ConfiguredAgent {
    async fn rank(&mut self, state: &BattleState, choices: &mut [Choice]) -> Result<()> {
        match self {
            ConfiguredAgent::First(agent) => agent.rank(state, choices).await,
            ConfiguredAgent::Random(agent) => agent.rank(state, choices).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Vec<Choice> {
        vec![
            Choice::Move(1),
            Choice::Move(2),
            Choice::Switch(2),
            Choice::Move(3),
            Choice::Switch(3),
        ]
    }

    #[tokio::test]
    async fn test_seeded_agent_is_reproducible() {
        let state = BattleState::new();
        let (mut a, mut b) = (choices(), choices());
        RandomAgent::new(Some(42)).rank(&state, &mut a).await.unwrap();
        RandomAgent::new(Some(42)).rank(&state, &mut b).await.unwrap();
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort();
        let mut expected = choices();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[tokio::test]
    async fn test_random_move_agent_ranks_moves_first() {
        let state = BattleState::new();
        let mut agent = ConfiguredAgent::from(AgentConfig {
            kind: AgentKind::RandomMove,
            seed: Some(3),
        });
        let mut ranked = choices();
        agent.rank(&state, &mut ranked).await.unwrap();
        assert!(ranked[..3].iter().all(Choice::is_move));
        assert!(ranked[3..].iter().all(Choice::is_switch));
    }

    #[tokio::test]
    async fn test_first_choice_agent_keeps_order() {
        let state = BattleState::new();
        let mut ranked = choices();
        FirstChoiceAgent.rank(&state, &mut ranked).await.unwrap();
        assert_eq!(ranked, choices());
    }
}
