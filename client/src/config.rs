use anyhow::{Context, Result};
use serde::Deserialize;

/// Limits and diagnostics for one battle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HandlerConfig {
    /// Stop following the battle after this turn and report it as truncated
    pub max_turns: Option<u32>,
    /// Log the belief state as JSON when the battle aborts on an error
    pub dump_state_on_error: bool,
    /// Rejected choices tolerated per decision before giving up
    pub max_choice_retries: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            max_turns: None,
            dump_state_on_error: true,
            max_choice_retries: 8,
        }
    }
}

impl HandlerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid handler config")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    /// Uniformly random ranking
    #[default]
    Random,
    /// Random ranking with every move ahead of every switch
    RandomMove,
    /// Keeps the order the legal choices were listed in
    First,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub kind: AgentKind,
    /// Seed for the random agents; drawn from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid agent config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = HandlerConfig::from_json(r#"{"maxTurns": 200}"#).unwrap();
        assert_eq!(config.max_turns, Some(200));
        assert!(config.dump_state_on_error);
        assert_eq!(config.max_choice_retries, 8);
    }

    #[test]
    fn test_agent_kind_names() {
        let config = AgentConfig::from_json(r#"{"kind": "random-move", "seed": 7}"#).unwrap();
        assert_eq!(config.kind, AgentKind::RandomMove);
        assert_eq!(config.seed, Some(7));
        assert!(AgentConfig::from_json(r#"{"kind": "minimax"}"#).is_err());
    }
}
