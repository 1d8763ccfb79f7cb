//! Battle progress message parsers
//!
//! These messages track the flow and state of a battle.

use super::request::BattleRequest;
use super::{BattleEvent, ChoiceError};
use anyhow::{Context, Result};

/// Parse |request|REQUEST (JSON)
///
/// The JSON payload may itself contain `|`, so everything after the tag is rejoined.
pub fn parse_request(parts: &[&str]) -> Result<BattleEvent> {
    let json_str = parts.get(2..).map(|p| p.join("|")).unwrap_or_default();
    let request: BattleRequest =
        serde_json::from_str(&json_str).context("Malformed request payload")?;
    Ok(BattleEvent::Request(Box::new(request)))
}

/// Parse |error|MESSAGE
pub fn parse_error(parts: &[&str]) -> Result<BattleEvent> {
    let message = parts.get(2..).map(|p| p.join("|")).unwrap_or_default();
    Ok(BattleEvent::Error(ChoiceError::parse(&message)))
}

/// Parse |inactive|MESSAGE
pub fn parse_inactive(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Inactive(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |inactiveoff|MESSAGE
pub fn parse_inactiveoff(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::InactiveOff(
        parts.get(2).unwrap_or(&"").to_string(),
    ))
}

/// Parse |turn|NUMBER
pub fn parse_turn(parts: &[&str]) -> Result<BattleEvent> {
    let turn = parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing turn number"))?;

    Ok(BattleEvent::Turn(turn))
}

/// Parse |win|USER
pub fn parse_win(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Win(parts.get(2).unwrap_or(&"").to_string()))
}
