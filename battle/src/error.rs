//! Fatal battle errors

use std::fmt;

use thiserror::Error;

pub type Result<T, E = BattleError> = std::result::Result<T, E>;

/// Errors that abort the current battle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BattleError {
    #[error(transparent)]
    Contradiction(#[from] ContradictionError),

    #[error("Parse mismatch: expected {expected}, got {event} ({context})")]
    ParseMismatch {
        expected: String,
        event: String,
        context: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid dex data: {0}")]
    Dex(String),
}

impl BattleError {
    pub fn mismatch(
        expected: impl Into<String>,
        event: impl fmt::Debug,
        context: impl Into<String>,
    ) -> Self {
        BattleError::ParseMismatch {
            expected: expected.into(),
            event: format!("{:?}", event),
            context: context.into(),
        }
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        BattleError::UnsupportedFormat(what.into())
    }
}

/// An inference variable ran out of candidates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ContradictionError {
    /// Label of the offending variable, e.g. "p2: Snorlax item"
    pub variable: String,
    /// The operation that would have emptied the domain
    pub operation: String,
    /// Domain just before the failing operation
    pub domain: Vec<String>,
    /// Every narrowing applied to the variable so far, oldest first
    pub history: Vec<String>,
}

impl fmt::Display for ContradictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Contradiction in {}: {} on [{}]",
            self.variable,
            self.operation,
            self.domain.join(", ")
        )?;
        if !self.history.is_empty() {
            write!(f, " after {}", self.history.join(" -> "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contradiction_display_includes_history() {
        let err = ContradictionError {
            variable: "p2: Snorlax item".into(),
            operation: "narrow to []".into(),
            domain: vec!["leftovers".into()],
            history: vec!["remove [choiceband]".into()],
        };
        let text = err.to_string();
        assert!(text.contains("p2: Snorlax item"));
        assert!(text.contains("leftovers"));
        assert!(text.contains("remove [choiceband]"));
    }

    #[test]
    fn test_mismatch_formats_event() {
        let err = BattleError::mismatch("-damage", "Turn(3)", "move Tackle");
        assert!(err.to_string().contains("expected -damage"));
    }
}
