use deduce_protocol::{Choice, ChoiceErrorKind};
use thiserror::Error;

/// The server refused a choice we sent.
///
/// Recovered from inside [`BattleHandler`](crate::BattleHandler); it only
/// surfaces as the source of a fatal error once every candidate is used up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{choice} rejected ({kind:?}): {message}")]
pub struct RejectedChoiceError {
    pub kind: ChoiceErrorKind,
    pub choice: Choice,
    pub message: String,
}

impl RejectedChoiceError {
    /// Rejected because of state we did not know about yet
    pub fn is_unavailable(&self) -> bool {
        self.kind == ChoiceErrorKind::Unavailable
    }
}
