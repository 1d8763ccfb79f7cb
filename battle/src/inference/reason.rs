//! Deferred preconditions over possibility classes

use std::collections::BTreeSet;

use serde::Serialize;

use super::arena::ClassId;

/// "The value of `class` is one of `values`".
///
/// Rule wrappers return sets of these from their `can_*` checks: the effect
/// fires if and only if every reason in the set holds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SubReason {
    class: ClassId,
    values: BTreeSet<String>,
}

impl SubReason {
    pub fn is<I, S>(class: ClassId, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }
}

/// A conjunction of preconditions
pub type Reasons = BTreeSet<SubReason>;

/// Conjunction of several legality checks; `None` if any part is impossible
pub fn all_of(parts: impl IntoIterator<Item = Option<Reasons>>) -> Option<Reasons> {
    let mut reasons = Reasons::new();
    for part in parts {
        reasons.extend(part?);
    }
    Some(reasons)
}

/// `Some(empty)` when `condition` holds, `None` otherwise
pub fn given(condition: bool) -> Option<Reasons> {
    condition.then(Reasons::new)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonState {
    Undecided,
    Held,
    Rejected,
}

/// Work scheduled for when a sub-reason resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Force this reason to hold
    Assert(SubReason),
    /// Force this reason to fail
    Reject(SubReason),
    /// At least one of these must fail: the effect they imply did not happen
    RejectOne(Vec<SubReason>),
}
