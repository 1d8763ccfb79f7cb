//! Finite-domain inference variables

use std::collections::BTreeSet;
use std::fmt::Debug;

use serde::Serialize;

use crate::error::ContradictionError;

/// Handle for a callback registered with [`PossibilityClass::on_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WatchId(u32);

/// Outcome of registering a watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Watch {
    /// The predicate was already decided: `true` if the eventual value satisfies it
    Resolved(bool),
    /// Still undecided; the id is reported by a later narrowing
    Pending(WatchId),
}

/// A watch that became decided during a narrowing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub watch: WatchId,
    pub held: bool,
}

/// A set of candidate values for one hidden fact.
///
/// The domain only ever shrinks. An operation that would leave it empty is
/// refused with a [`ContradictionError`] and leaves the class untouched.
#[derive(Debug, Clone, Serialize)]
pub struct PossibilityClass<V: Ord> {
    label: String,
    domain: BTreeSet<V>,
    #[serde(skip)]
    history: Vec<String>,
    #[serde(skip)]
    watches: Vec<(WatchId, BTreeSet<V>)>,
    #[serde(skip)]
    next_watch: u32,
}

impl<V: Ord + Clone + Debug> PossibilityClass<V> {
    pub fn new(
        label: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, ContradictionError> {
        let label = label.into();
        let domain: BTreeSet<V> = values.into_iter().collect();
        if domain.is_empty() {
            return Err(ContradictionError {
                variable: label,
                operation: "create".to_string(),
                domain: Vec::new(),
                history: Vec::new(),
            });
        }

        Ok(Self {
            label,
            domain,
            history: Vec::new(),
            watches: Vec::new(),
            next_watch: 0,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn domain(&self) -> &BTreeSet<V> {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// The value, once only one candidate remains
    pub fn definite(&self) -> Option<&V> {
        if self.domain.len() == 1 {
            self.domain.first()
        } else {
            None
        }
    }

    pub fn contains(&self, value: &V) -> bool {
        self.domain.contains(value)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Keep only candidates satisfying `pred`.
    pub fn narrow(
        &mut self,
        pred: impl Fn(&V) -> bool,
    ) -> Result<Vec<Resolution>, ContradictionError> {
        let kept: BTreeSet<V> = self.domain.iter().filter(|v| pred(v)).cloned().collect();
        let operation = format!("narrow to {:?}", kept);
        self.replace(kept, operation)
    }

    /// Drop candidates satisfying `pred`.
    pub fn remove(
        &mut self,
        pred: impl Fn(&V) -> bool,
    ) -> Result<Vec<Resolution>, ContradictionError> {
        let removed: Vec<&V> = self.domain.iter().filter(|v| pred(v)).collect();
        let operation = format!("remove {:?}", removed);
        let kept: BTreeSet<V> = self.domain.iter().filter(|v| !pred(v)).cloned().collect();
        self.replace(kept, operation)
    }

    /// Watch whether the eventual value satisfies `pred`.
    ///
    /// The predicate is evaluated once against the current domain; since the
    /// domain only shrinks, the answer is decided as soon as all remaining
    /// candidates agree.
    pub fn on_update(&mut self, pred: impl Fn(&V) -> bool) -> Watch {
        let matching: BTreeSet<V> = self.domain.iter().filter(|v| pred(v)).cloned().collect();
        if let Some(held) = decide(&self.domain, &matching) {
            return Watch::Resolved(held);
        }

        let id = WatchId(self.next_watch);
        self.next_watch += 1;
        self.watches.push((id, matching));
        Watch::Pending(id)
    }

    fn replace(
        &mut self,
        kept: BTreeSet<V>,
        operation: String,
    ) -> Result<Vec<Resolution>, ContradictionError> {
        if kept.is_empty() {
            return Err(ContradictionError {
                variable: self.label.clone(),
                operation,
                domain: self.domain.iter().map(|v| format!("{:?}", v)).collect(),
                history: self.history.clone(),
            });
        }
        if kept.len() == self.domain.len() {
            return Ok(Vec::new());
        }

        self.domain = kept;
        self.history.push(operation);

        let mut fired = Vec::new();
        let domain = &self.domain;
        self.watches.retain(|(watch, matching)| match decide(domain, matching) {
            Some(held) => {
                fired.push(Resolution {
                    watch: *watch,
                    held,
                });
                false
            }
            None => true,
        });
        Ok(fired)
    }
}

/// `Some(true)` if every candidate matches, `Some(false)` if none do
fn decide<V: Ord>(domain: &BTreeSet<V>, matching: &BTreeSet<V>) -> Option<bool> {
    if domain.is_subset(matching) {
        Some(true)
    } else if domain.is_disjoint(matching) {
        Some(false)
    } else {
        None
    }
}
