//! Arena owning every possibility class of one battle

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;
use tracing::debug;

use super::possibility::{PossibilityClass, Resolution, Watch, WatchId};
use super::reason::{Deferred, ReasonState, Reasons, SubReason};
use crate::error::{ContradictionError, Result};

/// Handle to a class stored in an [`Inference`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClassId(usize);

#[derive(Debug, Clone)]
struct Trigger {
    on_held: Option<Deferred>,
    on_rejected: Option<Deferred>,
}

/// Owner of all hidden-information variables of a battle.
///
/// Pokemon refer to their ability, item and hidden power type by [`ClassId`];
/// item swaps and ability copies exchange handles rather than values.
/// Deferred conclusions are stored as [`Deferred`] data and replayed when the
/// watched class narrows far enough.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inference {
    classes: Vec<PossibilityClass<String>>,
    #[serde(skip)]
    triggers: BTreeMap<(ClassId, WatchId), Trigger>,
}

impl Inference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class<I, S>(&mut self, label: impl Into<String>, values: I) -> Result<ClassId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let class = PossibilityClass::new(label, values.into_iter().map(Into::into))?;
        self.classes.push(class);
        Ok(ClassId(self.classes.len() - 1))
    }

    pub fn class(&self, id: ClassId) -> &PossibilityClass<String> {
        &self.classes[id.0]
    }

    pub fn domain(&self, id: ClassId) -> &BTreeSet<String> {
        self.class(id).domain()
    }

    pub fn definite(&self, id: ClassId) -> Option<&str> {
        self.class(id).definite().map(String::as_str)
    }

    pub fn is_possible(&self, id: ClassId, value: &str) -> bool {
        self.class(id).domain().contains(value)
    }

    /// Keep only candidates satisfying `pred`.
    pub fn narrow(&mut self, id: ClassId, pred: impl Fn(&str) -> bool) -> Result<()> {
        let fired = self.classes[id.0].narrow(|v| pred(v))?;
        self.log_change(id);
        self.propagate(id, fired)
    }

    /// Drop candidates satisfying `pred`.
    pub fn remove(&mut self, id: ClassId, pred: impl Fn(&str) -> bool) -> Result<()> {
        let fired = self.classes[id.0].remove(|v| pred(v))?;
        self.log_change(id);
        self.propagate(id, fired)
    }

    /// Narrow to exactly one revealed value
    pub fn reveal(&mut self, id: ClassId, value: &str) -> Result<()> {
        self.narrow(id, |v| v == value)
    }

    pub fn narrow_to(&mut self, id: ClassId, values: &BTreeSet<String>) -> Result<()> {
        self.narrow(id, |v| values.contains(v))
    }

    /// A reason that holds iff the class's value is NOT one of `values`
    pub fn lacks<'a>(&self, id: ClassId, values: impl IntoIterator<Item = &'a str>) -> SubReason {
        let excluded: BTreeSet<&str> = values.into_iter().collect();
        SubReason::is(
            id,
            self.domain(id)
                .iter()
                .filter(|v| !excluded.contains(v.as_str()))
                .cloned(),
        )
    }

    /// Precondition "the class's value is one of `values`".
    ///
    /// `None` if no candidate qualifies, an empty set if every candidate does.
    pub fn reason_in<'a>(
        &self,
        id: ClassId,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Option<Reasons> {
        let wanted: BTreeSet<&str> = values.into_iter().collect();
        self.reason_where(id, |v| wanted.contains(v))
    }

    /// Precondition "the class's value is none of `values`"
    pub fn reason_not_in<'a>(
        &self,
        id: ClassId,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Option<Reasons> {
        let excluded: BTreeSet<&str> = values.into_iter().collect();
        self.reason_where(id, |v| !excluded.contains(v))
    }

    pub fn reason_where(&self, id: ClassId, pred: impl Fn(&str) -> bool) -> Option<Reasons> {
        let domain = self.domain(id);
        let kept: BTreeSet<String> = domain.iter().filter(|v| pred(v)).cloned().collect();
        if kept.is_empty() {
            None
        } else if kept.len() == domain.len() {
            Some(Reasons::new())
        } else {
            Some(Reasons::from([SubReason::is(id, kept)]))
        }
    }

    pub fn status(&self, reason: &SubReason) -> ReasonState {
        let domain = self.domain(reason.class());
        if domain.is_subset(reason.values()) {
            ReasonState::Held
        } else if domain.is_disjoint(reason.values()) {
            ReasonState::Rejected
        } else {
            ReasonState::Undecided
        }
    }

    /// Combined state of a conjunction
    pub fn status_all<'a>(&self, reasons: impl IntoIterator<Item = &'a SubReason>) -> ReasonState {
        let mut state = ReasonState::Held;
        for reason in reasons {
            match self.status(reason) {
                ReasonState::Rejected => return ReasonState::Rejected,
                ReasonState::Undecided => state = ReasonState::Undecided,
                ReasonState::Held => {}
            }
        }
        state
    }

    pub fn assert(&mut self, reason: &SubReason) -> Result<()> {
        let values = reason.values().clone();
        self.narrow(reason.class(), |v| values.contains(v))
    }

    pub fn reject(&mut self, reason: &SubReason) -> Result<()> {
        let values = reason.values().clone();
        self.remove(reason.class(), |v| values.contains(v))
    }

    /// Record that an effect implied by `reasons` did not happen.
    ///
    /// At least one reason must fail. When only one is still undecided it is
    /// rejected now; otherwise the conclusion is deferred until the others resolve.
    pub fn reject_one(&mut self, reasons: impl IntoIterator<Item = SubReason>) -> Result<()> {
        let reasons: Vec<SubReason> = reasons.into_iter().collect();
        let mut undecided = Vec::new();
        for reason in &reasons {
            match self.status(reason) {
                ReasonState::Rejected => return Ok(()),
                ReasonState::Held => {}
                ReasonState::Undecided => undecided.push(reason.clone()),
            }
        }

        match undecided.len() {
            0 => Err(self.all_held(&reasons).into()),
            1 => self.reject(&undecided[0]),
            _ => {
                for reason in &undecided {
                    let retry = Deferred::RejectOne(undecided.clone());
                    self.when(reason, Some(retry.clone()), Some(retry))?;
                }
                Ok(())
            }
        }
    }

    /// Schedule `on_held` / `on_rejected` for when `reason` resolves.
    ///
    /// Runs immediately if the reason is already decided.
    pub fn when(
        &mut self,
        reason: &SubReason,
        on_held: Option<Deferred>,
        on_rejected: Option<Deferred>,
    ) -> Result<()> {
        let values = reason.values().clone();
        match self.classes[reason.class().0].on_update(|v| values.contains(v)) {
            Watch::Resolved(true) => self.run(on_held),
            Watch::Resolved(false) => self.run(on_rejected),
            Watch::Pending(watch) => {
                self.triggers.insert(
                    (reason.class(), watch),
                    Trigger {
                        on_held,
                        on_rejected,
                    },
                );
                Ok(())
            }
        }
    }

    fn run(&mut self, deferred: Option<Deferred>) -> Result<()> {
        match deferred {
            None => Ok(()),
            Some(Deferred::Assert(reason)) => self.assert(&reason),
            Some(Deferred::Reject(reason)) => self.reject(&reason),
            Some(Deferred::RejectOne(reasons)) => self.reject_one(reasons),
        }
    }

    fn propagate(&mut self, id: ClassId, fired: Vec<Resolution>) -> Result<()> {
        let mut queue: VecDeque<Deferred> = VecDeque::new();
        for resolution in fired {
            if let Some(trigger) = self.triggers.remove(&(id, resolution.watch)) {
                let next = if resolution.held {
                    trigger.on_held
                } else {
                    trigger.on_rejected
                };
                queue.extend(next);
            }
        }

        while let Some(deferred) = queue.pop_front() {
            self.run(Some(deferred))?;
        }
        Ok(())
    }

    /// Contradiction for a set of reasons that all hold although one must fail
    fn all_held(&self, reasons: &[SubReason]) -> ContradictionError {
        let labels: Vec<String> = reasons.iter().map(|r| self.describe(r)).collect();
        let mut domain = Vec::new();
        let mut history = Vec::new();
        for reason in reasons {
            let class = self.class(reason.class());
            for value in class.domain() {
                domain.push(format!("{}: {}", class.label(), value));
            }
            for step in class.history() {
                history.push(format!("{}: {}", class.label(), step));
            }
        }
        ContradictionError {
            variable: labels.join(" & "),
            operation: "reject one of held reasons".to_string(),
            domain,
            history,
        }
    }

    fn describe(&self, reason: &SubReason) -> String {
        let values: Vec<&str> = reason.values().iter().map(String::as_str).collect();
        format!("{} in [{}]", self.class(reason.class()).label(), values.join(", "))
    }

    fn log_change(&self, id: ClassId) {
        let class = self.class(id);
        debug!(variable = class.label(), domain = ?class.domain(), "narrowed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BattleError;

    fn arena() -> (Inference, ClassId, ClassId) {
        let mut inference = Inference::new();
        let item = inference
            .add_class("p2: Snorlax item", ["leftovers", "choiceband", "lumberry"])
            .unwrap();
        let ability = inference
            .add_class("p2: Snorlax ability", ["immunity", "thickfat"])
            .unwrap();
        (inference, item, ability)
    }

    #[test]
    fn test_status_of_reason() {
        let (mut inference, item, _) = arena();
        let reason = SubReason::is(item, ["leftovers"]);
        assert_eq!(inference.status(&reason), ReasonState::Undecided);

        inference.reveal(item, "leftovers").unwrap();
        assert_eq!(inference.status(&reason), ReasonState::Held);
        assert_eq!(
            inference.status(&SubReason::is(item, ["choiceband"])),
            ReasonState::Rejected
        );
    }

    #[test]
    fn test_lacks_is_complement() {
        let (inference, item, _) = arena();
        let reason = inference.lacks(item, ["choiceband"]);
        assert_eq!(reason.values().len(), 2);
        assert!(!reason.values().contains("choiceband"));
    }

    #[test]
    fn test_reason_in() {
        let (mut inference, item, _) = arena();
        assert!(inference.reason_in(item, ["choicescarf"]).is_none());
        assert_eq!(inference.reason_in(item, ["leftovers"]).unwrap().len(), 1);

        inference.reveal(item, "leftovers").unwrap();
        assert!(inference.reason_in(item, ["leftovers"]).unwrap().is_empty());
        assert!(inference.reason_not_in(item, ["leftovers"]).is_none());
    }

    #[test]
    fn test_reject_one_single_reason_rejects_now() {
        let (mut inference, item, _) = arena();
        inference
            .reject_one([SubReason::is(item, ["leftovers"])])
            .unwrap();
        assert!(!inference.is_possible(item, "leftovers"));
    }

    #[test]
    fn test_reject_one_defers_until_other_reason_holds() {
        let (mut inference, item, ability) = arena();
        let reasons = vec![
            SubReason::is(item, ["lumberry"]),
            SubReason::is(ability, ["thickfat"]),
        ];
        inference.reject_one(reasons).unwrap();
        assert!(inference.is_possible(item, "lumberry"));

        // learning the ability forces the item conclusion
        inference.reveal(ability, "thickfat").unwrap();
        assert!(!inference.is_possible(item, "lumberry"));
    }

    #[test]
    fn test_reject_one_satisfied_by_other_rejection() {
        let (mut inference, item, ability) = arena();
        inference
            .reject_one(vec![
                SubReason::is(item, ["lumberry"]),
                SubReason::is(ability, ["thickfat"]),
            ])
            .unwrap();

        inference.reveal(ability, "immunity").unwrap();
        assert!(inference.is_possible(item, "lumberry"));
    }

    #[test]
    fn test_reject_one_all_held_is_contradiction() {
        let (mut inference, item, _) = arena();
        inference.reveal(item, "leftovers").unwrap();
        let err = inference
            .reject_one([SubReason::is(item, ["leftovers"])])
            .unwrap_err();
        let BattleError::Contradiction(contradiction) = err else {
            panic!("expected contradiction, got {err:?}");
        };
        assert_eq!(contradiction.domain, vec!["p2: Snorlax item: leftovers".to_string()]);
        assert_eq!(contradiction.history.len(), 1);
        assert!(contradiction.history[0].starts_with("p2: Snorlax item: "));
    }

    #[test]
    fn test_when_runs_deferred_assert() {
        let (mut inference, item, ability) = arena();
        inference
            .when(
                &SubReason::is(ability, ["immunity"]),
                Some(Deferred::Assert(SubReason::is(item, ["lumberry"]))),
                None,
            )
            .unwrap();

        inference.reveal(ability, "immunity").unwrap();
        assert_eq!(inference.definite(item), Some("lumberry"));
    }

    #[test]
    fn test_deferred_contradiction_propagates() {
        let (mut inference, item, ability) = arena();
        inference.reveal(item, "leftovers").unwrap();
        inference
            .when(
                &SubReason::is(ability, ["immunity"]),
                Some(Deferred::Assert(SubReason::is(item, ["lumberry"]))),
                None,
            )
            .unwrap();

        assert!(inference.reveal(ability, "immunity").is_err());
    }
}
