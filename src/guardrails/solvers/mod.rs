//! Deterministic solvers for recognised puzzle shapes.
//!
//! Each solver is a pure function from the raw message to an optional
//! [`Solution`]. Solvers own their patterns; adding a new shape means adding
//! a module and one line in [`SOLVERS`].

mod completed_task;
mod family_photo;
mod mass;
mod meeting;
mod numbers;
mod referent;

use super::types::SpecialCaseKind;

/// Answer plus Goal / Constraint / Decision rationale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub answer: String,
    pub rationale: Vec<String>,
}

impl Solution {
    pub(crate) fn new(
        answer: impl Into<String>,
        goal: impl AsRef<str>,
        constraint: impl AsRef<str>,
        decision: impl AsRef<str>,
    ) -> Self {
        Self {
            answer: answer.into(),
            rationale: vec![
                format!("Goal: {}", goal.as_ref()),
                format!("Constraint: {}", constraint.as_ref()),
                format!("Decision: {}", decision.as_ref()),
            ],
        }
    }
}

type Solver = fn(&str) -> Option<Solution>;

const SOLVERS: &[(SpecialCaseKind, Solver)] = &[
    (SpecialCaseKind::CompletedTask, completed_task::solve),
    (SpecialCaseKind::MassComparison, mass::solve),
    (SpecialCaseKind::MeetingOverlap, meeting::solve),
    (SpecialCaseKind::FamilyPhoto, family_photo::solve),
    (SpecialCaseKind::AmbiguousReferent, referent::solve),
];

/// First solver that recognises `text`, in fixed order.
pub fn solve(text: &str) -> Option<(SpecialCaseKind, Solution)> {
    SOLVERS
        .iter()
        .find_map(|(kind, solver)| solver(text).map(|solution| (*kind, solution)))
}
