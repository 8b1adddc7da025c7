#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The assignment trail: every assigned literal in assignment order, split
//! into decision levels.

use crate::sat::literal::{Literal, Variable};
use std::ops::Index;

/// Why a literal is on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// Chosen by the search, or an assumption.
    #[default]
    Decision,
    /// A root-level fact that no longer refers to a clause.
    Unit,
    /// Implied by the clause at this index; the implied literal is the
    /// clause's first literal.
    Clause(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub lit: Literal,
    pub decision_level: usize,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    t: Vec<Step>,
    /// Index of the next step whose consequences have not been propagated.
    pub curr_idx: usize,
    level_starts: Vec<usize>,
    var_level: Vec<usize>,
    var_reason: Vec<Reason>,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

impl Trail {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            t: Vec::with_capacity(num_vars),
            curr_idx: 0,
            level_starts: Vec::new(),
            var_level: vec![0; num_vars + 1],
            var_reason: vec![Reason::Decision; num_vars + 1],
        }
    }

    pub fn grow(&mut self, num_vars: usize) {
        if num_vars + 1 > self.var_level.len() {
            self.var_level.resize(num_vars + 1, 0);
            self.var_reason.resize(num_vars + 1, Reason::Decision);
        }
    }

    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.level_starts.len()
    }

    /// Opens a new decision level. Levels may be left empty when an
    /// assumption already holds.
    pub fn new_decision_level(&mut self) {
        self.level_starts.push(self.t.len());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.curr_idx < self.t.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.t.iter()
    }

    /// Level at which `var` was assigned. Only meaningful while assigned.
    #[must_use]
    pub fn level(&self, var: Variable) -> usize {
        self.var_level[var as usize]
    }

    #[must_use]
    pub fn reason(&self, var: Variable) -> Reason {
        self.var_reason[var as usize]
    }

    /// Appends `lit` at the current decision level.
    pub fn push(&mut self, lit: Literal, reason: Reason) {
        let decision_level = self.decision_level();
        let var = lit.variable() as usize;
        self.var_level[var] = decision_level;
        self.var_reason[var] = reason;
        self.t.push(Step {
            lit,
            decision_level,
            reason,
        });
    }

    /// Removes every step above `level`, newest first, handing each removed
    /// literal to `on_unassign`.
    pub fn backstep_to(&mut self, level: usize, mut on_unassign: impl FnMut(Literal)) {
        if level >= self.decision_level() {
            return;
        }

        let start = self.level_starts[level];
        for step in self.t.drain(start..).rev() {
            on_unassign(step.lit);
        }
        self.level_starts.truncate(level);
        self.curr_idx = self.curr_idx.min(start);
    }

    /// Turns the reasons of root-level facts into `Reason::Unit`, so the
    /// clause database can be compacted underneath them.
    pub fn forget_root_reasons(&mut self) {
        debug_assert_eq!(self.decision_level(), 0);
        for step in &mut self.t {
            step.reason = Reason::Unit;
            self.var_reason[step.lit.variable() as usize] = Reason::Unit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i32) -> Literal {
        Literal::from_i32(v).unwrap()
    }

    #[test]
    fn test_levels_and_backstep() {
        let mut trail = Trail::new(4);
        trail.push(lit(1), Reason::Unit);
        trail.new_decision_level();
        trail.push(lit(-2), Reason::Decision);
        trail.push(lit(3), Reason::Clause(0));
        trail.new_decision_level();
        trail.new_decision_level();
        trail.push(lit(4), Reason::Decision);

        assert_eq!(trail.decision_level(), 3);
        assert_eq!(trail.level(3), 1);
        assert_eq!(trail.reason(3), Reason::Clause(0));
        assert_eq!(trail.level(4), 3);

        let mut removed = Vec::new();
        trail.backstep_to(1, |l| removed.push(l));
        assert_eq!(removed, vec![lit(4)]);
        assert_eq!(trail.decision_level(), 1);

        removed.clear();
        trail.backstep_to(0, |l| removed.push(l));
        assert_eq!(removed, vec![lit(3), lit(-2)]);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.decision_level(), 0);
    }

    #[test]
    fn test_backstep_resets_propagation_head() {
        let mut trail = Trail::new(2);
        trail.new_decision_level();
        trail.push(lit(1), Reason::Decision);
        trail.push(lit(2), Reason::Clause(3));
        trail.curr_idx = 2;
        trail.backstep_to(0, |_| {});
        assert_eq!(trail.curr_idx, 0);
        assert!(!trail.has_pending());
    }
}
