#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! First-UIP conflict analysis.

use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::{Reason, Trail};
use rustc_hash::FxHashSet;
use std::ops::Index;

/// The clause learnt from a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conflict {
    /// The asserting literal is first; a literal from the backtrack level is
    /// second when the clause has more than one literal.
    pub learnt: Clause,
    pub backtrack_level: usize,
    /// Literal blocks distance: number of distinct decision levels.
    pub lbd: usize,
    /// Variables met during resolution.
    pub to_bump: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Analyser {
    seen: Vec<bool>,
}

impl Analyser {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            seen: vec![false; num_vars + 1],
        }
    }

    pub fn grow(&mut self, num_vars: usize) {
        if num_vars + 1 > self.seen.len() {
            self.seen.resize(num_vars + 1, false);
        }
    }

    /// Resolves the falsified clause `cref` against the reasons on the trail
    /// until a single literal of the current decision level remains.
    ///
    /// Must be called above level 0, with every literal of `clauses[cref]`
    /// false. Reason clauses hold their implied literal at position 0.
    pub fn analyse<C>(&mut self, clauses: &C, trail: &Trail, cref: usize) -> Conflict
    where
        C: Index<usize, Output = Clause> + ?Sized,
    {
        let dl = trail.decision_level();
        let mut learnt: Vec<Literal> = Vec::with_capacity(8);
        let mut to_bump = Vec::new();
        let mut path_c = 0_usize;
        let mut i = trail.len();
        let mut uip: Option<Literal> = None;
        let mut reason = cref;

        loop {
            let clause = &clauses[reason];
            let skip = usize::from(uip.is_some());

            for &lit in clause.iter().skip(skip) {
                let var = lit.variable();
                let level = trail.level(var);
                if self.seen[var as usize] || level == 0 {
                    continue;
                }
                self.seen[var as usize] = true;
                to_bump.push(var);
                if level >= dl {
                    path_c += 1;
                } else {
                    learnt.push(lit);
                }
            }

            let lit = loop {
                i -= 1;
                let lit = trail[i].lit;
                if self.seen[lit.variable() as usize] {
                    break lit;
                }
            };
            self.seen[lit.variable() as usize] = false;
            path_c -= 1;
            uip = Some(lit);

            if path_c == 0 {
                break;
            }
            match trail.reason(lit.variable()) {
                Reason::Clause(c) => reason = c,
                Reason::Decision | Reason::Unit => break,
            }
        }

        for lit in &learnt {
            self.seen[lit.variable() as usize] = false;
        }

        if let Some(uip) = uip {
            learnt.insert(0, !uip);
        }

        let mut backtrack_level = 0;
        if learnt.len() > 1 {
            let mut max_idx = 1;
            for k in 2..learnt.len() {
                if trail.level(learnt[k].variable()) > trail.level(learnt[max_idx].variable()) {
                    max_idx = k;
                }
            }
            learnt.swap(1, max_idx);
            backtrack_level = trail.level(learnt[1].variable());
        }

        let lbd = learnt
            .iter()
            .map(|l| trail.level(l.variable()))
            .collect::<FxHashSet<_>>()
            .len();

        Conflict {
            learnt: Clause::from(learnt),
            backtrack_level,
            lbd,
            to_bump,
        }
    }
}
