#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! An incremental conflict-driven clause learning solver.
//!
//! Assumptions occupy the first decision levels of every search, one level
//! per assumption. Learnt clauses are consequences of the clause set alone,
//! so they are kept across calls, which is what makes a long series of
//! closely related queries cheap.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::clause_management::{ClauseDatabase, LbdClauseManagement};
use crate::sat::cnf::Cnf;
use crate::sat::conflict_analysis::Analyser;
use crate::sat::literal::Literal;
use crate::sat::phase_saving::SavedPhases;
use crate::sat::restarter::{Luby, Restarter};
use crate::sat::solver::{SolutionStats, SolveResult, Solver};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::{VariableSelection, VsidsHeap};
use crate::sat::watch::WatchedLiterals;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Cdcl<V: VariableSelection = VsidsHeap, R: Restarter = Luby<100>> {
    num_vars: usize,
    db: ClauseDatabase,
    assignment: Assignment,
    trail: Trail,
    watches: WatchedLiterals,
    selector: V,
    phases: SavedPhases,
    restarter: R,
    analyser: Analyser,
    manager: LbdClauseManagement,
    /// Cleared once the clause set is unsatisfiable without assumptions.
    ok: bool,
    stats: SolutionStats,
}

impl<V: VariableSelection, R: Restarter> Cdcl<V, R> {
    /// An empty solver over `num_vars` variables.
    #[must_use]
    pub fn with_vars(num_vars: usize) -> Self {
        Self {
            num_vars,
            db: ClauseDatabase::new(),
            assignment: Assignment::new(num_vars),
            trail: Trail::new(num_vars),
            watches: WatchedLiterals::new(num_vars),
            selector: V::new(num_vars),
            phases: SavedPhases::new(num_vars),
            restarter: R::new(),
            analyser: Analyser::new(num_vars),
            manager: LbdClauseManagement::default(),
            ok: true,
            stats: SolutionStats::default(),
        }
    }

    #[must_use]
    pub const fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// `false` once the clause set alone is known to be unsatisfiable.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.ok
    }

    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.db.len()
    }

    fn grow(&mut self, num_vars: usize) {
        if num_vars <= self.num_vars {
            return;
        }
        self.num_vars = num_vars;
        self.assignment.grow(num_vars);
        self.trail.grow(num_vars);
        self.watches.grow(num_vars);
        self.selector.grow(num_vars);
        self.phases.grow(num_vars);
        self.analyser.grow(num_vars);
    }

    fn enqueue(&mut self, lit: Literal, reason: Reason) {
        debug_assert!(!self.assignment.is_assigned(lit.variable()));
        self.assignment.assign(lit);
        self.trail.push(lit, reason);
    }

    fn backtrack_to(&mut self, level: usize) {
        self.trail.backstep_to(level, |lit| {
            self.assignment.unassign(lit.variable());
            self.phases.save(lit);
            self.selector.reinsert(lit.variable());
        });
    }

    /// Propagates every pending trail literal. Returns the index of a clause
    /// falsified by the assignment, if any.
    fn propagate(&mut self) -> Option<usize> {
        while self.trail.has_pending() {
            let p = self.trail[self.trail.curr_idx].lit;
            self.trail.curr_idx += 1;
            self.stats.propagations += 1;

            let false_lit = !p;
            let mut watchers = self.watches.take(false_lit);
            let mut conflict = None;
            let mut i = 0;
            let mut j = 0;

            'watchers: while i < watchers.len() {
                let cref = watchers[i];
                i += 1;

                let clause = &mut self.db[cref];
                if clause[0] == false_lit {
                    clause.swap(0, 1);
                }
                let first = clause[0];

                if self.assignment.literal_value(first) == Some(true) {
                    watchers[j] = cref;
                    j += 1;
                    continue;
                }

                for k in 2..clause.len() {
                    if self.assignment.literal_value(clause[k]) != Some(false) {
                        clause.swap(1, k);
                        self.watches[clause[1]].push(cref);
                        continue 'watchers;
                    }
                }

                watchers[j] = cref;
                j += 1;

                if self.assignment.literal_value(first) == Some(false) {
                    conflict = Some(cref);
                    while i < watchers.len() {
                        watchers[j] = watchers[i];
                        j += 1;
                        i += 1;
                    }
                } else {
                    self.enqueue(first, Reason::Clause(cref));
                }
            }

            watchers.truncate(j);
            self.watches[false_lit] = watchers;

            if conflict.is_some() {
                return conflict;
            }
        }
        None
    }

    fn reduce_db(&mut self) {
        debug_assert_eq!(self.trail.decision_level(), 0);
        let removed = self.manager.clean_clause_db(&mut self.db);
        if removed == 0 {
            return;
        }
        self.trail.forget_root_reasons();
        self.watches.rebuild(self.db.iter());
        self.stats.removed_clauses += removed;
        trace!(removed, kept = self.db.num_learnt(), "reduced learnt clauses");
    }

    fn learn(&mut self, cref: usize) {
        let conflict = self.analyser.analyse(&self.db, &self.trail, cref);
        self.selector.bumps(conflict.to_bump.iter().copied());
        self.selector.decay();
        self.manager.on_conflict();

        self.backtrack_to(conflict.backtrack_level);
        let asserting = conflict.learnt[0];
        if conflict.learnt.is_unit() {
            self.enqueue(asserting, Reason::Unit);
        } else {
            let idx = self.db.push_learnt(conflict.learnt, conflict.lbd);
            self.watches.watch(&self.db[idx], idx);
            self.enqueue(asserting, Reason::Clause(idx));
        }
        self.stats.learnt_clauses += 1;
    }

    fn search(&mut self, assumptions: &[Literal]) -> SolveResult {
        loop {
            if let Some(cref) = self.propagate() {
                self.stats.conflicts += 1;
                if self.trail.decision_level() == 0 {
                    self.ok = false;
                    return SolveResult::Unsat;
                }
                self.learn(cref);

                if self.restarter.should_restart() {
                    self.backtrack_to(0);
                    self.stats.restarts += 1;
                    if self.manager.should_clean_db() {
                        self.reduce_db();
                    }
                }
                continue;
            }

            let level = self.trail.decision_level();
            let next = if let Some(&assumption) = assumptions.get(level) {
                match self.assignment.literal_value(assumption) {
                    Some(true) => {
                        self.trail.new_decision_level();
                        continue;
                    }
                    Some(false) => return SolveResult::Unsat,
                    None => assumption,
                }
            } else {
                match self.selector.pick(&self.assignment) {
                    Some(var) => {
                        self.stats.decisions += 1;
                        self.phases.get_next(var)
                    }
                    None => return SolveResult::Sat(self.assignment.to_model()),
                }
            };

            self.trail.new_decision_level();
            self.enqueue(next, Reason::Decision);
        }
    }
}

impl<V: VariableSelection, R: Restarter> Solver for Cdcl<V, R> {
    fn new(cnf: &Cnf) -> Self {
        let mut solver = Self::with_vars(cnf.num_vars);
        for clause in cnf.iter() {
            if !solver.add_clause(&clause.literals) {
                break;
            }
        }
        solver
    }

    fn add_clause(&mut self, literals: &[Literal]) -> bool {
        if !self.ok {
            return false;
        }
        self.backtrack_to(0);

        let max_var = literals.iter().map(|l| l.variable() as usize).max().unwrap_or(0);
        self.grow(max_var);

        let mut lits = literals.to_vec();
        lits.sort_unstable();
        lits.dedup();
        if lits.iter().any(|l| lits.binary_search(&!l).is_ok())
            || lits
                .iter()
                .any(|&l| self.assignment.literal_value(l) == Some(true))
        {
            return true;
        }
        lits.retain(|&l| self.assignment.literal_value(l).is_none());

        match lits.len() {
            0 => self.ok = false,
            1 => {
                self.enqueue(lits[0], Reason::Unit);
                if self.propagate().is_some() {
                    self.ok = false;
                }
            }
            _ => {
                let idx = self.db.push_original(Clause::from(lits));
                self.watches.watch(&self.db[idx], idx);
            }
        }
        self.ok
    }

    fn solve_with_assumptions(&mut self, assumptions: &[Literal]) -> SolveResult {
        self.stats.solves += 1;
        if !self.ok {
            return SolveResult::Unsat;
        }

        let max_var = assumptions
            .iter()
            .map(|l| l.variable() as usize)
            .max()
            .unwrap_or(0);
        self.grow(max_var);

        let result = self.search(assumptions);
        self.backtrack_to(0);
        result
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }
}
