use crate::sat::assignment::Model;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use std::fmt::{self, Display};

/// Outcome of one solver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Sat(Model),
    /// Unsatisfiable under the given assumptions, or outright when there
    /// were none.
    Unsat,
}

impl SolveResult {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    #[must_use]
    pub fn model(self) -> Option<Model> {
        match self {
            Self::Sat(m) => Some(m),
            Self::Unsat => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolutionStats {
    pub solves: usize,
    pub conflicts: usize,
    pub decisions: usize,
    pub propagations: usize,
    pub restarts: usize,
    pub learnt_clauses: usize,
    pub removed_clauses: usize,
}

impl Display for SolutionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Solver calls:     {}", self.solves)?;
        writeln!(f, "  Conflicts:        {}", self.conflicts)?;
        writeln!(f, "  Decisions:        {}", self.decisions)?;
        writeln!(f, "  Propagations:     {}", self.propagations)?;
        writeln!(f, "  Restarts:         {}", self.restarts)?;
        writeln!(f, "  Learnt clauses:   {}", self.learnt_clauses)?;
        write!(f, "  Removed clauses:  {}", self.removed_clauses)
    }
}

/// An incremental SAT solver: clauses may be added between calls, and each
/// call may fix some literals for its duration only.
pub trait Solver {
    fn new(cnf: &Cnf) -> Self;

    /// Adds a clause permanently. Returns `false` once the clause set is
    /// known to be unsatisfiable.
    fn add_clause(&mut self, literals: &[Literal]) -> bool;

    /// Decides the clause set conjoined with the assumption literals. The
    /// assumptions do not persist past the call.
    fn solve_with_assumptions(&mut self, assumptions: &[Literal]) -> SolveResult;

    fn solve(&mut self) -> SolveResult {
        self.solve_with_assumptions(&[])
    }

    fn stats(&self) -> SolutionStats;
}
