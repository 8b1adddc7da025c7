use crate::error::OracleError;
use crate::oracle::{Oracle, Verdict};
use crate::sat::cdcl::Cdcl;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::solver::{SolutionStats, SolveResult, Solver};
use tracing::debug;

/// In-process oracle backed by one incremental CDCL session. Learnt clauses
/// and branching heuristics carry over from query to query.
#[derive(Debug, Clone, Default)]
pub struct IncrementalOracle {
    solver: Option<Cdcl>,
}

impl IncrementalOracle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Search statistics of the current session.
    #[must_use]
    pub fn stats(&self) -> Option<SolutionStats> {
        self.solver.as_ref().map(Solver::stats)
    }
}

impl Oracle for IncrementalOracle {
    fn load(&mut self, formula: &Cnf) -> Result<(), OracleError> {
        let solver = Cdcl::new(formula);
        debug!(
            variables = solver.num_vars(),
            clauses = solver.num_clauses(),
            "loaded formula into incremental solver"
        );
        self.solver = Some(solver);
        Ok(())
    }

    fn check(&mut self, assumptions: &[Literal]) -> Result<Verdict, OracleError> {
        let solver = self.solver.as_mut().ok_or(OracleError::NotLoaded)?;
        Ok(match solver.solve_with_assumptions(assumptions) {
            SolveResult::Sat(model) => Verdict::Satisfiable(model),
            SolveResult::Unsat => Verdict::Unsatisfiable,
        })
    }

    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), OracleError> {
        let solver = self.solver.as_mut().ok_or(OracleError::NotLoaded)?;
        // An unsatisfiable clause set is remembered by the solver and shows
        // up as UNSAT on the next query.
        solver.add_clause(clause);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i32) -> Literal {
        Literal::from_i32(v).unwrap()
    }

    #[test]
    fn test_requires_load() {
        let mut oracle = IncrementalOracle::new();
        assert!(matches!(oracle.check(&[]), Err(OracleError::NotLoaded)));
        assert!(matches!(
            oracle.add_clause(&[lit(1)]),
            Err(OracleError::NotLoaded)
        ));
        assert!(oracle.stats().is_none());
    }

    #[test]
    fn test_session() {
        let cnf = Cnf::from(vec![vec![1, 2], vec![-1, 2]]);
        let mut oracle = IncrementalOracle::new();
        oracle.load(&cnf).unwrap();

        assert_eq!(oracle.check(&[lit(-2)]).unwrap(), Verdict::Unsatisfiable);
        let Verdict::Satisfiable(model) = oracle.check(&[lit(1)]).unwrap() else {
            panic!("expected a model");
        };
        assert!(model.contains(lit(2)));

        oracle.add_clause(&[lit(-1)]).unwrap();
        assert_eq!(oracle.check(&[lit(1)]).unwrap(), Verdict::Unsatisfiable);
        assert!(oracle.stats().unwrap().solves >= 3);

        // Reloading starts from the caller's formula again.
        oracle.load(&cnf).unwrap();
        assert!(oracle.check(&[lit(1)]).unwrap().is_sat());
    }
}
