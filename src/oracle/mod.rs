//! Satisfiability oracles: anything that can decide a formula under a set of
//! assumption literals and produce a model when the answer is yes.
//!
//! An oracle session is loaded once with the input formula and then queried
//! repeatedly. Clauses added through `Oracle::add_clause` become part of the
//! session's working formula; the caller's formula is never touched.

pub mod budget;
pub mod external;
pub mod incremental;

use crate::error::OracleError;
use crate::sat::assignment::Model;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;

pub use budget::{Budget, Budgeted};
pub use external::{ExternalOracle, ExternalSolverConfig};
pub use incremental::IncrementalOracle;

/// Answer to one satisfiability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable(Model),
    Unsatisfiable,
}

impl Verdict {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Satisfiable(_))
    }
}

pub trait Oracle {
    /// Starts a session on `formula`, discarding any previous one.
    ///
    /// # Errors
    ///
    /// If the oracle cannot accept the formula.
    fn load(&mut self, formula: &Cnf) -> Result<(), OracleError>;

    /// Decides the working formula conjoined with `assumptions`. Assumptions
    /// hold for this query only.
    /// A satisfiable verdict assigns every variable of the loaded formula.
    ///
    /// # Errors
    ///
    /// Any failure to obtain a trustworthy verdict. Failures are never
    /// reported as a verdict.
    fn check(&mut self, assumptions: &[Literal]) -> Result<Verdict, OracleError>;

    /// Adds a clause to the working formula for all later queries.
    ///
    /// # Errors
    ///
    /// `OracleError::NotLoaded` without a session, or an implementation
    /// specific failure.
    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), OracleError>;
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn load(&mut self, formula: &Cnf) -> Result<(), OracleError> {
        (**self).load(formula)
    }

    fn check(&mut self, assumptions: &[Literal]) -> Result<Verdict, OracleError> {
        (**self).check(assumptions)
    }

    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), OracleError> {
        (**self).add_clause(clause)
    }
}
