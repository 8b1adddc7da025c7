use crate::error::OracleError;
use crate::oracle::{Oracle, Verdict};
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use std::time::{Duration, Instant};

/// Limits on the oracle work spent for one computation. `None` means
/// unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Budget {
    pub max_queries: Option<usize>,
    /// Wall-clock limit, measured from `Oracle::load` and checked before
    /// each query. A query in flight is not interrupted.
    pub time_limit: Option<Duration>,
}

impl Budget {
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_queries: None,
            time_limit: None,
        }
    }

    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.max_queries.is_none() && self.time_limit.is_none()
    }
}

/// Wraps an oracle and refuses queries once its `Budget` is spent.
#[derive(Debug, Clone)]
pub struct Budgeted<O> {
    inner: O,
    budget: Budget,
    queries: usize,
    started: Option<Instant>,
}

impl<O: Oracle> Budgeted<O> {
    pub const fn new(inner: O, budget: Budget) -> Self {
        Self {
            inner,
            budget,
            queries: 0,
            started: None,
        }
    }

    /// Queries answered so far.
    #[must_use]
    pub const fn queries(&self) -> usize {
        self.queries
    }

    pub const fn inner(&self) -> &O {
        &self.inner
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Oracle> Oracle for Budgeted<O> {
    fn load(&mut self, formula: &Cnf) -> Result<(), OracleError> {
        self.started = Some(Instant::now());
        self.queries = 0;
        self.inner.load(formula)
    }

    fn check(&mut self, assumptions: &[Literal]) -> Result<Verdict, OracleError> {
        if let Some(max) = self.budget.max_queries {
            if self.queries >= max {
                return Err(OracleError::BudgetExhausted(max));
            }
        }
        if let (Some(limit), Some(started)) = (self.budget.time_limit, self.started) {
            if started.elapsed() >= limit {
                return Err(OracleError::Timeout(limit));
            }
        }
        self.queries += 1;
        self.inner.check(assumptions)
    }

    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), OracleError> {
        self.inner.add_clause(clause)
    }
}
