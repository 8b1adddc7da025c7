use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;

/// Number of clauses each literal occurs in. A literal repeated inside one
/// clause counts once for that clause.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccurrenceIndex {
    counts: Vec<usize>,
}

impl OccurrenceIndex {
    #[must_use]
    pub fn new(cnf: &Cnf) -> Self {
        let size = 2 * (cnf.num_vars.max(cnf.max_clause_variable()) + 1);
        let mut counts = vec![0; size];
        // Index of the last clause that counted each literal.
        let mut last_seen = vec![usize::MAX; size];
        for (ci, clause) in cnf.iter().enumerate() {
            for &lit in clause.iter() {
                let i = lit.index();
                if last_seen[i] != ci {
                    last_seen[i] = ci;
                    counts[i] += 1;
                }
            }
        }
        Self { counts }
    }

    /// Occurrence count of `lit`; `0` for literals absent from the formula.
    #[must_use]
    pub fn count(&self, lit: Literal) -> usize {
        self.counts.get(lit.index()).copied().unwrap_or(0)
    }
}
