use crate::backbone::Backbone;
use crate::error::IntegrityError;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use tracing::debug;

/// Rewrites `formula` under its backbone.
///
/// The result starts with one unit clause per backbone literal, in discovery
/// order. Clauses containing a backbone literal are dropped, and literals
/// whose negation is in the backbone are removed from the rest. The declared
/// variable count is kept so variable ids stay stable.
///
/// # Errors
///
/// `IntegrityError::EmptyClause` if removing falsified literals empties a
/// clause, which means `backbone` is not a backbone of `formula`.
pub fn simplify(formula: &Cnf, backbone: &Backbone) -> Result<Cnf, IntegrityError> {
    let mut clauses: Vec<Clause> = Vec::with_capacity(backbone.len() + formula.len());
    clauses.extend(backbone.iter().map(|&lit| Clause::unit(lit)));

    let mut satisfied = 0;
    let mut shortened = 0;
    for (index, clause) in formula.iter().enumerate() {
        if clause.iter().any(|&lit| backbone.contains(lit)) {
            satisfied += 1;
            continue;
        }

        let reduced: Clause = clause
            .iter()
            .copied()
            .filter(|&lit| !backbone.falsifies(lit))
            .collect();
        if reduced.is_empty() {
            return Err(IntegrityError::EmptyClause { index });
        }
        if reduced.len() < clause.len() {
            shortened += 1;
        }
        clauses.push(reduced);
    }

    debug!(
        units = backbone.len(),
        satisfied,
        shortened,
        clauses = clauses.len(),
        "simplified formula"
    );

    Ok(Cnf {
        num_clauses: clauses.len(),
        num_vars: formula.num_vars,
        clauses,
    })
}
