#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! In-memory CNF formulas and the cosmetic variable-name map that travels
//! with them in DIMACS comments.

use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Variable};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::fmt::{self, Display};
use std::ops::Index;

/// A formula in conjunctive normal form together with its header metadata.
///
/// `num_vars` and `num_clauses` are the values declared by the `p cnf` line
/// (or derived from the clauses when the formula is built in code). The
/// clause vector is authoritative for the clause count when writing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
    pub num_vars: usize,
    pub num_clauses: usize,
}

impl Cnf {
    /// Creates a formula with an explicit variable count. The declared
    /// variable count is raised if a clause mentions a larger variable.
    #[must_use]
    pub fn new(num_vars: usize, clauses: Vec<Clause>) -> Self {
        let seen = max_variable(&clauses);
        Self {
            num_clauses: clauses.len(),
            num_vars: num_vars.max(seen),
            clauses,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.num_vars = self.num_vars.max(max_variable(std::slice::from_ref(&clause)));
        self.clauses.push(clause);
        self.num_clauses = self.clauses.len();
    }

    /// Total number of literal occurrences.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    /// Largest variable mentioned by a clause, ignoring the header.
    #[must_use]
    pub fn max_clause_variable(&self) -> usize {
        max_variable(&self.clauses)
    }

    /// Checks that every clause has a literal made true by `model`.
    #[must_use]
    pub fn verify(&self, model: &Model) -> bool {
        self.clauses
            .iter()
            .all(|c| c.iter().any(|&l| model.contains(l)))
    }
}

fn max_variable(clauses: &[Clause]) -> usize {
    clauses
        .iter()
        .flat_map(Clause::iter)
        .map(|l| l.variable() as usize)
        .max()
        .unwrap_or(0)
}

impl Index<usize> for Cnf {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl From<Vec<Vec<i32>>> for Cnf {
    fn from(clauses: Vec<Vec<i32>>) -> Self {
        let clauses = clauses.iter().map(|c| Clause::from_i32s(c)).collect();
        Self::new(0, clauses)
    }
}

/// DIMACS rendering without variable names.
impl Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}

/// Bidirectional association between variable ids and symbolic names, read
/// from `c <id> <name>` comment lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableMap {
    names: FxHashMap<Variable, String>,
    ids: FxHashMap<String, Variable>,
}

impl VariableMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a name. A later entry for the same id replaces the earlier one.
    pub fn insert(&mut self, var: Variable, name: impl Into<String>) {
        let name = name.into();
        if let Some(old) = self.names.insert(var, name.clone()) {
            self.ids.remove(&old);
        }
        self.ids.insert(name, var);
    }

    #[must_use]
    pub fn name(&self, var: Variable) -> Option<&str> {
        self.names.get(&var).map(String::as_str)
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.ids.get(name).copied()
    }

    /// Name of the literal's variable, or its id when unnamed.
    #[must_use]
    pub fn display_name(&self, literal: Literal) -> String {
        self.name(literal.variable())
            .map_or_else(|| literal.variable().to_string(), str::to_string)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, &str)> {
        self.names
            .iter()
            .map(|(&v, n)| (v, n.as_str()))
            .sorted_unstable_by_key(|&(v, _)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vecs_derives_num_vars() {
        let cnf = Cnf::from(vec![vec![1, -4], vec![2]]);
        assert_eq!(cnf.num_vars, 4);
        assert_eq!(cnf.num_clauses, 2);
        assert_eq!(cnf.num_literals(), 3);
    }

    #[test]
    fn test_header_is_never_below_clause_variables() {
        let cnf = Cnf::new(2, vec![Clause::from_i32s(&[5])]);
        assert_eq!(cnf.num_vars, 5);
        let cnf = Cnf::new(9, vec![Clause::from_i32s(&[5])]);
        assert_eq!(cnf.num_vars, 9);
    }

    #[test]
    fn test_verify() {
        let cnf = Cnf::from(vec![vec![1, 2], vec![-1]]);
        let good = Model::from_literals(2, [-1, 2].into_iter().filter_map(Literal::from_i32));
        let bad = Model::from_literals(2, [1, 2].into_iter().filter_map(Literal::from_i32));
        assert!(cnf.verify(&good));
        assert!(!cnf.verify(&bad));
    }

    #[test]
    fn test_display() {
        let cnf = Cnf::from(vec![vec![1, -2], vec![3]]);
        assert_eq!(cnf.to_string(), "p cnf 3 2\n1 -2 0\n3 0\n");
    }

    #[test]
    fn test_variable_map_is_bidirectional() {
        let mut map = VariableMap::new();
        map.insert(2, "USB");
        map.insert(1, "NET");
        assert_eq!(map.name(2), Some("USB"));
        assert_eq!(map.variable("NET"), Some(1));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(1, "NET"), (2, "USB")]);

        map.insert(2, "USB_SUPPORT");
        assert_eq!(map.variable("USB"), None);
        assert_eq!(map.variable("USB_SUPPORT"), Some(2));
        assert_eq!(map.display_name(Literal::new(3, false)), "3");
    }
}
