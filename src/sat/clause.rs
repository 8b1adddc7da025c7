#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
use crate::sat::literal::Literal;
use core::ops::{Index, IndexMut};
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{self, Display};

/// Inline capacity of a clause before it spills to the heap. Most clauses of
/// feature-model formulas are binary or ternary.
pub type LiteralStorage = SmallVec<[Literal; 8]>;

/// A disjunction of literals. Literal order is preserved as read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    pub literals: LiteralStorage,
}

impl Clause {
    #[must_use]
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    /// Builds a clause from DIMACS integers, skipping any `0`.
    #[must_use]
    pub fn from_i32s(literals: &[i32]) -> Self {
        Self::new(literals.iter().filter_map(|&l| Literal::from_i32(l)))
    }

    #[must_use]
    pub fn unit(literal: Literal) -> Self {
        Self::new([literal])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.contains(&literal)
    }

    /// `true` if the clause contains some literal together with its negation.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .any(|&l| self.literals.contains(&l.negated()))
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.literals.swap(i, j);
    }

    pub fn push(&mut self, literal: Literal) {
        self.literals.push(literal);
    }

    pub fn to_i32s(&self) -> Vec<i32> {
        self.literals.iter().map(|l| l.to_i32()).collect()
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl IndexMut<usize> for Clause {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self {
            literals: LiteralStorage::from_vec(literals),
        }
    }
}

impl AsRef<[Literal]> for Clause {
    fn as_ref(&self) -> &[Literal] {
        &self.literals
    }
}

/// DIMACS clause line, including the trailing `0`.
impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        write!(f, "{} 0", self.literals.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i32s() {
        let clause = Clause::from_i32s(&[1, -2, 3]);
        assert_eq!(clause.len(), 3);
        assert_eq!(clause[1], Literal::from_i32(-2).unwrap());
        assert_eq!(clause.to_i32s(), vec![1, -2, 3]);
    }

    #[test]
    fn test_tautology() {
        assert!(Clause::from_i32s(&[1, 2, -1]).is_tautology());
        assert!(!Clause::from_i32s(&[1, 2, -3]).is_tautology());
    }

    #[test]
    fn test_swap() {
        let mut clause = Clause::from_i32s(&[1, 2, 3]);
        clause.swap(0, 2);
        assert_eq!(clause.to_i32s(), vec![3, 2, 1]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Clause::from_i32s(&[4, -5]).to_string(), "4 -5 0");
        assert_eq!(Clause::default().to_string(), "0");
    }
}
