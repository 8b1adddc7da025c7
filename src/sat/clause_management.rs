#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The solver's clause database and the policy that keeps its learnt part
//! from growing without bound.
//!
//! Original clauses (including units added between incremental calls) are
//! never removed. Learnt clauses carry their literal blocks distance (LBD);
//! at each reduction the worse half of them by `(lbd, len)` is deleted,
//! except "glue" clauses with an LBD of 2 or less.

use crate::sat::clause::Clause;
use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Original,
    Learnt { lbd: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClauseDatabase {
    clauses: Vec<Clause>,
    origin: Vec<Origin>,
    num_learnt: usize,
}

impl ClauseDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_original(&mut self, clause: Clause) -> usize {
        self.clauses.push(clause);
        self.origin.push(Origin::Original);
        self.clauses.len() - 1
    }

    pub fn push_learnt(&mut self, clause: Clause, lbd: usize) -> usize {
        self.clauses.push(clause);
        self.origin.push(Origin::Learnt { lbd });
        self.num_learnt += 1;
        self.clauses.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub const fn num_learnt(&self) -> usize {
        self.num_learnt
    }

    #[must_use]
    pub fn num_original(&self) -> usize {
        self.clauses.len() - self.num_learnt
    }

    #[must_use]
    pub fn is_learnt(&self, idx: usize) -> bool {
        matches!(self.origin[idx], Origin::Learnt { .. })
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Clause)> {
        self.clauses.iter().enumerate()
    }
}

impl Index<usize> for ClauseDatabase {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl IndexMut<usize> for ClauseDatabase {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.clauses[index]
    }
}

/// Reduces the learnt clauses every `interval` conflicts; the interval grows
/// by `increment` after each reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LbdClauseManagement {
    interval: usize,
    increment: usize,
    conflicts_since_last_cleanup: usize,
    num_removed: usize,
}

impl Default for LbdClauseManagement {
    fn default() -> Self {
        Self::new(2000, 300)
    }
}

impl LbdClauseManagement {
    #[must_use]
    pub const fn new(interval: usize, increment: usize) -> Self {
        Self {
            interval,
            increment,
            conflicts_since_last_cleanup: 0,
            num_removed: 0,
        }
    }

    pub fn on_conflict(&mut self) {
        self.conflicts_since_last_cleanup += 1;
    }

    #[must_use]
    pub const fn should_clean_db(&self) -> bool {
        self.conflicts_since_last_cleanup >= self.interval
    }

    #[must_use]
    pub const fn num_removed(&self) -> usize {
        self.num_removed
    }

    /// Deletes the worse half of the non-glue learnt clauses and compacts the
    /// database. Clause indices change, so the caller must rebuild watches;
    /// it must also make sure no assignment still refers to a learnt clause
    /// as its reason. Returns the number of clauses removed.
    pub fn clean_clause_db(&mut self, db: &mut ClauseDatabase) -> usize {
        self.conflicts_since_last_cleanup = 0;
        self.interval += self.increment;

        let mut candidates: Vec<(usize, usize, usize)> = db
            .origin
            .iter()
            .enumerate()
            .filter_map(|(idx, origin)| match *origin {
                Origin::Learnt { lbd } if lbd > 2 => Some((idx, lbd, db.clauses[idx].len())),
                _ => None,
            })
            .collect();

        let num_to_remove = candidates.len() / 2;
        if num_to_remove == 0 {
            return 0;
        }

        // Worst first: higher LBD, then longer clauses.
        let worst_first = |a: &(usize, usize, usize), b: &(usize, usize, usize)| -> Ordering {
            (b.1, b.2).cmp(&(a.1, a.2))
        };
        candidates.select_nth_unstable_by(num_to_remove - 1, worst_first);

        let mut remove = vec![false; db.len()];
        for &(idx, _, _) in &candidates[..num_to_remove] {
            remove[idx] = true;
        }

        let mut keep = remove.iter().map(|r| !r);
        let mut keep_origin = keep.clone();
        db.clauses.retain(|_| keep.next().unwrap_or(true));
        db.origin.retain(|_| keep_origin.next().unwrap_or(true));
        db.num_learnt -= num_to_remove;

        self.num_removed += num_to_remove;
        num_to_remove
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_worst_half_of_non_glue_learnts() {
        let mut db = ClauseDatabase::new();
        db.push_original(Clause::from_i32s(&[1, 2, 3, 4, 5, 6]));
        db.push_learnt(Clause::from_i32s(&[1, 2]), 2);
        db.push_learnt(Clause::from_i32s(&[1, 2, 3]), 3);
        db.push_learnt(Clause::from_i32s(&[1, 2, 3, 4, 5]), 5);
        db.push_learnt(Clause::from_i32s(&[1, 2, 3, 4]), 4);
        db.push_learnt(Clause::from_i32s(&[-1, -2, -3, -4, -5]), 5);

        let mut manager = LbdClauseManagement::new(1, 1);
        manager.on_conflict();
        assert!(manager.should_clean_db());
        assert_eq!(manager.clean_clause_db(&mut db), 2);

        assert_eq!(db.len(), 4);
        assert_eq!(db.num_original(), 1);
        assert_eq!(db.num_learnt(), 3);
        assert!(!db.is_learnt(0));
        assert_eq!(db[0].len(), 6);
        let kept: Vec<usize> = (1..db.len()).map(|i| db[i].len()).collect();
        assert_eq!(kept, vec![2, 3, 4]);
        assert!(!manager.should_clean_db());
        assert_eq!(manager.num_removed(), 2);
    }
}
