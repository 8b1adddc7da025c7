#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Two-watched-literal index. Every clause of length two or more is watched
//! by its first two literals; the list of a literal holds the indices of the
//! clauses watching it.

use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

pub type WatchList = SmallVec<[usize; 6]>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchedLiterals(Vec<WatchList>);

impl WatchedLiterals {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![WatchList::new(); 2 * (num_vars + 1)])
    }

    pub fn grow(&mut self, num_vars: usize) {
        let len = 2 * (num_vars + 1);
        if len > self.0.len() {
            self.0.resize(len, WatchList::new());
        }
    }

    pub fn watch(&mut self, clause: &Clause, idx: usize) {
        debug_assert!(clause.len() >= 2);
        debug_assert_ne!(clause[0], clause[1]);

        self[clause[0]].push(idx);
        self[clause[1]].push(idx);
    }

    /// Moves the watch list of `lit` out, leaving it empty.
    pub fn take(&mut self, lit: Literal) -> WatchList {
        std::mem::take(&mut self[lit])
    }

    /// Discards every list and re-watches the given `(index, clause)` pairs.
    pub fn rebuild<'a>(&mut self, clauses: impl IntoIterator<Item = (usize, &'a Clause)>) {
        for list in &mut self.0 {
            list.clear();
        }
        for (idx, clause) in clauses {
            self.watch(clause, idx);
        }
    }
}

impl Index<Literal> for WatchedLiterals {
    type Output = WatchList;

    fn index(&self, index: Literal) -> &Self::Output {
        &self.0[index.index()]
    }
}

impl IndexMut<Literal> for WatchedLiterals {
    fn index_mut(&mut self, index: Literal) -> &mut Self::Output {
        &mut self.0[index.index()]
    }
}
