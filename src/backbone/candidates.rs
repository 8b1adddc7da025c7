use crate::backbone::occurrence::OccurrenceIndex;
use crate::sat::assignment::Model;
use crate::sat::literal::Literal;
use bit_vec::BitVec;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;

/// A literal that may still belong to the backbone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub literal: Literal,
    pub priority: usize,
}

/// Candidate literals ordered by descending priority, ties broken by
/// ascending variable id.
///
/// The order is fixed when the queue is built. Pruning marks entries dead in
/// place; dead entries are skipped when the cursor reaches them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateQueue {
    entries: Vec<Candidate>,
    dead: BitVec,
    position: FxHashMap<Literal, usize>,
    cursor: usize,
    live: usize,
}

impl CandidateQueue {
    /// Builds a queue over `literals`, each prioritised by `key`. Repeated
    /// literals are kept once.
    pub fn with_key(
        literals: impl IntoIterator<Item = Literal>,
        key: impl Fn(Literal) -> usize,
    ) -> Self {
        let mut entries: Vec<Candidate> = literals
            .into_iter()
            .map(|literal| Candidate {
                literal,
                priority: key(literal),
            })
            .collect();
        entries.sort_by_key(|c| (Reverse(c.priority), c.literal.variable(), c.literal));
        entries.dedup_by_key(|c| c.literal);

        let position = entries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.literal, i))
            .collect();

        Self {
            dead: BitVec::from_elem(entries.len(), false),
            live: entries.len(),
            entries,
            position,
            cursor: 0,
        }
    }

    /// One candidate per literal of `model`, prioritised by its occurrence
    /// count in the formula.
    #[must_use]
    pub fn seed(model: &Model, occurrences: &OccurrenceIndex) -> Self {
        Self::with_key(model.literals(), |lit| occurrences.count(lit))
    }

    /// Removes and returns the highest-priority live candidate.
    pub fn pop_next(&mut self) -> Option<Literal> {
        while self.cursor < self.entries.len() {
            let i = self.cursor;
            self.cursor += 1;
            if !self.dead[i] {
                self.dead.set(i, true);
                self.live -= 1;
                return Some(self.entries[i].literal);
            }
        }
        None
    }

    /// Marks `lit` dead. Returns `false` if it was not a live candidate.
    pub fn prune(&mut self, lit: Literal) -> bool {
        let Some(&i) = self.position.get(&lit) else {
            return false;
        };
        if self.dead[i] {
            return false;
        }
        self.dead.set(i, true);
        self.live -= 1;
        true
    }

    /// Prunes every live candidate that `model` makes false and returns how
    /// many were pruned. Variables the model leaves open keep their
    /// candidates.
    pub fn prune_falsified(&mut self, model: &Model) -> usize {
        let mut pruned = 0;
        for i in self.cursor..self.entries.len() {
            if !self.dead[i] && model.falsifies(self.entries[i].literal) {
                self.dead.set(i, true);
                pruned += 1;
            }
        }
        self.live -= pruned;
        pruned
    }

    /// Number of candidates neither popped nor pruned.
    #[must_use]
    pub const fn live_len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live candidates in pop order.
    pub fn iter_live(&self) -> impl Iterator<Item = &Candidate> {
        self.entries
            .iter()
            .enumerate()
            .skip(self.cursor)
            .filter(|(i, _)| !self.dead[*i])
            .map(|(_, c)| c)
    }
}
