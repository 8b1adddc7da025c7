#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
use crate::sat::literal::{Literal, Variable};
use bit_vec::BitVec;

/// Remembers the last polarity of each variable and reuses it for the next
/// decision on that variable. Unseen variables start negative.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SavedPhases(BitVec);

impl SavedPhases {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(BitVec::from_elem(num_vars + 1, false))
    }

    pub fn grow(&mut self, num_vars: usize) {
        if num_vars + 1 > self.0.len() {
            self.0.grow(num_vars + 1 - self.0.len(), false);
        }
    }

    pub fn save(&mut self, lit: Literal) {
        self.0.set(lit.variable() as usize, lit.polarity());
    }

    /// The literal to decide for `var`.
    #[must_use]
    pub fn get_next(&self, var: Variable) -> Literal {
        Literal::new(var, self.0.get(var as usize).unwrap_or(false))
    }

    pub fn reset(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_phase_is_reused() {
        let mut phases = SavedPhases::new(2);
        assert_eq!(phases.get_next(1), Literal::new(1, false));
        phases.save(Literal::new(1, true));
        assert_eq!(phases.get_next(1), Literal::new(1, true));

        phases.grow(5);
        assert_eq!(phases.get_next(5), Literal::new(5, false));
        phases.reset();
        assert_eq!(phases.get_next(1), Literal::new(1, false));
    }
}
