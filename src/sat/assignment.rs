#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Partial assignments used during search, and the total models handed back
//! to callers.

use crate::sat::literal::{Literal, Variable};
use core::ops::{Index, IndexMut};
use itertools::Itertools;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(b),
            Self::Unassigned => None,
        }
    }
}

/// Variable-indexed assignment. Slot 0 is unused so variables index directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<VarState>);

impl Index<usize> for Assignment {
    type Output = VarState;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Assignment {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Assignment {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![VarState::Unassigned; num_vars + 1])
    }

    /// Number of variables this assignment can hold.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn grow(&mut self, num_vars: usize) {
        if num_vars + 1 > self.0.len() {
            self.0.resize(num_vars + 1, VarState::Unassigned);
        }
    }

    pub fn assign(&mut self, lit: Literal) {
        self.0[lit.variable() as usize] = VarState::Assigned(lit.polarity());
    }

    pub fn unassign(&mut self, var: Variable) {
        self.0[var as usize] = VarState::Unassigned;
    }

    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self.0[var as usize].is_assigned()
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        self.0.get(var as usize).and_then(|s| s.value())
    }

    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| if lit.polarity() { b } else { !b })
    }

    /// Snapshot of the assigned variables as a model.
    #[must_use]
    pub fn to_model(&self) -> Model {
        Model {
            values: self.0.clone(),
        }
    }
}

/// A satisfying assignment, viewed as the set of literals it makes true.
///
/// Models reported by an external solver may leave variables out; such
/// variables are neither contained nor falsified.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model {
    values: Vec<VarState>,
}

impl Model {
    /// Builds a model over variables `1..=num_vars` from its true literals.
    /// Variables beyond `num_vars` grow the model.
    #[must_use]
    pub fn from_literals(num_vars: usize, literals: impl IntoIterator<Item = Literal>) -> Self {
        let mut values = vec![VarState::Unassigned; num_vars + 1];
        for lit in literals {
            let var = lit.variable() as usize;
            if var >= values.len() {
                values.resize(var + 1, VarState::Unassigned);
            }
            values[var] = VarState::Assigned(lit.polarity());
        }
        Self { values }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.values.get(var as usize).and_then(|s| s.value())
    }

    /// `true` if `lit` is true under this model.
    #[must_use]
    pub fn contains(&self, lit: Literal) -> bool {
        self.value(lit.variable()) == Some(lit.polarity())
    }

    /// `true` if this model assigns `lit` false.
    #[must_use]
    pub fn falsifies(&self, lit: Literal) -> bool {
        self.value(lit.variable()) == Some(!lit.polarity())
    }

    /// The true literals, in ascending variable order.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.values
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(v, s)| {
                let var = Variable::try_from(v).ok()?;
                s.value().map(|b| Literal::new(var, b))
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.iter().filter(|s| s.is_assigned()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Space-separated literals, as on a solver's `v` line.
impl Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literals().join(" "))
    }
}
