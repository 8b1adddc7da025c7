#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Decision heuristics: which unassigned variable the search branches on next.

use crate::sat::assignment::Assignment;
use crate::sat::literal::Variable;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::Debug;

pub trait VariableSelection: Debug + Clone {
    fn new(num_vars: usize) -> Self;

    /// Makes variables up to `num_vars` selectable.
    fn grow(&mut self, num_vars: usize);

    /// Returns an unassigned variable, or `None` if every variable is assigned.
    fn pick(&mut self, assignment: &Assignment) -> Option<Variable>;

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T);

    fn decay(&mut self);

    /// Called when `var` becomes unassigned on backtracking.
    fn reinsert(&mut self, var: Variable);
}

const DECAY: f64 = 0.95;
const RESCALE_LIMIT: f64 = 1e100;

/// VSIDS over a binary heap with lazy deletion.
///
/// Every unassigned variable has at least one heap entry carrying its current
/// activity. Entries for assigned variables, or with an outdated activity, are
/// discarded when popped.
#[derive(Debug, Clone, Default)]
pub struct VsidsHeap {
    activity: Vec<f64>,
    increment: f64,
    heap: BinaryHeap<(OrderedFloat<f64>, Reverse<Variable>)>,
}

impl VsidsHeap {
    #[must_use]
    pub fn activity(&self, var: Variable) -> f64 {
        self.activity[var as usize]
    }

    fn rebuild(&mut self) {
        self.heap = (1..self.activity.len())
            .filter_map(|v| Variable::try_from(v).ok())
            .map(|v| (OrderedFloat(self.activity[v as usize]), Reverse(v)))
            .collect();
    }

    fn bump(&mut self, var: Variable) {
        let v = var as usize;
        self.activity[v] += self.increment;
        if self.activity[v] > RESCALE_LIMIT {
            for a in &mut self.activity {
                *a /= RESCALE_LIMIT;
            }
            self.increment /= RESCALE_LIMIT;
            self.rebuild();
        } else {
            self.heap
                .push((OrderedFloat(self.activity[v]), Reverse(var)));
        }
    }
}

impl VariableSelection for VsidsHeap {
    fn new(num_vars: usize) -> Self {
        let mut vsids = Self {
            activity: vec![0.0; num_vars + 1],
            increment: 1.0,
            heap: BinaryHeap::with_capacity(num_vars),
        };
        vsids.rebuild();
        vsids
    }

    fn grow(&mut self, num_vars: usize) {
        let old = self.activity.len();
        if num_vars + 1 <= old {
            return;
        }
        self.activity.resize(num_vars + 1, 0.0);
        for v in old..=num_vars {
            if let Ok(var) = Variable::try_from(v) {
                self.heap.push((OrderedFloat(0.0), Reverse(var)));
            }
        }
    }

    fn pick(&mut self, assignment: &Assignment) -> Option<Variable> {
        if self.heap.len() > 4 * self.activity.len() + 64 {
            self.rebuild();
        }

        while let Some((OrderedFloat(score), Reverse(var))) = self.heap.pop() {
            let current = self.activity[var as usize];
            if !assignment.is_assigned(var) && score.total_cmp(&current).is_eq() {
                return Some(var);
            }
        }
        None
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T) {
        for var in vars {
            self.bump(var);
        }
    }

    fn decay(&mut self) {
        self.increment /= DECAY;
    }

    fn reinsert(&mut self, var: Variable) {
        self.heap
            .push((OrderedFloat(self.activity[var as usize]), Reverse(var)));
    }
}

/// Branches on the lowest-numbered unassigned variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixedOrder(usize);

impl VariableSelection for FixedOrder {
    fn new(num_vars: usize) -> Self {
        Self(num_vars)
    }

    fn grow(&mut self, num_vars: usize) {
        self.0 = self.0.max(num_vars);
    }

    fn pick(&mut self, assignment: &Assignment) -> Option<Variable> {
        (1..=self.0)
            .filter_map(|v| Variable::try_from(v).ok())
            .find(|&v| !assignment.is_assigned(v))
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, _: T) {}

    fn decay(&mut self) {}

    fn reinsert(&mut self, _: Variable) {}
}
