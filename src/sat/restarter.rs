#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Restart schedules for the CDCL search.
//!
//! A restart abandons the current decisions (keeping learnt clauses and
//! variable activities) and resumes from the root. Restarts are also the
//! points where the learnt clause database is reduced.
//!
//! - `Luby`: restart intervals follow the Luby sequence scaled by `N`
//!   conflicts.
//! - `Never`: restarts are disabled.

use std::fmt::Debug;

/// Decides after each conflict whether the search should restart.
pub trait Restarter: Debug + Clone {
    fn new() -> Self;

    /// Counts one conflict and returns `true` if a restart is due.
    fn should_restart(&mut self) -> bool;

    /// Total number of restarts triggered so far.
    fn num_restarts(&self) -> usize;
}

/// Restarts after `N * luby(i)` conflicts for the `i`-th interval. The
/// sequence runs 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Luby<const N: usize> {
    restarts: usize,
    /// Conflicts remaining in the current interval.
    restarts_in: usize,
}

/// The `x`-th element (from 0) of the Luby sequence.
#[must_use]
pub fn luby(mut x: usize) -> usize {
    let mut size = 1_usize;
    let mut seq = 0_u32;
    while size < x + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != x {
        size = (size - 1) >> 1;
        seq -= 1;
        x %= size;
    }
    1 << seq
}

impl<const N: usize> Restarter for Luby<N> {
    fn new() -> Self {
        Self {
            restarts: 0,
            restarts_in: N * luby(0),
        }
    }

    fn should_restart(&mut self) -> bool {
        self.restarts_in = self.restarts_in.saturating_sub(1);
        if self.restarts_in > 0 {
            return false;
        }
        self.restarts += 1;
        self.restarts_in = N * luby(self.restarts);
        true
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Never;

impl Restarter for Never {
    fn new() -> Self {
        Self
    }

    fn should_restart(&mut self) -> bool {
        false
    }

    fn num_restarts(&self) -> usize {
        0
    }
}
