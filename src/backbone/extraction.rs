//! The backbone extraction loop.
//!
//! After an initial satisfiability check, every literal of the first model
//! is a candidate. Candidates are tested one at a time, most frequent first,
//! by asking the oracle for a model of `F ∧ ¬ℓ`:
//!
//! - no model: `ℓ` is in the backbone, and the unit clause `(ℓ)` is added to
//!   the oracle's working formula to speed up later queries;
//! - a model `M`: every remaining candidate that `M` falsifies cannot be in
//!   the backbone and is pruned.
//!
//! The backbone found so far is sound at any point, so a computation cut
//! short by an error or an exhausted budget still yields a subset of the
//! full backbone through `Extractor::backbone`.

use crate::backbone::candidates::CandidateQueue;
use crate::backbone::occurrence::OccurrenceIndex;
use crate::backbone::Backbone;
use crate::error::Result;
use crate::oracle::{Oracle, Verdict};
use crate::sat::cnf::Cnf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result of a completed computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The input formula has no model, so it has no meaningful backbone.
    Unsatisfiable,
    Backbone(Backbone),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Done,
    Unsatisfiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractionStats {
    pub oracle_calls: usize,
    pub sat_answers: usize,
    pub unsat_answers: usize,
    /// Candidates seeded from the first model.
    pub candidates: usize,
    pub pruned: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct Extractor<'a, O: Oracle> {
    formula: &'a Cnf,
    oracle: O,
    queue: CandidateQueue,
    backbone: Backbone,
    state: State,
    stats: ExtractionStats,
    started: Instant,
}

impl<'a, O: Oracle> Extractor<'a, O> {
    /// Loads `formula` into `oracle` and runs the initial satisfiability
    /// check.
    ///
    /// # Errors
    ///
    /// Any oracle failure.
    pub fn new(formula: &'a Cnf, mut oracle: O) -> Result<Self> {
        let started = Instant::now();
        let mut stats = ExtractionStats::default();

        oracle.load(formula)?;
        stats.oracle_calls += 1;
        let (state, queue) = match oracle.check(&[])? {
            Verdict::Unsatisfiable => {
                stats.unsat_answers += 1;
                info!("formula is unsatisfiable");
                (State::Unsatisfiable, CandidateQueue::default())
            }
            Verdict::Satisfiable(model) => {
                stats.sat_answers += 1;
                let occurrences = OccurrenceIndex::new(formula);
                let queue = CandidateQueue::seed(&model, &occurrences);
                stats.candidates = queue.live_len();
                info!(candidates = stats.candidates, "seeded backbone candidates");
                (State::Running, queue)
            }
        };

        Ok(Self {
            formula,
            oracle,
            queue,
            backbone: Backbone::new(),
            state,
            stats,
            started,
        })
    }

    /// Tests one candidate. Returns `false` once there is nothing left to do.
    ///
    /// # Errors
    ///
    /// Oracle failures, and `IntegrityError::ConflictingBackbone` if the
    /// oracle proves both polarities of a variable. The computation should
    /// not be resumed after an error.
    pub fn step(&mut self) -> Result<bool> {
        if self.state != State::Running {
            return Ok(false);
        }
        let Some(lit) = self.queue.pop_next() else {
            self.state = State::Done;
            return Ok(false);
        };

        self.stats.oracle_calls += 1;
        match self.oracle.check(&[!lit])? {
            Verdict::Unsatisfiable => {
                self.stats.unsat_answers += 1;
                self.backbone.insert(lit)?;
                self.oracle.add_clause(&[lit])?;
                debug!(literal = %lit, remaining = self.queue.live_len(), "backbone literal");
            }
            Verdict::Satisfiable(model) => {
                self.stats.sat_answers += 1;
                let pruned = self.queue.prune_falsified(&model);
                self.stats.pruned += pruned;
                debug!(literal = %lit, pruned, remaining = self.queue.live_len(), "not a backbone literal");
            }
        }
        Ok(true)
    }

    /// Steps until every candidate is decided.
    ///
    /// # Errors
    ///
    /// See `Extractor::step`. The partial backbone stays available.
    pub fn run(&mut self) -> Result<Outcome> {
        while self.step()? {}

        let stats = self.stats();
        info!(
            backbone = self.backbone.len(),
            oracle_calls = stats.oracle_calls,
            pruned = stats.pruned,
            elapsed = ?stats.elapsed,
            "backbone extraction finished"
        );
        Ok(self.outcome())
    }

    fn outcome(&self) -> Outcome {
        match self.state {
            State::Unsatisfiable => Outcome::Unsatisfiable,
            State::Running | State::Done => Outcome::Backbone(self.backbone.clone()),
        }
    }

    /// Backbone literals proven so far.
    #[must_use]
    pub const fn backbone(&self) -> &Backbone {
        &self.backbone
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub const fn formula(&self) -> &'a Cnf {
        self.formula
    }

    /// Candidates still waiting to be tested.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.queue.live_len()
    }

    #[must_use]
    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats {
            elapsed: self.started.elapsed(),
            ..self.stats
        }
    }

    pub const fn oracle(&self) -> &O {
        &self.oracle
    }
}

/// Computes the backbone of `formula` to completion.
///
/// # Errors
///
/// See `Extractor::new` and `Extractor::step`.
pub fn compute_backbone<O: Oracle>(formula: &Cnf, oracle: O) -> Result<Outcome> {
    Extractor::new(formula, oracle)?.run()
}
