#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Backbone computation and backbone-driven formula simplification.
//!
//! The backbone of a satisfiable formula is the set of literals that are true
//! in every model. `Extractor` computes it with one oracle query per
//! candidate literal, shrinking the candidate set with every model found;
//! `simplify` then fixes the backbone variables in the input formula.

pub mod candidates;
pub mod extraction;
pub mod occurrence;
pub mod report;
pub mod simplify;

use crate::error::IntegrityError;
use crate::sat::literal::Literal;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::fmt::{self, Display};

pub use extraction::{compute_backbone, ExtractionStats, Extractor, Outcome};
pub use simplify::simplify;

/// Backbone literals in the order they were discovered. Holds at most one
/// polarity per variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Backbone {
    literals: Vec<Literal>,
    members: FxHashSet<Literal>,
}

impl Backbone {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a backbone from literals in discovery order.
    ///
    /// # Errors
    ///
    /// `IntegrityError::ConflictingBackbone` if both polarities of a variable
    /// are given.
    pub fn from_literals(literals: impl IntoIterator<Item = Literal>) -> Result<Self, IntegrityError> {
        let mut backbone = Self::new();
        for lit in literals {
            backbone.insert(lit)?;
        }
        Ok(backbone)
    }

    /// Adds `lit`. Returns `false` if it was already present.
    ///
    /// # Errors
    ///
    /// `IntegrityError::ConflictingBackbone` if `!lit` is already a member.
    pub fn insert(&mut self, lit: Literal) -> Result<bool, IntegrityError> {
        if self.members.contains(&!lit) {
            return Err(IntegrityError::ConflictingBackbone(lit.variable()));
        }
        if !self.members.insert(lit) {
            return Ok(false);
        }
        self.literals.push(lit);
        Ok(true)
    }

    #[must_use]
    pub fn contains(&self, lit: Literal) -> bool {
        self.members.contains(&lit)
    }

    /// `true` if the backbone forces `lit` false.
    #[must_use]
    pub fn falsifies(&self, lit: Literal) -> bool {
        self.members.contains(&!lit)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }
}

impl Display for Backbone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literals.iter().join(" "))
    }
}
