//! Backbone extraction and backbone-driven simplification for CNF formulas.
//!
//! The backbone of a satisfiable formula is the set of literals that hold in
//! every satisfying assignment. On large configuration formulas it is
//! typically a sizeable share of all variables; fixing those variables and
//! dropping the clauses they satisfy yields a much smaller, equivalent
//! formula.
//!
//! ```
//! use sat_backbone::backbone::{compute_backbone, simplify, Outcome};
//! use sat_backbone::oracle::IncrementalOracle;
//! use sat_backbone::sat::cnf::Cnf;
//!
//! let cnf = Cnf::from(vec![vec![1], vec![-1, 2], vec![2, 3]]);
//! let Outcome::Backbone(backbone) = compute_backbone(&cnf, IncrementalOracle::new())? else {
//!     unreachable!("the formula is satisfiable");
//! };
//! assert_eq!(backbone.len(), 2);
//!
//! let simplified = simplify(&cnf, &backbone)?;
//! assert_eq!(simplified.len(), 2);
//! # Ok::<(), sat_backbone::error::Error>(())
//! ```

/// Backbone extraction, simplification and reporting.
pub mod backbone;

/// Error types shared by the whole crate.
pub mod error;

/// Satisfiability oracles used by the extraction loop.
pub mod oracle;

/// The `sat` module holds the CNF data model, the DIMACS reader and writer,
/// and the incremental CDCL solver behind the in-process oracle.
pub mod sat;
