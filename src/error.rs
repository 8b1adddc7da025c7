//! Error types for parsing, oracle queries and backbone computation.

use crate::sat::literal::Variable;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for backbone operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Structural problems in a DIMACS CNF file.
#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read formula: {0}")]
    Io(#[from] io::Error),

    #[error("missing `p cnf` header")]
    MissingHeader,

    #[error("line {line}: invalid header `{text}`")]
    InvalidHeader { line: usize, text: String },

    #[error("line {line}: duplicate `p cnf` header")]
    DuplicateHeader { line: usize },

    #[error("line {line}: clause data before the `p cnf` header")]
    ClauseBeforeHeader { line: usize },

    #[error("line {line}: `{token}` is not an integer literal")]
    InvalidLiteral { line: usize, token: String },

    #[error("line {line}: literal {literal} exceeds the {declared} declared variables")]
    VariableOutOfRange {
        line: usize,
        literal: i32,
        declared: usize,
    },

    #[error("last clause is not terminated by 0")]
    MissingTerminator,
}

/// Failures of the satisfiability oracle. None of these is ever turned into
/// a SAT or UNSAT verdict.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("solver unavailable: {0}")]
    Unavailable(String),

    #[error("solver I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("solver exited with {status}: {stderr}")]
    Crashed { status: String, stderr: String },

    #[error("unparsable solver output: {0}")]
    UnparsableOutput(String),

    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle query budget of {0} exhausted")]
    BudgetExhausted(usize),

    #[error("oracle queried before a formula was loaded")]
    NotLoaded,
}

impl OracleError {
    /// Budget and deadline expiry abort the computation without implying
    /// that the solver misbehaved.
    #[must_use]
    pub const fn is_budget_expiry(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::BudgetExhausted(_))
    }
}

/// Inconsistency between a backbone and the formula it was computed for.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("backbone contains both polarities of variable {0}")]
    ConflictingBackbone(Variable),

    #[error("clause {index} is empty after removing literals falsified by the backbone")]
    EmptyClause { index: usize },
}

/// Top-level error of a backbone computation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] DimacsError),

    #[error("oracle failure: {0}")]
    OracleFailure(#[from] OracleError),

    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("failed to write {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
}

impl Error {
    /// Short name of the error kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "MalformedInput",
            Self::OracleFailure(_) => "OracleFailure",
            Self::Integrity(_) => "SimplifierIntegrityError",
            Self::Output { .. } => "OutputError",
        }
    }
}
