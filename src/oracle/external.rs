//! Oracle that runs a stand-alone SAT solver binary once per query.
//!
//! Each query writes the working formula plus one unit clause per assumption
//! to a fresh temporary directory, runs `<solver> [args..] <file>` and reads
//! the SAT-competition output format from its stdout:
//!
//! ```text
//! s SATISFIABLE
//! v 1 -2 3 0
//! ```
//!
//! The temporary directory is removed on every exit path.

use crate::error::OracleError;
use crate::oracle::{Oracle, Verdict};
use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::debug;
use wait_timeout::ChildExt;

/// Exit status used by competition solvers for a satisfiable answer.
pub const EXIT_SATISFIABLE: i32 = 10;
/// Exit status used by competition solvers for an unsatisfiable answer.
pub const EXIT_UNSATISFIABLE: i32 = 20;

const STDERR_EXCERPT: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSolverConfig {
    /// Solver executable; looked up on `PATH` when not a path.
    pub path: PathBuf,
    /// Arguments placed before the formula file.
    pub args: Vec<String>,
    /// Per-query wall-clock limit. The solver is killed when it expires.
    pub timeout: Option<Duration>,
}

impl Default for ExternalSolverConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("kissat"),
            args: Vec::new(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExternalOracle {
    config: ExternalSolverConfig,
    formula: Option<Cnf>,
}

impl ExternalOracle {
    #[must_use]
    pub const fn new(config: ExternalSolverConfig) -> Self {
        Self {
            config,
            formula: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ExternalSolverConfig {
        &self.config
    }

    fn run(&self, formula: &Cnf, assumptions: &[Literal]) -> Result<Verdict, OracleError> {
        let dir = TempDir::new()?;
        let input = dir.path().join("query.cnf");
        let stdout_path = dir.path().join("solver.out");
        let stderr_path = dir.path().join("solver.err");

        write_query(&input, formula, assumptions)?;

        let start = Instant::now();
        let mut child = Command::new(&self.config.path)
            .args(&self.config.args)
            .arg(&input)
            .stdin(Stdio::null())
            .stdout(File::create(&stdout_path)?)
            .stderr(File::create(&stderr_path)?)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    OracleError::Unavailable(format!("{}: {e}", self.config.path.display()))
                }
                _ => OracleError::Io(e),
            })?;

        let status = match self.config.timeout {
            Some(limit) => {
                if let Some(status) = child.wait_timeout(limit)? {
                    status
                } else {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(OracleError::Timeout(limit));
                }
            }
            None => child.wait()?,
        };

        let stdout = fs::read_to_string(&stdout_path)?;
        debug!(
            solver = %self.config.path.display(),
            assumptions = assumptions.len(),
            exit = ?status.code(),
            elapsed = ?start.elapsed(),
            "external solver finished"
        );

        let num_vars = formula.num_vars.max(formula.max_clause_variable());
        match parse_solver_output(&stdout, num_vars) {
            Ok(verdict) => Ok(verdict),
            Err(_) if is_abnormal_exit(status) => {
                let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
                let excerpt: String = stderr.chars().take(STDERR_EXCERPT).collect();
                Err(OracleError::Crashed {
                    status: status.to_string(),
                    stderr: excerpt.trim().to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }
}

fn is_abnormal_exit(status: ExitStatus) -> bool {
    !matches!(status.code(), Some(0 | EXIT_SATISFIABLE | EXIT_UNSATISFIABLE))
}

/// Writes `formula` followed by one unit clause per assumption.
fn write_query(path: &Path, formula: &Cnf, assumptions: &[Literal]) -> io::Result<()> {
    let num_vars = assumptions
        .iter()
        .map(|l| l.variable() as usize)
        .fold(formula.num_vars.max(formula.max_clause_variable()), usize::max);

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "p cnf {num_vars} {}",
        formula.len() + assumptions.len()
    )?;
    for clause in formula.iter() {
        writeln!(writer, "{clause}")?;
    }
    for &assumption in assumptions {
        writeln!(writer, "{}", Clause::unit(assumption))?;
    }
    writer.flush()
}

/// Reads a solver's `s` status line and `v` model lines.
///
/// # Errors
///
/// `OracleError::UnparsableOutput` if there is no status line, the status is
/// neither `SATISFIABLE` nor `UNSATISFIABLE`, a model token is not an
/// integer, or a satisfiable answer leaves one of the variables
/// `1..=num_vars` without a value.
pub fn parse_solver_output(output: &str, num_vars: usize) -> Result<Verdict, OracleError> {
    let mut status = None;
    let mut literals = Vec::new();

    for line in output.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("s ") {
            status = match rest.trim() {
                "SATISFIABLE" => Some(true),
                "UNSATISFIABLE" => Some(false),
                other => {
                    return Err(OracleError::UnparsableOutput(format!(
                        "unexpected status `{other}`"
                    )));
                }
            };
        } else if line == "v" || line.starts_with("v ") {
            for token in line[1..].split_whitespace() {
                let value: i32 = token.parse().map_err(|_| {
                    OracleError::UnparsableOutput(format!("invalid model value `{token}`"))
                })?;
                literals.extend(Literal::from_i32(value));
            }
        }
    }

    match status {
        Some(true) => {
            let model = Model::from_literals(num_vars, literals);
            if let Some(var) = (1..=num_vars).find(|&v| model.value(v as Variable).is_none()) {
                return Err(OracleError::UnparsableOutput(format!(
                    "model assigns no value to variable {var}"
                )));
            }
            Ok(Verdict::Satisfiable(model))
        }
        Some(false) => Ok(Verdict::Unsatisfiable),
        None => Err(OracleError::UnparsableOutput(
            "missing `s` status line".to_string(),
        )),
    }
}

impl Oracle for ExternalOracle {
    fn load(&mut self, formula: &Cnf) -> Result<(), OracleError> {
        self.formula = Some(formula.clone());
        Ok(())
    }

    fn check(&mut self, assumptions: &[Literal]) -> Result<Verdict, OracleError> {
        let formula = self.formula.as_ref().ok_or(OracleError::NotLoaded)?;
        self.run(formula, assumptions)
    }

    fn add_clause(&mut self, clause: &[Literal]) -> Result<(), OracleError> {
        let formula = self.formula.as_mut().ok_or(OracleError::NotLoaded)?;
        formula.add_clause(Clause::new(clause.iter().copied()));
        Ok(())
    }
}
