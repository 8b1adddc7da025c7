#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use sat_backbone::backbone::{report, simplify, Backbone, ExtractionStats, Extractor, Outcome};
use sat_backbone::error::{Error, Result};
use sat_backbone::oracle::external::{EXIT_SATISFIABLE, EXIT_UNSATISFIABLE};
use sat_backbone::oracle::{
    Budget, Budgeted, ExternalOracle, ExternalSolverConfig, IncrementalOracle, Oracle,
};
use sat_backbone::sat::cdcl::Cdcl;
use sat_backbone::sat::clause::Clause;
use sat_backbone::sat::cnf::Cnf;
use sat_backbone::sat::dimacs::{self, Dimacs};
use sat_backbone::sat::solver::{SolveResult, Solver};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::{info, warn};

/// Command-line interface of the `backbone` binary.
#[derive(Parser, Debug)]
#[command(
    name = "backbone",
    version,
    about = "Computes the backbone of a CNF formula and simplifies the formula with it",
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    /// DIMACS file whose backbone report is printed when no subcommand is given.
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Compute the backbone of a DIMACS file and write the report and the
    /// simplified formula.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        input: PathBuf,

        /// Where to write the backbone report, one `+name`/`-name` line per literal.
        #[arg(long, value_name = "OUT")]
        backbone: Option<PathBuf>,

        /// Where to write the simplified formula in DIMACS format.
        #[arg(long, value_name = "OUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Compute the backbone of every `.cnf` file below a directory.
    Dir {
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a DIMACS file with the built-in CDCL solver and print the
    /// result in SAT competition format. Exits with 10 (SAT) or 20 (UNSAT).
    Solve {
        path: PathBuf,

        #[arg(short, long, default_value_t = false)]
        debug: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Which oracle answers the satisfiability queries.
#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OracleKind {
    /// In-process incremental CDCL solver.
    #[default]
    Incremental,
    /// Stand-alone solver binary, run once per query.
    External,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Enable debug output, logging every oracle query.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Print problem, extraction and memory statistics to stderr.
    #[arg(short, long, default_value_t = false)]
    pub(crate) stats: bool,

    #[arg(long, value_enum, default_value_t = OracleKind::Incremental)]
    pub(crate) oracle: OracleKind,

    /// External solver executable, used with `--oracle external`. Defaults to `kissat`.
    #[arg(long, env = "BACKBONE_SOLVER")]
    pub(crate) solver_path: Option<PathBuf>,

    /// Argument passed to the external solver before the formula file. Repeatable.
    #[arg(long = "solver-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub(crate) solver_args: Vec<String>,

    /// Wall-clock limit for a single external solver run.
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub(crate) query_timeout: Option<Duration>,

    /// Abort after this many oracle queries.
    #[arg(long, value_name = "N")]
    pub(crate) max_queries: Option<usize>,

    /// Abort once the computation has run this long.
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub(crate) time_limit: Option<Duration>,
}

fn parse_seconds(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("`{s}` is not a valid duration: {e}"))
}

impl Cli {
    /// Whether the selected command asked for debug logging.
    pub(crate) fn debug(&self) -> bool {
        match &self.command {
            Some(Commands::File { common, .. } | Commands::Dir { common, .. }) => common.debug,
            Some(Commands::Solve { debug, .. }) => *debug,
            Some(Commands::Completions { .. }) => false,
            None => self.common.debug,
        }
    }
}

impl CommonOptions {
    const fn budget(&self) -> Budget {
        Budget {
            max_queries: self.max_queries,
            time_limit: self.time_limit,
        }
    }

    fn oracle(&self) -> Budgeted<Box<dyn Oracle>> {
        let inner: Box<dyn Oracle> = match self.oracle {
            OracleKind::Incremental => Box::new(IncrementalOracle::new()),
            OracleKind::External => {
                let mut config = ExternalSolverConfig {
                    args: self.solver_args.clone(),
                    timeout: self.query_timeout,
                    ..ExternalSolverConfig::default()
                };
                if let Some(path) = &self.solver_path {
                    config.path.clone_from(path);
                }
                Box::new(ExternalOracle::new(config))
            }
        };
        Budgeted::new(inner, self.budget())
    }
}

fn unsatisfiable_diagnostic(cnf: &Cnf) -> String {
    match cnf.iter().position(Clause::is_empty) {
        Some(index) => format!("formula unsatisfiable: input clause {} is empty", index + 1),
        None => "formula unsatisfiable".to_string(),
    }
}

fn exit_unsatisfiable(cnf: &Cnf) -> ExitCode {
    eprintln!("{}", unsatisfiable_diagnostic(cnf));
    ExitCode::from(EXIT_UNSATISFIABLE as u8)
}

/// Parsed input plus the result of its backbone computation.
struct Computation {
    dimacs: Dimacs,
    parse_time: Duration,
    outcome: Outcome,
    stats: ExtractionStats,
}

fn compute(path: &Path, common: &CommonOptions) -> Result<Computation> {
    let time = Instant::now();
    let dimacs = dimacs::parse_file(path)?;
    let parse_time = time.elapsed();
    info!(
        path = %path.display(),
        variables = dimacs.cnf.num_vars,
        clauses = dimacs.cnf.len(),
        ?parse_time,
        "parsed formula"
    );

    let (outcome, stats) = {
        let mut extractor = Extractor::new(&dimacs.cnf, common.oracle())?;
        match extractor.run() {
            Ok(outcome) => (outcome, extractor.stats()),
            Err(e) => {
                if let Error::OracleFailure(failure) = &e {
                    if failure.is_budget_expiry() {
                        warn!(
                            proven = extractor.backbone().len(),
                            remaining = extractor.remaining(),
                            "budget exhausted before the backbone was complete"
                        );
                    }
                }
                return Err(e);
            }
        }
    };

    Ok(Computation {
        dimacs,
        parse_time,
        outcome,
        stats,
    })
}

/// Prints the backbone report of `path` to stdout.
pub(crate) fn report_file(path: &Path, common: &CommonOptions) -> Result<ExitCode> {
    let computation = compute(path, common)?;
    let Outcome::Backbone(backbone) = &computation.outcome else {
        return Ok(exit_unsatisfiable(&computation.dimacs.cnf));
    };
    let simplified = simplify(&computation.dimacs.cnf, backbone)?;

    let rendered = report::render(backbone, &computation.dimacs.names);
    write_stdout(rendered.as_bytes())?;

    if common.stats {
        print_stats(&computation, backbone, &simplified);
    }
    Ok(ExitCode::SUCCESS)
}

/// Computes the backbone of `input` and writes the requested artifacts.
/// Without any output path the report goes to stdout.
pub(crate) fn process_file(
    input: &Path,
    backbone_out: Option<&Path>,
    output_out: Option<&Path>,
    common: &CommonOptions,
) -> Result<ExitCode> {
    if backbone_out.is_none() && output_out.is_none() {
        return report_file(input, common);
    }

    let computation = compute(input, common)?;
    let Outcome::Backbone(backbone) = &computation.outcome else {
        return Ok(exit_unsatisfiable(&computation.dimacs.cnf));
    };
    let simplified = simplify(&computation.dimacs.cnf, backbone)?;

    let names = &computation.dimacs.names;
    let mut artifacts = Vec::with_capacity(2);
    if let Some(path) = backbone_out {
        artifacts.push((path, report::render(backbone, names)));
    }
    if let Some(path) = output_out {
        artifacts.push((path, dimacs::to_dimacs_string(&simplified, Some(names))));
    }
    write_all_or_nothing(&artifacts)?;

    info!(
        backbone = backbone.len(),
        clauses = simplified.len(),
        "wrote simplified formula"
    );
    if common.stats {
        print_stats(&computation, backbone, &simplified);
    }
    Ok(ExitCode::SUCCESS)
}

/// Computes the backbone of every `.cnf` file below `path` and prints one
/// summary line per file. Failures are reported and do not stop the walk.
pub(crate) fn process_dir(path: &Path, common: &CommonOptions) -> ExitCode {
    let mut failed = 0usize;

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            eprintln!("Skipping non-CNF file: {}", file_path.display());
            continue;
        }

        let summary = compute(file_path, common).and_then(|computation| {
            Ok(match &computation.outcome {
                Outcome::Unsatisfiable => "unsatisfiable".to_string(),
                Outcome::Backbone(backbone) => {
                    let simplified = simplify(&computation.dimacs.cnf, backbone)?;
                    format!(
                        "{} backbone literals, {} of {} clauses after simplification",
                        backbone.len(),
                        simplified.len(),
                        computation.dimacs.cnf.len()
                    )
                }
            })
        });

        match summary {
            Ok(line) => println!("{}: {line}", file_path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("{}: error [{}]: {e}", file_path.display(), e.kind());
            }
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Solves `path` with the in-process solver, printing `s`/`v` lines.
pub(crate) fn solve_file(path: &Path) -> Result<ExitCode> {
    let dimacs = dimacs::parse_file(path)?;
    let mut solver: Cdcl = Cdcl::new(&dimacs.cnf);
    let result = solver.solve();
    info!(stats = ?solver.stats(), "solver finished");

    let mut out = Vec::new();
    write_solution(&mut out, &result).map_err(stdout_error)?;
    write_stdout(&out)?;

    Ok(ExitCode::from(if result.is_sat() {
        EXIT_SATISFIABLE as u8
    } else {
        EXIT_UNSATISFIABLE as u8
    }))
}

fn write_solution<W: Write>(writer: &mut W, result: &SolveResult) -> io::Result<()> {
    match result {
        SolveResult::Sat(model) => {
            writeln!(writer, "s SATISFIABLE")?;
            write!(writer, "v")?;
            for lit in model.literals() {
                write!(writer, " {lit}")?;
            }
            writeln!(writer, " 0")
        }
        SolveResult::Unsat => writeln!(writer, "s UNSATISFIABLE"),
    }
}

fn stdout_error(source: io::Error) -> Error {
    Error::Output {
        path: PathBuf::from("<stdout>"),
        source,
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(stdout_error)
}

/// Stages every artifact in a temporary file next to its destination and
/// only then moves them into place, so a failure while rendering or staging
/// leaves no output behind.
fn write_all_or_nothing(artifacts: &[(&Path, String)]) -> Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for (path, contents) in artifacts {
        let output_error = |source| Error::Output {
            path: path.to_path_buf(),
            source,
        };
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir).map_err(output_error)?;
        file.write_all(contents.as_bytes()).map_err(output_error)?;
        file.flush().map_err(output_error)?;
        staged.push((file, *path));
    }

    for (file, path) in staged {
        file.persist(path).map_err(|e| Error::Output {
            path: path.to_path_buf(),
            source: e.error,
        })?;
    }
    Ok(())
}

/// Allocated and resident memory in MiB, as reported by jemalloc.
fn memory_usage() -> Option<(f64, f64)> {
    const MIB: f64 = 1024.0 * 1024.0;
    epoch::advance().ok()?;
    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;
    Some((allocated as f64 / MIB, resident as f64 / MIB))
}

fn stat_line(label: &str, value: impl std::fmt::Display) {
    eprintln!("|  {label:<28} {value:>18}  |");
}

fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    eprintln!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

fn print_stats(computation: &Computation, backbone: &Backbone, simplified: &Cnf) {
    let cnf = &computation.dimacs.cnf;
    let s = &computation.stats;
    let elapsed = s.elapsed.as_secs_f64();

    eprintln!("\n=======================[ Problem Statistics ]=========================");
    stat_line(
        "Parse time (s)",
        format!("{:.3}", computation.parse_time.as_secs_f64()),
    );
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.num_literals());

    eprintln!("=======================[ Backbone Statistics ]========================");
    stat_line("Candidates", s.candidates);
    stat_line_with_rate("Oracle calls", s.oracle_calls, elapsed);
    stat_line("SAT answers", s.sat_answers);
    stat_line("UNSAT answers", s.unsat_answers);
    stat_line("Pruned candidates", s.pruned);
    stat_line("Backbone size", backbone.len());
    stat_line("Clauses (simplified)", simplified.len());
    if let Some((allocated, resident)) = memory_usage() {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed:.3}"));
    eprintln!("=====================================================================");
}
