//! # backbone
//!
//! Command-line front end for backbone extraction. The backbone of a
//! satisfiable CNF formula is the set of literals true in every model; the
//! tool computes it, prints it as a `+name`/`-name` report and writes the
//! formula simplified by it.
//!
//! ## Usage
//!
//! ```sh
//! # Print the backbone report of a formula
//! backbone model.cnf
//!
//! # Write the report and the simplified formula
//! backbone file --input model.cnf --backbone model.backbone --output model.simplified.cnf
//!
//! # Ask an external solver instead of the built-in one, 30s per query
//! backbone file --input model.cnf --oracle external --solver-path kissat --query-timeout 30
//!
//! # Summarise every .cnf file below a directory
//! backbone dir --path benchmarks/
//!
//! # Plain SAT solving, competition output format
//! backbone solve model.cnf
//! ```
//!
//! Exit status: 0 on success, 20 if the input formula is unsatisfiable
//! (10/20 for `solve`), 1 on any error. Errors are printed to stderr as
//! `error [<kind>]: <message>` and no output file is written.

mod command_line;

use crate::command_line::cli::{process_dir, process_file, report_file, solve_file, Cli, Commands};
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug());

    let result = match cli.command {
        Some(Commands::File {
            input,
            backbone,
            output,
            common,
        }) => process_file(&input, backbone.as_deref(), output.as_deref(), &common),
        Some(Commands::Dir { path, common }) => Ok(process_dir(&path, &common)),
        Some(Commands::Solve { path, .. }) => solve_file(&path),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "backbone", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        None => match cli.path {
            Some(path) => report_file(&path, &cli.common),
            None => {
                let _ = Cli::command().print_help();
                return ExitCode::FAILURE;
            }
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.kind());
            ExitCode::FAILURE
        }
    }
}
