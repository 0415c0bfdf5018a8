//! # shapecheck CLI entry point
//!
//! Parses command-line arguments, initialises tracing, and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shapecheck_cli::list::{run_list, ListArgs};
use shapecheck_cli::validate::{run_validate, ValidateArgs};
use shapecheck_cli::EXIT_ERROR;

/// Validate JSON and YAML documents against declarative schemas.
#[derive(Parser, Debug)]
#[command(name = "shapecheck", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents against a registered schema.
    Validate(ValidateArgs),

    /// List the schema ids found in a schema directory.
    List(ListArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "shapecheck starting");

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &mut stdout),
        Commands::List(args) => run_list(&args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
