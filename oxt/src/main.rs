//! Oxt CLI - the build front-end for OX projects.
//!
//! This is the main entry point for the oxt CLI application. It uses clap
//! for argument parsing and dispatches to the command handlers in
//! `commands/`.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    build::{run_build, BuildArgs},
    init::{run_init, InitArgs},
    validate::run_validate,
};
use error::OxtError;

/// Oxt - build OX projects
///
/// Oxt discovers an `ox.config.*` file, compiles the project's entry
/// point, and reports the result. `validate` compiles without producing
/// anything.
#[derive(Parser, Debug)]
#[command(name = "oxt")]
#[command(author = "OX Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A CLI tool for building OX projects", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "OXT_VERBOSE")]
    verbose: bool,

    /// Path to a configuration file (default: discover ox.config.*)
    #[arg(short, long, global = true, env = "OXT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the oxt CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new OX project
    ///
    /// Creates an `ox.config.toml` and a starter entry file in the given
    /// (or current) directory.
    Init(InitCommand),

    /// Compile the project
    ///
    /// Compiles the configured entry point and prints a summary. An
    /// optional build script may be named; script execution is delegated
    /// to the host environment.
    Build(BuildCommand),

    /// Compile the project without building anything
    Validate,
}

/// Arguments for the init subcommand.
#[derive(Parser, Debug)]
struct InitCommand {
    /// Directory to initialize (default: current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Force initialization even if config files already exist
    #[arg(short, long)]
    force: bool,
}

/// Arguments for the build subcommand.
#[derive(Parser, Debug)]
struct BuildCommand {
    /// Optional build script to hand to the host after compilation
    script: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init(cmd) => run_init(InitArgs {
            path: cmd.path,
            force: cmd.force,
        }),
        Commands::Build(cmd) => run_build(BuildArgs {
            config: cli.config.clone(),
            script: cmd.script,
            verbose: cli.verbose,
        }),
        Commands::Validate => run_validate(cli.config.as_deref(), cli.verbose),
    };

    if let Err(error) = result {
        report_error(&error);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn report_error(error: &OxtError) {
    eprintln!("error: {error}");
}
