//! Relay CLI: runs handshake adder scenarios from a `relay.toml` file.
//!
//! Provides `relay run` for executing configured scenarios and `relay list`
//! for showing what is configured.

#![warn(missing_docs)]

mod list;
mod project;
mod run;

use std::process;

use clap::{Parser, Subcommand};

/// Relay: a cycle-level ready/valid adder bench.
#[derive(Parser, Debug)]
#[command(name = "relay", version, about = "Handshake adder bench runner")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `relay.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run configured scenarios.
    Run(RunArgs),
    /// List configured scenarios.
    List,
}

/// Arguments for the `relay run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Specific scenario to run (optional).
    pub name: Option<String>,

    /// Substring filter for scenario names.
    #[arg(long)]
    pub filter: Option<String>,

    /// Disable waveform recording even if `relay.toml` enables it.
    #[arg(long)]
    pub no_waveform: bool,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file or project directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::List => list::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Picks the default log level from `-q`/`-v`; `RUST_LOG` still wins.
fn log_level(global: &GlobalArgs) -> log::LevelFilter {
    if global.quiet {
        log::LevelFilter::Error
    } else if global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    }
}

fn init_logging(global: &GlobalArgs) {
    env_logger::Builder::new()
        .filter_level(log_level(global))
        .parse_default_env()
        .init();
}
