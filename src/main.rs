//! pyidb: inspect interface type databases
//!
//! Loads a directory of `.idb` module records (optionally with an overlay
//! directory on top) and prints what the resolver made of it.
//!
//! ## Example Usage
//!
//! ```bash
//! # List every module, marking which side of an overlay it came from
//! pyidb --db ./stdlib --overlay ./site modules
//!
//! # Show a module's members
//! pyidb --db ./stdlib module os
//!
//! # Inspect one member, pinned to a target version
//! pyidb --db ./stdlib --target-version 3.6 member builtins len --json
//!
//! # Load statistics and modules that failed to decode
//! pyidb --db ./stdlib stats
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{view::ViewTarget, DbArgs};

#[derive(Parser)]
#[command(
    name = "pyidb",
    author,
    version,
    about = "Inspect interface type databases",
    long_about = "Loads an interface type database, resolves every cross-module reference,\n\
                  and prints modules, members, builtin type names and load statistics."
)]
struct Cli {
    #[command(subcommand)]
    command: ViewTarget,

    #[command(flatten)]
    db: DbArgs,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(long, short, global = true)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let Cli {
        command,
        db,
        json,
        verbose,
    } = Cli::parse();
    init_logging(verbose);

    let database = db.open()?;
    command.execute(&database, json)
}
