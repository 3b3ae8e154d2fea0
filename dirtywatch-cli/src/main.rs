//! dirtywatch command-line tool
//!
//! Usage:
//!   dirtywatch demo [--start-millis 1700000000000] [--dump]
//!   dirtywatch diff [--schema schema.json] --before a.json --after b.json
//!
//! Output goes to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dirtywatch_cli::{diff_files, run_demo};
use dirtywatch_types::Timestamp;
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "dirtywatch")]
#[command(about = "Snapshot-based dirty field tracking with managed timestamps")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a Tutorial through insert, update and reload
    Demo {
        /// Start the clock at this Unix time in milliseconds
        #[arg(long)]
        start_millis: Option<i64>,

        /// Include the in-memory store contents in the output
        #[arg(long)]
        dump: bool,
    },
    /// Print the dirty fields between two JSON records
    Diff {
        /// Schema file (defaults to the built-in Tutorial schema)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Record as loaded
        #[arg(long)]
        before: PathBuf,

        /// Record after changes
        #[arg(long)]
        after: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    } else {
        let log_level = if verbose { Level::DEBUG } else { Level::INFO };
        FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    debug!("{:?}", args.command);

    let output = match args.command {
        Command::Demo { start_millis, dump } => {
            let start = start_millis
                .map(Timestamp::from_millis)
                .transpose()
                .context("invalid --start-millis")?;
            serde_json::to_value(run_demo(start, dump)?)?
        }
        Command::Diff { schema, before, after } => {
            serde_json::to_value(diff_files(schema.as_deref(), &before, &after)?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
