use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use pgdelta::{Catalog, Migration};
use tracing_subscriber::{EnvFilter, fmt};

/// Diff two schema snapshots and print the migration script.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Snapshot of the current schema (JSON)
    #[arg(long = "from", value_name = "FILE")]
    source: PathBuf,

    /// Snapshot of the desired schema (JSON)
    #[arg(long = "to", value_name = "FILE")]
    target: PathBuf,

    /// Allow destructive statements (DROP ...) in the output
    #[arg(long = "unsafe")]
    allow_unsafe: bool,

    /// Include GRANT/REVOKE changes
    #[arg(long)]
    with_privileges: bool,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli);

    let source = load_snapshot(&cli.source)?;
    let target = load_snapshot(&cli.target)?;

    let mut migration = Migration::new(&source, &target);
    migration.set_safety(!cli.allow_unsafe);
    migration.add_all_changes(cli.with_privileges)?;

    print!("{}", migration.sql()?);
    Ok(())
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_snapshot(path: &Path) -> Result<Catalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    Catalog::from_json(&raw).with_context(|| format!("parsing snapshot {}", path.display()))
}
