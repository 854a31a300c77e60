//! modsplit - scheduled batch runner for repository split jobs
//!
//! Runs every job in the builtin catalog once: clone the source repository,
//! derive a mode-specific engine configuration, and hand off to the external
//! splitting engine. Exits non-zero when any engine invocation fails or when
//! flag validation fails before the batch starts.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use modsplit_core::{Catalog, GitCliFetcher, ModulariseEngine, RunContext, Scheduler};

#[derive(Parser)]
#[command(name = "modsplit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the catalog of repository split jobs", long_about = None)]
struct Cli {
    /// Run all jobs but do not push any content to remote repositories
    #[arg(long)]
    dry_run: bool,

    /// Path to the private key used for SSH push authentication
    /// (historically named after the engine's credential field)
    #[arg(long = "pub-key", value_name = "PATH")]
    pub_key: Option<PathBuf>,

    /// Print verbose output; forces jobs to run one at a time
    #[arg(long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if !cli.dry_run && cli.pub_key.is_none() {
        bail!("--pub-key must be set when not running with --dry-run");
    }

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let catalog = Catalog::builtin().context("invalid builtin job catalog")?;
    let ctx = RunContext {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        key_path: cli.pub_key,
    };

    let scheduler = Scheduler::new(
        ctx,
        Arc::new(GitCliFetcher),
        Arc::new(ModulariseEngine::default()),
    );
    let report = scheduler.run(&catalog).await;

    Ok(ExitCode::from(report.exit_code()))
}

/// Configure the global subscriber with an `EnvFilter` and optional JSON
/// formatting. `RUST_LOG` overrides the flag-derived default level.
fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}
