//! fleetbook-init binary.
//!
//! Opens the store named in `fleetbook.toml` (or the path given with
//! `--config`), which creates or upgrades the normalized tables, then runs
//! the legacy migration once. Exits non-zero if the migration aborts.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use fleetbook_migrate::{MigrationOutcome, settings::InitConfig};
use fleetbook_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Initialise a Fleetbook store and migrate legacy data")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fleetbook.toml")]
  config: PathBuf,

  /// Print the migration report as JSON on stdout.
  #[arg(long)]
  json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = InitConfig::load(&cli.config).context("failed to load configuration")?;
  let store_path = cfg.resolved_store_path();

  // The session lives only as long as this block.
  let outcome = {
    let store = SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?;
    tracing::info!(path = ?store_path, "normalized schema ready");

    fleetbook_migrate::migrate(&store).await
  };

  if cli.json {
    let json = serde_json::to_string_pretty(outcome.report())
      .context("failed to serialise migration report")?;
    println!("{json}");
  }

  match outcome {
    MigrationOutcome::Aborted { last_state, error, .. } => {
      Err(anyhow::Error::new(error).context(format!("migration aborted after {last_state}")))
    }
    MigrationOutcome::NothingToMigrate(_) | MigrationOutcome::Completed(_) => Ok(()),
  }
}
