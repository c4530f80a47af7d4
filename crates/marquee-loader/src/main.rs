//! `marquee` : rebuild the IMDb SQLite store from the snapshot files.
//!
//! Reads `marquee.toml` (or the path given with `--config`), deletes any
//! existing store, and loads all seven datasets in order.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use marquee_loader::LoaderConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rebuild the IMDb SQLite store from snapshot files")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "marquee.toml")]
  config: PathBuf,
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = LoaderConfig::load(&cli.config)
    .with_context(|| format!("failed to read configuration {:?}", cli.config))?;

  let report = marquee_loader::run(&config)
    .with_context(|| format!("failed to build store at {:?}", config.db_path))?;

  for table in &report.tables {
    tracing::info!(table = %table.table, rows = table.rows, "table loaded");
  }
  tracing::info!(
    elapsed_ms = report.elapsed_ms,
    dangling = report.dangling.len(),
    "store rebuilt at {}",
    config.db_path.display()
  );

  Ok(())
}
