//! Full-rebuild loader for the IMDb snapshot datasets.
//!
//! [`run`] reads the schema script, discovers the seven source files, creates
//! a fresh store and drives the [`Sequencer`] through every stage.

pub mod config;
pub mod error;
pub mod progress;
pub mod report;
mod rows;
pub mod sequencer;
pub mod sources;

use std::fs;

use marquee_store_sqlite::BulkLoadSession;
use tracing::info;

pub use config::LoaderConfig;
pub use error::{Error, Result};
pub use progress::Progress;
pub use report::{LoadReport, StageReport, TableCount};
pub use sequencer::{Sequencer, Stage};
pub use sources::Sources;

/// Rebuild the store described by `config` from scratch.
pub fn run(config: &LoaderConfig) -> Result<LoadReport> {
  let schema = fs::read_to_string(&config.schema_path).map_err(|source| {
    Error::Schema { path: config.schema_path.clone(), source }
  })?;
  let sources = Sources::discover(&config.data_dir)?;

  let mut session = BulkLoadSession::create(&config.db_path).map_err(Error::store)?;

  let mut report = {
    let mut sequencer =
      Sequencer::new(&mut session, &sources, Progress::new(config.progress))
        .verify_foreign_keys(config.verify_foreign_keys);
    sequencer.run(&schema)?
  };

  report.tables = session
    .row_counts()
    .map_err(Error::store)?
    .into_iter()
    .map(|(table, rows)| TableCount { table: table.name().to_owned(), rows })
    .collect();

  if let Some(path) = &config.report_path {
    report.write_json(path)?;
    info!(path = %path.display(), "load report written");
  }

  Ok(report)
}
