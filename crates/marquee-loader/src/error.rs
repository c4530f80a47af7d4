//! Error type for `marquee-loader`.

use std::path::PathBuf;

use marquee_core::dataset::Dataset;
use thiserror::Error;

use crate::sequencer::Stage;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("config error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("record error: {0}")]
  Record(#[from] marquee_core::Error),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  /// A store error raised while applying one source row.
  #[error("line {line}: store error: {source}")]
  Row {
    line:   u64,
    #[source]
    source: BoxError,
  },

  #[error("no {stem}.tsv or {stem}.tsv.gz for {dataset} in {}", .dir.display())]
  MissingSource {
    dataset: Dataset,
    stem:    &'static str,
    dir:     PathBuf,
  },

  #[error("failed to read schema {}: {source}", .path.display())]
  Schema {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The stage that was being entered when the run aborted.
  #[error("{stage} failed: {source}")]
  Stage {
    stage:  Stage,
    #[source]
    source: Box<Error>,
  },

  #[error("sequencer is in terminal state {0}")]
  Terminal(Stage),

  #[error("failed to write {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }

  /// The innermost error, skipping stage wrappers.
  pub fn root(&self) -> &Error {
    match self {
      Self::Stage { source, .. } => source.root(),
      other => other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
