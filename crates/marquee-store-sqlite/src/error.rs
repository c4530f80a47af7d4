//! Error type for `marquee-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// A plain-insert table received a row colliding with an existing key.
  #[error("constraint violation in {table}: {source}")]
  ConstraintViolation {
    table:  &'static str,
    #[source]
    source: rusqlite::Error,
  },

  #[error("failed to remove {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("a batch is already open")]
  BatchAlreadyOpen,

  #[error("no batch is open")]
  NoOpenBatch,

  #[error("cannot finalize while a batch is open")]
  FinalizeWithOpenBatch,

  /// The dimension row was inserted (or already present) but the lookup by
  /// name found nothing.
  #[error("{name:?} missing from {table} after insert")]
  DimensionVanished { table: &'static str, name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
