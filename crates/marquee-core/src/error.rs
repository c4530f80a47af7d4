//! Error types for `marquee-core`.

use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::Dataset;

#[derive(Debug, Error)]
pub enum Error {
  /// A row could not be turned into the dataset's typed record.
  #[error("{dataset} line {line}: {reason}")]
  MalformedRecord {
    dataset: Dataset,
    line:    u64,
    reason:  String,
  },

  #[error("{dataset}: header is missing column {column:?}")]
  MissingColumn {
    dataset: Dataset,
    column:  &'static str,
  },

  #[error("failed to open {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{dataset}: tsv error: {source}")]
  Csv {
    dataset: Dataset,
    #[source]
    source:  csv::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
