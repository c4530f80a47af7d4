//! Locating the seven snapshot files.

use std::path::{Path, PathBuf};

use marquee_core::dataset::Dataset;
use strum::IntoEnumIterator as _;
use tracing::debug;

use crate::{Error, Result};

/// One resolved file per dataset.
#[derive(Debug, Clone)]
pub struct Sources {
  paths: Vec<PathBuf>,
}

impl Sources {
  /// Resolve every dataset under `dir`, preferring `<stem>.tsv.gz` over
  /// `<stem>.tsv`. Fails on the first dataset with neither.
  pub fn discover(dir: &Path) -> Result<Self> {
    let paths = Dataset::iter()
      .map(|dataset| {
        let stem = dataset.file_stem();
        let gz = dir.join(format!("{stem}.tsv.gz"));
        let plain = dir.join(format!("{stem}.tsv"));
        let path = if gz.is_file() {
          gz
        } else if plain.is_file() {
          plain
        } else {
          return Err(Error::MissingSource { dataset, stem, dir: dir.to_path_buf() });
        };
        debug!(%dataset, path = %path.display(), "source resolved");
        Ok(path)
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { paths })
  }

  pub fn path(&self, dataset: Dataset) -> &Path { &self.paths[dataset as usize] }
}
