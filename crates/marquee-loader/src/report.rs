//! What a load did, stage by stage.

use std::{
  fs,
  path::{Path, PathBuf},
  time::Instant,
};

use marquee_core::{dataset::Dataset, sink::{DanglingReference, InsertOutcome}};
use serde::Serialize;

use crate::{Error, Result, sequencer::Stage};

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
  pub stage:      Stage,
  pub dataset:    Dataset,
  pub source:     PathBuf,
  /// Source rows read.
  pub records:    u64,
  /// Rows inserted or replaced, across every table the stage touches.
  pub written:    u64,
  /// Inserts dropped as duplicates.
  pub ignored:    u64,
  pub elapsed_ms: u64,
}

impl StageReport {
  pub fn new(stage: Stage, dataset: Dataset, source: &Path) -> Self {
    Self {
      stage,
      dataset,
      source: source.to_path_buf(),
      records: 0,
      written: 0,
      ignored: 0,
      elapsed_ms: 0,
    }
  }

  pub fn tally(&mut self, outcome: InsertOutcome) {
    match outcome {
      InsertOutcome::Written => self.written += 1,
      InsertOutcome::Ignored => self.ignored += 1,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
  pub table: String,
  pub rows:  u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
  pub stages:     Vec<StageReport>,
  pub tables:     Vec<TableCount>,
  pub dangling:   Vec<DanglingReference>,
  pub elapsed_ms: u64,
}

impl LoadReport {
  pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
    self.stages.iter().find(|s| s.stage == stage)
  }

  pub fn write_json(&self, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(self)?;
    fs::write(path, json).map_err(|source| Error::Io { path: path.to_path_buf(), source })
  }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
  u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
