//! The stage sequencer: a strictly linear state machine over the load.
//!
//! `Idle → SchemaInit → LoadTitles → … → LoadRatings → Finalize → Done`, with
//! any failure landing in `Aborted`. Load stages depend only on the schema
//! being in place; cross-table references are not checked until `Finalize`.

use std::time::Instant;

use marquee_core::{dataset::Dataset, record::TsvReader, sink::CatalogSink};
use serde::Serialize;
use strum::Display;
use tracing::{error, info};

use crate::{
  Error, Progress, Result, Sources,
  report::{LoadReport, StageReport, elapsed_ms},
  rows,
};

/// Records between progress bar refreshes.
const PROGRESS_STEP: u64 = 4096;

// ─── Stage ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Idle,
  SchemaInit,
  LoadTitles,
  LoadNames,
  LoadAkas,
  LoadEpisodes,
  LoadCrew,
  LoadPrincipals,
  LoadRatings,
  Finalize,
  Done,
  Aborted,
}

impl Stage {
  /// The only legal successor. `None` for the terminal states.
  pub fn next(self) -> Option<Self> {
    match self {
      Self::Idle => Some(Self::SchemaInit),
      Self::SchemaInit => Some(Self::LoadTitles),
      Self::LoadTitles => Some(Self::LoadNames),
      Self::LoadNames => Some(Self::LoadAkas),
      Self::LoadAkas => Some(Self::LoadEpisodes),
      Self::LoadEpisodes => Some(Self::LoadCrew),
      Self::LoadCrew => Some(Self::LoadPrincipals),
      Self::LoadPrincipals => Some(Self::LoadRatings),
      Self::LoadRatings => Some(Self::Finalize),
      Self::Finalize => Some(Self::Done),
      Self::Done | Self::Aborted => None,
    }
  }

  /// The dataset a load stage reads.
  pub fn dataset(self) -> Option<Dataset> {
    match self {
      Self::LoadTitles => Some(Dataset::Titles),
      Self::LoadNames => Some(Dataset::Names),
      Self::LoadAkas => Some(Dataset::Akas),
      Self::LoadEpisodes => Some(Dataset::Episodes),
      Self::LoadCrew => Some(Dataset::Crew),
      Self::LoadPrincipals => Some(Dataset::Principals),
      Self::LoadRatings => Some(Dataset::Ratings),
      _ => None,
    }
  }

  pub fn is_terminal(self) -> bool { self.next().is_none() }
}

// ─── Sequencer ───────────────────────────────────────────────────────────────

/// Drives one full load into a [`CatalogSink`].
pub struct Sequencer<'a, S: CatalogSink> {
  sink:                &'a mut S,
  sources:             &'a Sources,
  progress:            Progress,
  verify_foreign_keys: bool,
  state:               Stage,
  report:              LoadReport,
}

impl<'a, S: CatalogSink> Sequencer<'a, S> {
  pub fn new(sink: &'a mut S, sources: &'a Sources, progress: Progress) -> Self {
    Self {
      sink,
      sources,
      progress,
      verify_foreign_keys: true,
      state: Stage::Idle,
      report: LoadReport::default(),
    }
  }

  /// Whether `Finalize` reports dangling references. On by default.
  pub fn verify_foreign_keys(mut self, verify: bool) -> Self {
    self.verify_foreign_keys = verify;
    self
  }

  pub fn state(&self) -> Stage { self.state }

  /// Step from the current state to `Done`, applying `schema` at
  /// `SchemaInit`. Any failure moves the sequencer to `Aborted`; there is no
  /// retry. Calling this again once `Done` or `Aborted` is an error.
  pub fn run(&mut self, schema: &str) -> Result<LoadReport> {
    if self.state.is_terminal() {
      return Err(Error::Terminal(self.state));
    }
    let started = Instant::now();

    while let Some(next) = self.state.next() {
      if let Err(source) = self.enter(next, schema) {
        error!(stage = %next, error = %source, "load aborted");
        self.state = Stage::Aborted;
        return Err(Error::Stage { stage: next, source: Box::new(source) });
      }
      self.state = next;
    }

    self.report.elapsed_ms = elapsed_ms(started);
    info!(elapsed_ms = self.report.elapsed_ms, "load complete");
    Ok(std::mem::take(&mut self.report))
  }

  fn enter(&mut self, stage: Stage, schema: &str) -> Result<()> {
    match (stage, stage.dataset()) {
      (_, Some(dataset)) => self.load(stage, dataset),
      (Stage::SchemaInit, _) => self.sink.initialize(schema).map_err(Error::store),
      (Stage::Finalize, _) => {
        let finalized = self
          .sink
          .finalize(self.verify_foreign_keys)
          .map_err(Error::store)?;
        self.report.dangling = finalized.dangling;
        Ok(())
      }
      _ => Ok(()),
    }
  }

  /// Apply one source file inside a single batch, rows in file order.
  fn load(&mut self, stage: Stage, dataset: Dataset) -> Result<()> {
    let path = self.sources.path(dataset);
    let started = Instant::now();
    info!(%stage, path = %path.display(), "stage started");

    let mut reader = TsvReader::open(path, dataset)?;
    let bar = self.progress.stage(stage);
    let mut report = StageReport::new(stage, dataset, path);

    self.sink.begin_batch().map_err(Error::store)?;
    while let Some(record) = reader.next_record()? {
      rows::apply(&mut *self.sink, &record, &mut report)?;
      report.records += 1;
      if report.records % PROGRESS_STEP == 0 {
        bar.set_position(report.records);
      }
    }
    self.sink.commit_batch().map_err(Error::store)?;

    bar.finish_and_clear();
    report.elapsed_ms = elapsed_ms(started);
    info!(
      %stage,
      records = report.records,
      written = report.written,
      ignored = report.ignored,
      elapsed_ms = report.elapsed_ms,
      "stage committed"
    );
    self.report.stages.push(report);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stages_form_one_line() {
    let mut seen = vec![Stage::Idle];
    let mut stage = Stage::Idle;
    while let Some(next) = stage.next() {
      seen.push(next);
      stage = next;
    }
    assert_eq!(
      seen,
      [
        Stage::Idle,
        Stage::SchemaInit,
        Stage::LoadTitles,
        Stage::LoadNames,
        Stage::LoadAkas,
        Stage::LoadEpisodes,
        Stage::LoadCrew,
        Stage::LoadPrincipals,
        Stage::LoadRatings,
        Stage::Finalize,
        Stage::Done,
      ]
    );
  }

  #[test]
  fn aborted_and_done_are_terminal() {
    assert!(Stage::Aborted.is_terminal());
    assert!(Stage::Done.is_terminal());
    assert!(!Stage::Finalize.is_terminal());
  }

  #[test]
  fn load_stages_cover_every_dataset_in_order() {
    let datasets: Vec<_> = std::iter::successors(Some(Stage::Idle), |s| s.next())
      .filter_map(Stage::dataset)
      .collect();
    assert_eq!(
      datasets,
      [
        Dataset::Titles,
        Dataset::Names,
        Dataset::Akas,
        Dataset::Episodes,
        Dataset::Crew,
        Dataset::Principals,
        Dataset::Ratings,
      ]
    );
  }

  #[test]
  fn stage_names_are_snake_case() {
    assert_eq!(Stage::LoadPrincipals.to_string(), "load_principals");
  }
}
