//! [`BulkLoadSession`] : the SQLite implementation of [`CatalogSink`].

use std::{
  ffi::OsString,
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use marquee_core::{
  model::{Episode, Name, Principal, Rating, Title, TitleAka},
  sink::{
    CatalogSink, CrewRole, DanglingReference, Dimension, FinalizeReport,
    InsertOutcome, OwnerKey,
  },
};
use rusqlite::{Connection, params};
use strum::IntoEnumIterator as _;
use tracing::{debug, info, warn};

use crate::{
  DimensionCache, Error, Result,
  table::{Table, insert},
};

/// Applied before the schema. Trades crash safety for insert throughput; a
/// crash mid-load leaves an unusable file that the next run deletes anyway.
const BULK_LOAD_PRAGMAS: &str = "
PRAGMA foreign_keys = OFF;
PRAGMA synchronous = OFF;
PRAGMA journal_mode = MEMORY;
PRAGMA temp_store = MEMORY;
";

// ─── Session ─────────────────────────────────────────────────────────────────

/// Exclusive owner of the destination store for one load run.
///
/// Dropping a session with a batch still open rolls that batch back.
pub struct BulkLoadSession {
  conn:       Connection,
  path:       Option<PathBuf>,
  dimensions: DimensionCache,
  batch_open: bool,
}

impl BulkLoadSession {
  /// Delete whatever store exists at `path` and open a fresh, empty one.
  pub fn create(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    discard(path)?;
    let conn = Connection::open(path)?;
    info!(path = %path.display(), "created fresh store");
    Ok(Self::with_connection(conn, Some(path.to_path_buf())))
  }

  /// Open an in-memory store, for tests.
  pub fn open_in_memory() -> Result<Self> {
    Ok(Self::with_connection(Connection::open_in_memory()?, None))
  }

  fn with_connection(conn: Connection, path: Option<PathBuf>) -> Self {
    conn.set_prepared_statement_cache_capacity(64);
    Self { conn, path, dimensions: DimensionCache::default(), batch_open: false }
  }

  pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

  pub fn dimensions(&self) -> &DimensionCache { &self.dimensions }

  /// Read access for reporting and tests. Never hand this to a second writer.
  pub fn connection(&self) -> &Connection { &self.conn }

  pub fn row_count(&self, table: Table) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count.unsigned_abs())
  }

  /// Row counts for every destination table, in catalogue order.
  pub fn row_counts(&self) -> Result<Vec<(Table, u64)>> {
    Table::iter()
      .map(|table| Ok((table, self.row_count(table)?)))
      .collect()
  }

  fn require_batch(&self) -> Result<()> {
    if self.batch_open { Ok(()) } else { Err(Error::NoOpenBatch) }
  }

  fn dangling_references(&self) -> Result<Vec<DanglingReference>> {
    let mut stmt = self.conn.prepare(
      "SELECT \"table\", parent, COUNT(*)
       FROM pragma_foreign_key_check
       GROUP BY \"table\", parent
       ORDER BY \"table\", parent",
    )?;
    let rows = stmt
      .query_map([], |row| {
        Ok(DanglingReference {
          table:  row.get(0)?,
          parent: row.get(1)?,
          rows:   row.get::<_, i64>(2)?.unsigned_abs(),
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }
}

impl Drop for BulkLoadSession {
  fn drop(&mut self) {
    if !self.conn.is_autocommit() {
      warn!("rolling back unfinished batch");
      if let Err(e) = self.conn.execute_batch("ROLLBACK") {
        warn!(error = %e, "rollback failed");
      }
    }
  }
}

/// Remove the store file and any journal sidecars left by an earlier run.
fn discard(path: &Path) -> Result<()> {
  let candidates = ["", "-journal", "-wal", "-shm"].map(|suffix| {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
  });

  for candidate in candidates {
    match fs::remove_file(&candidate) {
      Ok(()) => debug!(path = %candidate.display(), "removed previous store file"),
      Err(e) if e.kind() == ErrorKind::NotFound => {}
      Err(source) => return Err(Error::Io { path: candidate, source }),
    }
  }
  Ok(())
}

// ─── CatalogSink impl ────────────────────────────────────────────────────────

impl CatalogSink for BulkLoadSession {
  type Error = Error;

  fn initialize(&mut self, schema: &str) -> Result<()> {
    self.conn.execute_batch(BULK_LOAD_PRAGMAS)?;
    self.conn.execute_batch(schema)?;
    info!("schema applied; foreign keys and synchronous writes disabled");
    Ok(())
  }

  // ── Batches ───────────────────────────────────────────────────────────────

  fn begin_batch(&mut self) -> Result<()> {
    if self.batch_open {
      return Err(Error::BatchAlreadyOpen);
    }
    self.conn.execute_batch("BEGIN")?;
    self.batch_open = true;
    Ok(())
  }

  fn commit_batch(&mut self) -> Result<()> {
    self.require_batch()?;
    self.conn.execute_batch("COMMIT")?;
    self.batch_open = false;
    Ok(())
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  fn insert_title(&mut self, title: &Title) -> Result<InsertOutcome> {
    self.require_batch()?;
    insert(
      &self.conn,
      Table::Titles,
      params![
        title.tconst,
        title.title_type,
        title.primary_title,
        title.original_title,
        title.is_adult,
        title.start_year,
        title.end_year,
        title.runtime_minutes,
      ],
    )
  }

  fn insert_name(&mut self, name: &Name) -> Result<InsertOutcome> {
    self.require_batch()?;
    insert(
      &self.conn,
      Table::Names,
      params![name.nconst, name.primary_name, name.birth_year, name.death_year],
    )
  }

  fn insert_known_for(&mut self, nconst: &str, tconst: &str) -> Result<InsertOutcome> {
    self.require_batch()?;
    insert(&self.conn, Table::KnownForTitles, params![nconst, tconst])
  }

  fn insert_aka(&mut self, aka: &TitleAka) -> Result<i64> {
    self.require_batch()?;
    insert(
      &self.conn,
      Table::TitleAkas,
      params![
        aka.title_id,
        aka.ordering,
        aka.title,
        aka.region,
        aka.language,
        aka.is_original_title,
      ],
    )?;
    Ok(self.conn.last_insert_rowid())
  }

  fn insert_episode(&mut self, episode: &Episode) -> Result<InsertOutcome> {
    self.require_batch()?;
    insert(
      &self.conn,
      Table::Episodes,
      params![
        episode.tconst,
        episode.parent_tconst,
        episode.season_number,
        episode.episode_number,
      ],
    )
  }

  fn insert_credit(
    &mut self,
    role: CrewRole,
    tconst: &str,
    nconst: &str,
  ) -> Result<InsertOutcome> {
    self.require_batch()?;
    let table = match role {
      CrewRole::Director => Table::TitleDirectors,
      CrewRole::Writer => Table::TitleWriters,
    };
    insert(&self.conn, table, params![tconst, nconst])
  }

  fn insert_principal(&mut self, principal: &Principal) -> Result<InsertOutcome> {
    self.require_batch()?;
    insert(
      &self.conn,
      Table::TitlePrincipals,
      params![
        principal.tconst,
        principal.ordering,
        principal.nconst,
        principal.category,
        principal.job,
        principal.characters,
      ],
    )
  }

  fn upsert_rating(&mut self, rating: &Rating) -> Result<InsertOutcome> {
    self.require_batch()?;
    insert(
      &self.conn,
      Table::TitleRatings,
      params![rating.tconst, rating.average_rating, rating.num_votes],
    )
  }

  // ── Dimensions ────────────────────────────────────────────────────────────

  fn link_dimension(
    &mut self,
    dimension: Dimension,
    owner: OwnerKey<'_>,
    token: &str,
  ) -> Result<InsertOutcome> {
    self.require_batch()?;
    self.dimensions.link(&self.conn, dimension, owner, token)
  }

  // ── Finalize ──────────────────────────────────────────────────────────────

  fn finalize(&mut self, verify: bool) -> Result<FinalizeReport> {
    if self.batch_open {
      return Err(Error::FinalizeWithOpenBatch);
    }
    self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    info!("foreign key enforcement restored");

    if !verify {
      return Ok(FinalizeReport::default());
    }

    let dangling = self.dangling_references()?;
    for d in &dangling {
      warn!(table = %d.table, parent = %d.parent, rows = d.rows, "unresolved references");
    }
    Ok(FinalizeReport { dangling })
  }
}
