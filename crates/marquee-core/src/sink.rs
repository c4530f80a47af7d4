//! The `CatalogSink` trait and the small vocabulary it speaks.
//!
//! Implemented by storage backends (e.g. `marquee-store-sqlite`). The stage
//! sequencer depends on this abstraction, not on any concrete backend.

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::model::{Episode, Name, Principal, Rating, Title, TitleAka};

// ─── Vocabulary ──────────────────────────────────────────────────────────────

/// What an insert did to the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  /// A row was added, or replaced an older one.
  Written,
  /// A row with the same key already existed and the insert was dropped.
  Ignored,
}

/// A categorical attribute stored as a deduplicated dimension.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Dimension {
  Genre,
  Profession,
  AkaType,
  AkaAttribute,
}

/// Key of the entity that owns a dimension link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKey<'a> {
  /// A natural business identifier (`tt…`, `nm…`).
  Natural(&'a str),
  /// A store-generated surrogate (title akas).
  Surrogate(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CrewRole {
  Director,
  Writer,
}

/// Rows in `table` whose reference into `parent` resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
  pub table:  String,
  pub parent: String,
  pub rows:   u64,
}

/// What the sink found when it restored full constraint enforcement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FinalizeReport {
  pub dangling: Vec<DanglingReference>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Write side of a full catalogue load.
///
/// Calls arrive strictly in sequence from a single thread: `initialize` once,
/// then one `begin_batch` … `commit_batch` bracket per source file, then
/// `finalize` once.
pub trait CatalogSink {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Apply the schema script and relax durability for the bulk load.
  fn initialize(&mut self, schema: &str) -> Result<(), Self::Error>;

  /// Open the unit of work covering one source file.
  fn begin_batch(&mut self) -> Result<(), Self::Error>;

  /// Make the current unit of work durable.
  fn commit_batch(&mut self) -> Result<(), Self::Error>;

  fn insert_title(&mut self, title: &Title) -> Result<InsertOutcome, Self::Error>;

  fn insert_name(&mut self, name: &Name) -> Result<InsertOutcome, Self::Error>;

  /// Link a name to a title it is known for. The title need not exist.
  fn insert_known_for(
    &mut self,
    nconst: &str,
    tconst: &str,
  ) -> Result<InsertOutcome, Self::Error>;

  /// Insert an alternative title and return its surrogate id.
  ///
  /// There is no duplicate guard; a constraint failure is an error.
  fn insert_aka(&mut self, aka: &TitleAka) -> Result<i64, Self::Error>;

  fn insert_episode(&mut self, episode: &Episode) -> Result<InsertOutcome, Self::Error>;

  fn insert_credit(
    &mut self,
    role: CrewRole,
    tconst: &str,
    nconst: &str,
  ) -> Result<InsertOutcome, Self::Error>;

  /// Insert a principal credit. There is no duplicate guard; a constraint
  /// failure is an error.
  fn insert_principal(
    &mut self,
    principal: &Principal,
  ) -> Result<InsertOutcome, Self::Error>;

  /// Insert a rating, overwriting any earlier rating for the same title.
  fn upsert_rating(&mut self, rating: &Rating) -> Result<InsertOutcome, Self::Error>;

  /// Ensure the dimension value `token` exists, resolve its surrogate key and
  /// link `owner` to it. The returned outcome describes the link row.
  fn link_dimension(
    &mut self,
    dimension: Dimension,
    owner: OwnerKey<'_>,
    token: &str,
  ) -> Result<InsertOutcome, Self::Error>;

  /// Restore full constraint enforcement. With `verify`, also report the
  /// references the load left unresolved.
  fn finalize(&mut self, verify: bool) -> Result<FinalizeReport, Self::Error>;
}
