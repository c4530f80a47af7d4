//! Destination tables and the insert policy each one is loaded with.

use std::{collections::HashMap, sync::LazyLock};

use marquee_core::sink::InsertOutcome;
use rusqlite::{Connection, ErrorCode, Params};
use strum::{Display, EnumIter, IntoEnumIterator as _, IntoStaticStr};

use crate::{Error, Result};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// How a table reacts to a row whose key is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPolicy {
  /// Drop the new row silently.
  IgnoreDuplicate,
  /// Overwrite the existing row's non-key columns.
  Replace,
  /// No guard; a collision is a fatal [`Error::ConstraintViolation`].
  PlainInsert,
}

impl InsertPolicy {
  pub fn verb(self) -> &'static str {
    match self {
      Self::IgnoreDuplicate => "INSERT OR IGNORE",
      Self::Replace => "INSERT OR REPLACE",
      Self::PlainInsert => "INSERT",
    }
  }
}

// ─── Catalogue ───────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr,
)]
pub enum Table {
  #[strum(serialize = "FACT_TITLES")]
  Titles,
  #[strum(serialize = "DIM_GENRES")]
  Genres,
  #[strum(serialize = "DIM_TITLE_GENRES")]
  TitleGenres,
  #[strum(serialize = "FACT_NAMES")]
  Names,
  #[strum(serialize = "DIM_PROFESSIONS")]
  Professions,
  #[strum(serialize = "DIM_NAME_PROFESSIONS")]
  NameProfessions,
  #[strum(serialize = "DIM_KNOWN_FOR_TITLES")]
  KnownForTitles,
  #[strum(serialize = "DIM_TITLE_AKAS")]
  TitleAkas,
  #[strum(serialize = "DIM_AKAS_TYPES")]
  AkaTypes,
  #[strum(serialize = "DIM_TITLE_AKAS_TYPES")]
  TitleAkaTypes,
  #[strum(serialize = "DIM_AKAS_ATTRIBUTES")]
  AkaAttributes,
  #[strum(serialize = "DIM_TITLE_AKAS_ATTRIBUTES")]
  TitleAkaAttributes,
  #[strum(serialize = "DIM_EPISODES")]
  Episodes,
  #[strum(serialize = "DIM_TITLE_DIRECTORS")]
  TitleDirectors,
  #[strum(serialize = "DIM_TITLE_WRITERS")]
  TitleWriters,
  #[strum(serialize = "DIM_TITLE_PRINCIPALS")]
  TitlePrincipals,
  #[strum(serialize = "DIM_TITLE_RATINGS")]
  TitleRatings,
}

impl Table {
  pub fn name(self) -> &'static str { self.into() }

  /// Columns written on insert, in parameter order.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Self::Titles => &[
        "tconst",
        "title_type",
        "primary_title",
        "original_title",
        "is_adult",
        "start_year",
        "end_year",
        "runtime_minutes",
      ],
      Self::Genres | Self::Professions | Self::AkaTypes | Self::AkaAttributes => {
        &["name"]
      }
      Self::TitleGenres => &["tconst", "genre_id"],
      Self::Names => &["nconst", "primary_name", "birth_year", "death_year"],
      Self::NameProfessions => &["nconst", "profession_id"],
      Self::KnownForTitles => &["nconst", "tconst"],
      Self::TitleAkas => &[
        "tconst",
        "ordering",
        "title",
        "region",
        "language",
        "is_original_title",
      ],
      Self::TitleAkaTypes => &["akas_id", "type_id"],
      Self::TitleAkaAttributes => &["akas_id", "attribute_id"],
      Self::Episodes => {
        &["tconst", "parent_tconst", "season_number", "episode_number"]
      }
      Self::TitleDirectors | Self::TitleWriters => &["tconst", "nconst"],
      Self::TitlePrincipals => {
        &["tconst", "ordering", "nconst", "category", "job", "characters"]
      }
      Self::TitleRatings => &["tconst", "average_rating", "num_votes"],
    }
  }

  pub fn policy(self) -> InsertPolicy {
    match self {
      Self::TitleRatings => InsertPolicy::Replace,
      // Assumed unique in the source; a collision aborts the run.
      Self::TitleAkas | Self::TitlePrincipals => InsertPolicy::PlainInsert,
      _ => InsertPolicy::IgnoreDuplicate,
    }
  }

  pub fn insert_sql(self) -> &'static str {
    INSERT_SQL
      .get(&self)
      .map(String::as_str)
      .unwrap_or_default()
  }
}

static INSERT_SQL: LazyLock<HashMap<Table, String>> = LazyLock::new(|| {
  Table::iter()
    .map(|table| {
      let columns = table.columns();
      let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
      let sql = format!(
        "{} INTO {} ({}) VALUES ({placeholders})",
        table.policy().verb(),
        table.name(),
        columns.join(", "),
      );
      (table, sql)
    })
    .collect()
});

// ─── Execution ───────────────────────────────────────────────────────────────

/// Insert one row into `table` under the table's policy.
pub(crate) fn insert<P: Params>(
  conn: &Connection,
  table: Table,
  params: P,
) -> Result<InsertOutcome> {
  let mut stmt = conn.prepare_cached(table.insert_sql())?;
  match stmt.execute(params) {
    Ok(0) => Ok(InsertOutcome::Ignored),
    Ok(_) => Ok(InsertOutcome::Written),
    Err(source)
      if table.policy() == InsertPolicy::PlainInsert
        && source.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) =>
    {
      Err(Error::ConstraintViolation { table: table.name(), source })
    }
    Err(e) => Err(e.into()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_ratings_replace() {
    let replacing: Vec<_> = Table::iter()
      .filter(|t| t.policy() == InsertPolicy::Replace)
      .collect();
    assert_eq!(replacing, [Table::TitleRatings]);
  }

  #[test]
  fn akas_and_principals_are_plain_inserts() {
    let plain: Vec<_> = Table::iter()
      .filter(|t| t.policy() == InsertPolicy::PlainInsert)
      .collect();
    assert_eq!(plain, [Table::TitleAkas, Table::TitlePrincipals]);
  }

  #[test]
  fn insert_sql_follows_policy() {
    assert_eq!(
      Table::TitleRatings.insert_sql(),
      "INSERT OR REPLACE INTO DIM_TITLE_RATINGS (tconst, average_rating, num_votes) \
       VALUES (?1, ?2, ?3)"
    );
    assert_eq!(
      Table::Genres.insert_sql(),
      "INSERT OR IGNORE INTO DIM_GENRES (name) VALUES (?1)"
    );
    assert!(Table::TitlePrincipals.insert_sql().starts_with("INSERT INTO "));
  }

  #[test]
  fn every_table_has_sql() {
    assert_eq!(Table::iter().count(), 17);
    assert!(Table::iter().all(|t| !t.insert_sql().is_empty()));
  }
}
