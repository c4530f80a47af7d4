//! Dimension resolution: ensure a named value exists, learn its surrogate
//! key, link the owning entity to it.

use std::collections::HashMap;

use marquee_core::sink::{Dimension, InsertOutcome, OwnerKey};
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;

use crate::{Error, Result, table::{Table, insert}};

/// Where a dimension's values and links live.
struct Layout {
  values:   Table,
  junction: Table,
  lookup:   &'static str,
}

fn layout(dimension: Dimension) -> Layout {
  match dimension {
    Dimension::Genre => Layout {
      values:   Table::Genres,
      junction: Table::TitleGenres,
      lookup:   "SELECT genre_id FROM DIM_GENRES WHERE name = ?1",
    },
    Dimension::Profession => Layout {
      values:   Table::Professions,
      junction: Table::NameProfessions,
      lookup:   "SELECT profession_id FROM DIM_PROFESSIONS WHERE name = ?1",
    },
    Dimension::AkaType => Layout {
      values:   Table::AkaTypes,
      junction: Table::TitleAkaTypes,
      lookup:   "SELECT type_id FROM DIM_AKAS_TYPES WHERE name = ?1",
    },
    Dimension::AkaAttribute => Layout {
      values:   Table::AkaAttributes,
      junction: Table::TitleAkaAttributes,
      lookup:   "SELECT attribute_id FROM DIM_AKAS_ATTRIBUTES WHERE name = ?1",
    },
  }
}

/// Name → surrogate key, per dimension, for the lifetime of a session.
///
/// Only an accelerator: a miss falls through to insert-if-absent plus lookup,
/// so the cache never changes what ends up in the store.
#[derive(Debug, Default)]
pub struct DimensionCache {
  keys: HashMap<Dimension, HashMap<String, i64>>,
}

impl DimensionCache {
  /// Number of values cached for `dimension`.
  pub fn len(&self, dimension: Dimension) -> usize {
    self.keys.get(&dimension).map_or(0, HashMap::len)
  }

  pub fn get(&self, dimension: Dimension, name: &str) -> Option<i64> {
    self.keys.get(&dimension)?.get(name).copied()
  }

  /// Make sure `name` exists in the dimension table and return its key.
  pub(crate) fn ensure_and_resolve(
    &mut self,
    conn: &Connection,
    dimension: Dimension,
    name: &str,
  ) -> Result<i64> {
    if let Some(id) = self.get(dimension, name) {
      return Ok(id);
    }

    let layout = layout(dimension);
    insert(conn, layout.values, params![name])?;
    let id: i64 = conn
      .prepare_cached(layout.lookup)?
      .query_row(params![name], |row| row.get(0))
      .optional()?
      .ok_or_else(|| Error::DimensionVanished {
        table: layout.values.name(),
        name:  name.to_owned(),
      })?;

    debug!(%dimension, name, id, "dimension value resolved");
    self
      .keys
      .entry(dimension)
      .or_default()
      .insert(name.to_owned(), id);
    Ok(id)
  }

  /// Resolve `name` and insert the `owner → name` junction row.
  pub(crate) fn link(
    &mut self,
    conn: &Connection,
    dimension: Dimension,
    owner: OwnerKey<'_>,
    name: &str,
  ) -> Result<InsertOutcome> {
    let id = self.ensure_and_resolve(conn, dimension, name)?;
    let junction = layout(dimension).junction;
    match owner {
      OwnerKey::Natural(key) => insert(conn, junction, params![key, id]),
      OwnerKey::Surrogate(key) => insert(conn, junction, params![key, id]),
    }
  }
}
