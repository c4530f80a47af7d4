//! The seven snapshot datasets and their header contracts.

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

/// One of the source snapshot files, in load order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr,
  Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
  Titles,
  Names,
  Akas,
  Episodes,
  Crew,
  Principals,
  Ratings,
}

impl Dataset {
  /// File name without the `.tsv` / `.tsv.gz` extension.
  pub fn file_stem(self) -> &'static str {
    match self {
      Self::Titles => "title.basics",
      Self::Names => "name.basics",
      Self::Akas => "title.akas",
      Self::Episodes => "title.episode",
      Self::Crew => "title.crew",
      Self::Principals => "title.principals",
      Self::Ratings => "title.ratings",
    }
  }

  /// Header columns the record parser relies on. Extra columns are allowed.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Self::Titles => &[
        "tconst",
        "titleType",
        "primaryTitle",
        "originalTitle",
        "isAdult",
        "startYear",
        "endYear",
        "runtimeMinutes",
        "genres",
      ],
      Self::Names => &[
        "nconst",
        "primaryName",
        "birthYear",
        "deathYear",
        "primaryProfession",
        "knownForTitles",
      ],
      Self::Akas => &[
        "titleId",
        "ordering",
        "title",
        "region",
        "language",
        "types",
        "attributes",
        "isOriginalTitle",
      ],
      Self::Episodes => {
        &["tconst", "parentTconst", "seasonNumber", "episodeNumber"]
      }
      Self::Crew => &["tconst", "directors", "writers"],
      Self::Principals => {
        &["tconst", "ordering", "nconst", "category", "job", "characters"]
      }
      Self::Ratings => &["tconst", "averageRating", "numVotes"],
    }
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn seven_datasets_in_load_order() {
    let order: Vec<_> = Dataset::iter().collect();
    assert_eq!(order.len(), 7);
    assert_eq!(order.first(), Some(&Dataset::Titles));
    assert_eq!(order.last(), Some(&Dataset::Ratings));
  }

  #[test]
  fn stems_are_distinct() {
    let mut stems: Vec<_> = Dataset::iter().map(Dataset::file_stem).collect();
    stems.sort_unstable();
    stems.dedup();
    assert_eq!(stems.len(), 7);
  }

  #[test]
  fn display_is_snake_case() {
    assert_eq!(Dataset::Principals.to_string(), "principals");
  }
}
