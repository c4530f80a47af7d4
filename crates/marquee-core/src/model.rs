//! Typed rows for each snapshot dataset.
//!
//! Every row is built from a [`Record`] with `from_record`; natural keys must
//! be present, numeric columns must parse, and no text field ever carries the
//! null sentinel.

use crate::{Result, record::Record};

// ─── title.basics ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Title {
  pub tconst:          String,
  pub title_type:      String,
  pub primary_title:   Option<String>,
  pub original_title:  Option<String>,
  pub is_adult:        bool,
  pub start_year:      Option<i64>,
  pub end_year:        Option<i64>,
  pub runtime_minutes: Option<i64>,
  pub genres:          Vec<String>,
}

impl Title {
  pub fn from_record(rec: &Record<'_>) -> Result<Self> {
    Ok(Self {
      tconst:          rec.required("tconst")?.to_owned(),
      title_type:      rec.required("titleType")?.to_owned(),
      primary_title:   owned(rec.text("primaryTitle")?),
      original_title:  owned(rec.text("originalTitle")?),
      is_adult:        rec.flag("isAdult")?,
      start_year:      rec.int("startYear")?,
      end_year:        rec.int("endYear")?,
      runtime_minutes: rec.int("runtimeMinutes")?,
      genres:          tokens(rec.list("genres")?),
    })
  }
}

// ─── name.basics ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Name {
  pub nconst:             String,
  pub primary_name:       Option<String>,
  pub birth_year:         Option<i64>,
  pub death_year:         Option<i64>,
  pub primary_profession: Vec<String>,
  /// Not required to reference a loaded title.
  pub known_for_titles:   Vec<String>,
}

impl Name {
  pub fn from_record(rec: &Record<'_>) -> Result<Self> {
    Ok(Self {
      nconst:             rec.required("nconst")?.to_owned(),
      primary_name:       owned(rec.text("primaryName")?),
      birth_year:         rec.int("birthYear")?,
      death_year:         rec.int("deathYear")?,
      primary_profession: tokens(rec.list("primaryProfession")?),
      known_for_titles:   tokens(rec.list("knownForTitles")?),
    })
  }
}

// ─── title.akas ──────────────────────────────────────────────────────────────

/// An alternative title. Its row identity is a store-generated surrogate,
/// not `(title_id, ordering)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleAka {
  pub title_id:          String,
  pub ordering:          i64,
  pub title:             Option<String>,
  pub region:            Option<String>,
  pub language:          Option<String>,
  pub is_original_title: bool,
  pub types:             Vec<String>,
  pub attributes:        Vec<String>,
}

impl TitleAka {
  pub fn from_record(rec: &Record<'_>) -> Result<Self> {
    Ok(Self {
      title_id:          rec.required("titleId")?.to_owned(),
      ordering:          required_int(rec, "ordering")?,
      title:             owned(rec.text("title")?),
      region:            owned(rec.text("region")?),
      language:          owned(rec.text("language")?),
      is_original_title: rec.flag("isOriginalTitle")?,
      types:             tokens(rec.list("types")?),
      attributes:        tokens(rec.list("attributes")?),
    })
  }
}

// ─── title.episode ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
  pub tconst:         String,
  pub parent_tconst:  String,
  pub season_number:  Option<i64>,
  pub episode_number: Option<i64>,
}

impl Episode {
  pub fn from_record(rec: &Record<'_>) -> Result<Self> {
    Ok(Self {
      tconst:         rec.required("tconst")?.to_owned(),
      parent_tconst:  rec.required("parentTconst")?.to_owned(),
      season_number:  rec.int("seasonNumber")?,
      episode_number: rec.int("episodeNumber")?,
    })
  }
}

// ─── title.crew ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Crew {
  pub tconst:    String,
  pub directors: Vec<String>,
  pub writers:   Vec<String>,
}

impl Crew {
  pub fn from_record(rec: &Record<'_>) -> Result<Self> {
    Ok(Self {
      tconst:    rec.required("tconst")?.to_owned(),
      directors: tokens(rec.list("directors")?),
      writers:   tokens(rec.list("writers")?),
    })
  }
}

// ─── title.principals ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
  pub tconst:     String,
  pub ordering:   i64,
  pub nconst:     String,
  pub category:   String,
  pub job:        Option<String>,
  pub characters: Option<String>,
}

impl Principal {
  pub fn from_record(rec: &Record<'_>) -> Result<Self> {
    Ok(Self {
      tconst:     rec.required("tconst")?.to_owned(),
      ordering:   required_int(rec, "ordering")?,
      nconst:     rec.required("nconst")?.to_owned(),
      category:   rec.required("category")?.to_owned(),
      job:        owned(rec.text("job")?),
      characters: owned(rec.text("characters")?),
    })
  }
}

// ─── title.ratings ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
  pub tconst:         String,
  pub average_rating: f64,
  pub num_votes:      i64,
}

impl Rating {
  pub fn from_record(rec: &Record<'_>) -> Result<Self> {
    let average_rating = rec
      .real("averageRating")?
      .ok_or_else(|| rec.malformed("averageRating is null"))?;
    Ok(Self {
      tconst: rec.required("tconst")?.to_owned(),
      average_rating,
      num_votes: required_int(rec, "numVotes")?,
    })
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn owned(value: Option<&str>) -> Option<String> { value.map(str::to_owned) }

fn tokens(list: Vec<&str>) -> Vec<String> {
  list.into_iter().map(str::to_owned).collect()
}

fn required_int(rec: &Record<'_>, column: &str) -> Result<i64> {
  rec
    .int(column)?
    .ok_or_else(|| rec.malformed(format!("{column} is null")))
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::{Error, dataset::Dataset, record::TsvReader};

  fn first<T>(
    dataset: Dataset,
    body: &str,
    build: impl Fn(&Record<'_>) -> Result<T>,
  ) -> Result<T> {
    let mut reader =
      TsvReader::from_reader(Cursor::new(body.as_bytes().to_vec()), dataset)?;
    let rec = reader.next_record()?.expect("one row");
    build(&rec)
  }

  #[test]
  fn title_from_record() {
    let body = "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres\n\
                tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894\t\\N\t1\tDocumentary,Short\n";
    let title = first(Dataset::Titles, body, Title::from_record).unwrap();

    assert_eq!(title.tconst, "tt0000001");
    assert_eq!(title.title_type, "short");
    assert_eq!(title.primary_title.as_deref(), Some("Carmencita"));
    assert!(!title.is_adult);
    assert_eq!(title.start_year, Some(1894));
    assert_eq!(title.end_year, None);
    assert_eq!(title.runtime_minutes, Some(1));
    assert_eq!(title.genres, ["Documentary", "Short"]);
  }

  #[test]
  fn name_lists_split_and_sentinel_years_drop() {
    let body = "nconst\tprimaryName\tbirthYear\tdeathYear\tprimaryProfession\tknownForTitles\n\
                nm0000001\tFred Astaire\t1899\t\\N\tactor,miscellaneous\ttt1,tt2\n";
    let name = first(Dataset::Names, body, Name::from_record).unwrap();

    assert_eq!(name.birth_year, Some(1899));
    assert_eq!(name.death_year, None);
    assert_eq!(name.primary_profession, ["actor", "miscellaneous"]);
    assert_eq!(name.known_for_titles, ["tt1", "tt2"]);
  }

  #[test]
  fn aka_text_sentinels_become_none() {
    let body = "titleId\tordering\ttitle\tregion\tlanguage\ttypes\tattributes\tisOriginalTitle\n\
                tt1\t3\tKarmencita\t\\N\t\\N\timdbDisplay\t\\N\t1\n";
    let aka = first(Dataset::Akas, body, TitleAka::from_record).unwrap();

    assert_eq!(aka.ordering, 3);
    assert_eq!(aka.region, None);
    assert_eq!(aka.language, None);
    assert!(aka.is_original_title);
    assert_eq!(aka.types, ["imdbDisplay"]);
    assert!(aka.attributes.is_empty());
  }

  #[test]
  fn principal_nullable_job_and_characters() {
    let body = "tconst\tordering\tnconst\tcategory\tjob\tcharacters\n\
                tt1\t1\tnm1\tself\t\\N\t[\"Self\"]\n";
    let p = first(Dataset::Principals, body, Principal::from_record).unwrap();

    assert_eq!(p.job, None);
    assert_eq!(p.characters.as_deref(), Some("[\"Self\"]"));
  }

  #[test]
  fn episode_non_numeric_season_is_malformed() {
    let body = "tconst\tparentTconst\tseasonNumber\tepisodeNumber\ntt2\ttt1\tone\t\\N\n";
    let err = first(Dataset::Episodes, body, Episode::from_record).unwrap_err();
    assert!(matches!(
      err,
      Error::MalformedRecord { dataset: Dataset::Episodes, line: 2, .. }
    ));
  }

  #[test]
  fn rating_requires_values() {
    let body = "tconst\taverageRating\tnumVotes\ntt1\t5.7\t\\N\n";
    assert!(first(Dataset::Ratings, body, Rating::from_record).is_err());

    let body = "tconst\taverageRating\tnumVotes\ntt1\t5.7\t2098\n";
    let r = first(Dataset::Ratings, body, Rating::from_record).unwrap();
    assert_eq!(r.average_rating, 5.7);
    assert_eq!(r.num_votes, 2098);
  }

  #[test]
  fn crew_with_no_directors() {
    let body = "tconst\tdirectors\twriters\ntt1\t\\N\tnm1,nm2\n";
    let crew = first(Dataset::Crew, body, Crew::from_record).unwrap();
    assert!(crew.directors.is_empty());
    assert_eq!(crew.writers, ["nm1", "nm2"]);
  }
}
