//! Record normalisation for the tab-separated snapshot format.
//!
//! Pipeline:
//!   file (plain or gzip)
//!     └─ TsvReader::open()       → header validated against the dataset
//!          └─ next_record()      → Record (borrowed row + header index)
//!               └─ text()/int()/list()… → sentinel-free values

use std::{collections::HashMap, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord};

use crate::{Error, Result, dataset::Dataset, source::open_source};

/// Token the snapshots use for "no value".
pub const NULL_SENTINEL: &str = "\\N";

/// Separator inside multi-valued fields.
pub const LIST_DELIMITER: char = ',';

// ─── Pure helpers ────────────────────────────────────────────────────────────

/// Map the null sentinel to `None`; every other value passes through.
pub fn normalize(raw: &str) -> Option<&str> {
  (raw != NULL_SENTINEL).then_some(raw)
}

/// Split a multi-valued field into its tokens, in source order.
///
/// Null, empty and sentinel values yield an empty list, never `None`. Empty
/// tokens (`"a,,b"`, `"a,"`) are dropped.
pub fn split_list(raw: Option<&str>) -> Vec<&str> {
  match raw {
    None | Some("") | Some(NULL_SENTINEL) => Vec::new(),
    Some(value) => value
      .split(LIST_DELIMITER)
      .filter(|token| !token.is_empty())
      .collect(),
  }
}

// ─── Reader ──────────────────────────────────────────────────────────────────

/// Streaming reader over one snapshot file.
pub struct TsvReader {
  dataset: Dataset,
  inner:   csv::Reader<Box<dyn Read>>,
  headers: StringRecord,
  index:   HashMap<String, usize>,
  current: StringRecord,
}

impl TsvReader {
  /// Open `path` (gzip when the extension says so) as `dataset`.
  pub fn open(path: &Path, dataset: Dataset) -> Result<Self> {
    Self::from_reader(open_source(path)?, dataset)
  }

  /// Wrap an already-open byte stream. The header line is read and checked
  /// against [`Dataset::columns`] immediately.
  pub fn from_reader<R: Read + 'static>(reader: R, dataset: Dataset) -> Result<Self> {
    let boxed: Box<dyn Read> = Box::new(reader);
    let mut inner = ReaderBuilder::new()
      .delimiter(b'\t')
      .quoting(false)
      .double_quote(false)
      .has_headers(true)
      .flexible(false)
      .from_reader(boxed);

    let headers = inner
      .headers()
      .map_err(|e| classify(dataset, e))?
      .clone();

    let index: HashMap<String, usize> = headers
      .iter()
      .enumerate()
      .map(|(i, name)| (name.to_owned(), i))
      .collect();

    if let Some(column) = dataset
      .columns()
      .iter()
      .find(|column| !index.contains_key(**column))
    {
      return Err(Error::MissingColumn { dataset, column });
    }

    Ok(Self { dataset, inner, headers, index, current: StringRecord::new() })
  }

  pub fn dataset(&self) -> Dataset { self.dataset }

  /// Advance to the next row. `Ok(None)` at end of file.
  pub fn next_record(&mut self) -> Result<Option<Record<'_>>> {
    match self.inner.read_record(&mut self.current) {
      Ok(false) => Ok(None),
      Ok(true) => Ok(Some(Record {
        dataset: self.dataset,
        headers: &self.headers,
        index:   &self.index,
        fields:  &self.current,
      })),
      Err(e) => Err(classify(self.dataset, e)),
    }
  }
}

/// Row-shape and encoding problems are malformed records; anything else
/// (I/O underneath the decoder) stays a tsv error.
fn classify(dataset: Dataset, err: csv::Error) -> Error {
  let line = err.position().map_or(0, csv::Position::line);
  match err.kind() {
    csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
      Error::MalformedRecord {
        dataset,
        line,
        reason: format!("expected {expected_len} fields, found {len}"),
      }
    }
    csv::ErrorKind::Utf8 { err, .. } => Error::MalformedRecord {
      dataset,
      line,
      reason: format!("invalid UTF-8 in field {}", err.field()),
    },
    _ => Error::Csv { dataset, source: err },
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One row of a snapshot, viewed through its header.
#[derive(Clone, Copy)]
pub struct Record<'r> {
  dataset: Dataset,
  headers: &'r StringRecord,
  index:   &'r HashMap<String, usize>,
  fields:  &'r StringRecord,
}

impl<'r> Record<'r> {
  pub fn dataset(&self) -> Dataset { self.dataset }

  /// 1-based line number of this row in its source file.
  pub fn line(&self) -> u64 {
    self.fields.position().map_or(0, csv::Position::line)
  }

  /// Build a [`Error::MalformedRecord`] pointing at this row.
  pub fn malformed(&self, reason: impl Into<String>) -> Error {
    Error::MalformedRecord {
      dataset: self.dataset,
      line:    self.line(),
      reason:  reason.into(),
    }
  }

  /// The untouched field value.
  pub fn raw(&self, column: &str) -> Result<&'r str> {
    let fields: &'r StringRecord = self.fields;
    self
      .index
      .get(column)
      .and_then(|&i| fields.get(i))
      .ok_or_else(|| self.malformed(format!("missing column {column:?}")))
  }

  /// The field value with the null sentinel mapped to `None`.
  pub fn text(&self, column: &str) -> Result<Option<&'r str>> {
    self.raw(column).map(normalize)
  }

  /// A field that must hold a value, typically a natural key.
  pub fn required(&self, column: &str) -> Result<&'r str> {
    self
      .text(column)?
      .ok_or_else(|| self.malformed(format!("{column} is null")))
  }

  pub fn int(&self, column: &str) -> Result<Option<i64>> {
    self
      .text(column)?
      .map(|v| {
        v.parse::<i64>().map_err(|_| {
          self.malformed(format!("{column}: {v:?} is not an integer"))
        })
      })
      .transpose()
  }

  pub fn real(&self, column: &str) -> Result<Option<f64>> {
    self
      .text(column)?
      .map(|v| {
        v.parse::<f64>()
          .map_err(|_| self.malformed(format!("{column}: {v:?} is not a number")))
      })
      .transpose()
  }

  /// A `0`/`1` flag column.
  pub fn flag(&self, column: &str) -> Result<bool> {
    match self.required(column)? {
      "0" => Ok(false),
      "1" => Ok(true),
      other => Err(self.malformed(format!("{column}: {other:?} is not 0 or 1"))),
    }
  }

  /// A multi-valued column split into its tokens.
  pub fn list(&self, column: &str) -> Result<Vec<&'r str>> {
    self.raw(column).map(|raw| split_list(Some(raw)))
  }

  /// Every named field with nulls applied, in header order.
  pub fn fields(&self) -> impl Iterator<Item = (&'r str, Option<&'r str>)> + use<'r> {
    let (headers, fields): (&'r StringRecord, &'r StringRecord) =
      (self.headers, self.fields);
    headers.iter().zip(fields.iter().map(normalize))
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  fn reader(dataset: Dataset, body: &str) -> TsvReader {
    TsvReader::from_reader(Cursor::new(body.as_bytes().to_vec()), dataset)
      .unwrap()
  }

  const CREW: &str = "tconst\tdirectors\twriters\n\
                      tt1\tnm1,nm2\t\\N\n\
                      tt2\t\\N\t\n";

  #[test]
  fn sentinel_becomes_none() {
    assert_eq!(normalize("\\N"), None);
    assert_eq!(normalize(""), Some(""));
    assert_eq!(normalize("1994"), Some("1994"));
  }

  #[test]
  fn split_list_never_yields_null() {
    assert!(split_list(None).is_empty());
    assert!(split_list(Some("")).is_empty());
    assert!(split_list(Some("\\N")).is_empty());
    assert_eq!(split_list(Some("Drama")), vec!["Drama"]);
    assert_eq!(split_list(Some("Drama,Comedy")), vec!["Drama", "Comedy"]);
    assert_eq!(split_list(Some("a,,b,")), vec!["a", "b"]);
  }

  #[test]
  fn reads_rows_in_order() {
    let mut r = reader(Dataset::Crew, CREW);

    let first = r.next_record().unwrap().unwrap();
    assert_eq!(first.line(), 2);
    assert_eq!(first.required("tconst").unwrap(), "tt1");
    assert_eq!(first.list("directors").unwrap(), vec!["nm1", "nm2"]);
    assert!(first.list("writers").unwrap().is_empty());
    assert_eq!(first.text("writers").unwrap(), None);

    let second = r.next_record().unwrap().unwrap();
    assert_eq!(second.required("tconst").unwrap(), "tt2");
    assert!(second.list("directors").unwrap().is_empty());
    assert!(second.list("writers").unwrap().is_empty());

    assert!(r.next_record().unwrap().is_none());
  }

  #[test]
  fn field_map_applies_nulls() {
    let mut r = reader(Dataset::Crew, CREW);
    let rec = r.next_record().unwrap().unwrap();
    let fields: Vec<_> = rec.fields().collect();
    assert_eq!(
      fields,
      vec![
        ("tconst", Some("tt1")),
        ("directors", Some("nm1,nm2")),
        ("writers", None),
      ]
    );
  }

  #[test]
  fn quotes_are_literal() {
    let body = "tconst\taverageRating\tnumVotes\n\"tt1\tx\"y\t3\n";
    let mut r = reader(Dataset::Ratings, body);
    let rec = r.next_record().unwrap().unwrap();
    assert_eq!(rec.raw("tconst").unwrap(), "\"tt1");
    assert_eq!(rec.raw("averageRating").unwrap(), "x\"y");
  }

  #[test]
  fn numeric_accessors() {
    let body = "tconst\taverageRating\tnumVotes\ntt1\t7.5\t\\N\ntt2\tabc\t12\n";
    let mut r = reader(Dataset::Ratings, body);

    let rec = r.next_record().unwrap().unwrap();
    assert_eq!(rec.real("averageRating").unwrap(), Some(7.5));
    assert_eq!(rec.int("numVotes").unwrap(), None);

    let rec = r.next_record().unwrap().unwrap();
    assert_eq!(rec.int("numVotes").unwrap(), Some(12));
    let err = rec.real("averageRating").unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { line: 3, .. }));
  }

  #[test]
  fn null_key_is_malformed() {
    let body = "tconst\tdirectors\twriters\n\\N\tnm1\tnm2\n";
    let mut r = reader(Dataset::Crew, body);
    let rec = r.next_record().unwrap().unwrap();
    assert!(matches!(
      rec.required("tconst"),
      Err(Error::MalformedRecord { dataset: Dataset::Crew, .. })
    ));
  }

  #[test]
  fn flag_accepts_only_zero_and_one() {
    let body = "tconst\tdirectors\twriters\n1\t0\t2\n";
    let mut r = reader(Dataset::Crew, body);
    let rec = r.next_record().unwrap().unwrap();
    assert!(rec.flag("tconst").unwrap());
    assert!(!rec.flag("directors").unwrap());
    assert!(rec.flag("writers").is_err());
  }

  #[test]
  fn short_row_is_malformed() {
    let body = "tconst\tdirectors\twriters\ntt1\tnm1\n";
    let mut r = reader(Dataset::Crew, body);
    let err = r.next_record().err().unwrap();
    assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));
  }

  #[test]
  fn missing_header_column_is_rejected() {
    let body = "tconst\tdirectors\ntt1\tnm1\n";
    let err =
      TsvReader::from_reader(Cursor::new(body.as_bytes().to_vec()), Dataset::Crew)
        .err()
        .unwrap();
    assert!(matches!(
      err,
      Error::MissingColumn { dataset: Dataset::Crew, column: "writers" }
    ));
  }

  #[test]
  fn empty_file_is_missing_columns() {
    let err = TsvReader::from_reader(Cursor::new(Vec::new()), Dataset::Ratings)
      .err()
      .unwrap();
    assert!(matches!(err, Error::MissingColumn { column: "tconst", .. }));
  }
}
