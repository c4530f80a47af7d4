//! Opening snapshot files, transparently decompressing gzip.

use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use flate2::read::MultiGzDecoder;

use crate::{Error, Result};

/// Whether `path` names a gzip-compressed file, judged by extension alone.
pub fn is_gzip(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Open `path` for buffered reading, decoding gzip when the extension says so.
pub fn open_source(path: &Path) -> Result<Box<dyn BufRead>> {
  let file = File::open(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;

  if is_gzip(path) {
    Ok(Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file)))))
  } else {
    Ok(Box::new(BufReader::new(file)))
  }
}

#[cfg(test)]
mod tests {
  use std::io::{Read, Write};

  use flate2::{Compression, write::GzEncoder};

  use super::*;

  #[test]
  fn detects_gzip_extension() {
    assert!(is_gzip(Path::new("data/title.basics.tsv.gz")));
    assert!(is_gzip(Path::new("TITLE.BASICS.TSV.GZ")));
    assert!(!is_gzip(Path::new("data/title.basics.tsv")));
    assert!(!is_gzip(Path::new("gz")));
  }

  #[test]
  fn reads_plain_and_gzip_identically() {
    let dir = tempfile::tempdir().unwrap();
    let body = "tconst\tgenres\ntt1\tDrama,Comedy\n";

    let plain = dir.path().join("title.basics.tsv");
    std::fs::write(&plain, body).unwrap();

    let gz = dir.path().join("title.basics.tsv.gz");
    let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::fast());
    enc.write_all(body.as_bytes()).unwrap();
    enc.finish().unwrap();

    let mut from_plain = String::new();
    open_source(&plain).unwrap().read_to_string(&mut from_plain).unwrap();
    let mut from_gz = String::new();
    open_source(&gz).unwrap().read_to_string(&mut from_gz).unwrap();

    assert_eq!(from_plain, body);
    assert_eq!(from_gz, body);
  }

  #[test]
  fn missing_file_is_io_error() {
    let err = open_source(Path::new("/nonexistent/title.ratings.tsv"))
      .err()
      .unwrap();
    assert!(matches!(err, Error::Io { .. }));
  }
}
