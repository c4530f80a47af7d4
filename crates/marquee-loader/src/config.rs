//! Loader configuration: where things live, and how chatty to be.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `MARQUEE_*` environment variables. Nothing here changes load
//! semantics.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
  /// Directory holding the seven `*.tsv` / `*.tsv.gz` snapshots.
  pub data_dir:            PathBuf,
  /// Store file; deleted and rebuilt on every run.
  pub db_path:             PathBuf,
  pub schema_path:         PathBuf,
  /// Where to write the JSON load report, if anywhere.
  #[serde(default)]
  pub report_path:         Option<PathBuf>,
  pub progress:            bool,
  pub verify_foreign_keys: bool,
}

impl LoaderConfig {
  /// Read configuration from `file` (which may be absent) and the
  /// environment.
  pub fn load(file: &Path) -> Result<Self> { Self::load_with_env(file, None) }

  /// As [`load`](Self::load), reading `MARQUEE_*` variables from `env`
  /// instead of the process environment when given.
  fn load_with_env(
    file: &Path,
    env: Option<config::Map<String, String>>,
  ) -> Result<Self> {
    let settings = config::Config::builder()
      .set_default("data_dir", "data")?
      .set_default("db_path", "imdb.sqlite")?
      .set_default("schema_path", "01_schema.sql")?
      .set_default("progress", true)?
      .set_default("verify_foreign_keys", true)?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("MARQUEE").source(env))
      .build()?;

    let mut cfg: Self = settings.try_deserialize()?;
    cfg.data_dir = expand_tilde(&cfg.data_dir);
    cfg.db_path = expand_tilde(&cfg.db_path);
    cfg.schema_path = expand_tilde(&cfg.schema_path);
    cfg.report_path = cfg.report_path.as_deref().map(expand_tilde);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
