//! Error type for `armory-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] armory_core::Error),

  #[error(transparent)]
  Store(#[from] armory_store_fs::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("no row source configured")]
  MissingSource,

  #[error("missing credential: {0}")]
  MissingCredential(&'static str),

  #[error("fetch failed: {0}")]
  Fetch(#[from] reqwest::Error),

  #[error("i/o error at {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid grid in {path}: {source}")]
  Grid {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
