//! Ingest pipeline for Armory.
//!
//! Reads the unit grid from a configured source, normalizes every row into a
//! canonical [`armory_core::unit::Unit`] and merges the result into an
//! [`armory_store_fs::FsStore`].

pub mod error;
pub mod pipeline;
pub mod settings;
pub mod source;

use armory_store_fs::FsStore;

pub use error::{Error, Result};
pub use pipeline::{Pipeline, Prepared, RunReport, SkippedRow};
pub use settings::IngestConfig;
pub use source::{Grid, GridSource};

/// Run one ingest as configured: resolve the source, fetch the grid and
/// persist every unit into the store at `config.store_root`.
///
/// Credential and fetch failures abort before any row is read.
pub async fn ingest(config: &IngestConfig) -> Result<RunReport> {
  let source = config
    .source
    .as_ref()
    .ok_or(Error::MissingSource)
    .and_then(GridSource::from_config)?;
  let grid = source.fetch().await?;

  let store = FsStore::new(&config.store_root);
  Pipeline::from_config(store, config)?.run(&grid).await
}
