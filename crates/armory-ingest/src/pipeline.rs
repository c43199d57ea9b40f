//! The ingest run: grid in, persisted records out.
//!
//! Header validation, workarounds, transformation and id assignment run
//! synchronously in input order. Persistence is handed to
//! [`PendingWrites`], which tracks one task per record.

use armory_core::{
  identity::IdRegistry,
  schema::{Cell, HeaderSchema},
  store::{PersistOptions, UnitStore},
  transform::transform,
  unit::Unit,
  workaround::Workarounds,
};
use armory_store_fs::{BatchReport, PendingWrites};
use tracing::{info, warn};

use crate::{Result, settings::IngestConfig};

/// A data row rejected by the transformer.
#[derive(Debug)]
pub struct SkippedRow {
  pub line:  usize,
  pub error: armory_core::Error,
}

/// Units ready to persist, with the rows that did not make it.
#[derive(Debug, Default)]
pub struct Prepared {
  /// Data rows read from the grid, before workarounds.
  pub rows:    usize,
  /// Rows removed by a workaround.
  pub dropped: usize,
  pub skipped: Vec<SkippedRow>,
  /// In input order.
  pub units:   Vec<Unit>,
}

/// Outcome of a full run.
#[derive(Debug)]
pub struct RunReport {
  pub rows:    usize,
  pub dropped: usize,
  pub skipped: Vec<SkippedRow>,
  pub ids:     Vec<String>,
  pub batch:   BatchReport,
}

impl RunReport {
  /// No row was skipped and every write succeeded.
  pub fn is_clean(&self) -> bool { self.skipped.is_empty() && self.batch.is_clean() }
}

pub struct Pipeline<S> {
  store:       S,
  schema:      HeaderSchema,
  workarounds: Workarounds,
  options:     PersistOptions,
}

impl<S> Pipeline<S>
where
  S: UnitStore + Clone + 'static,
{
  pub fn new(
    store: S,
    schema: HeaderSchema,
    workarounds: Workarounds,
    options: PersistOptions,
  ) -> Self {
    Self { store, schema, workarounds, options }
  }

  pub fn from_config(store: S, config: &IngestConfig) -> Result<Self> {
    Ok(Self::new(
      store,
      config.header_schema()?,
      config.workarounds()?,
      config.persist_options(),
    ))
  }

  /// Validate, patch, transform and identify every row of `grid`.
  ///
  /// A header mismatch fails the whole call. Row-level failures are
  /// collected in [`Prepared::skipped`].
  pub fn prepare(&self, grid: &[Vec<Cell>]) -> Result<Prepared> {
    let rows = self.schema.rows(grid)?;
    let read = rows.len();
    let rows = self.workarounds.apply(rows);

    let mut prepared = Prepared {
      rows: read,
      dropped: read - rows.len(),
      ..Prepared::default()
    };

    let mut registry = IdRegistry::new();
    for row in &rows {
      match transform(row) {
        Ok(draft) => {
          let id = registry.assign(&draft);
          prepared.units.push(draft.finish(id));
        }
        Err(error) if error.is_row_error() => {
          warn!(line = row.line, %error, "row skipped");
          prepared.skipped.push(SkippedRow { line: row.line, error });
        }
        Err(error) => return Err(error.into()),
      }
    }
    Ok(prepared)
  }

  /// Prepare `grid` and persist every resulting unit.
  pub async fn run(&self, grid: &[Vec<Cell>]) -> Result<RunReport> {
    let Prepared { rows, dropped, skipped, units } = self.prepare(grid)?;

    let ids = units.iter().map(|u| u.id.clone()).collect();
    let mut pending = PendingWrites::new(self.store.clone(), self.options);
    for unit in units {
      pending.submit(unit);
    }
    let batch = pending.finish().await;

    let report = RunReport { rows, dropped, skipped, ids, batch };
    info!(
      rows = report.rows,
      dropped = report.dropped,
      skipped = report.skipped.len(),
      units = report.ids.len(),
      documents = report.batch.documents(),
      failures = report.batch.failures.len(),
      merge = self.options.merge,
      "ingest finished"
    );
    Ok(report)
  }
}
