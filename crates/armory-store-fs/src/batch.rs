//! Tracked asynchronous persistence for a batch of records.
//!
//! Every submitted record becomes one spawned task. Nothing is fire-and-
//! forget: [`PendingWrites::finish`] awaits every task and reports each
//! failure against the record that caused it.

use armory_core::{
  store::{Partition, PersistOptions, UnitStore},
  unit::Unit,
};
use tokio::task::JoinSet;
use tracing::warn;

/// A record that could not be persisted.
#[derive(Debug)]
pub struct WriteFailure {
  /// The record id, or `None` when the task itself panicked.
  pub id:    Option<String>,
  pub error: Box<dyn std::error::Error + Send + Sync>,
}

/// Outcome of a completed batch.
#[derive(Debug, Default)]
pub struct BatchReport {
  /// Record ids with the partitions each was written to, sorted by id.
  pub written:  Vec<(String, Vec<Partition>)>,
  pub failures: Vec<WriteFailure>,
}

impl BatchReport {
  pub fn is_clean(&self) -> bool { self.failures.is_empty() }

  /// Total number of documents written across all partitions.
  pub fn documents(&self) -> usize { self.written.iter().map(|(_, p)| p.len()).sum() }
}

type Outcome<E> = (String, Result<Vec<Partition>, E>);

/// In-flight persistence tasks against a store `S`.
pub struct PendingWrites<S: UnitStore> {
  store:   S,
  options: PersistOptions,
  tasks:   JoinSet<Outcome<S::Error>>,
}

impl<S> PendingWrites<S>
where
  S: UnitStore + Clone + 'static,
{
  pub fn new(store: S, options: PersistOptions) -> Self {
    Self { store, options, tasks: JoinSet::new() }
  }

  /// Spawn the persistence task for `unit`.
  pub fn submit(&mut self, unit: Unit) {
    let store = self.store.clone();
    let options = self.options;
    self.tasks.spawn(async move {
      let result = store.persist(&unit, options).await;
      (unit.id, result)
    });
  }

  /// Number of tasks not yet collected.
  pub fn len(&self) -> usize { self.tasks.len() }

  pub fn is_empty(&self) -> bool { self.tasks.is_empty() }

  /// Await every pending task.
  pub async fn finish(mut self) -> BatchReport {
    let mut report = BatchReport::default();
    while let Some(joined) = self.tasks.join_next().await {
      match joined {
        Ok((id, Ok(partitions))) => report.written.push((id, partitions)),
        Ok((id, Err(e))) => {
          warn!(%id, error = %e, "failed to persist record");
          report.failures.push(WriteFailure { id: Some(id), error: Box::new(e) });
        }
        Err(e) => {
          warn!(error = %e, "persistence task did not complete");
          report.failures.push(WriteFailure { id: None, error: Box::new(e) });
        }
      }
    }
    report.written.sort_by(|a, b| a.0.cmp(&b.0));
    report
  }
}
