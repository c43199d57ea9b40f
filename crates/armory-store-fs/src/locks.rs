//! Keyed async mutexes: one per document path.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Table = Arc<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>>;

/// Serializes read-merge-write cycles on the same file. Cloning shares the
/// lock table. Entries live only while someone holds or awaits them.
#[derive(Clone, Default)]
pub(crate) struct PathLocks {
  table: Table,
}

impl PathLocks {
  /// Wait for exclusive access to `path`. Held until the guard drops.
  pub(crate) async fn lock(&self, path: &Path) -> PathGuard {
    let lock = {
      let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
      table.entry(path.to_path_buf()).or_default().clone()
    };
    PathGuard {
      guard: Some(lock.lock_owned().await),
      path:  path.to_path_buf(),
      table: self.table.clone(),
    }
  }

  #[cfg(test)]
  fn len(&self) -> usize {
    self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

/// Exclusive access to one path. Dropping the last handle on a path removes
/// its table entry.
pub(crate) struct PathGuard {
  guard: Option<OwnedMutexGuard<()>>,
  path:  PathBuf,
  table: Table,
}

impl Drop for PathGuard {
  fn drop(&mut self) {
    drop(self.guard.take());
    // Clones are only taken under the table lock, so a count of one here
    // means no holder or waiter remains.
    let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
    if table.get(&self.path).is_some_and(|lock| Arc::strong_count(lock) == 1) {
      table.remove(&self.path);
    }
  }
}
