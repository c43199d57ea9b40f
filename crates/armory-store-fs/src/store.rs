//! [`FsStore`]: the filesystem implementation of [`UnitStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use armory_core::{
  merge::deep_merge,
  normalize::is_slug,
  store::{Partition, PersistOptions, UnitStore},
  unit::Unit,
};
use serde_json::Value;
use tokio::{fs, task::JoinSet};
use tracing::debug;

use crate::{Error, Result, locks::PathLocks};

const EXTENSION: &str = "json";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A unit store rooted at a directory.
///
/// Cloning is cheap; clones share the per-path lock table, so merges issued
/// through any clone are serialized against each other.
#[derive(Clone)]
pub struct FsStore {
  root:  Arc<PathBuf>,
  locks: PathLocks,
}

impl FsStore {
  /// Open a store at `root`. Nothing is created until the first write.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root:  Arc::new(root.into()),
      locks: PathLocks::default(),
    }
  }

  pub fn root(&self) -> &Path { &self.root }

  pub fn partition_dir(&self, partition: Partition) -> PathBuf {
    self.root.join(partition.slug())
  }

  pub fn document_path(&self, partition: Partition, id: &str) -> PathBuf {
    self.partition_dir(partition).join(format!("{id}.{EXTENSION}"))
  }

  /// Write `doc` to `path`, deep-merging into the existing document when
  /// `merge` is set. Returns the document as written.
  ///
  /// The read-merge-write cycle holds the path lock throughout.
  pub async fn write_document(&self, path: &Path, doc: Value, merge: bool) -> Result<Value> {
    let _guard = self.locks.lock(path).await;

    let doc = match (merge, read_json(path).await?) {
      (true, Some(existing)) => deep_merge(existing, doc),
      _ => doc,
    };

    if let Some(dir) = path.parent() {
      fs::create_dir_all(dir).await.map_err(Error::io(dir))?;
    }

    let mut text = serde_json::to_string_pretty(&doc).map_err(Error::json(path))?;
    text.push('\n');

    // Write beside the target and rename so readers never see a torn file.
    let staging = path.with_extension(format!("{EXTENSION}.tmp"));
    fs::write(&staging, text).await.map_err(Error::io(&staging))?;
    fs::rename(&staging, path).await.map_err(Error::io(path))?;

    debug!(path = %path.display(), merge, "document written");
    Ok(doc)
  }

  /// Deep-merge `patch` into the document for `id` in `partition`.
  pub async fn merge_document(&self, partition: Partition, id: &str, patch: Value) -> Result<Value> {
    check_id(id)?;
    self
      .write_document(&self.document_path(partition, id), patch, true)
      .await
  }

  /// Raw documents in one partition, in file-name order.
  async fn partition_documents(&self, partition: Partition) -> Result<Vec<Value>> {
    let dir = self.partition_dir(partition);
    let mut entries = match fs::read_dir(&dir).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(Error::io(&dir)(e)),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(Error::io(&dir))? {
      let path = entry.path();
      // Skips staging files and anything that is not a document.
      if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
        paths.push(path);
      }
    }
    paths.sort();

    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
      if let Some(doc) = read_json(&path).await? {
        docs.push(doc);
      }
    }
    Ok(docs)
  }
}

/// Ids become file stems; only slugs may reach the filesystem.
fn check_id(id: &str) -> Result<()> {
  if is_slug(id) {
    Ok(())
  } else {
    Err(armory_core::Error::InvalidIdentifier(id.to_string()).into())
  }
}

async fn read_json(path: &Path) -> Result<Option<Value>> {
  match fs::read(path).await {
    Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(Error::json(path))?)),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
    Err(e) => Err(Error::io(path)(e)),
  }
}

// ─── UnitStore impl ──────────────────────────────────────────────────────────

impl UnitStore for FsStore {
  type Error = Error;

  async fn persist(&self, unit: &Unit, options: PersistOptions) -> Result<Vec<Partition>> {
    check_id(&unit.id)?;
    let doc = unit.to_document()?;

    // Partitions of one record are independent files; write them
    // concurrently and report the first failure once all have settled.
    let mut tasks = JoinSet::new();
    for partition in Partition::for_unit(unit) {
      let store = self.clone();
      let doc = doc.clone();
      let path = self.document_path(partition, &unit.id);
      tasks.spawn(async move {
        store
          .write_document(&path, doc, options.merge)
          .await
          .map(|_| partition)
      });
    }

    let mut written = Vec::new();
    let mut failure = None;
    while let Some(joined) = tasks.join_next().await {
      match joined? {
        Ok(partition) => written.push(partition),
        Err(e) => {
          failure.get_or_insert(e);
        }
      }
    }
    if let Some(e) = failure {
      return Err(e);
    }

    written.sort();
    Ok(written)
  }

  async fn get_document(&self, partition: Partition, id: &str) -> Result<Option<Value>> {
    if !is_slug(id) {
      return Ok(None);
    }
    read_json(&self.document_path(partition, id)).await
  }

  async fn get(&self, partition: Partition, id: &str) -> Result<Option<Unit>> {
    self
      .get_document(partition, id)
      .await?
      .map(|doc| Unit::from_document(doc).map_err(Error::from))
      .transpose()
  }

  async fn list(&self, partition: Partition) -> Result<Vec<Unit>> {
    let docs = self.partition_documents(partition).await?;
    let mut units = docs
      .into_iter()
      .map(|doc| Unit::from_document(doc).map_err(Error::from))
      .collect::<Result<Vec<_>>>()?;
    units.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(units)
  }

  async fn list_all(&self) -> Result<Vec<Unit>> {
    let mut units = Vec::new();
    for partition in Partition::all() {
      units.extend(self.list(partition).await?);
    }
    Ok(units)
  }
}
