//! The `UnitStore` trait and partition addressing.
//!
//! Implemented by storage backends (e.g. `armory-store-fs`). The ingest
//! pipeline and the read API depend on this abstraction only.

use std::{fmt, future::Future};

use serde_json::Value;

use crate::{Error, Result, civ::Civ, unit::Unit};

// ─── Partitions ──────────────────────────────────────────────────────────────

/// A group of documents: one per civilization plus the shared `common`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Partition {
  Civ(Civ),
  Common,
}

impl Partition {
  pub const COMMON_SLUG: &'static str = "common";

  /// Every partition, civs first in table order.
  pub fn all() -> impl Iterator<Item = Partition> {
    Civ::ALL
      .into_iter()
      .map(Partition::Civ)
      .chain(std::iter::once(Partition::Common))
  }

  pub fn slug(self) -> &'static str {
    match self {
      Self::Civ(civ) => civ.slug(),
      Self::Common => Self::COMMON_SLUG,
    }
  }

  pub fn from_slug(slug: &str) -> Result<Self> {
    if slug == Self::COMMON_SLUG {
      return Ok(Self::Common);
    }
    Civ::from_slug(slug)
      .map(Self::Civ)
      .ok_or_else(|| Error::UnknownPartition(slug.to_string()))
  }

  /// Where `unit` is stored: once per owning civ when unique, otherwise once
  /// in `common`.
  pub fn for_unit(unit: &Unit) -> Vec<Partition> {
    if unit.unique {
      unit.civs.iter().copied().map(Partition::Civ).collect()
    } else {
      vec![Partition::Common]
    }
  }
}

impl fmt::Display for Partition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.slug()) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Options for [`UnitStore::persist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOptions {
  /// Deep-merge into an existing document instead of replacing it.
  pub merge: bool,
}

impl Default for PersistOptions {
  fn default() -> Self { Self { merge: true } }
}

/// Abstraction over a partitioned unit store.
///
/// All methods return `Send` futures so the trait can be driven from
/// spawned tokio tasks.
pub trait UnitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Write `unit` into every partition [`Partition::for_unit`] selects.
  /// Returns the partitions written.
  fn persist<'a>(
    &'a self,
    unit: &'a Unit,
    options: PersistOptions,
  ) -> impl Future<Output = Result<Vec<Partition>, Self::Error>> + Send + 'a;

  /// The raw stored document, including fields added by later merges.
  fn get_document<'a>(
    &'a self,
    partition: Partition,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;

  /// Retrieve a unit by partition and id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    partition: Partition,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Unit>, Self::Error>> + Send + 'a;

  /// All units in one partition, sorted by id.
  fn list(
    &self,
    partition: Partition,
  ) -> impl Future<Output = Result<Vec<Unit>, Self::Error>> + Send + '_;

  /// All units in every partition, partition by partition.
  fn list_all(&self) -> impl Future<Output = Result<Vec<Unit>, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::unit::tests::archer;

  #[test]
  fn shared_units_go_to_common() {
    assert_eq!(Partition::for_unit(&archer()), vec![Partition::Common]);
  }

  #[test]
  fn unique_units_fan_out_per_civ() {
    let mut unit = archer();
    unit.unique = true;
    assert_eq!(
      Partition::for_unit(&unit),
      vec![Partition::Civ(Civ::En), Partition::Civ(Civ::Fr)]
    );
  }

  #[test]
  fn slugs_are_a_closed_set() {
    let slugs: Vec<&str> = Partition::all().map(Partition::slug).collect();
    assert_eq!(
      slugs,
      ["abbasid", "chinese", "delhi", "english", "french", "hre", "mongols", "rus", "common"]
    );
    for slug in slugs {
      assert_eq!(Partition::from_slug(slug).unwrap().slug(), slug);
    }
    assert!(matches!(Partition::from_slug("aztecs"), Err(Error::UnknownPartition(_))));
  }
}
