//! Row patches applied between header validation and transformation.
//!
//! The source sheet has rows that must be skipped or pre-annotated before
//! they can be trusted: non-unit genres, and units whose default identifier
//! would be ambiguous or wrong. Patches run in order; the first one that
//! drops a row ends processing for it.

use serde::Deserialize;
use tracing::debug;

use crate::{
  Error, Result,
  civ::Civ,
  normalize::is_slug,
  schema::{Column, RawRow},
  transform::{civs_of, parse_age},
};

/// What a patch decided for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patched {
  Keep,
  Drop,
}

/// A single workaround step.
pub trait RowPatch: Send + Sync {
  fn apply(&self, row: &mut RawRow) -> Patched;
}

// ─── Genre filter ────────────────────────────────────────────────────────────

/// Drops rows whose genre is in an exclusion list (case-insensitive).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreFilter {
  pub excluded: Vec<String>,
}

impl RowPatch for GenreFilter {
  fn apply(&self, row: &mut RawRow) -> Patched {
    let genre = row.text(Column::Genre);
    if self.excluded.iter().any(|g| g.trim().eq_ignore_ascii_case(&genre)) {
      Patched::Drop
    } else {
      Patched::Keep
    }
  }
}

// ─── Identifier overrides ────────────────────────────────────────────────────

/// Pins the identifier (and optionally the display name) of matching rows.
///
/// A row matches when its display name equals `display_name`
/// (case-insensitive) and, when given, its age token maps to the same tier
/// and it belongs to `civ`.
#[derive(Debug, Clone, Deserialize)]
pub struct StrongIdOverride {
  pub display_name: String,
  #[serde(default)]
  pub age:          Option<String>,
  #[serde(default)]
  pub civ:          Option<Civ>,
  pub strong_id:    String,
  #[serde(default)]
  pub rename:       Option<String>,
}

impl StrongIdOverride {
  /// Reject overrides whose `strong_id` is not already a slug. Stored ids
  /// double as file names.
  pub fn validate(&self) -> Result<()> {
    if is_slug(&self.strong_id) {
      Ok(())
    } else {
      Err(Error::InvalidIdentifier(self.strong_id.clone()))
    }
  }

  fn matches(&self, row: &RawRow) -> bool {
    if !row.text(Column::DisplayName).eq_ignore_ascii_case(self.display_name.trim()) {
      return false;
    }
    if let Some(age) = &self.age
      && parse_age(age) != parse_age(&row.text(Column::Age))
    {
      return false;
    }
    match self.civ {
      Some(civ) => civs_of(row).contains(&civ),
      None => true,
    }
  }
}

impl RowPatch for StrongIdOverride {
  fn apply(&self, row: &mut RawRow) -> Patched {
    if self.matches(row) {
      row.strong_id = Some(self.strong_id.clone());
      if let Some(name) = &self.rename {
        row.set(Column::DisplayName, name.as_str());
      }
    }
    Patched::Keep
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// An ordered list of patches.
#[derive(Default)]
pub struct Workarounds {
  patches: Vec<Box<dyn RowPatch>>,
}

impl Workarounds {
  pub fn new() -> Self { Self::default() }

  pub fn with(mut self, patch: impl RowPatch + 'static) -> Self {
    self.patches.push(Box::new(patch));
    self
  }

  pub fn len(&self) -> usize { self.patches.len() }

  pub fn is_empty(&self) -> bool { self.patches.is_empty() }

  /// Apply every patch to every row, preserving row order.
  pub fn apply(&self, rows: Vec<RawRow>) -> Vec<RawRow> {
    rows
      .into_iter()
      .filter_map(|mut row| {
        for patch in &self.patches {
          if patch.apply(&mut row) == Patched::Drop {
            debug!(line = row.line, name = %row.text(Column::DisplayName), "row dropped by workaround");
            return None;
          }
        }
        Some(row)
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::transform::tests::row;

  #[test]
  fn genre_filter_drops_matching_rows() {
    let mut building = row(2, "House", "I", &[Civ::En, Civ::Fr]);
    building.set(Column::Genre, "Building");
    let mut unit = row(3, "Spearman", "I", &[Civ::En, Civ::Fr]);
    unit.set(Column::Genre, "Unit");

    let workarounds = Workarounds::new().with(GenreFilter {
      excluded: vec!["building".into(), "Technology".into()],
    });
    let kept = workarounds.apply(vec![building, unit]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].line, 3);
  }

  #[test]
  fn strong_id_override_respects_civ_and_age() {
    let english = row(2, "Villager", "I", &[Civ::En]);
    let french = row(3, "Villager", "I", &[Civ::Fr]);
    let later = row(4, "Villager", "II", &[Civ::En]);

    let workarounds = Workarounds::new().with(StrongIdOverride {
      display_name: "villager".into(),
      age:          Some("I".into()),
      civ:          Some(Civ::En),
      strong_id:    "villager-1-english".into(),
      rename:       Some("Villager (English)".into()),
    });
    let rows = workarounds.apply(vec![english, french, later]);

    assert_eq!(rows[0].strong_id.as_deref(), Some("villager-1-english"));
    assert_eq!(rows[0].text(Column::DisplayName), "Villager (English)");
    assert_eq!(rows[1].strong_id, None);
    assert_eq!(rows[2].strong_id, None);
  }

  #[test]
  fn override_requires_a_slug_identifier() {
    let mut pin = StrongIdOverride {
      display_name: "Villager".into(),
      age:          None,
      civ:          Some(Civ::En),
      strong_id:    "villager-1-english".into(),
      rename:       None,
    };
    pin.validate().unwrap();

    for bad in ["../../Escaped Villager", "Villager-1", "", "a/b"] {
      pin.strong_id = bad.into();
      assert!(matches!(pin.validate(), Err(Error::InvalidIdentifier(_))), "{bad}");
    }
  }

  #[test]
  fn override_deserialises_from_config_shape() {
    let cfg: StrongIdOverride = serde_json::from_str(
      r#"{ "display_name": "Villager", "civ": "en", "strong_id": "villager-1-english" }"#,
    )
    .unwrap();
    assert_eq!(cfg.civ, Some(Civ::En));
    assert!(cfg.age.is_none());
  }
}
