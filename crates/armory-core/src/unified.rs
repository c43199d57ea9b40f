//! Read-side grouping of unit variants by `baseId`.
//!
//! Never persisted; always derived from stored records.

use serde::Serialize;
use serde_json::Value;

use crate::{
  Result,
  civ::Civ,
  unit::{Unit, compact_numbers},
};

/// All variants of one unit, across civs and ages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedUnit {
  /// The shared `baseId`.
  pub id:         String,
  pub name:       String,
  pub min_age:    u8,
  /// Union of the variations' civs, in table order.
  pub civs:       Vec<Civ>,
  /// Union of the variations' classes, in first-seen order.
  pub classes:    Vec<String>,
  pub variations: Vec<Unit>,
}

impl UnifiedUnit {
  fn new(first: Unit) -> Self {
    let mut unified = Self {
      id:         first.base_id.clone(),
      name:       first.name.clone(),
      min_age:    first.age,
      civs:       Vec::new(),
      classes:    Vec::new(),
      variations: Vec::new(),
    };
    unified.push(first);
    unified
  }

  /// The JSON form served to readers, with integral stats written as
  /// integers exactly as stored documents are.
  pub fn to_document(&self) -> Result<Value> {
    let mut doc = serde_json::to_value(self)?;
    compact_numbers(&mut doc);
    Ok(doc)
  }

  fn push(&mut self, unit: Unit) {
    self.min_age = self.min_age.min(unit.age);
    for civ in &unit.civs {
      if !self.civs.contains(civ) {
        self.civs.push(*civ);
      }
    }
    self.civs.sort();
    for class in &unit.classes {
      if !self.classes.contains(class) {
        self.classes.push(class.clone());
      }
    }
    // A unique record is stored once per civ; keep a single variation.
    if !self.variations.iter().any(|v| v.id == unit.id) {
      self.variations.push(unit);
    }
  }
}

/// Group units by `baseId`, sorted by that id. Variations are ordered by age
/// then id.
pub fn unify(units: impl IntoIterator<Item = Unit>) -> Vec<UnifiedUnit> {
  let mut groups: Vec<UnifiedUnit> = Vec::new();
  for unit in units {
    match groups.iter_mut().find(|g| g.id == unit.base_id) {
      Some(group) => group.push(unit),
      None => groups.push(UnifiedUnit::new(unit)),
    }
  }
  for group in &mut groups {
    group
      .variations
      .sort_by(|a, b| a.age.cmp(&b.age).then_with(|| a.id.cmp(&b.id)));
  }
  groups.sort_by(|a, b| a.id.cmp(&b.id));
  groups
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::unit::tests::archer;

  #[test]
  fn variants_group_under_their_base_id() {
    let mut longbow = archer();
    longbow.id = "archer-2-longbow".into();
    longbow.civs = vec![Civ::En];
    longbow.classes = vec!["Ranged".into(), "Longbow".into()];
    longbow.unique = true;

    let mut veteran = archer();
    veteran.id = "archer-3".into();
    veteran.age = 3;
    veteran.civs = vec![Civ::Hr, Civ::Ab];

    let mut spear = archer();
    spear.id = "spearman-1".into();
    spear.base_id = "spearman".into();
    spear.name = "Spearman".into();
    spear.age = 1;

    let groups = unify(vec![veteran, spear, longbow.clone(), archer(), longbow]);
    assert_eq!(groups.len(), 2);

    let archers = &groups[0];
    assert_eq!(archers.id, "archer");
    assert_eq!(archers.min_age, 2);
    assert_eq!(archers.civs, vec![Civ::Ab, Civ::En, Civ::Fr, Civ::Hr]);
    assert_eq!(archers.classes, vec!["Infantry", "Ranged", "Longbow"]);
    let ids: Vec<&str> = archers.variations.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, ["archer-2", "archer-2-longbow", "archer-3"]);

    assert_eq!(groups[1].id, "spearman");
    assert_eq!(groups[1].min_age, 1);
  }

  #[test]
  fn document_writes_integral_stats_as_integers() {
    let groups = unify(vec![archer()]);
    let doc = groups[0].to_document().unwrap();
    let costs = &doc["variations"][0]["costs"];
    assert!(costs["food"].is_u64(), "{costs}");
    assert_eq!(costs["food"].to_string(), "30");
    assert_eq!(doc["minAge"], 2);
  }
}
