//! The canonical unit record and its stat groups.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::{Result, civ::Civ};

// ─── Stat groups ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Costs {
  pub food:   f64,
  pub wood:   f64,
  pub stone:  f64,
  pub gold:   f64,
  pub total:  f64,
  pub popcap: f64,
  /// Production time in seconds.
  pub time:   f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attack {
  pub melee:  f64,
  pub ranged: f64,
  pub siege:  f64,
  pub fire:   f64,
  pub speed:  f64,
  pub dps:    f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Range {
  pub min: f64,
  pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vision {
  pub line_of_sight:   f64,
  pub height_of_sight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Armor {
  pub melee:  f64,
  pub ranged: f64,
  pub fire:   f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movement {
  pub speed: f64,
}

// ─── Unit ────────────────────────────────────────────────────────────────────

/// One unit variant as persisted in the store.
///
/// `id` is assigned once by [`crate::identity::IdRegistry`] and never
/// changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
  pub id:          String,
  /// Shared by all variants of the same unit across civs and ages.
  pub base_id:     String,
  pub name:        String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub class:       String,
  #[serde(default)]
  pub classes:     Vec<String>,
  pub age:         u8,
  pub civs:        Vec<Civ>,
  #[serde(default)]
  pub unique:      bool,
  #[serde(default)]
  pub hitpoints:   f64,
  #[serde(default)]
  pub costs:       Costs,
  #[serde(default)]
  pub attack:      Attack,
  #[serde(default)]
  pub range:       Range,
  #[serde(default)]
  pub vision:      Vision,
  #[serde(default)]
  pub armor:       Armor,
  #[serde(default)]
  pub movement:    Movement,
  #[serde(default)]
  pub produced_by: Vec<String>,
  /// Set only by icon attachment, never by the transformer.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon:        Option<String>,
}

impl Unit {
  /// The JSON document written to the store.
  ///
  /// Integral floats are emitted as integers so stored files read `"food": 50`
  /// rather than `"food": 50.0`.
  pub fn to_document(&self) -> Result<Value> {
    let mut doc = serde_json::to_value(self)?;
    compact_numbers(&mut doc);
    Ok(doc)
  }

  pub fn from_document(doc: Value) -> Result<Self> { Ok(serde_json::from_value(doc)?) }
}

/// Rewrite every integral float in `value` as an integer, recursively.
pub fn compact_numbers(value: &mut Value) {
  match value {
    Value::Number(n) => {
      if let Some(f) = n.as_f64()
        && n.is_f64()
        && f.fract() == 0.0
        && f.abs() < 9.0e15
      {
        *n = Number::from(f as i64);
      }
    }
    Value::Array(items) => items.iter_mut().for_each(compact_numbers),
    Value::Object(map) => map.values_mut().for_each(compact_numbers),
    _ => {}
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use serde_json::json;

  use super::*;

  pub(crate) fn archer() -> Unit {
    Unit {
      id:          "archer-2".into(),
      base_id:     "archer".into(),
      name:        "Archer".into(),
      description: "Ranged infantry.".into(),
      class:       "Ranged Infantry".into(),
      classes:     vec!["Infantry".into(), "Ranged".into()],
      age:         2,
      civs:        vec![Civ::En, Civ::Fr],
      unique:      false,
      hitpoints:   70.0,
      costs:       Costs { food: 30.0, wood: 50.0, total: 80.0, popcap: 1.0, time: 15.0, ..Costs::default() },
      attack:      Attack { ranged: 5.0, speed: 1.63, dps: 3.1, ..Attack::default() },
      range:       Range { min: 0.0, max: 5.0 },
      vision:      Vision { line_of_sight: 36.0, height_of_sight: 10.0 },
      armor:       Armor::default(),
      movement:    Movement { speed: 1.13 },
      produced_by: vec!["archery-range".into()],
      icon:        None,
    }
  }

  #[test]
  fn document_uses_camel_case_and_integers() {
    let doc = archer().to_document().unwrap();
    assert_eq!(doc["baseId"], json!("archer"));
    assert_eq!(doc["vision"]["lineOfSight"], json!(36));
    assert_eq!(doc["costs"]["food"], json!(30));
    assert_eq!(doc["attack"]["speed"], json!(1.63));
    assert_eq!(doc["civs"], json!(["en", "fr"]));
    assert!(doc.get("icon").is_none());
    assert_eq!(serde_json::to_string(&doc["costs"]["food"]).unwrap(), "30");
  }

  #[test]
  fn document_round_trips_with_extra_fields() {
    let mut doc = archer().to_document().unwrap();
    doc["icon"] = json!("https://cdn.example/archer.png");
    doc["extra"] = json!({ "kept": true });

    let unit = Unit::from_document(doc).unwrap();
    assert_eq!(unit.icon.as_deref(), Some("https://cdn.example/archer.png"));
    assert_eq!(unit.costs, archer().costs);
  }
}
