//! Structural deep merge of JSON documents.

use serde_json::Value;

/// Merge `incoming` into `stored`.
///
/// - map + map: recurse key by key; keys present only in `stored` are kept.
/// - sequence + sequence: `stored` followed by the elements of `incoming`
///   not already present (by value).
/// - anything else: `incoming` wins.
pub fn deep_merge(stored: Value, incoming: Value) -> Value {
  match (stored, incoming) {
    (Value::Object(mut base), Value::Object(update)) => {
      for (key, value) in update {
        match base.get_mut(&key) {
          Some(slot) => {
            let existing = std::mem::take(slot);
            *slot = deep_merge(existing, value);
          }
          None => {
            base.insert(key, value);
          }
        }
      }
      Value::Object(base)
    }
    (Value::Array(mut base), Value::Array(update)) => {
      for item in update {
        if !base.contains(&item) {
          base.push(item);
        }
      }
      Value::Array(base)
    }
    (_, incoming) => incoming,
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;
  use serde_json::json;

  use super::*;

  #[test]
  fn nested_leaves_overwrite_and_siblings_survive() {
    let stored = json!({ "costs": { "food": 5, "wood": 3 } });
    let merged = deep_merge(stored, json!({ "costs": { "food": 10 } }));
    assert_eq!(merged, json!({ "costs": { "food": 10, "wood": 3 } }));
  }

  #[test]
  fn sequences_concatenate_without_duplicates() {
    let stored = json!({ "civs": ["en", "fr"], "classes": [{ "a": 1 }] });
    let merged = deep_merge(
      stored,
      json!({ "civs": ["fr", "hr", "hr"], "classes": [{ "a": 1 }, { "a": 2 }] }),
    );
    assert_eq!(
      merged,
      json!({ "civs": ["en", "fr", "hr"], "classes": [{ "a": 1 }, { "a": 2 }] })
    );
  }

  #[test]
  fn type_mismatch_lets_the_new_value_win() {
    let stored = json!({ "range": { "min": 0 }, "tags": ["a"], "icon": "x" });
    let merged = deep_merge(stored, json!({ "range": 5, "tags": { "a": true }, "icon": null }));
    assert_eq!(merged, json!({ "range": 5, "tags": { "a": true }, "icon": null }));
  }

  #[test]
  fn stored_only_keys_keep_their_position() {
    let stored = json!({ "id": "a", "icon": "i.png", "name": "A" });
    let merged = deep_merge(stored, json!({ "name": "B", "age": 2 }));
    let keys: Vec<&str> = merged.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["id", "icon", "name", "age"]);
  }

  fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
      Just(Value::Null),
      any::<bool>().prop_map(Value::from),
      (-5i64..5).prop_map(Value::from),
      "[a-c]{0,2}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
      prop_oneof![
        proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
        proptest::collection::btree_map("[a-d]", inner, 0..4)
          .prop_map(|m| Value::Object(m.into_iter().collect())),
      ]
    })
  }

  proptest! {
    #[test]
    fn merging_an_identical_document_is_a_no_op(doc in arb_json()) {
      prop_assert_eq!(deep_merge(doc.clone(), doc.clone()), doc);
    }

    #[test]
    fn repeated_merge_is_idempotent(stored in arb_json(), incoming in arb_json()) {
      let once = deep_merge(stored, incoming.clone());
      let twice = deep_merge(once.clone(), incoming);
      prop_assert_eq!(twice, once);
    }

    #[test]
    fn sequence_merge_is_associative(
      a in proptest::collection::vec(0u8..6, 0..6),
      b in proptest::collection::vec(0u8..6, 0..6),
      c in proptest::collection::vec(0u8..6, 0..6),
    ) {
      let (a, b, c) = (json!(a), json!(b), json!(c));
      let left = deep_merge(deep_merge(a.clone(), b.clone()), c.clone());
      let right = deep_merge(a, deep_merge(b, c));
      prop_assert_eq!(left, right);
    }
  }
}
