//! Identifier assignment.
//!
//! [`IdRegistry`] is scoped to one pipeline run and is the only place ids are
//! claimed. Assignment is order-dependent on purpose: the first row to claim
//! a base identifier keeps it, later rows are disambiguated.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::{normalize::slugify, transform::UnitDraft};

/// The set of identifiers already handed out during this run.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
  assigned: HashSet<String>,
}

impl IdRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn contains(&self, id: &str) -> bool { self.assigned.contains(id) }

  pub fn len(&self) -> usize { self.assigned.len() }

  pub fn is_empty(&self) -> bool { self.assigned.is_empty() }

  fn claim(&mut self, id: &str) -> bool {
    if self.assigned.contains(id) {
      return false;
    }
    self.assigned.insert(id.to_string());
    true
  }

  /// Compute, register and return the final identifier for `draft`.
  ///
  /// 1. The candidate is the slugified strong id when set, else
  ///    `<name-slug>-<age>`.
  /// 2. On collision, append the slugified parenthesized variant of the raw
  ///    display name, or failing that the first producer.
  /// 3. If that still collides, append `-1`, `-2`, … to the candidate until
  ///    unused.
  pub fn assign(&mut self, draft: &UnitDraft) -> String {
    let candidate = draft
      .strong_id
      .as_deref()
      .map(str::trim)
      .map(|raw| {
        let id = slugify(raw);
        if id != raw {
          warn!(strong_id = raw, %id, "strong identifier normalized");
        }
        id
      })
      .filter(|id| !id.is_empty())
      .unwrap_or_else(|| draft.default_id());

    if self.claim(&candidate) {
      return candidate;
    }

    let token = draft
      .variant
      .as_deref()
      .map(slugify)
      .filter(|t| !t.is_empty())
      .or_else(|| draft.producer.as_deref().map(slugify).filter(|t| !t.is_empty()));

    if let Some(token) = &token {
      let disambiguated = format!("{candidate}-{token}");
      if self.claim(&disambiguated) {
        debug!(%candidate, id = %disambiguated, "identifier disambiguated");
        return disambiguated;
      }
    }

    let mut n = 1u32;
    loop {
      let numbered = format!("{candidate}-{n}");
      if self.claim(&numbered) {
        warn!(
          %candidate,
          token = token.as_deref().unwrap_or(""),
          id = %numbered,
          "identifier collision not resolved by variant or producer; using numeric suffix"
        );
        return numbered;
      }
      n += 1;
    }
  }
}
