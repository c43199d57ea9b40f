//! Civilizations and their static lookup table.
//!
//! Every civ-keyed decision (which grid column marks membership, which
//! partition directory a record lands in) goes through [`Civ::info`] rather
//! than string-indexed field access.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A civilization, serialised as its two-letter abbreviation.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Civ {
  Ab,
  Ch,
  De,
  En,
  Fr,
  Hr,
  Mo,
  Ru,
}

/// Static configuration for one civilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivInfo {
  pub abbr: &'static str,
  pub name: &'static str,
  /// Partition directory name.
  pub slug: &'static str,
}

const TABLE: [(Civ, CivInfo); 8] = [
  (Civ::Ab, CivInfo { abbr: "ab", name: "Abbasid Dynasty",   slug: "abbasid" }),
  (Civ::Ch, CivInfo { abbr: "ch", name: "Chinese",           slug: "chinese" }),
  (Civ::De, CivInfo { abbr: "de", name: "Delhi Sultanate",   slug: "delhi" }),
  (Civ::En, CivInfo { abbr: "en", name: "English",           slug: "english" }),
  (Civ::Fr, CivInfo { abbr: "fr", name: "French",            slug: "french" }),
  (Civ::Hr, CivInfo { abbr: "hr", name: "Holy Roman Empire", slug: "hre" }),
  (Civ::Mo, CivInfo { abbr: "mo", name: "Mongols",           slug: "mongols" }),
  (Civ::Ru, CivInfo { abbr: "ru", name: "Rus",               slug: "rus" }),
];

impl Civ {
  /// All civilizations in table order. Membership tests and partition
  /// fan-out iterate in this order.
  pub const ALL: [Civ; 8] = [
    Civ::Ab,
    Civ::Ch,
    Civ::De,
    Civ::En,
    Civ::Fr,
    Civ::Hr,
    Civ::Mo,
    Civ::Ru,
  ];

  pub fn info(self) -> &'static CivInfo {
    // TABLE is declared in the same order as the enum.
    &TABLE[self as usize].1
  }

  pub fn abbr(self) -> &'static str { self.info().abbr }

  pub fn name(self) -> &'static str { self.info().name }

  pub fn slug(self) -> &'static str { self.info().slug }

  pub fn from_abbr(abbr: &str) -> Option<Self> {
    TABLE
      .iter()
      .find(|(_, info)| info.abbr.eq_ignore_ascii_case(abbr.trim()))
      .map(|(civ, _)| *civ)
  }

  pub fn from_slug(slug: &str) -> Option<Self> {
    TABLE
      .iter()
      .find(|(_, info)| info.slug == slug)
      .map(|(civ, _)| *civ)
  }
}

impl fmt::Display for Civ {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.abbr())
  }
}
