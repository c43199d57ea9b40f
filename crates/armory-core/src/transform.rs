//! Row transformer: one [`RawRow`] in, one [`UnitDraft`] out.
//!
//! The draft holds every field of the final [`Unit`] except its `id`, plus
//! the raw tokens the identity assigner uses to disambiguate collisions.

use crate::{
  Error, Result,
  civ::Civ,
  normalize::{collapse_whitespace, inside_parens, outside_parens, round_to, slugify},
  schema::{Column, RawRow},
  unit::{Armor, Attack, Costs, Movement, Range, Unit, Vision},
};

/// A transformed row awaiting identifier assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDraft {
  /// Every field but `id`, which is left empty until [`UnitDraft::finish`].
  unit:          Unit,
  /// Identifier override carried over from the workaround layer.
  pub strong_id: Option<String>,
  /// Parenthesized part of the raw display name, e.g. `Longbow` in
  /// `Archer (Longbow)`.
  pub variant:   Option<String>,
  /// First entry of the raw producer column.
  pub producer:  Option<String>,
}

impl UnitDraft {
  pub fn name(&self) -> &str { &self.unit.name }

  pub fn age(&self) -> u8 { self.unit.age }

  pub fn civs(&self) -> &[Civ] { &self.unit.civs }

  pub fn unique(&self) -> bool { self.unit.unique }

  /// Default identifier: slugified name and age tier.
  pub fn default_id(&self) -> String {
    format!("{}-{}", slugify(&self.unit.name), self.unit.age)
  }

  /// Seal the draft with its final identifier.
  pub fn finish(self, id: String) -> Unit { Unit { id, ..self.unit } }
}

/// Map a roman-numeral age token to its tier.
pub fn parse_age(token: &str) -> Option<u8> {
  match token.trim().to_ascii_uppercase().as_str() {
    "I" => Some(1),
    "II" => Some(2),
    "III" => Some(3),
    "IV" => Some(4),
    _ => None,
  }
}

/// Strip parenthesized parts and every character that is not alphanumeric,
/// a space or a dash.
pub fn clean_name(display_name: &str) -> String {
  let kept: String = outside_parens(display_name)
    .chars()
    .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
    .collect();
  collapse_whitespace(&kept)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
  raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Civilizations whose grid column holds a non-trivial (longer than one
/// character) value, in table order.
pub fn civs_of(row: &RawRow) -> Vec<Civ> {
  Civ::ALL
    .into_iter()
    .filter(|civ| row.text(Column::Civ(*civ)).chars().count() > 1)
    .collect()
}

fn is_unique_occurrence(occurrence: &str) -> bool {
  occurrence.eq_ignore_ascii_case("unique") || occurrence.eq_ignore_ascii_case("single")
}

/// Attack buckets for the attack-type discriminator.
///
/// The siege bucket keys on the literal `True`, as the source sheet does.
/// Unrecognised discriminators zero all three buckets.
fn split_attack(attack_type: &str, total: f64) -> (f64, f64, f64) {
  match attack_type {
    "Melee" => (total, 0.0, 0.0),
    "Ranged" => (0.0, total, 0.0),
    "True" => (0.0, 0.0, total),
    _ => (0.0, 0.0, 0.0),
  }
}

/// Transform one row. Row-level failures ([`Error::UnknownAge`],
/// [`Error::NoCivilizations`]) reject only this row.
pub fn transform(row: &RawRow) -> Result<UnitDraft> {
  let display_name = row.text(Column::DisplayName);
  let name = clean_name(&display_name);

  let age_token = row.text(Column::Age);
  let age = parse_age(&age_token).ok_or_else(|| Error::UnknownAge {
    line:  row.line,
    value: age_token.clone(),
  })?;

  let civs = civs_of(row);
  if civs.is_empty() {
    return Err(Error::NoCivilizations { line: row.line });
  }
  let unique = is_unique_occurrence(&row.text(Column::Occurrence)) || civs.len() == 1;

  let producers = row.text(Column::ProducedBy);
  let (melee, ranged, siege) =
    split_attack(&row.text(Column::AttackType), row.number(Column::Attack));

  let unit = Unit {
    id: String::new(),
    base_id: slugify(&name),
    description: row.text(Column::Description),
    class: row.text(Column::Class),
    classes: split_list(&row.text(Column::Classes)).map(str::to_string).collect(),
    age,
    civs,
    unique,
    hitpoints: row.number(Column::Hitpoints),
    costs: Costs {
      food:   row.number(Column::Food),
      wood:   row.number(Column::Wood),
      stone:  row.number(Column::Stone),
      gold:   row.number(Column::Gold),
      total:  row.number(Column::TotalCost),
      popcap: row.number(Column::Popcap),
      time:   row.number(Column::BuildTime),
    },
    attack: Attack {
      melee,
      ranged,
      siege,
      fire:  row.number(Column::FireAttack),
      speed: round_to(row.number(Column::AttackSpeed), 2),
      dps:   round_to(row.number(Column::Dps), 1),
    },
    range: Range {
      min: round_to(row.number(Column::MinRange), 1),
      max: round_to(row.number(Column::MaxRange), 1),
    },
    vision: Vision {
      line_of_sight:   row.number(Column::LineOfSight),
      height_of_sight: row.number(Column::HeightOfSight),
    },
    armor: Armor {
      melee:  row.number(Column::MeleeArmor),
      ranged: row.number(Column::RangedArmor),
      fire:   row.number(Column::FireArmor),
    },
    movement: Movement {
      speed: round_to(row.number(Column::MoveSpeed), 2),
    },
    produced_by: split_list(&producers).map(slugify).filter(|s| !s.is_empty()).collect(),
    icon: None,
    name,
  };

  Ok(UnitDraft {
    unit,
    strong_id: row.strong_id.clone(),
    variant: inside_parens(&display_name),
    producer: split_list(&producers).next().map(str::to_string),
  })
}
