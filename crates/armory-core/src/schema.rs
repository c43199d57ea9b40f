//! The fixed column contract of the unit grid.
//!
//! A grid is a header row followed by data rows. The header must match the
//! positional [`Column`] list exactly, either by label, by key, or through
//! the case-insensitive alias table in [`HeaderSchema`]. Any mismatch aborts
//! the run before a single row is trusted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  civ::Civ,
  normalize::{collapse_whitespace, parse_number},
};

// ─── Cells ───────────────────────────────────────────────────────────────────

/// One scalar value from the grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
  #[default]
  Empty,
  Bool(bool),
  Number(f64),
  Text(String),
}

impl Cell {
  /// The cell rendered as text, the way a spreadsheet displays it.
  pub fn text(&self) -> String {
    match self {
      Self::Empty => String::new(),
      Self::Bool(true) => "True".to_string(),
      Self::Bool(false) => "False".to_string(),
      Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
        format!("{}", *n as i64)
      }
      Self::Number(n) => n.to_string(),
      Self::Text(s) => s.clone(),
    }
  }

  /// Coerce-or-zero numeric view.
  pub fn number(&self) -> f64 {
    match self {
      Self::Number(n) if n.is_finite() => *n,
      Self::Text(s) => parse_number(s),
      _ => 0.0,
    }
  }

  pub fn is_blank(&self) -> bool { self.text().trim().is_empty() }
}

impl From<&str> for Cell {
  fn from(value: &str) -> Self { Self::Text(value.to_string()) }
}

impl From<f64> for Cell {
  fn from(value: f64) -> Self { Self::Number(value) }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// A column of the unit grid. The declaration order of the stat columns,
/// followed by one column per [`Civ`] in table order, is the positional
/// header contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
  DisplayName,
  Genre,
  Age,
  Occurrence,
  ProducedBy,
  Classes,
  Class,
  Description,
  Hitpoints,
  Food,
  Wood,
  Stone,
  Gold,
  TotalCost,
  Popcap,
  BuildTime,
  AttackType,
  Attack,
  FireAttack,
  AttackSpeed,
  Dps,
  MinRange,
  MaxRange,
  LineOfSight,
  HeightOfSight,
  MeleeArmor,
  RangedArmor,
  FireArmor,
  MoveSpeed,
  Civ(Civ),
}

const STAT_COLUMNS: [Column; 29] = [
  Column::DisplayName,
  Column::Genre,
  Column::Age,
  Column::Occurrence,
  Column::ProducedBy,
  Column::Classes,
  Column::Class,
  Column::Description,
  Column::Hitpoints,
  Column::Food,
  Column::Wood,
  Column::Stone,
  Column::Gold,
  Column::TotalCost,
  Column::Popcap,
  Column::BuildTime,
  Column::AttackType,
  Column::Attack,
  Column::FireAttack,
  Column::AttackSpeed,
  Column::Dps,
  Column::MinRange,
  Column::MaxRange,
  Column::LineOfSight,
  Column::HeightOfSight,
  Column::MeleeArmor,
  Column::RangedArmor,
  Column::FireArmor,
  Column::MoveSpeed,
];

impl Column {
  /// Every column in header order.
  pub fn all() -> impl Iterator<Item = Column> {
    STAT_COLUMNS
      .into_iter()
      .chain(Civ::ALL.into_iter().map(Column::Civ))
  }

  pub fn count() -> usize { STAT_COLUMNS.len() + Civ::ALL.len() }

  /// Header label as it appears in the source sheet.
  pub fn label(self) -> &'static str {
    match self {
      Self::DisplayName => "Display Name",
      Self::Genre => "Genre",
      Self::Age => "Age",
      Self::Occurrence => "Occurrence",
      Self::ProducedBy => "Produced By",
      Self::Classes => "Classes",
      Self::Class => "Unit Class",
      Self::Description => "Description",
      Self::Hitpoints => "Hitpoints",
      Self::Food => "Food",
      Self::Wood => "Wood",
      Self::Stone => "Stone",
      Self::Gold => "Gold",
      Self::TotalCost => "Total Cost",
      Self::Popcap => "Popcap",
      Self::BuildTime => "Build Time",
      Self::AttackType => "Attack Type",
      Self::Attack => "Attack",
      Self::FireAttack => "Fire Attack",
      Self::AttackSpeed => "Attack Speed",
      Self::Dps => "DPS",
      Self::MinRange => "Min Range",
      Self::MaxRange => "Max Range",
      Self::LineOfSight => "Line of Sight",
      Self::HeightOfSight => "Height of Sight",
      Self::MeleeArmor => "Melee Armor",
      Self::RangedArmor => "Ranged Armor",
      Self::FireArmor => "Fire Armor",
      Self::MoveSpeed => "Move Speed",
      Self::Civ(civ) => civ.name(),
    }
  }

  /// Canonical key, used by configured alias tables.
  pub fn key(self) -> &'static str {
    match self {
      Self::DisplayName => "displayName",
      Self::Genre => "genre",
      Self::Age => "age",
      Self::Occurrence => "occurrence",
      Self::ProducedBy => "producedBy",
      Self::Classes => "classes",
      Self::Class => "class",
      Self::Description => "description",
      Self::Hitpoints => "hitpoints",
      Self::Food => "food",
      Self::Wood => "wood",
      Self::Stone => "stone",
      Self::Gold => "gold",
      Self::TotalCost => "totalCost",
      Self::Popcap => "popcap",
      Self::BuildTime => "buildTime",
      Self::AttackType => "attackType",
      Self::Attack => "attack",
      Self::FireAttack => "fireAttack",
      Self::AttackSpeed => "attackSpeed",
      Self::Dps => "dps",
      Self::MinRange => "minRange",
      Self::MaxRange => "maxRange",
      Self::LineOfSight => "lineOfSight",
      Self::HeightOfSight => "heightOfSight",
      Self::MeleeArmor => "meleeArmor",
      Self::RangedArmor => "rangedArmor",
      Self::FireArmor => "fireArmor",
      Self::MoveSpeed => "moveSpeed",
      Self::Civ(civ) => civ.abbr(),
    }
  }

  pub fn from_key(key: &str) -> Option<Column> {
    Self::all().find(|c| c.key().eq_ignore_ascii_case(key.trim()))
  }
}

// ─── Header validation ───────────────────────────────────────────────────────

const BUILTIN_ALIASES: &[(&str, Column)] = &[
  ("name", Column::DisplayName),
  ("unit", Column::DisplayName),
  ("type", Column::Genre),
  ("unique", Column::Occurrence),
  ("produced at", Column::ProducedBy),
  ("building", Column::ProducedBy),
  ("hp", Column::Hitpoints),
  ("health", Column::Hitpoints),
  ("total", Column::TotalCost),
  ("pop", Column::Popcap),
  ("time", Column::BuildTime),
  ("damage", Column::Attack),
  ("los", Column::LineOfSight),
  ("melee armour", Column::MeleeArmor),
  ("ranged armour", Column::RangedArmor),
  ("fire armour", Column::FireArmor),
  ("speed", Column::MoveSpeed),
  ("abbasid", Column::Civ(Civ::Ab)),
  ("delhi", Column::Civ(Civ::De)),
  ("hre", Column::Civ(Civ::Hr)),
];

/// Header matcher: canonical labels and keys plus a case-insensitive alias
/// table.
#[derive(Debug, Clone)]
pub struct HeaderSchema {
  aliases: HashMap<String, Column>,
}

impl Default for HeaderSchema {
  fn default() -> Self {
    let aliases = BUILTIN_ALIASES
      .iter()
      .map(|(alias, column)| (alias.to_string(), *column))
      .collect();
    Self { aliases }
  }
}

fn fold_label(label: &str) -> String { collapse_whitespace(label).to_lowercase() }

impl HeaderSchema {
  /// Register `alias` as an accepted header label for the column with
  /// canonical key `key`.
  pub fn with_alias(mut self, alias: &str, key: &str) -> Result<Self> {
    let column =
      Column::from_key(key).ok_or_else(|| Error::UnknownColumnKey(key.to_string()))?;
    self.aliases.insert(fold_label(alias), column);
    Ok(self)
  }

  pub fn accepts(&self, column: Column, header: &str) -> bool {
    let folded = fold_label(header);
    folded == column.label().to_lowercase()
      || folded == column.key().to_lowercase()
      || self.aliases.get(&folded) == Some(&column)
  }

  /// Check a header row against the positional column contract.
  pub fn validate(&self, header: &[Cell]) -> Result<()> {
    if header.len() != Column::count() {
      return Err(Error::HeaderLength {
        expected: Column::count(),
        found:    header.len(),
      });
    }
    for (position, (column, cell)) in Column::all().zip(header).enumerate() {
      let found = cell.text();
      if !self.accepts(column, &found) {
        return Err(Error::SchemaMismatch {
          position,
          expected: column.label(),
          found,
        });
      }
    }
    Ok(())
  }

  /// Validate the header and map every non-blank data row to a [`RawRow`].
  ///
  /// Short rows are padded with empty cells; surplus cells are ignored.
  pub fn rows(&self, grid: &[Vec<Cell>]) -> Result<Vec<RawRow>> {
    let (header, body) = grid.split_first().ok_or(Error::EmptyGrid)?;
    self.validate(header)?;

    Ok(
      body
        .iter()
        .enumerate()
        // Line numbers are 1-based and count the header.
        .map(|(i, cells)| RawRow::new(i + 2, cells))
        .filter(|row| !row.is_blank())
        .collect(),
    )
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

static EMPTY: Cell = Cell::Empty;

/// One data row keyed by [`Column`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
  /// 1-based line in the source grid, header included.
  pub line:      usize,
  cells:         HashMap<Column, Cell>,
  /// Identifier override set by the workaround layer.
  pub strong_id: Option<String>,
}

impl RawRow {
  pub fn new(line: usize, cells: &[Cell]) -> Self {
    let cells = Column::all()
      .zip(cells.iter().cloned().chain(std::iter::repeat(Cell::Empty)))
      .collect();
    Self { line, cells, strong_id: None }
  }

  pub fn get(&self, column: Column) -> &Cell {
    self.cells.get(&column).unwrap_or(&EMPTY)
  }

  /// Trimmed text of a cell.
  pub fn text(&self, column: Column) -> String {
    self.get(column).text().trim().to_string()
  }

  pub fn number(&self, column: Column) -> f64 { self.get(column).number() }

  pub fn set(&mut self, column: Column, cell: impl Into<Cell>) {
    self.cells.insert(column, cell.into());
  }

  pub fn is_blank(&self) -> bool { self.cells.values().all(Cell::is_blank) }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) fn header() -> Vec<Cell> {
    Column::all().map(|c| Cell::from(c.label())).collect()
  }

  #[test]
  fn canonical_header_validates() {
    HeaderSchema::default().validate(&header()).unwrap();
  }

  #[test]
  fn header_matches_case_insensitively_and_by_alias() {
    let mut header = header();
    header[0] = Cell::from("NAME");
    header[8] = Cell::from("  hit   points ");
    header[13] = Cell::from("totalcost");
    header[29 + 5] = Cell::from("HRE");

    let err = HeaderSchema::default().validate(&header).unwrap_err();
    // "hit points" is neither a label, a key nor a builtin alias.
    assert!(matches!(err, Error::SchemaMismatch { position: 8, .. }));

    let schema = HeaderSchema::default()
      .with_alias("Hit Points", "hitpoints")
      .unwrap();
    schema.validate(&header).unwrap();
  }

  #[test]
  fn misplaced_column_is_rejected() {
    let mut header = header();
    header.swap(9, 10);
    let err = HeaderSchema::default().validate(&header).unwrap_err();
    match err {
      Error::SchemaMismatch { position, expected, found } => {
        assert_eq!(position, 9);
        assert_eq!(expected, "Food");
        assert_eq!(found, "Wood");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn header_length_is_checked() {
    let mut header = header();
    header.pop();
    assert!(matches!(
      HeaderSchema::default().validate(&header),
      Err(Error::HeaderLength { expected: 37, found: 36 })
    ));
    assert!(matches!(HeaderSchema::default().rows(&[]), Err(Error::EmptyGrid)));
  }

  #[test]
  fn alias_for_unknown_key_fails() {
    let err = HeaderSchema::default().with_alias("x", "nope").unwrap_err();
    assert!(matches!(err, Error::UnknownColumnKey(_)));
  }

  #[test]
  fn rows_are_padded_and_blank_rows_skipped() {
    let grid = vec![
      header(),
      vec![Cell::from("Spearman"), Cell::Empty, Cell::from("I")],
      vec![Cell::Empty, Cell::from("  ")],
      vec![Cell::from("Archer"), Cell::Empty, Cell::from("II")],
    ];
    let rows = HeaderSchema::default().rows(&grid).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].line, 2);
    assert_eq!(rows[1].line, 4);
    assert_eq!(rows[1].text(Column::DisplayName), "Archer");
    assert_eq!(rows[1].get(Column::Civ(Civ::Ru)), &Cell::Empty);
  }

  #[test]
  fn cells_render_like_a_spreadsheet() {
    assert_eq!(Cell::Bool(true).text(), "True");
    assert_eq!(Cell::Number(5.0).text(), "5");
    assert_eq!(Cell::Number(1.25).text(), "1.25");
    assert_eq!(Cell::from("12").number(), 12.0);
    assert_eq!(Cell::Bool(true).number(), 0.0);

    let cells: Vec<Cell> = serde_json::from_str(r#"["a", 1.5, null, true]"#).unwrap();
    assert_eq!(
      cells,
      vec![Cell::from("a"), Cell::Number(1.5), Cell::Empty, Cell::Bool(true)]
    );
  }
}
