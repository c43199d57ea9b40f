//! Error types for `armory-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("row grid is empty; expected a header row")]
  EmptyGrid,

  #[error("header has {found} columns, expected {expected}")]
  HeaderLength { expected: usize, found: usize },

  #[error("header column {position} is {found:?}, expected {expected:?}")]
  SchemaMismatch {
    position: usize,
    expected: &'static str,
    found:    String,
  },

  #[error("unknown column key in alias table: {0:?}")]
  UnknownColumnKey(String),

  #[error("line {line}: unknown age token {value:?}")]
  UnknownAge { line: usize, value: String },

  #[error("line {line}: row belongs to no civilization")]
  NoCivilizations { line: usize },

  #[error("identifier {0:?} is not a lowercase hyphen-delimited slug")]
  InvalidIdentifier(String),

  #[error("unknown partition slug: {0:?}")]
  UnknownPartition(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Whether the error only invalidates a single row rather than the run.
  pub fn is_row_error(&self) -> bool {
    matches!(self, Self::UnknownAge { .. } | Self::NoCivilizations { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
