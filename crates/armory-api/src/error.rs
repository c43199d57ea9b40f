//! Handler failures and their HTTP status codes.

use armory_core::store::Partition;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  /// No stored variation carries this `baseId`.
  #[error("no unit with base id {0:?}")]
  UnknownUnit(String),

  #[error("partition {partition} holds no unit {id:?}")]
  MissingDocument { partition: Partition, id: String },

  /// Neither `common` nor a civ abbreviation.
  #[error("{0:?} is not a partition; expected \"common\" or a civ abbreviation")]
  UnknownPartition(String),

  #[error("unit store failed: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("could not render unit document: {0}")]
  Render(#[from] armory_core::Error),
}

impl ApiError {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  fn status(&self) -> StatusCode {
    match self {
      Self::UnknownUnit(_) | Self::MissingDocument { .. } => StatusCode::NOT_FOUND,
      Self::UnknownPartition(_) => StatusCode::BAD_REQUEST,
      Self::Store(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use armory_core::civ::Civ;

  use super::*;

  #[test]
  fn lookups_map_to_client_errors() {
    assert_eq!(ApiError::UnknownUnit("trebuchet".into()).status(), StatusCode::NOT_FOUND);
    let missing = ApiError::MissingDocument { partition: Partition::Civ(Civ::En), id: "x-1".into() };
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(
      ApiError::UnknownPartition("aztecs".into()).status(),
      StatusCode::BAD_REQUEST
    );
  }

  #[test]
  fn rendering_failures_are_server_errors() {
    let err = ApiError::from(armory_core::Error::UnknownPartition("x".into()));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.to_string().starts_with("could not render unit document"));
  }
}
