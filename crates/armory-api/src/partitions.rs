//! `GET /partitions/:slug/:id` returns the stored document verbatim,
//! including fields only a later merge added (such as `icon`).

use std::sync::Arc;

use armory_core::store::{Partition, UnitStore};
use axum::{
  Json,
  extract::{Path, State},
};
use serde_json::Value;

use crate::error::ApiError;

pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((slug, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError>
where
  S: UnitStore,
{
  let partition = Partition::from_slug(&slug).map_err(|_| ApiError::UnknownPartition(slug))?;
  let doc = store
    .get_document(partition, &id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::MissingDocument { partition, id })?;
  Ok(Json(doc))
}
