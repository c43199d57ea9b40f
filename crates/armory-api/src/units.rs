//! Handlers for `/units` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/units` | Every unified item, sorted by id |
//! | `GET`  | `/units/:base_id` | 404 if no variation has that base id |

use std::sync::Arc;

use armory_core::{store::UnitStore, unified::unify};
use axum::{
  Json,
  extract::{Path, State},
};
use serde_json::Value;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /units`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Value>, ApiError>
where
  S: UnitStore,
{
  let units = store.list_all().await.map_err(ApiError::store)?;
  let docs = unify(units)
    .iter()
    .map(|unified| unified.to_document())
    .collect::<Result<Vec<_>, _>>()?;
  Ok(Json(Value::Array(docs)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /units/:base_id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(base_id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: UnitStore,
{
  let units = store.list_all().await.map_err(ApiError::store)?;
  let unified = unify(units.into_iter().filter(|u| u.base_id == base_id))
    .into_iter()
    .next()
    .ok_or(ApiError::UnknownUnit(base_id))?;
  Ok(Json(unified.to_document()?))
}
