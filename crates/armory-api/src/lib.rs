//! JSON read API for Armory.
//!
//! Exposes an axum [`Router`] backed by any [`armory_core::store::UnitStore`].
//! Nothing here writes; records are produced by the ingest pipeline.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", armory_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod partitions;
pub mod units;

use std::sync::Arc;

use armory_core::store::UnitStore;
use axum::{Router, routing::get};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: UnitStore + 'static,
{
  Router::new()
    // Unified items
    .route("/units", get(units::list::<S>))
    .route("/units/{base_id}", get(units::get_one::<S>))
    // Raw stored records
    .route("/partitions/{slug}/{id}", get(partitions::get_one::<S>))
    .with_state(store)
}
