//! Core types and the normalization pipeline for the Armory unit catalogue.
//!
//! Everything here is synchronous and free of filesystem or HTTP
//! dependencies. Row grids go in, finished [`unit::Unit`] records come out;
//! persistence lives behind the [`store::UnitStore`] trait.

pub mod civ;
pub mod error;
pub mod identity;
pub mod merge;
pub mod normalize;
pub mod schema;
pub mod store;
pub mod transform;
pub mod unified;
pub mod unit;
pub mod workaround;

pub use error::{Error, Result};
