//! Filesystem backend for the Armory unit store.
//!
//! Each record is one pretty-printed JSON document at
//! `<root>/<partition-slug>/<id>.json`. Writes deep-merge into whatever is
//! already on disk and are serialized per target path.

mod locks;
mod store;

pub mod batch;
pub mod error;
pub mod icons;

pub use batch::{BatchReport, PendingWrites, WriteFailure};
pub use error::{Error, Result};
pub use icons::{IconSource, attach_icons};
pub use store::FsStore;
