//! Where rendered code images end up.
//!
//! A [`StorageBackend`] is a small async interface over paths relative
//! to a storage root. [`LocalBackend`](backend::LocalBackend) keeps files in
//! a directory; `MockBackend` (feature `mock`) keeps them in memory.

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::path::validate as validate_path;
