//! SQLite catalog store.
//!
//! Books, authors and categories live in their own tables with many-to-many
//! junction tables between them. Deduplication is left to the database:
//! `books.external_id`, `authors.name` and `categories.description` are
//! `UNIQUE`, and each junction table is keyed on its pair. The
//! [`RelationshipStore`] operations are built around catching those
//! constraint violations rather than trying to avoid them.

mod db;
pub mod error;
mod models;
mod repo;
mod store;

pub use crate::db::{DEFAULT_MAX_CONNECTIONS, Database};
pub use crate::models::{Book, NewBook, Related, RelatedKind};
pub use crate::repo::Repository;
pub use crate::store::RelationshipStore;
