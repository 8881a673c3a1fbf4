pub mod error;

use crate::resolve::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use tome_store::{Book, RelationshipStore};
use tracing::instrument;

/// What a decoded identifier points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Resolution {
    Found(Book),
    /// No book has this identifier. Carries the identifier as given.
    NotFound(String),
}

/// The book id an identifier spells, if it is one.
///
/// Codes carry the id in its canonical decimal form, so `"+7"` and `"07"`
/// are not book 7.
fn catalog_key(identifier: &str) -> Option<i64> {
    let trimmed = identifier.trim();
    trimmed.parse::<i64>().ok().filter(|id| id.to_string() == trimmed)
}

/// Looks a book up by the identifier printed in its code.
///
/// Identifiers that aren't catalog keys can't belong to any book and
/// resolve to [`Resolution::NotFound`] without touching the store. Store
/// failures are errors, never `NotFound`.
#[instrument(skip(store))]
pub async fn resolve(store: &dyn RelationshipStore, identifier: &str) -> Result<Resolution> {
    let Some(id) = catalog_key(identifier) else {
        tracing::debug!("identifier is not a catalog key");
        return Ok(Resolution::NotFound(identifier.to_string()));
    };
    Ok(match store.find_book(id).await.or_raise(|| ErrorKind::Store)? {
        Some(book) => Resolution::Found(book),
        None => Resolution::NotFound(identifier.to_string()),
    })
}
