//! Attaching authors and categories to a freshly created book.

use futures::future::join_all;
use std::collections::HashSet;
use tome_store::error::{Error as StoreError, Result as StoreResult};
use tome_store::{Book, RelatedKind, RelationshipStore};
use tracing::instrument;

/// An author or category that could not be attached to an imported book.
#[derive(Debug)]
pub struct FailedLink {
    pub kind: RelatedKind,
    pub key: String,
    pub error: StoreError,
}

/// Non-blank keys, first occurrence wins. Keys are compared exactly.
pub(crate) fn distinct_keys(keys: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    keys.iter().map(String::as_str).filter(|key| !key.trim().is_empty() && seen.insert(*key)).collect()
}

/// Finds or creates every category and author, then links each to `book`.
///
/// Every unit runs to completion, concurrently, and is awaited before this
/// returns. A failing unit doesn't stop the others.
pub(crate) async fn link_all(
    store: &dyn RelationshipStore,
    book: &Book,
    categories: &[String],
    authors: &[String],
) -> Vec<FailedLink> {
    let units = distinct_keys(categories)
        .into_iter()
        .map(|key| (RelatedKind::Category, key))
        .chain(distinct_keys(authors).into_iter().map(|key| (RelatedKind::Author, key)));
    let outcomes = join_all(units.map(|(kind, key)| async move { (kind, key, link_one(store, book, kind, key).await) })).await;

    outcomes
        .into_iter()
        .filter_map(|(kind, key, outcome)| match outcome {
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(book_id = book.id, %kind, key, error = %error, "could not link to book");
                Some(FailedLink { kind, key: key.to_string(), error })
            },
        })
        .collect()
}

#[instrument(level = "debug", skip(store, book), fields(book_id = book.id))]
async fn link_one(store: &dyn RelationshipStore, book: &Book, kind: RelatedKind, key: &str) -> StoreResult<bool> {
    let related = match store.find_by_natural_key(kind, key).await? {
        Some(related) => related,
        None => store.create_if_absent(kind, key).await?.0,
    };
    store.link_if_absent(book, &related).await
}
