//! Reconciling remote records into the catalog.
//!
//! A record is imported at most once per external id, and each author name
//! and category description maps to exactly one row no matter how many
//! imports race on it. Both guarantees come from the store's uniqueness
//! constraints; the code here only decides what a lost race means.

pub mod error;
mod links;

pub use self::links::FailedLink;

use crate::import::error::{ErrorKind, Result};
use exn::ResultExt;
use tome_fetch::{ExternalRecord, MetadataSource};
use tome_store::error::ErrorKind as StoreErrorKind;
use tome_store::{Book, NewBook, RelationshipStore};
use tracing::instrument;

/// The outcome of an import.
#[derive(Debug)]
pub enum Import {
    /// The book was created and every author and category linked.
    Created(Book),
    /// A book with this external id already existed. Nothing was written.
    AlreadyImported(Book),
    /// The book was created but some links could not be written.
    PartialFailure { book: Book, failed: Vec<FailedLink> },
}

impl Import {
    pub fn book(&self) -> &Book {
        match self {
            Self::Created(book) | Self::AlreadyImported(book) | Self::PartialFailure { book, .. } => book,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_) | Self::PartialFailure { .. })
    }
}

fn new_book(record: &ExternalRecord) -> NewBook {
    NewBook {
        external_id: Some(record.external_id.clone()),
        title: record.title.clone(),
        description: record.description.clone(),
        edition: record.edition.clone(),
        language: record.language.clone(),
        page_count: record.page_count,
        image: record.image.clone(),
        image_thumbnail: record.image_thumbnail.clone(),
    }
}

/// Imports a record that has already been fetched.
#[instrument(skip_all, fields(external_id = %record.external_id))]
pub async fn import_record(store: &dyn RelationshipStore, record: &ExternalRecord) -> Result<Import> {
    if let Some(book) = existing(store, &record.external_id).await? {
        tracing::debug!(book_id = book.id, "already imported");
        return Ok(Import::AlreadyImported(book));
    }

    let book = match store.create_book(&new_book(record)).await {
        Ok(book) => book,
        // Another import of the same record won between our check and insert.
        Err(err) if *err == StoreErrorKind::Constraint => {
            return match existing(store, &record.external_id).await? {
                Some(book) => {
                    tracing::debug!(book_id = book.id, "lost import race");
                    Ok(Import::AlreadyImported(book))
                },
                None => Err(err.raise(ErrorKind::Store)),
            };
        },
        Err(err) => return Err(err.raise(ErrorKind::Store)),
    };

    let failed = links::link_all(store, &book, &record.categories, &record.authors).await;
    if failed.is_empty() {
        tracing::info!(book_id = book.id, "book imported");
        Ok(Import::Created(book))
    } else {
        tracing::warn!(book_id = book.id, failed = failed.len(), "book imported with missing links");
        Ok(Import::PartialFailure { book, failed })
    }
}

/// Fetches `external_id` from `source` and imports it.
///
/// A book that is already catalogued is returned without asking the source.
#[instrument(skip(source, store))]
pub async fn import_by_external_id(
    source: &dyn MetadataSource,
    store: &dyn RelationshipStore,
    external_id: &str,
) -> Result<Import> {
    if let Some(book) = existing(store, external_id).await? {
        return Ok(Import::AlreadyImported(book));
    }
    let Some(record) = source.fetch_by_external_id(external_id).await.or_raise(|| ErrorKind::RemoteUnavailable)? else {
        exn::bail!(ErrorKind::NotFound(external_id.to_string()));
    };
    import_record(store, &record).await
}

async fn existing(store: &dyn RelationshipStore, external_id: &str) -> Result<Option<Book>> {
    store.find_book_by_external_id(external_id).await.or_raise(|| ErrorKind::Store)
}
