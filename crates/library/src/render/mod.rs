//! Rendering a book's identifier into a stored code image.
//!
//! Images are named `{stem}{id}.png` at the storage root, where the stem is
//! `qrcode` or `barcode` depending on the family. A file that already
//! exists is reused as-is: identifiers never change, so neither does the
//! image.

pub mod error;

use crate::render::error::{ErrorKind, Result};
use crate::resolve::{Resolution, resolve};
use exn::ResultExt;
use serde::Serialize;
use std::path::PathBuf;
use tome_codec::{Codec, CodeFamily};
use tome_storage::StorageBackend;
use tome_store::RelationshipStore;
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "path", rename_all = "snake_case")]
pub enum Rendered {
    /// A new image was encoded and stored at this path.
    Written(PathBuf),
    /// An image was already stored at this path.
    Cached(PathBuf),
    BookNotFound,
}

impl Rendered {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Written(path) | Self::Cached(path) => Some(path),
            Self::BookNotFound => None,
        }
    }
}

/// Storage path of the code image for `book_id`.
pub fn code_path(book_id: i64, family: CodeFamily) -> PathBuf {
    PathBuf::from(format!("{}{book_id}.png", family.file_stem()))
}

/// Makes sure a code image exists for the book `identifier` names.
#[instrument(skip(codec, store, backend), fields(family = %family, backend = backend.name()))]
pub async fn render_code(
    codec: &Codec,
    store: &dyn RelationshipStore,
    backend: &dyn StorageBackend,
    identifier: &str,
    family: CodeFamily,
) -> Result<Rendered> {
    let book = match resolve(store, identifier).await.or_raise(|| ErrorKind::Store)? {
        Resolution::Found(book) => book,
        Resolution::NotFound(_) => return Ok(Rendered::BookNotFound),
    };
    let path = code_path(book.id, family);
    if backend.exists(&path).await.or_raise(|| ErrorKind::Storage)? {
        tracing::debug!(path = %path.display(), "code image already stored");
        return Ok(Rendered::Cached(path));
    }

    let codec = codec.clone();
    let payload = book.id.to_string();
    let png = tokio::task::spawn_blocking(move || codec.encode(&payload, family))
        .await
        .or_raise(|| ErrorKind::Join)?
        .or_raise(|| ErrorKind::Encoding)?;
    // Concurrent renders of the same book may both get here; the backend
    // replaces atomically and both write identical bytes.
    backend.write(&path, &png).await.or_raise(|| ErrorKind::Storage)?;
    tracing::info!(path = %path.display(), bytes = png.len(), "code image stored");
    Ok(Rendered::Written(path))
}
