//! Remote bibliographic metadata.
//!
//! [`MetadataSource`] is the seam the import logic talks to. [`GoogleBooks`]
//! implements it against the Google Books `volumes` search endpoint; the
//! response is parsed once into typed wire structures and mapped to
//! [`ExternalRecord`]s lazily as the caller iterates.

mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod models;
mod wire;

pub use crate::client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, GoogleBooks};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::StaticSource;
pub use crate::models::{ExternalRecord, Records};

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Free-text search.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::RemoteUnavailable`](crate::error::ErrorKind::RemoteUnavailable)
    /// for anything that prevents a parsed answer: connection failures,
    /// timeouts, error statuses, malformed bodies.
    async fn search(&self, query: &str) -> Result<Records>;

    /// Searches for `external_id` and keeps only the record carrying exactly
    /// that id. `Ok(None)` means the source answered but doesn't know it.
    async fn fetch_by_external_id(&self, external_id: &str) -> Result<Option<ExternalRecord>> {
        let mut records = self.search(external_id).await?;
        Ok(records.find(|record| record.external_id == external_id))
    }
}
