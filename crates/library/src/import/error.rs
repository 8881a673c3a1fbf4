//! Error types for the [`import`](super) module.
//!
//! Failures to link a single author or category are not errors: they are
//! reported inside [`Import::PartialFailure`](super::Import::PartialFailure)
//! so the book that was created is never lost.

use derive_more::{Display, Error};

/// An import error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an import failure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The [metadata source](tome_fetch::MetadataSource) could not be queried.
    #[display("remote metadata source unavailable")]
    RemoteUnavailable,
    /// The source answered but has no record with this external id.
    #[display("no remote record with external id {_0:?}")]
    NotFound(#[error(not(source))] String),
    /// A lookup or insert via the [catalog store](tome_store::RelationshipStore)
    /// failed before the book existed.
    #[display("catalog store failed")]
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable | Self::Store)
    }
}
