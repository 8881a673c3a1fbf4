//! Error types for the [`scan`](super) module.

use derive_more::{Display, Error};

/// A scan error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Distinct failure reasons, so callers can tell a bad upload from a bad
/// photo from a broken catalog.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The uploaded bytes are not an image.
    #[display("unreadable image")]
    ImageRead,
    /// The image was read but holds no code of the requested family.
    #[display("no code detected")]
    NoCodeDetected,
    /// The decoder failed for some other reason.
    #[display("decode failed")]
    Decode,
    #[display("catalog lookup failed")]
    Store,
    /// The blocking decode task panicked or was cancelled.
    #[display("decode task failed")]
    Join,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
