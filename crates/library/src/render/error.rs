//! Error types for the [`render`](super) module.

use derive_more::{Display, Error};

/// A render error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("catalog lookup failed")]
    Store,
    #[display("code encoding failed")]
    Encoding,
    #[display("render task failed")]
    Join,
    /// The rendered image could not be checked for or written.
    #[display("code image storage failed")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store | Self::Storage)
    }
}
