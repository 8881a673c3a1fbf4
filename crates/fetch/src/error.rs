//! Fetch Error Types

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote source could not be reached, did not answer in time,
    /// answered with a non-success status, or sent a body we couldn't parse.
    #[display("remote metadata source unavailable")]
    RemoteUnavailable,
    /// The configured endpoint is not a valid absolute URL.
    #[display("invalid metadata endpoint: {_0}")]
    InvalidEndpoint(#[error(not(source))] String),
    /// The HTTP client itself could not be built.
    #[display("http client error")]
    Client,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable)
    }
}
