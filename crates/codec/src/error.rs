//! Codec Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A codec error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Decoding failures are split in two: [`ImageRead`](Self::ImageRead)
/// means the caller handed us something that isn't a picture at all, while
/// [`NoCodeDetected`](Self::NoCodeDetected) means the picture was fine but
/// nothing readable was in it.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes could not be opened as an image.
    #[display("unreadable image")]
    ImageRead,
    /// The image was readable but contained no decodable code.
    #[display("no code detected")]
    NoCodeDetected,
    /// The payload cannot be represented by the requested code family.
    #[display("cannot encode payload: {_0}")]
    Encoding(#[error(not(source))] String),
    /// Encoding succeeded but the raster could not be written out as PNG.
    #[display("image output error")]
    ImageWrite,
    /// The requested code family name is not recognised.
    #[display("unknown code family: {_0}")]
    UnknownFamily(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Encoding and decoding are pure functions of their input.
        false
    }
}
