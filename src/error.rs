//! Command-line error types.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the catalog database")]
    Database,
    #[display("could not open code image storage")]
    Storage,
    #[display("could not set up the metadata client")]
    Remote,
    #[display("could not read {_0}")]
    Input(#[error(not(source))] String),
    #[display("{_0} failed")]
    Command(#[error(not(source))] &'static str),
}
