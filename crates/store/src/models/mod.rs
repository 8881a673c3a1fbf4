mod book;
mod related;

pub(crate) use self::book::BookRow;
pub use self::book::{Book, NewBook};
pub(crate) use self::related::RelatedRow;
pub use self::related::{Related, RelatedKind};
