use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use serde::Serialize;
use time::OffsetDateTime;

/// A catalogued book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Internal identifier; its decimal form is the payload of the book's
    /// printed codes.
    pub id: i64,
    /// Identifier assigned by the remote bibliographic source, if imported.
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub edition: Option<String>,
    pub language: Option<String>,
    pub page_count: Option<u32>,
    pub image: Option<String>,
    pub image_thumbnail: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Everything needed to insert a [`Book`]; the store assigns the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewBook {
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub edition: Option<String>,
    pub language: Option<String>,
    pub page_count: Option<u32>,
    pub image: Option<String>,
    pub image_thumbnail: Option<String>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) id: i64,
    pub(crate) external_id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) edition: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) page_count: Option<i64>,
    pub(crate) image: Option<String>,
    pub(crate) image_thumbnail: Option<String>,
    pub(crate) created_at: i64,
}
impl TryFrom<BookRow> for Book {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            external_id: row.external_id,
            title: row.title,
            description: row.description,
            edition: row.edition,
            language: row.language,
            page_count: row
                .page_count
                .map(u32::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("page count"))?,
            image: row.image,
            image_thumbnail: row.image_thumbnail,
            created_at: OffsetDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("created at"))?,
        })
    }
}
