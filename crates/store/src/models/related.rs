use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The two entity kinds a book is linked to through a junction table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedKind {
    /// Keyed on the exact author name.
    Author,
    /// Keyed on the exact category description.
    Category,
}

impl RelatedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Category => "category",
        }
    }

    pub(crate) fn find_query(&self) -> &'static str {
        match self {
            Self::Author => include_str!("../../queries/find_author.sql"),
            Self::Category => include_str!("../../queries/find_category.sql"),
        }
    }

    pub(crate) fn create_query(&self) -> &'static str {
        match self {
            Self::Author => include_str!("../../queries/create_author.sql"),
            Self::Category => include_str!("../../queries/create_category.sql"),
        }
    }

    pub(crate) fn link_query(&self) -> &'static str {
        match self {
            Self::Author => include_str!("../../queries/link_author.sql"),
            Self::Category => include_str!("../../queries/link_category.sql"),
        }
    }

    pub(crate) fn list_query(&self) -> &'static str {
        match self {
            Self::Author => include_str!("../../queries/list_authors.sql"),
            Self::Category => include_str!("../../queries/list_categories.sql"),
        }
    }
}

impl Display for RelatedKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// An author or category row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Related {
    pub kind: RelatedKind,
    pub id: i64,
    /// The natural key: author name or category description.
    pub key: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct RelatedRow {
    pub(crate) id: i64,
    pub(crate) natural_key: String,
}
impl RelatedRow {
    pub(crate) fn into_model(self, kind: RelatedKind) -> Related {
        Related { kind, id: self.id, key: self.natural_key }
    }
}
