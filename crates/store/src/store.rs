use crate::error::Result;
use crate::models::{Book, NewBook, Related, RelatedKind};
use async_trait::async_trait;

/// Persistence operations the catalog and import logic depend on.
///
/// Implementations must back natural keys and link pairs with real
/// uniqueness guarantees: callers treat [`create_if_absent`] and
/// [`link_if_absent`] as safe to race.
///
/// [`create_if_absent`]: RelationshipStore::create_if_absent
/// [`link_if_absent`]: RelationshipStore::link_if_absent
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    async fn find_book(&self, id: i64) -> Result<Option<Book>>;

    async fn find_book_by_external_id(&self, external_id: &str) -> Result<Option<Book>>;

    /// Inserts a book in a single statement.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Constraint`](crate::error::ErrorKind::Constraint) if a
    /// book with the same external id already exists.
    async fn create_book(&self, book: &NewBook) -> Result<Book>;

    /// Exact, case-sensitive lookup by author name or category description.
    async fn find_by_natural_key(&self, kind: RelatedKind, key: &str) -> Result<Option<Related>>;

    /// Returns the row for `key`, creating it first if there is none. The
    /// flag is `true` only for the caller whose insert actually happened.
    async fn create_if_absent(&self, kind: RelatedKind, key: &str) -> Result<(Related, bool)>;

    /// Links `book` to `related`. Returns `true` when a new link was written
    /// and `false` when it already existed.
    async fn link_if_absent(&self, book: &Book, related: &Related) -> Result<bool>;

    /// All authors or categories linked to a book, ordered by key.
    async fn list_related(&self, book_id: i64, kind: RelatedKind) -> Result<Vec<Related>>;
}
