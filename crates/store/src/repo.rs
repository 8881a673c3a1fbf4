//! SQLite implementation of [`RelationshipStore`].

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Book, BookRow, NewBook, Related, RelatedKind, RelatedRow};
use crate::store::RelationshipStore;
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::instrument;

/// Insert/re-read rounds before `create_if_absent` gives up. Only a
/// concurrent delete between the failed insert and the re-read can make a
/// second round necessary.
const CREATE_ATTEMPTS: usize = 3;

/// Repository over the catalog tables.
///
/// Every write is a single statement, so no transaction (and no lock) is
/// ever held across an await point.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_related(&self, kind: RelatedKind, key: &str) -> Result<Related> {
        let result = sqlx::query_as::<_, RelatedRow>(kind.create_query()).bind(key).fetch_one(&self.pool).await;
        match result {
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => exn::bail!(ErrorKind::Constraint),
            other => Ok(other.or_raise(|| ErrorKind::Database)?.into_model(kind)),
        }
    }
}

#[async_trait]
impl RelationshipStore for Repository {
    // =========================================================================
    // Books
    // =========================================================================

    #[instrument(skip(self))]
    async fn find_book(&self, id: i64) -> Result<Option<Book>> {
        let row: Option<BookRow> = sqlx::query_as(include_str!("../queries/find_book.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Book::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_book_by_external_id(&self, external_id: &str) -> Result<Option<Book>> {
        let row: Option<BookRow> = sqlx::query_as(include_str!("../queries/find_book_by_external_id.sql"))
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Book::try_from).transpose()
    }

    #[instrument(skip_all, fields(external_id = ?book.external_id))]
    async fn create_book(&self, book: &NewBook) -> Result<Book> {
        let result = sqlx::query_as::<_, BookRow>(include_str!("../queries/create_book.sql"))
            .bind(book.external_id.as_deref())
            .bind(book.title.as_deref())
            .bind(book.description.as_deref())
            .bind(book.edition.as_deref())
            .bind(book.language.as_deref())
            .bind(book.page_count.map(i64::from))
            .bind(book.image.as_deref())
            .bind(book.image_thumbnail.as_deref())
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .fetch_one(&self.pool)
            .await;
        let row = match result {
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::debug!("a book with this external id already exists");
                exn::bail!(ErrorKind::Constraint);
            },
            other => other.or_raise(|| ErrorKind::Database)?,
        };
        let book = Book::try_from(row)?;
        tracing::info!(id = book.id, "book created");
        Ok(book)
    }

    // =========================================================================
    // Authors & Categories
    // =========================================================================

    #[instrument(skip(self))]
    async fn find_by_natural_key(&self, kind: RelatedKind, key: &str) -> Result<Option<Related>> {
        let row: Option<RelatedRow> = sqlx::query_as(kind.find_query())
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(row.map(|r| r.into_model(kind)))
    }

    #[instrument(skip(self))]
    async fn create_if_absent(&self, kind: RelatedKind, key: &str) -> Result<(Related, bool)> {
        for attempt in 1..=CREATE_ATTEMPTS {
            match self.insert_related(kind, key).await {
                Ok(related) => {
                    tracing::info!(%kind, id = related.id, "created");
                    return Ok((related, true));
                },
                Err(e) if matches!(&*e, ErrorKind::Constraint) => {
                    if let Some(existing) = self.find_by_natural_key(kind, key).await? {
                        return Ok((existing, false));
                    }
                    tracing::debug!(attempt, "row vanished after a unique violation");
                },
                Err(e) => return Err(e),
            }
        }
        exn::bail!(ErrorKind::Constraint)
    }

    // =========================================================================
    // Links
    // =========================================================================

    #[instrument(skip_all, fields(book = book.id, kind = %related.kind, related = related.id))]
    async fn link_if_absent(&self, book: &Book, related: &Related) -> Result<bool> {
        let result = sqlx::query(related.kind.link_query())
            .bind(book.id)
            .bind(related.id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn list_related(&self, book_id: i64, kind: RelatedKind) -> Result<Vec<Related>> {
        let rows: Vec<RelatedRow> = sqlx::query_as(kind.list_query())
            .bind(book_id)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(rows.into_iter().map(|r| r.into_model(kind)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;

    async fn repo() -> (Database, Repository) {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        (db, repo)
    }

    fn new_book(external_id: Option<&str>) -> NewBook {
        NewBook {
            external_id: external_id.map(str::to_string),
            title: Some("The Left Hand of Darkness".to_string()),
            page_count: Some(304),
            ..NewBook::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_find_book() {
        let (_db, repo) = repo().await;
        let created = repo.create_book(&new_book(Some("zyTCAlFPjgYC"))).await.unwrap();
        assert_eq!(created.page_count, Some(304));
        assert_eq!(repo.find_book(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.find_book_by_external_id("zyTCAlFPjgYC").await.unwrap(), Some(created));
        assert_eq!(repo.find_book(9999).await.unwrap(), None);
        assert_eq!(repo.find_book_by_external_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_external_id_is_constraint() {
        let (_db, repo) = repo().await;
        repo.create_book(&new_book(Some("X1"))).await.unwrap();
        let err = repo.create_book(&new_book(Some("X1"))).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Constraint);
    }

    #[tokio::test]
    async fn test_books_without_external_id_do_not_collide() {
        let (_db, repo) = repo().await;
        let a = repo.create_book(&new_book(None)).await.unwrap();
        let b = repo.create_book(&new_book(None)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[rstest]
    #[case(RelatedKind::Author, "Ursula K. Le Guin")]
    #[case(RelatedKind::Category, "Fiction")]
    #[tokio::test]
    async fn test_create_if_absent_once(#[case] kind: RelatedKind, #[case] key: &str) {
        let (_db, repo) = repo().await;
        let (first, created) = repo.create_if_absent(kind, key).await.unwrap();
        assert!(created);
        assert_eq!(first.key, key);
        assert_eq!(first.kind, kind);
        let (second, created) = repo.create_if_absent(kind, key).await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(repo.find_by_natural_key(kind, key).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_natural_keys_are_case_sensitive() {
        let (_db, repo) = repo().await;
        let (upper, _) = repo.create_if_absent(RelatedKind::Category, "Fiction").await.unwrap();
        let (lower, created) = repo.create_if_absent(RelatedKind::Category, "fiction").await.unwrap();
        assert!(created);
        assert_ne!(upper.id, lower.id);
    }

    #[tokio::test]
    async fn test_kinds_do_not_share_keys() {
        let (_db, repo) = repo().await;
        repo.create_if_absent(RelatedKind::Author, "Poetry").await.unwrap();
        assert_eq!(repo.find_by_natural_key(RelatedKind::Category, "Poetry").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_link_if_absent_is_idempotent() {
        let (_db, repo) = repo().await;
        let book = repo.create_book(&new_book(Some("X1"))).await.unwrap();
        let (author, _) = repo.create_if_absent(RelatedKind::Author, "Octavia E. Butler").await.unwrap();
        assert!(repo.link_if_absent(&book, &author).await.unwrap());
        assert!(!repo.link_if_absent(&book, &author).await.unwrap());
        assert_eq!(repo.list_related(book.id, RelatedKind::Author).await.unwrap(), vec![author]);
        assert!(repo.list_related(book.id, RelatedKind::Category).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_related_is_ordered() {
        let (_db, repo) = repo().await;
        let book = repo.create_book(&new_book(None)).await.unwrap();
        for name in ["Science Fiction", "Classics", "Fantasy"] {
            let (category, _) = repo.create_if_absent(RelatedKind::Category, name).await.unwrap();
            repo.link_if_absent(&book, &category).await.unwrap();
        }
        let keys: Vec<_> = repo
            .list_related(book.id, RelatedKind::Category)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["Classics", "Fantasy", "Science Fiction"]);
    }

    #[tokio::test]
    async fn test_deleting_book_cascades_to_links_only() {
        let (db, repo) = repo().await;
        let book = repo.create_book(&new_book(None)).await.unwrap();
        let (category, _) = repo.create_if_absent(RelatedKind::Category, "Fiction").await.unwrap();
        repo.link_if_absent(&book, &category).await.unwrap();
        sqlx::query("DELETE FROM books WHERE id = ?").bind(book.id).execute(db.pool()).await.unwrap();
        let (links,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM book_categories").fetch_one(db.pool()).await.unwrap();
        assert_eq!(links, 0);
        assert!(repo.find_by_natural_key(RelatedKind::Category, "Fiction").await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_if_absent_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(dir.path().join("catalog.sqlite"), Some(4)).await.unwrap();
        let repo = Arc::new(Repository::from(&db));
        let tasks = (0..8).map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.create_if_absent(RelatedKind::Category, "Fiction").await })
        });
        let results = futures::future::join_all(tasks).await;
        let outcomes: Vec<_> = results.into_iter().map(|r| r.unwrap().unwrap()).collect();
        assert_eq!(outcomes.iter().filter(|(_, created)| *created).count(), 1);
        let first = &outcomes[0].0;
        assert!(outcomes.iter().all(|(related, _)| related == first));
        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories").fetch_one(db.pool()).await.unwrap();
        assert_eq!(rows, 1);
        db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_book_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(dir.path().join("catalog.sqlite"), Some(4)).await.unwrap();
        let repo = Arc::new(Repository::from(&db));
        let tasks = (0..4).map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.create_book(&new_book(Some("X1"))).await })
        });
        let results: Vec<_> = futures::future::join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| **e == ErrorKind::Constraint));
        db.close().await;
    }
}
