//! Persistence for the `books` table.
//!
//! `update` and `delete` check for the row with a separate read before the
//! mutating statement. The pair is not wrapped in a transaction; a row removed
//! in between is reported as not found when the mutation touches nothing.

use sqlx::sqlite::SqlitePool;
use thiserror::Error;

use super::models::{Book, BookChanges};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("There is no book with an isbn '{0}'")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Query access to the `books` table over an injected pool.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT isbn, amazon_url, author, language, pages, publisher, title, year
             FROM books",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> Result<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT isbn, amazon_url, author, language, pages, publisher, title, year
             FROM books
             WHERE isbn = ?1",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(isbn.to_string()))
    }

    /// Insert a new row. Duplicate ISBNs surface as [`RepositoryError::Store`].
    pub async fn create(&self, book: &Book) -> Result<Book> {
        let created = sqlx::query_as::<_, Book>(
            "INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING isbn, amazon_url, author, language, pages, publisher, title, year",
        )
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(isbn = %created.isbn, "book created");
        Ok(created)
    }

    /// Overwrite every column except `isbn`.
    pub async fn update(&self, isbn: &str, changes: &BookChanges) -> Result<Book> {
        self.ensure_exists(isbn).await?;
        self.overwrite(isbn, changes).await
    }

    /// The mutating half of [`update`](Self::update). A row that vanished
    /// after the existence check is reported as not found.
    async fn overwrite(&self, isbn: &str, changes: &BookChanges) -> Result<Book> {
        let updated = sqlx::query_as::<_, Book>(
            "UPDATE books
             SET amazon_url = ?1, author = ?2, language = ?3, pages = ?4,
                 publisher = ?5, title = ?6, year = ?7
             WHERE isbn = ?8
             RETURNING isbn, amazon_url, author, language, pages, publisher, title, year",
        )
        .bind(&changes.amazon_url)
        .bind(&changes.author)
        .bind(&changes.language)
        .bind(changes.pages)
        .bind(&changes.publisher)
        .bind(&changes.title)
        .bind(changes.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(isbn.to_string()))?;

        tracing::info!(%isbn, "book updated");
        Ok(updated)
    }

    pub async fn delete(&self, isbn: &str) -> Result<()> {
        self.ensure_exists(isbn).await?;
        self.remove(isbn).await
    }

    /// The mutating half of [`delete`](Self::delete).
    async fn remove(&self, isbn: &str) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM books WHERE isbn = ?1")
            .bind(isbn)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(RepositoryError::NotFound(isbn.to_string()));
        }

        tracing::info!(%isbn, "book deleted");
        Ok(())
    }

    async fn ensure_exists(&self, isbn: &str) -> Result<()> {
        let found: Option<String> = sqlx::query_scalar("SELECT isbn FROM books WHERE isbn = ?1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(isbn.to_string())),
        }
    }
}
