use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A book as stored in the `books` table.
///
/// Also the create payload: a new book carries all eight fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Book {
    /// ISBN, the primary key. Never changes after creation.
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// Replacement values for every mutable column of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookChanges {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

impl BookChanges {
    /// The book that results from applying these changes to `isbn`.
    pub fn into_book(self, isbn: impl Into<String>) -> Book {
        Book {
            isbn: isbn.into(),
            amazon_url: self.amazon_url,
            author: self.author,
            language: self.language,
            pages: self.pages,
            publisher: self.publisher,
            title: self.title,
            year: self.year,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub book: Book,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
