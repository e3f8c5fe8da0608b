//! HTTP handlers for `/books`.
//!
//! Each handler validates (for writes), calls the repository once, and shapes
//! the response. Status codes come from the [`AppError`] conversions below.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::error::{AppError, ErrorBody, ValidationBody};
use serde_json::Value;

use super::models::{Book, BookChanges, BookResponse, BooksResponse, MessageResponse};
use super::repository::{BookRepository, RepositoryError};
use super::schema::BOOK_SCHEMA;
use crate::utils::validation::{parse, Mode, ValidationError};

/// Routes relative to the module mount point.
pub fn router(repo: BookRepository) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(repo)
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => AppError::not_found(err.to_string()),
            RepositoryError::Store(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.errors)
    }
}

#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Every stored book", body = BooksResponse),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn list_books(State(repo): State<BookRepository>) -> Result<Json<BooksResponse>, AppError> {
    let books = repo.list_all().await?;
    Ok(Json(BooksResponse { books }))
}

#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "ISBN of the book")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "No book with that ISBN", body = ErrorBody),
    )
)]
pub async fn get_book(
    State(repo): State<BookRepository>,
    isbn: Result<Path<String>, PathRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Path(isbn) = isbn?;
    let book = repo.get_by_isbn(&isbn).await?;
    Ok(Json(BookResponse { book }))
}

#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = Book,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Payload failed validation", body = ValidationBody),
        (status = 500, description = "Store failure, including duplicate ISBN", body = ErrorBody),
    )
)]
pub async fn create_book(
    State(repo): State<BookRepository>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let Json(payload) = payload?;
    let book: Book = parse(payload, BOOK_SCHEMA, Mode::Create)?;

    let book = repo.create(&book).await?;
    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

#[utoipa::path(
    put,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "ISBN of the book")),
    request_body = BookChanges,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Payload failed validation", body = ValidationBody),
        (status = 404, description = "No book with that ISBN", body = ErrorBody),
    )
)]
pub async fn update_book(
    State(repo): State<BookRepository>,
    isbn: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Path(isbn) = isbn?;
    let Json(payload) = payload?;
    let changes: BookChanges = parse(payload, BOOK_SCHEMA, Mode::Update)?;

    let book = repo.update(&isbn, &changes).await?;
    Ok(Json(BookResponse { book }))
}

#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "ISBN of the book")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "No book with that ISBN", body = ErrorBody),
    )
)]
pub async fn delete_book(
    State(repo): State<BookRepository>,
    isbn: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(isbn) = isbn?;
    repo.delete(&isbn).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}
