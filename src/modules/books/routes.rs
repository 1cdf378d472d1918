use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::error::AppError;
use serde_json::Value;

use super::{
    models::{BookResponse, BooksResponse, MessageResponse},
    schema,
    store::{BookFilters, BookStore},
};

pub type SharedStore = Arc<dyn BookStore>;

/// Routes relative to the module mount point (`/books`).
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{isbn}", get(get_book).put(update_book).delete(delete_book))
        .with_state(store)
}

/// GET / => {books: [book, ...]}
async fn list_books(
    State(store): State<SharedStore>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<BooksResponse>, AppError> {
    let Query(params) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let filters = BookFilters::from_query(&params).map_err(|e| AppError::bad_request(e.to_string()))?;

    let books = store.find_all(&filters).await?;
    tracing::debug!(count = books.len(), filtered = !filters.is_empty(), "listed books");

    Ok(Json(BooksResponse { books }))
}

/// GET /{isbn} => {book: book}
async fn get_book(
    State(store): State<SharedStore>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let isbn = isbn_from(path)?;
    let book = store.find_one(&isbn).await?;
    Ok(Json(BookResponse { book }))
}

/// POST / bookData => {book: newBook}
async fn create_book(
    State(store): State<SharedStore>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let Json(body) = body?;
    let book = schema::validate_book(&body).map_err(AppError::validation)?;

    let book = store.create(&book).await?;
    tracing::info!(isbn = %book.isbn, "book created");

    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

/// PUT /{isbn} bookData => {book: updatedBook}
async fn update_book(
    State(store): State<SharedStore>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let isbn = isbn_from(path)?;
    let Json(body) = body?;
    let book = schema::validate_book(&body).map_err(AppError::validation)?;

    if let Some(mismatch) = schema::isbn_mismatch(&isbn, &book) {
        // A missing row is reported as 404 before the rename is refused.
        store.find_one(&isbn).await?;
        return Err(AppError::validation(vec![mismatch]));
    }

    let book = store.update(&isbn, &book).await?;
    tracing::info!(isbn = %book.isbn, "book updated");

    Ok(Json(BookResponse { book }))
}

/// DELETE /{isbn} => {message: "Book deleted"}
async fn delete_book(
    State(store): State<SharedStore>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let isbn = isbn_from(path)?;
    store.remove(&isbn).await?;
    tracing::info!(isbn = %isbn, "book deleted");

    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}

fn isbn_from(path: Result<Path<String>, PathRejection>) -> Result<String, AppError> {
    let Path(isbn) = path.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    Ok(isbn)
}
