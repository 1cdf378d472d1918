use serde::{Deserialize, Serialize};

/// A catalog entry, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Primary key; immutable once created
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// `{"book": ...}` envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: Book,
}

/// `{"books": [...]}` envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

/// `{"message": ...}` envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
