//! Data access for the `books` table.

use std::collections::HashMap;

use async_trait::async_trait;
use bookshelf_http::error::AppError;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use super::models::Book;

const SELECT_BOOKS: &str =
    "SELECT isbn, amazon_url, author, language, pages, publisher, title, year FROM books";

const RETURNING_BOOK: &str =
    "RETURNING isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("There is no book with an isbn '{0}'")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => AppError::not_found(error.to_string()),
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e).context("book query failed")),
        }
    }
}

/// Filterable `books` columns. Query keys outside this set never reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Isbn,
    AmazonUrl,
    Author,
    Language,
    Pages,
    Publisher,
    Title,
    Year,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Isbn,
        Column::AmazonUrl,
        Column::Author,
        Column::Language,
        Column::Pages,
        Column::Publisher,
        Column::Title,
        Column::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Isbn => "isbn",
            Column::AmazonUrl => "amazon_url",
            Column::Author => "author",
            Column::Language => "language",
            Column::Pages => "pages",
            Column::Publisher => "publisher",
            Column::Title => "title",
            Column::Year => "year",
        }
    }

    fn is_integer(self) -> bool {
        matches!(self, Column::Pages | Column::Year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i32),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("query parameter '{column}' is not of a type(s) integer")]
pub struct InvalidFilter {
    pub column: &'static str,
}

/// Equality filters for [`BookStore::find_all`], in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilters {
    conditions: Vec<(Column, FilterValue)>,
}

impl BookFilters {
    /// Build filters from raw query-string pairs. Unknown keys are ignored.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, InvalidFilter> {
        let mut conditions = Vec::new();

        for column in Column::ALL {
            let Some(raw) = params.get(column.as_str()) else {
                continue;
            };
            let value = if column.is_integer() {
                let n = raw.parse::<i32>().map_err(|_| InvalidFilter {
                    column: column.as_str(),
                })?;
                FilterValue::Integer(n)
            } else {
                FilterValue::Text(raw.clone())
            };
            conditions.push((column, value));
        }

        for key in params.keys() {
            if !Column::ALL.iter().any(|column| column.as_str() == key.as_str()) {
                tracing::debug!(key = %key, "ignoring unknown book filter");
            }
        }

        Ok(Self { conditions })
    }

    pub fn conditions(&self) -> &[(Column, FilterValue)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Persistence operations for books; one SQL statement each.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books matching `filters`; empty when nothing matches
    async fn find_all(&self, filters: &BookFilters) -> Result<Vec<Book>, StoreError>;

    async fn find_one(&self, isbn: &str) -> Result<Book, StoreError>;

    /// Insert a new row; a duplicate isbn surfaces as a database error
    async fn create(&self, book: &Book) -> Result<Book, StoreError>;

    /// Replace every non-key column of the row keyed by `isbn`
    async fn update(&self, isbn: &str, book: &Book) -> Result<Book, StoreError>;

    async fn remove(&self, isbn: &str) -> Result<(), StoreError>;
}

/// [`BookStore`] backed by the shared PostgreSQL pool.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn find_all_query(filters: &BookFilters) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_BOOKS);

    for (i, (column, value)) in filters.conditions().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(column.as_str());
        builder.push(" = ");
        match value {
            FilterValue::Text(text) => builder.push_bind(text.as_str()),
            FilterValue::Integer(n) => builder.push_bind(*n),
        };
    }

    builder.push(" ORDER BY title, isbn");
    builder
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn find_all(&self, filters: &BookFilters) -> Result<Vec<Book>, StoreError> {
        let books = find_all_query(filters)
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn find_one(&self, isbn: &str) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(&format!("{SELECT_BOOKS} WHERE isbn = $1"))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    async fn create(&self, book: &Book) -> Result<Book, StoreError> {
        let sql = format!(
            "INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) {RETURNING_BOOK}"
        );
        let created = sqlx::query_as::<_, Book>(&sql)
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
        Ok(created)
    }

    async fn update(&self, isbn: &str, book: &Book) -> Result<Book, StoreError> {
        let sql = format!(
            "UPDATE books SET amazon_url = $1, author = $2, language = $3, pages = $4, \
             publisher = $5, title = $6, year = $7 WHERE isbn = $8 {RETURNING_BOOK}"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(&book.amazon_url)
            .bind(&book.author)
            .bind(&book.language)
            .bind(book.pages)
            .bind(&book.publisher)
            .bind(&book.title)
            .bind(book.year)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    async fn remove(&self, isbn: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(isbn.to_string()));
        }
        Ok(())
    }
}
