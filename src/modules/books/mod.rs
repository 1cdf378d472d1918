pub mod models;
pub mod routes;
pub mod schema;
pub mod store;


use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Migration, Module};
use axum::Router;
use serde_json::json;
use sqlx::PgPool;

use store::{BookStore, PgBookStore};

/// Book catalog: CRUD over the `books` table
pub struct BooksModule {
    store: Arc<dyn BookStore>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Book" }
                }
            }
        });
        let book_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/BookResponse" }
                    }
                }
            })
        };
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let isbn_param = json!([{
            "name": "isbn",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books, optionally filtered by column equality",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Matching books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BooksResponse" }
                                    }
                                }
                            },
                            "400": error_response("Filter value has the wrong type")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_body,
                        "responses": {
                            "201": book_response("Created book"),
                            "400": error_response("Body failed schema validation")
                        }
                    }
                },
                "/{isbn}": {
                    "get": {
                        "summary": "Get a book by ISBN",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "responses": {
                            "200": book_response("The book"),
                            "404": error_response("No book with that ISBN")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "requestBody": book_body,
                        "responses": {
                            "200": book_response("Updated book"),
                            "400": error_response("Body failed schema validation"),
                            "404": error_response("No book with that ISBN")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "responses": {
                            "200": {
                                "description": "Book deleted",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": { "message": { "type": "string" } },
                                            "required": ["message"]
                                        }
                                    }
                                }
                            },
                            "404": error_response("No book with that ISBN")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "isbn": { "type": "string" },
                            "amazon_url": { "type": "string" },
                            "author": { "type": "string" },
                            "language": { "type": "string" },
                            "pages": { "type": "integer", "format": "int32" },
                            "publisher": { "type": "string" },
                            "title": { "type": "string" },
                            "year": { "type": "integer", "format": "int32" }
                        },
                        "required": [
                            "isbn", "amazon_url", "author", "language",
                            "pages", "publisher", "title", "year"
                        ],
                        "additionalProperties": false
                    },
                    "BookResponse": {
                        "type": "object",
                        "properties": {
                            "book": { "$ref": "#/components/schemas/Book" }
                        },
                        "required": ["book"]
                    },
                    "BooksResponse": {
                        "type": "object",
                        "properties": {
                            "books": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            }
                        },
                        "required": ["books"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    isbn       TEXT PRIMARY KEY,
                    amazon_url TEXT NOT NULL,
                    author     TEXT NOT NULL,
                    language   TEXT NOT NULL,
                    pages      INTEGER NOT NULL,
                    publisher  TEXT NOT NULL,
                    title      TEXT NOT NULL,
                    year       INTEGER NOT NULL
                );
                "#,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over the shared pool
pub fn create_module(pool: PgPool) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(PgBookStore::new(pool))))
}
