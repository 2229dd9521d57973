pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_kernel::{InitCtx, Module};

use super::openapi::{data_envelope, error_response, id_parameter};
use crate::state::AppState;

/// Books module: public reads, owner-only writes.
pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
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
            backend = ?ctx.settings.storage.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router().with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book = json!({ "$ref": "#/components/schemas/Book" });

        Some(json!({
            "paths": {
                "": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": data_envelope("List of books", json!({ "type": "array", "items": book })),
                            "500": error_response("Storage failure")
                        }
                    },
                    "post": {
                        "summary": "Create a book owned by the caller",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": data_envelope("Created book", book.clone()),
                            "401": error_response("Missing or invalid token"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/{id}": {
                    "parameters": [id_parameter("Book id")],
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": data_envelope("Book", book.clone()),
                            "404": error_response("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book you own",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/UpdateBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": data_envelope("Updated book", book.clone()),
                            "401": error_response("Missing or invalid token"),
                            "403": error_response("Not the owner"),
                            "404": error_response("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book you own",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": data_envelope("Deleted", json!({ "type": "null" })),
                            "401": error_response("Missing or invalid token"),
                            "403": error_response("Not the owner"),
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "isbn": { "type": "string" },
                            "writer": { "type": "string" },
                            "owner_id": { "type": "integer", "format": "int64" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "isbn", "writer", "owner_id", "created_at", "updated_at"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "isbn": { "type": "string" },
                            "writer": { "type": "string" }
                        },
                        "required": ["title", "isbn", "writer"]
                    },
                    "UpdateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "isbn": { "type": "string" },
                            "writer": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(state: AppState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(state))
}
