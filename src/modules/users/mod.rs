pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_kernel::{InitCtx, Module};

use super::openapi::{data_envelope, error_response, id_parameter};
use crate::state::AppState;

/// Users module: signup, listing, and self-service profile changes.
pub struct UsersModule {
    state: AppState,
}

impl UsersModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.storage.backend,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router().with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "": {
                    "get": {
                        "summary": "List users",
                        "tags": ["Users"],
                        "responses": {
                            "200": data_envelope("List of users", json!({
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/User" }
                            })),
                            "500": error_response("Storage failure")
                        }
                    },
                    "post": {
                        "summary": "Sign up",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateUser" }
                                }
                            }
                        },
                        "responses": {
                            "201": data_envelope("Created user", json!({ "$ref": "#/components/schemas/User" })),
                            "400": error_response("Malformed body"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/{id}": {
                    "parameters": [id_parameter("User id")],
                    "get": {
                        "summary": "Get a user",
                        "tags": ["Users"],
                        "responses": {
                            "200": data_envelope("User", json!({ "$ref": "#/components/schemas/User" })),
                            "404": error_response("User not found")
                        }
                    },
                    "put": {
                        "summary": "Update your own user",
                        "tags": ["Users"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/UpdateUser" }
                                }
                            }
                        },
                        "responses": {
                            "200": data_envelope("Updated user", json!({ "$ref": "#/components/schemas/User" })),
                            "401": error_response("Missing or invalid token"),
                            "403": error_response("Not your user"),
                            "404": error_response("User not found"),
                            "422": error_response("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete your own user",
                        "tags": ["Users"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": data_envelope("Deleted", json!({ "type": "null" })),
                            "401": error_response("Missing or invalid token"),
                            "403": error_response("Not your user"),
                            "404": error_response("User not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "name", "email", "created_at", "updated_at"]
                    },
                    "CreateUser": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "minLength": 8 }
                        },
                        "required": ["name", "email", "password"]
                    },
                    "UpdateUser": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "minLength": 8 }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Create a new instance of the users module
pub fn create_module(state: AppState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(UsersModule::new(state))
}
