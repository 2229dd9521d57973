//! Auth module: exchanges credentials for a bearer token.

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::json;
use shelf_http::{ApiResponse, AppError};
use shelf_kernel::{InitCtx, Module};

use super::openapi::{data_envelope, error_response};
use super::users::models::{LoginRequest, LoginResponse};
use crate::state::AppState;

pub struct AuthModule {
    state: AppState,
}

impl AuthModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/login", post(login))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/login": {
                    "post": {
                        "summary": "Log in with email and password",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Login" }
                                }
                            }
                        },
                        "responses": {
                            "200": data_envelope("Bearer token", json!({
                                "type": "object",
                                "properties": { "token": { "type": "string" } },
                                "required": ["token"]
                            })),
                            "401": error_response("Unknown email or wrong password"),
                            "422": error_response("Validation error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Login": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string" }
                        },
                        "required": ["email", "password"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            token_ttl = %self.state.gate.tokens().ttl(),
            "auth module started"
        );
        Ok(())
    }
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let token = state.users.login(&request.email, &request.password).await?;
    Ok(ApiResponse::ok(LoginResponse { token }))
}

pub fn create_module(state: AppState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthModule::new(state))
}
