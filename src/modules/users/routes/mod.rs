use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use shelf_http::{ApiResponse, AppError, CurrentUser};

use super::models::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::state::AppState;
use crate::utils::parse_id;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn list_users(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserResponse>>, AppError> {
    let users = state.users.find_all().await?;
    Ok(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = state.users.find_by_id(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let user = state.users.create(request.into_new_user()).await?;
    Ok(ApiResponse::created(user.into()))
}

async fn update_user(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;
    request.validate()?;

    let user = state.users.update(&caller, id, request.into()).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn delete_user(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state.users.delete(&caller, parse_id(&id)?).await?;
    Ok(ApiResponse::ack())
}
