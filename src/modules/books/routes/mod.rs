use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use shelf_http::{ApiResponse, AppError, CurrentUser};

use super::models::{BookResponse, CreateBookRequest, UpdateBookRequest};
use crate::state::AppState;
use crate::utils::parse_id;

/// Reads are public; every mutation goes through [`CurrentUser`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
}

async fn list_books(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<BookResponse>>, AppError> {
    let books = state.books.find_all().await?;
    Ok(ApiResponse::ok(
        books.into_iter().map(BookResponse::from).collect(),
    ))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let book = state.books.find_by_id(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(book.into()))
}

async fn create_book(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let book = state.books.create(&caller, request.into()).await?;
    Ok(ApiResponse::created(book.into()))
}

async fn update_book(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<ApiResponse<BookResponse>, AppError> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;

    let book = state.books.update(&caller, id, request.into()).await?;
    Ok(ApiResponse::ok(book.into()))
}

async fn delete_book(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state.books.delete(&caller, parse_id(&id)?).await?;
    Ok(ApiResponse::ack())
}
