use crate::http::AppState;
use crate::http::handler::{ApiError, ApiSuccess, BookHttpResponse, json_body, path_id};
use crate::repositories::{BookRepository, Store};
use crate::validation::{validate_book, validate_title};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use serde_json::Value;
use tracing::info;

pub async fn list_books<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<ApiSuccess<Vec<BookHttpResponse>>, ApiError> {
    info!("GET /api/books");
    let books = state.store().find_all_books().await?;
    let books = books.into_iter().map(BookHttpResponse::from).collect();
    Ok(ApiSuccess::new(StatusCode::OK, books))
}

pub async fn create_book<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    let body = json_body(payload)?;
    info!("POST /api/books - body: {body}");

    let draft = validate_book(&body, state.store()).await?;
    let book = state.store().create_book(&draft).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, book.into()))
}

pub async fn delete_books_by_title<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<String, ApiError> {
    let body = json_body(payload)?;
    let title = validate_title(&body)?;
    info!("DELETE /api/books - title: {title}");

    state.store().delete_books_by_title(&title).await?;
    Ok("Book deleted".to_string())
}

pub async fn get_book<S: Store>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    let id = path_id(path)?;
    info!("GET /api/books/{id}");
    let book = state.store().find_book(id).await?;
    Ok(ApiSuccess::new(StatusCode::OK, book.into()))
}

pub async fn update_book<S: Store>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    let id = path_id(path)?;
    let body = json_body(payload)?;
    info!("PUT /api/books/{id} - body: {body}");

    let draft = validate_book(&body, state.store()).await?;
    state.store().update_book(id, &draft).await?;
    let book = state.store().find_book(id).await?;
    Ok(ApiSuccess::new(StatusCode::OK, book.into()))
}

pub async fn delete_book<S: Store>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<String, ApiError> {
    let id = path_id(path)?;
    info!("DELETE /api/books/{id}");
    state.store().delete_book(id).await?;
    Ok("Book deleted".to_string())
}
