use crate::http::AppState;
use crate::http::handler::{
    ApiError, ApiSuccess, AuthorHttpResponse, BookHttpResponse, json_body, path_id,
};
use crate::repositories::{AuthorRepository, BookRepository, Store};
use crate::validation::validate_author;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use serde_json::Value;
use tracing::info;

pub async fn list_authors<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<ApiSuccess<Vec<AuthorHttpResponse>>, ApiError> {
    info!("GET /api/authors");
    let authors = state.store().find_all_authors().await?;
    let authors = authors.into_iter().map(AuthorHttpResponse::from).collect();
    Ok(ApiSuccess::new(StatusCode::OK, authors))
}

/// Answers 200 rather than 201, matching the published contract of this endpoint.
pub async fn create_author<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    let body = json_body(payload)?;
    info!("POST /api/authors - body: {body}");

    let draft = validate_author(&body)?;
    let author = state.store().create_author(&draft).await?;
    Ok(ApiSuccess::new(StatusCode::OK, author.into()))
}

pub async fn get_author<S: Store>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    let id = path_id(path)?;
    info!("GET /api/author/{id}");
    let author = state.store().find_author(id).await?;
    Ok(ApiSuccess::new(StatusCode::OK, author.into()))
}

pub async fn update_author<S: Store>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    let id = path_id(path)?;
    let body = json_body(payload)?;
    info!("PUT /api/author/{id} - body: {body}");

    let draft = validate_author(&body)?;
    state.store().update_author(id, &draft).await?;
    let author = state.store().find_author(id).await?;
    Ok(ApiSuccess::new(StatusCode::ACCEPTED, author.into()))
}

pub async fn delete_author<S: Store>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<String, ApiError> {
    let id = path_id(path)?;
    info!("DELETE /api/author/{id}");
    state.store().delete_author(id).await?;
    Ok(format!("Author {id} destroyed"))
}

pub async fn list_author_books<S: Store>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<ApiSuccess<Vec<BookHttpResponse>>, ApiError> {
    let author_id = path_id(path)?;
    info!("GET /api/authors/{author_id}/books");
    let books = state.store().find_books_by_author(author_id).await?;
    let books = books.into_iter().map(BookHttpResponse::from).collect();
    Ok(ApiSuccess::new(StatusCode::OK, books))
}

pub async fn delete_author_books<S: Store>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<String, ApiError> {
    let author_id = path_id(path)?;
    info!("DELETE /api/authors/{author_id}/books");
    state.store().delete_author_books(author_id).await?;
    Ok("ok".to_string())
}
