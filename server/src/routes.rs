//! Route handlers: one HTTP route, one store operation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;
use crate::model::{Deleted, TodoFields, TodoItem};
use crate::store::parse_id;
use crate::AppState;

pub async fn health() -> &'static str {
    "Todo API is running"
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let todos = state.store.list().await?;
    tracing::debug!(count = todos.len(), "listed todos");
    Ok(Json(todos))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoItem>, ApiError> {
    let id = parse_id(&id)?;
    state.store.get(id).await?.map(Json).ok_or(ApiError::NotFound)
}

pub async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<TodoFields>,
) -> Result<(StatusCode, Json<TodoItem>), ApiError> {
    let todo = state.store.create(input.into_new()).await?;
    tracing::info!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TodoFields>,
) -> Result<Json<TodoItem>, ApiError> {
    let id = parse_id(&id)?;
    let todo = state
        .store
        .update(id, input.into_patch())
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(id = %todo.id, "updated todo");
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.store.delete(id).await?.ok_or(ApiError::NotFound)?;
    tracing::info!(id = %todo.id, "deleted todo");
    Ok(Json(Deleted {
        message: "Todo deleted".to_string(),
        todo,
    }))
}
