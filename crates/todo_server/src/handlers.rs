//! Route handlers.
//!
//! Store calls block on file I/O, so every service call is moved onto the
//! blocking thread pool.

use crate::error::ApiError;
use crate::types::{
    CreateTodoRequest, CreateTodoResponse, EmptyResponse, GreetingResponse, ListQuery,
    TodoJson, TodoListResponse, UpdateTodoRequest,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use todo_core::{ItemId, ItemPatch, TodoError, TodoResult, TodoService};
use tracing::debug;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The todo operations.
    pub service: Arc<TodoService>,
}

impl AppState {
    /// Wraps a service.
    pub fn new(service: Arc<TodoService>) -> Self {
        Self { service }
    }
}

async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> TodoResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// Unparsable identities cannot name an existing item.
fn parse_todo_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Todo(TodoError::NotFound(None)))
}

/// `GET /api`
pub async fn greeting() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: "Hi!".to_string(),
    })
}

/// `POST /api/todos`
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateTodoResponse>), ApiError> {
    let Json(request) = payload?;
    let value = request
        .value
        .ok_or_else(|| TodoError::validation("\"value\" is required"))?;

    let service = state.service.clone();
    let item = run_blocking(move || service.create(&value)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTodoResponse {
            todo: TodoJson::from(&item),
        }),
    ))
}

/// `GET /api/todos?sort=asc|desc`
pub async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<TodoListResponse>, ApiError> {
    let Query(query) = query?;
    let direction = query.sort.unwrap_or_default();

    let service = state.service.clone();
    let items = run_blocking(move || Ok(service.list(direction))).await?;
    debug!(count = items.len(), ?direction, "listed todo items");

    Ok(Json(TodoListResponse {
        todos: items.iter().map(TodoJson::from).collect(),
    }))
}

/// `PATCH /api/todos/:todoId`
pub async fn update_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let id = parse_todo_id(&todo_id)?;
    let Json(request) = payload?;
    let patch = ItemPatch {
        done: request.done_flag(),
        value: request.value,
        order: request.order,
    };

    let service = state.service.clone();
    run_blocking(move || service.update(id, patch)).await?;

    Ok(Json(EmptyResponse {}))
}

/// `DELETE /api/todos/:todoId`
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let id = parse_todo_id(&todo_id)?;

    let service = state.service.clone();
    run_blocking(move || service.delete(id)).await?;

    Ok(Json(EmptyResponse {}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_ids_are_not_found() {
        let err = parse_todo_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, ApiError::Todo(TodoError::NotFound(None))));

        let id = ItemId::new();
        assert_eq!(parse_todo_id(&id.to_string()).unwrap(), id);
    }
}
