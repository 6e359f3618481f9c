//! Task CRUD endpoints under `/api/tasks`.
//!
//! Only create validates its body. Replace and patch accept the update shape
//! as-is and differ solely in merge policy (see [`crate::services::task`]).

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::error::ErrorResponse;
use crate::schemas::task::{validate_create, CreateTaskRequest, TaskResponse, UpdateTaskRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_tasks, get_task, create_task, replace_task, patch_task, delete_task),
    components(schemas(CreateTaskRequest, UpdateTaskRequest, TaskResponse, ErrorResponse))
)]
pub struct TasksApi;

/// Register task routes (nested under `/api`).
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task)
                .put(replace_task)
                .patch(patch_task)
                .delete(delete_task),
        )
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "All tasks", body = [TaskResponse]),
        (status = 500, description = "Store error", body = ErrorResponse),
    )
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let records = state.tasks.list_all().await?;
    Ok(Json(records.iter().map(|r| r.to_response()).collect()))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = i64, Path, description = "ID of the task to retrieve")
    ),
    responses(
        (status = 200, description = "Task retrieved", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse),
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ServerError> {
    let record = state
        .tasks
        .get_by_id(id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Task with id {id} not found.")))?;
    Ok(Json(record.to_response()))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskResponse),
        (status = 400, description = "Malformed body or validation failed", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse),
    )
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ServerError> {
    let Json(req) = payload?;
    validate_create(&req)?;
    let record = state.tasks.create(req.to_record()).await?;
    Ok(Json(record.to_response()))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = i64, Path, description = "ID of the task to replace")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task replaced; omitted fields are cleared", body = TaskResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse),
    )
)]
pub async fn replace_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ServerError> {
    let Json(req) = payload?;
    let record = state.tasks.replace(id, req).await?;
    Ok(Json(record.to_response()))
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = i64, Path, description = "ID of the task to patch")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task patched; omitted fields are kept", body = TaskResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse),
    )
)]
pub async fn patch_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ServerError> {
    let Json(req) = payload?;
    let record = state.tasks.patch(id, req).await?;
    Ok(Json(record.to_response()))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = i64, Path, description = "ID of the task to delete")
    ),
    responses(
        (status = 200, description = "Task deleted", body = String, content_type = "text/plain"),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse),
    )
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<String, ServerError> {
    state.tasks.delete(id).await
}

// ── Tests ──────────────────────────────────────────────────────────────────────
