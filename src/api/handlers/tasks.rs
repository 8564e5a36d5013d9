//! Task scheduling request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::TASK_TAG;
use crate::api::dto::{CreateTaskRequest, TaskResponse, UpdateTaskRequest};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates task-related routes.
pub fn task_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_tasks))
        .routes(routes!(create_task))
        .routes(routes!(update_task))
        .routes(routes!(delete_task))
}

/// GET /tasks - List all tasks
#[utoipa::path(
    get,
    path = "/",
    tag = TASK_TAG,
    responses(
        (status = 200, description = "All tasks", body = Vec<TaskResponse>)
    )
)]
async fn list_tasks(State(state): State<AppState>) -> AppResult<Json<Vec<TaskResponse>>> {
    let tasks = state.services.tasks.list().await?;
    let responses: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();
    Ok(Json(responses))
}

/// POST /tasks - Create a task and arm its trigger
#[utoipa::path(
    post,
    path = "/",
    tag = TASK_TAG,
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskResponse),
        (status = 400, description = "Missing or invalid schedule field", body = crate::api::dto::ErrorResponse)
    )
)]
async fn create_task(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    let definition = req.into_definition()?;
    let task = state.services.tasks.create(definition).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// PUT /tasks/{id} - Update a task and replace its trigger
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 404, description = "Task not found", body = crate::api::dto::ErrorResponse)
    )
)]
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    let definition = req.into_definition()?;
    let task = state.services.tasks.update(id, definition).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// DELETE /tasks/{id} - Delete a task and cancel its trigger
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = crate::api::dto::ErrorResponse)
    )
)]
async fn delete_task(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.tasks.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
