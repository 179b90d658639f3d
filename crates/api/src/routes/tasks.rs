//! Task routes.
//!
//! Members see and touch only their own tasks; administrators can reach
//! any task and optionally filter listings by owner. Tasks outside the
//! caller's scope answer 404, never 403, so ownership is not probeable.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_task_created;
use crate::routes::load_profile;
use domain::models::task::{
    CreateTaskRequest, ListTasksResponse, Task, TaskPriority, TaskStatus, UpdateTaskRequest,
};
use persistence::entities::TaskEntity;
use persistence::repositories::TaskRepository;

/// Query parameters for task listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTasksQuery {
    /// Admin-only filter; ignored for members.
    pub owner_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl ListTasksQuery {
    fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 200), self.offset.max(0))
    }
}

/// List tasks, newest first.
///
/// GET /api/v1/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<ListTasksResponse>, ApiError> {
    let profile = load_profile(&state, user_auth.user_id).await?;
    let (limit, offset) = query.clamped();
    let repo = TaskRepository::new(state.pool.clone());

    let entities = if profile.role.is_admin() {
        repo.list_all(query.owner_id, limit, offset).await?
    } else {
        repo.list_by_owner(user_auth.user_id, limit, offset).await?
    };

    Ok(Json(ListTasksResponse {
        data: entities.into_iter().map(Task::from).collect(),
    }))
}

/// Create a task owned by the caller.
///
/// POST /api/v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    request.validate()?;

    let status = request.status.unwrap_or_default();
    let priority = request.priority.unwrap_or_default();

    let repo = TaskRepository::new(state.pool.clone());
    let entity = repo
        .create(
            user_auth.user_id,
            &request.title,
            request.description.as_deref(),
            status.as_str(),
            priority.rank(),
            request.due_date,
            request.category.as_deref(),
        )
        .await?;

    record_task_created();

    let task = Task::from(entity);
    info!(task_id = %task.id, owner_id = %task.owner_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetch a single task.
///
/// GET /api/v1/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let entity = find_in_scope(&state, user_auth.user_id, task_id).await?;
    Ok(Json(entity.into()))
}

/// Update a task. Absent fields keep their current values.
///
/// PUT /api/v1/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    request.validate()?;

    let current = Task::from(find_in_scope(&state, user_auth.user_id, task_id).await?);

    let title = request.title.unwrap_or(current.title);
    let description = request.description.or(current.description);
    let status: TaskStatus = request.status.unwrap_or(current.status);
    let priority: TaskPriority = request.priority.unwrap_or(current.priority);
    let due_date = request.due_date.or(current.due_date);
    let category = request.category.or(current.category);

    let repo = TaskRepository::new(state.pool.clone());
    let entity = repo
        .update(
            task_id,
            current.owner_id,
            &title,
            description.as_deref(),
            status.as_str(),
            priority.rank(),
            due_date,
            category.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(entity.into()))
}

/// Delete a task.
///
/// DELETE /api/v1/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let current = find_in_scope(&state, user_auth.user_id, task_id).await?;

    let repo = TaskRepository::new(state.pool.clone());
    let deleted = repo.delete(task_id, current.owner_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    info!(task_id = %task_id, user_id = %user_auth.user_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Resolves a task the caller is allowed to touch.
///
/// Members only reach their own tasks; administrators reach any task.
/// Everything else looks like a missing task.
async fn find_in_scope(
    state: &AppState,
    user_id: Uuid,
    task_id: Uuid,
) -> Result<TaskEntity, ApiError> {
    let profile = load_profile(state, user_id).await?;
    let repo = TaskRepository::new(state.pool.clone());

    let entity = if profile.role.is_admin() {
        repo.find_by_id_any(task_id).await?
    } else {
        repo.find_by_id(task_id, user_id).await?
    };

    entity.ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_clamps() {
        let q = ListTasksQuery {
            owner_id: None,
            limit: 10_000,
            offset: -1,
        };
        assert_eq!(q.clamped(), (200, 0));
    }
}
