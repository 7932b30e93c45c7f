/// Task endpoints
///
/// Tasks live on a three-column board (todo / doing / done) and carry an
/// optional due date and free-text category. Creating or updating a task
/// mirrors it to the user's calendar when sync is enabled; mirroring is
/// best-effort and never fails the request. When the calendar call fails,
/// the response carries a `calendar_warning` instead.
///
/// # Endpoints
///
/// - `GET    /v1/tasks` - List tasks (optional `?status=` filter)
/// - `POST   /v1/tasks` - Create task
/// - `GET    /v1/tasks/board` - Board view grouped by column
/// - `GET    /v1/tasks/:id` - Get task
/// - `PUT    /v1/tasks/:id` - Update task
/// - `DELETE /v1/tasks/:id` - Delete task (removes the remote event too)
/// - `POST   /v1/tasks/:id/status` - Move between board columns
/// - `POST   /v1/tasks/:id/complete` - Toggle the completion flag

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::check_request,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studydesk_shared::{
    auth::middleware::AuthContext,
    calendar::{CalendarToken, TaskSync},
    models::{
        task::{CreateTask, UpdateTask},
        Category, Task, TaskStatus, User,
    },
};
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional due timestamp
    pub due_date: Option<DateTime<Utc>>,

    /// Free-text category label (resolved to a category, creating it if new)
    pub category: Option<String>,
}

/// Update task request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// New description (None clears it)
    pub description: Option<String>,

    /// New due timestamp (None clears it)
    pub due_date: Option<DateTime<Utc>>,

    /// New free-text category label (None clears the category)
    pub category: Option<String>,
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// Target board column ("todo", "doing" or "done")
    pub status: String,
}

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Optional board column filter
    pub status: Option<String>,
}

/// Task response, optionally carrying a calendar warning
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// The task
    pub task: Task,

    /// Set when calendar mirroring was attempted and failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_warning: Option<String>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    /// Always true on success
    pub deleted: bool,

    /// Set when the remote event could not be removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_warning: Option<String>,
}

/// Board view grouped by column
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub todo: Vec<Task>,
    pub doing: Vec<Task>,
    pub done: Vec<Task>,
}

/// Resolves a free-text category label to a category id
///
/// Blank labels resolve to no category; anything else is normalized and
/// reused or created under the requesting user.
async fn resolve_category(
    state: &AppState,
    user_id: Uuid,
    label: Option<&str>,
) -> ApiResult<Option<Uuid>> {
    let Some(label) = label else {
        return Ok(None);
    };
    if label.trim().is_empty() {
        return Ok(None);
    }

    let category = Category::find_or_create(&state.db, user_id, label).await?;
    Ok(Some(category.id))
}

/// Mirrors a task to the user's calendar, best-effort
///
/// Returns the task (re-read when the calendar link changed) and a warning
/// when mirroring failed. Auth failures additionally turn the user's sync
/// flag off so we stop retrying a dead token on every request.
async fn mirror_to_calendar(
    state: &AppState,
    user_id: Uuid,
    task: Task,
) -> ApiResult<(Task, Option<String>)> {
    let user = match User::find_by_id(&state.db, user_id).await? {
        Some(user) => user,
        None => return Ok((task, None)),
    };

    if !user.calendar_sync_enabled {
        return Ok((task, None));
    }
    let Some(blob) = user.google_token.as_deref() else {
        return Ok((task, None));
    };

    let token = match CalendarToken::from_blob(blob, user.google_calendar_id.as_deref()) {
        Ok(token) => token,
        Err(err) => {
            warn!(user_id = %user_id, "Stored calendar token is unusable: {}", err);
            return Ok((
                task,
                Some("Calendar sync failed: stored credentials are unusable. Please reconnect your calendar.".to_string()),
            ));
        }
    };

    let sync = TaskSync::new(state.calendar.as_ref(), token);
    match sync.refresh(&task).await {
        Ok(event) => {
            // A freshly created (or recreated) event needs its id persisted
            if let Some(event_id) = event.id.as_deref() {
                if task.google_event_id.as_deref() != Some(event_id) {
                    if let Some(linked) =
                        Task::set_calendar_link(&state.db, task.id, event_id).await?
                    {
                        return Ok((linked, None));
                    }
                }
            }
            Ok((task, None))
        }
        Err(err) if err.is_auth() => {
            warn!(user_id = %user_id, "Calendar rejected credentials, disabling sync: {}", err);
            User::disable_calendar_sync(&state.db, user_id).await?;
            Ok((
                task,
                Some("Calendar authorization failed. Sync has been disabled; please reconnect your calendar.".to_string()),
            ))
        }
        Err(err) => {
            warn!(user_id = %user_id, task_id = %task.id, "Calendar sync failed: {}", err);
            Ok((task, Some(format!("Calendar sync failed: {}", err))))
        }
    }
}

/// Removes a task's remote event, best-effort
///
/// Returns a warning when the remote side could not be cleaned up; the
/// local delete proceeds regardless.
async fn remove_from_calendar(state: &AppState, user_id: Uuid, task: &Task) -> Option<String> {
    let event_id = task.google_event_id.as_deref()?;

    let user = match User::find_by_id(&state.db, user_id).await {
        Ok(Some(user)) => user,
        _ => return None,
    };
    let blob = user.google_token.as_deref()?;

    let token = match CalendarToken::from_blob(blob, user.google_calendar_id.as_deref()) {
        Ok(token) => token,
        Err(_) => return None,
    };

    let sync = TaskSync::new(state.calendar.as_ref(), token);
    match sync.remove(event_id).await {
        Ok(_) => None,
        Err(err) if err.is_auth() => {
            warn!(user_id = %user_id, "Calendar rejected credentials, disabling sync: {}", err);
            if let Err(db_err) = User::disable_calendar_sync(&state.db, user_id).await {
                warn!(user_id = %user_id, "Failed to disable calendar sync: {}", db_err);
            }
            Some("Task deleted, but calendar authorization failed. Sync has been disabled; please reconnect your calendar.".to_string())
        }
        Err(err) => {
            warn!(task_id = %task.id, event_id, "Failed to remove remote event: {}", err);
            Some(format!("Task deleted, but its calendar event could not be removed: {}", err))
        }
    }
}

/// List tasks, optionally filtered by board column
///
/// # Errors
///
/// - `400 Bad Request`: Unknown status filter
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = match query.status.as_deref() {
        Some(raw) => {
            let status: TaskStatus = raw
                .parse()
                .map_err(|e: studydesk_shared::models::task::InvalidStatus| {
                    ApiError::BadRequest(e.to_string())
                })?;
            Task::list_by_user_and_status(&state.db, auth.user_id, status).await?
        }
        None => Task::list_by_user(&state.db, auth.user_id).await?,
    };

    Ok(Json(tasks))
}

/// Board view: all tasks grouped by column
pub async fn board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<BoardResponse>> {
    let todo = Task::list_by_user_and_status(&state.db, auth.user_id, TaskStatus::Todo).await?;
    let doing = Task::list_by_user_and_status(&state.db, auth.user_id, TaskStatus::Doing).await?;
    let done = Task::list_by_user_and_status(&state.db, auth.user_id, TaskStatus::Done).await?;

    Ok(Json(BoardResponse { todo, doing, done }))
}

/// Create a task
///
/// The task starts in the todo column. When the user has calendar sync
/// enabled the task is mirrored to their calendar; a sync failure degrades
/// to a `calendar_warning` in the response.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    check_request(&req)?;

    let category_id = resolve_category(&state, auth.user_id, req.category.as_deref()).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            category_id,
        },
    )
    .await?;

    let (task, calendar_warning) = mirror_to_calendar(&state, auth.user_id, task).await?;

    Ok(Json(TaskResponse {
        task,
        calendar_warning,
    }))
}

/// Get a single task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Update a task
///
/// Overwrites title, description, due date and category, then brings the
/// remote calendar event in line (best-effort).
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    check_request(&req)?;

    let category_id = resolve_category(&state, auth.user_id, req.category.as_deref()).await?;

    let task = Task::update(
        &state.db,
        id,
        auth.user_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            category_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let (task, calendar_warning) = mirror_to_calendar(&state, auth.user_id, task).await?;

    Ok(Json(TaskResponse {
        task,
        calendar_warning,
    }))
}

/// Delete a task
///
/// The remote calendar event is removed first, best-effort; the local
/// delete always proceeds.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let task = Task::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let calendar_warning = remove_from_calendar(&state, auth.user_id, &task).await;

    let deleted = Task::delete(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(DeleteTaskResponse {
        deleted,
        calendar_warning,
    }))
}

/// Move a task between board columns
///
/// # Errors
///
/// - `400 Bad Request`: Status is not one of todo / doing / done
/// - `404 Not Found`: No such task for this user
pub async fn set_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<Task>> {
    let status: TaskStatus = req
        .status
        .parse()
        .map_err(|e: studydesk_shared::models::task::InvalidStatus| {
            ApiError::BadRequest(e.to_string())
        })?;

    let task = Task::set_status(&state.db, id, auth.user_id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Toggle a task's completion flag
pub async fn toggle_complete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::toggle_complete(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}
