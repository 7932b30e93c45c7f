/// Task model and database operations
///
/// Tasks are the core entity of StudyDesk: user-owned to-do items that move
/// across a Kanban board and can optionally be mirrored into the user's
/// external calendar.
///
/// # Board columns
///
/// ```text
/// todo ↔ doing ↔ done
/// ```
///
/// Any status value outside that set is rejected at the boundary.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'doing', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
///     title VARCHAR(100) NOT NULL,
///     description TEXT,
///     due_date TIMESTAMPTZ,
///     status task_status NOT NULL DEFAULT 'todo',
///     is_complete BOOLEAN NOT NULL DEFAULT FALSE,
///     google_event_id VARCHAR(255),
///     synced_to_calendar BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use studydesk_shared::models::task::{Task, CreateTask};
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     user_id: Uuid::new_v4(),
///     title: "Revise chapter 4".to_string(),
///     description: None,
///     due_date: None,
///     category_id: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kanban board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started yet
    Todo,

    /// Currently being worked on
    Doing,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to the string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    /// All board columns in display order
    pub fn all() -> [TaskStatus; 3] {
        [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is outside {todo, doing, done}
#[derive(Debug, thiserror::Error)]
#[error("Invalid task status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Task model representing a user-owned to-do item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Optional category label (None if uncategorized or category deleted)
    pub category_id: Option<Uuid>,

    /// Task title (required, at most 100 characters)
    pub title: String,

    /// Free-form description
    pub description: Option<String>,

    /// Optional due timestamp; drives the calendar event window
    pub due_date: Option<DateTime<Utc>>,

    /// Board column
    pub status: TaskStatus,

    /// Completion flag, independent of the board column
    pub is_complete: bool,

    /// Remote calendar event id, set once the task has been mirrored
    pub google_event_id: Option<String>,

    /// Whether the task is currently mirrored to the external calendar
    pub synced_to_calendar: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning user
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional due timestamp
    pub due_date: Option<DateTime<Utc>>,

    /// Optional resolved category
    pub category_id: Option<Uuid>,
}

/// Input for updating an existing task
///
/// Title, description, due date and category are always overwritten; the
/// board column and completion flag have dedicated operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: String,

    /// New description (None clears it)
    pub description: Option<String>,

    /// New due timestamp (None clears it)
    pub due_date: Option<DateTime<Utc>>,

    /// New category (None clears it)
    pub category_id: Option<Uuid>,
}

const TASK_COLUMNS: &str = "id, user_id, category_id, title, description, due_date, status, \
                            is_complete, google_event_id, synced_to_calendar, created_at, updated_at";

impl Task {
    /// Creates a new task in the todo column
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.category_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to its owner
    ///
    /// This is the only lookup route handlers should use; it enforces the
    /// per-request ownership invariant.
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Overwrites title, description, due date and category
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = $3,
                description = $4,
                due_date = $5,
                category_id = $6,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.category_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Moves a task to a board column
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Flips the completion flag
    pub async fn toggle_complete(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET is_complete = NOT is_complete, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Records the remote calendar event backing this task
    pub async fn set_calendar_link(
        pool: &PgPool,
        id: Uuid,
        event_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET google_event_id = $2, synced_to_calendar = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(event_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Drops the remote calendar links for all of a user's tasks
    ///
    /// Used when the user disconnects their calendar: the remote events
    /// are left in place, but the tasks no longer point at them. Returns
    /// the number of tasks that were unlinked.
    pub async fn clear_calendar_links(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET google_event_id = NULL, synced_to_calendar = FALSE, updated_at = NOW()
            WHERE user_id = $1 AND google_event_id IS NOT NULL
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists one board column for a user, oldest first
    pub async fn list_by_user_and_status(
        pool: &PgPool,
        user_id: Uuid,
        status: TaskStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1 AND status = $2
            ORDER BY created_at ASC
            "#,
        ))
        .bind(user_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists all tasks for a user sorted by due date (earliest first,
    /// undated tasks last)
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1
            ORDER BY due_date ASC NULLS LAST, created_at ASC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks with a due date at or after `since`, earliest first
    ///
    /// Feeds the merged schedule view alongside remote calendar events.
    pub async fn list_upcoming(
        pool: &PgPool,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1 AND due_date IS NOT NULL AND due_date >= $2
            ORDER BY due_date ASC
            "#,
        ))
        .bind(user_id)
        .bind(since)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Deletes a task, scoped to its owner
    ///
    /// Remote calendar cleanup is the caller's responsibility and is
    /// best-effort; local deletion must proceed regardless.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::Doing.as_str(), "doing");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!("doing".parse::<TaskStatus>().unwrap(), TaskStatus::Doing);
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
    }

    #[test]
    fn test_status_parse_rejects_unknown_values() {
        for bad in ["pending", "DONE", "in_progress", "", "archived"] {
            let err = bad.parse::<TaskStatus>().unwrap_err();
            assert!(err.to_string().contains("Invalid task status"));
        }
    }

    #[test]
    fn test_status_all_covers_board() {
        let all = TaskStatus::all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], TaskStatus::Todo);
        assert_eq!(all[2], TaskStatus::Done);
    }

    #[test]
    fn test_status_serde_roundtrip() {
        let json = serde_json::to_string(&TaskStatus::Doing).unwrap();
        assert_eq!(json, "\"doing\"");
        let back: TaskStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskStatus::Doing);
    }
}
