/// Task-to-calendar synchronization
///
/// Maps tasks onto one-hour calendar event windows and keeps the remote
/// mirror in step: push creates, refresh patches (recreating if the remote
/// copy vanished), remove deletes best-effort. `merge_schedule` combines
/// local tasks and remote events into one deduplicated agenda.
///
/// # Event window
///
/// A task with a due date gets the window `[due, due + 1h]`. A task without
/// one is parked a day out, `[now + 24h, now + 25h]`, so it still shows up
/// on the calendar without claiming a real deadline.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Task;

use super::provider::{
    CalendarError, CalendarEvent, CalendarProvider, CalendarResult, CalendarToken, EventPatch,
};

/// Computes the event window for a task due date
pub fn event_window(
    due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = due_date.unwrap_or_else(|| now + Duration::days(1));
    (start, start + Duration::hours(1))
}

/// Builds the event a task should project onto the calendar
pub fn event_for_task(task: &Task, now: DateTime<Utc>) -> CalendarEvent {
    let (start, end) = event_window(task.due_date, now);
    CalendarEvent {
        id: None,
        summary: task.title.clone(),
        description: task.description.clone(),
        start,
        end,
        html_link: None,
    }
}

/// Builds the patch a changed task should apply to its remote event
pub fn patch_for_task(task: &Task, now: DateTime<Utc>) -> EventPatch {
    let (start, end) = event_window(task.due_date, now);
    EventPatch {
        summary: task.title.clone(),
        description: task.description.clone(),
        start,
        end,
    }
}

/// Synchronizes one user's tasks with their calendar
///
/// Holds the provider and the user's decoded token; the caller decides what
/// to do with failures (typically degrade the request and warn).
pub struct TaskSync<'a> {
    provider: &'a dyn CalendarProvider,
    token: CalendarToken,
}

impl<'a> TaskSync<'a> {
    pub fn new(provider: &'a dyn CalendarProvider, token: CalendarToken) -> Self {
        Self { provider, token }
    }

    /// Creates the remote event for a task and returns it
    pub async fn push(&self, task: &Task) -> CalendarResult<CalendarEvent> {
        let event = event_for_task(task, Utc::now());
        debug!(task_id = %task.id, provider = self.provider.name(), "Pushing task to calendar");
        self.provider.create_event(&self.token, &event).await
    }

    /// Brings the remote event in line with the task
    ///
    /// Patches the linked event when it still exists; recreates it when the
    /// remote copy was deleted out from under us. Tasks with no link yet
    /// fall through to a plain create.
    pub async fn refresh(&self, task: &Task) -> CalendarResult<CalendarEvent> {
        let Some(event_id) = task.google_event_id.as_deref() else {
            return self.push(task).await;
        };

        let patch = patch_for_task(task, Utc::now());
        match self.provider.update_event(&self.token, event_id, &patch).await {
            Ok(event) => Ok(event),
            Err(err) if err.is_gone() => {
                warn!(task_id = %task.id, event_id, "Remote event gone, recreating");
                self.push(task).await
            }
            Err(err) => Err(err),
        }
    }

    /// Deletes the remote event, best-effort
    ///
    /// Returns `Ok(true)` when the event was deleted, `Ok(false)` when it
    /// was already gone. Other failures surface so the caller can decide
    /// whether they block anything.
    pub async fn remove(&self, event_id: &str) -> CalendarResult<bool> {
        match self.provider.delete_event(&self.token, event_id).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_gone() => {
                debug!(event_id, "Remote event already gone");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Lists upcoming remote events
    pub async fn upcoming(
        &self,
        since: DateTime<Utc>,
        max_results: usize,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        self.provider.list_upcoming(&self.token, since, max_results).await
    }
}

/// One entry in the merged schedule
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleItem {
    /// Where the entry came from
    pub source: ScheduleSource,

    /// Entry title
    pub title: String,

    /// Entry body text
    pub description: Option<String>,

    /// Window start
    pub start: DateTime<Utc>,

    /// Window end
    pub end: DateTime<Utc>,

    /// Local task id, when the entry is a task
    pub task_id: Option<Uuid>,

    /// Remote event id, when one exists
    pub event_id: Option<String>,

    /// Link to the event in the provider's UI
    pub html_link: Option<String>,
}

/// Origin of a schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleSource {
    /// A task stored in this service
    Task,

    /// An event that exists only on the remote calendar
    Calendar,
}

/// Merges local tasks and remote events into one agenda
///
/// Remote events that mirror a synced task (matched by event id) are
/// dropped in favor of the task entry, so nothing shows up twice. The
/// result is sorted by window start.
pub fn merge_schedule(
    tasks: &[Task],
    remote_events: Vec<CalendarEvent>,
    now: DateTime<Utc>,
) -> Vec<ScheduleItem> {
    let mut items: Vec<ScheduleItem> = Vec::with_capacity(tasks.len() + remote_events.len());

    for task in tasks {
        let (start, end) = event_window(task.due_date, now);
        items.push(ScheduleItem {
            source: ScheduleSource::Task,
            title: task.title.clone(),
            description: task.description.clone(),
            start,
            end,
            task_id: Some(task.id),
            event_id: task.google_event_id.clone(),
            html_link: None,
        });
    }

    for event in remote_events {
        let mirrors_task = event.id.as_deref().is_some_and(|id| {
            tasks.iter().any(|t| t.google_event_id.as_deref() == Some(id))
        });
        if mirrors_task {
            continue;
        }

        items.push(ScheduleItem {
            source: ScheduleSource::Calendar,
            title: event.summary,
            description: event.description,
            start: event.start,
            end: event.end,
            task_id: None,
            event_id: event.id,
            html_link: event.html_link,
        });
    }

    items.sort_by_key(|item| item.start);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::mock::{MockCalendar, MockFailure};
    use crate::models::TaskStatus;
    use chrono::TimeZone;

    fn token() -> CalendarToken {
        CalendarToken {
            access_token: "tok".to_string(),
            calendar_id: "primary".to_string(),
        }
    }

    fn task_due(title: &str, due: Option<DateTime<Utc>>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: None,
            title: title.to_string(),
            description: Some("notes".to_string()),
            due_date: due,
            status: TaskStatus::Todo,
            is_complete: false,
            google_event_id: None,
            synced_to_calendar: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_event_window_from_due_date() {
        let due = Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap();
        let (start, end) = event_window(Some(due), Utc::now());

        assert_eq!(start, due);
        assert_eq!(end, due + Duration::hours(1));
    }

    #[test]
    fn test_event_window_without_due_date() {
        let now = Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap();
        let (start, end) = event_window(None, now);

        assert_eq!(start, now + Duration::days(1));
        assert_eq!(end - start, Duration::hours(1));
    }

    #[tokio::test]
    async fn test_push_creates_remote_event() {
        let mock = MockCalendar::new();
        let due = Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap();
        let task = task_due("Revise calculus", Some(due));

        let sync = TaskSync::new(&mock, token());
        let event = sync.push(&task).await.unwrap();

        assert!(event.id.is_some());
        assert_eq!(event.summary, "Revise calculus");
        assert_eq!(event.start, due);
        assert_eq!(event.end, due + Duration::hours(1));
    }

    #[tokio::test]
    async fn test_refresh_patches_existing_event() {
        let mock = MockCalendar::new();
        let due = Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap();
        let mut task = task_due("Revise calculus", Some(due));

        let sync = TaskSync::new(&mock, token());
        let created = sync.push(&task).await.unwrap();
        let event_id = created.id.clone().unwrap();

        task.google_event_id = Some(event_id.clone());
        task.title = "Revise linear algebra".to_string();
        task.due_date = Some(due + Duration::days(2));

        let updated = sync.refresh(&task).await.unwrap();

        assert_eq!(updated.id.as_deref(), Some(event_id.as_str()));
        assert_eq!(updated.summary, "Revise linear algebra");
        assert_eq!(updated.start, due + Duration::days(2));
        // Provider-owned fields survive the patch
        assert!(updated.html_link.is_some());
    }

    #[tokio::test]
    async fn test_refresh_recreates_when_remote_gone() {
        let mock = MockCalendar::new();
        let mut task = task_due("Revise", Some(Utc::now() + Duration::days(1)));
        task.google_event_id = Some("deleted-remotely".to_string());

        let sync = TaskSync::new(&mock, token());
        let event = sync.refresh(&task).await.unwrap();

        assert!(event.id.is_some());
        assert_ne!(event.id.as_deref(), Some("deleted-remotely"));
        assert_eq!(mock.event_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_is_best_effort() {
        let mock = MockCalendar::new();
        let sync = TaskSync::new(&mock, token());

        let created = sync.push(&task_due("Revise", None)).await.unwrap();
        let event_id = created.id.unwrap();

        assert!(sync.remove(&event_id).await.unwrap());
        assert!(!sync.remove(&event_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_surfaces_non_gone_failures() {
        let mock = MockCalendar::new();
        mock.set_failure(Some(MockFailure::ServerError));

        let sync = TaskSync::new(&mock, token());
        assert!(sync.remove("evt1").await.is_err());
    }

    #[test]
    fn test_merge_schedule_dedupes_synced_tasks() {
        let now = Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap();
        let mut synced = task_due("Synced task", Some(now + Duration::hours(2)));
        synced.google_event_id = Some("evt-synced".to_string());
        let unsynced = task_due("Local only", Some(now + Duration::hours(5)));

        let remote = vec![
            CalendarEvent {
                id: Some("evt-synced".to_string()),
                summary: "Synced task".to_string(),
                description: None,
                start: now + Duration::hours(2),
                end: now + Duration::hours(3),
                html_link: None,
            },
            CalendarEvent {
                id: Some("evt-other".to_string()),
                summary: "Dentist".to_string(),
                description: None,
                start: now + Duration::hours(1),
                end: now + Duration::hours(2),
                html_link: Some("https://calendar.example/evt-other".to_string()),
            },
        ];

        let schedule = merge_schedule(&[synced, unsynced], remote, now);

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[0].title, "Dentist");
        assert_eq!(schedule[0].source, ScheduleSource::Calendar);
        assert_eq!(schedule[1].title, "Synced task");
        assert_eq!(schedule[1].source, ScheduleSource::Task);
        assert_eq!(schedule[2].title, "Local only");
    }

    #[test]
    fn test_merge_schedule_sorted_by_start() {
        let now = Utc::now();
        let later = task_due("Later", Some(now + Duration::hours(8)));
        let sooner = task_due("Sooner", Some(now + Duration::hours(1)));

        let schedule = merge_schedule(&[later, sooner], Vec::new(), now);

        assert_eq!(schedule[0].title, "Sooner");
        assert_eq!(schedule[1].title, "Later");
    }
}
