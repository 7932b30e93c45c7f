/// In-memory mock calendar for testing
///
/// Deterministic `CalendarProvider` backed by a HashMap. Supports simulated
/// failures so degraded-sync paths can be exercised without a network.
///
/// # Behavior
///
/// - Created events get sequential ids (`mock-event-1`, `mock-event-2`, ...)
///   and a provider-assigned `html_link`, mirroring the fields a real
///   service fills in
/// - Updates overwrite only the patch fields; everything else on the stored
///   event (id, html_link) is preserved
/// - Deleting or fetching an unknown id yields `CalendarError::EventGone`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::provider::{
    CalendarError, CalendarEvent, CalendarProvider, CalendarResult, CalendarToken, EventPatch,
};

/// Failure the mock should simulate on every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Credentials rejected (401)
    Auth,

    /// Remote service broken (500)
    ServerError,
}

impl MockFailure {
    fn to_error(self) -> CalendarError {
        match self {
            MockFailure::Auth => CalendarError::Auth("mock: token rejected".to_string()),
            MockFailure::ServerError => CalendarError::Api {
                status: 500,
                message: "mock: internal error".to_string(),
            },
        }
    }
}

/// Mock calendar provider
#[derive(Default)]
pub struct MockCalendar {
    events: Mutex<HashMap<String, CalendarEvent>>,
    next_id: AtomicU64,
    failure: Mutex<Option<MockFailure>>,
}

impl MockCalendar {
    /// Creates an empty mock calendar
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with the given failure
    pub fn set_failure(&self, failure: Option<MockFailure>) {
        *self.failure.lock().unwrap() = failure;
    }

    /// Seeds a remote event directly (simulates events created elsewhere)
    pub fn seed_event(&self, event: CalendarEvent) -> String {
        let id = event
            .id
            .clone()
            .unwrap_or_else(|| self.assign_id());
        let mut stored = event;
        stored.id = Some(id.clone());
        self.events.lock().unwrap().insert(id.clone(), stored);
        id
    }

    /// Returns the stored event, for assertions
    pub fn stored_event(&self, event_id: &str) -> Option<CalendarEvent> {
        self.events.lock().unwrap().get(event_id).cloned()
    }

    /// Number of stored events
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    fn assign_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("mock-event-{}", n)
    }

    fn check_failure(&self) -> CalendarResult<()> {
        if let Some(failure) = *self.failure.lock().unwrap() {
            return Err(failure.to_error());
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarProvider for MockCalendar {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_event(
        &self,
        _token: &CalendarToken,
        event: &CalendarEvent,
    ) -> CalendarResult<CalendarEvent> {
        self.check_failure()?;

        let id = self.assign_id();
        let mut created = event.clone();
        created.id = Some(id.clone());
        created.html_link = Some(format!("https://calendar.example/events/{}", id));

        self.events.lock().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn get_event(
        &self,
        _token: &CalendarToken,
        event_id: &str,
    ) -> CalendarResult<CalendarEvent> {
        self.check_failure()?;

        self.events
            .lock()
            .unwrap()
            .get(event_id)
            .cloned()
            .ok_or_else(|| CalendarError::EventGone(event_id.to_string()))
    }

    async fn update_event(
        &self,
        _token: &CalendarToken,
        event_id: &str,
        patch: &EventPatch,
    ) -> CalendarResult<CalendarEvent> {
        self.check_failure()?;

        let mut events = self.events.lock().unwrap();
        let event = events
            .get_mut(event_id)
            .ok_or_else(|| CalendarError::EventGone(event_id.to_string()))?;

        // Only the patch fields change; id and html_link stay put.
        event.summary = patch.summary.clone();
        event.description = patch.description.clone();
        event.start = patch.start;
        event.end = patch.end;

        Ok(event.clone())
    }

    async fn delete_event(&self, _token: &CalendarToken, event_id: &str) -> CalendarResult<()> {
        self.check_failure()?;

        self.events
            .lock()
            .unwrap()
            .remove(event_id)
            .map(|_| ())
            .ok_or_else(|| CalendarError::EventGone(event_id.to_string()))
    }

    async fn list_upcoming(
        &self,
        _token: &CalendarToken,
        since: DateTime<Utc>,
        max_results: usize,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        self.check_failure()?;

        let mut upcoming: Vec<CalendarEvent> = self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.start >= since)
            .cloned()
            .collect();

        upcoming.sort_by_key(|e| e.start);
        upcoming.truncate(max_results);
        Ok(upcoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token() -> CalendarToken {
        CalendarToken {
            access_token: "mock-token".to_string(),
            calendar_id: "primary".to_string(),
        }
    }

    fn event_at(summary: &str, hour: u32) -> CalendarEvent {
        let start = Utc.with_ymd_and_hms(2025, 4, 1, hour, 0, 0).unwrap();
        CalendarEvent {
            id: None,
            summary: summary.to_string(),
            description: None,
            start,
            end: start + chrono::Duration::hours(1),
            html_link: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_link() {
        let mock = MockCalendar::new();
        let created = mock.create_event(&token(), &event_at("Revise", 9)).await.unwrap();

        assert_eq!(created.id.as_deref(), Some("mock-event-1"));
        assert!(created.html_link.as_deref().unwrap().ends_with("mock-event-1"));
        assert_eq!(mock.event_count(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_event_is_gone() {
        let mock = MockCalendar::new();
        let err = mock.get_event(&token(), "nope").await.unwrap_err();
        assert!(err.is_gone());
    }

    #[tokio::test]
    async fn test_delete_removes_event() {
        let mock = MockCalendar::new();
        let created = mock.create_event(&token(), &event_at("Revise", 9)).await.unwrap();
        let id = created.id.unwrap();

        mock.delete_event(&token(), &id).await.unwrap();
        assert_eq!(mock.event_count(), 0);

        let err = mock.delete_event(&token(), &id).await.unwrap_err();
        assert!(err.is_gone());
    }

    #[tokio::test]
    async fn test_list_upcoming_sorted_and_bounded() {
        let mock = MockCalendar::new();
        mock.create_event(&token(), &event_at("Late", 17)).await.unwrap();
        mock.create_event(&token(), &event_at("Early", 8)).await.unwrap();
        mock.create_event(&token(), &event_at("Middle", 12)).await.unwrap();

        let since = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let events = mock.list_upcoming(&token(), since, 2).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary, "Early");
        assert_eq!(events[1].summary, "Middle");
    }

    #[tokio::test]
    async fn test_failure_mode() {
        let mock = MockCalendar::new();
        mock.set_failure(Some(MockFailure::Auth));

        let err = mock.create_event(&token(), &event_at("Revise", 9)).await.unwrap_err();
        assert!(err.is_auth());

        mock.set_failure(None);
        assert!(mock.create_event(&token(), &event_at("Revise", 9)).await.is_ok());
    }
}
