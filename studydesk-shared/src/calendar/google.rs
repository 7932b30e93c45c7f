/// Google Calendar provider
///
/// Talks to the Google Calendar v3 REST API over HTTPS with the user's
/// bearer token. Updates use PATCH so remote fields we do not send
/// (attendees, reminders, colors, ...) are preserved by the service.
///
/// Endpoints used:
///
/// ```text
/// POST   /calendars/{calendarId}/events
/// GET    /calendars/{calendarId}/events/{eventId}
/// PATCH  /calendars/{calendarId}/events/{eventId}
/// DELETE /calendars/{calendarId}/events/{eventId}
/// GET    /calendars/{calendarId}/events?timeMin=...&singleEvents=true&orderBy=startTime
/// ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{
    CalendarError, CalendarEvent, CalendarProvider, CalendarResult, CalendarToken, EventPatch,
};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar API client
pub struct GoogleCalendar {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendar {
    /// Creates a client against the production Google API
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (tests, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn events_url(&self, token: &CalendarToken) -> String {
        format!("{}/calendars/{}/events", self.base_url, token.calendar_id)
    }

    fn event_url(&self, token: &CalendarToken, event_id: &str) -> String {
        format!("{}/{}", self.events_url(token), event_id)
    }

    /// Maps non-success responses to calendar errors
    async fn check(response: reqwest::Response) -> CalendarResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(CalendarError::Auth(message)),
            404 | 410 => Err(CalendarError::EventGone(message)),
            code => Err(CalendarError::Api { status: code, message }),
        }
    }
}

impl Default for GoogleCalendar {
    fn default() -> Self {
        Self::new()
    }
}

/// Event time in Google's wire format
///
/// Timed events carry `dateTime`; all-day events carry `date` only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireEventTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

impl WireEventTime {
    fn timed(at: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(at),
            date: None,
        }
    }

    /// Resolves to a UTC instant; all-day events map to midnight UTC
    fn resolve(&self) -> Option<DateTime<Utc>> {
        if let Some(dt) = self.date_time {
            return Some(dt);
        }
        self.date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

/// Event in Google's wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    // Cancelled event stubs omit the times entirely
    #[serde(default)]
    start: WireEventTime,

    #[serde(default)]
    end: WireEventTime,

    #[serde(rename = "htmlLink", skip_serializing_if = "Option::is_none")]
    html_link: Option<String>,
}

impl WireEvent {
    fn from_event(event: &CalendarEvent) -> Self {
        Self {
            id: None,
            summary: Some(event.summary.clone()),
            description: event.description.clone(),
            start: WireEventTime::timed(event.start),
            end: WireEventTime::timed(event.end),
            html_link: None,
        }
    }

    fn from_patch(patch: &EventPatch) -> Self {
        Self {
            id: None,
            summary: Some(patch.summary.clone()),
            description: patch.description.clone(),
            start: WireEventTime::timed(patch.start),
            end: WireEventTime::timed(patch.end),
            html_link: None,
        }
    }

    /// Converts to our event type; None when the times cannot be resolved
    /// (e.g. cancelled event stubs)
    fn into_event(self) -> Option<CalendarEvent> {
        let start = self.start.resolve()?;
        let end = self.end.resolve()?;

        Some(CalendarEvent {
            id: self.id,
            summary: self.summary.unwrap_or_default(),
            description: self.description,
            start,
            end,
            html_link: self.html_link,
        })
    }
}

/// Event list in Google's wire format
#[derive(Debug, Deserialize)]
struct WireEventList {
    #[serde(default)]
    items: Vec<WireEvent>,
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    fn name(&self) -> &str {
        "google"
    }

    async fn create_event(
        &self,
        token: &CalendarToken,
        event: &CalendarEvent,
    ) -> CalendarResult<CalendarEvent> {
        debug!(summary = %event.summary, "Creating remote calendar event");

        let response = self
            .client
            .post(self.events_url(token))
            .bearer_auth(&token.access_token)
            .json(&WireEvent::from_event(event))
            .send()
            .await?;

        let wire: WireEvent = Self::check(response).await?.json().await?;
        wire.into_event()
            .ok_or_else(|| CalendarError::Payload("Created event has no times".to_string()))
    }

    async fn get_event(
        &self,
        token: &CalendarToken,
        event_id: &str,
    ) -> CalendarResult<CalendarEvent> {
        let response = self
            .client
            .get(self.event_url(token, event_id))
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let wire: WireEvent = Self::check(response).await?.json().await?;
        wire.into_event()
            .ok_or_else(|| CalendarError::EventGone(event_id.to_string()))
    }

    async fn update_event(
        &self,
        token: &CalendarToken,
        event_id: &str,
        patch: &EventPatch,
    ) -> CalendarResult<CalendarEvent> {
        debug!(event_id, "Patching remote calendar event");

        let response = self
            .client
            .patch(self.event_url(token, event_id))
            .bearer_auth(&token.access_token)
            .json(&WireEvent::from_patch(patch))
            .send()
            .await?;

        let wire: WireEvent = Self::check(response).await?.json().await?;
        wire.into_event()
            .ok_or_else(|| CalendarError::Payload("Updated event has no times".to_string()))
    }

    async fn delete_event(&self, token: &CalendarToken, event_id: &str) -> CalendarResult<()> {
        debug!(event_id, "Deleting remote calendar event");

        let response = self
            .client
            .delete(self.event_url(token, event_id))
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn list_upcoming(
        &self,
        token: &CalendarToken,
        since: DateTime<Utc>,
        max_results: usize,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        let response = self
            .client
            .get(self.events_url(token))
            .bearer_auth(&token.access_token)
            .query(&[
                ("timeMin", since.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;

        let list: WireEventList = Self::check(response).await?.json().await?;
        Ok(list.items.into_iter().filter_map(WireEvent::into_event).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_event_deserialization() {
        let json = r#"{
            "id": "evt_abc123",
            "summary": "Linear Algebra revision",
            "description": "Chapters 2-3",
            "htmlLink": "https://www.google.com/calendar/event?eid=abc",
            "start": {"dateTime": "2025-03-10T14:00:00Z"},
            "end": {"dateTime": "2025-03-10T15:00:00Z"}
        }"#;

        let wire: WireEvent = serde_json::from_str(json).unwrap();
        let event = wire.into_event().unwrap();

        assert_eq!(event.id.as_deref(), Some("evt_abc123"));
        assert_eq!(event.summary, "Linear Algebra revision");
        assert_eq!(event.start, Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap());
        assert!(event.html_link.is_some());
    }

    #[test]
    fn test_wire_event_all_day() {
        let json = r#"{
            "id": "evt_allday",
            "summary": "Exam day",
            "start": {"date": "2025-06-01"},
            "end": {"date": "2025-06-02"}
        }"#;

        let wire: WireEvent = serde_json::from_str(json).unwrap();
        let event = wire.into_event().unwrap();
        assert_eq!(event.start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_wire_event_without_times_is_skipped() {
        let json = r#"{"id": "evt_cancelled", "start": {}, "end": {}}"#;
        let wire: WireEvent = serde_json::from_str(json).unwrap();
        assert!(wire.into_event().is_none());
    }

    #[test]
    fn test_wire_event_serialization_omits_nulls() {
        let event = CalendarEvent {
            id: None,
            summary: "Study".to_string(),
            description: None,
            start: Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap(),
            html_link: None,
        };

        let json = serde_json::to_value(WireEvent::from_event(&event)).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("htmlLink").is_none());
        assert_eq!(json["start"]["dateTime"], "2025-03-10T14:00:00Z");
    }

    #[test]
    fn test_event_urls() {
        let provider = GoogleCalendar::with_base_url("http://localhost:9999/v3");
        let token = CalendarToken {
            access_token: "tok".to_string(),
            calendar_id: "primary".to_string(),
        };

        assert_eq!(
            provider.events_url(&token),
            "http://localhost:9999/v3/calendars/primary/events"
        );
        assert_eq!(
            provider.event_url(&token, "evt1"),
            "http://localhost:9999/v3/calendars/primary/events/evt1"
        );
    }
}
