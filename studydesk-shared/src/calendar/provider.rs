/// Calendar provider contract and types
///
/// This module defines the seam between StudyDesk and the external calendar
/// service. The API server talks to a `CalendarProvider` trait object; the
/// production implementation is [`crate::calendar::google::GoogleCalendar`]
/// and tests use [`crate::calendar::mock::MockCalendar`].
///
/// # Provider contract
///
/// All providers must:
/// 1. Authenticate each call with the caller-supplied `CalendarToken`
/// 2. Report authentication failures as `CalendarError::Auth` so the sync
///    layer can flip the user's sync flag off
/// 3. Report missing events as `CalendarError::EventGone` so deletes stay
///    best-effort
/// 4. Preserve remote fields that an update does not specify
///
/// # Example
///
/// ```no_run
/// use studydesk_shared::calendar::{CalendarProvider, CalendarToken};
/// use studydesk_shared::calendar::mock::MockCalendar;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = MockCalendar::new();
/// let token = CalendarToken::from_blob("{\"token\":\"ya29.abc\"}", None)?;
/// let events = provider.list_upcoming(&token, chrono::Utc::now(), 20).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Calendar error types
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// Credentials were rejected by the remote service
    #[error("Calendar authorization failed: {0}")]
    Auth(String),

    /// The remote event no longer exists
    #[error("Remote event is gone: {0}")]
    EventGone(String),

    /// The remote service returned a non-success status
    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, timeout)
    #[error("Calendar transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response or token blob could not be interpreted
    #[error("Malformed calendar payload: {0}")]
    Payload(String),
}

/// Calendar result type alias
pub type CalendarResult<T> = Result<T, CalendarError>;

impl CalendarError {
    /// Whether this failure means the stored credentials are no good
    ///
    /// Auth failures flip the user's `calendar_sync_enabled` off and ask
    /// them to reconnect.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            CalendarError::Auth(_) | CalendarError::Api { status: 401 | 403, .. }
        )
    }

    /// Whether the target event is already gone
    ///
    /// Gone events count as success for best-effort deletion.
    pub fn is_gone(&self) -> bool {
        matches!(
            self,
            CalendarError::EventGone(_) | CalendarError::Api { status: 404 | 410, .. }
        )
    }
}

/// Authenticated calendar handle for a single user
///
/// Built from the opaque token blob stored on the user row. The blob is
/// JSON produced by the out-of-scope OAuth callback; the only key this
/// service reads is `token` (the bearer access token).
#[derive(Debug, Clone)]
pub struct CalendarToken {
    /// Bearer access token for the remote API
    pub access_token: String,

    /// Calendar to operate on
    pub calendar_id: String,
}

impl CalendarToken {
    /// Parses the stored credential blob into a usable token
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::Payload` if the blob is not JSON or lacks a
    /// string `token` key.
    pub fn from_blob(blob: &str, calendar_id: Option<&str>) -> CalendarResult<Self> {
        let value: serde_json::Value = serde_json::from_str(blob)
            .map_err(|e| CalendarError::Payload(format!("Token blob is not JSON: {}", e)))?;

        let access_token = value
            .get("token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| CalendarError::Payload("Token blob has no 'token' key".to_string()))?
            .to_string();

        Ok(Self {
            access_token,
            calendar_id: calendar_id.unwrap_or("primary").to_string(),
        })
    }
}

/// A calendar event as this service sees it
///
/// Providers may store more fields remotely; anything not represented here
/// must survive an update untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Remote event id (None before creation)
    pub id: Option<String>,

    /// Event title
    pub summary: String,

    /// Event body text
    pub description: Option<String>,

    /// Start of the event window
    pub start: DateTime<Utc>,

    /// End of the event window
    pub end: DateTime<Utc>,

    /// Link to the event in the provider's UI (set by the provider)
    pub html_link: Option<String>,
}

/// Fields an update overwrites on the remote event
///
/// Everything else on the remote event is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPatch {
    /// New title
    pub summary: String,

    /// New body text
    pub description: Option<String>,

    /// New window start
    pub start: DateTime<Utc>,

    /// New window end
    pub end: DateTime<Utc>,
}

/// Contract implemented by calendar backends
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Creates a remote event and returns it with its assigned id
    async fn create_event(
        &self,
        token: &CalendarToken,
        event: &CalendarEvent,
    ) -> CalendarResult<CalendarEvent>;

    /// Fetches a remote event by id
    async fn get_event(
        &self,
        token: &CalendarToken,
        event_id: &str,
    ) -> CalendarResult<CalendarEvent>;

    /// Overwrites the patch fields on a remote event, preserving the rest
    async fn update_event(
        &self,
        token: &CalendarToken,
        event_id: &str,
        patch: &EventPatch,
    ) -> CalendarResult<CalendarEvent>;

    /// Deletes a remote event by id
    async fn delete_event(&self, token: &CalendarToken, event_id: &str) -> CalendarResult<()>;

    /// Lists upcoming events starting at or after `since`, earliest first
    async fn list_upcoming(
        &self,
        token: &CalendarToken,
        since: DateTime<Utc>,
        max_results: usize,
    ) -> CalendarResult<Vec<CalendarEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_blob() {
        let token = CalendarToken::from_blob(
            r#"{"token":"ya29.abc","refresh_token":"1//xyz","scopes":["calendar"]}"#,
            None,
        )
        .unwrap();

        assert_eq!(token.access_token, "ya29.abc");
        assert_eq!(token.calendar_id, "primary");
    }

    #[test]
    fn test_token_from_blob_with_calendar_id() {
        let token =
            CalendarToken::from_blob(r#"{"token":"abc"}"#, Some("team@group.calendar")).unwrap();
        assert_eq!(token.calendar_id, "team@group.calendar");
    }

    #[test]
    fn test_token_from_blob_rejects_garbage() {
        assert!(CalendarToken::from_blob("not json", None).is_err());
        assert!(CalendarToken::from_blob(r#"{"access":"missing token key"}"#, None).is_err());
    }

    #[test]
    fn test_error_is_auth() {
        assert!(CalendarError::Auth("expired".to_string()).is_auth());
        assert!(CalendarError::Api { status: 401, message: String::new() }.is_auth());
        assert!(CalendarError::Api { status: 403, message: String::new() }.is_auth());
        assert!(!CalendarError::Api { status: 500, message: String::new() }.is_auth());
    }

    #[test]
    fn test_error_is_gone() {
        assert!(CalendarError::EventGone("evt1".to_string()).is_gone());
        assert!(CalendarError::Api { status: 404, message: String::new() }.is_gone());
        assert!(CalendarError::Api { status: 410, message: String::new() }.is_gone());
        assert!(!CalendarError::Auth("nope".to_string()).is_gone());
    }
}
