/// Calendar connection and schedule endpoints
///
/// The OAuth dance happens outside this service; clients hand us the
/// resulting credential blob. Storing it turns sync on. The schedule view
/// merges upcoming local tasks with the user's remote calendar events,
/// deduplicated so a synced task appears once.
///
/// # Endpoints
///
/// - `PUT    /v1/calendar/connection` - Store credentials, enable sync
/// - `DELETE /v1/calendar/connection` - Drop credentials, disable sync
/// - `GET    /v1/calendar/schedule` - Merged upcoming agenda

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use studydesk_shared::{
    auth::middleware::AuthContext,
    calendar::{merge_schedule, CalendarToken, ScheduleItem, TaskSync},
    models::{Task, User},
};
use tracing::{info, warn};

/// Connect request
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Opaque credential blob from the OAuth callback (JSON with a
    /// `token` key)
    pub token_blob: String,

    /// Calendar to write events into (defaults to the provider's primary)
    pub calendar_id: Option<String>,
}

/// Connection state response
#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    /// Whether a calendar is connected and sync is on
    pub connected: bool,

    /// Calendar the events go to, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
}

/// Schedule response
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    /// Whether remote events were included
    pub connected: bool,

    /// Merged agenda, earliest first
    pub items: Vec<ScheduleItem>,

    /// Set when the remote calendar could not be reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Store calendar credentials and enable sync
///
/// The blob is checked for shape (parseable JSON with a `token` key)
/// before it is stored; a malformed blob is rejected outright instead of
/// failing on every later sync.
///
/// # Errors
///
/// - `400 Bad Request`: Credential blob is malformed
pub async fn connect(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ConnectRequest>,
) -> ApiResult<Json<ConnectionResponse>> {
    CalendarToken::from_blob(&req.token_blob, req.calendar_id.as_deref())
        .map_err(|e| ApiError::BadRequest(format!("Unusable credentials: {}", e)))?;

    let user = User::connect_calendar(
        &state.db,
        auth.user_id,
        &req.token_blob,
        req.calendar_id.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ConnectionResponse {
        connected: user.calendar_sync_enabled,
        calendar_id: user.google_calendar_id,
    }))
}

/// Drop calendar credentials and disable sync
///
/// Remote events created earlier are left in place, but the tasks that
/// pointed at them are unlinked so a later reconnect starts clean.
pub async fn disconnect(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ConnectionResponse>> {
    User::disconnect_calendar(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let unlinked = Task::clear_calendar_links(&state.db, auth.user_id).await?;
    if unlinked > 0 {
        info!(user_id = %auth.user_id, unlinked, "Unlinked tasks from disconnected calendar");
    }

    Ok(Json(ConnectionResponse {
        connected: false,
        calendar_id: None,
    }))
}

/// Merged upcoming agenda
///
/// Local tasks always appear. When a calendar is connected, upcoming
/// remote events are merged in; if the remote side fails, the response
/// degrades to local tasks plus a warning rather than erroring.
pub async fn schedule(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ScheduleResponse>> {
    let now = Utc::now();
    let tasks = Task::list_upcoming(&state.db, auth.user_id, now).await?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let token = user
        .google_token
        .as_deref()
        .filter(|_| user.calendar_sync_enabled)
        .and_then(|blob| CalendarToken::from_blob(blob, user.google_calendar_id.as_deref()).ok());

    let Some(token) = token else {
        return Ok(Json(ScheduleResponse {
            connected: false,
            items: merge_schedule(&tasks, Vec::new(), now),
            warning: None,
        }));
    };

    let sync = TaskSync::new(state.calendar.as_ref(), token);
    match sync.upcoming(now, state.config.calendar.max_upcoming).await {
        Ok(remote) => Ok(Json(ScheduleResponse {
            connected: true,
            items: merge_schedule(&tasks, remote, now),
            warning: None,
        })),
        Err(err) if err.is_auth() => {
            warn!(user_id = %auth.user_id, "Calendar rejected credentials, disabling sync: {}", err);
            User::disable_calendar_sync(&state.db, auth.user_id).await?;
            Ok(Json(ScheduleResponse {
                connected: false,
                items: merge_schedule(&tasks, Vec::new(), now),
                warning: Some(
                    "Calendar authorization failed. Sync has been disabled; please reconnect your calendar."
                        .to_string(),
                ),
            }))
        }
        Err(err) => {
            warn!(user_id = %auth.user_id, "Failed to fetch remote events: {}", err);
            Ok(Json(ScheduleResponse {
                connected: true,
                items: merge_schedule(&tasks, Vec::new(), now),
                warning: Some(format!("Calendar events could not be fetched: {}", err)),
            }))
        }
    }
}
