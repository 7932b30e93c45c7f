/// Calendar integration
///
/// - `provider`: the `CalendarProvider` contract, token and event types
/// - `google`: Google Calendar v3 client (the production provider)
/// - `mock`: in-memory provider for tests
/// - `sync`: task-to-event projection, push/refresh/remove, merged schedule

pub mod google;
pub mod mock;
pub mod provider;
pub mod sync;

pub use google::GoogleCalendar;
pub use mock::{MockCalendar, MockFailure};
pub use provider::{
    CalendarError, CalendarEvent, CalendarProvider, CalendarResult, CalendarToken, EventPatch,
};
pub use sync::{event_window, merge_schedule, ScheduleItem, ScheduleSource, TaskSync};
