/// StudyDesk shared library
///
/// Common code used by the API server:
///
/// - `models`: database models and queries (users, tasks, categories,
///   flashcards, summaries)
/// - `db`: connection pooling and migrations
/// - `auth`: password hashing, JWT issuance/validation, auth context
/// - `calendar`: the calendar provider seam and task synchronization

pub mod auth;
pub mod calendar;
pub mod db;
pub mod models;
