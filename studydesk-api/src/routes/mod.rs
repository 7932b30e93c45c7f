/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh
/// - `tasks`: Task CRUD, board view, status and completion changes
/// - `categories`: Category CRUD (soft delete)
/// - `flashcards`: Flashcard CRUD
/// - `summaries`: Summary CRUD
/// - `calendar`: Calendar connection and merged schedule

pub mod auth;
pub mod calendar;
pub mod categories;
pub mod flashcards;
pub mod health;
pub mod summaries;
pub mod tasks;

use crate::error::{ApiError, ValidationErrorDetail};
use validator::Validate;

/// Runs validator-derive checks and maps failures to a 422
pub(crate) fn check_request<T: Validate>(req: &T) -> Result<(), ApiError> {
    req.validate().map_err(|e| {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    })
}
