/// Flashcard endpoints
///
/// # Endpoints
///
/// - `GET    /v1/flashcards` - List flashcards (newest first)
/// - `POST   /v1/flashcards` - Create flashcard
/// - `GET    /v1/flashcards/:id` - Get flashcard
/// - `PUT    /v1/flashcards/:id` - Update question and answer
/// - `DELETE /v1/flashcards/:id` - Delete flashcard

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::check_request,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use studydesk_shared::{
    auth::middleware::AuthContext,
    models::{flashcard::CreateFlashcard, Flashcard},
};
use uuid::Uuid;
use validator::Validate;

/// Create flashcard request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFlashcardRequest {
    /// Front of the card
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,

    /// Back of the card
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
}

/// Update flashcard request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFlashcardRequest {
    /// New question
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,

    /// New answer
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteFlashcardResponse {
    /// Always true on success
    pub deleted: bool,
}

/// List the user's flashcards, newest first
pub async fn list_flashcards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Flashcard>>> {
    let cards = Flashcard::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(cards))
}

/// Create a flashcard
pub async fn create_flashcard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateFlashcardRequest>,
) -> ApiResult<Json<Flashcard>> {
    check_request(&req)?;

    let card = Flashcard::create(
        &state.db,
        CreateFlashcard {
            user_id: auth.user_id,
            question: req.question,
            answer: req.answer,
        },
    )
    .await?;

    Ok(Json(card))
}

/// Get a single flashcard
pub async fn get_flashcard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Flashcard>> {
    let card = Flashcard::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flashcard not found".to_string()))?;

    Ok(Json(card))
}

/// Update a flashcard's question and answer
pub async fn update_flashcard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFlashcardRequest>,
) -> ApiResult<Json<Flashcard>> {
    check_request(&req)?;

    let card = Flashcard::update(&state.db, id, auth.user_id, &req.question, &req.answer)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flashcard not found".to_string()))?;

    Ok(Json(card))
}

/// Delete a flashcard
pub async fn delete_flashcard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteFlashcardResponse>> {
    let deleted = Flashcard::delete(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Flashcard not found".to_string()));
    }

    Ok(Json(DeleteFlashcardResponse { deleted }))
}
